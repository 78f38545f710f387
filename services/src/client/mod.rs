//! Remote data service client.
//!
//! The remote service is an opaque database-as-a-service. This module exposes
//! it through the [`DataClient`] / [`DataSession`] pair so request handlers can
//! be tested against [`MockDataClient`] and run against [`HttpDataClient`].

mod http;
mod mock;
mod traits;
mod types;

pub use self::http::{HttpDataClient, HttpSession};
pub use mock::{MockDataClient, MockSession};
pub use traits::{DataClient, DataSession};
pub use types::{ClientError, Field, IMAGE_FIELD_TYPE, Record, TableMetadata, TableResponse};

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_names<C: DataClient>(client: &C) -> Result<Vec<String>, ClientError> {
        let session = client.open().await?;
        session.get_tables("acme", "db").await
    }

    #[tokio::test]
    async fn generic_client_interface() {
        let client = MockDataClient::new().with_listed_table("acme", "db", "t1");
        assert_eq!(table_names(&client).await.unwrap(), ["t1"]);
        assert_eq!(client.live_sessions(), 0);
    }
}
