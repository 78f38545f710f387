//! Remote data client trait definitions.

use super::types::{ClientError, TableMetadata, TableResponse};
use std::future::Future;

/// Entry point to the remote data service.
///
/// A client is cheap to clone and shared by all requests. Each unit of work
/// acquires its own [`DataSession`] through [`DataClient::open`]; the session
/// is released when dropped, on every exit path.
pub trait DataClient: Clone + Send + Sync + 'static {
    type Session: DataSession;

    fn open(&self) -> impl Future<Output = Result<Self::Session, ClientError>> + Send;
}

/// Operations available on an open session.
pub trait DataSession: Send + Sync + 'static {
    fn get_data(
        &self,
        org: &str,
        db: &str,
        table: &str,
    ) -> impl Future<Output = Result<TableResponse, ClientError>> + Send;

    fn get_tables(
        &self,
        org: &str,
        db: &str,
    ) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send;

    fn get_metadata(
        &self,
        org: &str,
        db: &str,
        table: &str,
    ) -> impl Future<Output = Result<TableMetadata, ClientError>> + Send;
}
