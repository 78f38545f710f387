//! Shared fixtures for integration tests.
#![allow(dead_code)]

use axum_test::TestServer;
use embed_services::{
    client::{Field, MockDataClient, TableMetadata, TableResponse},
    config::Config,
    routes,
};
use serde_json::json;

pub const ORG: &str = "acme";
pub const DB: &str = "sales-data";

/// Two rows with a text column, an image column and the reserved id column.
pub fn photo_table() -> TableResponse {
    TableResponse {
        data: serde_json::from_value(json!([
            {"rcd___id": 1, "a": "X", "b": "url1"},
            {"rcd___id": 2, "a": "Y", "b": "url2"},
        ]))
        .expect("fixture records are objects"),
        fields: vec![
            Field::new("a", "Name"),
            Field::new("b", "Photo").with_type("Img"),
        ],
    }
}

/// Orders with a numeric column to sort on and a mixed column that cannot be sorted.
pub fn orders_table() -> TableResponse {
    TableResponse {
        data: serde_json::from_value(json!([
            {"rcd___id": 1, "item": "pear", "qty": 3, "mixed": 1},
            {"rcd___id": 2, "item": "apple", "qty": 1, "mixed": "one"},
            {"rcd___id": 3, "item": "fig", "qty": 2, "mixed": null},
        ]))
        .expect("fixture records are objects"),
        fields: vec![
            Field::new("item", "Item"),
            Field::new("qty", "Quantity"),
            Field::new("mixed", "Mixed"),
        ],
    }
}

pub fn csv_metadata() -> TableMetadata {
    TableMetadata {
        formats: Some(vec!["csv".to_owned()]),
        nrow: Some(10),
        ncol: Some(3),
    }
}

/// `photos` and `orders` with data; `photos` with metadata, `orders` without.
pub fn mock_client() -> MockDataClient {
    MockDataClient::new()
        .with_table(ORG, DB, "photos", photo_table())
        .with_metadata(ORG, DB, "photos", csv_metadata())
        .with_table(ORG, DB, "orders", orders_table())
}

pub fn test_server(client: MockDataClient) -> TestServer {
    let config = Config::new_for_test_with_static_dir(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/static"
    ));
    TestServer::new(routes(client, config)).expect("router builds a test server")
}
