//! Errors raised by the embed pipelines and their HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use serde::{Deserialize, Serialize};

pub const NOT_FOUND_MESSAGE: &str = "Not found ¯\\_(ツ)_/¯";
pub const INVALID_SORT_MESSAGE: &str = "Error in sort parameter";

/// Uniform error body: `{"ok": false, "message": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EmbedError {
    /// The remote service could not supply the requested table or listing.
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    /// `order` names a missing column or one whose values cannot be ordered.
    #[error("{}", INVALID_SORT_MESSAGE)]
    InvalidSort,

    /// `fields` or `s` names a column absent from the current data.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// `fields` or `s` repeats a column, or two columns end up with one label.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// No template exists for the requested view.
    #[error("Unknown view: {0}")]
    UnknownView(String),

    /// A query string parameter could not be parsed.
    #[error("Invalid query parameter: {0}")]
    InvalidQuery(String),

    #[error("Internal server error")]
    Internal,
}

impl EmbedError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound | Self::UnknownView(_) => StatusCode::NOT_FOUND,
            Self::InvalidSort
            | Self::ColumnNotFound(_)
            | Self::DuplicateColumn(_)
            | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryRejection> for EmbedError {
    fn from(rejection: QueryRejection) -> Self {
        let message = rejection.body_text();
        tracing::warn!(error = %message, "rejected query string");
        Self::InvalidQuery(message)
    }
}

impl IntoResponse for EmbedError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(EmbedError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(EmbedError::InvalidSort.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            EmbedError::ColumnNotFound("x".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EmbedError::UnknownView("grid".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            EmbedError::DuplicateColumn("a".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            EmbedError::InvalidQuery("preview".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(EmbedError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn messages_are_fixed() {
        assert_eq!(EmbedError::NotFound.to_string(), r"Not found ¯\_(ツ)_/¯");
        assert_eq!(EmbedError::InvalidSort.to_string(), "Error in sort parameter");
    }

    #[test]
    fn query_rejection_becomes_invalid_query() {
        let uri: axum::http::Uri = "/embed/acme/db/t?preview=maybe".parse().unwrap();
        let rejection = axum_extra::extract::Query::<Flag>::try_from_uri(&uri).unwrap_err();

        let error = EmbedError::from(rejection);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert!(
            error
                .to_string()
                .starts_with("Invalid query parameter: Failed to deserialize query string")
        );
    }

    #[derive(Debug, serde::Deserialize)]
    #[allow(dead_code)]
    struct Flag {
        preview: bool,
    }

    #[test]
    fn response_carries_status() {
        let response = EmbedError::InvalidSort.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
