//! Remote data service types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field type marking a column whose values are image URLs.
pub const IMAGE_FIELD_TYPE: &str = "Img";

/// Metadata describing one column of a remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Raw column key as it appears in each record.
    pub id: String,
    /// Human-readable display name.
    pub label: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

impl Field {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type: None,
        }
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn is_image(&self) -> bool {
        self.field_type.as_deref() == Some(IMAGE_FIELD_TYPE)
    }
}

/// One data row, keyed by field id. Key order is preserved as delivered.
pub type Record = Map<String, Value>;

/// Rows and column metadata of one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Summary metadata of one table. Every key is optional on the wire, and a
/// key of the wrong shape reads as absent without affecting the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    #[serde(default, deserialize_with = "lenient_formats")]
    pub formats: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub nrow: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub ncol: Option<u64>,
}

fn lenient_formats<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Non-negative integers, including whole floats such as `10.0`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    Ok(count)
}

/// Error type for remote data operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}
