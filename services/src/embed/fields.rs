//! Field id → display label mapping.

use crate::client::Field;
use std::collections::HashMap;

/// Labels of a table's fields plus the labels rendered as images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    labels: HashMap<String, String>,
    image_columns: Vec<String>,
}

impl FieldMapping {
    pub fn from_fields(fields: &[Field]) -> Self {
        let labels = fields
            .iter()
            .map(|field| (field.id.clone(), field.label.clone()))
            .collect();
        let image_columns = fields
            .iter()
            .filter(|field| field.is_image())
            .map(|field| field.label.clone())
            .collect();

        Self {
            labels,
            image_columns,
        }
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }

    /// Image labels in field order, independent of any later projection.
    pub fn image_columns(&self) -> &[String] {
        &self.image_columns
    }
}
