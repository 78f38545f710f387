//! Table view pipeline: remote records → headers and rows for a template.

use super::error::EmbedError;
use super::fields::FieldMapping;
use super::frame::{Frame, FrameError};
use crate::client::{ClientError, DataClient, DataSession, TableResponse};
use serde::Serialize;
use serde_json::{Map, Value};

/// Internal row-identity column, never shown.
pub const RESERVED_ID_COLUMN: &str = "rcd___id";

/// View rendering rows as label-keyed objects. Every other view gets
/// positional rows.
pub const TABLE_VIEW: &str = "table";

static NULL: Value = Value::Null;

/// Shaping options taken from the embed query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub view: String,
    /// Raw field ids to keep, applied before sorting.
    pub fields: Option<Vec<String>>,
    /// Forwarded to the template; does not affect shaping.
    pub preview: bool,
    /// Raw column to sort ascending by.
    pub order: Option<String>,
    /// Columns to narrow to after sorting.
    pub narrow: Option<Vec<String>>,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            view: TABLE_VIEW.to_owned(),
            fields: None,
            preview: true,
            order: None,
            narrow: None,
        }
    }
}

impl TableQuery {
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = view.into();
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_narrow<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.narrow = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_table_view(&self) -> bool {
        self.view == TABLE_VIEW
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rows {
    /// Lower-cased column name → value, one object per record.
    Records(Vec<Map<String, Value>>),
    /// Values in header order, one list per record.
    Values(Vec<Vec<Value>>),
}

impl Rows {
    pub fn len(&self) -> usize {
        match self {
            Self::Records(rows) => rows.len(),
            Self::Values(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Template context for one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Rows,
    pub image_columns: Vec<String>,
    pub view: String,
    pub preview: bool,
}

impl TableView {
    /// Cells of every row, aligned with `headers`.
    pub fn cell_rows(&self) -> Vec<Vec<&Value>> {
        match &self.rows {
            Rows::Records(rows) => rows
                .iter()
                .map(|row| {
                    self.headers
                        .iter()
                        .map(|header| row.get(header).unwrap_or(&NULL))
                        .collect()
                })
                .collect(),
            Rows::Values(rows) => rows.iter().map(|row| row.iter().collect()).collect(),
        }
    }

    /// Whether a (lower-cased) header names an image column.
    pub fn is_image_column(&self, header: &str) -> bool {
        self.image_columns
            .iter()
            .any(|label| label.to_lowercase() == header)
    }
}

/// Fetch a table through a scoped session and shape it.
pub async fn load_table<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
    table: &str,
    query: &TableQuery,
) -> Result<TableView, EmbedError> {
    let response = fetch_table(client, org, db, table).await.map_err(|e| {
        tracing::error!(org, db, table, error = %e, "failed to fetch table data");
        EmbedError::NotFound
    })?;

    shape_table(db, response, query)
}

async fn fetch_table<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
    table: &str,
) -> Result<TableResponse, ClientError> {
    let session = client.open().await?;
    session.get_data(org, db, table).await
}

/// Turn a fetched table into a template context.
///
/// `slug` is the database slug the title is derived from.
pub fn shape_table(
    slug: &str,
    response: TableResponse,
    query: &TableQuery,
) -> Result<TableView, EmbedError> {
    let TableResponse { data, fields } = response;
    let mapping = FieldMapping::from_fields(&fields);

    let mut frame = Frame::from_records(data).map_err(frame_error)?;
    frame.drop_column(RESERVED_ID_COLUMN);

    if let Some(fields) = &query.fields {
        frame = frame.select(fields.as_slice()).map_err(frame_error)?;
    }

    if let Some(order) = &query.order {
        frame.sort_by(order).map_err(|e| {
            tracing::error!(order = %order, error = %e, "invalid sort parameter");
            EmbedError::InvalidSort
        })?;
    }

    if let Some(narrow) = &query.narrow {
        frame = frame.select(narrow.as_slice()).map_err(frame_error)?;
    }

    frame.rename(mapping.labels()).map_err(frame_error)?;
    let image_columns = mapping.image_columns().to_vec();

    frame.lowercase_names().map_err(frame_error)?;
    let headers: Vec<String> = frame
        .column_names()
        .into_iter()
        .map(str::to_owned)
        .collect();

    let rows = if query.is_table_view() {
        Rows::Records(frame.into_records().map_err(frame_error)?)
    } else {
        Rows::Values(frame.into_rows().map_err(frame_error)?)
    };

    Ok(TableView {
        title: title_from_slug(slug),
        headers,
        rows,
        image_columns,
        view: query.view.clone(),
        preview: query.preview,
    })
}

fn frame_error(error: FrameError) -> EmbedError {
    match error {
        FrameError::ColumnNotFound(name) | FrameError::Unsortable { column: name, .. } => {
            tracing::error!(column = %name, "invalid column selection");
            EmbedError::ColumnNotFound(name)
        }
        FrameError::DuplicateColumn(name) => {
            tracing::error!(column = %name, "duplicate column");
            EmbedError::DuplicateColumn(name)
        }
        FrameError::Polars(e) => {
            tracing::error!(error = %e, "failed to reshape table");
            EmbedError::Internal
        }
    }
}

/// `"acme-sales-data"` → `"Acme Sales Data"`.
pub fn title_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

// Upper-cases the first letter of every alphabetic run, lower-cases the rest.
fn title_case(word: &str) -> String {
    let mut titled = String::with_capacity(word.len());
    let mut inside_word = false;
    for c in word.chars() {
        if inside_word {
            titled.extend(c.to_lowercase());
        } else {
            titled.extend(c.to_uppercase());
        }
        inside_word = c.is_alphabetic();
    }
    titled
}
