//! Embed endpoints: single-table views and per-database galleries.

pub mod error;
pub mod fields;
pub mod frame;
pub mod gallery;
pub mod table;

pub use error::{EmbedError, ErrorBody, INVALID_SORT_MESSAGE, NOT_FOUND_MESSAGE};
pub use fields::FieldMapping;
pub use frame::{Frame, FrameError};
pub use gallery::{GalleryEntry, GalleryView, load_gallery, load_gallery_view};
pub use table::{
    RESERVED_ID_COLUMN, Rows, TABLE_VIEW, TableQuery, TableView, load_table, shape_table,
    title_from_slug,
};

use crate::client::DataClient;
use crate::state::AppState;
use crate::templates::{TableTemplate, render_gallery};
use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use axum_extra::extract::{Query, WithRejection};
use serde::{Deserialize, Deserializer, de};

fn default_view() -> String {
    TABLE_VIEW.to_owned()
}

fn default_preview() -> bool {
    true
}

/// Accepts the usual query-string spellings of a boolean, ignoring case.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&raw),
            &"a boolean",
        )),
    }
}

/// Query string of a table embed. `fields` and `s` may repeat.
#[derive(Debug, Deserialize)]
pub struct TableParams {
    #[serde(default = "default_view")]
    pub view: String,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default = "default_preview", deserialize_with = "lenient_bool")]
    pub preview: bool,
    pub order: Option<String>,
    #[serde(default)]
    pub s: Vec<String>,
}

impl From<TableParams> for TableQuery {
    fn from(params: TableParams) -> Self {
        let non_empty = |values: Vec<String>| (!values.is_empty()).then_some(values);
        Self {
            view: params.view,
            fields: non_empty(params.fields),
            preview: params.preview,
            order: params.order.filter(|order| !order.is_empty()),
            narrow: non_empty(params.s),
        }
    }
}

/// Query string of a gallery embed.
#[derive(Debug, Deserialize)]
pub struct GalleryParams {
    /// Page title override.
    pub t: Option<String>,
}

pub fn routes<C: DataClient>() -> Router<AppState<C>> {
    Router::new()
        .route("/{org}/{db}", get(embed_gallery::<C>))
        .route("/{org}/{db}/{table}", get(embed_table::<C>))
}

async fn embed_table<C: DataClient>(
    State(state): State<AppState<C>>,
    Path((org, db, table)): Path<(String, String, String)>,
    WithRejection(Query(params), _): WithRejection<Query<TableParams>, EmbedError>,
) -> Result<Html<String>, EmbedError> {
    let query = TableQuery::from(params);
    let view = load_table(&state.client, &org, &db, &table, &query).await?;

    let template = TableTemplate::for_view(&view.view).ok_or_else(|| {
        tracing::warn!(view = %view.view, "no template for view");
        EmbedError::UnknownView(view.view.clone())
    })?;
    tracing::debug!(%org, %db, %table, rows = view.rows.len(), "rendering table embed");
    Ok(Html(template.render(&view).into_string()))
}

async fn embed_gallery<C: DataClient>(
    State(state): State<AppState<C>>,
    Path((org, db)): Path<(String, String)>,
    WithRejection(Query(params), _): WithRejection<Query<GalleryParams>, EmbedError>,
) -> Result<Html<String>, EmbedError> {
    let gallery = load_gallery_view(&state.client, &org, &db, params.t.as_deref()).await?;
    tracing::debug!(%org, %db, tables = gallery.tables.len(), "rendering gallery embed");
    Ok(Html(render_gallery(&gallery).into_string()))
}
