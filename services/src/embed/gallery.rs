//! Gallery pipeline: every table of a database with its summary metadata.

use super::error::EmbedError;
use crate::client::{ClientError, DataClient, DataSession, TableMetadata};
use serde::Serialize;
use tokio::task::JoinSet;

/// One table in the gallery. Metadata keys absent upstream stay `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    pub table: String,
    pub formats: Option<Vec<String>>,
    pub nrow: Option<u64>,
    pub ncol: Option<u64>,
}

impl GalleryEntry {
    fn new(table: String, metadata: TableMetadata) -> Self {
        let TableMetadata {
            formats,
            nrow,
            ncol,
        } = metadata;
        Self {
            table,
            formats,
            nrow,
            ncol,
        }
    }
}

/// Template context for the gallery page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub title: String,
    pub org: String,
    pub db: String,
    pub tables: Vec<GalleryEntry>,
}

/// List the tables of `org/db` and attach each table's metadata.
///
/// Metadata is fetched concurrently, one session per table. A table whose
/// metadata cannot be fetched is still listed, with empty metadata. Entries
/// keep the listing order.
pub async fn load_gallery<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
) -> Result<Vec<GalleryEntry>, EmbedError> {
    let tables = list_tables(client, org, db).await.map_err(|e| {
        tracing::error!(org, db, error = %e, "failed to list tables");
        EmbedError::NotFound
    })?;

    let mut tasks = JoinSet::new();
    for (index, table) in tables.iter().enumerate() {
        let client = client.clone();
        let org = org.to_owned();
        let db = db.to_owned();
        let table = table.clone();
        tasks.spawn(async move {
            let result = fetch_metadata(&client, &org, &db, &table).await;
            (index, result)
        });
    }

    let mut metadata: Vec<Option<TableMetadata>> = vec![None; tables.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(found))) => metadata[index] = Some(found),
            Ok((index, Err(e))) => {
                tracing::warn!(
                    org,
                    db,
                    table = %tables[index],
                    error = %e,
                    "metadata unavailable, listing table without it"
                );
            }
            Err(e) => tracing::warn!(org, db, error = %e, "metadata task failed"),
        }
    }

    Ok(tables
        .into_iter()
        .zip(metadata)
        .map(|(table, metadata)| GalleryEntry::new(table, metadata.unwrap_or_default()))
        .collect())
}

/// Gallery context; `title` overrides the default title (the database slug).
pub async fn load_gallery_view<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
    title: Option<&str>,
) -> Result<GalleryView, EmbedError> {
    let tables = load_gallery(client, org, db).await?;
    Ok(GalleryView {
        title: title.unwrap_or(db).to_owned(),
        org: org.to_owned(),
        db: db.to_owned(),
        tables,
    })
}

async fn list_tables<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
) -> Result<Vec<String>, ClientError> {
    let session = client.open().await?;
    session.get_tables(org, db).await
}

async fn fetch_metadata<C: DataClient>(
    client: &C,
    org: &str,
    db: &str,
    table: &str,
) -> Result<TableMetadata, ClientError> {
    let session = client.open().await?;
    session.get_metadata(org, db, table).await
}
