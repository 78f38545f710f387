//! HTTP implementation of the remote data client.

use super::traits::{DataClient, DataSession};
use super::types::{ClientError, TableMetadata, TableResponse};
use crate::config::Config;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Client for the remote data service, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpDataClient {
    http: reqwest::Client,
    base_url: Arc<Url>,
    token: Option<Arc<str>>,
    next_session: Arc<AtomicU64>,
}

impl HttpDataClient {
    /// Build a client from the process-wide configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let base_url = Url::parse(config.data_api_url())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.data_api_url())))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.data_api_url().to_owned()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            token: config.data_api_token().map(Arc::from),
            next_session: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl DataClient for HttpDataClient {
    type Session = HttpSession;

    async fn open(&self) -> Result<Self::Session, ClientError> {
        let id = self.next_session.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, "data session opened");
        Ok(HttpSession {
            client: self.clone(),
            id,
            opened_at: Instant::now(),
        })
    }
}

/// A scoped session against the remote data service.
pub struct HttpSession {
    client: HttpDataClient,
    id: u64,
    opened_at: Instant,
}

impl HttpSession {
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = Url::clone(&self.client.base_url);
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.client.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let mut request = self.client.http.get(url.clone());
        if let Some(token) = &self.client.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(url.path().to_owned()));
        }
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                url: url.path().to_owned(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}

impl DataSession for HttpSession {
    async fn get_data(&self, org: &str, db: &str, table: &str) -> Result<TableResponse, ClientError> {
        let url = self.endpoint(&["orgs", org, "dbs", db, "tables", table, "data"])?;
        self.get_json(url).await
    }

    async fn get_tables(&self, org: &str, db: &str) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["orgs", org, "dbs", db, "tables"])?;
        self.get_json(url).await
    }

    async fn get_metadata(
        &self,
        org: &str,
        db: &str,
        table: &str,
    ) -> Result<TableMetadata, ClientError> {
        let url = self.endpoint(&["orgs", org, "dbs", db, "tables", table, "metadata"])?;
        self.get_json(url).await
    }
}

impl Drop for HttpSession {
    fn drop(&mut self) {
        tracing::debug!(
            session = self.id,
            elapsed_ms = self.opened_at.elapsed().as_millis() as u64,
            "data session released"
        );
    }
}
