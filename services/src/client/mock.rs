//! In-memory data client for testing.

use super::traits::{DataClient, DataSession};
use super::types::{ClientError, TableMetadata, TableResponse};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory implementation of [`DataClient`].
///
/// Tables are listed in registration order. Session counters let tests
/// assert that every opened session was released.
#[derive(Clone, Default)]
pub struct MockDataClient {
    state: Arc<RwLock<MockState>>,
    opened: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

#[derive(Default)]
struct MockState {
    listings: HashMap<(String, String), Vec<String>>,
    tables: HashMap<(String, String, String), MockTable>,
    refuse_sessions: bool,
}

#[derive(Default)]
struct MockTable {
    response: Option<TableResponse>,
    metadata: Option<TableMetadata>,
}

impl MockState {
    fn table_mut(&mut self, org: &str, db: &str, table: &str) -> &mut MockTable {
        let listing = self
            .listings
            .entry((org.to_owned(), db.to_owned()))
            .or_default();
        if !listing.iter().any(|name| name == table) {
            listing.push(table.to_owned());
        }
        self.tables
            .entry((org.to_owned(), db.to_owned(), table.to_owned()))
            .or_default()
    }

    fn table(&self, org: &str, db: &str, table: &str) -> Option<&MockTable> {
        self.tables
            .get(&(org.to_owned(), db.to_owned(), table.to_owned()))
    }
}

impl MockDataClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// List a table without data or metadata; fetching either fails.
    pub fn with_listed_table(self, org: &str, db: &str, table: &str) -> Self {
        self.state
            .write()
            .expect("lock poisoned")
            .table_mut(org, db, table);
        self
    }

    pub fn with_table(self, org: &str, db: &str, table: &str, response: TableResponse) -> Self {
        self.state
            .write()
            .expect("lock poisoned")
            .table_mut(org, db, table)
            .response = Some(response);
        self
    }

    pub fn with_metadata(
        self,
        org: &str,
        db: &str,
        table: &str,
        metadata: TableMetadata,
    ) -> Self {
        self.state
            .write()
            .expect("lock poisoned")
            .table_mut(org, db, table)
            .metadata = Some(metadata);
        self
    }

    /// Make every subsequent `open` fail.
    pub fn refusing_sessions(self) -> Self {
        self.state.write().expect("lock poisoned").refuse_sessions = true;
        self
    }

    /// Total number of sessions opened so far.
    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions currently held.
    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl DataClient for MockDataClient {
    type Session = MockSession;

    async fn open(&self) -> Result<Self::Session, ClientError> {
        if self.state.read().expect("lock poisoned").refuse_sessions {
            return Err(ClientError::Unavailable("mock refuses sessions".to_owned()));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            state: Arc::clone(&self.state),
            live: Arc::clone(&self.live),
        })
    }
}

pub struct MockSession {
    state: Arc<RwLock<MockState>>,
    live: Arc<AtomicUsize>,
}

impl DataSession for MockSession {
    async fn get_data(&self, org: &str, db: &str, table: &str) -> Result<TableResponse, ClientError> {
        let state = self.state.read().expect("lock poisoned");
        state
            .table(org, db, table)
            .and_then(|t| t.response.clone())
            .ok_or_else(|| ClientError::NotFound(format!("{org}/{db}/{table}")))
    }

    async fn get_tables(&self, org: &str, db: &str) -> Result<Vec<String>, ClientError> {
        let state = self.state.read().expect("lock poisoned");
        state
            .listings
            .get(&(org.to_owned(), db.to_owned()))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{org}/{db}")))
    }

    async fn get_metadata(
        &self,
        org: &str,
        db: &str,
        table: &str,
    ) -> Result<TableMetadata, ClientError> {
        let state = self.state.read().expect("lock poisoned");
        state
            .table(org, db, table)
            .and_then(|t| t.metadata.clone())
            .ok_or_else(|| ClientError::NotFound(format!("{org}/{db}/{table}")))
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
