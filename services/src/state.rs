//! Shared router state.

/// Application state shared across handlers.
///
/// Generic over the data client so tests can route through
/// [`MockDataClient`](crate::client::MockDataClient).
#[derive(Clone)]
pub struct AppState<C> {
    pub client: C,
}

impl<C> AppState<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}
