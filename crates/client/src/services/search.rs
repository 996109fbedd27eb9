//! Search collaborator trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use availability::SailingResult;
use booking::SearchParams;

use crate::error::ClientError;

/// Trait for the sailing search collaborator.
#[async_trait]
pub trait SearchApi: Send + Sync {
    /// Runs a search and returns the matching sailings.
    async fn search(&self, params: &SearchParams) -> Result<Vec<SailingResult>, ClientError>;
}

#[derive(Debug, Default)]
struct InMemorySearchState {
    sailings: Vec<SailingResult>,
    search_count: usize,
    fail_on_search: bool,
}

/// In-memory search API for testing.
///
/// Returns the configured sailings whose route matches the request.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchApi {
    state: Arc<RwLock<InMemorySearchState>>,
}

impl InMemorySearchApi {
    /// Creates a new in-memory search API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configured result set.
    pub fn set_sailings(&self, sailings: Vec<SailingResult>) {
        self.state.write().unwrap().sailings = sailings;
    }

    /// Configures the service to fail search calls.
    pub fn set_fail_on_search(&self, fail: bool) {
        self.state.write().unwrap().fail_on_search = fail;
    }

    /// Returns how many searches have been served.
    pub fn search_count(&self) -> usize {
        self.state.read().unwrap().search_count
    }
}

#[async_trait]
impl SearchApi for InMemorySearchApi {
    async fn search(&self, params: &SearchParams) -> Result<Vec<SailingResult>, ClientError> {
        let mut state = self.state.write().unwrap();
        state.search_count += 1;

        if state.fail_on_search {
            return Err(ClientError::Search("search service unavailable".to_string()));
        }

        Ok(state
            .sailings
            .iter()
            .filter(|s| s.route == params.route)
            .cloned()
            .collect())
    }
}
