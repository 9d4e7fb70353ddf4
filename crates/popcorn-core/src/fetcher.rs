//! Query-driven catalog search.
//!
//! Every search runs as its own task. Starting a new search aborts the task
//! of the previous one, and each completion carries the generation it was
//! started under so that only the newest request can ever change the state.

use popcorn_models::SearchResult;
use popcorn_sources::{CatalogSource, SourceError};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Loading { term: String },
    Ready { term: String, results: Vec<SearchResult> },
    Failed { term: String, message: String },
}

/// Outcome of one search task.
#[derive(Debug)]
pub struct SearchCompletion {
    generation: u64,
    term: String,
    outcome: Result<Vec<SearchResult>, SourceError>,
}

impl SearchCompletion {
    pub fn term(&self) -> &str {
        &self.term
    }
}

pub struct CatalogFetcher {
    source: Arc<dyn CatalogSource>,
    min_query_length: usize,
    generation: u64,
    in_flight: Option<JoinHandle<SearchCompletion>>,
    state: SearchState,
}

impl CatalogFetcher {
    pub fn new(source: Arc<dyn CatalogSource>, min_query_length: usize) -> Self {
        Self {
            source,
            min_query_length,
            generation: 0,
            in_flight: None,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Results of the last successful search; empty in every other state.
    pub fn results(&self) -> &[SearchResult] {
        match &self.state {
            SearchState::Ready { results, .. } => results,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SearchState::Loading { .. })
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a search for `term`, superseding any request still running.
    ///
    /// Returns `false` when the term is too short to be worth a request; the
    /// results are cleared and no call is made.
    pub fn search(&mut self, term: &str) -> bool {
        self.abort_in_flight();

        let term = term.trim();
        if term.chars().count() < self.min_query_length {
            debug!(term, min = self.min_query_length, "Search term too short, skipping catalog request");
            self.state = SearchState::Idle;
            return false;
        }

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let request_term = term.to_string();
        info!("Searching {} for '{}'", source.source_name(), term);

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.search(&request_term).await;
            SearchCompletion {
                generation,
                term: request_term,
                outcome,
            }
        }));
        self.state = SearchState::Loading { term: term.to_string() };
        true
    }

    /// Abort the running request, if any, and go back to idle.
    pub fn cancel(&mut self) {
        self.abort_in_flight();
        self.state = SearchState::Idle;
    }

    /// Clear a failure so the error is no longer shown.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, SearchState::Failed { .. }) {
            self.state = SearchState::Idle;
        }
    }

    /// Wait for the current request to finish. `None` when nothing is running
    /// or the task did not produce a result.
    ///
    /// Cancel safe: if the returned future is dropped the request keeps running.
    pub async fn next_completion(&mut self) -> Option<SearchCompletion> {
        let handle = self.in_flight.as_mut()?;
        let joined = handle.await;
        self.in_flight = None;

        match joined {
            Ok(completion) => Some(completion),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!("Search task failed: {}", e);
                if let SearchState::Loading { term } = &self.state {
                    self.state = SearchState::Failed {
                        term: term.clone(),
                        message: "Something went wrong while searching".to_string(),
                    };
                }
                None
            }
        }
    }

    /// Apply a finished request. Returns `false` if it was superseded.
    pub fn apply(&mut self, completion: SearchCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(term = %completion.term, "Discarding stale search response");
            return false;
        }

        self.state = match completion.outcome {
            Ok(results) => {
                info!("Found {} results for '{}'", results.len(), completion.term);
                SearchState::Ready {
                    term: completion.term,
                    results,
                }
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", completion.term, e);
                SearchState::Failed {
                    term: completion.term,
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Wait for and apply the current request.
    pub async fn settle(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => self.apply(completion),
            None => false,
        }
    }

    fn abort_in_flight(&mut self) {
        // Bumped even when nothing is running so any completion held elsewhere goes stale
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.in_flight.take() {
            debug!("Cancelling superseded search request");
            handle.abort();
        }
    }
}

impl Drop for CatalogFetcher {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
