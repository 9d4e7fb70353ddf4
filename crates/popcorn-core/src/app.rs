//! Application orchestrator.
//!
//! [`App`] owns the selection, the search fetcher, the detail state machine and
//! the watched collection. It is the only thing that mutates any of them:
//! network results and key presses are queued and applied from
//! [`App::next_update`].

use crate::detail::{CommitError, DetailAcquisition, DetailCompletion, DetailState, RateError, RatingView};
use crate::fetcher::{CatalogFetcher, SearchCompletion, SearchState};
use crate::keys::{FocusTarget, KeyBinding, KeyDispatcher, KeyHost, KeyName};
use crate::stats::{summarize, WatchedSummary};
use crate::store::{CollectionStore, KeyValueStore, StorageError};
use crate::title::TitleSink;
use popcorn_config::DEFAULT_MIN_QUERY_LENGTH;
use popcorn_models::{MovieDetail, SearchResult, WatchedRecord};
use popcorn_sources::CatalogSource;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub min_query_length: usize,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            min_query_length: DEFAULT_MIN_QUERY_LENGTH,
        }
    }
}

/// Requests raised by keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ClearSelection,
    FocusSearch,
}

/// What changed after one step of [`App::next_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    Search,
    Detail,
    SelectionCleared,
    /// The host should move focus to the search field; the query was cleared
    FocusSearch,
    /// A superseded response arrived and was dropped
    Discarded,
}

enum Wake {
    Command(Option<Command>),
    Search(Option<SearchCompletion>),
    Detail(Option<DetailCompletion>),
}

pub struct App<K: KeyValueStore> {
    query: String,
    selected_id: Option<String>,
    fetcher: CatalogFetcher,
    detail: DetailAcquisition,
    store: CollectionStore<K>,
    _search_shortcut: KeyDispatcher,
    commands_rx: mpsc::UnboundedReceiver<Command>,
}

impl<K: KeyValueStore> App<K> {
    pub fn new(
        source: Arc<dyn CatalogSource>,
        backend: K,
        title: Arc<dyn TitleSink>,
        keys: Arc<dyn KeyHost>,
        options: AppOptions,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();

        let escape_tx = commands_tx.clone();
        let detail = DetailAcquisition::new(Arc::clone(&source), title, Arc::clone(&keys), move || {
            let _ = escape_tx.send(Command::ClearSelection);
        });

        // Enter jumps back to the search box, unless typing there already
        let mut search_shortcut = KeyDispatcher::new(keys);
        search_shortcut.rebind(
            KeyBinding::new(KeyName::enter(), move || {
                let _ = commands_tx.send(Command::FocusSearch);
            })
            .unless_focused(FocusTarget::SearchField),
        );

        Self {
            query: String::new(),
            selected_id: None,
            fetcher: CatalogFetcher::new(source, options.min_query_length),
            detail,
            store: CollectionStore::new(backend),
            _search_shortcut: search_shortcut,
            commands_rx,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn search_state(&self) -> &SearchState {
        self.fetcher.state()
    }

    pub fn results(&self) -> &[SearchResult] {
        self.fetcher.results()
    }

    pub fn detail_state(&self) -> &DetailState {
        self.detail.state()
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        self.detail.detail()
    }

    pub fn store(&self) -> &CollectionStore<K> {
        &self.store
    }

    /// New search term; supersedes any search still running.
    pub fn set_query(&mut self, term: &str) {
        self.query = term.to_string();
        self.fetcher.search(term);
    }

    /// Select a movie, or clear the selection when it is already selected.
    pub fn select(&mut self, id: &str) {
        if self.selected_id.as_deref() == Some(id) {
            debug!(id, "Movie selected again, closing details");
            self.close_detail();
            return;
        }
        self.selected_id = Some(id.to_string());
        self.detail.load(id);
    }

    pub fn close_detail(&mut self) {
        self.selected_id = None;
        self.detail.clear();
    }

    pub fn rating_view(&mut self) -> RatingView {
        let existing = self.existing_record();
        self.detail.rating_view(existing.as_ref())
    }

    pub fn set_rating(&mut self, value: u8) -> Result<bool, RateError> {
        let existing = self.existing_record();
        self.detail.set_rating(value, existing.as_ref())
    }

    /// Add the selected movie with its pending rating to the watched list.
    pub fn commit_rating(&mut self) -> Result<WatchedRecord, CommitError> {
        let record = self.detail.commit(&mut self.store)?;
        self.selected_id = None;
        Ok(record)
    }

    pub fn delete_watched(&mut self, id: &str) -> Result<bool, StorageError> {
        self.store.remove(id)
    }

    pub fn watched(&mut self) -> &[WatchedRecord] {
        self.store.load()
    }

    pub fn summary(&mut self) -> WatchedSummary {
        summarize(self.store.load())
    }

    /// Hide a search or detail failure.
    pub fn dismiss_error(&mut self) {
        self.fetcher.dismiss_error();
        if matches!(self.detail.state(), DetailState::Failed { .. }) {
            self.close_detail();
        }
    }

    pub fn is_busy(&self) -> bool {
        self.fetcher.is_pending() || self.detail.is_pending()
    }

    /// Apply the next queued command or finished request. `None` once nothing
    /// is queued or in flight.
    pub async fn next_update(&mut self) -> Option<Update> {
        if let Ok(command) = self.commands_rx.try_recv() {
            return Some(self.handle_command(command));
        }

        let search_pending = self.fetcher.is_pending();
        let detail_pending = self.detail.is_pending();
        if !search_pending && !detail_pending {
            return None;
        }

        let wake = tokio::select! {
            command = self.commands_rx.recv() => Wake::Command(command),
            completion = self.fetcher.next_completion(), if search_pending => Wake::Search(completion),
            completion = self.detail.next_completion(), if detail_pending => Wake::Detail(completion),
        };

        let update = match wake {
            Wake::Command(Some(command)) => self.handle_command(command),
            // Senders live in key listeners owned through this App, so this only happens on teardown
            Wake::Command(None) => return None,
            Wake::Search(Some(completion)) => {
                if self.fetcher.apply(completion) {
                    Update::Search
                } else {
                    Update::Discarded
                }
            }
            Wake::Detail(Some(completion)) => {
                if self.detail.apply(completion) {
                    Update::Detail
                } else {
                    Update::Discarded
                }
            }
            Wake::Search(None) => Update::Search,
            Wake::Detail(None) => Update::Detail,
        };
        Some(update)
    }

    /// Apply queued key commands without waiting on the network.
    pub fn poll_commands(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Ok(command) = self.commands_rx.try_recv() {
            updates.push(self.handle_command(command));
        }
        updates
    }

    /// Run until nothing is queued or in flight.
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    fn handle_command(&mut self, command: Command) -> Update {
        match command {
            Command::ClearSelection => {
                info!("Escape pressed, closing details");
                self.close_detail();
                Update::SelectionCleared
            }
            Command::FocusSearch => {
                debug!("Enter pressed, focusing search");
                self.set_query("");
                Update::FocusSearch
            }
        }
    }

    fn existing_record(&mut self) -> Option<WatchedRecord> {
        let id = self.detail.current_id()?.to_string();
        self.store.find(&id).cloned()
    }
}

#[cfg(test)]
mod tests;
