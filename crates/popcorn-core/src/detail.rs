//! Detail acquisition for the selected movie, plus the rating workflow.
//!
//! The state machine moves `None -> Loading -> Ready` (or `Failed`) every time
//! the selection changes. Loads are superseded the same way searches are: the
//! old task is aborted and its generation goes stale. While `Ready`, the
//! display title names the movie; any exit from `Ready` restores it.

use crate::keys::{KeyBinding, KeyDispatcher, KeyHost, KeyName};
use crate::store::{CollectionStore, KeyValueStore, StorageError};
use crate::title::{TitleScope, TitleSink};
use popcorn_models::{MovieDetail, ParseError, RatingError, UserRating, WatchedRecord};
use popcorn_sources::{CatalogSource, SourceError};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    None,
    Loading { id: String },
    Ready { detail: MovieDetail },
    Failed { id: String, message: String },
}

/// What the rating area should show for the current movie.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingView {
    /// Nothing to rate yet
    Unavailable,
    Pending {
        rating: Option<UserRating>,
        revisions: u32,
        can_commit: bool,
    },
    /// Already in the watched list; shown read-only
    AlreadyRated { rating: UserRating },
}

#[derive(Debug, Error)]
pub enum RateError {
    #[error(transparent)]
    Invalid(#[from] RatingError),
    #[error("No movie detail is ready to rate")]
    NotReady,
    #[error("{0} is already in your watched list")]
    AlreadyWatched(String),
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("No movie detail is ready to rate")]
    NotReady,
    #[error("Pick a rating before adding the movie")]
    NoRating,
    #[error("{0} is already in your watched list")]
    AlreadyWatched(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug)]
pub struct DetailCompletion {
    generation: u64,
    id: String,
    outcome: Result<MovieDetail, SourceError>,
}

#[derive(Debug, Default)]
struct RatingWorkflow {
    rating: Option<UserRating>,
    revisions: u32,
}

impl RatingWorkflow {
    /// Count only changes to a different value
    fn set(&mut self, rating: UserRating) -> bool {
        if self.rating == Some(rating) {
            return false;
        }
        self.rating = Some(rating);
        self.revisions += 1;
        true
    }
}

pub struct DetailAcquisition {
    source: Arc<dyn CatalogSource>,
    title_sink: Arc<dyn TitleSink>,
    escape: KeyDispatcher,
    escape_binding: KeyBinding,
    generation: u64,
    in_flight: Option<JoinHandle<DetailCompletion>>,
    state: DetailState,
    title: Option<TitleScope>,
    rating: RatingWorkflow,
}

impl DetailAcquisition {
    /// `on_escape` runs when Escape is pressed while a movie is selected.
    pub fn new(
        source: Arc<dyn CatalogSource>,
        title_sink: Arc<dyn TitleSink>,
        keys: Arc<dyn KeyHost>,
        on_escape: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            source,
            title_sink,
            escape: KeyDispatcher::new(keys),
            escape_binding: KeyBinding::new(KeyName::escape(), on_escape),
            generation: 0,
            in_flight: None,
            state: DetailState::None,
            title: None,
            rating: RatingWorkflow::default(),
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn detail(&self) -> Option<&MovieDetail> {
        match &self.state {
            DetailState::Ready { detail } => Some(detail),
            _ => None,
        }
    }

    /// Id of the movie being loaded or shown.
    pub fn current_id(&self) -> Option<&str> {
        match &self.state {
            DetailState::None => None,
            DetailState::Loading { id } | DetailState::Failed { id, .. } => Some(id),
            DetailState::Ready { detail } => Some(&detail.id),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start loading `id`, superseding whatever was selected before.
    pub fn load(&mut self, id: &str) {
        self.leave_current();

        if !self.escape.is_bound() {
            self.escape.rebind(self.escape_binding.clone());
        }

        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let request_id = id.to_string();
        info!("Loading details for {}", id);

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = source.detail(&request_id).await;
            DetailCompletion {
                generation,
                id: request_id,
                outcome,
            }
        }));
        self.state = DetailState::Loading { id: id.to_string() };
    }

    /// Drop the selection: abort any load, restore the title, release Escape.
    pub fn clear(&mut self) {
        self.leave_current();
        self.escape.unbind();
        self.state = DetailState::None;
    }

    /// Wait for the current load to finish. Cancel safe.
    pub async fn next_completion(&mut self) -> Option<DetailCompletion> {
        let handle = self.in_flight.as_mut()?;
        let joined = handle.await;
        self.in_flight = None;

        match joined {
            Ok(completion) => Some(completion),
            Err(e) if e.is_cancelled() => None,
            Err(e) => {
                warn!("Detail task failed: {}", e);
                if let DetailState::Loading { id } = &self.state {
                    self.state = DetailState::Failed {
                        id: id.clone(),
                        message: "Something went wrong while loading details".to_string(),
                    };
                }
                None
            }
        }
    }

    /// Apply a finished load. Returns `false` if it was superseded.
    pub fn apply(&mut self, completion: DetailCompletion) -> bool {
        if completion.generation != self.generation {
            debug!(id = %completion.id, "Discarding stale detail response");
            return false;
        }

        match completion.outcome {
            Ok(detail) => {
                if !detail.title.is_empty() {
                    self.title = Some(TitleScope::acquire(
                        Arc::clone(&self.title_sink),
                        &detail.display_title(),
                    ));
                }
                info!("Loaded details for {} ({})", detail.title, detail.id);
                self.state = DetailState::Ready { detail };
            }
            Err(e) => {
                warn!("Loading details for {} failed: {}", completion.id, e);
                self.state = DetailState::Failed {
                    id: completion.id,
                    message: e.to_string(),
                };
            }
        }
        true
    }

    pub async fn settle(&mut self) -> bool {
        match self.next_completion().await {
            Some(completion) => self.apply(completion),
            None => false,
        }
    }

    /// Rating area for the current movie. `existing` is the watched record
    /// with the same id, if any.
    pub fn rating_view(&self, existing: Option<&WatchedRecord>) -> RatingView {
        if self.detail().is_none() {
            return RatingView::Unavailable;
        }
        if let Some(record) = existing {
            return RatingView::AlreadyRated {
                rating: record.user_rating,
            };
        }
        RatingView::Pending {
            rating: self.rating.rating,
            revisions: self.rating.revisions,
            can_commit: self.rating.rating.is_some(),
        }
    }

    /// Set the pending rating. Returns whether it changed.
    pub fn set_rating(&mut self, value: u8, existing: Option<&WatchedRecord>) -> Result<bool, RateError> {
        let detail = self.detail().ok_or(RateError::NotReady)?;
        if existing.is_some() {
            return Err(RateError::AlreadyWatched(detail.id.clone()));
        }
        let rating = UserRating::new(value)?;
        let changed = self.rating.set(rating);
        debug!(rating = value, revisions = self.rating.revisions, changed, "Pending rating updated");
        Ok(changed)
    }

    /// Build the record the current rating would commit.
    pub fn draft_record(&self) -> Result<WatchedRecord, CommitError> {
        let detail = self.detail().ok_or(CommitError::NotReady)?;
        let user_rating = self.rating.rating.ok_or(CommitError::NoRating)?;
        let runtime_minutes = detail.runtime_minutes()?;

        Ok(WatchedRecord {
            id: detail.id.clone(),
            title: detail.title.clone(),
            year: detail.year.clone(),
            poster_url: detail.poster_url.clone(),
            imdb_rating: detail.imdb_rating_value(),
            runtime_minutes,
            user_rating,
            rating_revision_count: self.rating.revisions,
        })
    }

    /// Append the rated movie to `store` and clear the selection.
    ///
    /// Membership is checked against the store as it is now, not as it was
    /// when the detail loaded. On any error the workflow stays as it was.
    pub fn commit<K: KeyValueStore>(&mut self, store: &mut CollectionStore<K>) -> Result<WatchedRecord, CommitError> {
        let detail = self.detail().ok_or(CommitError::NotReady)?;
        if store.contains(&detail.id) {
            return Err(CommitError::AlreadyWatched(detail.id.clone()));
        }

        let record = self.draft_record()?;
        store.append(record.clone())?;
        self.clear();
        Ok(record)
    }

    fn leave_current(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if let Some(handle) = self.in_flight.take() {
            debug!("Cancelling superseded detail request");
            handle.abort();
        }
        self.title = None;
        self.rating = RatingWorkflow::default();
    }
}

impl Drop for DetailAcquisition {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
