//! Test doubles shared by the unit tests in this crate.

use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use popcorn_sources::{CatalogSource, SourceError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

type SearchGate = oneshot::Sender<Result<Vec<SearchResult>, SourceError>>;
type DetailGate = oneshot::Sender<Result<MovieDetail, SourceError>>;

/// Catalog whose answers are released by the test, one gate per term or id.
/// Requests without a gate fail.
#[derive(Default)]
pub struct GatedCatalog {
    searches: Mutex<HashMap<String, oneshot::Receiver<Result<Vec<SearchResult>, SourceError>>>>,
    details: Mutex<HashMap<String, oneshot::Receiver<Result<MovieDetail, SourceError>>>>,
    search_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl GatedCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn gate_search(&self, term: &str) -> SearchGate {
        let (tx, rx) = oneshot::channel();
        self.searches.lock().unwrap().insert(term.to_string(), rx);
        tx
    }

    pub fn gate_detail(&self, id: &str) -> DetailGate {
        let (tx, rx) = oneshot::channel();
        self.details.lock().unwrap().insert(id.to_string(), rx);
        tx
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn hit(id: &str, title: &str) -> SearchResult {
        SearchResult {
            id: id.to_string(),
            title: title.to_string(),
            year: "2010".to_string(),
            poster_url: format!("https://img.example/{}.jpg", id),
        }
    }
}

#[async_trait]
impl CatalogSource for GatedCatalog {
    fn source_name(&self) -> &str {
        "gated"
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.searches.lock().unwrap().remove(term);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::Service("gate closed".to_string()))),
            None => Err(SourceError::Service(format!("no gate for '{}'", term))),
        }
    }

    async fn detail(&self, id: &str) -> Result<MovieDetail, SourceError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.details.lock().unwrap().remove(id);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::Service("gate closed".to_string()))),
            None => Err(SourceError::Service(format!("no gate for '{}'", id))),
        }
    }
}

pub fn inception() -> SearchResult {
    GatedCatalog::hit("tt1375666", "Inception")
}

pub fn movie_detail(id: &str, title: &str, runtime: &str) -> MovieDetail {
    MovieDetail {
        id: id.to_string(),
        title: title.to_string(),
        year: "2010".to_string(),
        poster_url: format!("https://img.example/{}.jpg", id),
        runtime: runtime.to_string(),
        imdb_rating: "8.8".to_string(),
        plot: "A thief who steals corporate secrets through dream-sharing technology.".to_string(),
        released: "16 Jul 2010".to_string(),
        actors: "Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page".to_string(),
        director: "Christopher Nolan".to_string(),
        genre: "Action, Adventure, Sci-Fi".to_string(),
    }
}

pub fn inception_detail() -> MovieDetail {
    movie_detail("tt1375666", "Inception", "148 min")
}
