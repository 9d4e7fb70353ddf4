pub mod app;
pub mod detail;
pub mod fetcher;
pub mod keys;
pub mod stats;
pub mod store;
pub mod title;

#[cfg(test)]
mod testing;

pub use app::{App, AppOptions, Command, Update};
pub use detail::{CommitError, DetailAcquisition, DetailState, RateError, RatingView};
pub use fetcher::{CatalogFetcher, SearchState};
pub use keys::{bind, Disposer, FocusTarget, KeyBinding, KeyDispatcher, KeyHost, KeyName, MemoryKeyHost};
pub use stats::{summarize, WatchedSummary};
pub use store::{CollectionStore, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError, WATCHED_NAMESPACE};
pub use title::{MemoryTitle, TitleScope, TitleSink, DEFAULT_TITLE};
