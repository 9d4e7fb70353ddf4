use std::sync::{Arc, Mutex};
use tracing::trace;

/// Title shown when no movie detail is on screen
pub const DEFAULT_TITLE: &str = "usePopcorn";

/// Host capability for the window/document title.
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

/// Holds a title for as long as it lives and restores the default on drop.
pub struct TitleScope {
    sink: Arc<dyn TitleSink>,
}

impl TitleScope {
    pub fn acquire(sink: Arc<dyn TitleSink>, title: &str) -> Self {
        trace!(title, "Applying display title");
        sink.set_title(title);
        Self { sink }
    }
}

impl Drop for TitleScope {
    fn drop(&mut self) {
        trace!("Restoring default display title");
        self.sink.set_title(DEFAULT_TITLE);
    }
}

/// Keeps the current title in memory; used by the CLI session and tests.
#[derive(Debug)]
pub struct MemoryTitle {
    current: Mutex<String>,
}

impl MemoryTitle {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(DEFAULT_TITLE.to_string()),
        }
    }

    pub fn current(&self) -> String {
        self.current
            .lock()
            .map(|title| title.clone())
            .unwrap_or_else(|_| DEFAULT_TITLE.to_string())
    }
}

impl Default for MemoryTitle {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleSink for MemoryTitle {
    fn set_title(&self, title: &str) {
        if let Ok(mut current) = self.current.lock() {
            *current = title.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_restores_default_on_drop() {
        let title = Arc::new(MemoryTitle::new());
        {
            let _scope = TitleScope::acquire(title.clone(), "Movie | Inception");
            assert_eq!(title.current(), "Movie | Inception");
        }
        assert_eq!(title.current(), DEFAULT_TITLE);
    }
}
