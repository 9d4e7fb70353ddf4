use super::*;
use crate::keys::MemoryKeyHost;
use crate::store::MemoryKeyValueStore;
use crate::testing::{inception, inception_detail, movie_detail, GatedCatalog};
use crate::title::{MemoryTitle, DEFAULT_TITLE};
use popcorn_sources::SourceError;

struct Harness {
    catalog: Arc<GatedCatalog>,
    title: Arc<MemoryTitle>,
    keys: Arc<MemoryKeyHost>,
    app: App<MemoryKeyValueStore>,
}

fn harness() -> Harness {
    let catalog = GatedCatalog::new();
    let title = Arc::new(MemoryTitle::new());
    let keys = Arc::new(MemoryKeyHost::new());
    let app = App::new(
        catalog.clone(),
        MemoryKeyValueStore::new(),
        title.clone(),
        keys.clone(),
        AppOptions::default(),
    );
    Harness { catalog, title, keys, app }
}

async fn open_inception(h: &mut Harness) {
    let gate = h.catalog.gate_detail("tt1375666");
    h.app.select("tt1375666");
    gate.send(Ok(inception_detail())).unwrap();
    assert_eq!(h.app.next_update().await, Some(Update::Detail));
}

#[tokio::test]
async fn test_inception_scenario() {
    let mut h = harness();
    let search = h.catalog.gate_search("Inception");

    h.app.set_query("Inception");
    assert!(matches!(h.app.search_state(), SearchState::Loading { .. }));
    search.send(Ok(vec![inception()])).unwrap();
    assert_eq!(h.app.settle().await, vec![Update::Search]);
    assert!(h.app.results().iter().any(|r| r.id == "tt1375666"));

    let detail = h.catalog.gate_detail("tt1375666");
    h.app.select("tt1375666");
    assert_eq!(h.app.selected_id(), Some("tt1375666"));
    assert!(matches!(h.app.detail_state(), DetailState::Loading { id } if id == "tt1375666"));
    detail.send(Ok(inception_detail())).unwrap();
    h.app.settle().await;
    assert_eq!(h.app.detail().unwrap().title, "Inception");
    assert_eq!(h.title.current(), "Movie | Inception");

    h.app.set_rating(9).unwrap();
    let record = h.app.commit_rating().unwrap();

    assert_eq!(record.id, "tt1375666");
    assert_eq!(record.user_rating.value(), 9);
    assert_eq!(record.rating_revision_count, 1);
    assert_eq!(h.app.selected_id(), None);
    assert_eq!(h.app.watched().len(), 1);
    assert_eq!(h.title.current(), DEFAULT_TITLE);
    assert_eq!(h.app.summary().count, 1);
}

#[tokio::test]
async fn test_rapid_queries_only_apply_last() {
    let mut h = harness();
    let alien = h.catalog.gate_search("Alien");
    let aliens = h.catalog.gate_search("Aliens");

    h.app.set_query("Alien");
    h.app.set_query("Aliens");
    aliens.send(Ok(vec![GatedCatalog::hit("tt0090605", "Aliens")])).unwrap();
    let _ = alien.send(Ok(vec![GatedCatalog::hit("tt0078748", "Alien")]));

    h.app.settle().await;
    assert_eq!(h.app.query(), "Aliens");
    assert_eq!(h.app.results().len(), 1);
    assert_eq!(h.app.results()[0].id, "tt0090605");
}

#[tokio::test]
async fn test_short_query_clears_results_without_request() {
    let mut h = harness();
    let gate = h.catalog.gate_search("Inception");
    h.app.set_query("Inception");
    gate.send(Ok(vec![inception()])).unwrap();
    h.app.settle().await;

    h.app.set_query("In");
    assert!(h.app.results().is_empty());
    assert_eq!(h.catalog.search_calls(), 1);
    assert!(!h.app.is_busy());
}

#[tokio::test]
async fn test_selecting_same_movie_twice_clears_selection() {
    let mut h = harness();
    open_inception(&mut h).await;

    h.app.select("tt1375666");
    assert_eq!(h.app.selected_id(), None);
    assert_eq!(h.app.detail_state(), &DetailState::None);
    assert_eq!(h.title.current(), DEFAULT_TITLE);
}

#[tokio::test]
async fn test_closing_before_detail_arrives() {
    let mut h = harness();
    let gate = h.catalog.gate_detail("tt1375666");
    h.app.select("tt1375666");
    h.app.close_detail();
    let _ = gate.send(Ok(inception_detail()));

    assert!(h.app.settle().await.is_empty());
    assert_eq!(h.app.detail_state(), &DetailState::None);
    assert_eq!(h.title.current(), DEFAULT_TITLE);
}

#[tokio::test]
async fn test_escape_clears_selection() {
    let mut h = harness();
    open_inception(&mut h).await;

    h.keys.press("Escape");
    assert_eq!(h.app.next_update().await, Some(Update::SelectionCleared));
    assert_eq!(h.app.selected_id(), None);
    assert_eq!(h.keys.listener_count("escape"), 0);
}

#[tokio::test]
async fn test_enter_focuses_search_unless_already_focused() {
    let mut h = harness();
    let gate = h.catalog.gate_search("Inception");
    h.app.set_query("Inception");
    gate.send(Ok(vec![inception()])).unwrap();
    h.app.settle().await;

    h.keys.focus(Some(FocusTarget::SearchField));
    h.keys.press("Enter");
    assert!(h.app.settle().await.is_empty());
    assert_eq!(h.app.query(), "Inception");

    h.keys.focus(None);
    h.keys.press("Enter");
    assert_eq!(h.app.next_update().await, Some(Update::FocusSearch));
    assert_eq!(h.app.query(), "");
    assert!(h.app.results().is_empty());
}

#[tokio::test]
async fn test_already_watched_bypasses_rating() {
    let mut h = harness();
    open_inception(&mut h).await;
    h.app.set_rating(8).unwrap();
    h.app.commit_rating().unwrap();

    open_inception(&mut h).await;
    assert!(matches!(h.app.rating_view(), RatingView::AlreadyRated { rating } if rating.value() == 8));
    assert!(matches!(h.app.set_rating(5), Err(RateError::AlreadyWatched(_))));
    assert!(matches!(h.app.commit_rating(), Err(CommitError::AlreadyWatched(_))));
    assert_eq!(h.app.watched().len(), 1);
}

#[tokio::test]
async fn test_unparseable_runtime_keeps_selection() {
    let mut h = harness();
    let gate = h.catalog.gate_detail("tt0000042");
    h.app.select("tt0000042");
    gate.send(Ok(movie_detail("tt0000042", "Lost Reel", "N/A"))).unwrap();
    h.app.settle().await;

    h.app.set_rating(6).unwrap();
    assert!(matches!(h.app.commit_rating(), Err(CommitError::Parse(_))));
    assert_eq!(h.app.selected_id(), Some("tt0000042"));
    assert!(h.app.watched().is_empty());
}

#[tokio::test]
async fn test_delete_and_summary() {
    let mut h = harness();
    open_inception(&mut h).await;
    h.app.set_rating(10).unwrap();
    h.app.commit_rating().unwrap();

    let gate = h.catalog.gate_detail("tt0816692");
    h.app.select("tt0816692");
    gate.send(Ok(movie_detail("tt0816692", "Interstellar", "169 min"))).unwrap();
    h.app.settle().await;
    h.app.set_rating(6).unwrap();
    h.app.commit_rating().unwrap();

    let summary = h.app.summary();
    assert_eq!(summary.count, 2);
    assert!((summary.avg_user_rating - 8.0).abs() < 1e-9);
    assert!((summary.avg_runtime_minutes - 158.5).abs() < 1e-9);

    assert!(h.app.delete_watched("tt1375666").unwrap());
    assert!(!h.app.delete_watched("tt1375666").unwrap());
    assert_eq!(h.app.summary().count, 1);
}

#[tokio::test]
async fn test_search_failure_can_be_dismissed() {
    let mut h = harness();
    let gate = h.catalog.gate_search("Inception");
    h.app.set_query("Inception");
    gate.send(Err(SourceError::Service("Request limit reached!".to_string()))).unwrap();
    h.app.settle().await;

    assert!(matches!(h.app.search_state(), SearchState::Failed { message, .. } if message == "Request limit reached!"));
    h.app.dismiss_error();
    assert_eq!(h.app.search_state(), &SearchState::Idle);
}

#[tokio::test]
async fn test_detail_failure_dismiss_clears_selection() {
    let mut h = harness();
    let gate = h.catalog.gate_detail("tt1375666");
    h.app.select("tt1375666");
    gate.send(Err(SourceError::Status { status: 503, body: String::new() })).unwrap();
    h.app.settle().await;

    assert!(matches!(h.app.detail_state(), DetailState::Failed { .. }));
    h.app.dismiss_error();
    assert_eq!(h.app.selected_id(), None);
}

#[tokio::test]
async fn test_poll_commands_does_not_wait_on_network() {
    let mut h = harness();
    open_inception(&mut h).await;

    let _gate = h.catalog.gate_search("Inception");
    h.app.set_query("Inception");
    h.keys.press("Escape");

    assert_eq!(h.app.poll_commands(), vec![Update::SelectionCleared]);
    assert!(h.app.is_busy());
    assert!(h.app.poll_commands().is_empty());
}
