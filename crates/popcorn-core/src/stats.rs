use popcorn_models::WatchedRecord;
use serde::Serialize;

/// Aggregates over the watched collection. Every mean is 0.0 when there is
/// nothing to average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub avg_imdb_rating: f64,
    pub avg_user_rating: f64,
    pub avg_runtime_minutes: f64,
}

pub fn summarize(records: &[WatchedRecord]) -> WatchedSummary {
    // Records without an IMDb rating only drop out of that one mean
    let imdb: Vec<f64> = records.iter().filter_map(|r| r.imdb_rating).collect();
    let user: Vec<f64> = records.iter().map(|r| f64::from(r.user_rating.value())).collect();
    let runtime: Vec<f64> = records.iter().map(|r| f64::from(r.runtime_minutes)).collect();

    WatchedSummary {
        count: records.len(),
        avg_imdb_rating: mean(&imdb),
        avg_user_rating: mean(&user),
        avg_runtime_minutes: mean(&runtime),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
