use crate::output::Output;
use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use popcorn_core::{RatingView, WatchedSummary};
use popcorn_models::{MovieDetail, SearchResult, WatchedRecord};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while waiting on the catalog. Falls back to a log line when
/// stdout is not a terminal or output is not human-readable.
pub struct Spinner {
    bar: Option<ProgressBar>,
}

impl Spinner {
    pub fn start(message: &str, output: &Output) -> Self {
        if !output.shows_human() || !is_interactive() {
            tracing::info!(operation = "progress", message = %message, "Waiting on catalog");
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
        {
            bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar: Some(bar) }
    }

    pub fn finish(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}

fn styled(mut table: Table) -> Table {
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

pub fn results_table(results: &[SearchResult]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header("#"), header("Title"), header("Year"), header("IMDb id")]);
    for (idx, result) in results.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&result.title),
            Cell::new(&result.year),
            Cell::new(&result.id),
        ]);
    }
    styled(table)
}

pub fn detail_table(detail: &MovieDetail) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header(&detail.title), Cell::new(&detail.id)]);

    let rating = match detail.imdb_rating_value() {
        Some(value) => format!("⭐️ {:.1} IMDb rating", value),
        None => "No IMDb rating".to_string(),
    };
    let rows = [
        ("Released", detail.released.as_str()),
        ("Runtime", detail.runtime.as_str()),
        ("Genre", detail.genre.as_str()),
        ("IMDb", rating.as_str()),
        ("Plot", detail.plot.as_str()),
        ("Starring", detail.actors.as_str()),
        ("Directed by", detail.director.as_str()),
        ("Poster", detail.poster_url.as_str()),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    styled(table)
}

pub fn watched_table(records: &[WatchedRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header("Title"),
        header("Year"),
        header("IMDb"),
        header("You"),
        header("Runtime"),
        header("IMDb id"),
    ]);
    for record in records {
        table.add_row(vec![
            Cell::new(&record.title),
            Cell::new(&record.year),
            Cell::new(
                record
                    .imdb_rating
                    .map(|r| format!("{:.1}", r))
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            Cell::new(record.user_rating.value()),
            Cell::new(format!("{} min", record.runtime_minutes)),
            Cell::new(&record.id),
        ]);
    }
    styled(table)
}

pub fn summary_table(summary: &WatchedSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header("Movies you watched"), Cell::new(summary.count)]);
    table.add_row(vec![Cell::new("⭐️ Avg IMDb rating"), Cell::new(format!("{:.2}", summary.avg_imdb_rating))]);
    table.add_row(vec![Cell::new("🌟 Avg your rating"), Cell::new(format!("{:.2}", summary.avg_user_rating))]);
    table.add_row(vec![Cell::new("⏳ Avg runtime"), Cell::new(format!("{:.0} min", summary.avg_runtime_minutes))]);
    styled(table)
}

/// Ten-star bar for a 1-10 rating
pub fn star_bar(rating: u8) -> String {
    let filled = usize::from(rating.min(10));
    format!("{}{}", "★".repeat(filled), "☆".repeat(10 - filled))
}

/// One-line description of the rating area, if there is anything to rate.
pub fn rating_line(view: &RatingView) -> Option<String> {
    match view {
        RatingView::Unavailable => None,
        RatingView::Pending { rating: None, .. } => Some("Not rated yet".to_string()),
        RatingView::Pending {
            rating: Some(rating),
            revisions,
            ..
        } => Some(format!(
            "Your rating: {} {}/10 (changed {} {})",
            star_bar(rating.value()),
            rating,
            revisions,
            if *revisions == 1 { "time" } else { "times" }
        )),
        RatingView::AlreadyRated { rating } => Some(format!(
            "You rated this movie {} {}/10",
            star_bar(rating.value()),
            rating
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popcorn_models::UserRating;

    #[test]
    fn test_star_bar() {
        assert_eq!(star_bar(3), "★★★☆☆☆☆☆☆☆");
        assert_eq!(star_bar(10), "★★★★★★★★★★");
    }

    #[test]
    fn test_rating_line() {
        assert_eq!(rating_line(&RatingView::Unavailable), None);

        let pending = RatingView::Pending {
            rating: Some(UserRating::new(7).unwrap()),
            revisions: 2,
            can_commit: true,
        };
        let line = rating_line(&pending).unwrap();
        assert!(line.contains("7/10"));
        assert!(line.contains("changed 2 times"));

        let rated = RatingView::AlreadyRated {
            rating: UserRating::new(9).unwrap(),
        };
        assert!(rating_line(&rated).unwrap().starts_with("You rated this movie"));
    }
}
