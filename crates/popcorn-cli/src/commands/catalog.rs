use super::ui::{self, Spinner};
use super::Workspace;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::{DetailState, RatingView, SearchState};
use popcorn_models::{MovieDetail, UserRating};
use serde_json::json;

pub async fn run_search(term: &str, output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let mut app = workspace.headless_app()?;

    app.set_query(term);
    if !app.is_busy() {
        output.warn(format!(
            "Search terms need at least {} characters",
            workspace.config.search.min_query_length
        ));
        return Ok(());
    }

    let spinner = Spinner::start(&format!("Searching for '{}'...", term.trim()), output);
    app.settle().await;
    spinner.finish();

    match app.search_state() {
        SearchState::Ready { term, results } => {
            if results.is_empty() {
                output.info(format!("No movies found for '{}'", term));
            } else {
                output.println(format!("Found {} results", results.len()));
                output.println(ui::results_table(results).to_string());
            }
            output.data("search_results", results);
            Ok(())
        }
        SearchState::Failed { message, .. } => Err(color_eyre::eyre::eyre!("Search failed: {}", message)),
        SearchState::Idle | SearchState::Loading { .. } => Ok(()),
    }
}

pub async fn run_show(id: &str, output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let mut app = workspace.headless_app()?;

    let detail = load_detail(&mut app, id, output).await?;
    let rating = app.rating_view();

    output.println(ui::detail_table(&detail).to_string());
    if let RatingView::AlreadyRated { .. } = rating {
        if let Some(line) = ui::rating_line(&rating) {
            output.println(line);
        }
    }

    let user_rating = match rating {
        RatingView::AlreadyRated { rating } => Some(rating),
        _ => None,
    };
    output.data("movie", &json!({ "detail": detail, "userRating": user_rating }));
    Ok(())
}

pub async fn run_rate(id: &str, rating: u8, output: &Output) -> Result<()> {
    // Reject bad input before touching the network
    UserRating::new(rating).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let workspace = Workspace::load()?;
    let mut app = workspace.headless_app()?;

    let detail = load_detail(&mut app, id, output).await?;
    if let RatingView::AlreadyRated { rating } = app.rating_view() {
        output.warn(format!(
            "{} is already in your watched list, rated {}/10",
            detail.title, rating
        ));
        return Ok(());
    }

    app.set_rating(rating).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;
    let record = app
        .commit_rating()
        .map_err(|e| color_eyre::eyre::eyre!("Could not add {}: {}", detail.title, e))?;

    output.success(format!(
        "Added {} ({}) to your watched list: {} {}/10",
        record.title,
        record.year,
        ui::star_bar(record.user_rating.value()),
        record.user_rating
    ));
    output.data("watched_record", &record);
    Ok(())
}

async fn load_detail(
    app: &mut popcorn_core::App<popcorn_core::FileKeyValueStore>,
    id: &str,
    output: &Output,
) -> Result<MovieDetail> {
    app.select(id.trim());
    let spinner = Spinner::start(&format!("Loading details for {}...", id.trim()), output);
    app.settle().await;
    spinner.finish();

    match app.detail_state() {
        DetailState::Ready { detail } => Ok(detail.clone()),
        DetailState::Failed { id, message } => Err(color_eyre::eyre::eyre!(
            "Failed to load details for {}: {}",
            id,
            message
        )),
        DetailState::None | DetailState::Loading { .. } => {
            Err(color_eyre::eyre::eyre!("No details loaded for {}", id))
        }
    }
}
