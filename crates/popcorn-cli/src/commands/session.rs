//! Interactive search and rating session.
//!
//! Plain lines are search terms. Lines starting with `:` are commands. The
//! prompt stands in for the search field, so typing a term gives it focus and
//! opening a movie takes focus away. `:esc` and `:enter` deliver the matching
//! key presses to the app's shortcuts.

use super::ui;
use super::Workspace;
use crate::output::Output;
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_core::{App, DetailState, FileKeyValueStore, FocusTarget, MemoryKeyHost, MemoryTitle, SearchState, Update};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "\
Type a title to search (at least 3 characters).
  :open N     show details for result N (again to close)
  :rate N     rate the open movie 1-10
  :add        add the open movie to your watched list
  :esc        close the open movie
  :enter      jump back to the search field
  :dismiss    hide the last error
  :watched    list your watched movies
  :stats      show watched statistics
  :rm ID      remove a movie from your watched list
  :help       show this help
  :quit       leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Query(String),
    Open(usize),
    Rate(u8),
    Add,
    Escape,
    Enter,
    Dismiss,
    Watched,
    Stats,
    Remove(String),
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match (name.as_str(), arg) {
        ("open" | "o", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::Open(n),
            _ => Input::Invalid(format!("Not a result number: {}", n)),
        },
        ("rate" | "r", Some(n)) => match n.parse::<u8>() {
            Ok(n) => Input::Rate(n),
            Err(_) => Input::Invalid(format!("Not a rating: {}", n)),
        },
        ("rm" | "remove", Some(id)) => Input::Remove(id.to_string()),
        ("add" | "a", None) => Input::Add,
        ("esc" | "escape", None) => Input::Escape,
        ("enter", None) => Input::Enter,
        ("dismiss", None) => Input::Dismiss,
        ("watched" | "w", None) => Input::Watched,
        ("stats", None) => Input::Stats,
        ("help" | "h" | "?", None) => Input::Help,
        ("quit" | "q" | "exit", None) => Input::Quit,
        _ => Input::Invalid(format!("Unknown command ':{}'. Type :help for commands.", command)),
    }
}

enum Event {
    Line(Option<String>),
    Update(Option<Update>),
}

struct Session<'a> {
    app: App<FileKeyValueStore>,
    keys: Arc<MemoryKeyHost>,
    title: Arc<MemoryTitle>,
    shown_title: String,
    output: &'a Output,
}

pub async fn run_session(output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let title = Arc::new(MemoryTitle::new());
    let keys = Arc::new(MemoryKeyHost::new());
    let app = workspace.app(Arc::clone(&title), Arc::clone(&keys))?;

    info!("Interactive session started");
    let mut session = Session {
        shown_title: title.current(),
        app,
        keys,
        title,
        output,
    };
    session.banner();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let busy = session.app.is_busy();
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            update = session.app.next_update(), if busy => Event::Update(update),
        };

        match event {
            Event::Line(None) => break,
            Event::Line(Some(line)) => {
                if !session.handle_line(&line) {
                    break;
                }
            }
            Event::Update(Some(update)) => session.render(update),
            Event::Update(None) => {}
        }
        session.refresh_title();
    }

    info!("Interactive session ended");
    output.println("Bye!");
    Ok(())
}

impl Session<'_> {
    fn banner(&self) {
        self.output.println(format!("{} {}", "🍿".bold(), self.shown_title.bold()));
        self.output.println(HELP);
    }

    /// Returns `false` when the session should end.
    fn handle_line(&mut self, line: &str) -> bool {
        let input = parse_input(line);
        let pressed_enter = input == Input::Enter;
        match input {
            Input::Quit => return false,
            Input::Query(term) if term.is_empty() => {}
            Input::Query(term) => {
                self.keys.focus(Some(FocusTarget::SearchField));
                self.app.set_query(&term);
                if self.app.is_busy() {
                    self.output.println(format!("Searching for '{}'...", term).dimmed().to_string());
                } else {
                    self.output.warn("Type at least 3 characters to search");
                }
            }
            Input::Open(n) => self.open(n),
            Input::Rate(value) => match self.app.set_rating(value) {
                Ok(_) => self.show_rating(),
                Err(e) => self.output.error(e.to_string()),
            },
            Input::Add => match self.app.commit_rating() {
                Ok(record) => self.output.success(format!(
                    "Added {} to your watched list ({}/10)",
                    record.title, record.user_rating
                )),
                Err(e) => self.output.error(e.to_string()),
            },
            Input::Escape => {
                if self.keys.press("Escape") == 0 {
                    self.output.info("No movie is open");
                }
            }
            Input::Enter => {
                self.keys.press("Enter");
            }
            Input::Dismiss => self.app.dismiss_error(),
            Input::Watched => self.show_watched(),
            Input::Stats => {
                let summary = self.app.summary();
                self.output.println(ui::summary_table(&summary).to_string());
            }
            Input::Remove(id) => match self.app.delete_watched(&id) {
                Ok(true) => self.output.success(format!("Removed {} from your watched list", id)),
                Ok(false) => self.output.warn(format!("{} is not in your watched list", id)),
                Err(e) => self.output.error(format!("Failed to update watched list: {}", e)),
            },
            Input::Help => self.output.println(HELP),
            Input::Invalid(message) => self.output.error(message),
        }

        let mut focused = false;
        for update in self.app.poll_commands() {
            focused |= update == Update::FocusSearch;
            self.render(update);
        }
        // The Enter shortcut is skipped while the search field has focus
        if pressed_enter && !focused {
            self.output.info("Already in the search field");
        }
        true
    }

    fn open(&mut self, n: usize) {
        let Some(result) = self.app.results().get(n - 1).cloned() else {
            self.output.error(format!("No result number {}", n));
            return;
        };

        self.keys.focus(None);
        self.app.select(&result.id);
        if self.app.selected_id().is_some() {
            self.output.println(format!("Loading {}...", result.title).dimmed().to_string());
        } else {
            self.output.info(format!("Closed {}", result.title));
        }
    }

    fn render(&mut self, update: Update) {
        match update {
            Update::Search => match self.app.search_state() {
                SearchState::Ready { term, results } if results.is_empty() => {
                    self.output.info(format!("No movies found for '{}'", term));
                }
                SearchState::Ready { results, .. } => {
                    self.output.println(format!("Found {} results", results.len()));
                    self.output.println(ui::results_table(results).to_string());
                }
                SearchState::Failed { message, .. } => {
                    self.output.error(format!("⛔️ {} (:dismiss to hide)", message));
                }
                SearchState::Idle | SearchState::Loading { .. } => {}
            },
            Update::Detail => match self.app.detail_state().clone() {
                DetailState::Ready { detail } => {
                    self.output.println(ui::detail_table(&detail).to_string());
                    self.show_rating();
                }
                DetailState::Failed { message, .. } => {
                    self.output.error(format!("⛔️ {} (:dismiss to close)", message));
                }
                DetailState::None | DetailState::Loading { .. } => {}
            },
            Update::SelectionCleared => self.output.info("Closed movie details"),
            Update::FocusSearch => {
                self.keys.focus(Some(FocusTarget::SearchField));
                self.output.info("Search cleared. Type a title to search.");
            }
            Update::Discarded => debug!("Superseded response dropped"),
        }
    }

    fn show_rating(&mut self) {
        let view = self.app.rating_view();
        if let Some(line) = ui::rating_line(&view) {
            self.output.println(line);
        }
        if let popcorn_core::RatingView::Pending { can_commit: true, .. } = view {
            self.output.println("Type :add to add it to your watched list".dimmed().to_string());
        }
    }

    fn show_watched(&mut self) {
        let records = self.app.watched().to_vec();
        if records.is_empty() {
            self.output.info("Your watched list is empty");
            return;
        }
        self.output.println(ui::watched_table(&records).to_string());
    }

    fn refresh_title(&mut self) {
        let current = self.title.current();
        if current != self.shown_title {
            self.output.println(format!("[{}]", current).bright_black().to_string());
            self.shown_title = current;
        }
    }
}
