use super::prompts;
use super::ui::{self, is_interactive};
use super::Workspace;
use crate::output::Output;
use color_eyre::Result;
use popcorn_core::summarize;

pub fn run_list(output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let mut collection = workspace.collection();
    let records = collection.load();

    if records.is_empty() {
        output.info("Your watched list is empty. Rate a movie with 'popcorn rate <id> <1-10>'.");
    } else {
        output.println(ui::watched_table(records).to_string());
        output.println(ui::summary_table(&summarize(records)).to_string());
    }
    output.data("watched", &records);
    Ok(())
}

pub fn run_remove(id: &str, yes: bool, output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let mut collection = workspace.collection();

    let title = match collection.find(id) {
        Some(record) => record.title.clone(),
        None => {
            output.warn(format!("{} is not in your watched list", id));
            return Ok(());
        }
    };

    if !yes && output.shows_human() && is_interactive() {
        let confirmed = prompts::prompt_yes_no(&format!("Remove {} ({}) from your watched list?", title, id), Some(false))?;
        if !confirmed {
            output.info("Nothing removed");
            return Ok(());
        }
    }

    collection
        .remove(id)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to update watched list: {}", e))?;
    output.success(format!("Removed {} from your watched list", title));
    Ok(())
}

pub fn run_stats(output: &Output) -> Result<()> {
    let workspace = Workspace::load()?;
    let mut collection = workspace.collection();
    let summary = summarize(collection.load());

    output.println(ui::summary_table(&summary).to_string());
    output.data("stats", &summary);
    Ok(())
}
