use clap::{ArgAction, Parser, Subcommand};
use commands::{catalog, config, session, watched};
use popcorn_config::{Config, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - Search movies, rate them and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the movie catalog
    #[command(long_about = "Search the OMDb catalog by title. Terms shorter than the configured minimum (3 characters by default) are not sent to the catalog.")]
    Search {
        /// Title to search for
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Show details for a movie
    Show {
        /// IMDb id, e.g. tt1375666
        id: String,
    },
    /// Rate a movie and add it to your watched list
    #[command(long_about = "Load a movie's details, rate it from 1 to 10 and add it to your watched list. Movies already in the list keep their original rating.")]
    Rate {
        /// IMDb id, e.g. tt1375666
        id: String,

        /// Your rating, 1-10
        rating: u8,
    },
    /// List the movies you have watched
    Watched,
    /// Remove a movie from your watched list
    Remove {
        /// IMDb id of the movie to remove
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
    /// Show statistics over your watched list
    Stats,
    /// Interactive search and rating session
    #[command(long_about = "Start an interactive session. Type a title to search, then use ':open N' to see details, ':rate N' and ':add' to add the movie to your watched list. Type ':help' for all commands.")]
    Session,
    /// Manage configuration and the OMDb API key
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Store the OMDb API key
    #[command(long_about = "Store the OMDb API key in the credentials file. If no key is given it is read from a hidden prompt. The OMDB_API_KEY environment variable takes precedence over the stored key.")]
    SetKey {
        /// API key (if not provided, will prompt)
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let path_manager = PathManager::default();
    // A broken config file is reported by the command that needs it, not here
    let logging_config = Config::load_or_default(&path_manager.config_file())
        .map(|config| config.logging)
        .unwrap_or_default();

    // The interactive session logs to a file so log lines do not interleave with the prompt
    let log_file = match cli.command {
        Commands::Session => Some(path_manager.session_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, &logging_config, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { term } => catalog::run_search(&term.join(" "), &output).await,
        Commands::Show { id } => catalog::run_show(&id, &output).await,
        Commands::Rate { id, rating } => catalog::run_rate(&id, rating, &output).await,
        Commands::Watched => watched::run_list(&output),
        Commands::Remove { id, yes } => watched::run_remove(&id, yes, &output),
        Commands::Stats => watched::run_stats(&output),
        Commands::Session => session::run_session(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
