use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { force } => init_config(force, output),
        ConfigCommands::SetKey { key } => set_api_key(key, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'popcorn config init' to write them to disk.");
    }

    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

    let key_source = api_key_source(&cred_store);
    let api_key = cred_store.resolve_omdb_api_key().unwrap_or_default();
    let api_key_display = if full { api_key.clone() } else { mask_string(&api_key) };
    let data_dir = config.data_dir(path_manager.data_dir());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "usePopcorn configuration".bright_cyan().bold());
            println!("{}", "─".repeat(24).bright_cyan());

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Config File").add_attribute(Attribute::Bold),
                Cell::new(config_file.display().to_string()),
            ]);
            let rows = [
                ("OMDb URL", config.omdb.base_url.clone()),
                ("Request timeout", format!("{}s", config.omdb.timeout_seconds)),
                ("API key", format!("{} ({})", api_key_display, key_source)),
                ("Min. query length", config.search.min_query_length.to_string()),
                ("Watched list", data_dir.display().to_string()),
                ("Log level", config.logging.level.clone()),
                ("JSON logs", config.logging.json.to_string()),
            ];
            for (label, value) in rows {
                table.add_row(vec![Cell::new(label).fg(Color::Cyan), Cell::new(value)]);
            }
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.data(
                "config",
                &json!({
                    "config_file": config_file.display().to_string(),
                    "omdb": {
                        "base_url": config.omdb.base_url,
                        "timeout_seconds": config.omdb.timeout_seconds,
                        "api_key": api_key_display,
                        "api_key_source": key_source,
                    },
                    "search": { "min_query_length": config.search.min_query_length },
                    "storage": { "data_dir": data_dir.display().to_string() },
                    "logging": { "level": config.logging.level, "json": config.logging.json },
                }),
            );
        }
    }

    Ok(())
}

fn init_config(force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let config_file = path_manager.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at {}", config_file.display()));
        output.info("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}

fn set_api_key(key_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create configuration directories: {}", e))?;

    let key = match key_arg {
        Some(key) => key.trim().to_string(),
        None => prompts::prompt_secret("OMDb API key")?,
    };
    validate_api_key(&key).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let credentials_file = path_manager.credentials_file();
    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    cred_store.set_omdb_api_key(key);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success("OMDb API key saved");
    if std::env::var(API_KEY_ENV).is_ok() {
        output.warn(format!("{} is set and takes precedence over the stored key", API_KEY_ENV));
    }
    Ok(())
}

fn api_key_source(cred_store: &CredentialStore) -> &'static str {
    if std::env::var(API_KEY_ENV).map(|v| !v.trim().is_empty()).unwrap_or(false) {
        "environment"
    } else if cred_store.get_omdb_api_key().is_some() {
        "credentials file"
    } else {
        "not set"
    }
}

fn validate_api_key(input: &str) -> Result<(), &'static str> {
    if input.is_empty() {
        return Err("API key cannot be empty");
    }
    if input.chars().any(char::is_whitespace) {
        return Err("API key cannot contain whitespace");
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}
