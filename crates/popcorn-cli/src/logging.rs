use anyhow::Result;
use popcorn_config::LoggingConfig;
use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive for the given verbosity.
/// 0 = configured level, 1 = debug (hyper connection chatter suppressed), 2+ = trace
fn filter_directive(verbose_level: u8, quiet: bool, configured_level: &str) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose_level {
        0 => configured_level.to_string(),
        1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn".to_string(),
        _ => "trace".to_string(),
    }
}

pub fn init_logging_with_file(
    verbose_level: u8,
    quiet: bool,
    settings: &LoggingConfig,
    log_file: Option<PathBuf>,
) -> Result<()> {
    let directive = filter_directive(verbose_level, quiet, &settings.level);
    let filter = if quiet {
        EnvFilter::new(directive)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
    };

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| settings.json || !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    if let Some(log_path) = log_file {
        let log_dir = log_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
        std::fs::create_dir_all(log_dir)?;

        let log_filename = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

        // popcorn.log rotates to popcorn.2026-01-17 and so on
        let log_prefix = log_filename.rsplitn(2, '.').nth(1).unwrap_or(log_filename);
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(file_appender);

            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false)
                .with_writer(file_appender);

            registry.with(fmt_layer).init();
        }
    } else if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(io::stderr);

        registry.with(fmt_layer).init();
    }

    Ok(())
}
