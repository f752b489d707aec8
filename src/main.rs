//! HeartCheck: heart-disease risk screening form.
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartcheck::adapters::sanitize::SanitizingMakeWriter;
use heartcheck::tui::App;
use heartcheck::AppConfig;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen).
    let interactive = std::io::stdout().is_terminal();
    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: a missing directory surfaces as the open error below.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::info!("Starting HeartCheck...");

    // Artifact load failures are fatal: no form is shown without a model.
    let mut app = App::new(&config)?;
    app.run()?;

    tracing::info!("HeartCheck shutdown complete.");
    Ok(())
}
