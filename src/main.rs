//! Heartcheck: heart disease risk form.
//!
//! Main entry point for the terminal application.

use std::io::IsTerminal;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use heartcheck::adapters::sanitize::SanitizingMakeWriter;
use heartcheck::config::AppConfig;
use heartcheck::tui::App;

fn main() -> Result<()> {
    let config = AppConfig::from_env()?;

    // Writing logs to the terminal would corrupt the TUI (alternate screen),
    // so an interactive session logs to a file by default.
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
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    tracing::info!("Starting Heartcheck...");

    let mut app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            return Err(e);
        }
    };
    app.run()?;

    tracing::info!("Heartcheck shutdown complete.");
    Ok(())
}
