mod cli;
mod config;
mod engine;
mod error;
mod locale;
mod logging;
mod metrics;
mod model;
mod notify;
mod orchestrator;
mod text_summary;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let is_headless = args.is_headless();

    if is_headless {
        logging::init_stderr();
    } else {
        #[cfg(feature = "tui")]
        {
            // Without a log file the TUI simply runs unlogged.
            let _ = logging::init_file();
        }
    }

    match cli::run(args).await {
        Ok(()) => {
            // Explicitly exit with code 0 on success for the non-TUI modes
            if is_headless {
                std::process::exit(0);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "forge-progress failed");
            Err(e)
        }
    }
}
