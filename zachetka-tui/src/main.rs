mod app;
mod config;
mod error;
mod input;
mod ui;

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zachetka_api::{AnyDeadlineSource, ApiClient, MockDeadlineSource};

use crate::app::{App, Tab};
use crate::config::resolve_config;

#[derive(Parser)]
#[command(name = "zk")]
#[command(about = "Student platform client: courses and the deadlines calendar", long_about = None)]
struct Cli {
    /// Serve generated deadlines instead of talking to the platform API
    #[arg(long, global = true)]
    mock: bool,

    /// Base URL of the platform API
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Path to the log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the course list
    Courses,

    /// Open the deadlines calendar
    Calendar,
}

/// The terminal owns stdout, so logs go to a file instead.
fn init_tracing(log_file: &PathBuf) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,zachetka_core=debug,zachetka_api=debug,zachetka_tui=debug")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(cli.mock, cli.base_url, cli.log_file);
    init_tracing(&config.log_file)?;

    let source = if config.mock {
        AnyDeadlineSource::Mock(MockDeadlineSource::new())
    } else {
        let client = match config.base_url {
            Some(url) => ApiClient::with_base_url(url)?,
            None => ApiClient::new()?,
        };
        AnyDeadlineSource::Api(client)
    };

    let tab = match cli.command {
        Some(Command::Calendar) => Tab::Calendar,
        Some(Command::Courses) | None => Tab::Courses,
    };

    let app = App::new(source, tab);
    app::run(app).await?;

    Ok(())
}
