//! Partyline TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # Start with a prefilled nickname and a custom avatar
//! partyline --nickname Ann --avatar ~/me.png
//!
//! # Keep a debug log while the terminal UI runs
//! RUST_LOG=debug partyline --log-file partyline.log
//! ```

use std::{fs::File, path::PathBuf, sync::Mutex, time::Duration};

use clap::Parser;
use partyline_app::{App, Runtime};
use partyline_client::LocalServer;
use partyline_tui::{TerminalDriver, avatar};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Partyline terminal chat client
#[derive(Parser, Debug)]
#[command(name = "partyline")]
#[command(about = "Terminal front-end for Partyline chat rooms")]
#[command(version)]
struct Args {
    /// Nickname to prefill in the lobby
    #[arg(short, long)]
    nickname: Option<String>,

    /// Image file to use as avatar
    #[arg(short, long)]
    avatar: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Redraw interval in milliseconds when idle
    #[arg(long, default_value = "100")]
    tick_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
        let writer = Mutex::new(File::create(path)?);

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(writer).with_ansi(false))
            .with(filter)
            .init();
    }

    let mut app = App::new();
    if let Some(nickname) = args.nickname {
        app.set_nickname(nickname);
    }
    if let Some(path) = &args.avatar {
        app.set_avatar(avatar::load_custom(path)?);
    }

    tracing::info!("Partyline starting");

    let server = LocalServer::spawn();
    let (client, events) = server.connect();

    let driver = TerminalDriver::new(Duration::from_millis(args.tick_ms))?;
    let result = Runtime::new(driver, app, client, events).run().await;

    server.shutdown();
    tracing::info!("Partyline stopped");

    Ok(result?)
}
