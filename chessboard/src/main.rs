use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chessboard::config::{self, ClientConfig};
use chessboard::session::SessionMode;

#[derive(Parser)]
#[command(name = "chessboard", about = "Terminal chess board backed by a remote engine")]
struct Cli {
    /// Backend base URL (overrides CHESSBOARD_BACKEND_URL).
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Per-request timeout in seconds (overrides CHESSBOARD_REQUEST_TIMEOUT_SECS).
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play against the engine.
    Play,
    /// Evaluate every move you make.
    Analyze,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "chessboard");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mode = match cli.command {
        Some(Commands::Analyze) => SessionMode::Analysis,
        Some(Commands::Play) | None => SessionMode::Play,
    };
    let config = ClientConfig::from_env().with_overrides(cli.backend_url, cli.timeout_secs);

    println!("chessboard - {mode} mode, backend at {}", config.backend_url);
    println!("Debug logs: {}/chessboard.YYYY-MM-DD", log_dir.display());

    chessboard::terminal::run(config, mode).await
}
