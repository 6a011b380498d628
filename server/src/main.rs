use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::SessionServer;
use server::text_source::{FixedText, RandomText, TextSource};
use shared::{DEFAULT_FRONTEND_ORIGIN, WS_PATH};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Path that accepts websocket upgrades
    #[arg(long, default_value = WS_PATH)]
    path: String,

    /// Frontend origin allowed to open sessions
    #[arg(short, long, default_value = DEFAULT_FRONTEND_ORIGIN)]
    origin: String,

    /// Serve this phrase to every session instead of a random one
    #[arg(long, conflicts_with = "corpus_file")]
    phrase: Option<String>,

    /// File with one practice phrase per line
    #[arg(short, long)]
    corpus_file: Option<PathBuf>,

    /// Disconnect clients idle for this many seconds (0 = never)
    #[arg(short, long, default_value = "0")]
    idle_timeout_secs: u64,
}

/// Parses command-line arguments, builds the text source and runs the
/// session server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let text_source: Arc<dyn TextSource> = match (&args.phrase, &args.corpus_file) {
        (Some(phrase), _) => Arc::new(FixedText::new(phrase.clone())?),
        (None, Some(path)) => Arc::new(RandomText::from_file(path)?),
        (None, None) => Arc::new(RandomText::with_default_corpus()),
    };

    let config = ServerConfig::new(&args.host, args.port)
        .with_ws_path(args.path)
        .with_allowed_origin(args.origin)
        .with_idle_timeout(Duration::from_secs(args.idle_timeout_secs));

    info!("Accepting sessions from origin {}", config.allowed_origin);
    if let Some(timeout) = config.idle_timeout {
        info!("Idle sessions are closed after {:?}", timeout);
    }

    let server = SessionServer::bind(config, text_source).await?;

    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
