use clap::Parser;
use client::network::Client;
use log::info;
use shared::DEFAULT_FRONTEND_ORIGIN;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Session endpoint to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080/ws")]
    server: String,

    /// Origin header to present during the upgrade
    #[arg(short = 'o', long, default_value = DEFAULT_FRONTEND_ORIGIN)]
    origin: String,

    /// Pause between keystrokes in milliseconds
    #[arg(short = 'd', long, default_value = "150")]
    delay_ms: u64,

    /// Probability of a typo before each character
    #[arg(short = 't', long, default_value = "0.0")]
    typo_rate: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let client = Client::connect(
        &args.server,
        &args.origin,
        Duration::from_millis(args.delay_ms),
        args.typo_rate,
    )
    .await?;

    let summary = client.run().await?;

    info!("Session summary: {:?}", summary);
    match summary.outcome {
        Some(outcome) => println!("{}", outcome.verdict_text()),
        None => println!("Session ended without a verdict"),
    }
    if let Some(speed) = summary.speeds.last() {
        println!("Final speed: {}", speed);
    }

    Ok(())
}
