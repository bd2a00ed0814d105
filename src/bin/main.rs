use clap::Parser;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommender_rs::config::Config;

#[derive(Parser, Debug)]
#[command(name = "recommender-server")]
#[command(about = "Movie and TV show recommendation backend", long_about = None)]
struct Args {
    #[arg(short, long)]
    config: Option<String>,
    #[arg(short, long)]
    debug: bool,
}

fn init_logging(config: &Config) -> std::io::Result<()> {
    let default_filter = if config.debug_logs {
        "recommender_rs=debug,tower_http=debug"
    } else {
        "recommender_rs=info,tower_http=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.logfile == "stdout" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.logfile)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    config.debug_logs = args.debug;

    if let Err(e) = init_logging(&config) {
        eprintln!("Error opening log file {}: {}", config.logfile, e);
        std::process::exit(1);
    }

    if let Err(e) = recommender_rs::run(config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
