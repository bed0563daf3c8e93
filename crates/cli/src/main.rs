use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "livematch")]
#[command(about = "Real-time sports-event tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed and serve the tracker API
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => run_tracker().await?,
    }

    Ok(())
}

async fn run_tracker() -> anyhow::Result<()> {
    let config = livematch_core::ConfigLoader::load()?;

    // RUST_LOG wins over the configured level when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log_level.clone())),
        )
        .init();

    tracing::info!(
        odds = %config.odds_endpoint,
        mappings = %config.mapping_endpoint,
        interval_ms = config.odds_polling_interval_ms,
        "starting tracker"
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let resolver = Arc::new(livematch_feed::MappingResolver::new(
        http.clone(),
        config.mapping_endpoint.clone(),
    ));
    let decoder = Arc::new(livematch_feed::MatchDecoder::new(resolver));
    let projector = Arc::new(livematch_state::LiveStateProjector::new(decoder.clone()));
    let store = Arc::new(livematch_state::MatchHistoryStore::new(decoder));

    let poller = livematch_feed::FeedPoller::new(
        http,
        config.odds_endpoint.clone(),
        Duration::from_millis(config.odds_polling_interval_ms),
    );
    poller.add_listener(projector.clone()).await;
    poller.add_listener(store.clone()).await;
    poller.start().await;

    let server = livematch_web_api::ApiServer::new(projector, store);
    let addr = format!("0.0.0.0:{}", config.port);

    tokio::select! {
        result = server.serve(&addr) => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown requested");
        }
    }

    poller.stop().await;

    Ok(())
}
