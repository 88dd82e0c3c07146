use clap::Parser;
use pulsecheck::utils::logger;
use pulsecheck::{AppConfig, BundledSpecSource, Bootstrapper, CouchStore};

#[derive(Debug, Parser)]
#[command(name = "pulsecheck")]
#[command(about = "Provisions the feedback databases and loads the domain, tag and score specifications")]
struct Cli {
    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    tracing::info!("Starting pulsecheck bootstrap");

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            std::process::exit(1);
        }
    };

    let store = CouchStore::new(&config.couchdb_url)?;
    let bootstrapper = Bootstrapper::new(store, BundledSpecSource::new());

    match bootstrapper.run(&config).await {
        Ok(result) => {
            tracing::info!(
                "repository ready: {} domain(s), {} tag set(s), score range {}..{}",
                result.domains.domains().count(),
                result.tag_sets.len(),
                result.scores.lowest_score().map(|s| s.value).unwrap_or(0.0),
                result.scores.highest_score().map(|s| s.value).unwrap_or(0.0),
            );
        }
        Err(err) => {
            // The serving layer must not start on a failed bootstrap.
            tracing::error!("Bootstrap failed: {}", err);
            std::process::exit(1);
        }
    }

    Ok(())
}
