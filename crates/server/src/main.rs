//! Ragline - retrieval-augmented generation over a local corpus
//!
//! Command-line entry point: seed the sample corpus, build the index
//! artifacts, and serve the HTTP query API.

use clap::{Parser, Subcommand};
use ragline::PipelineConfig;
use server::ServerConfig;
use std::path::PathBuf;

const DEFAULT_PIPELINE_CONFIG: &str = "config/ragline.yaml";

#[derive(Parser)]
#[command(name = "ragline")]
#[command(about = "Retrieval-augmented generation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the pipeline configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the corpus store and seed it with the sample documents
    Init,

    /// Embed every stored document and write the index artifacts
    Build,

    /// Start the HTTP query API
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            init_logging(None);
            let config = load_pipeline_config(cli.config.as_deref())?;
            let report = ragline::seed_corpus(&config)?;
            println!(
                "Corpus at {}: {} documents inserted, {} already present",
                config.corpus.store_path.display(),
                report.inserted,
                report.existing
            );
        }
        Commands::Build => {
            init_logging(None);
            let config = load_pipeline_config(cli.config.as_deref())?;
            let report = ragline::build_index(&config).await?;
            println!(
                "Indexed {} documents at dimension {} in {:.2}s",
                report.documents,
                report.dimension,
                report.elapsed.as_secs_f64()
            );
        }
        Commands::Serve => {
            let mut config = ServerConfig::load()?;
            if let Some(path) = cli.config {
                config.pipeline_config = path;
            }
            init_logging(Some(&config));
            server::start_server(config).await?;
        }
    }

    Ok(())
}

fn load_pipeline_config(path: Option<&std::path::Path>) -> anyhow::Result<PipelineConfig> {
    // .env may carry OPENAI_API_KEY for the build step
    dotenvy::dotenv().ok();
    let path = path.unwrap_or_else(|| std::path::Path::new(DEFAULT_PIPELINE_CONFIG));
    Ok(PipelineConfig::load(path)?)
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured log level applies.
fn init_logging(config: Option<&ServerConfig>) {
    let default_level = config
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    match config {
        Some(c) if c.log_json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
    }
}
