use anyhow::Context;
use clap::{Parser, Subcommand};
use feed_syndication::{InMemoryRepository, SyndicationConfig, SyndicationPipeline};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "FEED_SYNDICATION_CONFIG";

#[derive(Parser)]
#[command(name = "feed-syndication", about = "Render partner XML feeds from a content fixture")]
struct Cli {
    /// TOML config; falls back to $FEED_SYNDICATION_CONFIG, then built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one destination's feed
    Render {
        #[arg(long)]
        destination: String,
        /// JSON content fixture
        #[arg(long)]
        content: PathBuf,
        /// Write the document here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List registered destinations
    List,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<SyndicationConfig> {
    let path = path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => SyndicationConfig::load(&path).with_context(|| format!("loading {}", path.display())),
        None => Ok(SyndicationConfig::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Command::Render {
            destination,
            content,
            output,
        } => {
            let repository = InMemoryRepository::load(&content)
                .with_context(|| format!("loading content fixture {}", content.display()))?;
            let pipeline = SyndicationPipeline::builder(config, Arc::new(repository)).build()?;

            let response = pipeline.generate(&destination).await.map_err(|e| {
                error!(kind = ?e.kind(), "Failed to render {}: {}", destination, e);
                e
            })?;
            info!("Content-Type: {}", response.content_type);
            info!("Expires: {}", response.expires);

            match output {
                Some(path) => {
                    std::fs::write(&path, &response.body).with_context(|| format!("writing {}", path.display()))?;
                    info!("Wrote {} feed to {}", destination, path.display());
                }
                None => println!("{}", response.body),
            }
        }
        Command::List => {
            let pipeline = SyndicationPipeline::builder(config, Arc::new(InMemoryRepository::default())).build()?;
            for descriptor in pipeline.registry().descriptors() {
                println!(
                    "{:<10} {:<10} {:<8} page={:<3} types={}",
                    descriptor.id,
                    descriptor.label,
                    if descriptor.enabled { "enabled" } else { "disabled" },
                    descriptor.page_size,
                    descriptor.target_content_types.join(",")
                );
            }
        }
    }

    Ok(())
}
