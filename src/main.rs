use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rover::config::Config;
use rover::enrich::EnrichmentClient;
use rover::markdown::DocNaming;
use rover::walk::WalkPipeline;
use rover::{doctor, features};

#[derive(Parser)]
#[command(name = "rover")]
#[command(about = "Turn a source tree into a Markdown documentation corpus")]
struct Cli {
    /// Config file (defaults to <config dir>/rover/config.json if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wrap every source file under ROOT in Markdown and append a diagram
    Docs {
        root: PathBuf,

        /// Package only; skip the enrichment service
        #[arg(long)]
        no_enrich: bool,

        /// Stop at the first failing file
        #[arg(long)]
        fail_fast: bool,

        /// How documents are named: "append" (a.go.md) or "replace" (a.md)
        #[arg(long, value_parser = parse_naming)]
        naming: Option<DocNaming>,
    },
    /// Extract structural features from files into <file>.json
    Analyze {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Write a report combining <file>.json with the generated document
    Doctor {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(long, value_parser = parse_naming)]
        naming: Option<DocNaming>,
    },
}

fn parse_naming(s: &str) -> Result<DocNaming, String> {
    DocNaming::from_str(s).ok_or_else(|| format!("unknown naming scheme: {}", s))
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "rover=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Docs {
            root,
            no_enrich,
            fail_fast,
            naming,
        } => {
            if let Some(naming) = naming {
                config.walk.naming = naming;
            }
            config.walk.fail_fast |= fail_fast;

            let mut pipeline = WalkPipeline::new(&config.walk);
            if !no_enrich {
                let client = EnrichmentClient::from_config(&config.enrichment)?;
                tracing::info!("Enriching documents via {}", client.endpoint());
                pipeline = pipeline.with_enricher(Arc::new(client));
            }

            let report = pipeline.run(&root).await?;
            println!("{}", report.summary());

            if !report.is_success() {
                for failure in &report.failures {
                    eprintln!("  {}", failure);
                }
                anyhow::bail!("{} file(s) failed", report.failures.len());
            }
        }
        Commands::Analyze { files } => {
            let mut failed = 0;
            for file in &files {
                match features::analyze_file(file) {
                    Ok((target, record)) => {
                        println!("Analysis result written to {}", target.display());
                        tracing::debug!("{:?}", record);
                    }
                    Err(e) => {
                        tracing::error!("{}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} file(s) failed", failed, files.len());
            }
        }
        Commands::Doctor { files, naming } => {
            let naming = naming.unwrap_or(config.walk.naming);
            let mut failed = 0;
            for file in &files {
                match doctor::diagnose(file, naming) {
                    Ok(target) => println!("Logs written to {}", target.display()),
                    Err(e) => {
                        tracing::error!("{}", e);
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} of {} file(s) failed", failed, files.len());
            }
        }
    }

    Ok(())
}
