// Relational database feed for search indexing.
//
// Lists document ids as JSON lines on stdout and renders single documents as
// JSON, using a `.properties` configuration file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kodegen_tools_dbfeed::{
    CancellationToken, ConfigMap, DocId, JsonLinesPusher, RenderedDocument, StrategyRegistry,
    open_adaptor,
};
use tracing_subscriber::EnvFilter;

/// Feed relational database rows to a search indexer
#[derive(Parser, Debug)]
#[command(name = "kodegen-dbfeed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the `.properties` configuration file
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Push every document id once and exit
    List,

    /// Push every document id, then push changed ids each poll period
    Poll,

    /// Render one document as JSON
    Content {
        /// Document id as printed by `list`
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let Cli { config, command } = Cli::parse();
    let map = ConfigMap::load(&config)?;
    let registry = StrategyRegistry::new();

    let cancel = CancellationToken::new();
    let adaptor = open_adaptor(&map, &registry)
        .await
        .with_context(|| format!("failed to start adaptor from {}", config.display()))?
        .with_cancellation(cancel.clone());

    match command {
        Command::List => {
            let pusher = JsonLinesPusher::new(std::io::stdout());
            adaptor.get_doc_ids(&pusher).await?;
        }
        Command::Poll => {
            let pusher = JsonLinesPusher::new(std::io::stdout());
            let mut watermark = adaptor
                .watermark()
                .context("poll requires db.updateSql to be configured")?;
            adaptor.get_doc_ids(&pusher).await?;

            let mut ticker = tokio::time::interval(adaptor.config().incremental_poll_period());
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        cancel.cancel();
                        tracing::info!("shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        // A failed pass keeps the watermark; the next tick retries it
                        if let Err(e) = adaptor.get_modified_doc_ids(&mut watermark, &pusher).await {
                            tracing::warn!("incremental scan failed: {e}");
                        }
                    }
                }
            }
        }
        Command::Content { id } => {
            let mut document = RenderedDocument::new();
            adaptor.get_doc_content(&DocId::new(id), &mut document).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
