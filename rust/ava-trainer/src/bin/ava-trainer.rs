use std::io::IsTerminal;

use anyhow::{Context, Result};
use ava_trainer::cli::{TrainerCli, TrainerCommand};
use ava_trainer::terminal::{run_feed, run_tagger};
use ava_trainer::{ConversationFeed, RestSentenceStore, Trainer, WebSocketConnector};
use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = TrainerCli::parse();
    let config = cli.config();
    let mut stdout = tokio::io::stdout();

    match cli.command {
        TrainerCommand::Tag {
            sentence_id,
            assignment_id,
        } => {
            let trainer = Trainer::with_config(RestSentenceStore::new(&config), &config);
            let stdin = BufReader::new(tokio::io::stdin());
            let colored = std::io::stdout().is_terminal();
            run_tagger(
                &trainer,
                stdin,
                &mut stdout,
                sentence_id,
                assignment_id,
                colored,
            )
            .await
        }
        TrainerCommand::Feed { .. } => {
            let (feed, events) = ConversationFeed::from_config(WebSocketConnector, &config)
                .with_context(|| format!("cannot follow conversations on {}", config.endpoint))?;
            run_feed(feed, events, &mut stdout).await
        }
    }
}
