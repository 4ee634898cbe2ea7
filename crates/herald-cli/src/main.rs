//! Herald command-line client.
//!
//! Tail live notifications:
//!   HERALD_TOKEN=... cargo run -p herald-cli -- --url ws://localhost:8080/ws tail
//!
//! Browse and manage stored notifications through the REST API:
//!   cargo run -p herald-cli -- --api http://localhost:8080/api --token ... history --user 4

mod cli;
mod tail;

use clap::Parser;
use cli::{Cli, Command};
use herald_client::rest::NotificationApi;
use herald_core::NotificationDraft;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("herald=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;

    match cli.command {
        Command::Tail { ref topics, json } => {
            tail::run(config, cli.token.clone(), topics.clone(), json).await
        }
        Command::History { user, page, size } => {
            let api = NotificationApi::new(cli.api_base(&config)?, &cli.token);
            let page = api.list(user, page, size).await?;
            for record in &page.content {
                println!("{}", tail::format_record(record));
            }
            println!(
                "page {}/{} ({} total)",
                page.number + 1,
                page.total_pages.max(1),
                page.total_elements
            );
            Ok(())
        }
        Command::Read { id } => {
            let api = NotificationApi::new(cli.api_base(&config)?, &cli.token);
            api.mark_read(id).await?;
            tracing::info!("marked {} as read", id);
            Ok(())
        }
        Command::Send {
            user,
            ref category,
            ref content,
        } => {
            let api = NotificationApi::new(cli.api_base(&config)?, &cli.token);
            let mut draft = NotificationDraft::new(content.clone(), user);
            if let Some(category) = category {
                draft.category = category.clone();
            }
            let record = api.create(&draft).await?;
            println!("{}", tail::format_record(&record));
            Ok(())
        }
    }
}
