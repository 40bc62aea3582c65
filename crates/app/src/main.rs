//! Ascend - Main entry point

use anyhow::{Context, Result};
use ascend_app::commands::{self, Command};
use ascend_app::notifications::{spawn_gift_notifier, spawn_sync_notifier};
use ascend_app::{AppConfig, AppState};
use ascend_core::AccountStore;
use ascend_networking::{AccountClient, ClientConfig, GeneratorClient};
use ascend_persistence::{Database, LocalAccountStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ascend_app=debug,ascend_engine=debug,ascend_core=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ascend");

    if let Err(e) = start().await {
        eprintln!("FATAL: {:#}", e);
        std::process::exit(1);
    }
}

async fn start() -> Result<()> {
    let config = AppConfig::from_env()?;
    let db = Database::connect(&config.database_path())
        .await
        .context("failed to open local database")?;
    tracing::info!("Database ready at {}", config.database_path().display());

    let client_config = config.remote.as_ref().map(|remote| {
        ClientConfig::new(&remote.api_url, &remote.api_key, &remote.access_token)
            .with_timeout(config.http_timeout)
    });
    let generator = client_config
        .as_ref()
        .map(GeneratorClient::new)
        .transpose()?;

    match client_config {
        Some(client_config) if !config.offline => {
            tracing::info!("Using remote account store at {}", client_config.base_url);
            let store = Arc::new(AccountClient::new(client_config)?);
            run(AppState::new(config.user_id, db, store, generator).await?).await
        }
        _ => {
            tracing::info!("Offline mode, account data kept locally");
            let store = Arc::new(LocalAccountStore::new(db.clone()));
            run(AppState::new(config.user_id, db, store, generator).await?).await
        }
    }
}

async fn run<S: AccountStore + 'static>(state: AppState<S>) -> Result<()> {
    let gift_notifier = spawn_gift_notifier(state.gifts.subscribe());
    let sync_notifier = spawn_sync_notifier(state.sync.subscribe());

    state.start_session().await?;
    println!("{}", commands::execute(&state, Command::Status).await?);
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                None
            }
        };

        let Some(line) = line else { break };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => match commands::execute(&state, command).await {
                Ok(output) => println!("{}", output),
                Err(e) => println!("error: {:#}", e),
            },
            Err(e) => println!("{}", e),
        }
    }

    state.shutdown().await;
    gift_notifier.abort();
    sync_notifier.abort();
    Ok(())
}
