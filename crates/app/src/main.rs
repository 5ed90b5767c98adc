use std::sync::Arc;

use classifier::{OpenAiClassifier, OpenAiConfig};
use dotenv::dotenv;
use ledger::{Ledger, MemoryLedger, SqliteLedger};
use telegram_bot::AllowList;
use tokio_util::sync::CancellationToken;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "financebot={level},telegram_bot={level},ledger={level},classifier={level}",
            level = settings.log_level
        ))
        .init();

    let ledger: Arc<dyn Ledger> = match settings.database_path() {
        Some(path) => {
            tracing::info!("opening expense database at {path}");
            Arc::new(SqliteLedger::open(path).await?)
        }
        None => {
            tracing::warn!("DATABASE_PATH not set, expenses are kept in memory only");
            Arc::new(MemoryLedger::new())
        }
    };

    let classifier = OpenAiClassifier::new(OpenAiConfig {
        api_key: settings.openai_api_key.clone(),
        api_base: settings.openai_api_base.clone(),
        model: settings.openai_model.clone(),
    })?;
    tracing::info!("classifying expenses with {}", classifier.model());

    let bot = telegram_bot::Bot::builder()
        .token(&settings.telegram_token)
        .allowed_users(AllowList::parse(&settings.authorized_users))
        .classifier(Arc::new(classifier))
        .ledger(ledger.clone())
        .build()?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("shutdown signal received");
                    cancel.cancel();
                }
                Err(err) => tracing::error!("failed to listen for shutdown signal: {err}"),
            }
        }
    });

    let outcome = bot.run(cancel).await;

    if let Err(err) = ledger.close().await {
        tracing::error!("failed to close ledger: {err}");
    }
    tracing::info!("bye");

    outcome.map_err(Into::into)
}
