//! Telegram bot.
//!
//! The bot turns chat messages into expense records: free text and `/add`
//! go through the classifier into the ledger, `/stats` reads the last week
//! back. Only allow-listed usernames get an answer.

use std::sync::Arc;

use classifier::Classifier;
use ledger::Ledger;
use tokio_util::sync::CancellationToken;

mod access;
mod commands;
mod pipeline;
mod transport;
mod ui;

pub use access::{AccessPolicy, AllowList, DEFAULT_ALLOWED_USER};
pub use pipeline::Pipeline;
pub use transport::{Inbound, TelegramTransport, Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub struct Bot {
    token: String,
    pipeline: Pipeline,
}

impl Bot {
    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Polls Telegram until `cancel` fires.
    ///
    /// Fails only when the bot cannot start; errors while running are
    /// logged and the loop keeps going.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), BotError> {
        tracing::info!("Starting telegram bot...");

        let mut transport = TelegramTransport::new(&self.token)?;
        transport.announce().await?;

        self.pipeline.run(&mut transport, &cancel).await;
        Ok(())
    }
}

#[derive(Default)]
pub struct BotBuilder {
    token: String,
    allowed_users: AllowList,
    classifier: Option<Arc<dyn Classifier>>,
    ledger: Option<Arc<dyn Ledger>>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_users(mut self, allowed_users: AllowList) -> BotBuilder {
        self.allowed_users = allowed_users;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn Classifier>) -> BotBuilder {
        self.classifier = Some(classifier);
        self
    }

    pub fn ledger(mut self, ledger: Arc<dyn Ledger>) -> BotBuilder {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Result<Bot, BotError> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err(BotError::Missing("telegram token"));
        }
        let classifier = self.classifier.ok_or(BotError::Missing("classifier"))?;
        let ledger = self.ledger.ok_or(BotError::Missing("ledger"))?;

        tracing::info!(
            "authorized users: {}",
            self.allowed_users.users().collect::<Vec<_>>().join(", ")
        );

        Ok(Bot {
            token: self.token,
            pipeline: Pipeline::new(Arc::new(self.allowed_users), classifier, ledger),
        })
    }
}

#[cfg(test)]
mod tests {
    use ledger::MemoryLedger;

    use super::*;

    struct NoClassifier;

    #[async_trait::async_trait]
    impl Classifier for NoClassifier {
        async fn extract(&self, _text: &str) -> Result<ledger::Record, classifier::ClassifierError> {
            Err(classifier::ClassifierError::NoResult)
        }
    }

    #[test]
    fn builder_requires_every_part() {
        let err = Bot::builder().build().err().unwrap();
        assert_eq!(err.to_string(), "telegram token is required");

        let err = Bot::builder().token("123:abc").build().err().unwrap();
        assert_eq!(err.to_string(), "classifier is required");

        let err = Bot::builder()
            .token("123:abc")
            .classifier(Arc::new(NoClassifier))
            .build()
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "ledger is required");
    }

    #[tokio::test]
    async fn built_bot_uses_the_allow_list() {
        let bot = Bot::builder()
            .token("123:abc")
            .allowed_users(AllowList::parse("alice"))
            .classifier(Arc::new(NoClassifier))
            .ledger(Arc::new(MemoryLedger::new()))
            .build()
            .unwrap();
        let cancel = CancellationToken::new();

        let from = |sender: &str| Inbound {
            sender: Some(sender.to_string()),
            chat_id: 7,
            text: Some("/stats".to_string()),
        };
        assert_eq!(bot.pipeline().handle(&from("bob"), &cancel).await, None);
        assert_eq!(
            bot.pipeline().handle(&from("alice"), &cancel).await.as_deref(),
            Some("No expenses recorded in the last 7 days.")
        );
    }
}
