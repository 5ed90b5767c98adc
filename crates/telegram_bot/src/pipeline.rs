//! Per-message processing.
//!
//! Each inbound message goes through intake, authorization and routing and
//! yields at most one reply. Messages are handled one at a time, so replies
//! leave in the order messages arrived.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use classifier::Classifier;
use ledger::Ledger;
use tokio_util::sync::CancellationToken;

use crate::{
    access::AccessPolicy,
    commands::{Command, parse_command},
    transport::{Inbound, Transport, TransportError},
    ui,
};

/// Pause after a failed long poll before asking again.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct Pipeline {
    policy: Arc<dyn AccessPolicy>,
    classifier: Arc<dyn Classifier>,
    ledger: Arc<dyn Ledger>,
}

impl Pipeline {
    pub fn new(
        policy: Arc<dyn AccessPolicy>,
        classifier: Arc<dyn Classifier>,
        ledger: Arc<dyn Ledger>,
    ) -> Self {
        Self {
            policy,
            classifier,
            ledger,
        }
    }

    /// Drains `transport` until `cancel` fires or the transport closes.
    ///
    /// Cancellation is observed while waiting for messages and between
    /// messages. Handled messages are confirmed to the transport before
    /// returning.
    pub async fn run<T>(&self, transport: &mut T, cancel: &CancellationToken)
    where
        T: Transport + ?Sized,
    {
        tracing::info!("dispatch loop started");
        loop {
            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                batch = transport.receive() => batch,
            };

            let batch = match batch {
                Ok(batch) => batch,
                Err(TransportError::Closed) => {
                    tracing::info!("transport closed");
                    break;
                }
                Err(err) => {
                    tracing::warn!("failed to fetch updates: {err}");
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_PAUSE) => continue,
                    }
                }
            };

            for message in batch {
                if cancel.is_cancelled() {
                    break;
                }
                let reply = self.handle(&message, cancel).await;
                // A message abandoned on shutdown stays unconfirmed.
                if reply.is_none() && cancel.is_cancelled() {
                    break;
                }
                if let Some(reply) = reply
                    && let Err(err) = transport.send(message.chat_id, &reply).await
                {
                    tracing::warn!("failed to send message: {err}");
                }
                transport.mark_handled();
            }
        }

        if let Err(err) = transport.shutdown().await {
            tracing::warn!("failed to confirm handled updates: {err}");
        }
        tracing::info!("dispatch loop stopped");
    }

    /// Processes one message and returns the reply to send, if any.
    pub async fn handle(&self, message: &Inbound, cancel: &CancellationToken) -> Option<String> {
        let Some(sender) = message.sender.as_deref() else {
            tracing::info!("skipping message without sender");
            return None;
        };
        if !self.policy.is_allowed(sender) {
            tracing::debug!("dropping message from unauthorized sender {sender:?}");
            return None;
        }
        let Some(text) = message.text.as_deref() else {
            tracing::debug!("ignoring message without text from {sender}");
            return None;
        };

        match parse_command(text) {
            Some(Command::Add("")) => Some(ui::ADD_USAGE.to_string()),
            Some(Command::Add(args)) => self.record_expense(sender, args, cancel).await,
            Some(Command::Stats) => self.stats(cancel).await,
            Some(Command::Unknown(name)) => Some(ui::unknown_command(name)),
            None => self.record_expense(sender, text, cancel).await,
        }
    }

    async fn record_expense(
        &self,
        sender: &str,
        text: &str,
        cancel: &CancellationToken,
    ) -> Option<String> {
        tracing::info!("[{sender}] {text}");

        let Some(extracted) = cancel.run_until_cancelled(self.classifier.extract(text)).await
        else {
            tracing::info!("shutdown requested, abandoning message");
            return None;
        };
        let record = match extracted {
            Ok(record) => record,
            Err(err) => {
                tracing::error!("classification failed: {err}");
                return Some(ui::classification_failed(&err));
            }
        };

        let Some(stored) = cancel.run_until_cancelled(self.ledger.insert(&record)).await else {
            tracing::info!("shutdown requested, abandoning message");
            return None;
        };
        if let Err(err) = stored {
            tracing::error!("failed to store expense: {err}");
            return Some(ui::store_failed(&err));
        }

        Some(ui::render_recorded(&record))
    }

    async fn stats(&self, cancel: &CancellationToken) -> Option<String> {
        let since = Utc::now() - chrono::Duration::days(ui::STATS_WINDOW_DAYS);

        let Some(aggregated) = cancel.run_until_cancelled(self.ledger.aggregate(since)).await
        else {
            tracing::info!("shutdown requested, abandoning message");
            return None;
        };
        let summary = match aggregated {
            Ok(summary) => summary,
            Err(err) => {
                tracing::error!("failed to load stats: {err}");
                return Some(ui::stats_failed(&err));
            }
        };

        if summary.is_empty() {
            return Some(ui::no_expenses());
        }
        Some(ui::render_summary(&summary, since))
    }
}
