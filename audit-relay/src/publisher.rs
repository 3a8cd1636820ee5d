//! Queue publishing over NATS JetStream
//!
//! One acknowledged message per audit event: the send and the awaited
//! broker acknowledgment form the transactional unit. The publish path has
//! no retry, no buffering, and no partial delivery; a failed publish is
//! fatal to the host process.

use std::time::Duration;

use async_nats::jetstream;
use tokio::sync::Mutex;

use crate::config::BrokerConfig;
use crate::error::{Error, Result};

/// Transactional-style publisher bound to a single subject
///
/// The connection, JetStream context, and subject are process-wide state:
/// created once at startup, released once at shutdown. Publishes are
/// serialized through an internal mutex, so the publisher is safe to share
/// even when the host delivers records from multiple threads.
#[derive(Debug)]
pub struct QueuePublisher {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    subject: String,
    publish_lock: Mutex<()>,
}

impl QueuePublisher {
    /// Establish the broker session and bind the publish subject.
    ///
    /// The initial connection is retried with exponential backoff up to
    /// `max_retries` times before the startup is declared fatal. The
    /// publish path never retries.
    pub async fn connect(config: &BrokerConfig) -> Result<Self> {
        if config.queue.is_empty() {
            return Err(Error::InvalidConfig(
                "broker queue name must not be empty".to_string(),
            ));
        }

        let client = connect_with_retries(config, config.max_retries).await?;
        let jetstream = jetstream::new(client.clone());

        Ok(Self {
            client,
            jetstream,
            subject: config.queue.clone(),
            publish_lock: Mutex::new(()),
        })
    }

    /// Publish one audit document and await the broker acknowledgment.
    pub async fn publish(&self, document: &str) -> Result<()> {
        let _guard = self.publish_lock.lock().await;

        let ack = self
            .jetstream
            .publish(self.subject.clone(), document.to_owned().into())
            .await
            .map_err(|e| Error::Publish(format!("send to '{}' failed: {}", self.subject, e)))?;

        ack.await.map_err(|e| {
            Error::Publish(format!(
                "broker did not acknowledge publish to '{}': {}",
                self.subject, e
            ))
        })?;

        tracing::debug!(subject = %self.subject, "audit event published");
        Ok(())
    }

    /// The subject audit events are published to
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Drain and close the broker connection.
    ///
    /// Errors during close are logged, not escalated.
    pub async fn shutdown(self) {
        if let Err(e) = self.client.drain().await {
            tracing::warn!("error draining broker connection: {}", e);
        }
    }
}

/// Connect with configurable retries
///
/// Uses exponential backoff between attempts
async fn connect_with_retries(config: &BrokerConfig, max_retries: u32) -> Result<async_nats::Client> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_connect(config).await {
            Ok(client) => {
                if attempt > 0 {
                    tracing::info!(
                        "broker connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!("connected to broker at {}", config.url);
                }
                return Ok(client);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    tracing::error!(
                        "failed to connect to broker after {} attempts: {}",
                        max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));

                tracing::warn!(
                    "broker connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Attempt to connect to the broker (single try)
async fn try_connect(config: &BrokerConfig) -> Result<async_nats::Client> {
    let mut opts = async_nats::ConnectOptions::new();

    if let Some(name) = &config.name {
        opts = opts.name(name);
    }

    opts = opts.max_reconnects(Some(config.max_reconnects));

    opts.connect(&config.url).await.map_err(|e| {
        Error::Broker(format!(
            "failed to connect to broker at '{}': {}",
            config.url, e
        ))
    })
}
