//! The relay: classification, layout, and publishing in one handle
//!
//! The host logging framework hands each record to [`AuditRelay::process`]
//! on the thread that produced it. Non-auditable records are dropped
//! cheaply; auditable ones are rendered and published before the call
//! returns. Any publish error must stop the host: the relay never keeps
//! running after a failed publish.

use crate::audit::{classify, AuditAction, AuditLayout, LogRecord};
use crate::config::Config;
use crate::error::Result;
use crate::publisher::QueuePublisher;

/// Relays auditable log records to the message queue
pub struct AuditRelay {
    layout: AuditLayout,
    publisher: QueuePublisher,
}

impl AuditRelay {
    /// Build the layout and establish the broker session.
    ///
    /// Fatal on failure: an unreadable or invalid configuration and an
    /// unreachable broker each map to their documented exit codes.
    pub async fn connect(config: &Config) -> Result<Self> {
        let layout = AuditLayout::new(&config.audit)?;
        let publisher = QueuePublisher::connect(&config.broker).await?;

        tracing::info!(
            subject = %publisher.subject(),
            application = %layout.application(),
            "audit relay connected"
        );

        Ok(Self { layout, publisher })
    }

    /// Inspect one record and publish its audit event if it has one.
    ///
    /// Returns the action that was published, or `None` for records that
    /// are not auditable. A publish failure is fatal and must be surfaced
    /// to the top-level run loop unchanged.
    pub async fn process(&self, record: &LogRecord) -> Result<Option<AuditAction>> {
        let Some(action) = classify(record) else {
            return Ok(None);
        };
        let Some(document) = self.layout.render(record, action) else {
            return Ok(None);
        };

        self.publisher.publish(&document).await?;
        tracing::debug!(action = %action, "audit event relayed");
        Ok(Some(action))
    }

    /// The layout used for rendering
    pub fn layout(&self) -> &AuditLayout {
        &self.layout
    }

    /// Release the broker session. Close errors are logged, not escalated.
    pub async fn shutdown(self) {
        self.publisher.shutdown().await;
        tracing::info!("audit relay shut down");
    }
}
