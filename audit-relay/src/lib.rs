//! # audit-relay
//!
//! Relays node lifecycle events from a workflow engine's log stream to a
//! message queue as structured XML audit events.
//!
//! An audit event is published when:
//! - a node starts executing (log message contains `changed state to EXECUTING`)
//! - a node finishes executing (log message contains `changed state to EXECUTED`)
//! - the input ports of an executed node are reported (log message contains
//!   `has inputs from nodes: `)
//! - the parameter settings of an executed node are reported (log message
//!   embeds the node settings document); the keys included in the event are
//!   controlled by the `interesting_keys` configuration
//! - an error-level record is logged inside a node execution scope
//!
//! Delivery is fail-fast: each event is sent and acknowledged individually,
//! and any configuration, connection, or publish failure carries a
//! documented process exit code ([`error::Error::exit_code`]). Events are
//! never buffered, retried, or dropped silently.
//!
//! ## Example
//!
//! ```rust,no_run
//! use audit_relay::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     // Establish the broker session
//!     let relay = AuditRelay::connect(&config).await?;
//!
//!     // Relay one record
//!     let record = LogRecord::new(
//!         "Node 0:1 changed state to EXECUTED",
//!         LogLevel::Info,
//!         1_625_097_600_000,
//!     )
//!     .with_context(ExecutionContext::new(
//!         Some("0:1".into()),
//!         "job-1",
//!         "Row Filter",
//!     ));
//!     relay.process(&record).await?;
//!
//!     relay.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod observability;
pub mod publisher;
pub mod relay;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::audit::{
        classify, AuditAction, AuditLayout, ExecutionContext, LogLevel, LogRecord,
    };
    pub use crate::config::{AuditConfig, BrokerConfig, Config, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::publisher::QueuePublisher;
    pub use crate::relay::AuditRelay;
}
