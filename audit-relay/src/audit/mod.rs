//! Audit event classification and XML layout
//!
//! A record is auditable when the engine logged it inside a node execution
//! scope and it matches one of five lifecycle actions:
//!
//! - a node started executing (message contains `changed state to EXECUTING`)
//! - a node finished executing (message contains `changed state to EXECUTED`)
//! - the input ports of an executed node (message contains
//!   `has inputs from nodes: `)
//! - the parameter settings of an executed node (message embeds the node
//!   settings document); which settings keys end up in the audit event is
//!   controlled by the configured allow-list
//! - an error occurred (error-level record with none of the markers)
//!
//! Classification is first-match-wins in that order, so a state-change
//! record is never downgraded to a generic error event. Auditable records
//! render to a fixed-schema `<auditevent>` document; everything else
//! renders to `None`.

pub mod action;
pub mod layout;
pub mod record;
pub(crate) mod settings;

pub use action::{classify, AuditAction};
pub use layout::{AuditLayout, MISSING_NODE_ID};
pub use record::{ExecutionContext, LogLevel, LogRecord};
