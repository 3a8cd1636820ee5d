//! Audit action classification
//!
//! Decides whether a log record represents one of the five auditable node
//! lifecycle actions. Classification is driven by marker substrings the
//! workflow engine embeds in its log messages, falling back to the record's
//! severity for generic error events.

use super::record::{LogLevel, LogRecord};

/// Marker emitted when a node starts executing
pub const EXECUTING_MARKER: &str = "changed state to EXECUTING";

/// Marker emitted when a node finishes executing
pub const EXECUTED_MARKER: &str = "changed state to EXECUTED";

/// Marker preceding the upstream-node list of an executed node
pub const INPUT_PORTS_MARKER: &str = "has inputs from nodes: ";

/// Declaration prologue of an embedded node-settings document
pub const XML_PROLOGUE: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// The auditable node lifecycle actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Node started executing
    Executing,
    /// Node finished executing
    Executed,
    /// Upstream input nodes of an executed node
    InputPorts,
    /// Parameter settings of an executed node
    Parameters,
    /// Error reported during execution
    Error,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Executing => write!(f, "EXECUTING"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::InputPorts => write!(f, "INPUTPORTS"),
            Self::Parameters => write!(f, "PARAMETERS"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Classify a record as one of the auditable actions, or `None`.
///
/// First match wins, in this order: state-change markers, input-ports
/// marker, embedded settings prologue, and finally error severity. A record
/// without an execution context is never auditable, whatever its content.
pub fn classify(record: &LogRecord) -> Option<AuditAction> {
    record.context.as_ref()?;

    let message = &record.message;
    if message.contains(EXECUTING_MARKER) {
        Some(AuditAction::Executing)
    } else if message.contains(EXECUTED_MARKER) {
        Some(AuditAction::Executed)
    } else if message.contains(INPUT_PORTS_MARKER) {
        Some(AuditAction::InputPorts)
    } else if message.contains(XML_PROLOGUE) {
        Some(AuditAction::Parameters)
    } else if record.level == LogLevel::Error {
        Some(AuditAction::Error)
    } else {
        None
    }
}
