//! Log record model
//!
//! The record mirrors what the host logging framework delivers for every
//! log line: the message text, a severity level, an epoch-millisecond
//! timestamp, and (for lines produced inside a node execution scope) the
//! execution context identifying the node and job.

use serde::{Deserialize, Serialize};

/// Severity of a log record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug-level messages
    Debug,
    /// Informational messages
    Info,
    /// Warning conditions
    Warn,
    /// Error conditions
    Error,
    /// Unrecoverable conditions
    Fatal,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Node and job identity attached to a record by the workflow engine
///
/// The fields are private; [`node_id`](Self::node_id),
/// [`job_id`](Self::job_id) and [`node_name`](Self::node_name) are the
/// accessor contract the engine integration must satisfy. A record without
/// an `ExecutionContext` is never auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Identifier of the node within the workflow, absent when the engine
    /// logged outside a node scope
    node_id: Option<String>,
    /// Identifier of the job the node ran under
    job_id: String,
    /// Human-readable node name
    node_name: String,
}

impl ExecutionContext {
    /// Create an execution context
    pub fn new(
        node_id: Option<String>,
        job_id: impl Into<String>,
        node_name: impl Into<String>,
    ) -> Self {
        Self {
            node_id,
            job_id: job_id.into(),
            node_name: node_name.into(),
        }
    }

    /// The node identifier, if the engine attached one
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// The job identifier
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// The node name
    pub fn node_name(&self) -> &str {
        &self.node_name
    }
}

/// A log record delivered by the host logging framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Message text
    pub message: String,

    /// Severity level
    pub level: LogLevel,

    /// Milliseconds since the Unix epoch
    pub timestamp_ms: i64,

    /// Execution context, present only on records produced inside a node
    /// execution scope
    #[serde(default)]
    pub context: Option<ExecutionContext>,
}

impl LogRecord {
    /// Create a record without an execution context
    pub fn new(message: impl Into<String>, level: LogLevel, timestamp_ms: i64) -> Self {
        Self {
            message: message.into(),
            level,
            timestamp_ms,
            context: None,
        }
    }

    /// Attach the execution context
    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = Some(context);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_context_accessors() {
        let context = ExecutionContext::new(Some("0:12".to_string()), "job-9", "CSV Reader");
        assert_eq!(context.node_id(), Some("0:12"));
        assert_eq!(context.job_id(), "job-9");
        assert_eq!(context.node_name(), "CSV Reader");
    }

    #[test]
    fn test_execution_context_without_node_id() {
        let context = ExecutionContext::new(None, "job-9", "CSV Reader");
        assert!(context.node_id().is_none());
    }

    #[test]
    fn test_record_builder() {
        let record = LogRecord::new("hello", LogLevel::Info, 42)
            .with_context(ExecutionContext::new(None, "job", "node"));
        assert_eq!(record.message, "hello");
        assert_eq!(record.level, LogLevel::Info);
        assert_eq!(record.timestamp_ms, 42);
        assert!(record.context.is_some());
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = LogRecord::new("Node 0:1 changed state to EXECUTED", LogLevel::Info, 1000)
            .with_context(ExecutionContext::new(
                Some("0:1".to_string()),
                "job-1",
                "Row Filter",
            ));

        let json = serde_json::to_string(&record).unwrap();
        let deserialized: LogRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.message, record.message);
        assert_eq!(deserialized.level, LogLevel::Info);
        let context = deserialized.context.unwrap();
        assert_eq!(context.node_id(), Some("0:1"));
        assert_eq!(context.job_id(), "job-1");
    }

    #[test]
    fn test_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LogLevel::Error).unwrap(), "\"error\"");
        let level: LogLevel = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, LogLevel::Warn);
    }

    #[test]
    fn test_context_is_optional_in_serde() {
        let record: LogRecord =
            serde_json::from_str(r#"{"message":"m","level":"info","timestamp_ms":0}"#).unwrap();
        assert!(record.context.is_none());
    }
}
