//! XML audit-event layout
//!
//! Renders a classified log record as the fixed-schema `<auditevent>`
//! document published to the queue. The layout is immutable once built:
//! host identity, application label, interesting keys, and time zone are
//! resolved at startup and shared by every formatting call.
//!
//! The document format is inherited from the downstream audit consumers:
//! child elements are separated by four spaces on a single line, the body
//! ends with a newline, and payload text is embedded verbatim without XML
//! escaping.

use chrono::{LocalResult, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::HashSet;

use crate::config::AuditConfig;
use crate::error::{Error, Result};

use super::action::{classify, AuditAction, INPUT_PORTS_MARKER};
use super::record::LogRecord;
use super::settings::append_parameters;

/// Placeholder rendered when a record carries no node identifier
pub const MISSING_NODE_ID: &str = "error reading nodeID (null)";

/// Immutable per-process formatting state
#[derive(Debug, Clone)]
pub struct AuditLayout {
    hostname: String,
    username: String,
    application: String,
    interesting_keys: HashSet<String>,
    time_zone: Tz,
}

impl AuditLayout {
    /// Build the layout from configuration, resolving host identity once.
    ///
    /// An unknown time zone is a configuration error. An unresolvable
    /// hostname is recovered as `unknown`.
    pub fn new(config: &AuditConfig) -> Result<Self> {
        let time_zone: Tz = config.time_zone.parse().map_err(|_| {
            Error::InvalidConfig(format!("unknown time zone '{}'", config.time_zone))
        })?;

        let hostname = hostname::get()
            .map(|h| h.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(Self {
            hostname,
            username: whoami::username(),
            application: config.application.clone(),
            interesting_keys: config.interesting_key_set(),
            time_zone,
        })
    }

    /// Build a layout with explicit host identity.
    ///
    /// Hosts that already know their identity (or tests that need a
    /// deterministic one) can bypass the system lookups of
    /// [`AuditLayout::new`].
    pub fn from_parts(
        hostname: impl Into<String>,
        username: impl Into<String>,
        config: &AuditConfig,
    ) -> Result<Self> {
        let time_zone: Tz = config.time_zone.parse().map_err(|_| {
            Error::InvalidConfig(format!("unknown time zone '{}'", config.time_zone))
        })?;

        Ok(Self {
            hostname: hostname.into(),
            username: username.into(),
            application: config.application.clone(),
            interesting_keys: config.interesting_key_set(),
            time_zone,
        })
    }

    /// Classify and render a record in one step.
    ///
    /// Returns the audit document for an auditable record, `None` otherwise.
    pub fn format(&self, record: &LogRecord) -> Option<String> {
        let action = classify(record)?;
        self.render(record, action)
    }

    /// Render a record for an already-classified action.
    ///
    /// Returns `None` if the record carries no execution context.
    pub fn render(&self, record: &LogRecord, action: AuditAction) -> Option<String> {
        let context = record.context.as_ref()?;
        let timestamp = self.render_timestamp(record.timestamp_ms);

        let mut out = String::with_capacity(512);
        out.push_str("<auditevent>");
        push_element(&mut out, "hostname", &self.hostname);
        push_element(&mut out, "username", &self.username);
        push_element(&mut out, "application", &self.application);
        push_element(&mut out, "action", &action.to_string());
        push_element(&mut out, "timestamp", &timestamp);
        push_element(&mut out, "jobid", context.job_id());
        push_element(
            &mut out,
            "nodeid",
            context.node_id().unwrap_or(MISSING_NODE_ID),
        );
        push_element(&mut out, "nodename", context.node_name());

        match action {
            AuditAction::InputPorts => {
                // Payload starts right after the marker; the offset comes
                // from the marker literal itself.
                if let Some(idx) = record.message.find(INPUT_PORTS_MARKER) {
                    push_element(
                        &mut out,
                        "inputports",
                        &record.message[idx + INPUT_PORTS_MARKER.len()..],
                    );
                }
            }
            AuditAction::Error => {
                // The raw message, embedded newlines and all.
                push_element(&mut out, "error", &record.message);
            }
            AuditAction::Parameters => {
                append_parameters(&mut out, &record.message, &self.interesting_keys);
            }
            AuditAction::Executing | AuditAction::Executed => {}
        }

        out.push_str("</auditevent>");
        out.push('\n');
        Some(out)
    }

    /// Render the epoch-millisecond timestamp in the configured zone with
    /// millisecond precision and an explicit offset (`Z` at zero offset).
    fn render_timestamp(&self, millis: i64) -> String {
        match Utc.timestamp_millis_opt(millis) {
            LocalResult::Single(utc) => utc
                .with_timezone(&self.time_zone)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            _ => {
                tracing::warn!("record timestamp {} is out of range", millis);
                "invalid timestamp".to_string()
            }
        }
    }

    /// The application label placed in every document
    pub fn application(&self) -> &str {
        &self.application
    }
}

/// Append one `    <name>value</name>` element.
fn push_element(out: &mut String, name: &str, value: &str) {
    out.push_str("    <");
    out.push_str(name);
    out.push('>');
    out.push_str(value);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}
