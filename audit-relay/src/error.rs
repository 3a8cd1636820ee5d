//! Error types and fatal exit-code mapping
//!
//! The relay is deliberately fail-fast: configuration, connection, and
//! publish failures are fatal to the host process. Each fatal kind maps to
//! its own documented exit status so operators can tell from the exit code
//! alone which stage of the pipeline gave out.

use thiserror::Error;

/// Exit status for a host that could not read its configuration.
pub const EXIT_CONFIG_UNREADABLE: i32 = 111;

/// Exit status for a host that could not reach the message broker at startup.
pub const EXIT_BROKER_UNAVAILABLE: i32 = 112;

/// Exit status for a host that failed to publish an audit event.
pub const EXIT_PUBLISH_FAILED: i32 = 113;

/// Result type alias using the relay error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the relay
///
/// Only fatal conditions appear here. Locally recovered conditions (a
/// malformed embedded settings document, a missing node id, an unresolvable
/// hostname) degrade the output document instead and never surface as
/// errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Configuration loaded but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The broker session could not be established at startup
    #[error("Broker error: {0}")]
    Broker(String),

    /// A send or acknowledgment failed for one audit event
    #[error("Publish error: {0}")]
    Publish(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The exit status the host process must terminate with for this error.
    ///
    /// Audit delivery must never silently drop events, so the host stops
    /// entirely rather than keep running unaudited. The mapping is part of
    /// the external contract:
    ///
    /// | condition                  | code |
    /// |----------------------------|------|
    /// | configuration unreadable   | 111  |
    /// | broker unreachable         | 112  |
    /// | publish failed             | 113  |
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Config(_) | Error::InvalidConfig(_) | Error::Io(_) => EXIT_CONFIG_UNREADABLE,
            Error::Broker(_) => EXIT_BROKER_UNAVAILABLE,
            Error::Publish(_) => EXIT_PUBLISH_FAILED,
        }
    }
}

// Manual From implementation for the boxed error
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
