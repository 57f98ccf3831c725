//! Error kinds shared across the pipeline
//!
//! Every module keeps its own `thiserror` enum. This module maps them onto a
//! small set of kinds so callers can pick a sink (log, UI banner, exit code)
//! without matching on each module's variants.

use std::fmt;

/// Broad category of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration
    Config,
    /// Unreachable host, non-2xx status or unreadable body
    Network,
    /// Cache directory or file could not be read or written
    Cache,
    /// The telemetry CSV could not be parsed
    MalformedData,
    /// The projection could not be computed
    Projection,
    /// Terminal setup or drawing failed
    Terminal,
}

impl ErrorKind {
    /// Process exit code used when this kind ends the program
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Terminal => 1,
            ErrorKind::Config => 2,
            ErrorKind::Network => 3,
            ErrorKind::Cache => 4,
            ErrorKind::MalformedData => 5,
            ErrorKind::Projection => 6,
        }
    }

    /// Short label for banners and log lines
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Config => "config",
            ErrorKind::Network => "network",
            ErrorKind::Cache => "cache",
            ErrorKind::MalformedData => "malformed data",
            ErrorKind::Projection => "projection",
            ErrorKind::Terminal => "terminal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cloneable description of a failure, suitable for sending to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorReport {
    pub fn new(kind: ErrorKind, error: &dyn fmt::Display) -> Self {
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}
