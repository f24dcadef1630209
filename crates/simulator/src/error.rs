//! Error types for script files and config files.

use std::path::PathBuf;
use thiserror::Error;

/// Structural problems in a script file. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script is empty: expected a header line")]
    MissingHeader,

    #[error("line {line}: invalid header: {reason}")]
    InvalidHeader { line: usize, reason: String },

    #[error("line {line}: invalid tick {token:?}")]
    InvalidTick { line: usize, token: String },

    #[error("line {line}: {event} is missing its {field}")]
    MissingField {
        line: usize,
        event: &'static str,
        field: &'static str,
    },

    #[error("line {line}: invalid node index {token:?}")]
    InvalidIndex { line: usize, token: String },

    #[error("script does not end with `0 END`")]
    MissingSentinel,

    #[error("line {line}: END must be at tick 0, found {tick}")]
    InvalidSentinel { line: usize, tick: u64 },

    #[error("line {line}: content after `0 END`")]
    TrailingContent { line: usize },
}

/// Problems loading a TOML config overlay.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
