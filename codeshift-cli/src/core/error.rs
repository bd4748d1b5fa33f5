use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodeshiftError {
    #[error("Failed to enumerate files under {root}: {message}")]
    Discovery { root: PathBuf, message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    #[error("Invalid rule '{name}': {reason}")]
    InvalidRule { name: String, reason: String },

    #[error("Invalid replacement of {find:?}: {reason}")]
    InvalidReplacement { find: String, reason: String },

    #[error("Import left unchanged: {0}")]
    UnsupportedImport(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Unknown rule in disabled_rules: {0}")]
    UnknownRule(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),
}

pub type Result<T, E = CodeshiftError> = std::result::Result<T, E>;
