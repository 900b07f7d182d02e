//! Error types.
//!
//! Everything here is boot-fatal: request-level failures are answered
//! in place by the handlers and never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading or parsing an OpenAPI document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read OpenAPI file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file format. Use JSON or YAML. ({path})")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse OpenAPI YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse OpenAPI JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OpenAPI document: {0}")]
    InvalidStructure(&'static str),

    #[error("path {path}: {reason}")]
    InvalidPathItem { path: String, reason: String },

    #[error("operation {method} {path}: {source}")]
    InvalidOperation {
        path: String,
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while registering a route.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid route pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed route pattern {pattern}: {reason}")]
    MalformedPattern { pattern: String, reason: String },

    #[error("invalid HTTP method {method:?} for path {path}")]
    InvalidMethod { path: String, method: String },
}

/// Invalid runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {addr}: {reason}")]
    BindAddress { addr: String, reason: String },
}

/// Top-level error for the server lifecycle.
#[derive(Debug, Error)]
pub enum MockyError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
