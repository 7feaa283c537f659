//! Unified error types for the odf2latex crate.
use thiserror::Error;

/// Main error type for odf2latex operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Package part not found
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    XmlError(String),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// Malformed or inconsistent converter configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing an output artifact failed
    #[error("Failed to write {name}: {source}")]
    Output {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for odf2latex operations.
pub type Result<T> = std::result::Result<T, Error>;
