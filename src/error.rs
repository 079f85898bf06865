// Error types shared by the store, the template and the config loader

use thiserror::Error;

/// Failures coming out of the account book store.
///
/// The store never recovers on its own: every variant is the underlying
/// failure passed back to the caller unchanged.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection failure, rejected statement or row-scan failure
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Failures reading a CSV file of entries.
#[derive(Debug, Error)]
pub enum ImportError {
    /// File could not be opened or a row did not decode as `category,price`
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Failures while writing a page into its output buffer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write template output: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
