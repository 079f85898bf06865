// Account Book - Core Library
// Expense store, HTML pages and configuration for the CLI and web server

pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod template;

// Only compile HTTP handlers when the server feature is enabled
#[cfg(feature = "server")]
pub mod handler;

// Re-export commonly used types
pub use config::{Config, LogFormat, LoggingConfig};
pub use db::{AccountBook, Entry, NewEntry, Summary};
pub use error::{ConfigError, ImportError, RenderError, StorageError};
pub use import::{load_csv, read_csv};
pub use template::{ListTemplate, SummaryTemplate};

#[cfg(feature = "server")]
pub use handler::{router, AppError, AppState};
