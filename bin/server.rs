// Account Book - Web Server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use account_book::{router, AccountBook, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "account-book-server", version, about = "Serve the account book over HTTP")]
struct Args {
    /// TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(long)]
    bind: Option<String>,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref()).context("Failed to load config")?;
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().load_config()?;
    config.logging.init();

    let book = AccountBook::open(&config.database).with_context(|| {
        format!("Failed to open database {}", config.database.display())
    })?;
    // A broken schema is fatal: nothing is served without the items table
    book.ensure_schema().context("Failed to create items table")?;

    let state = AppState::new(book).context("Failed to build page templates")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(addr = %config.bind, database = %config.database.display(), "account book server running");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"from_file.db\"").unwrap();
        writeln!(file, "bind = \"127.0.0.1:4000\"").unwrap();
        file.flush().unwrap();
        let config_path = file.path().to_str().unwrap();

        let args = Args::try_parse_from([
            "account-book-server",
            "--config",
            config_path,
            "--database",
            "from_flag.db",
        ])
        .unwrap();
        let config = args.load_config().unwrap();

        assert_eq!(config.database, PathBuf::from("from_flag.db"));
        assert_eq!(config.bind, "127.0.0.1:4000");
    }

    #[test]
    fn test_bind_flag() {
        let args =
            Args::try_parse_from(["account-book-server", "--bind", "0.0.0.0:8080"]).unwrap();
        assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_positional_config_rejected() {
        assert!(Args::try_parse_from(["account-book-server", "server.toml"]).is_err());
    }
}
