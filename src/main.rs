use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use account_book::{load_csv, AccountBook, Config};

#[derive(Parser)]
#[command(name = "account-book", version, about = "Personal expense tracker")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database table if it does not exist
    Init,
    /// Record one expense
    Add { category: String, price: i64 },
    /// Show the most recent expenses
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show count, total and average per category
    Summary,
    /// Import expenses from a CSV file with a `category,price` header
    Import { csv: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(database) = cli.database {
        config.database = database;
    }
    config.logging.init();

    let book = AccountBook::open(&config.database).with_context(|| {
        format!("Failed to open database {}", config.database.display())
    })?;
    book.ensure_schema().context("Failed to create items table")?;

    match cli.command {
        Command::Init => {
            println!("✓ Database ready: {}", config.database.display());
        }
        Command::Add { category, price } => {
            let id = book.add_entry(&category, price)?;
            println!("✓ Added #{}: {} {} yen", id, category, price);
        }
        Command::List { limit } => {
            run_list(&book, limit.unwrap_or(config.recent_limit))?;
        }
        Command::Summary => {
            run_summary(&book)?;
        }
        Command::Import { csv } => {
            run_import(&book, &csv)?;
        }
    }

    Ok(())
}

fn run_list(book: &AccountBook, limit: usize) -> Result<()> {
    let entries = book.list_recent(limit)?;

    println!("Latest {} entries", entries.len());
    if entries.is_empty() {
        println!("There is no data.");
        return Ok(());
    }

    println!("{:>6}  {:<20} {:>10}", "ID", "CATEGORY", "PRICE");
    for entry in &entries {
        println!("{:>6}  {:<20} {:>6} yen", entry.id, entry.category, entry.price);
    }

    Ok(())
}

fn run_summary(book: &AccountBook) -> Result<()> {
    let summaries = book.list_summaries()?;

    if summaries.is_empty() {
        println!("There is no data.");
        return Ok(());
    }

    println!(
        "{:<20} {:>6} {:>12} {:>12}",
        "CATEGORY", "COUNT", "TOTAL", "AVERAGE"
    );
    for summary in &summaries {
        println!(
            "{:<20} {:>6} {:>8} yen {:>8.2} yen",
            summary.category,
            summary.count,
            summary.sum,
            summary.average()
        );
    }

    Ok(())
}

fn run_import(book: &AccountBook, csv_path: &std::path::Path) -> Result<()> {
    println!("📂 Loading CSV...");
    let entries = load_csv(csv_path)
        .with_context(|| format!("Failed to load {}", csv_path.display()))?;
    println!("✓ Loaded {} entries from CSV", entries.len());

    let inserted = book.add_entries(&entries)?;
    let count = book.count_entries()?;
    println!("✓ Inserted: {} entries", inserted);
    println!("✓ Database contains {} entries", count);

    Ok(())
}
