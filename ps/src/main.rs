use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use projectstore::Store;
use projectstore::cli::{Cli, Command};
use projectstore::config::Config;

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("projectstore starting");

    let store = Store::open(&config.db_path)?;

    match cli.command {
        Command::Collections => {
            for name in store.collections()? {
                println!("{}", name.cyan());
            }
        }
        Command::List { collection } => {
            for record in store.list_raw(&collection)? {
                let when = chrono::DateTime::from_timestamp_millis(record.updated_at)
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| record.updated_at.to_string());
                println!("{}  {}", record.id.yellow(), when.dimmed());
            }
        }
        Command::Show { collection, id } => {
            let record = store.get_raw(&collection, &id)?;
            // Pretty-print if the payload is valid JSON, otherwise dump as-is
            match serde_json::from_str::<serde_json::Value>(&record.data) {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(_) => println!("{}", record.data),
            }
        }
        Command::Delete { collection, id } => {
            store.delete_raw(&collection, &id)?;
            println!("{} Deleted {}/{}", "✓".green(), collection, id.cyan());
        }
    }

    Ok(())
}
