use std::{error::Error, fs, path::PathBuf, time::Duration};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use sales_dashboard::{
    DEFAULT_FEED_URL, FeedClient, count_transactions, initialize_db, parse_feed,
    replace_all_transactions,
};

/// Replace the transactions in a sales dashboard database with those from a product feed.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database. It is created if it does not exist.
    #[arg(long, env = "DB_PATH")]
    db_path: String,

    /// Read the feed from a local JSON file instead of downloading it.
    #[arg(long, conflicts_with = "feed_url")]
    feed_file: Option<PathBuf>,

    /// The URL to download the feed from.
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,

    /// Seconds before the download is abandoned.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let builders = match &args.feed_file {
        Some(path) => {
            tracing::info!("Reading feed from {}", path.display());
            parse_feed(&fs::read_to_string(path)?)?
        }
        None => {
            let client = FeedClient::new(&args.feed_url, Duration::from_secs(args.timeout_secs))?;
            tracing::info!("Downloading feed from {}", client.url());
            client.fetch().await?
        }
    };

    let conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let inserted = replace_all_transactions(builders, &conn)?;
    tracing::info!(
        "Inserted {inserted} transactions, database now holds {}",
        count_transactions(&conn)?
    );

    Ok(())
}
