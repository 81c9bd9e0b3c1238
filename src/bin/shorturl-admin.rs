use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use shorturl::config::Config;
use shorturl::service::ShortenerService;
use shorturl::storage::{self, Storage};
use shorturl::validator::Validator;

#[derive(Parser)]
#[command(name = "shorturl-admin")]
#[command(about = "Short URL management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL (validated the same way as the HTTP API)
    Shorten {
        /// Absolute http or https URL
        url: String,
    },
    /// Print the URL stored under a short code
    Lookup {
        /// Numeric short code
        code: i64,
    },
    /// Print the short code stored for a URL
    Find {
        /// Exact URL as it was submitted
        url: String,
    },
    /// Print the number of stored short URLs
    Count,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::open(&config.database, &config.cache).await?;

    match cli.command {
        Commands::Shorten { url } => {
            let service = ShortenerService::new(storage, Validator::default());
            match service.create(&url).await {
                Ok(record) => println!("✓ {} -> {}", record.short_code, record.original_url),
                Err(err) => bail!("could not shorten '{}': {}", url, err),
            }
        }
        Commands::Lookup { code } => match storage.find_by_code(code).await? {
            Some(record) => println!("{}", record.original_url),
            None => println!("⚠ No short URL with code {}", code),
        },
        Commands::Find { url } => match storage.find_by_url(&url).await? {
            Some(record) => println!("{}", record.short_code),
            None => println!("⚠ '{}' has not been shortened", url),
        },
        Commands::Count => {
            println!("{}", storage.count().await?);
        }
    }

    Ok(())
}
