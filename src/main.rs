mod cli;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use cli::{Cli, Commands};
use pointer::app::{bootstrap, ScanOptions, SortSpec};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let mut controller = bootstrap::controller(&cli.config, cli.store.clone())?;

    match cli.command {
        Commands::List => {
            let tickers = controller.list()?;
            if tickers.is_empty() {
                println!("No tickers registered.");
            }
            for ticker in tickers {
                println!("{ticker}");
            }
        }
        Commands::Add { ref ticker } => {
            let symbol = controller.add(ticker)?;
            println!("Registered {symbol}");
        }
        Commands::Rename { ref old, ref new } => {
            let symbol = controller.rename(old, new)?;
            println!("Renamed to {symbol}");
        }
        Commands::Remove { ref ticker } => {
            let symbol = controller.remove(ticker)?;
            println!("Removed {symbol}");
        }
        Commands::Scan {
            budget,
            since,
            workers,
            sort,
            desc,
        } => {
            let options = ScanOptions {
                budget,
                since,
                workers,
                sort: sort.map(|column| SortSpec {
                    column,
                    descending: desc,
                }),
            };
            controller.scan(&options).await?;
        }
    }

    Ok(())
}
