use clap::{Parser, Subcommand};
use hashchain::chain::Chain;
use hashchain::logging::{self, LogFormat};
use hashchain::menu;
use hashchain::payload::Payload;
use hashchain::prices::{CoinGeckoFeed, PriceFeed, SnapshotFeed};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "hashchain",
    version,
    about = "In-memory hash-chain ledger with an interactive menu"
)]
struct Cli {
    /// Price snapshot in CoinGecko simple/price JSON format (default: live CoinGecko API)
    #[arg(long, env = "HASHCHAIN_PRICES")]
    prices: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "HASHCHAIN_LOG", default_value = "warn")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu (default)
    Menu,
    /// Build a sample two-sale chain, print it and check it
    Demo,
    /// Show USD prices (live, or from --prices)
    Prices,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let result = match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => cmd_menu(cli.prices.as_deref()),
        Commands::Demo => cmd_demo(),
        Commands::Prices => cmd_prices(cli.prices.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Snapshot file when given, live CoinGecko quotes otherwise.
fn load_feed(path: Option<&Path>) -> Box<dyn PriceFeed> {
    match path {
        Some(path) => Box::new(SnapshotFeed::load_or_empty(path)),
        None => Box::new(CoinGeckoFeed::new()),
    }
}

fn cmd_menu(prices: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let feed = load_feed(prices);
    let mut chain = Chain::new();
    let stdin = io::stdin();
    menu::run(&mut chain, feed.as_ref(), &mut stdin.lock(), &mut io::stdout())?;
    Ok(())
}

fn cmd_demo() -> Result<(), Box<dyn std::error::Error>> {
    let mut chain = Chain::new();
    chain.append(Payload::transaction("Book", "US$10", "A", "B"))?;
    chain.append(Payload::transaction("Pen", "US$1", "C", "D"))?;
    for block in &chain {
        print!("{}", block);
    }
    print!("{}", chain.stats());
    chain.validate()?;
    Ok(())
}

fn cmd_prices(prices: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let feed = load_feed(prices);
    menu::print_prices(feed.as_ref(), &mut io::stdout())?;
    Ok(())
}
