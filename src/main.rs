use clap::Parser;
use tracing::error;

use tradesmith::cli::{self, Cli, Commands};
use tradesmith::config::Config;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if cli.offline {
        config.offline = true;
    }
    config.init_logging();

    let result = match &cli.command {
        Commands::Plan => cli::plan::execute(config).await,
        Commands::Price(args) => cli::price::execute(config, args).await,
        Commands::Craftable => cli::craftable::execute(config).await,
        Commands::Goal(args) => cli::books::goal(config, args).await,
        Commands::Stockpile(args) => cli::books::stockpile(config, args).await,
        Commands::Refresh => cli::refresh::execute(config).await,
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
