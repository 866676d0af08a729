//! Command-line interface definitions.

pub mod books;
pub mod craftable;
pub mod output;
pub mod plan;
pub mod price;
pub mod refresh;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::model::Rarity;

/// Tradesmith - Trading-post and crafting advisor.
#[derive(Parser, Debug)]
#[command(name = "tradesmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Serve cached data only, never hit the API
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Produce a buy/craft work plan for the account
    Plan,

    /// Show market prices and the cheapest way to obtain an item
    Price(PriceArgs),

    /// Show which planned crafts the materials on hand already cover
    Craftable,

    /// Set a sale goal for an item (count 0 removes it)
    Goal(BookArgs),

    /// Set a stockpile target for an item (count 0 removes it)
    Stockpile(BookArgs),

    /// Drop cached market data so the next command refetches
    Refresh,
}

/// Arguments for the `price` subcommand.
#[derive(Parser, Debug)]
pub struct PriceArgs {
    /// Item id or exact item name
    pub item: String,

    /// Disambiguate a name shared across rarities
    #[arg(long, value_parser = parse_rarity)]
    pub rarity: Option<Rarity>,
}

/// Arguments for `goal` and `stockpile`.
#[derive(Parser, Debug)]
pub struct BookArgs {
    /// Item id or exact item name
    pub item: String,

    /// Target count; 0 removes the entry
    pub count: i64,

    /// Disambiguate a name shared across rarities
    #[arg(long, value_parser = parse_rarity)]
    pub rarity: Option<Rarity>,
}

fn parse_rarity(text: &str) -> Result<Rarity, String> {
    match text.to_ascii_lowercase().as_str() {
        "junk" => Ok(Rarity::Junk),
        "basic" => Ok(Rarity::Basic),
        "fine" => Ok(Rarity::Fine),
        "masterwork" => Ok(Rarity::Masterwork),
        "rare" => Ok(Rarity::Rare),
        "exotic" => Ok(Rarity::Exotic),
        "ascended" => Ok(Rarity::Ascended),
        "legendary" => Ok(Rarity::Legendary),
        other => Err(format!("unknown rarity `{other}`")),
    }
}
