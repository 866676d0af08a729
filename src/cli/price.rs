//! Handler for the `price` command.

use crate::app::Advisor;
use crate::cli::{output, PriceArgs};
use crate::coin::format_coin;
use crate::config::Config;
use crate::error::Result;

/// Execute the price command.
pub async fn execute(config: Config, args: &PriceArgs) -> Result<()> {
    let mut advisor = Advisor::open(config).await?;
    let report = advisor.price(&args.item, args.rarity).await?;

    output::section(&report.name);
    output::key_value("Item id", report.item);
    match report.best_bid {
        Some(bid) => output::key_value("Best bid", format_coin(bid)),
        None => output::key_value("Best bid", "none"),
    }
    match report.best_offer {
        Some(offer) => output::key_value("Best offer", format_coin(offer)),
        None => output::key_value("Best offer", "none"),
    }
    output::key_value("Strategy", report.strategy);
    match report.optimal_cost {
        Some(cost) => output::key_value("Optimal cost", format_coin(cost)),
        None => output::key_value("Optimal cost", "undefined"),
    }
    Ok(())
}
