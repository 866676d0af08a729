//! Handlers for the `goal` and `stockpile` commands.

use crate::app::Advisor;
use crate::cli::{output, BookArgs};
use crate::config::Config;
use crate::error::Result;

/// Set or remove a sale goal.
pub async fn goal(config: Config, args: &BookArgs) -> Result<()> {
    let advisor = Advisor::open(config).await?;
    let item = advisor.resolve_item(&args.item, args.rarity)?;
    advisor.books().set_goal(item, args.count)?;
    report(&advisor, "Goal", args.count, item);
    Ok(())
}

/// Set or remove a stockpile target.
pub async fn stockpile(config: Config, args: &BookArgs) -> Result<()> {
    let advisor = Advisor::open(config).await?;
    let item = advisor.resolve_item(&args.item, args.rarity)?;
    advisor.books().set_stockpile(item, args.count)?;
    report(&advisor, "Stockpile", args.count, item);
    Ok(())
}

fn report(advisor: &Advisor, what: &str, count: i64, item: crate::model::ItemId) {
    let name = advisor.display_name(item);
    if count == 0 {
        output::note(&format!("{what} removed for {name} ({item})"));
    } else {
        output::note(&format!("{what} for {name} ({item}) set to {count}"));
    }
}
