//! Handler for the `craftable` command.

use tabled::{Table, Tabled};

use crate::app::Advisor;
use crate::cli::output;
use crate::config::Config;
use crate::error::Result;

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Planned")]
    planned: i64,
    #[tabled(rename = "Now")]
    sequential: i64,
    #[tabled(rename = "Solo")]
    solo: i64,
}

/// Execute the craftable command: plan, then report only the crafting
/// rows with their craftable-now counts.
pub async fn execute(config: Config) -> Result<()> {
    let mut advisor = Advisor::open(config).await?;
    let report = advisor.plan().await?;

    if report.plan.craft_rows.is_empty() {
        output::note("No crafting in the current plan.");
        return Ok(());
    }

    let rows: Vec<Row> = report
        .plan
        .craft_rows
        .iter()
        .map(|row| Row {
            name: report
                .names
                .get(&row.item)
                .cloned()
                .unwrap_or_else(|| format!("item {}", row.item)),
            planned: row.count,
            sequential: row.sequential_now,
            solo: row.solo_now,
        })
        .collect();

    output::section("Craftable now");
    println!("{}", Table::new(rows));
    output::note("Now: in plan order, sharing materials. Solo: this item alone.");
    Ok(())
}
