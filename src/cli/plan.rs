//! Handler for the `plan` command.

use rust_decimal::Decimal;
use tabled::{Table, Tabled};

use crate::app::{Advisor, PlanReport};
use crate::cli::output;
use crate::coin::{format_coin, Coin};
use crate::config::Config;
use crate::error::Result;
use crate::model::{Inventory, ItemId};

#[derive(Tabled)]
struct BuyRow {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Count")]
    count: i64,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Total")]
    total: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Item")]
    name: String,
    #[tabled(rename = "Count")]
    count: i64,
}

/// Execute the plan command.
pub async fn execute(config: Config) -> Result<()> {
    let mut advisor = Advisor::open(config).await?;
    let report = advisor.plan().await?;
    render(&report);
    Ok(())
}

fn render(report: &PlanReport) {
    let plan = &report.plan;

    if !plan.sell_goal_items.is_empty() {
        output::section("Sell from stock");
        print_counts(report, &plan.sell_goal_items);
    }
    if !plan.craft_goal_items.is_empty() {
        output::section("Craft for sale goals");
        print_counts(report, &plan.craft_goal_items);
    }

    if !plan.buy_items.is_empty() {
        output::section("Buy");
        let rows: Vec<BuyRow> = sorted(&plan.buy_items)
            .into_iter()
            .map(|(item, count)| {
                let unit = report.prices.get(&item).copied();
                BuyRow {
                    name: name_of(report, item),
                    count,
                    unit: unit.map(format_coin).unwrap_or_default(),
                    total: unit
                        .map(|price: Coin| format_coin(price * Decimal::from(count)))
                        .unwrap_or_default(),
                }
            })
            .collect();
        println!("{}", Table::new(rows));
        output::key_value("Total cost", format_coin(plan.buy_cost));
    }

    if !plan.craft_items.is_empty() {
        output::section("Craft");
        print_counts(report, &plan.craft_items);
    }
    if !plan.refined_items.is_empty() {
        output::section("Refine from surplus");
        print_counts(report, &plan.refined_items);
    }
    if !plan.obtain_items.is_empty() {
        output::section("Obtain elsewhere");
        print_counts(report, &plan.obtain_items);
    }

    if plan.buy_items.is_empty() && plan.craft_items.is_empty() && plan.obtain_items.is_empty() {
        output::note("Nothing to do: stockpiles and goals are covered.");
    }
}

fn print_counts(report: &PlanReport, items: &Inventory) {
    let rows: Vec<CountRow> = sorted(items)
        .into_iter()
        .map(|(item, count)| CountRow {
            name: name_of(report, item),
            count,
        })
        .collect();
    println!("{}", Table::new(rows));
}

fn sorted(items: &Inventory) -> Vec<(ItemId, i64)> {
    let mut rows: Vec<(ItemId, i64)> = items.iter().collect();
    rows.sort_unstable_by_key(|&(item, _)| item);
    rows
}

fn name_of(report: &PlanReport, item: ItemId) -> String {
    report
        .names
        .get(&item)
        .cloned()
        .unwrap_or_else(|| format!("item {item}"))
}
