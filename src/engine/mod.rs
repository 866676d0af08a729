//! The crafting-strategy cost optimizer.
//!
//! For every item the engine enumerates how it could be obtained — bought
//! off the trading post, crafted from a disk or forge recipe, salvaged out
//! of a research-note bundle, or a user-supplied extra — and memoizes the
//! cheapest choice over the recursive recipe graph. The planner then
//! replays those choices against a working inventory.

mod optimizer;
mod research;
mod strategy;

pub use optimizer::{CanCraft, StrategyEngine};
pub use research::{default_bundles, ResearchBundle};
pub use strategy::{NoteSource, Strategy};

pub(crate) use strategy::ingredient_item;
