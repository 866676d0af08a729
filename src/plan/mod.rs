//! Planning: goals and stockpiles in, a buy/craft/obtain work plan out.

mod books;
mod planner;
mod policy;
mod state;

pub use books::Books;
pub use planner::{CraftRow, Plan, PlanInputs, Planner};
pub use policy::{AdjustPrices, Policy, SellFilter};
pub use state::PlanState;
