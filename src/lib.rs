//! Tradesmith - Trading-post and crafting advisor.
//!
//! This crate turns an account's goals and stockpile targets into a
//! concrete work plan: what to buy off the trading post, what to craft,
//! and what must be obtained some other way, priced against live market
//! data.
//!
//! # Architecture
//!
//! Everything flows through four layers:
//!
//! - [`catalog`] - Build-versioned on-disk caches of the game's static
//!   data (items, recipes, itemstats), plus the hardcoded mystic-forge
//!   promotion recipes.
//! - [`market`] - Short-lived price and listing caches with an
//!   incremental transaction-history ledger.
//! - [`engine`] - Per-item acquisition strategies (buy, craft, research
//!   notes) and the memoized optimal-cost search over them.
//! - [`plan`] - The multi-pass planner: cover shortages, top up
//!   stockpiles, refine surplus, then report what is craftable now.
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML with policy knobs
//! - [`api`] - The game REST API trait and its HTTP implementation
//! - [`model`] - Domain types: items, recipes, currencies, inventories
//! - [`account`] - Account snapshot assembly across bags, bank and wallet
//! - [`app`] - Application orchestration behind the CLI verbs
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use tradesmith::app::Advisor;
//! use tradesmith::config::Config;
//!
//! # async fn run() -> tradesmith::error::Result<()> {
//! let mut advisor = Advisor::open(Config::default()).await?;
//! let report = advisor.plan().await?;
//! println!("{} buy rows", report.plan.buy_items.len());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod api;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod coin;
pub mod config;
pub mod engine;
pub mod error;
pub mod market;
pub mod model;
pub mod plan;
