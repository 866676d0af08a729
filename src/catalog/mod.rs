//! Durable catalogs keyed to the game build.
//!
//! Items, recipes and itemstats live in append-only [`CatalogStore`] logs
//! under the cache directory; the [`BuildGuard`] decides when the current
//! game build has moved on and the logs must be rebuilt. The mystic-forge
//! recipe table is authored in code and kept in memory, but answers the
//! same queries as the disk-backed recipe catalog.

mod build;
mod forge;
mod items;
mod itemstats;
mod recipes;
mod store;

pub use build::BuildGuard;
pub use forge::{ForgeRecipes, FORGE_RECIPE_BASE};
pub use items::{ItemCatalog, NameQuery};
pub use itemstats::ItemStatCatalog;
pub use recipes::RecipeCatalog;
pub use store::{CatalogStore, Scan};
