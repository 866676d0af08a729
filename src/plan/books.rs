//! The goal and stockpile books.
//!
//! Two small JSON files under `books/`: arrays of `[item_id, count]`
//! pairs, kept sorted by id and rewritten whole through a temp file and an
//! atomic rename. These are the only user-edited files the advisor owns.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::ItemId;

const DIR: &str = "books";
const GOALS: &str = "goals.json";
const STOCKPILE: &str = "stockpile.json";

/// Per-item targets: lifetime sell goals and reserve stockpiles.
pub struct Books {
    dir: PathBuf,
}

impl Books {
    pub fn open(cache_dir: &Path) -> Self {
        Self {
            dir: cache_dir.join(DIR),
        }
    }

    /// Lifetime sell targets per item.
    pub fn goals(&self) -> Result<Vec<(ItemId, i64)>> {
        load_pairs(&self.dir.join(GOALS))
    }

    /// Reserve targets the planner must maintain.
    pub fn stockpile(&self) -> Result<Vec<(ItemId, i64)>> {
        load_pairs(&self.dir.join(STOCKPILE))
    }

    /// Set (or with `count == 0`, remove) an item's sell goal.
    pub fn set_goal(&self, item: ItemId, count: i64) -> Result<()> {
        upsert(&self.dir.join(GOALS), item, count)
    }

    /// Set (or with `count == 0`, remove) an item's stockpile target.
    pub fn set_stockpile(&self, item: ItemId, count: i64) -> Result<()> {
        upsert(&self.dir.join(STOCKPILE), item, count)
    }
}

fn load_pairs(path: &Path) -> Result<Vec<(ItemId, i64)>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_str(&text)?)
}

fn save_pairs(path: &Path, pairs: &[(ItemId, i64)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(pairs)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn upsert(path: &Path, item: ItemId, count: i64) -> Result<()> {
    let mut pairs = load_pairs(path)?;
    pairs.retain(|&(id, _)| id != item);
    if count > 0 {
        pairs.push((item, count));
    }
    pairs.sort_unstable_by_key(|&(id, _)| id);
    save_pairs(path, &pairs)
}
