//! Recipe records, shared by the disk catalog and the in-memory forge table.

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// Unique identifier for a recipe. Forge recipes are authored in code and
/// use ids above [`crate::catalog::FORGE_RECIPE_BASE`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct RecipeId(pub u32);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RecipeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Crafting disciplines a character can train.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Discipline {
    Armorsmith,
    Artificer,
    Chef,
    Huntsman,
    Jeweler,
    Leatherworker,
    Scribe,
    Tailor,
    Weaponsmith,
    #[serde(other)]
    Other,
}

/// What an ingredient line refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IngredientKind {
    #[default]
    Item,
    Currency,
}

/// One ingredient line of a recipe.
///
/// Newer catalog records tag each line with `type`; older ones only carry
/// `item_id`. Both parse to the same shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    #[serde(rename = "type", default)]
    pub kind: IngredientKind,
    #[serde(alias = "item_id")]
    pub id: u32,
    pub count: u32,
}

impl Ingredient {
    pub const fn item(id: ItemId, count: u32) -> Self {
        Self {
            kind: IngredientKind::Item,
            id: id.0,
            count,
        }
    }

    pub const fn currency(id: u32, count: u32) -> Self {
        Self {
            kind: IngredientKind::Currency,
            id,
            count,
        }
    }
}

/// A recipe catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub output_item_id: ItemId,
    pub output_item_count: u32,
    #[serde(default)]
    pub min_rating: u32,
    #[serde(default)]
    pub disciplines: Vec<Discipline>,
    pub ingredients: Vec<Ingredient>,
    /// Marks recipes only suitable for converting surplus raw materials.
    /// Never chosen by cost optimization; see the planner's auto-refine pass.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub refine_only: bool,
}

impl Recipe {
    /// Output units per single craft, never zero.
    pub fn output_count(&self) -> u64 {
        u64::from(self.output_item_count.max(1))
    }
}
