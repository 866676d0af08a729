//! The in-memory mystic-forge recipe table.
//!
//! The forge is the game's item combiner; its recipes are not served by the
//! API, so the useful subset is authored here. The table answers the same
//! queries as [`super::RecipeCatalog`] and hands out the same record type,
//! so the strategy engine treats both sources uniformly.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{Ingredient, ItemId, Recipe, RecipeId};

/// Forge recipe ids start here, far above the API's id space, so a plan row
/// can always tell a forge conversion from a crafted recipe.
pub const FORGE_RECIPE_BASE: u32 = 10_000_000;

/// Spirit-shard wallet currency, spent on philosopher's stones at the forge.
const SPIRIT_SHARD: u32 = 23;

/// In-memory recipe table with the read API of the disk catalog.
pub struct ForgeRecipes {
    by_id: HashMap<RecipeId, Arc<Recipe>>,
    by_output: HashMap<ItemId, Vec<RecipeId>>,
}

impl ForgeRecipes {
    /// Build a table from authored recipes, assigning ids from
    /// [`FORGE_RECIPE_BASE`] in order.
    pub fn new(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_output: HashMap<ItemId, Vec<RecipeId>> = HashMap::new();

        for (n, mut recipe) in recipes.into_iter().enumerate() {
            let id = RecipeId(FORGE_RECIPE_BASE + n as u32);
            recipe.id = id;
            by_output.entry(recipe.output_item_id).or_default().push(id);
            by_id.insert(id, Arc::new(recipe));
        }

        Self { by_id, by_output }
    }

    pub fn get(&self, id: RecipeId) -> Option<Arc<Recipe>> {
        self.by_id.get(&id).cloned()
    }

    pub fn iter_all(&self) -> impl Iterator<Item = &Arc<Recipe>> {
        self.by_id.values()
    }

    /// Forge recipe ids producing `item`.
    pub fn search_output(&self, item: ItemId) -> &[RecipeId] {
        self.by_output.get(&item).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl Default for ForgeRecipes {
    fn default() -> Self {
        Self::new(default_recipes())
    }
}

fn promotion(t5: u32, t6: u32, output_count: u32) -> Recipe {
    Recipe {
        id: RecipeId(0), // assigned by the table
        kind: "MysticForge".into(),
        output_item_id: ItemId(t6),
        output_item_count: output_count,
        min_rating: 0,
        disciplines: vec![],
        ingredients: vec![
            Ingredient::item(ItemId(t5), 50),
            // Crystalline Dust
            Ingredient::item(ItemId(24277), 5),
            // Philosopher's stones, priced through the wallet.
            Ingredient::currency(SPIRIT_SHARD, 5),
        ],
        refine_only: false,
    }
}

/// The curated conversion table: tier-5 -> tier-6 fine material promotions.
///
/// The forge also swallows one sample of the output material per batch;
/// the table records the *net* yield (average 7 out, 1 in) so a
/// promotion costs out on its inputs alone instead of depending on the
/// cost of the item it produces.
fn default_recipes() -> Vec<Recipe> {
    vec![
        // Large Claw -> Vicious Claw
        promotion(24350, 24351, 6),
        // Large Bone -> Ancient Bone
        promotion(24341, 24358, 6),
        // Large Fang -> Vicious Fang
        promotion(24356, 24357, 6),
        // Large Scale -> Armored Scale
        promotion(24288, 24289, 6),
        // Intricate Totem -> Elaborate Totem
        promotion(24299, 24300, 6),
        // Potent Venom Sac -> Powerful Venom Sac
        promotion(24282, 24283, 6),
    ]
}
