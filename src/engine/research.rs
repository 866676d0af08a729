//! Research-note bundle catalog.
//!
//! Research notes come from salvaging crafted gear; whole stat families
//! salvage for the same note yield, so each bundle groups one family and
//! costs out as the weighted average note-cost of its members. The engine
//! picks whichever family is cheapest at current prices. The table here is
//! the curated default; policy can replace it outright.

use super::strategy::NoteSource;
use crate::model::ItemId;

/// A family of craftable gear salvaged for research notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchBundle {
    pub name: String,
    pub sources: Vec<NoteSource>,
}

impl ResearchBundle {
    pub fn new(name: impl Into<String>, sources: Vec<NoteSource>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }

    /// Split into one bundle per member, so the optimizer can price each
    /// source item individually instead of averaging across the family.
    pub fn singletons(&self) -> impl Iterator<Item = ResearchBundle> + '_ {
        self.sources.iter().map(|&source| ResearchBundle {
            name: format!("{} ({})", self.name, source.item),
            sources: vec![source],
        })
    }
}

fn source(item: u32, count: u32, notes: u32) -> NoteSource {
    NoteSource {
        item: ItemId(item),
        count,
        notes,
    }
}

/// The default bundle families. Yields are the salvage averages for
/// masterwork (5 notes) and rare (15 notes) crafted gear.
pub fn default_bundles() -> Vec<ResearchBundle> {
    vec![
        ResearchBundle::new(
            "Mighty jewelry",
            vec![
                // Mighty Copper Ring / Earring / Amulet
                source(13280, 1, 5),
                source(13272, 1, 5),
                source(13288, 1, 5),
            ],
        ),
        ResearchBundle::new(
            "Potent potions",
            vec![
                // Minor Potion of Slaying variants, cheap bulk crafts.
                source(50372, 3, 5),
                source(50374, 3, 5),
            ],
        ),
        ResearchBundle::new(
            "Rare gossamer coats",
            vec![
                // Berserker's / Knight's Winged Tunic
                source(13010, 1, 15),
                source(13011, 1, 15),
            ],
        ),
    ]
}
