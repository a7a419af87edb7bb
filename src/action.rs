//! Per-turn output records consumed by the presentation layer.
//!
//! A turn produces an ordered `Vec<Action>`. The renderer replays it with a
//! `match`; the engine keeps no reference to the actions once returned.
use crate::board::FallDownPos;
use crate::item::ItemPos;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One step of a turn's outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Swap(SwapAction),
    Destroy(DestroyAction),
    FallDown(FallDownAction),
    Spawn(SpawnAction),
}

/// Two cells exchanged their items. `src.item` and `dest.item` are the items
/// found at those positions before the exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapAction {
    pub src: ItemPos,
    pub dest: ItemPos,
}

/// Items removed from the board in one cascade step.
///
/// - `match_destroyed`: every cell of the matched lines and crosses.
/// - `spawn_bonuses`: bonus items written to the board after destruction.
/// - `destroyed_by`: for each bonus item that fired, the cells its area of
///   effect destroyed. Cells claimed earlier in the step are not repeated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyAction {
    pub match_destroyed: Vec<ItemPos>,
    pub spawn_bonuses: Vec<ItemPos>,
    #[serde(with = "trigger_map")]
    pub destroyed_by: BTreeMap<ItemPos, Vec<ItemPos>>,
}

impl DestroyAction {
    /// Iterates over every destroyed cell: the match first, then each chain.
    pub fn all_destroyed(&self) -> impl Iterator<Item = &ItemPos> {
        self.match_destroyed
            .iter()
            .chain(self.destroyed_by.values().flatten())
    }

    /// Total score value of the destroyed items.
    pub fn score(&self) -> u32 {
        self.all_destroyed().map(|ip| ip.item.score()).sum()
    }
}

/// Items moved down by gravity. All displacements happen at once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallDownAction {
    pub positions: Vec<FallDownPos>,
}

/// New items placed in empty cells.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnAction {
    pub positions: Vec<ItemPos>,
}

// Map keys are structured, so the map travels as a list of entries.
mod trigger_map {
    use crate::item::ItemPos;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct EntryRef<'a> {
        trigger: &'a ItemPos,
        destroyed: &'a [ItemPos],
    }

    #[derive(Deserialize)]
    struct Entry {
        trigger: ItemPos,
        destroyed: Vec<ItemPos>,
    }

    pub(super) fn serialize<S: Serializer>(
        map: &BTreeMap<ItemPos, Vec<ItemPos>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter().map(|(trigger, destroyed)| EntryRef {
            trigger,
            destroyed,
        }))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<ItemPos, Vec<ItemPos>>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| (e.trigger, e.destroyed))
            .collect())
    }
}
