//! Ground item table.

use serde::{Deserialize, Serialize};

/// Item pickups that can drop from kills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Restores `value` health.
    Health,
    /// Refills the magazine.
    Ammo,
    /// Clears the grenade cooldown.
    Grenade,
}

/// Drop and pickup parameters for one item kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    /// Item kind.
    pub kind: ItemKind,
    /// Base drop chance per kill.
    pub drop_chance: f32,
    /// Kind-specific amount (health restored).
    #[serde(default)]
    pub value: f32,
    /// Seconds on the ground before despawning.
    pub lifetime: f32,
    /// Pickup radius.
    pub radius: f32,
    /// RGB colour.
    pub color: [u8; 3],
}

/// All droppable items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTable {
    /// Item records.
    pub items: Vec<ItemData>,
}

impl ItemTable {
    /// Record for a kind.
    #[must_use]
    pub fn get(&self, kind: ItemKind) -> Option<&ItemData> {
        self.items.iter().find(|i| i.kind == kind)
    }
}

impl Default for ItemTable {
    fn default() -> Self {
        Self {
            items: vec![
                ItemData {
                    kind: ItemKind::Health,
                    drop_chance: 0.05,
                    value: 25.0,
                    lifetime: 15.0,
                    radius: 12.0,
                    color: [220, 50, 50],
                },
                ItemData {
                    kind: ItemKind::Ammo,
                    drop_chance: 0.1,
                    value: 0.0,
                    lifetime: 15.0,
                    radius: 12.0,
                    color: [220, 190, 60],
                },
                ItemData {
                    kind: ItemKind::Grenade,
                    drop_chance: 0.03,
                    value: 0.0,
                    lifetime: 15.0,
                    radius: 12.0,
                    color: [80, 140, 60],
                },
            ],
        }
    }
}
