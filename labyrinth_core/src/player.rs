use std::collections::{BTreeMap, btree_map};

use serde::{Deserialize, Serialize};

use crate::Position;

/// Item counts keyed by item name.
///
/// Items the map offers are seeded at zero so they show up before being
/// picked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    counts: BTreeMap<String, u32>,
}

impl Inventory {
    /// Inventory with a zero count for each name.
    pub fn seeded<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Inventory {
            counts: names.into_iter().map(|name| (name.into(), 0)).collect(),
        }
    }

    pub fn add(&mut self, name: &str) -> u32 {
        let count = self.counts.entry(name.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Counts of the items held at least once, dropping zero entries.
    pub fn held(&self) -> BTreeMap<String, u32> {
        self.counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(name, count)| (name.clone(), *count))
            .collect()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, u32> {
        self.counts.iter()
    }

    pub fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Holds the state of the player within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub name: String,
    pub symbol: char,
    /// `None` until the session begins.
    pub position: Option<Position>,
    pub alive: bool,
    pub inventory: Inventory,
}

impl PlayerState {
    pub fn new(name: impl Into<String>, symbol: char, inventory: Inventory) -> Self {
        PlayerState {
            name: name.into(),
            symbol,
            position: None,
            alive: true,
            inventory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_inventory_starts_at_zero() {
        let inventory = Inventory::seeded(["needle", "tube"]);
        assert_eq!(inventory.count("needle"), 0);
        assert_eq!(inventory.iter().count(), 2);
        assert!(inventory.held().is_empty());
    }

    #[test]
    fn add_increments_by_one() {
        let mut inventory = Inventory::seeded(["needle"]);
        assert_eq!(inventory.add("needle"), 1);
        assert_eq!(inventory.add("needle"), 2);
        assert_eq!(inventory.add("ether"), 1);
        assert_eq!(inventory.total(), 3);
        assert_eq!(
            inventory.held(),
            BTreeMap::from([("ether".to_string(), 1), ("needle".to_string(), 2)])
        );
    }

    #[test]
    fn new_player_has_no_position() {
        let player = PlayerState::new("tom", 'X', Inventory::default());
        assert_eq!(player.position, None);
        assert!(player.alive);
    }
}
