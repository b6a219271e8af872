//! Win conditions.
//!
//! A condition document is a JSON object whose keys name predicate kinds:
//!
//! ```json
//! { "to_pick_up_objects": { "needle": 1, "small_tube": 1, "ether": 1 } }
//! ```
//!
//! Keys naming unknown kinds are logged and ignored.

use std::{collections::BTreeMap, fmt};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{IgnoredAny, MapAccess, Visitor},
};
use tracing::warn;

use crate::player::PlayerState;

pub const TO_PICK_UP_OBJECTS: &str = "to_pick_up_objects";

/// How collected items are compared against a target inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryMatch {
    /// Held counts must equal the target; extra items or surplus counts fail.
    #[default]
    Exact,
    /// Every target count must be reached; extras are allowed.
    AtLeast,
}

/// A single goal predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Required count per item name, in the order the names were given.
    TargetInventory(Vec<(String, u32)>),
}

impl Condition {
    /// Builds a target inventory; a repeated name keeps its first position and
    /// its last count.
    pub fn target_inventory<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut target: Vec<(String, u32)> = Vec::new();
        for (name, count) in items {
            let name = name.into();
            match target.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => entry.1 = count,
                None => target.push((name, count)),
            }
        }
        Condition::TargetInventory(target)
    }

    /// Key naming this predicate in a condition document.
    pub fn key(&self) -> &'static str {
        match self {
            Condition::TargetInventory(_) => TO_PICK_UP_OBJECTS,
        }
    }

    pub fn is_satisfied(&self, player: &PlayerState, policy: InventoryMatch) -> bool {
        match self {
            Condition::TargetInventory(target) => {
                let held = player.inventory.held();
                match policy {
                    InventoryMatch::Exact => {
                        let target: BTreeMap<_, _> = target
                            .iter()
                            .filter(|&(_, count)| *count > 0)
                            .map(|(name, count)| (name.clone(), *count))
                            .collect();
                        held == target
                    }
                    InventoryMatch::AtLeast => target
                        .iter()
                        .all(|(name, count)| held.get(name).copied().unwrap_or(0) >= *count),
                }
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::TargetInventory(target) => {
                write!(f, "{} : {{", self.key())?;
                for (i, (name, count)) in target.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {count}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// The set of goal predicates for a session.
///
/// An empty set is trivially satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conditions {
    conditions: Vec<Condition>,
    inventory_match: InventoryMatch,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_inventory_match(mut self, inventory_match: InventoryMatch) -> Self {
        self.inventory_match = inventory_match;
        self
    }

    /// Shorthand for a single target-inventory condition.
    pub fn target_inventory<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self::new().with(Condition::target_inventory(items))
    }

    /// Parses a JSON condition document, keeping the document's order.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let ConditionDocument(conditions) = serde_json::from_str(json)?;
        Ok(Conditions {
            conditions,
            inventory_match: InventoryMatch::default(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn is_satisfied(&self, player: &PlayerState) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.is_satisfied(player, self.inventory_match))
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// Top level of a condition document, read entry by entry.
struct ConditionDocument(Vec<Condition>);

impl<'de> Deserialize<'de> for ConditionDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = ConditionDocument;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from condition kinds to their arguments")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut conditions = Vec::new();
                while let Some(key) = access.next_key::<String>()? {
                    match key.as_str() {
                        TO_PICK_UP_OBJECTS => {
                            let TargetEntries(target) = access.next_value()?;
                            conditions.push(Condition::target_inventory(target));
                        }
                        _ => {
                            access.next_value::<IgnoredAny>()?;
                            warn!("Ignoring unrecognized condition '{key}'");
                        }
                    }
                }
                Ok(ConditionDocument(conditions))
            }
        }

        deserializer.deserialize_map(DocumentVisitor)
    }
}

/// Item counts of a target inventory, in document order.
struct TargetEntries(Vec<(String, u32)>);

impl<'de> Deserialize<'de> for TargetEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TargetVisitor;

        impl<'de> Visitor<'de> for TargetVisitor {
            type Value = TargetEntries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from item names to counts")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, u32>()? {
                    entries.push(entry);
                }
                Ok(TargetEntries(entries))
            }
        }

        deserializer.deserialize_map(TargetVisitor)
    }
}
