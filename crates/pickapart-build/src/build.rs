//! The current build
//!
//! A [`Build`] maps category keys to a [`Slot`]. Empty sequences and `null`
//! entries are dropped on construction and decoding, so absence is the only
//! representation of "unselected".

use crate::item::BuildItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Value held for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Slot {
    /// Multi-select sequence, ordered by insertion
    Multi(Vec<BuildItem>),

    /// Single-select value (or a lone item in a multi-select category)
    Single(BuildItem),
}

impl Slot {
    /// Items in the slot, in order
    #[must_use]
    pub fn items(&self) -> &[BuildItem] {
        match self {
            Self::Single(item) => std::slice::from_ref(item),
            Self::Multi(items) => items,
        }
    }

    /// Consume into an owned sequence
    #[must_use]
    pub fn into_items(self) -> Vec<BuildItem> {
        match self {
            Self::Single(item) => vec![item],
            Self::Multi(items) => items,
        }
    }

    /// Check if the slot holds no item
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Multi(items) if items.is_empty())
    }

    /// Find an item by catalog id
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&BuildItem> {
        self.items().iter().find(|item| item.id == id)
    }

    /// Sum of `unit_price × quantity` over the slot
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.items()
            .iter()
            .map(BuildItem::line_total)
            .fold(Decimal::ZERO, |acc, line| {
                acc.checked_add(line).unwrap_or(Decimal::MAX)
            })
    }
}

/// A user's (or anonymous session's) in-progress part selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Build {
    pub(crate) parts: BTreeMap<String, Slot>,
}

impl Build {
    /// Create an empty build
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(category, slot)` pairs, dropping empty slots
    #[must_use]
    pub fn from_slots(slots: impl IntoIterator<Item = (String, Slot)>) -> Self {
        Self {
            parts: slots
                .into_iter()
                .filter(|(_, slot)| !slot.is_empty())
                .collect(),
        }
    }

    /// Slot for a category
    #[inline]
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&Slot> {
        self.parts.get(category)
    }

    /// Check if a category is selected
    #[inline]
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.parts.contains_key(category)
    }

    /// Iterate `(category, slot)` in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.parts.iter().map(|(key, slot)| (key.as_str(), slot))
    }

    /// Selected category keys in key order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Check if nothing is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.populated_count() == 0
    }

    /// Number of categories with a non-empty selection
    ///
    /// This is the count the reconciler compares between local and remote.
    #[must_use]
    pub fn populated_count(&self) -> usize {
        self.parts.values().filter(|slot| !slot.is_empty()).count()
    }

    /// Total units across all slots
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.parts
            .values()
            .flat_map(Slot::items)
            .map(|item| u64::from(item.quantity))
            .sum()
    }
}

impl Serialize for Build {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.parts.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Build {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, Option<Slot>>::deserialize(deserializer)?;
        Ok(Self::from_slots(
            raw.into_iter()
                .filter_map(|(key, slot)| slot.map(|slot| (key, slot))),
        ))
    }
}
