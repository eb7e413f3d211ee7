//! Part categories
//!
//! A single static table classifies every known category key as single- or
//! multi-select and carries its display label. Every operation that needs to
//! know the arity of a slot goes through [`selection_for`].

use std::borrow::Cow;

/// How many distinct items a category may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// At most one item; adding replaces
    Single,

    /// Several distinct items, each with its own quantity
    Multi,
}

impl Selection {
    /// Check if the category holds a sequence of items
    #[inline]
    #[must_use]
    pub fn is_multi(self) -> bool {
        matches!(self, Self::Multi)
    }
}

/// Static description of one category slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategorySpec {
    /// Wire key (e.g. `video-card`)
    pub key: &'static str,

    /// Human-readable label
    pub label: &'static str,

    /// Single or multi select
    pub selection: Selection,
}

impl CategorySpec {
    const fn single(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            selection: Selection::Single,
        }
    }

    const fn multi(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            selection: Selection::Multi,
        }
    }
}

/// Every known category, in display order
pub const CATEGORIES: [CategorySpec; 12] = [
    CategorySpec::single("cpu", "CPU"),
    CategorySpec::single("cpu-cooler", "CPU Cooler"),
    CategorySpec::single("motherboard", "Motherboard"),
    CategorySpec::multi("memory", "Memory"),
    CategorySpec::multi("storage", "Storage"),
    CategorySpec::multi("video-card", "Video Card"),
    CategorySpec::single("case", "Case"),
    CategorySpec::single("power-supply", "Power Supply"),
    CategorySpec::single("operating-system", "Operating System"),
    CategorySpec::multi("peripherals", "Peripherals"),
    CategorySpec::single("expansion-card", "Expansion Card"),
    CategorySpec::single("accessories", "Accessories"),
];

/// Look up the table entry for a key
#[inline]
#[must_use]
pub fn spec_for(key: &str) -> Option<&'static CategorySpec> {
    CATEGORIES.iter().find(|spec| spec.key == key)
}

/// Selection arity for a key; keys outside the table are single-select
#[inline]
#[must_use]
pub fn selection_for(key: &str) -> Selection {
    spec_for(key).map_or(Selection::Single, |spec| spec.selection)
}

/// Check if a key is a multi-select category
#[inline]
#[must_use]
pub fn is_multi_select(key: &str) -> bool {
    selection_for(key).is_multi()
}

/// Display label for a key
///
/// Unknown keys are title-cased word by word (`sound-card` → `Sound Card`).
#[must_use]
pub fn label_for(key: &str) -> Cow<'static, str> {
    match spec_for(key) {
        Some(spec) => Cow::Borrowed(spec.label),
        None => Cow::Owned(title_case(key)),
    }
}

fn title_case(key: &str) -> String {
    key.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
