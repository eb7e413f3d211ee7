//! Category-level build operations
//!
//! Every operation takes `&self` and returns a complete new [`Build`], so a
//! caller writes the result to its cache or store as one value.

use crate::build::{Build, Slot};
use crate::category::{self, Selection};
use crate::item::BuildItem;
use std::num::NonZeroU32;

impl Build {
    /// Add `item` to `category`
    ///
    /// Multi-select: an item with the same catalog id has `quantity` added to
    /// it, otherwise the item is appended. Single-select: the slot is
    /// replaced. New items are tagged with the category key and label.
    #[must_use]
    pub fn upsert(&self, category: &str, item: BuildItem, quantity: NonZeroU32) -> Build {
        let mut next = self.clone();
        let quantity = quantity.get();

        let slot = match category::selection_for(category) {
            Selection::Multi => {
                let mut items = next
                    .parts
                    .remove(category)
                    .map(Slot::into_items)
                    .unwrap_or_default();

                match items.iter_mut().find(|existing| existing.id == item.id) {
                    Some(existing) => {
                        existing.quantity = existing.quantity.saturating_add(quantity);
                    }
                    None => {
                        let mut added = item.tagged(category);
                        added.quantity = quantity;
                        items.push(added);
                    }
                }
                Slot::Multi(items)
            }
            Selection::Single => {
                let mut replaced = item.tagged(category);
                replaced.quantity = quantity;
                Slot::Single(replaced)
            }
        };

        next.parts.insert(category.to_string(), slot);
        next
    }

    /// Remove the item with catalog id `id` from `category`
    ///
    /// A slot left empty is removed. An unknown id leaves the build as is.
    #[must_use]
    pub fn without_item(&self, category: &str, id: &str) -> Build {
        let Some(slot) = self.parts.get(category) else {
            return self.clone();
        };
        if slot.find(id).is_none() {
            return self.clone();
        }

        let mut next = self.clone();
        let remaining: Vec<BuildItem> = slot
            .items()
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();

        if remaining.is_empty() {
            next.parts.remove(category);
        } else if let Slot::Multi(_) = slot {
            next.parts.insert(category.to_string(), Slot::Multi(remaining));
        }
        next
    }

    /// Remove a whole category, single or multi
    #[must_use]
    pub fn without_category(&self, category: &str) -> Build {
        let mut next = self.clone();
        next.parts.remove(category);
        next
    }

    /// Clear every category
    #[inline]
    #[must_use]
    pub fn cleared(&self) -> Build {
        Build::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn ram(id: &str) -> BuildItem {
        BuildItem::new(id, format!("RAM {id}"), "$49.99")
    }

    #[test]
    fn multi_select_appends_distinct_ids() {
        let build = Build::new()
            .upsert("memory", ram("a"), qty(1))
            .upsert("memory", ram("b"), qty(2));

        let slot = build.get("memory").unwrap();
        assert!(matches!(slot, Slot::Multi(_)));
        let ids: Vec<_> = slot.items().iter().map(|i| (i.id.as_str(), i.quantity)).collect();
        assert_eq!(ids, vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn multi_select_merges_same_id() {
        let build = Build::new()
            .upsert("memory", ram("a"), qty(1))
            .upsert("memory", ram("a"), qty(3));

        let items = build.get("memory").unwrap().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 4);
    }

    #[test]
    fn merge_keeps_existing_fields() {
        let build = Build::new().upsert("memory", ram("a"), qty(1));
        let renamed = BuildItem::new("a", "Other name", "$1.00");
        let build = build.upsert("memory", renamed, qty(1));

        let item = &build.get("memory").unwrap().items()[0];
        assert_eq!(item.name, "RAM a");
        assert_eq!(item.price, "$49.99");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn new_items_are_tagged() {
        let build = Build::new().upsert("video-card", BuildItem::new("g", "GPU", "$999"), qty(1));
        let item = &build.get("video-card").unwrap().items()[0];
        assert_eq!(item.category, "video-card");
        assert_eq!(item.display_name, "Video Card");
    }

    #[test]
    fn lone_item_in_multi_category_is_wrapped() {
        let build = Build::from_slots([("storage".to_string(), Slot::Single(ram("s1")))]);
        let build = build.upsert("storage", ram("s2"), qty(1));

        match build.get("storage").unwrap() {
            Slot::Multi(items) => assert_eq!(items.len(), 2),
            Slot::Single(_) => panic!("expected a sequence"),
        }
    }

    #[test]
    fn single_select_replaces() {
        let build = Build::new()
            .upsert("cpu", BuildItem::new("c1", "Ryzen 5", "$199"), qty(1))
            .upsert("cpu", BuildItem::new("c2", "Ryzen 7", "$349"), qty(1));

        match build.get("cpu").unwrap() {
            Slot::Single(item) => assert_eq!(item.id, "c2"),
            Slot::Multi(_) => panic!("expected a single item"),
        }
    }

    #[test]
    fn readding_same_single_select_id_replaces_without_merge() {
        let cpu = BuildItem::new("c1", "Ryzen 5", "$199");
        let build = Build::new()
            .upsert("cpu", cpu.clone(), qty(1))
            .upsert("cpu", cpu, qty(1));
        assert_eq!(build.get("cpu").unwrap().items()[0].quantity, 1);
    }

    #[test]
    fn unknown_category_is_single_select() {
        let build = Build::new()
            .upsert("sound-card", BuildItem::new("x", "X", "$1"), qty(1))
            .upsert("sound-card", BuildItem::new("y", "Y", "$1"), qty(1));
        assert!(matches!(build.get("sound-card"), Some(Slot::Single(item)) if item.id == "y"));
    }

    #[test]
    fn upsert_does_not_mutate_input() {
        let original = Build::new().upsert("memory", ram("a"), qty(1));
        let _ = original.upsert("memory", ram("a"), qty(5));
        assert_eq!(original.get("memory").unwrap().items()[0].quantity, 1);
    }

    #[test]
    fn removing_unknown_id_is_noop() {
        let build = Build::new().upsert("memory", ram("a"), qty(2));
        assert_eq!(build.without_item("memory", "zzz"), build);
        assert_eq!(build.without_item("storage", "a"), build);
    }

    #[test]
    fn removing_item_filters_by_id() {
        let build = Build::new()
            .upsert("memory", ram("a"), qty(1))
            .upsert("memory", ram("b"), qty(1))
            .without_item("memory", "a");

        let ids: Vec<_> = build.get("memory").unwrap().items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec!["b".to_string()]);
    }

    #[test]
    fn removing_last_item_removes_category() {
        let build = Build::new()
            .upsert("memory", ram("a"), qty(1))
            .without_item("memory", "a");
        assert!(!build.contains("memory"));
        assert!(build.is_empty());
    }

    #[test]
    fn removing_single_select_item_by_id() {
        let build = Build::new().upsert("cpu", BuildItem::new("c1", "CPU", "$1"), qty(1));
        assert_eq!(build.without_item("cpu", "other"), build);
        assert!(build.without_item("cpu", "c1").is_empty());
    }

    #[test]
    fn removing_category_drops_entry() {
        let build = Build::new()
            .upsert("memory", ram("a"), qty(1))
            .upsert("cpu", BuildItem::new("c1", "CPU", "$1"), qty(1));

        let build = build.without_category("memory").without_category("case");
        assert_eq!(build.categories().collect::<Vec<_>>(), vec!["cpu"]);
    }

    #[test]
    fn clearing_empty_build_stays_empty() {
        let build = Build::new();
        assert!(build.cleared().is_empty());
        assert!(Build::new().upsert("cpu", ram("c"), qty(1)).cleared().is_empty());
    }

    proptest! {
        #[test]
        fn quantities_accumulate_across_upserts(
            base in 1u32..1_000,
            q1 in 1u32..1_000,
            q2 in 1u32..1_000,
            category in prop::sample::select(vec!["memory", "storage", "video-card", "peripherals"]),
        ) {
            let start = Build::new().upsert(category, ram("x"), qty(base));
            let merged = start
                .upsert(category, ram("x"), qty(q1))
                .upsert(category, ram("x"), qty(q2));

            let items = merged.get(category).unwrap().items();
            prop_assert_eq!(items.len(), 1);
            prop_assert_eq!(items[0].quantity, base + q1 + q2);
        }
    }
}
