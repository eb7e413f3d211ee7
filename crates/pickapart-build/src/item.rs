//! Build items
//!
//! A [`BuildItem`] is one catalog part placed into a build slot. The price is
//! kept as the catalog's formatted text; [`BuildItem::unit_price`] gives the
//! numeric value.

use crate::category;
use crate::price::parse_price;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One catalog part in a build slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildItem {
    /// Catalog id (identity within a multi-select slot)
    #[serde(deserialize_with = "de::lenient_id")]
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Unit price as formatted by the catalog, USD
    #[serde(default)]
    pub price: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Manufacturer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Category key this item was added under
    #[serde(rename = "type", default)]
    pub category: String,

    /// Category label at the time of adding
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// Units of this item (always ≥ 1)
    #[serde(default = "de::one", deserialize_with = "de::lenient_quantity")]
    pub quantity: u32,

    /// Catalog fields this crate does not interpret
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BuildItem {
    /// Create an untagged item with quantity 1
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price: price.into(),
            image: String::new(),
            brand: None,
            category: String::new(),
            display_name: String::new(),
            quantity: 1,
            extra: BTreeMap::new(),
        }
    }

    /// With image reference
    #[inline]
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// With brand
    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// With quantity; zero is raised to one
    #[inline]
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Tag the item with a category key and its label
    #[must_use]
    pub fn tagged(mut self, category_key: &str) -> Self {
        self.category = category_key.to_string();
        self.display_name = category::label_for(category_key).into_owned();
        self
    }

    /// Numeric unit price; malformed text is zero
    #[inline]
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        parse_price(&self.price)
    }

    /// `unit_price × quantity`
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price()
            .checked_mul(Decimal::from(self.quantity.max(1)))
            .unwrap_or(Decimal::MAX)
    }
}

mod de {
    use super::{Deserialize, Deserializer, Value};

    pub(super) fn one() -> u32 {
        1
    }

    /// Catalog ids show up as strings or bare numbers
    pub(super) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// Anything that is not a positive integer decodes as 1
    pub(super) fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(quantity_from_value(&Value::deserialize(deserializer)?))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(super) fn quantity_from_value(value: &Value) -> u32 {
        let parsed = match value {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 1.0)
                    .map(|f| f.trunc() as u64)
            }),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };

        parsed
            .filter(|n| *n >= 1)
            .map_or(1, |n| u32::try_from(n).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_catalog_record() {
        let item: BuildItem = serde_json::from_value(json!({
            "id": "cpu-1",
            "name": "AMD Ryzen 7 7800X3D",
            "price": "$449.00",
            "image": "img.png",
            "brand": "AMD",
            "type": "cpu",
            "displayName": "CPU",
            "coreCount": 8
        }))
        .unwrap();

        assert_eq!(item.id, "cpu-1");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.brand.as_deref(), Some("AMD"));
        assert_eq!(item.extra.get("coreCount"), Some(&json!(8)));
    }

    #[test]
    fn extra_fields_survive_reencoding() {
        let raw = json!({"id": "x", "name": "n", "price": "$1", "tdp": "65 W"});
        let item: BuildItem = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["tdp"], json!("65 W"));
    }

    #[test]
    fn numeric_ids_become_strings() {
        let item: BuildItem = serde_json::from_value(json!({"id": 42, "name": "n"})).unwrap();
        assert_eq!(item.id, "42");
    }

    #[test]
    fn lenient_quantity_decoding() {
        let cases = [
            (json!(3), 3),
            (json!("4"), 4),
            (json!(0), 1),
            (json!(-2), 1),
            (json!("lots"), 1),
            (json!(null), 1),
            (json!(2.7), 2),
        ];
        for (raw, expected) in cases {
            let item: BuildItem =
                serde_json::from_value(json!({"id": "a", "quantity": raw})).unwrap();
            assert_eq!(item.quantity, expected, "quantity {raw}");
        }
    }

    #[test]
    fn missing_quantity_defaults_to_one() {
        let item: BuildItem = serde_json::from_value(json!({"id": "a"})).unwrap();
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn tagging_sets_key_and_label() {
        let item = BuildItem::new("m1", "DDR5 32GB", "$99.99").tagged("memory");
        assert_eq!(item.category, "memory");
        assert_eq!(item.display_name, "Memory");
    }

    #[test]
    fn line_total_multiplies_quantity() {
        let item = BuildItem::new("m1", "DDR5", "$50.25").with_quantity(2);
        assert_eq!(item.line_total(), Decimal::new(10050, 2));
    }
}
