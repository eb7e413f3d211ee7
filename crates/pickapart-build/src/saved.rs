//! Users and saved builds
//!
//! A [`SavedBuild`] is an immutable snapshot of a build. Its fields are
//! private and only exposed through getters.

use crate::build::Build;
use crate::price::compute_total;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

/// Name given to a saved build when none is supplied
pub const DEFAULT_BUILD_NAME: &str = "My Build";

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Saved build identifier (ULID, so ordering follows creation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SavedBuildId(pub Ulid);

impl SavedBuildId {
    /// Generate new id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SavedBuildId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SavedBuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SavedBuildId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Pick the saved-build name: the requested one unless blank
#[must_use]
pub fn resolve_name(requested: Option<&str>, fallback: &str) -> String {
    requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Request to append a saved build
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedBuild {
    /// Build name
    pub name: String,
    /// Parts snapshot
    pub parts: Build,
    /// Total at save time, USD
    pub total_price: Decimal,
}

impl NewSavedBuild {
    /// Snapshot `parts` under `name`, computing the total
    #[must_use]
    pub fn new(name: impl Into<String>, parts: Build) -> Self {
        let total_price = compute_total(&parts);
        Self {
            name: name.into(),
            parts,
            total_price,
        }
    }

    /// Assign an id and creation time
    #[must_use]
    pub fn into_saved(self, id: SavedBuildId, created_at: DateTime<Utc>) -> SavedBuild {
        SavedBuild {
            id,
            name: self.name,
            parts: self.parts,
            total_price: self.total_price,
            created_at,
        }
    }
}

/// Immutable named snapshot of a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBuild {
    #[serde(rename = "_id")]
    id: SavedBuildId,
    name: String,
    #[serde(default)]
    parts: Build,
    #[serde(with = "rust_decimal::serde::float")]
    total_price: Decimal,
    created_at: DateTime<Utc>,
}

impl SavedBuild {
    /// Unique id
    #[inline]
    #[must_use]
    pub fn id(&self) -> SavedBuildId {
        self.id
    }

    /// Name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parts at save time
    #[inline]
    #[must_use]
    pub fn parts(&self) -> &Build {
        &self.parts
    }

    /// Total price at save time, USD
    #[inline]
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Creation timestamp
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildItem;
    use serde_json::json;
    use std::num::NonZeroU32;

    #[test]
    fn blank_names_fall_back() {
        assert_eq!(resolve_name(None, DEFAULT_BUILD_NAME), "My Build");
        assert_eq!(resolve_name(Some("   "), DEFAULT_BUILD_NAME), "My Build");
        assert_eq!(resolve_name(Some(" Gaming Rig "), DEFAULT_BUILD_NAME), "Gaming Rig");
    }

    #[test]
    fn new_saved_build_computes_total() {
        let parts = Build::new().upsert(
            "memory",
            BuildItem::new("m", "RAM", "$40"),
            NonZeroU32::new(2).unwrap(),
        );
        let saved = NewSavedBuild::new("rig", parts);
        assert_eq!(saved.total_price, Decimal::from(80));
    }

    #[test]
    fn wire_shape() {
        let saved = NewSavedBuild::new("rig", Build::new())
            .into_saved(SavedBuildId::new(), Utc::now());
        let value = serde_json::to_value(&saved).unwrap();

        assert!(value["_id"].is_string());
        assert_eq!(value["name"], json!("rig"));
        assert_eq!(value["parts"], json!({}));
        assert!(value["totalPrice"].is_number());
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn id_parses_from_display() {
        let id = SavedBuildId::new();
        assert_eq!(id.to_string().parse::<SavedBuildId>().unwrap(), id);
        assert!("not-a-ulid".parse::<SavedBuildId>().is_err());
    }
}
