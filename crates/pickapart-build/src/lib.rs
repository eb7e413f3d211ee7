//! PickAPart Build Model
//!
//! Data model for a PC build in progress:
//! - [`Build`]: category key → [`Slot`] (one item, or a sequence for
//!   multi-select categories)
//! - [`BuildItem`]: a catalog part with a quantity
//! - [`category`]: the single table of known categories and their arity
//! - [`price`]: lenient price parsing and full-precision totals
//! - [`SavedBuild`]: immutable named snapshots
//!
//! # Example
//!
//! ```rust
//! use pickapart_build::{compute_total, Build, BuildItem};
//! use std::num::NonZeroU32;
//!
//! let one = NonZeroU32::MIN;
//! let build = Build::new()
//!     .upsert("cpu", BuildItem::new("c1", "Ryzen 7", "$349.00"), one)
//!     .upsert("memory", BuildItem::new("m1", "DDR5 16GB", "$55.50"), one)
//!     .upsert("memory", BuildItem::new("m1", "DDR5 16GB", "$55.50"), one);
//!
//! assert_eq!(build.get("memory").unwrap().items()[0].quantity, 2);
//! assert_eq!(compute_total(&build).to_string(), "460.00");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod category;
pub mod price;

mod build;
mod item;
mod ops;
mod saved;

// Re-exports
pub use build::{Build, Slot};
pub use category::{CategorySpec, Selection, CATEGORIES};
pub use item::BuildItem;
pub use price::{compute_total, line_totals, parse_price};
pub use saved::{resolve_name, NewSavedBuild, SavedBuild, SavedBuildId, UserId, DEFAULT_BUILD_NAME};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
