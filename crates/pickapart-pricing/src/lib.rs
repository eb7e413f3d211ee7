//! PickAPart Pricing
//!
//! Formats USD build totals into a user-selected display currency. Rates are
//! static configuration; there is no live FX lookup.
//!
//! # Example
//!
//! ```rust
//! use pickapart_pricing::{display, Currency};
//! use rust_decimal::Decimal;
//!
//! assert_eq!(display(Decimal::new(4605, 1), &Currency::usd()), "$460.50");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod currency;
mod error;

pub use currency::{display, Currency, CurrencyTable};
pub use error::PricingError;

use serde::{Deserialize, Serialize};

/// Pricing section of the application config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Currency used when none is requested
    pub default_currency: String,

    /// Rate table; empty means the built-in table
    pub currencies: Vec<Currency>,
}

impl PricingConfig {
    /// Resolve the configured rate table
    #[must_use]
    pub fn table(&self) -> CurrencyTable {
        CurrencyTable::new(self.currencies.clone())
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            currencies: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_builtin_table() {
        let config = PricingConfig::default();
        let table = config.table();
        assert!(table.get(&config.default_currency).is_ok());
        assert_eq!(table.currencies().len(), 5);
    }

    #[test]
    fn configured_table_replaces_builtin() {
        let config = PricingConfig {
            default_currency: "USD".to_string(),
            currencies: vec![Currency::usd()],
        };
        assert!(config.table().get("EUR").is_err());
    }
}
