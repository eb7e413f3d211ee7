//! Currency table and display formatting

use crate::error::PricingError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A display currency with a static USD conversion rate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO code (e.g. `EUR`)
    pub code: String,

    /// Prefix symbol (e.g. `€`)
    pub symbol: String,

    /// Units of this currency per USD
    pub rate: Decimal,
}

impl Currency {
    /// Create a currency
    #[must_use]
    pub fn new(code: impl Into<String>, symbol: impl Into<String>, rate: Decimal) -> Self {
        Self {
            code: code.into(),
            symbol: symbol.into(),
            rate,
        }
    }

    /// US dollar, rate 1
    #[must_use]
    pub fn usd() -> Self {
        Self::new("USD", "$", Decimal::ONE)
    }

    /// Convert a USD amount, rounded to cents (midpoint away from zero)
    #[must_use]
    pub fn convert(&self, amount_usd: Decimal) -> Decimal {
        let mut converted = amount_usd
            .checked_mul(self.rate)
            .unwrap_or(Decimal::MAX)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        converted.rescale(2);
        converted
    }

    /// Format a USD amount in this currency
    #[must_use]
    pub fn display(&self, amount_usd: Decimal) -> String {
        format!("{}{}", self.symbol, self.convert(amount_usd))
    }
}

/// Format `amount_usd` in `currency`: symbol followed by two decimals
#[inline]
#[must_use]
pub fn display(amount_usd: Decimal, currency: &Currency) -> String {
    currency.display(amount_usd)
}

/// Static set of display currencies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyTable {
    currencies: Vec<Currency>,
}

impl CurrencyTable {
    /// Create from a list; an empty list yields the built-in table
    #[must_use]
    pub fn new(currencies: Vec<Currency>) -> Self {
        if currencies.is_empty() {
            Self::default()
        } else {
            Self { currencies }
        }
    }

    /// Find a currency by code, ignoring case
    ///
    /// # Errors
    /// [`PricingError::UnknownCurrency`] if no entry matches
    pub fn get(&self, code: &str) -> Result<&Currency, PricingError> {
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))
    }

    /// All currencies in table order
    #[inline]
    #[must_use]
    pub fn currencies(&self) -> &[Currency] {
        &self.currencies
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self {
            currencies: vec![
                Currency::usd(),
                Currency::new("EUR", "€", Decimal::new(92, 2)),
                Currency::new("GBP", "£", Decimal::new(79, 2)),
                Currency::new("CAD", "CA$", Decimal::new(136, 2)),
                Currency::new("INR", "₹", Decimal::new(8330, 2)),
            ],
        }
    }
}
