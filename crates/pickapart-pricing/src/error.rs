//! Error types for pricing

/// Pricing errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    /// No currency with this code in the table
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
}
