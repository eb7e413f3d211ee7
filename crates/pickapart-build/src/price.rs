//! Price parsing and build totals
//!
//! Totals are kept at full decimal precision; rounding is a presentation
//! concern handled by the pricing crate.

use crate::build::Build;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Parse catalog price text into a non-negative USD amount
///
/// Every character other than ASCII digits and `.` is stripped. A second
/// decimal point ends the number. Empty or unparseable text is zero.
#[must_use]
pub fn parse_price(text: &str) -> Decimal {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = digits.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    if whole.is_empty() && frac.is_empty() {
        return Decimal::ZERO;
    }

    let canonical = format!(
        "{}.{}",
        if whole.is_empty() { "0" } else { whole },
        if frac.is_empty() { "0" } else { frac },
    );
    Decimal::from_str(&canonical).unwrap_or(Decimal::ZERO)
}

/// Per-category subtotals, keyed by category
#[must_use]
pub fn line_totals(build: &Build) -> BTreeMap<String, Decimal> {
    build
        .iter()
        .map(|(key, slot)| (key.to_string(), slot.line_total()))
        .collect()
}

/// Sum of every line total in the build
#[must_use]
pub fn compute_total(build: &Build) -> Decimal {
    build
        .iter()
        .map(|(_, slot)| slot.line_total())
        .fold(Decimal::ZERO, |acc, line| {
            acc.checked_add(line).unwrap_or(Decimal::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BuildItem, Slot};
    use std::num::NonZeroU32;

    fn qty(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn parses_formatted_prices() {
        assert_eq!(parse_price("$1,299.99"), Decimal::new(129_999, 2));
        assert_eq!(parse_price("449"), Decimal::from(449));
        assert_eq!(parse_price("USD 12.5"), Decimal::new(125, 1));
        assert_eq!(parse_price(".5"), Decimal::new(5, 1));
    }

    #[test]
    fn malformed_prices_are_zero() {
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("N/A"), Decimal::ZERO);
        assert_eq!(parse_price("."), Decimal::ZERO);
        assert_eq!(parse_price("$"), Decimal::ZERO);
    }

    #[test]
    fn sign_is_stripped() {
        assert_eq!(parse_price("-$20"), Decimal::from(20));
    }

    #[test]
    fn second_decimal_point_ends_number() {
        assert_eq!(parse_price("1.2.3"), Decimal::new(12, 1));
    }

    #[test]
    fn empty_build_totals_zero() {
        assert_eq!(compute_total(&Build::new()), Decimal::ZERO);
        assert!(line_totals(&Build::new()).is_empty());
    }

    #[test]
    fn total_sums_single_and_multi_slots() {
        let build = Build::new()
            .upsert("cpu", BuildItem::new("c", "CPU", "$300.00"), qty(1))
            .upsert("memory", BuildItem::new("m", "RAM", "$50.50"), qty(2))
            .upsert("memory", BuildItem::new("n", "RAM", "$10"), qty(1))
            .upsert("case", BuildItem::new("k", "Case", "call us"), qty(1));

        let lines = line_totals(&build);
        assert_eq!(lines["cpu"], Decimal::from(300));
        assert_eq!(lines["memory"], Decimal::from(111));
        assert_eq!(lines["case"], Decimal::ZERO);
        assert_eq!(compute_total(&build), Decimal::from(411));
    }

    #[test]
    fn single_slot_honours_quantity() {
        let build = Build::from_slots([(
            "cpu".to_string(),
            Slot::Single(BuildItem::new("c", "CPU", "$10").with_quantity(3)),
        )]);
        assert_eq!(compute_total(&build), Decimal::from(30));
    }
}
