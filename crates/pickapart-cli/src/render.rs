//! Plain-text rendering of builds and saved builds

use pickapart_build::{category, compute_total, Build, SavedBuild};
use pickapart_pricing::Currency;
use std::fmt::Write;

/// One line per item, grouped by category, followed by the total
pub(crate) fn build_summary(build: &Build, currency: &Currency) -> String {
    if build.is_empty() {
        return format!("(empty build)\nTotal: {}\n", currency.display(compute_total(build)));
    }

    let mut out = String::new();
    for (key, slot) in build.iter() {
        let label = category::label_for(key);
        for item in slot.items() {
            let _ = writeln!(
                out,
                "{label:<18} {name} x{qty}  {price}",
                name = item.name,
                qty = item.quantity,
                price = currency.display(item.line_total()),
            );
        }
    }
    let _ = writeln!(out, "Total: {}", currency.display(compute_total(build)));
    out
}

/// `id  name  total  created` row for a saved build
pub(crate) fn saved_row(saved: &SavedBuild, currency: &Currency) -> String {
    format!(
        "{id}  {name}  {total}  {created}",
        id = saved.id(),
        name = saved.name(),
        total = currency.display(saved.total_price()),
        created = saved.created_at().format("%Y-%m-%d %H:%M"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pickapart_build::BuildItem;
    use std::num::NonZeroU32;

    #[test]
    fn empty_build_shows_zero_total() {
        let text = build_summary(&Build::new(), &Currency::usd());
        assert!(text.contains("(empty build)"));
        assert!(text.ends_with("Total: $0.00\n"));
    }

    #[test]
    fn lines_use_category_labels_and_quantities() {
        let build = Build::new()
            .upsert("cpu", BuildItem::new("c1", "Ryzen 5", "$200"), NonZeroU32::MIN)
            .upsert("memory", BuildItem::new("m1", "DDR5", "$50.25"), NonZeroU32::MIN)
            .upsert("memory", BuildItem::new("m1", "DDR5", "$50.25"), NonZeroU32::MIN);

        let text = build_summary(&build, &Currency::usd());
        assert!(text.contains("CPU"));
        assert!(text.contains("DDR5 x2  $100.50"));
        assert!(text.ends_with("Total: $300.50\n"));
    }
}
