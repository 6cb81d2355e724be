// 🔎 Differ - discrepancies between a matched (source, target) pair
//
// Checks always run in the same order: name → price → description →
// availability. An empty list means the pair is a full match.

use crate::config::DiffConfig;
use crate::record::ProductRecord;
use crate::similarity::{normalize_name, ratio};
use crate::verdict::{Difference, DifferenceKind};

/// Availability text containing any of these marks the target unavailable
const UNAVAILABLE_MARKERS: [&str; 2] = ["out", "unavailable"];

pub struct Differ {
    config: DiffConfig,
}

impl Differ {
    pub fn new(config: DiffConfig) -> Self {
        Differ { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// All differences for a pair, in evaluation order
    pub fn diff(&self, source: &ProductRecord, target: &ProductRecord) -> Vec<Difference> {
        [
            self.compare_name(source, target),
            self.compare_price(source, target),
            self.compare_description(source, target),
            self.check_availability(target),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Minor wording drift is tolerated
    fn compare_name(&self, source: &ProductRecord, target: &ProductRecord) -> Option<Difference> {
        let source_name = normalize_name(&source.name);
        let target_name = normalize_name(&target.name);

        if source_name == target_name {
            return None;
        }

        if ratio(&source_name, &target_name) >= self.config.name_similarity_threshold {
            return None;
        }

        Some(Difference::new(
            DifferenceKind::Name,
            format!("Name differs: '{}' vs '{}'", source.name, target.name),
        ))
    }

    /// Both positive: relative difference against tolerance.
    /// Otherwise (one side missing/zero/negative): any inequality is reported.
    fn compare_price(&self, source: &ProductRecord, target: &ProductRecord) -> Option<Difference> {
        let source_price = source.price.unwrap_or(0.0);
        let target_price = target.price.unwrap_or(0.0);

        let differs = if source_price > 0.0 && target_price > 0.0 {
            let relative = (source_price - target_price).abs() / source_price.max(target_price);
            relative > self.config.price_tolerance
        } else {
            source_price != target_price
        };

        if !differs {
            return None;
        }

        Some(Difference::new(
            DifferenceKind::Price,
            format!(
                "Price differs: {} vs {}",
                format_price(source.price),
                format_price(target.price)
            ),
        ))
    }

    fn compare_description(&self, source: &ProductRecord, target: &ProductRecord) -> Option<Difference> {
        let source_desc = source.description.trim();
        let target_desc = target.description.trim();
        let label = &self.config.target_label;

        match (source_desc.is_empty(), target_desc.is_empty()) {
            (true, true) => None,
            (false, false) => {
                let similarity = ratio(&source_desc.to_lowercase(), &target_desc.to_lowercase());
                if similarity < self.config.description_similarity_threshold {
                    Some(Difference::new(
                        DifferenceKind::Description,
                        "Description differs significantly",
                    ))
                } else {
                    None
                }
            }
            (false, true) => Some(Difference::new(
                DifferenceKind::Description,
                format!("Description missing on {label}"),
            )),
            (true, false) => Some(Difference::new(
                DifferenceKind::Description,
                format!("Description exists on {label} but not in source"),
            )),
        }
    }

    /// Target-side only; the source catalog has no availability notion
    fn check_availability(&self, target: &ProductRecord) -> Option<Difference> {
        let availability = target.availability().to_lowercase();

        if UNAVAILABLE_MARKERS.iter().any(|m| availability.contains(m)) {
            Some(Difference::new(
                DifferenceKind::Availability,
                format!("Product appears unavailable on {}", self.config.target_label),
            ))
        } else {
            None
        }
    }
}

impl Default for Differ {
    fn default() -> Self {
        Self::new(DiffConfig::default())
    }
}

fn format_price(price: Option<f64>) -> String {
    match price {
        Some(p) => format!("${:.2}", p),
        None => "missing".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: Option<f64>, description: &str) -> ProductRecord {
        ProductRecord {
            id: "X".to_string(),
            name: name.to_string(),
            price,
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_identical_pair_has_no_differences() {
        let differ = Differ::default();
        let source = record("Widget Pro", Some(19.99), "A fine widget");
        let target = record("widget pro", Some(19.99), "A fine widget")
            .with_extra("availability", "In Stock");

        assert!(differ.diff(&source, &target).is_empty());
    }

    #[test]
    fn test_price_beyond_tolerance() {
        let differ = Differ::default();
        let diffs = differ.diff(
            &record("Tap Handle", Some(10.0), ""),
            &record("Tap Handle", Some(12.0), ""),
        );

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Price);
        assert_eq!(diffs[0].message, "Price differs: $10.00 vs $12.00");
    }

    #[test]
    fn test_price_within_tolerance() {
        let differ = Differ::default();
        let diffs = differ.diff(
            &record("Tap Handle", Some(100.0), ""),
            &record("Tap Handle", Some(104.0), ""),
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_price_missing_on_one_side() {
        let differ = Differ::default();
        let diffs = differ.diff(&record("Tap", Some(5.0), ""), &record("Tap", None, ""));

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].message, "Price differs: $5.00 vs missing");

        // Both absent: nothing to report
        assert!(differ.diff(&record("Tap", None, ""), &record("Tap", None, "")).is_empty());
    }

    #[test]
    fn test_name_drift_tolerated() {
        let differ = Differ::default();
        let diffs = differ.diff(
            &record("Stainless Beer Faucet", None, ""),
            &record("Stainless Beer Faucets", None, ""),
        );
        assert!(diffs.is_empty());
    }

    #[test]
    fn test_name_difference_reports_unnormalized_names() {
        let differ = Differ::default();
        let diffs = differ.diff(
            &record("Beer Faucet Deluxe", None, ""),
            &record("Beer Faucet Deluxe Model", None, ""),
        );

        assert_eq!(diffs.len(), 1);
        assert_eq!(
            diffs[0].message,
            "Name differs: 'Beer Faucet Deluxe' vs 'Beer Faucet Deluxe Model'"
        );
    }

    #[test]
    fn test_description_rules() {
        let differ = Differ::default();

        let diffs = differ.diff(
            &record("Tap", None, "Chrome plated brass tap"),
            &record("Tap", None, "Completely unrelated text here"),
        );
        assert_eq!(diffs[0].message, "Description differs significantly");

        let diffs = differ.diff(&record("Tap", None, "Chrome"), &record("Tap", None, ""));
        assert_eq!(diffs[0].message, "Description missing on target");

        let diffs = differ.diff(&record("Tap", None, " "), &record("Tap", None, "Chrome"));
        assert_eq!(diffs[0].message, "Description exists on target but not in source");
    }

    #[test]
    fn test_long_descriptions_scored_like_difflib() {
        // Reworded copy of a long description; difflib scores it 0.232
        let shop = concat!(
            "Our commercial-grade beer faucet is built from polished stainless ",
            "steel for durability and easy cleaning. The forward-sealing design ",
            "prevents sticking and bacteria growth between pours. Fits standard ",
            "shanks, includes a lever handle and is backed by a five-year ",
            "warranty for bars and restaurants.",
        );
        let site = concat!(
            "Our commercial beer faucet is made from polished 304 stainless ",
            "steel for long life and simple cleaning. Its forward-sealing valve ",
            "stops sticking and bacterial growth between pours. Fits all ",
            "standard shanks, ships with a lever handle and carries a five-year ",
            "warranty for bars and restaurants.",
        );

        let differ = Differ::default();
        let diffs = differ.diff(&record("Tap", None, shop), &record("Tap", None, site));

        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].kind, DifferenceKind::Description);
        assert_eq!(diffs[0].message, "Description differs significantly");
        println!("✅ Long reworded description flagged");
    }

    #[test]
    fn test_availability_always_reported() {
        let differ = Differ::new(DiffConfig {
            target_label: "krowne.com".to_string(),
            ..Default::default()
        });
        let target = record("Tap", None, "").with_extra("availability", "Out of Stock");

        let diffs = differ.diff(&record("Tap", None, ""), &target);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].message, "Product appears unavailable on krowne.com");

        let target = record("Tap", None, "").with_extra("availability", "Currently UNAVAILABLE");
        assert_eq!(differ.diff(&record("Tap", None, ""), &target).len(), 1);
    }

    #[test]
    fn test_difference_order_is_stable() {
        let differ = Differ::default();
        let source = record("Glass Rinser", Some(50.0), "Rinses glasses");
        let target = record("Drip Tray", Some(80.0), "")
            .with_extra("availability", "out of stock");

        let kinds: Vec<DifferenceKind> = differ.diff(&source, &target).iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DifferenceKind::Name,
                DifferenceKind::Price,
                DifferenceKind::Description,
                DifferenceKind::Availability,
            ]
        );
    }
}
