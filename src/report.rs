// 📊 Comparison Report - summary counts, recommendations, CSV export
//
// Everything here reads a finished verdict list; nothing re-runs matching.

use crate::error::Result;
use crate::verdict::{DifferenceKind, MatchResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use uuid::Uuid;

/// Label used in recommendations when the caller does not name the target
pub const DEFAULT_TARGET_LABEL: &str = "target";

// ============================================================================
// SUMMARY
// ============================================================================

/// Derived from the verdict list alone; equal inputs give equal summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    /// All verdicts, target-only included
    pub total: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub missing_from_target: usize,
    pub target_only: usize,

    /// Percentage of verdicts that are full matches (0 for an empty list)
    pub match_rate: f64,

    /// Difference count per category ("Price differences", ...)
    pub difference_breakdown: BTreeMap<String, usize>,

    pub recommendations: Vec<String>,
}

impl ComparisonSummary {
    pub fn from_results(results: &[MatchResult], target_label: &str) -> Self {
        let mut summary = ComparisonSummary {
            total: results.len(),
            matches: 0,
            mismatches: 0,
            missing_from_target: 0,
            target_only: 0,
            match_rate: 0.0,
            difference_breakdown: BTreeMap::new(),
            recommendations: Vec::new(),
        };

        for result in results {
            match result {
                MatchResult::Match { .. } => summary.matches += 1,
                MatchResult::Mismatch { .. } => summary.mismatches += 1,
                MatchResult::MissingFromTarget { .. } => summary.missing_from_target += 1,
                MatchResult::TargetOnly { .. } => summary.target_only += 1,
            }

            for difference in result.differences() {
                *summary
                    .difference_breakdown
                    .entry(difference.kind.category().to_string())
                    .or_insert(0) += 1;
            }
        }

        if summary.total > 0 {
            summary.match_rate = summary.matches as f64 / summary.total as f64 * 100.0;
        }

        summary.recommendations = recommendations(results, summary.missing_from_target, target_label);
        summary
    }

    pub fn differences_in(&self, kind: DifferenceKind) -> usize {
        self.difference_breakdown
            .get(kind.category())
            .copied()
            .unwrap_or(0)
    }

    /// One-line overview
    pub fn summary(&self) -> String {
        format!(
            "{} verdicts: {} match, {} mismatch, {} missing from target, {} target-only ({:.1}% match rate)",
            self.total,
            self.matches,
            self.mismatches,
            self.missing_from_target,
            self.target_only,
            self.match_rate
        )
    }

    /// Multi-line plain-text rendering for terminals
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("   Total verdicts:       {}\n", self.total));
        out.push_str(&format!("   ✅ Matches:           {}\n", self.matches));
        out.push_str(&format!("   ⚠️  Mismatches:        {}\n", self.mismatches));
        out.push_str(&format!("   ❌ Missing on target: {}\n", self.missing_from_target));
        out.push_str(&format!("   ➕ Target only:       {}\n", self.target_only));
        out.push_str(&format!("   Match rate:           {:.1}%\n", self.match_rate));

        if !self.difference_breakdown.is_empty() {
            out.push_str("\nDifferences:\n");
            for (category, count) in &self.difference_breakdown {
                out.push_str(&format!("   {category}: {count}\n"));
            }
        }

        if !self.recommendations.is_empty() {
            out.push_str("\nRecommendations:\n");
            for recommendation in &self.recommendations {
                out.push_str(&format!("   • {recommendation}\n"));
            }
        }

        out
    }
}

// ============================================================================
// RUN REPORT
// ============================================================================

/// A summary stamped with run identity, for output that outlives the process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: ComparisonSummary,
}

impl ComparisonReport {
    pub fn new(summary: ComparisonSummary) -> Self {
        ComparisonReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            summary,
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "📊 Comparison run {}\n   Generated:            {}\n{}",
            self.run_id,
            self.generated_at.to_rfc3339(),
            self.summary.to_text()
        )
    }
}

/// Summary of a verdict list, with the target named generically
pub fn summarize(results: &[MatchResult]) -> ComparisonSummary {
    ComparisonSummary::from_results(results, DEFAULT_TARGET_LABEL)
}

fn recommendations(results: &[MatchResult], missing: usize, target_label: &str) -> Vec<String> {
    let with_kind = |kind: DifferenceKind| {
        results
            .iter()
            .filter(|r| r.differences().iter().any(|d| d.kind == kind))
            .count()
    };

    let mut recommendations = Vec::new();

    if missing > 0 {
        recommendations.push(format!(
            "Consider adding {missing} missing products to {target_label}"
        ));
    }

    let price_issues = with_kind(DifferenceKind::Price);
    if price_issues > 0 {
        recommendations.push(format!(
            "Review pricing for {price_issues} products with price discrepancies"
        ));
    }

    let unavailable = with_kind(DifferenceKind::Availability);
    if unavailable > 0 {
        recommendations.push(format!("Update availability status for {unavailable} products"));
    }

    recommendations
}

// ============================================================================
// CSV EXPORT
// ============================================================================

pub const EXPORT_COLUMNS: [&str; 6] = [
    "product_id",
    "name",
    "status",
    "match_method",
    "differences",
    "target_url",
];

/// One row per verdict; differences joined with "; "
pub fn export_csv<W: Write>(results: &[MatchResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(EXPORT_COLUMNS)?;

    for result in results {
        let record = result.primary();
        let method = result.method().map(|m| m.label()).unwrap_or_default();
        let differences = result
            .differences()
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let url = result.target().and_then(|t| t.url()).unwrap_or("");

        csv_writer.write_record([
            record.id.as_str(),
            record.name.as_str(),
            result.status(),
            method.as_str(),
            differences.as_str(),
            url,
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ProductRecord;
    use crate::verdict::{Difference, MatchMethod};

    fn sample<'a>(records: &'a [ProductRecord]) -> Vec<MatchResult<'a>> {
        vec![
            MatchResult::Match {
                source: &records[0],
                target: &records[1],
                method: MatchMethod::Id,
            },
            MatchResult::Mismatch {
                source: &records[2],
                target: &records[3],
                method: MatchMethod::Fuzzy { score: 0.857 },
                differences: vec![
                    Difference::new(DifferenceKind::Price, "Price differs: $10.00 vs $12.00"),
                    Difference::new(DifferenceKind::Availability, "Product appears unavailable on target"),
                ],
            },
            MatchResult::MissingFromTarget { source: &records[4] },
            MatchResult::TargetOnly { target: &records[5] },
        ]
    }

    fn records() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("A1", "Widget Pro"),
            ProductRecord::new("a1", "widget pro"),
            ProductRecord::new("B2", "Tap Handle"),
            ProductRecord::new("X9", "Tap Handle Set").with_extra("url", "https://shop.example/x9"),
            ProductRecord::new("M1", "Keg Coupler"),
            ProductRecord::new("Z9", "New Gadget"),
        ]
    }

    #[test]
    fn test_summary_counts() {
        let records = records();
        let results = sample(&records);

        let summary = summarize(&results);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.matches, 1);
        assert_eq!(summary.mismatches, 1);
        assert_eq!(summary.missing_from_target, 1);
        assert_eq!(summary.target_only, 1);
        assert!((summary.match_rate - 25.0).abs() < 1e-9);
        assert_eq!(summary.differences_in(DifferenceKind::Price), 1);
        assert_eq!(summary.differences_in(DifferenceKind::Availability), 1);
        assert_eq!(summary.differences_in(DifferenceKind::Name), 0);
        assert!(!summary.difference_breakdown.contains_key("Other differences"));

        println!("✅ {}", summary.summary());
    }

    #[test]
    fn test_empty_results() {
        let summary = summarize(&[]);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.match_rate, 0.0);
        assert!(summary.recommendations.is_empty());
    }

    #[test]
    fn test_recommendations_name_target() {
        let records = records();
        let results = sample(&records);

        let summary = ComparisonSummary::from_results(&results, "krowne.com");

        assert_eq!(
            summary.recommendations,
            vec![
                "Consider adding 1 missing products to krowne.com".to_string(),
                "Review pricing for 1 products with price discrepancies".to_string(),
                "Update availability status for 1 products".to_string(),
            ]
        );
    }

    #[test]
    fn test_summary_serializes() {
        let records = records();
        let summary = summarize(&sample(&records));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["matches"], 1);
        assert_eq!(json["difference_breakdown"]["Price differences"], 1);
        assert!(summary.to_text().contains("Recommendations:"));
    }

    #[test]
    fn test_summarize_is_repeatable() {
        let records = records();
        let results = vec![MatchResult::MissingFromTarget { source: &records[4] }];

        let first = serde_json::to_string(&summarize(&results)).unwrap();
        let second = serde_json::to_string(&summarize(&results)).unwrap();

        assert_eq!(first, second);
        assert!(!first.contains("run_id"));
    }

    #[test]
    fn test_report_stamps_run_identity() {
        let records = records();
        let summary = summarize(&sample(&records));

        let first = ComparisonReport::new(summary.clone());
        let second = ComparisonReport::new(summary);

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.summary, second.summary);

        let text = first.to_text();
        assert!(text.starts_with("📊 Comparison run "));
        assert!(text.contains("Match rate:"));

        let json = serde_json::to_value(&first).unwrap();
        assert_eq!(json["summary"]["matches"], 1);
        println!("✅ Run {} stamped", first.run_id);
    }

    #[test]
    fn test_export_csv() {
        let records = records();
        let results = sample(&records);
        let mut buffer = Vec::new();

        export_csv(&results, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "product_id,name,status,match_method,differences,target_url");
        assert_eq!(lines[1], "A1,Widget Pro,match,id,,");
        assert_eq!(
            lines[2],
            "B2,Tap Handle,mismatch,fuzzy_name_0.86,Price differs: $10.00 vs $12.00; Product appears unavailable on target,https://shop.example/x9"
        );
        assert_eq!(lines[3], "M1,Keg Coupler,missing_from_target,,,");
        assert_eq!(lines[4], "Z9,New Gadget,target_only,,,");
    }
}
