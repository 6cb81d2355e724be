// ⚖️ Verdicts - one per source record, plus target-only leftovers
//
// Verdicts borrow both batches; they never own or mutate records.

use crate::record::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// MATCH METHOD
// ============================================================================

/// Which matcher tier paired the records
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Id,
    ExactName,
    Fuzzy { score: f64 },
}

impl MatchMethod {
    pub fn label(&self) -> String {
        match self {
            MatchMethod::Id => "id".to_string(),
            MatchMethod::ExactName => "exact_name".to_string(),
            MatchMethod::Fuzzy { score } => format!("fuzzy_name_{score:.2}"),
        }
    }
}

// ============================================================================
// DIFFERENCES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DifferenceKind {
    Name,
    Price,
    Description,
    Availability,
}

impl DifferenceKind {
    /// Bucket name used in summaries
    pub fn category(&self) -> &str {
        match self {
            DifferenceKind::Name => "Name differences",
            DifferenceKind::Price => "Price differences",
            DifferenceKind::Description => "Description differences",
            DifferenceKind::Availability => "Availability issues",
        }
    }
}

/// One human-readable discrepancy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub kind: DifferenceKind,
    pub message: String,
}

impl Difference {
    pub fn new(kind: DifferenceKind, message: impl Into<String>) -> Self {
        Difference {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// ============================================================================
// MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchResult<'a> {
    /// Paired, no material differences
    Match {
        source: &'a ProductRecord,
        target: &'a ProductRecord,
        method: MatchMethod,
    },

    /// Paired, with differences in evaluation order
    Mismatch {
        source: &'a ProductRecord,
        target: &'a ProductRecord,
        method: MatchMethod,
        differences: Vec<Difference>,
    },

    /// No candidate found in the target batch
    MissingFromTarget { source: &'a ProductRecord },

    /// Target record no source record accounts for
    TargetOnly { target: &'a ProductRecord },
}

impl<'a> MatchResult<'a> {
    pub fn status(&self) -> &'static str {
        match self {
            MatchResult::Match { .. } => "match",
            MatchResult::Mismatch { .. } => "mismatch",
            MatchResult::MissingFromTarget { .. } => "missing_from_target",
            MatchResult::TargetOnly { .. } => "target_only",
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }

    pub fn source(&self) -> Option<&'a ProductRecord> {
        match self {
            MatchResult::Match { source, .. }
            | MatchResult::Mismatch { source, .. }
            | MatchResult::MissingFromTarget { source } => Some(*source),
            MatchResult::TargetOnly { .. } => None,
        }
    }

    pub fn target(&self) -> Option<&'a ProductRecord> {
        match self {
            MatchResult::Match { target, .. }
            | MatchResult::Mismatch { target, .. }
            | MatchResult::TargetOnly { target } => Some(*target),
            MatchResult::MissingFromTarget { .. } => None,
        }
    }

    pub fn method(&self) -> Option<MatchMethod> {
        match self {
            MatchResult::Match { method, .. } | MatchResult::Mismatch { method, .. } => {
                Some(*method)
            }
            _ => None,
        }
    }

    pub fn differences(&self) -> &[Difference] {
        match self {
            MatchResult::Mismatch { differences, .. } => differences,
            _ => &[],
        }
    }

    /// Record the verdict is reported under (source side when present)
    pub fn primary(&self) -> &'a ProductRecord {
        match self {
            MatchResult::Match { source, .. }
            | MatchResult::Mismatch { source, .. }
            | MatchResult::MissingFromTarget { source } => *source,
            MatchResult::TargetOnly { target } => *target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_labels() {
        assert_eq!(MatchMethod::Id.label(), "id");
        assert_eq!(MatchMethod::ExactName.label(), "exact_name");
        assert_eq!(MatchMethod::Fuzzy { score: 0.857 }.label(), "fuzzy_name_0.86");
    }

    #[test]
    fn test_accessors() {
        let source = ProductRecord::new("A1", "Widget");
        let target = ProductRecord::new("a1", "widget");

        let mismatch = MatchResult::Mismatch {
            source: &source,
            target: &target,
            method: MatchMethod::Id,
            differences: vec![Difference::new(DifferenceKind::Price, "Price differs: $1.00 vs $2.00")],
        };
        assert_eq!(mismatch.status(), "mismatch");
        assert_eq!(mismatch.differences()[0].to_string(), "Price differs: $1.00 vs $2.00");
        assert_eq!(mismatch.primary().id, "A1");

        let only = MatchResult::TargetOnly { target: &target };
        assert!(only.source().is_none());
        assert_eq!(only.primary().id, "a1");
        assert!(only.differences().is_empty());
    }

    #[test]
    fn test_serialized_status_tag() {
        let source = ProductRecord::new("A1", "Widget");
        let verdict = MatchResult::MissingFromTarget { source: &source };

        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["status"], "missing_from_target");
        assert_eq!(json["source"]["product_id"], "A1");
    }
}
