// ✅ Business-Rule Validator - post-normalization sanity checks
//
// Never fails the batch: a partially valid catalog is still worth comparing.
// Each rule either drops a record or flags it; every drop is counted.

use crate::config::ValidationConfig;
use crate::record::ProductRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    MissingId,
    NegativePrice,
    MissingName,
    DuplicateId,
    HighPrice,
    MissingDescription,
}

impl IssueKind {
    /// Report order
    const ALL: [IssueKind; 6] = [
        IssueKind::MissingId,
        IssueKind::NegativePrice,
        IssueKind::MissingName,
        IssueKind::DuplicateId,
        IssueKind::HighPrice,
        IssueKind::MissingDescription,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueAction {
    Dropped,
    Flagged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub action: IssueAction,
    pub count: usize,
    /// Ids of affected records (empty strings for records without id)
    pub record_ids: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub retained: Vec<ProductRecord>,
    pub issues: Vec<ValidationIssue>,
    pub input_count: usize,
}

impl ValidationOutcome {
    pub fn dropped_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.action == IssueAction::Dropped)
            .map(|i| i.count)
            .sum()
    }

    pub fn flagged_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.action == IssueAction::Flagged)
            .map(|i| i.count)
            .sum()
    }

    pub fn issue(&self, kind: IssueKind) -> Option<&ValidationIssue> {
        self.issues.iter().find(|i| i.kind == kind)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} of {} records retained, {} dropped, {} flagged",
            self.retained.len(),
            self.input_count,
            self.dropped_count(),
            self.flagged_count()
        )
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct BusinessRuleValidator {
    config: ValidationConfig,
}

impl BusinessRuleValidator {
    pub fn new(config: ValidationConfig) -> Self {
        BusinessRuleValidator { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Apply every policy to the batch, in input order.
    ///
    /// Drop rules run first (missing id, negative price, missing name under
    /// strict policy, duplicate id); flag rules only see retained records.
    pub fn validate(&self, records: Vec<ProductRecord>) -> ValidationOutcome {
        let input_count = records.len();
        let mut hits: HashMap<IssueKind, Vec<String>> = HashMap::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut retained = Vec::with_capacity(records.len());

        for record in records {
            if let Some(kind) = self.drop_reason(&record, &seen_ids) {
                hits.entry(kind).or_default().push(record.id.clone());
                continue;
            }

            for kind in self.flags(&record) {
                hits.entry(kind).or_default().push(record.id.clone());
            }

            seen_ids.insert(record.id.clone());
            retained.push(record);
        }

        let issues = IssueKind::ALL
            .iter()
            .filter_map(|kind| {
                hits.remove(kind)
                    .map(|ids| self.issue(*kind, ids))
            })
            .collect();

        ValidationOutcome {
            retained,
            issues,
            input_count,
        }
    }

    fn drop_reason(&self, record: &ProductRecord, seen_ids: &HashSet<String>) -> Option<IssueKind> {
        if record.id.trim().is_empty() {
            return Some(IssueKind::MissingId);
        }

        if !self.config.allow_negative_prices && record.price.is_some_and(|p| p < 0.0) {
            return Some(IssueKind::NegativePrice);
        }

        if self.config.drop_missing_name && record.name.trim().is_empty() {
            return Some(IssueKind::MissingName);
        }

        if seen_ids.contains(&record.id) {
            return Some(IssueKind::DuplicateId);
        }

        None
    }

    fn flags(&self, record: &ProductRecord) -> Vec<IssueKind> {
        let mut flags = Vec::new();

        if self.config.flag_missing_name && record.name.trim().is_empty() {
            flags.push(IssueKind::MissingName);
        }

        if record.price.is_some_and(|p| p > self.config.high_price_threshold) {
            flags.push(IssueKind::HighPrice);
        }

        if self.config.flag_missing_description && record.description.trim().is_empty() {
            flags.push(IssueKind::MissingDescription);
        }

        flags
    }

    fn issue(&self, kind: IssueKind, record_ids: Vec<String>) -> ValidationIssue {
        let count = record_ids.len();

        let (action, summary) = match kind {
            IssueKind::MissingId => (
                IssueAction::Dropped,
                format!("Dropped {count} record(s) with empty product_id"),
            ),
            IssueKind::NegativePrice => (
                IssueAction::Dropped,
                format!("Dropped {count} record(s) with negative price"),
            ),
            IssueKind::DuplicateId => (
                IssueAction::Dropped,
                format!("Dropped {count} duplicate product_id record(s); first occurrence kept"),
            ),
            IssueKind::MissingName if self.config.drop_missing_name => (
                IssueAction::Dropped,
                format!("Dropped {count} record(s) with empty name"),
            ),
            IssueKind::MissingName => (
                IssueAction::Flagged,
                format!("{count} record(s) have an empty name"),
            ),
            IssueKind::HighPrice => (
                IssueAction::Flagged,
                format!(
                    "{count} record(s) priced above ${:.2}",
                    self.config.high_price_threshold
                ),
            ),
            IssueKind::MissingDescription => (
                IssueAction::Flagged,
                format!("{count} record(s) have an empty description"),
            ),
        };

        ValidationIssue {
            kind,
            action,
            count,
            record_ids,
            summary,
        }
    }
}

impl Default for BusinessRuleValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationLevel;

    fn product(id: &str, price: Option<f64>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            description: "A product".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_batch_passes() {
        let validator = BusinessRuleValidator::default();
        let outcome = validator.validate(vec![product("A1", Some(10.0)), product("A2", None)]);

        assert_eq!(outcome.retained.len(), 2);
        assert!(outcome.issues.is_empty());
        println!("✅ {}", outcome.summary());
    }

    #[test]
    fn test_negative_price_dropped_by_default() {
        let validator = BusinessRuleValidator::default();
        let outcome = validator.validate(vec![product("A1", Some(-5.0)), product("A2", Some(5.0))]);

        assert_eq!(outcome.retained.len(), 1);
        let issue = outcome.issue(IssueKind::NegativePrice).unwrap();
        assert_eq!(issue.count, 1);
        assert_eq!(issue.action, IssueAction::Dropped);
        assert_eq!(issue.record_ids, vec!["A1".to_string()]);
    }

    #[test]
    fn test_negative_price_allowed_when_configured() {
        let validator =
            BusinessRuleValidator::new(ValidationConfig::for_level(ValidationLevel::Lenient));
        let outcome = validator.validate(vec![product("A1", Some(-5.0))]);

        assert_eq!(outcome.retained.len(), 1);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn test_high_price_flagged_not_dropped() {
        let validator = BusinessRuleValidator::default();
        let outcome = validator.validate(vec![product("A1", Some(250_000.0))]);

        assert_eq!(outcome.retained.len(), 1);
        let issue = outcome.issue(IssueKind::HighPrice).unwrap();
        assert_eq!(issue.action, IssueAction::Flagged);
        assert!(issue.summary.contains("100000.00"));
    }

    #[test]
    fn test_duplicates_keep_first_occurrence() {
        let validator = BusinessRuleValidator::default();
        let mut second = product("A1", Some(2.0));
        second.name = "Second copy".to_string();

        let outcome = validator.validate(vec![
            product("A1", Some(1.0)),
            second,
            product("A1", Some(3.0)),
            product("B2", Some(4.0)),
        ]);

        assert_eq!(outcome.retained.len(), 2);
        assert_eq!(outcome.retained[0].price, Some(1.0));
        assert_eq!(outcome.issue(IssueKind::DuplicateId).unwrap().count, 2);
    }

    #[test]
    fn test_dropped_duplicate_does_not_shadow_later_valid_record() {
        let validator = BusinessRuleValidator::default();
        let outcome = validator.validate(vec![product("A1", Some(-1.0)), product("A1", Some(1.0))]);

        assert_eq!(outcome.retained.len(), 1);
        assert_eq!(outcome.retained[0].price, Some(1.0));
        assert!(outcome.issue(IssueKind::DuplicateId).is_none());
    }

    #[test]
    fn test_missing_description_flagged() {
        let validator = BusinessRuleValidator::default();
        let mut record = product("A1", Some(1.0));
        record.description = String::new();

        let outcome = validator.validate(vec![record]);

        assert_eq!(outcome.retained.len(), 1);
        assert_eq!(outcome.issue(IssueKind::MissingDescription).unwrap().count, 1);
    }

    #[test]
    fn test_missing_id_dropped() {
        let validator = BusinessRuleValidator::default();
        let outcome = validator.validate(vec![product("", Some(1.0)), product("  ", Some(1.0))]);

        assert!(outcome.retained.is_empty());
        assert_eq!(outcome.issue(IssueKind::MissingId).unwrap().count, 2);
    }

    #[test]
    fn test_missing_name_policy_by_level() {
        let mut nameless = product("A1", Some(1.0));
        nameless.name = String::new();

        let standard = BusinessRuleValidator::default().validate(vec![nameless.clone()]);
        assert_eq!(standard.retained.len(), 1);
        assert_eq!(
            standard.issue(IssueKind::MissingName).unwrap().action,
            IssueAction::Flagged
        );

        let strict = BusinessRuleValidator::new(ValidationConfig::for_level(ValidationLevel::Strict))
            .validate(vec![nameless]);
        assert!(strict.retained.is_empty());
        assert_eq!(
            strict.issue(IssueKind::MissingName).unwrap().action,
            IssueAction::Dropped
        );
    }

    #[test]
    fn test_every_drop_is_counted() {
        let validator = BusinessRuleValidator::default();
        let records = vec![
            product("A1", Some(1.0)),
            product("", Some(1.0)),
            product("A2", Some(-3.0)),
            product("A1", Some(1.0)),
            product("A3", Some(500_000.0)),
            product("A4", None),
        ];
        let input_len = records.len();

        let outcome = validator.validate(records);

        assert!(outcome.retained.len() <= input_len);
        assert_eq!(outcome.retained.len() + outcome.dropped_count(), input_len);
        assert!(outcome.retained.iter().all(|r| !r.id.is_empty()));
        assert!(outcome.retained.iter().all(|r| r.price.map_or(true, |p| p >= 0.0)));
    }
}
