// 🚀 Reconciliation Pipeline - Loader → Normalizer → Validator, then Matcher → Differ
//
// One immutable ReconConfig configures every stage. The pipeline performs no
// network I/O: target batches arrive already fetched (or as a failure signal).

use crate::config::ReconConfig;
use crate::differ::Differ;
use crate::error::{ReconError, Result};
use crate::loader::LoadReport;
use crate::loader::RecordLoader;
use crate::matcher::Matcher;
use crate::normalizer::FieldNormalizer;
use crate::record::ProductRecord;
use crate::report::ComparisonSummary;
use crate::validator::{BusinessRuleValidator, ValidationOutcome};
use crate::verdict::MatchResult;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::Display;
use std::fs;
use std::path::Path;

// ============================================================================
// PROGRESS
// ============================================================================

/// Milestone notification; observability only, never a suspension point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

impl Progress {
    fn new(percent: u8, message: impl Into<String>) -> Self {
        Progress {
            percent,
            message: message.into(),
        }
    }
}

// ============================================================================
// SOURCE BATCH
// ============================================================================

/// Clean source records plus what the loader and validator found on the way
#[derive(Debug, Clone, Serialize)]
pub struct SourceBatch {
    /// Load report without its raw rows; None for mapping-sourced batches
    pub load: Option<LoadReport>,
    pub validation: ValidationOutcome,
}

impl SourceBatch {
    pub fn records(&self) -> &[ProductRecord] {
        &self.validation.retained
    }

    /// Loader warnings followed by validation issue summaries
    pub fn findings(&self) -> Vec<String> {
        let load_warnings = self.load.iter().flat_map(|l| l.warnings.iter().cloned());
        let issues = self.validation.issues.iter().map(|i| i.summary.clone());
        load_warnings.chain(issues).collect()
    }
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct ReconciliationPipeline {
    config: ReconConfig,
    loader: RecordLoader,
    normalizer: FieldNormalizer,
    validator: BusinessRuleValidator,
    matcher: Matcher,
}

impl ReconciliationPipeline {
    pub fn new(config: ReconConfig) -> Self {
        ReconciliationPipeline {
            loader: RecordLoader::new(config.loader.clone()),
            normalizer: FieldNormalizer::new(),
            validator: BusinessRuleValidator::new(config.validation.clone()),
            matcher: Matcher::new(config.matching.clone(), Differ::new(config.diff.clone())),
            config,
        }
    }

    pub fn config(&self) -> &ReconConfig {
        &self.config
    }

    /// Tabular bytes → validated source batch.
    ///
    /// Milestones: 10% decoded and read, 10-60% per chunk, 70% normalized,
    /// 90% validated, 100% ready.
    pub fn load_source<F>(&self, bytes: &[u8], mut progress: F) -> Result<SourceBatch>
    where
        F: FnMut(Progress),
    {
        progress(Progress::new(10, "Reading input"));

        let mut report = self.loader.load_with(bytes, |chunk, rows| {
            let percent = (10 + chunk * 10).min(60) as u8;
            progress(Progress::new(percent, format!("Read chunk {chunk} ({rows} rows)")));
        })?;

        let raws = std::mem::take(&mut report.records);
        let records = self.normalizer.normalize_records(&raws);
        progress(Progress::new(
            70,
            format!("Normalized {} records ({})", records.len(), report.encoding),
        ));

        let validation = self.validator.validate(records);
        progress(Progress::new(90, validation.summary()));

        let batch = SourceBatch {
            load: Some(report),
            validation,
        };
        progress(Progress::new(
            100,
            format!("Source batch ready: {} records", batch.records().len()),
        ));

        Ok(batch)
    }

    pub fn load_source_path<P, F>(&self, path: P, progress: F) -> Result<SourceBatch>
    where
        P: AsRef<Path>,
        F: FnMut(Progress),
    {
        let bytes = fs::read(path.as_ref())?;
        self.load_source(&bytes, progress)
    }

    /// Already-fetched mappings (CRM rows) → validated source batch
    pub fn source_from_mappings(&self, mappings: &[Map<String, Value>]) -> SourceBatch {
        let records = self.normalizer.normalize_mappings(mappings);
        SourceBatch {
            load: None,
            validation: self.validator.validate(records),
        }
    }

    /// Target mappings are normalized but not validated; the live catalog is
    /// reported on as-is.
    pub fn target_from_mappings(&self, mappings: &[Map<String, Value>]) -> Vec<ProductRecord> {
        self.normalizer.normalize_mappings(mappings)
    }

    /// Accept the outcome of an external fetch; a failure aborts the run
    pub fn target_from_acquisition<E: Display>(
        &self,
        acquired: std::result::Result<Vec<Map<String, Value>>, E>,
    ) -> Result<Vec<ProductRecord>> {
        acquired
            .map(|mappings| self.target_from_mappings(&mappings))
            .map_err(|e| ReconError::TargetUnavailable(e.to_string()))
    }

    /// Parse a JSON array of target mappings
    pub fn target_from_json(&self, json: &str) -> Result<Vec<ProductRecord>> {
        let mappings: Vec<Map<String, Value>> =
            serde_json::from_str(json).map_err(|e| ReconError::MalformedInput {
                line: e.line() as u64,
                message: format!("expected a JSON array of product objects: {e}"),
            })?;
        Ok(self.target_from_mappings(&mappings))
    }

    pub fn compare<'a>(
        &self,
        source: &'a [ProductRecord],
        target: &'a [ProductRecord],
    ) -> Vec<MatchResult<'a>> {
        self.matcher.match_batches(source, target)
    }

    /// Summary naming the target with the configured label
    pub fn summarize(&self, results: &[MatchResult]) -> ComparisonSummary {
        ComparisonSummary::from_results(results, &self.config.diff.target_label)
    }
}

impl Default for ReconciliationPipeline {
    fn default() -> Self {
        Self::new(ReconConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
