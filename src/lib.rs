// Catalog Reconciliation - Core Library
// Exposes the pipeline stages for the CLI and tests

pub mod error;
pub mod config;
pub mod columns;     // Canonical column set + header aliases
pub mod record;      // RawRecord / ProductRecord
pub mod normalizer;  // Field Normalizer
pub mod loader;      // Record Loader
pub mod validator;   // Business-Rule Validator
pub mod similarity;  // Name normalization + gestalt ratio
pub mod verdict;     // MatchResult and differences
pub mod differ;      // Differ
pub mod matcher;     // Tiered Matcher
pub mod report;      // Summary + CSV export
pub mod crm;         // Salesforce Product2 mapping
pub mod pipeline;

// Re-export commonly used types
pub use error::{ReconError, Result};
pub use config::{
    DiffConfig, LoaderConfig, MatchConfig, ReconConfig, ValidationConfig, ValidationLevel,
};
pub use columns::{column_key, ColumnDefinition, ColumnRegistry, FieldKind};
pub use record::{FieldValue, ProductRecord, RawRecord};
pub use normalizer::{
    normalize_list, normalize_number, normalize_text, normalize_value, FieldNormalizer,
    NormalizedValue,
};
pub use loader::{DecodedInput, LoadReport, RecordChunks, RecordLoader};
pub use validator::{
    BusinessRuleValidator, IssueAction, IssueKind, ValidationIssue, ValidationOutcome,
};
pub use similarity::{normalize_name, ratio};
pub use verdict::{Difference, DifferenceKind, MatchMethod, MatchResult};
pub use differ::Differ;
pub use matcher::Matcher;
pub use report::{export_csv, summarize, ComparisonReport, ComparisonSummary};
pub use crm::{crm_records, parse_query_response, Product2};
pub use pipeline::{Progress, ReconciliationPipeline, SourceBatch};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
