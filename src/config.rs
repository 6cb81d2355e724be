// ⚙️ Configuration - one immutable value handed to each component

use crate::error::{ReconError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// LOADER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Encoding labels tried in order (WHATWG labels, e.g. "latin1")
    pub encodings: Vec<String>,

    /// Columns that must be present after header resolution
    pub required_columns: Vec<String>,

    /// Fewer recognized header cells than this ⇒ input is headerless
    pub min_recognized_headers: usize,

    /// Rows per chunk for chunked reading
    pub chunk_size: usize,

    pub delimiter: u8,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            encodings: vec![
                "utf-8".to_string(),
                "latin1".to_string(),
                "windows-1252".to_string(),
                "iso-8859-1".to_string(),
            ],
            required_columns: vec![
                "product_id".to_string(),
                "name".to_string(),
                "price".to_string(),
                "description".to_string(),
            ],
            min_recognized_headers: 2,
            chunk_size: 1000,
            delimiter: b',',
        }
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Lenient,
    Standard,
    Strict,
}

impl ValidationLevel {
    pub fn name(&self) -> &str {
        match self {
            ValidationLevel::Lenient => "lenient",
            ValidationLevel::Standard => "standard",
            ValidationLevel::Strict => "strict",
        }
    }
}

impl std::str::FromStr for ValidationLevel {
    type Err = ReconError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(ValidationLevel::Lenient),
            "standard" => Ok(ValidationLevel::Standard),
            "strict" => Ok(ValidationLevel::Strict),
            other => Err(ReconError::Config(format!("unknown validation level: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub allow_negative_prices: bool,

    /// Prices above this are flagged, never dropped
    pub high_price_threshold: f64,

    pub flag_missing_description: bool,

    pub flag_missing_name: bool,

    /// Drop (rather than flag) records with an empty name
    pub drop_missing_name: bool,
}

impl ValidationConfig {
    /// Preset for a validation level
    pub fn for_level(level: ValidationLevel) -> Self {
        match level {
            ValidationLevel::Lenient => ValidationConfig {
                allow_negative_prices: true,
                high_price_threshold: f64::MAX,
                flag_missing_description: false,
                flag_missing_name: false,
                drop_missing_name: false,
            },
            ValidationLevel::Standard => ValidationConfig {
                allow_negative_prices: false,
                high_price_threshold: 100_000.0,
                flag_missing_description: true,
                flag_missing_name: true,
                drop_missing_name: false,
            },
            ValidationLevel::Strict => ValidationConfig {
                allow_negative_prices: false,
                high_price_threshold: 10_000.0,
                flag_missing_description: true,
                flag_missing_name: true,
                drop_missing_name: true,
            },
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::for_level(ValidationLevel::Standard)
    }
}

// ============================================================================
// MATCHING & DIFFING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Minimum similarity for a fuzzy name match (default: 0.8)
    pub fuzzy_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            fuzzy_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Relative price difference tolerated (default: 0.05)
    pub price_tolerance: f64,

    /// Names below this similarity are reported (default: 0.9)
    pub name_similarity_threshold: f64,

    /// Descriptions below this similarity are reported (default: 0.7)
    pub description_similarity_threshold: f64,

    /// How the target catalog is named in difference messages
    pub target_label: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        DiffConfig {
            price_tolerance: 0.05,
            name_similarity_threshold: 0.9,
            description_similarity_threshold: 0.7,
            target_label: "target".to_string(),
        }
    }
}

// ============================================================================
// RECON CONFIG
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconConfig {
    pub loader: LoaderConfig,
    pub validation: ValidationConfig,
    pub matching: MatchConfig,
    pub diff: DiffConfig,
}

impl ReconConfig {
    /// Load config from a JSON file; missing keys fall back to defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: ReconConfig = serde_json::from_str(content)
            .map_err(|e| ReconError::Config(format!("failed to parse config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the validation policy with a level preset
    pub fn with_level(mut self, level: ValidationLevel) -> Self {
        self.validation = ValidationConfig::for_level(level);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(ReconError::Config(format!(
                "fuzzy_threshold must be within 0.0..=1.0, got {}",
                self.matching.fuzzy_threshold
            )));
        }
        if self.diff.price_tolerance < 0.0 {
            return Err(ReconError::Config(format!(
                "price_tolerance must be non-negative, got {}",
                self.diff.price_tolerance
            )));
        }
        if self.loader.encodings.is_empty() {
            return Err(ReconError::Config("at least one encoding is required".to_string()));
        }
        if self.loader.chunk_size == 0 {
            return Err(ReconError::Config("chunk_size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();

        assert_eq!(config.matching.fuzzy_threshold, 0.8);
        assert_eq!(config.diff.price_tolerance, 0.05);
        assert_eq!(config.loader.min_recognized_headers, 2);
        assert!(!config.validation.allow_negative_prices);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ReconConfig::from_json(
            r#"{ "diff": { "price_tolerance": 0.1 }, "loader": { "min_recognized_headers": 1 } }"#,
        )
        .unwrap();

        assert_eq!(config.diff.price_tolerance, 0.1);
        assert_eq!(config.diff.target_label, "target");
        assert_eq!(config.loader.min_recognized_headers, 1);
        assert_eq!(config.loader.required_columns.len(), 4);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let err = ReconConfig::from_json(r#"{ "matching": { "fuzzy_threshold": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ReconError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "diff": {{ "target_label": "krowne.com" }} }}"#).unwrap();

        let config = ReconConfig::from_file(file.path()).unwrap();
        assert_eq!(config.diff.target_label, "krowne.com");
    }

    #[test]
    fn test_level_presets() {
        let strict = ValidationConfig::for_level(ValidationLevel::Strict);
        let lenient = ValidationConfig::for_level(ValidationLevel::Lenient);

        assert!(strict.drop_missing_name);
        assert!(lenient.allow_negative_prices);
        assert_eq!("STRICT".parse::<ValidationLevel>().unwrap(), ValidationLevel::Strict);
        assert!("extreme".parse::<ValidationLevel>().is_err());
    }
}
