// 🧹 Field Normalizer - raw cell text → canonical values
//
// Pure functions. Each cell is normalized according to its column's
// FieldKind; absent numbers stay absent (never coerced to zero).

use crate::columns::{column_key, ColumnRegistry, FieldKind};
use crate::record::{FieldValue, ProductRecord, RawRecord};
use serde_json::{Map, Value};

/// Cell values treated as "no value" (compared case-insensitively).
const PLACEHOLDERS: [&str; 3] = ["nan", "none", "null"];

/// List delimiters, highest priority first.
const LIST_DELIMITERS: [char; 5] = [',', ';', '|', '\n', '\t'];

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];

// ============================================================================
// NORMALIZED VALUE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    Number(Option<f64>),
    Text(String),
    List(Vec<String>),
}

impl NormalizedValue {
    /// Render back into cell text that normalizes to the same value.
    pub fn to_raw(&self) -> String {
        match self {
            NormalizedValue::Number(Some(n)) => n.to_string(),
            NormalizedValue::Number(None) => String::new(),
            NormalizedValue::Text(s) => s.clone(),
            NormalizedValue::List(items) => {
                serde_json::to_string(items).unwrap_or_default()
            }
        }
    }
}

impl From<NormalizedValue> for FieldValue {
    fn from(value: NormalizedValue) -> Self {
        match value {
            NormalizedValue::Number(n) => FieldValue::Number(n),
            NormalizedValue::Text(s) => FieldValue::Text(s),
            NormalizedValue::List(items) => FieldValue::List(items),
        }
    }
}

// ============================================================================
// CELL NORMALIZATION
// ============================================================================

fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || PLACEHOLDERS.iter().any(|p| value.eq_ignore_ascii_case(p))
}

/// Normalize one cell according to its kind
pub fn normalize_value(raw: &str, kind: FieldKind) -> NormalizedValue {
    match kind {
        FieldKind::Numeric => NormalizedValue::Number(normalize_number(raw)),
        FieldKind::Text => NormalizedValue::Text(normalize_text(raw)),
        FieldKind::List => NormalizedValue::List(normalize_list(raw)),
    }
}

/// Numeric cells: "$1,299.00" → 1299.0, "10-20" → 10.0, "n/a" → None
pub fn normalize_number(raw: &str) -> Option<f64> {
    if is_placeholder(raw) {
        return None;
    }

    let cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && *c != '%' && !c.is_whitespace())
        .collect();

    if is_placeholder(&cleaned) {
        return None;
    }

    if let Ok(value) = cleaned.parse::<f64>() {
        return Some(value).filter(|v| v.is_finite());
    }

    // Range: take the first bound. A leading '-' is a sign, not a range.
    let (first, _) = cleaned
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-')
        .map(|(i, _)| cleaned.split_at(i))?;

    first.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Free-text cells: trimmed, placeholders become ""
pub fn normalize_text(raw: &str) -> String {
    if is_placeholder(raw) {
        String::new()
    } else {
        raw.trim().to_string()
    }
}

/// List cells: JSON arrays or delimited text → trimmed, non-empty items
pub fn normalize_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if is_placeholder(trimmed) {
        return Vec::new();
    }

    let mut body = trimmed;
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(items) => {
                return items
                    .iter()
                    .filter_map(json_scalar_text)
                    .filter_map(|item| clean_list_item(&item))
                    .collect();
            }
            Err(_) => body = &trimmed[1..trimmed.len() - 1],
        }
    }

    match LIST_DELIMITERS.iter().find(|d| body.contains(**d)) {
        Some(delimiter) => body.split(*delimiter).filter_map(clean_list_item).collect(),
        None => clean_list_item(body).into_iter().collect(),
    }
}

fn clean_list_item(item: &str) -> Option<String> {
    if is_placeholder(item) {
        None
    } else {
        Some(item.trim().to_string())
    }
}

/// Stringify a JSON value the way a cell would hold it; null has no text.
fn json_scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ============================================================================
// RECORD NORMALIZATION
// ============================================================================

/// Builds ProductRecords from raw rows or JSON mappings using the column registry
pub struct FieldNormalizer {
    registry: ColumnRegistry,
}

impl FieldNormalizer {
    pub fn new() -> Self {
        FieldNormalizer {
            registry: ColumnRegistry::new(),
        }
    }

    pub fn with_registry(registry: ColumnRegistry) -> Self {
        FieldNormalizer { registry }
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    /// Normalize a loader row (keys are already canonical names)
    pub fn normalize_record(&self, raw: &RawRecord) -> ProductRecord {
        let mut record = ProductRecord::default();

        for (column, value) in &raw.fields {
            let kind = self.registry.kind_of(column);
            self.apply(&mut record, column, normalize_value(value, kind));
        }

        record
    }

    pub fn normalize_records(&self, raws: &[RawRecord]) -> Vec<ProductRecord> {
        raws.iter().map(|raw| self.normalize_record(raw)).collect()
    }

    /// Normalize an already-fetched mapping (CRM rows, scraped products).
    ///
    /// Keys are resolved through the registry; unknown keys are kept as
    /// extra fields with a kind inferred from the JSON value.
    pub fn normalize_mapping(&self, mapping: &Map<String, Value>) -> ProductRecord {
        let mut record = ProductRecord::default();

        for (key, value) in mapping {
            let (column, kind) = match self.registry.resolve(key) {
                Some(def) => (def.name.clone(), def.kind),
                None => (column_key(key), infer_kind(value)),
            };

            let raw = match value {
                Value::Array(_) | Value::Object(_) => value.to_string(),
                other => json_scalar_text(other).unwrap_or_default(),
            };

            self.apply(&mut record, &column, normalize_value(&raw, kind));
        }

        record
    }

    pub fn normalize_mappings(&self, mappings: &[Map<String, Value>]) -> Vec<ProductRecord> {
        mappings.iter().map(|m| self.normalize_mapping(m)).collect()
    }

    fn apply(&self, record: &mut ProductRecord, column: &str, value: NormalizedValue) {
        match (column, value) {
            // First non-empty id wins when several keys alias to it
            ("product_id", NormalizedValue::Text(id)) => {
                if record.id.is_empty() {
                    record.id = id;
                }
            }
            ("name", NormalizedValue::Text(name)) => {
                if record.name.is_empty() {
                    record.name = name;
                }
            }
            ("description", NormalizedValue::Text(desc)) => {
                if record.description.is_empty() {
                    record.description = desc;
                }
            }
            ("price", NormalizedValue::Number(price)) => {
                if record.price.is_none() {
                    record.price = price;
                }
            }
            (_, NormalizedValue::List(items)) => {
                record.list_fields.insert(column.to_string(), items);
            }
            (_, other) => {
                record.extra_fields.insert(column.to_string(), other.into());
            }
        }
    }
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn infer_kind(value: &Value) -> FieldKind {
    match value {
        Value::Number(_) => FieldKind::Numeric,
        Value::Array(_) => FieldKind::List,
        _ => FieldKind::Text,
    }
}

// ============================================================================
// TESTS
// ============================================================================
