// 📦 Records - raw rows and the canonical ProductRecord

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of tabular input, keyed by canonical column name.
/// Blank cells are present as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// 1-based line in the decoded input (0 for records not read from a file)
    pub line: u64,
    pub fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new(line: u64) -> Self {
        RawRecord {
            line,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }
}

/// Value of a non-critical catalog attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    List(Vec<String>),
    Text(String),
    Number(Option<f64>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => *n,
            _ => None,
        }
    }
}

/// Canonical unit of comparison.
///
/// Core fields are fixed; everything else a catalog carries lands in
/// `list_fields` / `extra_fields` so new columns never change this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "product_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub list_fields: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, FieldValue>,
}

impl ProductRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        ProductRecord {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set price
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set a text attribute
    pub fn with_extra(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields
            .insert(field.into(), FieldValue::Text(value.into()));
        self
    }

    /// Builder: set a list attribute
    pub fn with_list(mut self, field: impl Into<String>, values: Vec<String>) -> Self {
        self.list_fields.insert(field.into(), values);
        self
    }

    /// Text attribute, empty if absent or not text
    pub fn extra_text(&self, field: &str) -> &str {
        self.extra_fields
            .get(field)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
    }

    /// List attribute, empty if absent
    pub fn list(&self, field: &str) -> &[String] {
        self.list_fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn availability(&self) -> &str {
        self.extra_text("availability")
    }

    pub fn url(&self) -> Option<&str> {
        let url = self.extra_text("url");
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}
