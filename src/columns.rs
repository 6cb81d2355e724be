// 🏛️ Column Registry - the canonical column set for catalog input
// Columns are data: name, kind, aliases. Loader and Normalizer both read it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// FIELD KINDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Prices, measurements, quantities
    Numeric,
    /// Free text
    Text,
    /// Delimited or JSON-array list cells
    List,
}

// ============================================================================
// COLUMN DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Canonical name (e.g., "product_id")
    pub name: String,

    pub kind: FieldKind,

    /// Part of the comparison-critical set (id, name, price, description)
    pub critical: bool,

    /// Alternative header spellings, already in key form
    pub aliases: Vec<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        ColumnDefinition {
            name: name.into(),
            kind,
            critical: false,
            aliases: Vec::new(),
        }
    }

    /// Builder: mark as comparison-critical
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Builder: add a header alias
    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(column_key(alias));
        self
    }
}

/// Fold a header cell into lookup form: trimmed, lowercase, inner
/// whitespace/hyphen/dot runs become a single `_`.
pub fn column_key(header: &str) -> String {
    let mut key = String::with_capacity(header.len());
    let mut pending_sep = false;

    for c in header.trim().trim_start_matches('\u{feff}').chars() {
        if c.is_whitespace() || c == '-' || c == '.' || c == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !key.is_empty() {
            key.push('_');
        }
        pending_sep = false;
        key.extend(c.to_lowercase());
    }

    key
}

// ============================================================================
// COLUMN REGISTRY
// ============================================================================

/// Ordered catalog of canonical columns.
///
/// Order matters: headerless input gets these names positionally.
#[derive(Debug, Clone)]
pub struct ColumnRegistry {
    columns: Vec<ColumnDefinition>,
    lookup: HashMap<String, usize>,
}

impl ColumnRegistry {
    /// Registry with the built-in product catalog columns
    pub fn new() -> Self {
        let mut registry = ColumnRegistry {
            columns: Vec::new(),
            lookup: HashMap::new(),
        };

        registry.register_catalog_columns();
        registry
    }

    fn register_catalog_columns(&mut self) {
        use FieldKind::*;

        // ====================================================================
        // COMPARISON-CRITICAL
        // ====================================================================

        self.register(
            ColumnDefinition::new("product_id", Text)
                .critical()
                .with_alias("id")
                .with_alias("product id")
                .with_alias("product code")
                .with_alias("productcode")
                .with_alias("item number")
                .with_alias("item no")
                .with_alias("model number"),
        );
        self.register(
            ColumnDefinition::new("name", Text)
                .critical()
                .with_alias("product name")
                .with_alias("item name")
                .with_alias("title"),
        );
        self.register(
            ColumnDefinition::new("price", Numeric)
                .critical()
                .with_alias("unit price")
                .with_alias("unitprice")
                .with_alias("list price"),
        );
        self.register(
            ColumnDefinition::new("description", Text)
                .critical()
                .with_alias("desc")
                .with_alias("product description")
                .with_alias("long description"),
        );

        // ====================================================================
        // CATALOG ATTRIBUTES
        // ====================================================================

        self.register(
            ColumnDefinition::new("category", Text)
                .with_alias("family")
                .with_alias("product family")
                .with_alias("collection"),
        );
        self.register(ColumnDefinition::new("brand", Text).with_alias("manufacturer"));
        self.register(ColumnDefinition::new("sku", Text));
        self.register(
            ColumnDefinition::new("availability", Text)
                .with_alias("stock status")
                .with_alias("in stock"),
        );
        self.register(
            ColumnDefinition::new("url", Text)
                .with_alias("product url")
                .with_alias("link"),
        );
        self.register(ColumnDefinition::new("finish", Text));
        self.register(ColumnDefinition::new("material", Text));
        self.register(ColumnDefinition::new("upc", Text).with_alias("gtin").with_alias("barcode"));

        // ====================================================================
        // LIST ATTRIBUTES
        // ====================================================================

        self.register(
            ColumnDefinition::new("images", List)
                .with_alias("image urls")
                .with_alias("image url")
                .with_alias("image"),
        );
        self.register(
            ColumnDefinition::new("related_products", List)
                .with_alias("related")
                .with_alias("accessories"),
        );
        self.register(ColumnDefinition::new("features", List).with_alias("bullet points"));
        self.register(ColumnDefinition::new("tags", List).with_alias("keywords"));

        // ====================================================================
        // NUMERIC ATTRIBUTES
        // ====================================================================

        self.register(ColumnDefinition::new("msrp", Numeric));
        self.register(ColumnDefinition::new("sale_price", Numeric));
        self.register(
            ColumnDefinition::new("weight", Numeric)
                .with_alias("weight lbs")
                .with_alias("shipping weight"),
        );
        self.register(ColumnDefinition::new("width", Numeric));
        self.register(ColumnDefinition::new("height", Numeric));
        self.register(ColumnDefinition::new("depth", Numeric).with_alias("length"));
        self.register(
            ColumnDefinition::new("quantity", Numeric)
                .with_alias("qty")
                .with_alias("stock quantity")
                .with_alias("inventory"),
        );
    }

    /// Register a column (appended to positional order)
    pub fn register(&mut self, column: ColumnDefinition) {
        let index = self.columns.len();
        self.lookup.entry(column_key(&column.name)).or_insert(index);
        for alias in &column.aliases {
            self.lookup.entry(alias.clone()).or_insert(index);
        }
        self.columns.push(column);
    }

    /// Resolve a raw header cell (any spelling or alias) to its column
    pub fn resolve(&self, header: &str) -> Option<&ColumnDefinition> {
        self.lookup
            .get(&column_key(header))
            .map(|&index| &self.columns[index])
    }

    /// Get a column by canonical name
    pub fn get(&self, name: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Field kind for a canonical name; unknown names are treated as text
    pub fn kind_of(&self, name: &str) -> FieldKind {
        self.get(name).map(|c| c.kind).unwrap_or(FieldKind::Text)
    }

    /// Canonical name at a position (headerless input)
    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.columns.get(position).map(|c| c.name.as_str())
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn count(&self) -> usize {
        self.columns.len()
    }
}

impl Default for ColumnRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_key_folding() {
        assert_eq!(column_key("  Product ID "), "product_id");
        assert_eq!(column_key("Unit-Price"), "unit_price");
        assert_eq!(column_key("PRICE"), "price");
        assert_eq!(column_key("\u{feff}product_id"), "product_id");
        assert_eq!(column_key("related   products"), "related_products");
    }

    #[test]
    fn test_critical_columns_lead_positional_order() {
        let registry = ColumnRegistry::new();

        assert_eq!(registry.name_at(0), Some("product_id"));
        assert_eq!(registry.name_at(1), Some("name"));
        assert_eq!(registry.name_at(2), Some("price"));
        assert_eq!(registry.name_at(3), Some("description"));
        assert!(registry.columns()[..4].iter().all(|c| c.critical));
    }

    #[test]
    fn test_resolve_aliases() {
        let registry = ColumnRegistry::new();

        assert_eq!(registry.resolve("Product Code").unwrap().name, "product_id");
        assert_eq!(registry.resolve("Title").unwrap().name, "name");
        assert_eq!(registry.resolve("Unit Price").unwrap().name, "price");
        assert_eq!(registry.resolve("Image URLs").unwrap().name, "images");
        assert!(registry.resolve("warehouse_bin").is_none());
    }

    #[test]
    fn test_kind_of() {
        let registry = ColumnRegistry::new();

        assert_eq!(registry.kind_of("price"), FieldKind::Numeric);
        assert_eq!(registry.kind_of("images"), FieldKind::List);
        assert_eq!(registry.kind_of("availability"), FieldKind::Text);
        assert_eq!(registry.kind_of("not_a_column"), FieldKind::Text);
    }

    #[test]
    fn test_register_custom_column() {
        let mut registry = ColumnRegistry::new();
        let initial = registry.count();

        registry.register(ColumnDefinition::new("voltage", FieldKind::Numeric).with_alias("Volts"));

        assert_eq!(registry.count(), initial + 1);
        assert_eq!(registry.resolve("volts").unwrap().name, "voltage");
        assert_eq!(registry.name_at(initial), Some("voltage"));
    }
}
