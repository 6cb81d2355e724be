// 🏢 CRM Mapping - Salesforce Product2 rows → catalog mappings
//
// Fetching is someone else's job. This module only reshapes rows that were
// already retrieved (a SOQL query response) so the normalizer can read them.

use crate::error::{ReconError, Result};
use crate::normalizer::FieldNormalizer;
use crate::record::ProductRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One `Product2` row as returned by the REST query endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product2 {
    pub id: Option<String>,
    pub name: Option<String>,
    pub product_code: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub is_active: Option<bool>,
    pub family: Option<String>,
}

impl Product2 {
    /// Catalog id: ProductCode when set, Salesforce record Id otherwise
    pub fn product_id(&self) -> &str {
        self.product_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .or(self.id.as_deref())
            .unwrap_or("")
    }

    pub fn to_mapping(&self) -> Map<String, Value> {
        let text = |value: &Option<String>| value.clone().map(Value::String).unwrap_or(Value::Null);

        let mut mapping = Map::new();
        mapping.insert("product_id".into(), Value::String(self.product_id().to_string()));
        mapping.insert("name".into(), text(&self.name));
        mapping.insert(
            "price".into(),
            self.unit_price.map(Value::from).unwrap_or(Value::Null),
        );
        mapping.insert("description".into(), text(&self.description));
        mapping.insert("category".into(), text(&self.family));
        mapping.insert("salesforce_id".into(), text(&self.id));
        mapping.insert("is_active".into(), Value::Bool(self.is_active.unwrap_or(false)));
        mapping
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<Product2>,
}

/// Parse a `{"records": [...]}` query response body
pub fn parse_query_response(body: &str) -> Result<Vec<Product2>> {
    let response: QueryResponse =
        serde_json::from_str(body).map_err(|e| ReconError::MalformedInput {
            line: e.line() as u64,
            message: format!("invalid CRM response: {e}"),
        })?;
    Ok(response.records)
}

/// Normalize fetched rows into source records
pub fn crm_records(normalizer: &FieldNormalizer, products: &[Product2]) -> Vec<ProductRecord> {
    products
        .iter()
        .map(|p| normalizer.normalize_mapping(&p.to_mapping()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    const RESPONSE: &str = r#"{
        "totalSize": 2,
        "done": true,
        "records": [
            {
                "attributes": {"type": "Product2"},
                "Id": "01t000000000001",
                "Name": "  Beer Faucet Deluxe ",
                "ProductCode": "BF-100",
                "Description": "Chrome faucet",
                "UnitPrice": 149.5,
                "IsActive": true,
                "Family": "Faucets"
            },
            {
                "attributes": {"type": "Product2"},
                "Id": "01t000000000002",
                "Name": "Drip Tray",
                "ProductCode": null,
                "Description": null,
                "IsActive": true,
                "Family": null
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_normalize() {
        let products = parse_query_response(RESPONSE).unwrap();
        assert_eq!(products.len(), 2);

        let records = crm_records(&FieldNormalizer::new(), &products);

        assert_eq!(records[0].id, "BF-100");
        assert_eq!(records[0].name, "Beer Faucet Deluxe");
        assert_eq!(records[0].price, Some(149.5));
        assert_eq!(records[0].extra_text("category"), "Faucets");
        assert_eq!(
            records[0].extra_fields.get("salesforce_id"),
            Some(&FieldValue::Text("01t000000000001".to_string()))
        );

        // No ProductCode: falls back to the record Id, price stays absent
        assert_eq!(records[1].id, "01t000000000002");
        assert_eq!(records[1].price, None);
        assert_eq!(records[1].description, "");

        println!("✅ CRM rows normalized: {} records", records.len());
    }

    #[test]
    fn test_blank_product_code_falls_back() {
        let product = Product2 {
            id: Some("01tX".to_string()),
            product_code: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(product.product_id(), "01tX");
    }

    #[test]
    fn test_invalid_response() {
        let err = parse_query_response("{not json").unwrap_err();
        assert!(matches!(err, ReconError::MalformedInput { line: 1, .. }));
    }
}
