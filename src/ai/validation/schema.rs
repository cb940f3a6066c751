//! Record Schema
//!
//! [`SchemaDefinition`] describes the classification record and renders the
//! format instructions embedded in prompts. [`SchemaParser`] turns raw
//! completion text back into a [`ClassificationRecord`] or a [`ParseError`].
//!
//! ## Parsing rules
//!
//! - Fenced or prose-wrapped answers are unwrapped; the JSON itself must be
//!   strictly valid.
//! - `sector` may also arrive as `entity`.
//! - `details` may be a string or a list of strings; it is always returned
//!   as a list.
//! - With a product catalog, `product` must be one of the catalog entries or
//!   "Not applicable" (case-insensitive; canonical spelling is returned).

use serde_json::{Map, Value, json};

use super::json_extract::{extract_object_from_mixed, preprocess};
use crate::constants::schema::NOT_APPLICABLE;
use crate::types::{ClassificationRecord, ParseError};

// =============================================================================
// Schema Definition
// =============================================================================

/// JSON shape requested from the model for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TextList,
}

/// One record field as described to the model
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub description: String,
    pub kind: FieldKind,
    /// Alternative keys accepted when parsing
    pub aliases: Vec<String>,
}

impl FieldSpec {
    pub fn new(name: &str, description: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            aliases: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    fn json_schema(&self) -> Value {
        match self.kind {
            FieldKind::Text => json!({
                "description": self.description,
                "type": "string",
            }),
            FieldKind::TextList => json!({
                "description": self.description,
                "type": "array",
                "items": {"type": "string"},
            }),
        }
    }
}

/// Closed set of known product categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCatalog {
    products: Vec<String>,
}

impl ProductCatalog {
    pub fn new<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            products: products.into_iter().map(Into::into).collect(),
        }
    }

    /// Catalog entries followed by the "Not applicable" sentinel
    pub fn allowed_values(&self) -> Vec<&str> {
        self.products
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(NOT_APPLICABLE))
            .collect()
    }

    /// Canonical spelling for `product`, if allowed
    pub fn resolve(&self, product: &str) -> Option<&str> {
        let wanted = product.trim().to_lowercase();
        self.allowed_values()
            .into_iter()
            .find(|allowed| allowed.to_lowercase() == wanted)
    }
}

/// Shape of the classification record
#[derive(Debug, Clone)]
pub struct SchemaDefinition {
    pub sector: FieldSpec,
    pub product: FieldSpec,
    pub details: FieldSpec,
    pub product_catalog: Option<ProductCatalog>,
}

impl Default for SchemaDefinition {
    fn default() -> Self {
        Self::bank_site()
    }
}

impl SchemaDefinition {
    /// Record schema for bank product pages
    pub fn bank_site() -> Self {
        Self {
            sector: FieldSpec::new("sector", "Sector within the bank", FieldKind::Text)
                .with_alias("entity"),
            product: FieldSpec::new("product", "Specific service or product", FieldKind::Text),
            details: FieldSpec::new(
                "details",
                "Specific characteristics of the product",
                FieldKind::TextList,
            ),
            product_catalog: None,
        }
    }

    /// Restrict `product` to a closed catalog
    pub fn with_product_catalog(mut self, catalog: ProductCatalog) -> Self {
        self.product_catalog = Some(catalog);
        self
    }

    /// Ask for `details` as a single string instead of a list
    pub fn with_scalar_details(mut self) -> Self {
        self.details.kind = FieldKind::Text;
        self
    }

    fn fields(&self) -> [&FieldSpec; 3] {
        [&self.sector, &self.product, &self.details]
    }

    /// JSON Schema of the record
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields() {
            properties.insert(field.name.clone(), field.json_schema());
        }

        if let Some(catalog) = &self.product_catalog
            && let Some(Value::Object(product)) = properties.get_mut(&self.product.name)
        {
            product.insert("enum".to_string(), json!(catalog.allowed_values()));
        }

        json!({
            "properties": properties,
            "required": self.fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        })
    }

    fn example(&self) -> Value {
        let product = self
            .product_catalog
            .as_ref()
            .and_then(|c| c.allowed_values().first().map(|p| p.to_string()))
            .unwrap_or_else(|| "Credit Cards".to_string());
        let details = match self.details.kind {
            FieldKind::TextList => json!(["No annual fee", "Cashback rewards"]),
            FieldKind::Text => json!("No annual fee"),
        };

        let mut example = Map::new();
        example.insert(self.sector.name.clone(), json!("Personal Banking"));
        example.insert(self.product.name.clone(), json!(product));
        example.insert(self.details.name.clone(), details);
        Value::Object(example)
    }

    /// Natural-language format instructions for prompts
    pub fn render_instructions(&self) -> String {
        format!(
            "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\
             \n\
             For example, the object {} is a well-formatted instance of the schema. \
             Do not wrap the object in other keys such as \"properties\".\n\
             \n\
             Here is the output schema:\n\
             ```\n\
             {}\n\
             ```",
            self.example(),
            self.json_schema()
        )
    }
}

// =============================================================================
// Schema Parser
// =============================================================================

/// Strict parser for completions produced under a [`SchemaDefinition`]
#[derive(Debug, Clone, Default)]
pub struct SchemaParser {
    schema: SchemaDefinition,
}

impl SchemaParser {
    pub fn new(schema: SchemaDefinition) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Format instructions of the underlying schema
    pub fn format_instructions(&self) -> String {
        self.schema.render_instructions()
    }

    /// Parse raw completion text into a record
    pub fn parse(&self, raw: &str) -> Result<ClassificationRecord, ParseError> {
        let value = decode_object(raw)?;
        let object = value
            .as_object()
            .ok_or_else(|| ParseError::new(raw, "expected a JSON object"))?;

        let sector = required_text(raw, object, &self.schema.sector)?;
        let mut product = required_text(raw, object, &self.schema.product)?;
        let details = required_list(raw, object, &self.schema.details)?;

        if let Some(catalog) = &self.schema.product_catalog {
            product = catalog
                .resolve(&product)
                .map(String::from)
                .ok_or_else(|| {
                    ParseError::new(
                        raw,
                        format!(
                            "product '{}' is not one of: {}",
                            product,
                            catalog.allowed_values().join(", ")
                        ),
                    )
                })?;
        }

        Ok(ClassificationRecord {
            sector,
            product,
            details,
        })
    }
}

fn decode_object(raw: &str) -> Result<Value, ParseError> {
    let cleaned = preprocess(raw);

    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => Ok(value),
        Err(direct_err) => extract_object_from_mixed(&cleaned)
            .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
            .ok_or_else(|| ParseError::new(raw, format!("invalid JSON: {}", direct_err))),
    }
}

fn lookup<'a>(object: &'a Map<String, Value>, field: &FieldSpec) -> Option<&'a Value> {
    object
        .get(&field.name)
        .or_else(|| field.aliases.iter().find_map(|alias| object.get(alias)))
}

fn required_text(
    raw: &str,
    object: &Map<String, Value>,
    field: &FieldSpec,
) -> Result<String, ParseError> {
    match lookup(object, field) {
        None => Err(ParseError::new(
            raw,
            format!("missing required field '{}'", field.name),
        )),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ParseError::new(
            raw,
            format!("field '{}' must not be empty", field.name),
        )),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(ParseError::new(
            raw,
            format!("field '{}' must be a string, got {}", field.name, kind_of(other)),
        )),
    }
}

fn required_list(
    raw: &str,
    object: &Map<String, Value>,
    field: &FieldSpec,
) -> Result<Vec<String>, ParseError> {
    match lookup(object, field) {
        None => Err(ParseError::new(
            raw,
            format!("missing required field '{}'", field.name),
        )),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ParseError::new(
                    raw,
                    format!(
                        "field '{}' must contain only strings, got {}",
                        field.name,
                        kind_of(other)
                    ),
                )),
            })
            .collect(),
        Some(other) => Err(ParseError::new(
            raw,
            format!(
                "field '{}' must be a string or a list of strings, got {}",
                field.name,
                kind_of(other)
            ),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parser() -> SchemaParser {
        SchemaParser::new(SchemaDefinition::bank_site())
    }

    #[test]
    fn test_parse_list_details() {
        let record = parser()
            .parse(r#"{"sector": "Personal Banking", "product": "Credit Cards", "details": ["No annual fee"]}"#)
            .unwrap();
        assert_eq!(record.sector, "Personal Banking");
        assert_eq!(record.product, "Credit Cards");
        assert_eq!(record.details, vec!["No annual fee"]);
    }

    #[test]
    fn test_parse_scalar_details_normalized() {
        let record = parser()
            .parse(r#"{"sector": "Business Banking", "product": "Loans", "details": "Low interest rates"}"#)
            .unwrap();
        assert_eq!(record.details, vec!["Low interest rates"]);
    }

    #[test]
    fn test_parse_entity_alias() {
        let record = parser()
            .parse(r#"{"entity": "Personal Banking", "product": "Savings Accounts", "details": "Interest"}"#)
            .unwrap();
        assert_eq!(record.sector, "Personal Banking");
    }

    #[test]
    fn test_parse_fenced_and_wrapped() {
        let fenced = "```json\n{\"sector\": \"A\", \"product\": \"B\", \"details\": []}\n```";
        assert!(parser().parse(fenced).is_ok());

        let wrapped = "Here you go: {\"sector\": \"A\", \"product\": \"B\", \"details\": []} Thanks";
        assert!(parser().parse(wrapped).is_ok());

        let stray = "Note {see below: {\"sector\": \"A\", \"product\": \"B\", \"details\": []}";
        assert_eq!(parser().parse(stray).unwrap().sector, "A");
    }

    #[test]
    fn test_invalid_json_keeps_raw_text() {
        let raw = "Sector: Personal Banking, Product: Cards";
        let err = parser().parse(raw).unwrap_err();
        assert_eq!(err.raw, raw);
        assert!(err.reason.contains("invalid JSON"));
    }

    #[test]
    fn test_broken_json_is_not_patched() {
        let err = parser()
            .parse(r#"{"sector": "A", "product": "B", "details": ["x",]}"#)
            .unwrap_err();
        assert!(err.reason.contains("invalid JSON"));
    }

    #[test]
    fn test_missing_field() {
        let err = parser()
            .parse(r#"{"sector": "A", "details": []}"#)
            .unwrap_err();
        assert!(err.reason.contains("missing required field 'product'"));
    }

    #[test]
    fn test_wrong_shapes() {
        let err = parser()
            .parse(r#"{"sector": ["A"], "product": "B", "details": []}"#)
            .unwrap_err();
        assert!(err.reason.contains("'sector' must be a string"));

        let err = parser()
            .parse(r#"{"sector": "A", "product": "B", "details": 3}"#)
            .unwrap_err();
        assert!(err.reason.contains("string or a list of strings"));

        let err = parser()
            .parse(r#"{"sector": "A", "product": "B", "details": ["ok", 1]}"#)
            .unwrap_err();
        assert!(err.reason.contains("only strings"));
    }

    #[test]
    fn test_blank_sector_rejected() {
        let err = parser()
            .parse(r#"{"sector": "  ", "product": "B", "details": []}"#)
            .unwrap_err();
        assert!(err.reason.contains("must not be empty"));
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parser().parse(r#"["sector", "product"]"#).unwrap_err();
        assert!(err.reason.contains("JSON object"));
    }

    #[test]
    fn test_product_catalog() {
        let schema = SchemaDefinition::bank_site()
            .with_product_catalog(ProductCatalog::new(["Credit Cards", "Mortgage Loans"]));
        let parser = SchemaParser::new(schema);

        let record = parser
            .parse(r#"{"sector": "A", "product": "credit cards", "details": []}"#)
            .unwrap();
        assert_eq!(record.product, "Credit Cards");

        let record = parser
            .parse(r#"{"sector": "A", "product": "not applicable", "details": []}"#)
            .unwrap();
        assert_eq!(record.product, NOT_APPLICABLE);

        let err = parser
            .parse(r#"{"sector": "A", "product": "Crypto", "details": []}"#)
            .unwrap_err();
        assert!(err.reason.contains("not one of"));
    }

    #[test]
    fn test_product_catalog_non_ascii_case() {
        let schema = SchemaDefinition::bank_site()
            .with_product_catalog(ProductCatalog::new(["Épargne", "Crédit Immobilier"]));
        let parser = SchemaParser::new(schema);

        let record = parser
            .parse(r#"{"sector": "A", "product": "épargne", "details": []}"#)
            .unwrap();
        assert_eq!(record.product, "Épargne");

        let record = parser
            .parse(r#"{"sector": "A", "product": "CRÉDIT IMMOBILIER", "details": []}"#)
            .unwrap();
        assert_eq!(record.product, "Crédit Immobilier");
    }

    #[test]
    fn test_render_instructions() {
        let instructions = SchemaDefinition::bank_site().render_instructions();
        assert!(instructions.contains("JSON schema"));
        assert!(instructions.contains("\"sector\""));
        assert!(instructions.contains("\"required\""));
        assert!(instructions.contains("\"array\""));
        assert!(!instructions.contains("enum"));
    }

    #[test]
    fn test_render_instructions_with_catalog() {
        let schema = SchemaDefinition::bank_site()
            .with_product_catalog(ProductCatalog::new(["Credit Cards"]));
        let rendered = schema.json_schema();
        assert_eq!(
            rendered["properties"]["product"]["enum"],
            json!(["Credit Cards", NOT_APPLICABLE])
        );
    }

    #[test]
    fn test_rendered_example_parses() {
        // The example embedded in the instructions must satisfy the parser
        for schema in [
            SchemaDefinition::bank_site(),
            SchemaDefinition::bank_site().with_scalar_details(),
            SchemaDefinition::bank_site().with_product_catalog(ProductCatalog::new(["Loans"])),
        ] {
            let example = schema.example().to_string();
            assert!(SchemaParser::new(schema).parse(&example).is_ok());
        }
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            sector in "[A-Za-z][A-Za-z ]{0,20}",
            product in "[A-Za-z][A-Za-z ]{0,20}",
            details in proptest::collection::vec("[ -~]{0,20}", 0..5),
        ) {
            let record = ClassificationRecord::new(sector, product, details);
            let text = serde_json::to_string(&record).unwrap();
            prop_assert_eq!(parser().parse(&text).unwrap(), record);
        }
    }
}
