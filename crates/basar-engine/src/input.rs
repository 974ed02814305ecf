//! Input adapter: turns one source document into a batch of raw records.
//!
//! ## Observed document shapes
//!
//! Acquisition scripts emit product lists in several envelopes:
//!
//! - a bare JSON array of product objects;
//! - `{"products": [...], "metadata": {...}}` from catalog exports;
//! - `{"unified_products": [...]}` from earlier unification runs;
//! - `{"meat_products": [...]}` from the government-feed filters;
//! - ad-hoc report objects whose product list sits under some other key.
//!
//! Each envelope is an [`InputShape`], tried in declaration order. A shape
//! only matches when its candidate value is an array made entirely of JSON
//! objects, so a stray `"products": 12` or an array of strings never gets
//! mistaken for a product list.

use basar_core::RawProductRecord;
use serde_json::{Map, Value};

use crate::error::EngineError;

/// Known document envelopes, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    BareArray,
    ProductsKey,
    UnifiedProductsKey,
    MeatProductsKey,
    /// The first top-level field, in document order, holding a non-empty
    /// array of objects.
    FirstNonEmptyArray,
}

impl InputShape {
    pub const PRIORITY: [InputShape; 5] = [
        InputShape::BareArray,
        InputShape::ProductsKey,
        InputShape::UnifiedProductsKey,
        InputShape::MeatProductsKey,
        InputShape::FirstNonEmptyArray,
    ];

    /// Returns the product list this shape locates in `doc`, if the shape
    /// applies and the list validates.
    fn locate<'a>(self, doc: &'a Value) -> Option<&'a Vec<Value>> {
        let candidate = match self {
            InputShape::BareArray => doc.as_array(),
            InputShape::ProductsKey => keyed_array(doc, "products"),
            InputShape::UnifiedProductsKey => keyed_array(doc, "unified_products"),
            InputShape::MeatProductsKey => keyed_array(doc, "meat_products"),
            InputShape::FirstNonEmptyArray => doc
                .as_object()?
                .values()
                .filter_map(Value::as_array)
                .find(|items| !items.is_empty() && all_objects(items)),
        }?;
        all_objects(candidate).then_some(candidate)
    }
}

impl std::fmt::Display for InputShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InputShape::BareArray => "bare array",
            InputShape::ProductsKey => "products",
            InputShape::UnifiedProductsKey => "unified_products",
            InputShape::MeatProductsKey => "meat_products",
            InputShape::FirstNonEmptyArray => "first non-empty array",
        };
        f.write_str(name)
    }
}

fn keyed_array<'a>(doc: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    doc.as_object()?.get(key)?.as_array()
}

fn all_objects(items: &[Value]) -> bool {
    items.iter().all(Value::is_object)
}

/// Records read from one source document.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    /// Source name, usually the file name.
    pub name: String,
    pub shape: InputShape,
    pub records: Vec<RawProductRecord>,
    /// Objects that could not be read as a product record.
    pub rejected: usize,
}

/// Parses a source document and extracts its product records.
///
/// # Errors
///
/// Returns [`EngineError::MalformedSource`] if `content` is not valid JSON and
/// [`EngineError::UnrecognizedShape`] if no [`InputShape`] matches.
pub fn parse_source(name: &str, content: &str) -> Result<SourceBatch, EngineError> {
    let doc: Value = serde_json::from_str(content).map_err(|e| EngineError::MalformedSource {
        source_name: name.to_string(),
        source: e,
    })?;
    read_document(name, &doc)
}

/// Extracts product records from an already-parsed document.
///
/// # Errors
///
/// Returns [`EngineError::UnrecognizedShape`] if no [`InputShape`] matches.
pub fn read_document(name: &str, doc: &Value) -> Result<SourceBatch, EngineError> {
    let (shape, items) = InputShape::PRIORITY
        .iter()
        .find_map(|shape| shape.locate(doc).map(|items| (*shape, items)))
        .ok_or_else(|| EngineError::UnrecognizedShape {
            source_name: name.to_string(),
            reason: describe(doc),
        })?;

    let mut records = Vec::with_capacity(items.len());
    let mut rejected = 0usize;
    for (idx, item) in items.iter().enumerate() {
        match serde_json::from_value::<RawProductRecord>(item.clone()) {
            Ok(mut record) => {
                record.origin = Some(name.to_string());
                records.push(record);
            }
            Err(e) => {
                tracing::debug!(source = name, index = idx, error = %e, "skipping unreadable record");
                rejected += 1;
            }
        }
    }

    tracing::debug!(
        source = name,
        %shape,
        records = records.len(),
        rejected,
        "source parsed"
    );

    Ok(SourceBatch {
        name: name.to_string(),
        shape,
        records,
        rejected,
    })
}

fn describe(doc: &Value) -> String {
    match doc {
        Value::Object(map) => describe_object(map),
        Value::Array(_) => "top-level array contains non-object elements".to_string(),
        Value::Null => "document is null".to_string(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            "document is a scalar value".to_string()
        }
    }
}

fn describe_object(map: &Map<String, Value>) -> String {
    if map.is_empty() {
        return "document is an empty object".to_string();
    }
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    format!("no array of product objects under keys [{}]", keys.join(", "))
}
