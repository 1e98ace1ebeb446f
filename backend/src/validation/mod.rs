//! JSON Schema validation for reference table files.
//!
//! The schema is embedded at compile time from
//! `schemas/reference-tables.json` and checked with JSON Schema Draft 7
//! before a tables file is deserialized, so a malformed file is reported
//! with every problem at once instead of the first serde error.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use localtrip::validation::validate_reference_tables;
//!
//! let doc = json!({ "columns": [] });
//! let errors = validate_reference_tables(&doc).unwrap_err();
//! assert!(!errors.is_empty());
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static REFERENCE_TABLES_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/reference-tables.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick true/false check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a reference tables document.
pub fn validate_reference_tables(data: &Value) -> Result<(), Vec<String>> {
    validate(&REFERENCE_TABLES_SCHEMA, data)
}

/// Quick check against the reference tables schema.
pub fn is_valid_reference_tables(data: &Value) -> bool {
    is_valid(&REFERENCE_TABLES_SCHEMA, data)
}
