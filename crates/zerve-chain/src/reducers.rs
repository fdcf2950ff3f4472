//! Built-in reducers for chains that behave like a keyed store.
//!
//! State shape: an object mapping entry names to nodes `{ value, schema? }`,
//! plus an optional `$schemas` object of named schemas. Entry names may not
//! start with `$`; that prefix is reserved for store metadata.
//!
//! A node whose `schema` is set must hold a value that validates against it;
//! writes that would break this are rejected.

use serde_json::{Map, Value};

use crate::registry::{ActionRegistry, ReducerError};

const SCHEMAS_KEY: &str = "$schemas";

/// Registry holding the keyed-store action types:
/// `WriteValue`, `WriteSchemaValue`, `Delete` and `WriteSchema`.
pub fn store_reducers() -> ActionRegistry {
    ActionRegistry::new()
        .with("WriteValue", write_value)
        .with("WriteSchemaValue", write_schema_value)
        .with("Delete", delete)
        .with("WriteSchema", write_schema)
}

fn entries(state: Option<&Value>) -> Map<String, Value> {
    state
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn str_field<'a>(action: &'a Value, field: &str) -> Result<&'a str, ReducerError> {
    action
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ReducerError::new(format!("action needs a string '{field}'")))
}

fn entry_name<'a>(action: &'a Value) -> Result<&'a str, ReducerError> {
    let name = str_field(action, "name")?;
    if name.starts_with('$') {
        return Err(ReducerError::new(format!(
            "entry name {name:?} must not start with '$'"
        )));
    }
    Ok(name)
}

/// Check a node's value against its schema. A missing or null schema accepts
/// anything.
fn validate_node(name: &str, node: &Map<String, Value>) -> Result<(), ReducerError> {
    let schema = match node.get("schema") {
        None | Some(Value::Null) => return Ok(()),
        Some(schema) => schema,
    };
    let value = node.get("value").unwrap_or(&Value::Null);
    let validator = jsonschema::validator_for(schema)
        .map_err(|e| ReducerError::new(format!("entry {name:?} has an invalid schema: {e}")))?;
    let result = match validator.iter_errors(value).next() {
        Some(error) => Err(ReducerError::new(format!(
            "value of entry {name:?} does not match its schema: {error}"
        ))),
        None => Ok(()),
    };
    result
}

fn write_value(state: Option<&Value>, action: &Value) -> Result<Value, ReducerError> {
    let name = entry_name(action)?;
    let value = action.get("value").cloned().unwrap_or(Value::Null);
    let mut entries = entries(state);
    let mut node = entries
        .get(name)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    node.insert("value".into(), value);
    validate_node(name, &node)?;
    entries.insert(name.to_string(), Value::Object(node));
    Ok(Value::Object(entries))
}

fn write_schema_value(state: Option<&Value>, action: &Value) -> Result<Value, ReducerError> {
    let name = entry_name(action)?;
    let schema = action.get("schema").cloned().unwrap_or(Value::Null);
    let mut entries = entries(state);
    // An absent value keeps what the entry held before, falsy ones included.
    let value = match action.get("value") {
        Some(value) => value.clone(),
        None => entries
            .get(name)
            .and_then(|node| node.get("value"))
            .cloned()
            .unwrap_or(Value::Null),
    };
    let mut node = Map::new();
    node.insert("schema".into(), schema);
    node.insert("value".into(), value);
    validate_node(name, &node)?;
    entries.insert(name.to_string(), Value::Object(node));
    Ok(Value::Object(entries))
}

fn delete(state: Option<&Value>, action: &Value) -> Result<Value, ReducerError> {
    let name = entry_name(action)?;
    let mut entries = entries(state);
    entries.remove(name);
    Ok(Value::Object(entries))
}

fn write_schema(state: Option<&Value>, action: &Value) -> Result<Value, ReducerError> {
    let schema_name = str_field(action, "schemaName")?;
    let schema = action.get("schema").cloned().unwrap_or(Value::Null);
    let mut entries = entries(state);
    let mut schemas = entries
        .get(SCHEMAS_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    schemas.insert(schema_name.to_string(), schema);
    entries.insert(SCHEMAS_KEY.into(), Value::Object(schemas));
    Ok(Value::Object(entries))
}
