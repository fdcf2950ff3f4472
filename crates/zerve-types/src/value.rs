//! Tagged JSON values with structural meaning to the engine.
//!
//! Blocks and docs hold arbitrary JSON. A handful of shapes, distinguished by
//! their `type` field, are interpreted by the engine: [`BlockRef`] and
//! [`Commit`]. Everything else passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;
use crate::id::BlockId;
use crate::time::Timestamp;

/// The `type` field of a JSON object, if it is a string.
pub fn type_tag(value: &Value) -> Option<&str> {
    value.get("type").and_then(Value::as_str)
}

/// Human-readable kind of a value for error messages: its `type` tag when it
/// has one, otherwise the JSON kind.
pub fn describe_kind(value: &Value) -> String {
    if let Some(tag) = type_tag(value) {
        return tag.to_string();
    }
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

// ---------------------------------------------------------------------------
// BlockRef
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum BlockRefTag {
    BlockRef,
}

/// A value pointing at a block: `{ "type": "BlockRef", "id": <hash> }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    #[serde(rename = "type")]
    tag: BlockRefTag,
    pub id: BlockId,
}

impl BlockRef {
    pub const TYPE: &'static str = "BlockRef";

    pub fn new(id: BlockId) -> Self {
        Self {
            tag: BlockRefTag::BlockRef,
            id,
        }
    }

    /// Interpret a JSON value as a block ref. Returns `None` for anything that
    /// is not tagged `BlockRef` with a well-formed id.
    pub fn from_value(value: &Value) -> Option<Self> {
        if type_tag(value) != Some(Self::TYPE) {
            return None;
        }
        let id = value.get("id")?.as_str()?.parse().ok()?;
        Some(Self::new(id))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::from(Self::TYPE));
        map.insert("id".into(), Value::String(self.id.to_hex()));
        Value::Object(map)
    }
}

impl From<BlockRef> for Value {
    fn from(r: BlockRef) -> Self {
        r.to_value()
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum CommitTag {
    Commit,
}

/// One link of a chain, stored as ordinary block content.
///
/// `on` is the id of the previous commit block, or `None` for the genesis
/// commit. Once written a commit is never edited; extending a chain always
/// creates a new commit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(rename = "type")]
    tag: CommitTag,
    pub on: Option<BlockId>,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub time: Timestamp,
}

impl Commit {
    pub const TYPE: &'static str = "Commit";

    pub fn new(on: Option<BlockId>, value: Value, message: Option<String>, time: Timestamp) -> Self {
        Self {
            tag: CommitTag::Commit,
            on,
            value,
            message,
            time,
        }
    }

    /// Returns `true` if the value carries the `Commit` type tag.
    pub fn is_commit(value: &Value) -> bool {
        type_tag(value) == Some(Self::TYPE)
    }

    /// Decode a commit from block content.
    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        if !Self::is_commit(value) {
            return Err(TypeError::UnexpectedType {
                expected: Self::TYPE,
                found: describe_kind(value),
            });
        }
        Self::deserialize(value).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".into(), Value::from(Self::TYPE));
        map.insert(
            "on".into(),
            self.on
                .map(|id| Value::String(id.to_hex()))
                .unwrap_or(Value::Null),
        );
        map.insert("value".into(), self.value.clone());
        if let Some(message) = &self.message {
            map.insert("message".into(), Value::String(message.clone()));
        }
        map.insert("time".into(), Value::from(self.time.as_millis()));
        Value::Object(map)
    }

    /// The action type carried by this commit (`value.type`).
    pub fn action_type(&self) -> Option<&str> {
        type_tag(&self.value)
    }

    pub fn is_genesis(&self) -> bool {
        self.on.is_none()
    }
}

// ---------------------------------------------------------------------------
// TreeState
// ---------------------------------------------------------------------------

/// Materialized result of replaying a chain.
///
/// The shape is decided entirely by the reducers that produced it. The engine
/// only knows the empty state, `{ "value": null, "children": {} }`, which it
/// yields for commits whose action type has no reducer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TreeState(Value);

impl TreeState {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn empty() -> Self {
        let mut map = Map::new();
        map.insert("value".into(), Value::Null);
        map.insert("children".into(), Value::Object(Map::new()));
        Self(Value::Object(map))
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Child states, when the reducers produced the `{ value, children }`
    /// shape.
    pub fn children(&self) -> Option<&Map<String, Value>> {
        self.0.get("children").and_then(Value::as_object)
    }
}

impl From<Value> for TreeState {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<TreeState> for Value {
    fn from(state: TreeState) -> Self {
        state.0
    }
}
