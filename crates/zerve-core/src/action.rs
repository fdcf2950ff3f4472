//! Built-in actions and their responses.
//!
//! Payloads arrive as untyped JSON and are decoded into [`CoreAction`] once,
//! at the dispatch boundary. Action types may carry the `CoreData/` prefix
//! used by module-qualified callers.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use zerve_chain::AppendResult;
use zerve_types::{BlockId, BlockRef};

use crate::error::{CoreError, CoreResult};

/// Prefix accepted in front of built-in action types.
pub const ACTION_PREFIX: &str = "CoreData/";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CreateBlockPayload {
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BlockIdPayload {
    pub id: BlockId,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SetDocPayload {
    pub name: String,
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DocNamePayload {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AppendChainPayload {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// A decoded built-in action.
#[derive(Clone, Debug, PartialEq)]
pub enum CoreAction {
    CreateBlock(CreateBlockPayload),
    GetBlockJson(BlockIdPayload),
    SetDoc(SetDocPayload),
    DeleteDoc(DocNamePayload),
    DeleteBlock(BlockIdPayload),
    AppendChain(AppendChainPayload),
    ListBlocks,
    ListDocs,
}

impl CoreAction {
    /// Decode `payload` for a built-in action type.
    ///
    /// Returns `Ok(None)` when `action_type` is not built in, so the caller
    /// can try the handler registry.
    pub fn parse(action_type: &str, payload: Value) -> CoreResult<Option<Self>> {
        let bare = action_type.strip_prefix(ACTION_PREFIX).unwrap_or(action_type);
        let action = match bare {
            "CreateBlock" => Self::CreateBlock(decode(bare, payload)?),
            "GetBlockJSON" => Self::GetBlockJson(decode(bare, payload)?),
            "SetDoc" => Self::SetDoc(decode(bare, payload)?),
            "DeleteDoc" => Self::DeleteDoc(decode(bare, payload)?),
            "DeleteBlock" => Self::DeleteBlock(decode(bare, payload)?),
            "AppendChain" => Self::AppendChain(decode(bare, payload)?),
            "ListBlocks" => Self::ListBlocks,
            "ListDocs" => Self::ListDocs,
            _ => return Ok(None),
        };
        Ok(Some(action))
    }

    pub fn action_type(&self) -> &'static str {
        match self {
            Self::CreateBlock(_) => "CreateBlock",
            Self::GetBlockJson(_) => "GetBlockJSON",
            Self::SetDoc(_) => "SetDoc",
            Self::DeleteDoc(_) => "DeleteDoc",
            Self::DeleteBlock(_) => "DeleteBlock",
            Self::AppendChain(_) => "AppendChain",
            Self::ListBlocks => "ListBlocks",
            Self::ListDocs => "ListDocs",
        }
    }
}

fn decode<T: DeserializeOwned>(action: &str, payload: Value) -> CoreResult<T> {
    serde_json::from_value(payload).map_err(|e| CoreError::InvalidPayload {
        action: action.to_string(),
        reason: e.to_string(),
    })
}

/// Result of a built-in action.
#[derive(Clone, Debug, PartialEq)]
pub enum CoreResponse {
    /// `CreateBlock`
    BlockRef(BlockRef),
    /// `GetBlockJSON`
    Value(Value),
    /// `SetDoc`, rendered as `{}`
    Empty,
    /// `DeleteDoc` and `DeleteBlock`, rendered as `null`
    Null,
    /// `AppendChain`
    Appended(AppendResult),
    /// `ListBlocks` and `ListDocs`, rendered as `{ "children": [...] }`
    Children(Vec<String>),
}

impl CoreResponse {
    /// JSON form returned by `dispatch`. `Appended` uses the serialized
    /// [`AppendResult`].
    pub fn into_value(self) -> CoreResult<Value> {
        Ok(match self {
            Self::BlockRef(block_ref) => block_ref.to_value(),
            Self::Value(value) => value,
            Self::Empty => json!({}),
            Self::Null => Value::Null,
            Self::Appended(result) => serde_json::to_value(&result)?,
            Self::Children(children) => json!({ "children": children }),
        })
    }
}
