use serde_json::{Map, Value};
use zerve_store::{Block, StoreResult};

use crate::cache::BlockCache;

/// Type tag marking a value that should live in its own block.
pub const EMBEDDED_BLOCK_TYPE: &str = "Block";

/// Replace every embedded `{ "type": "Block", "content": C }` in `raw` with a
/// `BlockRef` to `C`, collecting the new blocks in `cache`.
///
/// The walk is pure: nothing is written to storage. Content inside a marker
/// is stored as-is, so markers nested in it are not extracted. A `Block`
/// object without a `content` key is left in place.
pub fn extract_blocks(raw: Value, cache: &mut BlockCache) -> StoreResult<Value> {
    match raw {
        Value::Array(items) => Ok(Value::Array(
            items
                .into_iter()
                .map(|item| extract_blocks(item, cache))
                .collect::<StoreResult<_>>()?,
        )),
        Value::Object(mut map) => {
            if is_marker(&map) {
                if let Some(content) = map.remove("content") {
                    let block = Block::new(content)?;
                    let block_ref = block.block_ref();
                    cache.insert(block);
                    return Ok(block_ref.into());
                }
            }
            Ok(Value::Object(
                map.into_iter()
                    .map(|(key, value)| Ok((key, extract_blocks(value, cache)?)))
                    .collect::<StoreResult<_>>()?,
            ))
        }
        scalar => Ok(scalar),
    }
}

fn is_marker(map: &Map<String, Value>) -> bool {
    map.get("type").and_then(Value::as_str) == Some(EMBEDDED_BLOCK_TYPE)
        && map.contains_key("content")
}
