//! Machine-readable delta format
//!
//! A jsondiffpatch-style encoding:
//!
//! | change      | encoding              |
//! |-------------|-----------------------|
//! | added       | `[new]`               |
//! | modified    | `[old, new]`          |
//! | text diff   | `[old, new, 2]`       |
//! | deleted     | `[old, 0, 0]`         |
//! | moved       | `[value, from, 3]`    |
//! | object      | `{"member": ...}`     |
//! | array       | `{"_t": "a", "3": ..., "_4": [old, 0, 0]}` |
//!
//! Array deletions are keyed `_<index>`; everything else in an array delta
//! is keyed by the plain index. "No changes" encodes as `{}`.

use serde_json::{json, Map, Value};

use crate::diff::delta::{Change, Delta, Diff, Position};
use crate::diff::error::DeltaError;

const ARRAY_MARKER_KEY: &str = "_t";
const ARRAY_MARKER: &str = "a";
const TEXT_DIFF_TAG: u64 = 2;
const MOVED_TAG: u64 = 3;

/// Encodes a diff as a compact machine-readable delta
#[derive(Debug, Default, Clone, Copy)]
pub struct DeltaFormatter;

impl DeltaFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Encode as a JSON value
    pub fn to_value(&self, diff: &Diff) -> Value {
        match diff.root() {
            Some(change) => encode(change).unwrap_or_else(|| json!({})),
            None => json!({}),
        }
    }

    /// Encode as compact JSON text
    pub fn format(&self, diff: &Diff) -> String {
        self.to_value(diff).to_string()
    }
}

/// Encode one change; `Same` carries nothing and encodes to `None`
fn encode(change: &Change) -> Option<Value> {
    let value = match change {
        Change::Same(_) => return None,
        Change::Added(new) => json!([new]),
        Change::Modified { old, new } => json!([old, new]),
        Change::TextDiff { old, new } => json!([old, new, TEXT_DIFF_TAG]),
        Change::Deleted(old) => json!([old, 0, 0]),
        Change::Moved { value, from } => json!([value, from, MOVED_TAG]),
        Change::Object(deltas) => {
            let mut map = Map::new();
            for delta in deltas {
                if let Some(encoded) = encode(&delta.change) {
                    map.insert(delta.position.to_string(), encoded);
                }
            }
            Value::Object(map)
        }
        Change::Array(deltas) => {
            let mut map = Map::new();
            map.insert(ARRAY_MARKER_KEY.to_string(), json!(ARRAY_MARKER));
            for delta in deltas {
                let key = match delta.change {
                    Change::Deleted(_) => format!("_{}", delta.position),
                    _ => delta.position.to_string(),
                };
                if let Some(encoded) = encode(&delta.change) {
                    map.insert(key, encoded);
                }
            }
            Value::Object(map)
        }
    };
    Some(value)
}

/// Decode a machine delta back into a diff
pub fn decode_delta(text: &str) -> Result<Diff, DeltaError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DeltaError::Syntax(e.to_string()))?;

    match &value {
        Value::Object(map) if map.is_empty() => Ok(Diff::NoChanges),
        other => decode_change(other, "").map(Diff::Changed),
    }
}

fn decode_change(value: &Value, path: &str) -> Result<Change, DeltaError> {
    match value {
        Value::Array(items) => decode_leaf(items, path),
        Value::Object(map) if is_array_delta(map) => decode_array(map, path).map(Change::Array),
        Value::Object(map) => {
            let deltas = map
                .iter()
                .map(|(key, child)| {
                    let child_path = format!("{}/{}", path, key);
                    decode_change(child, &child_path).map(|change| Delta::key(key.as_str(), change))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Change::Object(deltas))
        }
        _ => Err(DeltaError::malformed(path, "expected an array or object")),
    }
}

fn is_array_delta(map: &Map<String, Value>) -> bool {
    map.get(ARRAY_MARKER_KEY).and_then(Value::as_str) == Some(ARRAY_MARKER)
}

fn decode_leaf(items: &[Value], path: &str) -> Result<Change, DeltaError> {
    match items {
        [new] => Ok(Change::Added(new.clone())),
        [old, new] => Ok(Change::Modified {
            old: old.clone(),
            new: new.clone(),
        }),
        [old, second, tag] => match tag.as_u64() {
            Some(0) if second.as_u64() == Some(0) => Ok(Change::Deleted(old.clone())),
            Some(TEXT_DIFF_TAG) => match (old, second) {
                (Value::String(old), Value::String(new)) => Ok(Change::TextDiff {
                    old: old.clone(),
                    new: new.clone(),
                }),
                _ => Err(DeltaError::malformed(path, "text diff between non-strings")),
            },
            Some(MOVED_TAG) => {
                let from = second
                    .as_u64()
                    .ok_or_else(|| DeltaError::malformed(path, "move source is not an index"))?;
                Ok(Change::Moved {
                    value: old.clone(),
                    from: from as usize,
                })
            }
            _ => Err(DeltaError::malformed(path, format!("unknown delta tag {}", tag))),
        },
        _ => Err(DeltaError::malformed(
            path,
            format!("unexpected delta of length {}", items.len()),
        )),
    }
}

fn decode_array(map: &Map<String, Value>, path: &str) -> Result<Vec<Delta>, DeltaError> {
    let mut deltas = Vec::with_capacity(map.len().saturating_sub(1));

    for (key, child) in map {
        if key == ARRAY_MARKER_KEY {
            continue;
        }
        let child_path = format!("{}/{}", path, key);
        let (deleted, digits) = match key.strip_prefix('_') {
            Some(rest) => (true, rest),
            None => (false, key.as_str()),
        };
        let index: usize = digits
            .parse()
            .map_err(|_| DeltaError::malformed(&child_path, "array delta key is not an index"))?;

        let change = decode_change(child, &child_path)?;
        if deleted != matches!(change, Change::Deleted(_)) {
            return Err(DeltaError::malformed(
                &child_path,
                "only deletions may use an underscore key",
            ));
        }
        deltas.push(Delta::new(Position::Index(index), change));
    }

    deltas.sort_by_key(|d| d.position.index());
    Ok(deltas)
}
