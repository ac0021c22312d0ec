//! Re-applying a diff to the value it was computed from

use serde_json::{Map, Value};

use super::delta::{Change, Delta, Diff, Position};
use super::error::{kind_name, DeltaError};

/// Apply a diff to its original value, producing the updated value
pub fn apply(original: &Value, diff: &Diff) -> Result<Value, DeltaError> {
    match diff {
        Diff::NoChanges => Ok(original.clone()),
        Diff::Changed(change) => apply_change(original, change, ""),
    }
}

fn apply_change(value: &Value, change: &Change, path: &str) -> Result<Value, DeltaError> {
    match change {
        Change::Same(_) => Ok(value.clone()),
        Change::Added(new) => Ok(new.clone()),
        Change::Modified { new, .. } => Ok(new.clone()),
        Change::TextDiff { new, .. } => Ok(Value::String(new.clone())),
        Change::Moved { value, .. } => Ok(value.clone()),
        Change::Deleted(_) => Err(DeltaError::malformed(
            path,
            "a deletion can only appear inside a container",
        )),
        Change::Object(deltas) => match value {
            Value::Object(map) => apply_object(map, deltas, path).map(Value::Object),
            other => Err(DeltaError::malformed(
                path,
                format!("object delta applied to {}", kind_name(other)),
            )),
        },
        Change::Array(deltas) => match value {
            Value::Array(items) => apply_array(items, deltas, path).map(Value::Array),
            other => Err(DeltaError::malformed(
                path,
                format!("array delta applied to {}", kind_name(other)),
            )),
        },
    }
}

fn apply_object(
    map: &Map<String, Value>,
    deltas: &[Delta],
    path: &str,
) -> Result<Map<String, Value>, DeltaError> {
    let mut result = map.clone();

    for delta in deltas {
        let key = match &delta.position {
            Position::Key(key) => key,
            Position::Index(i) => {
                return Err(DeltaError::malformed(
                    path,
                    format!("index {} inside an object delta", i),
                ))
            }
        };
        let child_path = format!("{}/{}", path, key);

        match &delta.change {
            Change::Added(new) => {
                result.insert(key.clone(), new.clone());
            }
            Change::Deleted(_) => {
                result.remove(key);
            }
            Change::Moved { .. } => {
                return Err(DeltaError::malformed(&child_path, "move inside an object"))
            }
            change => {
                let current = map
                    .get(key)
                    .ok_or_else(|| DeltaError::malformed(&child_path, "member does not exist"))?;
                let patched = apply_change(current, change, &child_path)?;
                result.insert(key.clone(), patched);
            }
        }
    }

    Ok(result)
}

fn apply_array(items: &[Value], deltas: &[Delta], path: &str) -> Result<Vec<Value>, DeltaError> {
    let mut slots: Vec<Option<Value>> = items.iter().cloned().map(Some).collect();
    let mut appended: Vec<(usize, Value)> = Vec::new();

    for delta in deltas {
        let index = match delta.position {
            Position::Index(i) => i,
            Position::Key(ref key) => {
                return Err(DeltaError::malformed(
                    path,
                    format!("key '{}' inside an array delta", key),
                ))
            }
        };
        let child_path = format!("{}/{}", path, index);

        if let Change::Added(new) = &delta.change {
            appended.push((index, new.clone()));
            continue;
        }

        let current = items
            .get(index)
            .ok_or_else(|| DeltaError::malformed(&child_path, "index out of range"))?;

        slots[index] = match &delta.change {
            Change::Deleted(_) => None,
            Change::Moved { from, .. } => {
                let source = items.get(*from).ok_or_else(|| {
                    DeltaError::malformed(&child_path, format!("move source {} out of range", from))
                })?;
                Some(source.clone())
            }
            change => Some(apply_change(current, change, &child_path)?),
        };
    }

    let mut result: Vec<Value> = slots.into_iter().flatten().collect();

    appended.sort_by_key(|(index, _)| *index);
    for (index, value) in appended {
        let at = index.min(result.len());
        result.insert(at, value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare::compare;
    use serde_json::json;

    fn assert_round_trip(left: Value, right: Value) {
        let diff = compare(&left, &right);
        assert_eq!(apply(&left, &diff).unwrap(), right);
    }

    #[test]
    fn test_apply_reproduces_updated_value() {
        assert_round_trip(json!({"a": 1}), json!({"a": 2, "b": 3}));
        assert_round_trip(json!([1, 2, 3]), json!([3, 1, 2, 4]));
        assert_round_trip(json!(["x", "y", "z"]), json!(["y"]));
        assert_round_trip(json!("old"), json!("new"));
        assert_round_trip(json!({"a": [1, {"b": null}]}), json!({"a": [1, {"b": false}], "c": {}}));
        assert_round_trip(json!({"x": {"a": 1}}), json!({"x": [1]}));
        assert_round_trip(json!([[1, 2], [3]]), json!([[3], [1, 2]]));
    }

    #[test]
    fn test_no_changes_returns_original() {
        let value = json!({"a": [1, 2]});
        assert_eq!(apply(&value, &Diff::NoChanges).unwrap(), value);
    }

    #[test]
    fn test_object_delta_on_array_is_rejected() {
        let diff = Diff::Changed(Change::Object(vec![Delta::key(
            "a",
            Change::Added(json!(1)),
        )]));
        let err = apply(&json!([1]), &diff).unwrap_err();
        assert!(matches!(err, DeltaError::Malformed { .. }));
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let diff = Diff::Changed(Change::Array(vec![Delta::index(
            5,
            Change::Modified {
                old: json!(1),
                new: json!(2),
            },
        )]));
        assert!(apply(&json!([1]), &diff).is_err());
    }
}
