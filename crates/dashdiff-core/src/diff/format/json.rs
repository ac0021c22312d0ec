//! Flat JSON renderer
//!
//! Produces ordinary JSON: the original value with every added object member
//! merged in and trailing added array elements appended. Deleted and
//! modified members keep their original values.

use serde_json::{Map, Value};

use crate::diff::delta::{Change, Delta, Diff, Position};
use crate::diff::error::{kind_name, RenderError};

/// Renders a diff as the original value plus its additions
pub struct JsonFormatter<'a> {
    left: &'a Value,
}

impl<'a> JsonFormatter<'a> {
    pub fn new(left: &'a Value) -> Self {
        Self { left }
    }

    /// Merged value without rendering it
    pub fn merged(&self, diff: &Diff) -> Result<Value, RenderError> {
        match diff.root() {
            Some(change) => merge(self.left, change, ""),
            None => Ok(self.left.clone()),
        }
    }

    /// Pretty-printed merged value
    pub fn format(&self, diff: &Diff) -> Result<String, RenderError> {
        Ok(format!("{:#}", self.merged(diff)?))
    }
}

fn merge(value: &Value, change: &Change, path: &str) -> Result<Value, RenderError> {
    match change {
        Change::Object(deltas) => match value {
            Value::Object(map) => merge_object(map, deltas, path).map(Value::Object),
            other => Err(RenderError::type_mismatch(path, "object", kind_name(other))),
        },
        Change::Array(deltas) => match value {
            Value::Array(items) => merge_array(items, deltas, path).map(Value::Array),
            other => Err(RenderError::type_mismatch(path, "array", kind_name(other))),
        },
        _ => Ok(value.clone()),
    }
}

fn merge_object(
    map: &Map<String, Value>,
    deltas: &[Delta],
    path: &str,
) -> Result<Map<String, Value>, RenderError> {
    let mut merged = map.clone();

    for delta in deltas {
        let Position::Key(key) = &delta.position else {
            return Err(RenderError::type_mismatch(path, "array", "object"));
        };
        let child_path = format!("{}/{}", path, key);

        match &delta.change {
            Change::Added(new) => {
                merged.insert(key.clone(), new.clone());
            }
            change @ (Change::Object(_) | Change::Array(_)) => {
                let current = map
                    .get(key)
                    .ok_or_else(|| RenderError::type_mismatch(&child_path, change.kind(), "nothing"))?;
                merged.insert(key.clone(), merge(current, change, &child_path)?);
            }
            _ => {}
        }
    }

    Ok(merged)
}

fn merge_array(items: &[Value], deltas: &[Delta], path: &str) -> Result<Vec<Value>, RenderError> {
    let mut merged = items.to_vec();

    for delta in deltas {
        let Position::Index(index) = delta.position else {
            return Err(RenderError::type_mismatch(path, "object", "array"));
        };
        let child_path = format!("{}/{}", path, index);

        match &delta.change {
            Change::Added(new) if index >= items.len() => merged.push(new.clone()),
            change @ (Change::Object(_) | Change::Array(_)) => {
                let current = items
                    .get(index)
                    .ok_or_else(|| RenderError::type_mismatch(&child_path, change.kind(), "nothing"))?;
                merged[index] = merge(current, change, &child_path)?;
            }
            _ => {}
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare::compare;
    use serde_json::json;

    fn render(left: &Value, right: &Value) -> Value {
        let text = JsonFormatter::new(left).format(&compare(left, right)).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_added_members_are_merged() {
        assert_eq!(
            render(&json!({"a": 1}), &json!({"a": 2, "b": 3})),
            json!({"a": 1, "b": 3})
        );
    }

    #[test]
    fn test_deleted_members_are_kept() {
        assert_eq!(
            render(&json!({"a": 1, "gone": [1]}), &json!({"a": 1})),
            json!({"a": 1, "gone": [1]})
        );
    }

    #[test]
    fn test_nested_additions() {
        let left = json!({"panels": [{"id": 1}, {"id": 2}], "title": "CPU"});
        let right = json!({"panels": [{"id": 1, "type": "graph"}, {"id": 2}, {"id": 3}], "title": "Mem"});

        assert_eq!(
            render(&left, &right),
            json!({"panels": [{"id": 1, "type": "graph"}, {"id": 2}, {"id": 3}], "title": "CPU"})
        );
    }

    #[test]
    fn test_output_is_pretty_printed() {
        let left = json!({"a": 1});
        let text = JsonFormatter::new(&left)
            .format(&compare(&left, &json!({"a": 1, "b": 2})))
            .unwrap();
        assert_eq!(text, "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn test_no_changes_renders_original() {
        let left = json!({"a": [1, 2]});
        assert_eq!(render(&left, &left), left);
    }

    #[test]
    fn test_container_mismatch_fails() {
        let diff = Diff::Changed(Change::Object(vec![Delta::key(
            "a",
            Change::Added(json!(1)),
        )]));
        let err = JsonFormatter::new(&json!([1])).format(&diff).unwrap_err();
        assert_eq!(
            err,
            RenderError::TypeMismatch {
                position: "/".to_string(),
                expected: "object",
                found: "array",
            }
        );
    }
}
