//! Structural comparison of two JSON values
//!
//! Objects are compared as unordered maps: the union of member names is
//! visited once, in key order. Arrays are compared positionally: index `i`
//! on the left against index `i` on the right, with no alignment. Elements
//! past the end of the shorter array become trailing `Deleted` or `Added`
//! deltas. The only relocation detected is an exact-value swap inside the
//! common prefix, reported as `Moved`.
//!
//! Neither input is modified.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::delta::{Change, Delta, Diff};

/// Compare two JSON values
///
/// Returns `Diff::NoChanges` when the values are deeply equal.
pub fn compare(original: &Value, updated: &Value) -> Diff {
    match compare_values(original, updated) {
        Some(change) => Diff::Changed(change),
        None => Diff::NoChanges,
    }
}

/// Change between two values, or `None` when they are equal
fn compare_values(old: &Value, new: &Value) -> Option<Change> {
    match (old, new) {
        (Value::Object(left), Value::Object(right)) => {
            let deltas = compare_objects(left, right);
            (!deltas.is_empty()).then_some(Change::Object(deltas))
        }
        (Value::Array(left), Value::Array(right)) => {
            let deltas = compare_arrays(left, right);
            (!deltas.is_empty()).then_some(Change::Array(deltas))
        }
        (Value::String(left), Value::String(right)) => {
            (left != right).then(|| Change::TextDiff {
                old: left.clone(),
                new: right.clone(),
            })
        }
        _ => (old != new).then(|| Change::Modified {
            old: old.clone(),
            new: new.clone(),
        }),
    }
}

fn compare_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> Vec<Delta> {
    let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();

    keys.into_iter()
        .filter_map(|key| {
            let change = match (left.get(key), right.get(key)) {
                (Some(old), Some(new)) => compare_values(old, new)?,
                (Some(old), None) => Change::Deleted(old.clone()),
                (None, Some(new)) => Change::Added(new.clone()),
                (None, None) => return None,
            };
            Some(Delta::key(key.as_str(), change))
        })
        .collect()
}

fn compare_arrays(left: &[Value], right: &[Value]) -> Vec<Delta> {
    let common = left.len().min(right.len());
    let mut claimed = vec![false; common];
    let mut deltas = Vec::new();

    for index in 0..common {
        if left[index] == right[index] {
            continue;
        }

        if let Some(from) = find_move_source(left, right, index, &claimed) {
            claimed[from] = true;
            deltas.push(Delta::index(
                index,
                Change::Moved {
                    value: right[index].clone(),
                    from,
                },
            ));
            continue;
        }

        if let Some(change) = compare_values(&left[index], &right[index]) {
            deltas.push(Delta::index(index, change));
        }
    }

    for (index, value) in left.iter().enumerate().skip(common) {
        deltas.push(Delta::index(index, Change::Deleted(value.clone())));
    }
    for (index, value) in right.iter().enumerate().skip(common) {
        deltas.push(Delta::index(index, Change::Added(value.clone())));
    }

    deltas
}

/// Find an original index whose exact value now sits at `target`
///
/// The source must lie in the common prefix, must itself have changed, and
/// the value displaced from `target` must survive elsewhere in the new
/// array, so that no original element goes unaccounted for.
fn find_move_source(
    left: &[Value],
    right: &[Value],
    target: usize,
    claimed: &[bool],
) -> Option<usize> {
    let displaced = &left[target];
    let survives = right
        .iter()
        .enumerate()
        .any(|(k, value)| k != target && value == displaced);
    if !survives {
        return None;
    }

    (0..claimed.len()).find(|&source| {
        source != target
            && !claimed[source]
            && left[source] == right[target]
            && left[source] != right[source]
    })
}
