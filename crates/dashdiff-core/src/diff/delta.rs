//! Delta model
//!
//! A diff is a tree mirroring the shape of the compared JSON. Each node is a
//! `Delta`: a `Position` inside its parent container plus the `Change`
//! recorded there. Unchanged members are left out of the tree.

use std::fmt;

use serde_json::Value;

/// Location of a delta inside its parent container
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    /// Object member name
    Key(String),
    /// Array element index
    Index(usize),
}

impl Position {
    /// The array index, if this is an array position
    pub fn index(&self) -> Option<usize> {
        match self {
            Position::Index(i) => Some(*i),
            Position::Key(_) => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Key(key) => f.write_str(key),
            Position::Index(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Position {
    fn from(key: &str) -> Self {
        Position::Key(key.to_string())
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position::Index(index)
    }
}

/// What happened to the value at one position
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Present and equal on both sides
    Same(Value),
    /// Present only on the new side
    Added(Value),
    /// Present only on the original side
    Deleted(Value),
    /// Replaced by a value of another kind, or a changed number/bool/null
    Modified { old: Value, new: Value },
    /// Changed string
    TextDiff { old: String, new: String },
    /// Object on both sides with changed members, sorted by key
    Object(Vec<Delta>),
    /// Array on both sides with changed elements, sorted by index
    Array(Vec<Delta>),
    /// Array element relocated from another index of the original array
    Moved { value: Value, from: usize },
}

impl Change {
    /// Short lowercase name of the change kind
    pub fn kind(&self) -> &'static str {
        match self {
            Change::Same(_) => "same",
            Change::Added(_) => "added",
            Change::Deleted(_) => "deleted",
            Change::Modified { .. } => "modified",
            Change::TextDiff { .. } => "textdiff",
            Change::Object(_) => "object",
            Change::Array(_) => "array",
            Change::Moved { .. } => "moved",
        }
    }

    /// Nested deltas of a container change
    pub fn children(&self) -> &[Delta] {
        match self {
            Change::Object(children) | Change::Array(children) => children,
            _ => &[],
        }
    }
}

/// One recorded difference at a position
#[derive(Debug, Clone, PartialEq)]
pub struct Delta {
    pub position: Position,
    pub change: Change,
}

impl Delta {
    pub fn new(position: Position, change: Change) -> Self {
        Self { position, change }
    }

    /// Delta at an object member
    pub fn key(key: impl Into<String>, change: Change) -> Self {
        Self::new(Position::Key(key.into()), change)
    }

    /// Delta at an array index
    pub fn index(index: usize, change: Change) -> Self {
        Self::new(Position::Index(index), change)
    }
}

/// Result of comparing two JSON values
#[derive(Debug, Clone, PartialEq)]
pub enum Diff {
    /// The two values are deeply equal
    NoChanges,
    /// The change at the root
    Changed(Change),
}

impl Diff {
    /// Whether anything differs
    pub fn is_modified(&self) -> bool {
        matches!(self, Diff::Changed(_))
    }

    /// Root change, if any
    pub fn root(&self) -> Option<&Change> {
        match self {
            Diff::NoChanges => None,
            Diff::Changed(change) => Some(change),
        }
    }

    /// Count leaf deltas (everything except container nodes)
    pub fn leaf_count(&self) -> usize {
        fn count(change: &Change) -> usize {
            match change {
                Change::Object(children) | Change::Array(children) => {
                    children.iter().map(|d| count(&d.change)).sum()
                }
                _ => 1,
            }
        }
        self.root().map(count).unwrap_or(0)
    }
}

/// Find the delta recorded at a position
pub fn find_delta<'a>(deltas: &'a [Delta], position: &Position) -> Option<&'a Delta> {
    deltas.iter().find(|d| &d.position == position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::from("panels").to_string(), "panels");
        assert_eq!(Position::Index(3).to_string(), "3");
        assert_eq!(Position::Index(3).index(), Some(3));
        assert_eq!(Position::from("a").index(), None);
    }

    #[test]
    fn test_leaf_count() {
        let diff = Diff::Changed(Change::Object(vec![
            Delta::key("a", Change::Modified { old: json!(1), new: json!(2) }),
            Delta::key(
                "list",
                Change::Array(vec![
                    Delta::index(0, Change::Added(json!("x"))),
                    Delta::index(1, Change::Deleted(json!("y"))),
                ]),
            ),
        ]));

        assert!(diff.is_modified());
        assert_eq!(diff.leaf_count(), 3);
        assert_eq!(Diff::NoChanges.leaf_count(), 0);
    }

    #[test]
    fn test_find_delta() {
        let deltas = vec![
            Delta::key("a", Change::Added(json!(1))),
            Delta::key("b", Change::Deleted(json!(2))),
        ];
        let found = find_delta(&deltas, &Position::from("b")).unwrap();
        assert_eq!(found.change.kind(), "deleted");
        assert!(find_delta(&deltas, &Position::from("c")).is_none());
    }
}
