//! Line-oriented diff listing
//!
//! Every output line is a one-character marker (` ` unchanged, `+` added,
//! `-` deleted), two spaces of indentation per nesting level, then the
//! content. Object members are listed in key order, array elements in index
//! order with added trailing elements last. A modified value shows its old
//! line followed by its new line under the same label.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::diff::delta::{find_delta, Change, Delta, Diff, Position};
use crate::diff::error::{kind_name, RenderError};

/// Options for the line-oriented renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AsciiConfig {
    /// Label unchanged array elements with their index
    pub show_array_index: bool,
    /// Wrap added/deleted lines in `<span class="diff-…">` markup
    pub coloring: bool,
}

/// Renders a diff as a marked, indented listing of the original value
pub struct AsciiFormatter<'a> {
    left: &'a Value,
    config: AsciiConfig,
}

impl<'a> AsciiFormatter<'a> {
    pub fn new(left: &'a Value, config: AsciiConfig) -> Self {
        Self { left, config }
    }

    pub fn format(&self, diff: &Diff) -> Result<String, RenderError> {
        let mut writer = Writer::new(self.config);
        match diff.root() {
            Some(change) => writer.delta(Label::None, Some(self.left), change, "")?,
            None => writer.value(Marker::Same, Label::None, self.left),
        }
        Ok(writer.out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Same,
    Added,
    Deleted,
}

impl Marker {
    fn symbol(self) -> char {
        match self {
            Marker::Same => ' ',
            Marker::Added => '+',
            Marker::Deleted => '-',
        }
    }

    fn style(self) -> Option<&'static str> {
        match self {
            Marker::Same => None,
            Marker::Added => Some("diff-added"),
            Marker::Deleted => Some("diff-deleted"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Label<'a> {
    None,
    Key(&'a str),
    Index(usize),
}

impl Label<'_> {
    fn render(self) -> String {
        match self {
            Label::None => String::new(),
            Label::Key(key) => format!("{}: ", Value::String(key.to_string())),
            Label::Index(i) => format!("{}: ", i),
        }
    }
}

/// Siblings still to be written at one nesting level
struct Level {
    remaining: usize,
}

struct Writer {
    config: AsciiConfig,
    levels: Vec<Level>,
    out: String,
}

impl Writer {
    fn new(config: AsciiConfig) -> Self {
        Self {
            config,
            levels: Vec::new(),
            out: String::new(),
        }
    }

    /// Render the change recorded for one position
    ///
    /// `left` is the original value at that position, if it had one.
    fn delta(
        &mut self,
        label: Label<'_>,
        left: Option<&Value>,
        change: &Change,
        path: &str,
    ) -> Result<(), RenderError> {
        match change {
            Change::Same(value) => self.value(Marker::Same, label, value),
            Change::Added(value) => self.value(Marker::Added, label, value),
            Change::Deleted(value) => self.value(Marker::Deleted, label, value),
            Change::Modified { old, new } => self.replaced(label, old, new),
            Change::TextDiff { old, new } => {
                self.replaced(label, &Value::String(old.clone()), &Value::String(new.clone()))
            }
            Change::Moved { value, .. } => {
                let old = left.ok_or_else(|| RenderError::type_mismatch(path, "value", "nothing"))?;
                self.replaced(label, old, value)
            }
            Change::Object(deltas) => match left {
                Some(Value::Object(map)) => self.object(label, map, deltas, path)?,
                Some(other) => return Err(RenderError::type_mismatch(path, "object", kind_name(other))),
                None => return Err(RenderError::type_mismatch(path, "object", "nothing")),
            },
            Change::Array(deltas) => match left {
                Some(Value::Array(items)) => self.array(label, items, deltas, path)?,
                Some(other) => return Err(RenderError::type_mismatch(path, "array", kind_name(other))),
                None => return Err(RenderError::type_mismatch(path, "array", "nothing")),
            },
        }
        Ok(())
    }

    fn object(
        &mut self,
        label: Label<'_>,
        map: &Map<String, Value>,
        deltas: &[Delta],
        path: &str,
    ) -> Result<(), RenderError> {
        let keys: BTreeSet<&str> = map
            .keys()
            .map(String::as_str)
            .chain(deltas.iter().filter_map(|d| match &d.position {
                Position::Key(key) => Some(key.as_str()),
                Position::Index(_) => None,
            }))
            .collect();

        self.open(Marker::Same, label, '{', keys.len());
        for key in keys {
            let position = Position::Key(key.to_string());
            match find_delta(deltas, &position) {
                Some(delta) => {
                    let child_path = format!("{}/{}", path, key);
                    self.delta(Label::Key(key), map.get(key), &delta.change, &child_path)?;
                }
                None => {
                    if let Some(value) = map.get(key) {
                        self.value(Marker::Same, Label::Key(key), value);
                    }
                }
            }
        }
        self.close(Marker::Same, '}');
        Ok(())
    }

    fn array(
        &mut self,
        label: Label<'_>,
        items: &[Value],
        deltas: &[Delta],
        path: &str,
    ) -> Result<(), RenderError> {
        let added = |index: usize| {
            deltas.iter().filter_map(move |d| match (&d.position, &d.change) {
                (Position::Index(i), Change::Added(value)) if *i == index => Some(value),
                _ => None,
            })
        };
        let appended: Vec<(usize, &Value)> = deltas
            .iter()
            .filter_map(|d| match (&d.position, &d.change) {
                (Position::Index(i), Change::Added(value)) if *i >= items.len() => Some((*i, value)),
                _ => None,
            })
            .collect();
        let inserted = deltas
            .iter()
            .filter(|d| matches!(d.change, Change::Added(_)))
            .count();

        self.open(Marker::Same, label, '[', items.len() + inserted);
        for (index, item) in items.iter().enumerate() {
            for value in added(index) {
                self.value(Marker::Added, Label::Index(index), value);
            }

            let existing = deltas.iter().find(|d| {
                d.position == Position::Index(index) && !matches!(d.change, Change::Added(_))
            });
            match existing {
                Some(delta) => {
                    let label = match delta.change {
                        Change::Object(_) | Change::Array(_) => self.element_label(index),
                        _ => Label::Index(index),
                    };
                    let child_path = format!("{}/{}", path, index);
                    self.delta(label, Some(item), &delta.change, &child_path)?;
                }
                None => self.value(Marker::Same, self.element_label(index), item),
            }
        }
        for (index, value) in appended {
            self.value(Marker::Added, Label::Index(index), value);
        }
        self.close(Marker::Same, ']');
        Ok(())
    }

    /// Old value then new value under one label, sharing one comma slot
    fn replaced(&mut self, label: Label<'_>, old: &Value, new: &Value) {
        let saved = self.remaining();
        self.value(Marker::Deleted, label, old);
        self.set_remaining(saved);
        self.value(Marker::Added, label, new);
    }

    /// Write a whole value with one marker on every line
    fn value(&mut self, marker: Marker, label: Label<'_>, value: &Value) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                self.open(marker, label, '{', entries.len());
                for (key, child) in entries {
                    self.value(marker, Label::Key(key), child);
                }
                self.close(marker, '}');
            }
            Value::Array(items) if !items.is_empty() => {
                self.open(marker, label, '[', items.len());
                for (index, child) in items.iter().enumerate() {
                    self.value(marker, self.element_label(index), child);
                }
                self.close(marker, ']');
            }
            scalar => {
                let comma = self.finish_value();
                self.line(marker, &format!("{}{}{}", label.render(), scalar, comma));
            }
        }
    }

    fn element_label(&self, index: usize) -> Label<'static> {
        if self.config.show_array_index {
            Label::Index(index)
        } else {
            Label::None
        }
    }

    fn open(&mut self, marker: Marker, label: Label<'_>, bracket: char, size: usize) {
        self.line(marker, &format!("{}{}", label.render(), bracket));
        self.levels.push(Level { remaining: size });
    }

    fn close(&mut self, marker: Marker, bracket: char) {
        self.levels.pop();
        let comma = self.finish_value();
        self.line(marker, &format!("{}{}", bracket, comma));
    }

    /// Count one value as written at the current level; returns its separator
    fn finish_value(&mut self) -> &'static str {
        match self.levels.last_mut() {
            Some(level) => {
                level.remaining = level.remaining.saturating_sub(1);
                if level.remaining > 0 {
                    ","
                } else {
                    ""
                }
            }
            None => "",
        }
    }

    fn remaining(&self) -> Option<usize> {
        self.levels.last().map(|level| level.remaining)
    }

    fn set_remaining(&mut self, remaining: Option<usize>) {
        if let (Some(level), Some(remaining)) = (self.levels.last_mut(), remaining) {
            level.remaining = remaining;
        }
    }

    fn line(&mut self, marker: Marker, content: &str) {
        let style = marker.style().filter(|_| self.config.coloring);

        if let Some(style) = style {
            self.out.push_str(&format!("<span class=\"{}\">", style));
        }
        self.out.push(marker.symbol());
        for _ in 0..self.levels.len() {
            self.out.push_str("  ");
        }
        self.out.push_str(content);
        if style.is_some() {
            self.out.push_str("</span>");
        }
        self.out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compare::compare;
    use serde_json::json;

    fn render(left: &Value, right: &Value, config: AsciiConfig) -> String {
        AsciiFormatter::new(left, config)
            .format(&compare(left, right))
            .unwrap()
    }

    #[test]
    fn test_modified_and_added_member() {
        let output = render(&json!({"a": 1}), &json!({"a": 2, "b": 3}), AsciiConfig::default());
        assert_eq!(output, " {\n-  \"a\": 1,\n+  \"a\": 2,\n+  \"b\": 3\n }\n");
    }

    #[test]
    fn test_members_in_key_order() {
        let left: Value = serde_json::from_str(r#"{"b": 1, "a": 2}"#).unwrap();
        let right: Value = serde_json::from_str(r#"{"c": true, "b": 1, "a": 3}"#).unwrap();

        let output = render(&left, &right, AsciiConfig::default());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(
            lines,
            vec![" {", "-  \"a\": 2,", "+  \"a\": 3,", "   \"b\": 1,", "+  \"c\": true", " }"]
        );
    }

    #[test]
    fn test_array_elements() {
        let left = json!({"list": [1, 2]});
        let right = json!({"list": [1, 5, 7]});

        let output = render(&left, &right, AsciiConfig::default());
        assert_eq!(
            output,
            " {\n   \"list\": [\n     1,\n-    1: 2,\n+    1: 5,\n+    2: 7\n   ]\n }\n"
        );

        let config = AsciiConfig {
            show_array_index: true,
            ..AsciiConfig::default()
        };
        let output = render(&left, &right, config);
        assert!(output.contains("\n     0: 1,\n"));
    }

    #[test]
    fn test_deleted_elements() {
        let output = render(&json!(["a", "b", "c"]), &json!(["a"]), AsciiConfig::default());
        assert_eq!(output, " [\n   \"a\",\n-  1: \"b\",\n-  2: \"c\"\n ]\n");
    }

    #[test]
    fn test_moved_elements_show_both_values() {
        let output = render(&json!(["x", "y"]), &json!(["y", "x"]), AsciiConfig::default());
        assert_eq!(
            output,
            " [\n-  0: \"x\",\n+  0: \"y\",\n-  1: \"y\"\n+  1: \"x\"\n ]\n"
        );
    }

    #[test]
    fn test_added_container_marks_every_line() {
        let output = render(&json!({}), &json!({"x": {"y": 1}}), AsciiConfig::default());
        assert_eq!(output, " {\n+  \"x\": {\n+    \"y\": 1\n+  }\n }\n");
    }

    #[test]
    fn test_coloring_wraps_only_marked_lines() {
        let config = AsciiConfig {
            coloring: true,
            ..AsciiConfig::default()
        };
        let output = render(&json!({"a": 1, "k": 0}), &json!({"a": 2, "k": 0}), config);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines,
            vec![
                " {",
                "<span class=\"diff-deleted\">-  \"a\": 1,</span>",
                "<span class=\"diff-added\">+  \"a\": 2,</span>",
                "   \"k\": 0",
                " }",
            ]
        );
    }

    #[test]
    fn test_scalar_root() {
        let output = render(&json!("a"), &json!("b"), AsciiConfig::default());
        assert_eq!(output, "-\"a\"\n+\"b\"\n");
    }

    #[test]
    fn test_no_changes_lists_original() {
        let value = json!({"a": [1], "e": {}});
        let output = render(&value, &value, AsciiConfig::default());
        assert_eq!(output, " {\n   \"a\": [\n     1\n   ],\n   \"e\": {}\n }\n");
    }

    #[test]
    fn test_container_mismatch_fails() {
        let diff = Diff::Changed(Change::Object(vec![Delta::key(
            "a",
            Change::Added(json!(1)),
        )]));
        let err = AsciiFormatter::new(&json!([1]), AsciiConfig::default())
            .format(&diff)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::TypeMismatch { expected: "object", found: "array", .. }
        ));
    }
}
