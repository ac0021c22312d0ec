//! Data models for dashdiff
//!
//! Defines the live `Document`, its immutable `Version` snapshots, and the
//! paging/ordering options used when listing versions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which a document payload carries its own version number
pub const VERSION_FIELD: &str = "version";

/// Key under which a restored payload records the version it came from
pub const RESTORED_FROM_FIELD: &str = "restoredFrom";

/// The live, mutable configuration document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier
    pub id: i64,
    /// Current version number
    pub version: i64,
    /// JSON payload
    pub data: Value,
    /// When this document was last modified
    pub updated_at: DateTime<Utc>,
    /// Actor who last modified this document
    pub updated_by: i64,
}

impl Document {
    /// Create a document at version 1
    pub fn new(id: i64, data: Value, actor_id: i64) -> Self {
        Self {
            id,
            version: 1,
            data,
            updated_at: now(),
            updated_by: actor_id,
        }
    }
}

/// Current time at the millisecond precision the store keeps
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Write a version number into an object payload
///
/// Non-object payloads are left untouched.
pub fn stamp_version(data: &mut Value, version: i64) {
    if let Value::Object(map) = data {
        map.insert(VERSION_FIELD.to_string(), Value::from(version));
    }
}

/// An immutable, numbered snapshot of a document's payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Version {
    /// Owning document
    pub document_id: i64,
    /// Version number, unique per document
    pub version: i64,
    /// Version this one was derived from
    pub parent_version: Option<i64>,
    /// Version this one was restored from, if it is the result of a restore
    pub restored_from: Option<i64>,
    /// When this version was created
    pub created_at: DateTime<Utc>,
    /// Actor who created this version
    pub created_by: i64,
    /// Free-text message (empty when none was given)
    pub message: String,
    /// Payload at this point in the document's history
    pub data: Value,
}

impl Version {
    /// Snapshot the given document state as a new version
    pub fn snapshot(document: &Document, parent_version: Option<i64>, message: &str) -> Self {
        Self {
            document_id: document.id,
            version: document.version,
            parent_version,
            restored_from: None,
            created_at: document.updated_at,
            created_by: document.updated_by,
            message: message.to_string(),
            data: document.data.clone(),
        }
    }
}

/// Column used to order a version listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionOrder {
    Version,
    Created,
}

impl VersionOrder {
    pub(crate) fn column(self) -> &'static str {
        match self {
            VersionOrder::Version => "version",
            VersionOrder::Created => "created_at",
        }
    }
}

impl FromStr for VersionOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "version" => Ok(VersionOrder::Version),
            "created" => Ok(VersionOrder::Created),
            other => Err(format!(
                "unknown order '{}', expected 'version' or 'created'",
                other
            )),
        }
    }
}

/// Sort direction for a version listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Paging and ordering options for `ListVersions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionQuery {
    pub order_by: VersionOrder,
    pub direction: SortDirection,
    pub limit: usize,
    pub offset: usize,
}

/// Default page size for version listings
pub const DEFAULT_PAGE_SIZE: usize = 1000;

impl Default for VersionQuery {
    fn default() -> Self {
        Self {
            order_by: VersionOrder::Version,
            direction: SortDirection::Descending,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl VersionQuery {
    /// Set the page (limit and offset)
    pub fn page(mut self, limit: usize, offset: usize) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    /// Set ordering column and direction
    pub fn ordered(mut self, order_by: VersionOrder, direction: SortDirection) -> Self {
        self.order_by = order_by;
        self.direction = direction;
        self
    }
}

/// Selects one side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSelector {
    /// A stored version by number
    Number(i64),
    /// The live document payload
    Current,
}

impl FromStr for VersionSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("current") {
            return Ok(VersionSelector::Current);
        }
        s.parse::<i64>()
            .map(VersionSelector::Number)
            .map_err(|_| format!("invalid version '{}', expected a number or 'current'", s))
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSelector::Number(n) => write!(f, "{}", n),
            VersionSelector::Current => write!(f, "current"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_copies_document_state() {
        let doc = Document::new(7, json!({"title": "CPU"}), 3);
        let version = Version::snapshot(&doc, None, "initial");

        assert_eq!(version.document_id, 7);
        assert_eq!(version.version, 1);
        assert_eq!(version.created_by, 3);
        assert_eq!(version.message, "initial");
        assert_eq!(version.data, json!({"title": "CPU"}));
        assert!(version.restored_from.is_none());
    }

    #[test]
    fn test_stamp_version() {
        let mut data = json!({"title": "CPU", "version": 2});
        stamp_version(&mut data, 5);
        assert_eq!(data, json!({"title": "CPU", "version": 5}));

        let mut scalar = json!("not an object");
        stamp_version(&mut scalar, 5);
        assert_eq!(scalar, json!("not an object"));
    }

    #[test]
    fn test_default_query() {
        let query = VersionQuery::default();
        assert_eq!(query.order_by, VersionOrder::Version);
        assert_eq!(query.direction, SortDirection::Descending);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!("current".parse(), Ok(VersionSelector::Current));
        assert_eq!("CURRENT".parse(), Ok(VersionSelector::Current));
        assert_eq!("12".parse(), Ok(VersionSelector::Number(12)));
        assert!("twelve".parse::<VersionSelector>().is_err());
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("created".parse(), Ok(VersionOrder::Created));
        assert!("title".parse::<VersionOrder>().is_err());
    }
}
