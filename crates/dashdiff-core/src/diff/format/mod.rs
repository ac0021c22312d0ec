//! Diff renderers
//!
//! Three independent consumers of a `Diff`:
//!
//! - `delta`: compact machine-readable delta, decodable and re-applicable
//! - `json`: the original value with added members merged in, as plain JSON
//! - `basic`: line-oriented listing with `+`/`-` markers and optional markup

pub mod ascii;
pub mod delta;
pub mod json;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use super::delta::Diff;
use super::error::RenderError;
use crate::error::EngineError;

pub use ascii::{AsciiConfig, AsciiFormatter};
pub use delta::{decode_delta, DeltaFormatter};
pub use json::JsonFormatter;

/// Output format selector for a rendered diff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    /// Machine-readable delta
    Delta,
    /// Flat JSON of the original with added members
    Json,
    /// Line-oriented listing
    Basic,
}

impl DiffFormat {
    pub const ALL: [DiffFormat; 3] = [DiffFormat::Delta, DiffFormat::Json, DiffFormat::Basic];

    pub fn as_str(self) -> &'static str {
        match self {
            DiffFormat::Delta => "delta",
            DiffFormat::Json => "json",
            DiffFormat::Basic => "basic",
        }
    }
}

impl fmt::Display for DiffFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffFormat {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiffFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| EngineError::UnsupportedFormat(s.to_string()))
    }
}

/// Render a diff in the given format
///
/// `left` is the original value the diff was computed from.
pub fn render(
    format: DiffFormat,
    left: &Value,
    diff: &Diff,
    ascii: AsciiConfig,
) -> Result<Vec<u8>, RenderError> {
    let text = match format {
        DiffFormat::Delta => DeltaFormatter::new().format(diff),
        DiffFormat::Json => JsonFormatter::new(left).format(diff)?,
        DiffFormat::Basic => AsciiFormatter::new(left, ascii).format(diff)?,
    };
    Ok(text.into_bytes())
}
