//! Tree diff engine
//!
//! `compare` turns two JSON values into a `Diff`, `apply` re-applies one to
//! its original value, and `format` renders it for display or transport.

pub mod compare;
pub mod delta;
pub mod error;
pub mod format;
pub mod patch;

pub use compare::compare;
pub use delta::{Change, Delta, Diff, Position};
pub use error::{DeltaError, RenderError};
pub use format::{decode_delta, render, AsciiConfig, DiffFormat};
pub use patch::apply;
