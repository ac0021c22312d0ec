//! dashdiff Core Library
//!
//! This crate provides version history, structural diffs and restores for
//! JSON configuration documents such as dashboards.
//!
//! # Architecture
//!
//! - **Version log**: every save appends an immutable, numbered snapshot;
//!   the live document always points at the newest one
//! - **Diff engine**: compares two JSON values into a typed delta tree
//! - **Renderers**: machine delta, flat JSON, and a marked line listing
//! - **Restore**: appends a copy of an earlier version instead of
//!   rewinding history
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open()?;
//!
//! store.save(1, json!({"a": 1}), actor, "")?;
//! store.save(1, json!({"a": 2, "b": 3}), actor, "")?;
//!
//! let listing = store.compute_diff(1, VersionSelector::Number(1), VersionSelector::Number(2), "basic")?;
//! store.restore(1, 1, actor)?;
//! ```
//!
//! # Modules
//!
//! - `store`: Unified interface (main entry point)
//! - `models`: Documents, versions, listing options
//! - `storage`: `VersionStore` contract and its SQLite implementation
//! - `diff`: Comparison, delta model, patching and renderers
//! - `restore`: Restore coordinator
//! - `config`: Application configuration

pub mod config;
pub mod diff;
pub mod error;
pub mod models;
pub mod restore;
pub mod storage;
pub mod store;

pub use config::Config;
pub use diff::{AsciiConfig, Change, Delta, DeltaError, Diff, DiffFormat, Position, RenderError};
pub use error::{EngineError, EngineResult};
pub use models::{
    Document, SortDirection, Version, VersionOrder, VersionQuery, VersionSelector,
};
pub use restore::RestoreCoordinator;
pub use storage::{SqliteVersionStore, StorageError, VersionStore};
pub use store::Store;
