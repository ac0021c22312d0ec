//! Command handlers

pub mod config;
pub mod diff;
pub mod restore;
pub mod save;
pub mod status;
pub mod version;
