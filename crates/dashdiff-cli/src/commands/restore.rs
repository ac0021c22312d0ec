//! Restore command handler

use anyhow::{Context, Result};

use dashdiff_core::Store;

use crate::output::Output;

/// Restore a document to an earlier version
pub fn restore(
    store: &mut Store,
    document_id: i64,
    version: i64,
    actor_id: i64,
    output: &Output,
) -> Result<()> {
    let document = store
        .restore(document_id, version, actor_id)
        .with_context(|| {
            format!(
                "Failed to restore document {} to version {}",
                document_id, version
            )
        })?;

    output.print_written(&format!("Restored version {} of", version), &document)
}
