//! Version command handlers

use anyhow::{Context, Result};

use dashdiff_core::{SortDirection, Store, VersionOrder, VersionSelector};

use crate::output::Output;

/// List versions of a document
pub fn list(
    store: &Store,
    document_id: i64,
    limit: Option<usize>,
    offset: usize,
    order_by: VersionOrder,
    direction: SortDirection,
    output: &Output,
) -> Result<()> {
    let default = store.default_query();
    let query = default
        .clone()
        .page(limit.unwrap_or(default.limit), offset)
        .ordered(order_by, direction);

    let versions = store
        .list_versions(document_id, &query)
        .with_context(|| format!("Failed to list versions of document {}", document_id))?;

    output.print_versions(&versions)
}

/// Show one version, or the live document for `current`
pub fn show(
    store: &Store,
    document_id: i64,
    selector: VersionSelector,
    output: &Output,
) -> Result<()> {
    match selector {
        VersionSelector::Number(version) => {
            let version = store
                .get_version(document_id, version)
                .context("Failed to get version")?;
            output.print_version(&version)
        }
        VersionSelector::Current => {
            let document = store
                .get_document(document_id)
                .context("Failed to get document")?;
            output.print_document(&document)
        }
    }
}
