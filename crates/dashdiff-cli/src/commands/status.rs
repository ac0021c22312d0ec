//! Status command handler

use anyhow::{Context, Result};

use dashdiff_core::{Store, VersionQuery};

use crate::output::{Output, OutputFormat};

/// Show status information for a document
pub fn show(store: &Store, document_id: i64, output: &Output) -> Result<()> {
    let document = store
        .get_document(document_id)
        .with_context(|| format!("Failed to get document {}", document_id))?;
    let version_count = store.version_count(document_id)?;
    let latest = store
        .list_versions(document_id, &VersionQuery::default().page(1, 0))?
        .into_iter()
        .next();
    let config = store.config();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "document_id": document.id,
                    "version": document.version,
                    "updated_at": document.updated_at.to_rfc3339(),
                    "updated_by": document.updated_by,
                    "version_count": version_count,
                    "restored_from": latest.as_ref().and_then(|v| v.restored_from),
                    "database": config.sqlite_path(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", document.version);
        }
        OutputFormat::Human => {
            println!("Document {} Status", document.id);
            println!("==================");
            println!();
            println!("Current:");
            println!("  Version:    {}", document.version);
            println!(
                "  Updated:    {}",
                document.updated_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Updated by: {}", document.updated_by);
            if let Some(from) = latest.as_ref().and_then(|v| v.restored_from) {
                println!("  Restored from version {}", from);
            }
            println!();
            println!("History:");
            println!("  Versions: {}", version_count);
            println!();
            println!("Storage:");
            println!("  Database: {}", config.sqlite_path().display());
        }
    }

    Ok(())
}
