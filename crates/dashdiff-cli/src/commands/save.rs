//! Save command handler

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use dashdiff_core::Store;

use crate::output::Output;

/// Save a JSON file as the next version of a document
pub fn save(
    store: &mut Store,
    document_id: i64,
    file: &Path,
    actor_id: i64,
    message: Option<String>,
    output: &Output,
) -> Result<()> {
    let json = read_input(file)?;

    let document = store
        .save_from_str(document_id, &json, actor_id, message.as_deref().unwrap_or(""))
        .with_context(|| format!("Failed to save {:?} to document {}", file, document_id))?;

    output.print_written("Saved", &document)
}

/// Read a file, or stdin for `-`
fn read_input(file: &Path) -> Result<String> {
    if file == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read document from stdin")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(file).with_context(|| format!("Failed to read {:?}", file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashdiff_core::Config;
    use tempfile::TempDir;

    #[test]
    fn test_read_input_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dashboard.json");
        std::fs::write(&path, r#"{"title": "CPU"}"#).unwrap();

        assert_eq!(read_input(&path).unwrap(), r#"{"title": "CPU"}"#);
        assert!(read_input(&temp_dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_save_appends_versions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dashboard.json");
        let mut store = Store::open_in_memory(Config::default()).unwrap();
        let output = Output::new(crate::output::OutputFormat::Quiet);

        std::fs::write(&path, r#"{"a": 1}"#).unwrap();
        save(&mut store, 1, &path, 5, None, &output).unwrap();
        std::fs::write(&path, r#"{"a": 2}"#).unwrap();
        save(&mut store, 1, &path, 5, Some("bump".to_string()), &output).unwrap();

        let document = store.get_document(1).unwrap();
        assert_eq!(document.version, 2);
        assert_eq!(store.get_version(1, 2).unwrap().message, "bump");
    }

    #[test]
    fn test_save_rejects_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let mut store = Store::open_in_memory(Config::default()).unwrap();
        let output = Output::new(crate::output::OutputFormat::Quiet);

        assert!(save(&mut store, 1, &path, 5, None, &output).is_err());
        assert!(!store.document_exists(1).unwrap());
    }
}
