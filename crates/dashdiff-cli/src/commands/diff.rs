//! Diff command handler

use anyhow::{Context, Result};

use dashdiff_core::{AsciiConfig, DiffFormat, Store, VersionSelector};

use crate::output::Output;

/// Compare two versions of a document and print the rendered diff
///
/// Format and renderer options fall back to the configuration.
#[allow(clippy::too_many_arguments)]
pub fn diff(
    store: &Store,
    document_id: i64,
    from: VersionSelector,
    to: VersionSelector,
    format: Option<String>,
    show_array_index: bool,
    color: bool,
    output: &Output,
) -> Result<()> {
    let config = store.config();
    let format: DiffFormat = match format {
        Some(name) => name.parse()?,
        None => config.default_format()?,
    };
    let ascii = AsciiConfig {
        show_array_index: show_array_index || config.show_array_index,
        coloring: color || config.coloring,
    };

    let rendered = store
        .compute_diff_with(document_id, from, to, format, ascii)
        .with_context(|| {
            format!(
                "Failed to diff document {} ({} -> {})",
                document_id, from, to
            )
        })?;

    output.print_diff(format, &rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use dashdiff_core::{Config, EngineError};
    use serde_json::json;

    fn store() -> Store {
        let mut store = Store::open_in_memory(Config::default()).unwrap();
        store.save(1, json!({"a": 1}), 1, "").unwrap();
        store.save(1, json!({"a": 2}), 1, "").unwrap();
        store
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let output = Output::new(OutputFormat::Quiet);
        let err = diff(
            &store(),
            1,
            VersionSelector::Number(1),
            VersionSelector::Number(2),
            Some("html".to_string()),
            false,
            false,
            &output,
        )
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_version_is_reported() {
        let output = Output::new(OutputFormat::Quiet);
        let err = diff(
            &store(),
            1,
            VersionSelector::Number(1),
            VersionSelector::Number(7),
            Some("delta".to_string()),
            false,
            false,
            &output,
        )
        .unwrap_err();

        assert!(err.downcast_ref::<EngineError>().is_some_and(|e| e.is_not_found()));
    }
}
