//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use dashdiff_core::{Config, DiffFormat};

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "diff_format": config.diff_format,
                    "show_array_index": config.show_array_index,
                    "coloring": config.coloring,
                    "page_size": config.page_size,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:         {}", config.data_dir.display());
            println!("  diff_format:      {}", config.diff_format);
            println!("  show_array_index: {}", config.show_array_index);
            println!("  coloring:         {}", config.coloring);
            println!("  page_size:        {}", config.page_size);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "diff_format" => {
            let format: DiffFormat = value.parse()?;
            config.diff_format = format.to_string();
        }
        "show_array_index" => {
            config.show_array_index = value
                .parse()
                .context("Invalid value for show_array_index. Use 'true' or 'false'.")?;
        }
        "coloring" => {
            config.coloring = value
                .parse()
                .context("Invalid value for coloring. Use 'true' or 'false'.")?;
        }
        "page_size" => {
            let page_size: usize = value
                .parse()
                .context("Invalid value for page_size. Use a positive number.")?;
            if page_size == 0 {
                bail!("page_size must be at least 1");
            }
            config.page_size = page_size;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, diff_format, show_array_index, coloring, page_size, log_file",
                key
            );
        }
    }
    Ok(())
}
