//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use std::io::{self, Write};

use anyhow::Result;

use dashdiff_core::{DiffFormat, Document, Version};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the live document
    pub fn print_document(&self, document: &Document) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Document:    {}", document.id);
                println!("Version:     {}", document.version);
                println!("Updated by:  {}", document.updated_by);
                println!(
                    "Updated:     {}",
                    document.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
                println!();
                println!("{}", serde_json::to_string_pretty(&document.data)?);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(document)?);
            }
            OutputFormat::Quiet => {
                println!("{}", document.data);
            }
        }
        Ok(())
    }

    /// Report a write that produced a new document version
    pub fn print_written(&self, action: &str, document: &Document) -> Result<()> {
        match self.format {
            OutputFormat::Human => println!(
                "✓ {} document {} (now at version {})",
                action, document.id, document.version
            ),
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(document)?);
            }
            OutputFormat::Quiet => println!("{}", document.version),
        }
        Ok(())
    }

    /// Print a single version
    pub fn print_version(&self, version: &Version) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                println!("Document:      {}", version.document_id);
                println!("Version:       {}", version.version);
                println!("Parent:        {}", optional(version.parent_version));
                if let Some(restored_from) = version.restored_from {
                    println!("Restored from: {}", restored_from);
                }
                println!("Created by:    {}", version.created_by);
                println!(
                    "Created:       {}",
                    version.created_at.format("%Y-%m-%d %H:%M:%S")
                );
                if !version.message.is_empty() {
                    println!("Message:       {}", version.message);
                }
                println!();
                println!("{}", serde_json::to_string_pretty(&version.data)?);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(version)?);
            }
            OutputFormat::Quiet => {
                println!("{}", version.data);
            }
        }
        Ok(())
    }

    /// Print a list of versions
    pub fn print_versions(&self, versions: &[Version]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for version in versions {
                    let lineage = match version.restored_from {
                        Some(from) => format!("restored from {}", from),
                        None => format!("parent {}", optional(version.parent_version)),
                    };
                    println!(
                        "v{:<4} | {} | actor {:<4} | {:<18} | {}",
                        version.version,
                        version.created_at.format("%Y-%m-%d %H:%M"),
                        version.created_by,
                        lineage,
                        truncate(&version.message, 40)
                    );
                }
                println!("\n{} version(s)", versions.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(versions)?);
            }
            OutputFormat::Quiet => {
                for version in versions {
                    println!("{}", version.version);
                }
            }
        }
        Ok(())
    }

    /// Print a rendered diff
    pub fn print_diff(&self, format: DiffFormat, rendered: &[u8]) -> Result<()> {
        match self.format {
            OutputFormat::Human | OutputFormat::Quiet => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(rendered)?;
                if !rendered.ends_with(b"\n") {
                    stdout.write_all(b"\n")?;
                }
            }
            OutputFormat::Json => {
                let text = String::from_utf8_lossy(rendered);
                println!(
                    "{}",
                    serde_json::json!({"format": format.as_str(), "output": text})
                );
            }
        }
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn optional(value: Option<i64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(Some(3)), "3");
        assert_eq!(optional(None), "-");
    }
}
