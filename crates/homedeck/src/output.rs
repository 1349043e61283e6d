//! Output formatting: TOML, JSON, YAML.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render `data` in the chosen format.
pub fn render<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, CliError> {
    match format {
        OutputFormat::Toml => {
            toml::to_string_pretty(data).map_err(|e| CliError::Render(e.to_string()))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => {
            serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
        }
    }
}

/// Print rendered output to stdout.
pub fn print_output(output: &str) {
    if output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end());
}
