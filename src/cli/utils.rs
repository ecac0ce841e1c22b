use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::cli::OutputFormat;

/// Read a JSON document the user pointed the CLI at.
pub fn load_json_file(path: &Path) -> anyhow::Result<Value> {
    let content = fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Error loading JSON file {}: {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Error loading JSON file {}: {}", path.display(), e))
}

/// Print an accepted request: the full response in JSON mode, a summary line otherwise.
pub fn output_success(output_format: &OutputFormat, response: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Text => {
            let message = response.get("message").and_then(Value::as_str).unwrap_or("Request submitted");
            println!("✓ {}", message);
            for key in ["account_name", "target_tier", "option_name", "commit_sha"] {
                if let Some(value) = response.get(key).and_then(Value::as_str) {
                    println!("  {}: {}", key, value);
                }
            }
        }
    }
    Ok(())
}

pub fn output_error(output_format: &OutputFormat, message: &str, status: Option<u16>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({ "error": message });
            if let Some(code) = status {
                response["status"] = json!(code);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}
