use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::store::models::{JournalEntry, JournalEntrySummary};

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: OutputFormat, message: &str, status: Option<u16>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

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

pub fn output_entry(output_format: OutputFormat, entry: &JournalEntry) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(entry),
        OutputFormat::Text => {
            println!("✓ Entry {} saved at {}", entry.id, entry.created_at.to_rfc3339());
            Ok(())
        }
    }
}

pub fn output_entries(output_format: OutputFormat, entries: &[JournalEntrySummary]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_json(&entries),
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("No journal entries yet");
                return Ok(());
            }
            print!("{}", render_entries(entries));
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Text rendering: a dated header per entry followed by its indented content
pub fn render_entries(entries: &[JournalEntrySummary]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!(
            "{}  ({})\n",
            entry.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.id
        ));
        for line in entry.content.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
