use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::record::Record;
use crate::resource::ResourceDescriptor;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(obj)) = (data, response.as_object_mut()) {
                obj.extend(extra);
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
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Records of one resource: a JSON array, or one line per record with its
/// non-file fields
pub fn output_records(output_format: &OutputFormat, descriptor: &ResourceDescriptor, records: &[Record]) -> anyhow::Result<()> {
    if records.is_empty() {
        return output_empty_collection(
            output_format,
            descriptor.resource.as_str(),
            &format!("No {} found", descriptor.label.to_lowercase()),
        );
    }

    match output_format {
        OutputFormat::Json => {
            let items: Vec<Value> = records.iter().map(Record::to_value).collect();
            println!("{}", serde_json::to_string_pretty(&json!({ descriptor.resource.as_str(): items }))?);
        }
        OutputFormat::Text => {
            for record in records {
                let id = record.id().map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
                let summary: Vec<String> = descriptor
                    .fields
                    .iter()
                    .filter(|f| !f.is_draft_only())
                    .filter_map(|f| record.get(f.name).map(|v| format!("{}={}", f.name, display_value(v))))
                    .collect();
                println!("{:<6} {}", id, summary.join("  "));
            }
        }
    }
    Ok(())
}

/// Scalar for text output; long strings are cut at 40 characters
pub fn display_value(value: &Value) -> String {
    let text = match value {
        Value::Null => return "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > 40 {
        let cut: String = text.chars().take(37).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

/// Split `name=value` from the command line
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(anyhow::anyhow!("Expected NAME=VALUE, got '{}'", raw)),
    }
}
