use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::columns::{columns, rows};
use crate::schema::Resource;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(target)) = (data, response.as_object_mut()) {
                target.extend(extra);
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
pub fn output_error(output_format: OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
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

/// Print a single record (or `null`)
pub fn output_record(output_format: OutputFormat, resource: Resource, record: &Value) -> anyhow::Result<()> {
    match (output_format, record) {
        (OutputFormat::Text, Value::Null) => println!("{} not found", resource.singular()),
        _ => println!("{}", serde_json::to_string_pretty(record)?),
    }
    Ok(())
}

/// Print a listing as a table using the resource's column definitions
pub fn output_table(output_format: OutputFormat, resource: Resource, listing: Value) -> anyhow::Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    let rows = rows(resource, listing)?;
    if rows.is_empty() {
        println!("No {} found", resource.segment());
        return Ok(());
    }

    // The id stands in for the actions column in a terminal.
    let cols: Vec<_> = columns(resource).into_iter().filter(|c| !c.is_actions()).collect();
    let mut table: Vec<Vec<String>> = vec![std::iter::once("ID".to_string())
        .chain(cols.iter().map(|c| c.header.clone()))
        .collect()];

    for row in &rows {
        let mut line = vec![cell(row.get("id"))];
        line.extend(cols.iter().map(|c| cell(row.get(&c.key))));
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|i| table.iter().map(|line| line[i].chars().count()).max().unwrap_or(0))
        .collect();

    for line in &table {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{:<width$}", text, width = *width))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    }
    Ok(())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Store id from the flag, falling back to the remembered current store
pub fn resolve_store(provided: Option<String>, current: Option<String>) -> anyhow::Result<String> {
    provided
        .or(current)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("No store selected. Pass --store or run 'storefront data use <store-id>'"))
}
