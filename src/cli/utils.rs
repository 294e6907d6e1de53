use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::notify::{Notification, Severity};
use crate::resource::view::cells;
use crate::resource::{Column, PageSlice};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
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

/// Output the notification a table action raised
pub fn output_notification(
    output_format: &OutputFormat,
    notification: &Notification,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match (output_format, notification.severity) {
        (_, Severity::Success) => output_success(output_format, &notification.message, data),
        (_, Severity::Error) => output_error(output_format, &notification.message, None),
        (OutputFormat::Json, severity) => {
            let mut response = json!({
                "success": true,
                "severity": severity,
                "message": notification.message,
            });
            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        (OutputFormat::Text, Severity::Warning) => {
            println!("! {}", notification.message);
            Ok(())
        }
        (OutputFormat::Text, Severity::Info) => {
            println!("{}", notification.message);
            Ok(())
        }
    }
}

/// Field-level issues from a form that was not submitted
pub fn output_form_errors(output_format: &OutputFormat, issues: &BTreeMap<String, String>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": "Form not submitted",
                    "fields": issues,
                }))?
            );
        }
        OutputFormat::Text => {
            for (field, message) in issues {
                eprintln!("  {}: {}", field, message);
            }
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: []
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output one page of a table
pub fn output_table<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    columns: &[Column],
    page: &PageSlice<'_, T>,
) -> anyhow::Result<()> {
    if page.total == 0 {
        return output_empty_collection(output_format, collection_name, &format!("No {} records", collection_name));
    }

    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    collection_name: page.rows,
                    "page": page.page + 1,
                    "page_count": page.page_count,
                    "total": page.total,
                }))?
            );
        }
        OutputFormat::Text => {
            let headers: Vec<String> = columns.iter().map(|c| c.header.to_string()).collect();
            let rows: Vec<Vec<String>> = page.rows.iter().map(|r| cells(*r, columns)).collect();
            print!("{}", render_text_table(&headers, &rows));
            println!("Page {} of {} ({} records)", page.page + 1, page.page_count, page.total);
        }
    }
    Ok(())
}

/// Fixed-width table with a header rule; cells are truncated to 40 characters
pub fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    const MAX_WIDTH: usize = 40;

    let clip = |s: &str| -> String {
        let flat = s.replace('\n', " ");
        if flat.chars().count() > MAX_WIDTH {
            format!("{}…", flat.chars().take(MAX_WIDTH - 1).collect::<String>())
        } else {
            flat
        }
    };

    let headers: Vec<String> = headers.iter().map(|h| clip(h)).collect();
    let rows: Vec<Vec<String>> = rows.iter().map(|r| r.iter().map(|c| clip(c)).collect()).collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&headers));
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    out.push('\n');
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

/// Read one line from stdin after printing `prompt` to stderr
pub fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// Ask a yes/no question; anything but `y`/`yes` is no
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let answer = prompt_line(&format!("{} [y/N] ", prompt))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
