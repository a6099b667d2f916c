use crate::codec::tags;
use crate::config::EditorConfig;
use crate::error::PipelineError;
use crate::models::{Field, MerchantInfo, Payload};
use crate::pipeline::{Edit, EditOutcome, Editor};
use crate::validator::{ValidationResult, validate_with};
use rayon::prelude::*;
use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

/// Read payloads from a text file, one per line.
///
/// Blank lines and lines starting with `#` are ignored; surrounding
/// whitespace is stripped.
pub fn read_payloads<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(payload_lines(&content))
}

/// Read payloads from any buffered reader (e.g. stdin)
pub fn read_payloads_from<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut payloads = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        payloads.push(trimmed.to_string());
    }
    Ok(payloads)
}

fn payload_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Validate many payloads in parallel; results keep input order
pub fn validate_all(payloads: &[String], config: &EditorConfig) -> Vec<ValidationResult> {
    payloads
        .par_iter()
        .map(|raw| validate_with(raw, config))
        .collect()
}

/// Apply the same edits to many payloads in parallel.
///
/// Each payload gets its own [`Editor`]; nothing is shared between workers.
pub fn edit_all(
    payloads: &[String],
    edits: &[Edit],
    config: &EditorConfig,
) -> Vec<Result<EditOutcome, PipelineError>> {
    payloads
        .par_iter()
        .map(|raw| {
            let mut editor = Editor::open_with(raw, config.clone())?;
            editor.apply_all(edits.iter().cloned());
            editor.finalize()
        })
        .collect()
}

/// Summary counts for a validation batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Payloads checked
    pub total: usize,
    /// Passed every check
    pub valid: usize,
    /// Invalid with at least one structural issue
    pub broken: usize,
}

/// Count valid and structurally broken results
pub fn batch_stats(results: &[ValidationResult]) -> BatchStats {
    let mut stats = BatchStats {
        total: results.len(),
        ..BatchStats::default()
    };
    for result in results {
        if result.ok {
            stats.valid += 1;
        } else if !result.is_structurally_sound() {
            stats.broken += 1;
        }
    }
    stats
}

const RULE_WIDTH: usize = 50;

/// Merchant info table followed by the raw payload
pub fn format_info(info: &MerchantInfo, raw: &str) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&heavy);
    out.push('\n');
    out.push_str("          QRIS MERCHANT INFORMATION\n");
    out.push_str(&heavy);
    out.push('\n');
    for (label, value) in info.rows() {
        out.push_str(&format!("  {:20}: {}\n", label, value));
    }
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    out.push_str("  QRIS Raw Value:\n");
    out.push_str(&format!("  {}\n", raw));
    out.push_str(&heavy);
    out.push('\n');
    out
}

/// Indented tag tree with names and lengths
pub fn format_tree(payload: &Payload) -> String {
    let mut out = String::new();
    for field in payload.fields() {
        write_tree_line(&mut out, field, None);
    }
    out
}

fn write_tree_line(out: &mut String, field: &Field, parent: Option<&Field>) {
    let (indent, name) = match parent {
        None => ("", tags::name(field.tag())),
        Some(parent) => ("    ", tags::sub_name(parent.tag(), field.tag())),
    };
    match field.children() {
        Some(children) => {
            out.push_str(&format!(
                "{}{} [{:02}] {}\n",
                indent,
                field.tag(),
                field.length(),
                name
            ));
            for child in children {
                write_tree_line(out, child, Some(field));
            }
        }
        None => out.push_str(&format!(
            "{}{} [{:02}] {}: {}\n",
            indent,
            field.tag(),
            field.length(),
            name,
            field.text().unwrap_or_default()
        )),
    }
}

/// Verdict line followed by one line per issue
pub fn format_validation(result: &ValidationResult) -> String {
    let mut out = String::from(if result.ok { "QRIS valid\n" } else { "QRIS invalid\n" });
    for issue in &result.diagnostics {
        let severity = if issue.is_structural() { "error" } else { "warning" };
        out.push_str(&format!("  {}: {}\n", severity, issue));
    }
    out
}
