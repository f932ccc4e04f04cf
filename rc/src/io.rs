//! Record file reading and JSON Lines output

use eyre::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::record::Record;

/// Parse records from a JSON array or from JSON Lines (blank lines ignored)
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    if content.trim_start().starts_with('[') {
        return serde_json::from_str(content).context("Failed to parse JSON array of records");
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| serde_json::from_str(line).with_context(|| format!("Invalid record on line {}", idx + 1)))
        .collect()
}

/// Read records from `path`
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    debug!(?path, "read_records: called");
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let records = parse_records(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(count = records.len(), "read_records: parsed");
    Ok(records)
}

/// Write one JSON object per line
pub fn write_jsonl<T: Serialize, W: Write>(items: &[T], mut out: W) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut out, item)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_array() {
        let records = parse_records(r#"[{"location": "A", "free_slots": 1}, {"Sted": "B"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].location.as_deref(), Some("B"));
    }

    #[test]
    fn test_parse_lines() {
        let content = "{\"location\": \"A\"}\n\n{\"location\": \"B\"}\n";
        let records = parse_records(content).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_parse_lines_reports_line_number() {
        let err = parse_records("{\"location\": \"A\"}\nnot json\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = read_records(&temp.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_write_jsonl() {
        let records = vec![Record::new("A", "01.01.2024", "10:00", 1), Record::default()];
        let mut buf = Vec::new();

        write_jsonl(&records, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert_eq!(parse_records(&text).unwrap(), records);
    }
}
