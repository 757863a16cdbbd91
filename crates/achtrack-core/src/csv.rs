//! Minimal comma-separated codec for the catalog and history files.
//!
//! Both files are small enough to read and write wholesale, so this is a
//! plain string-in/string-out parser. Quoting follows RFC 4180: fields
//! containing commas, quotes or newlines are double-quoted, embedded quotes
//! doubled. CRLF and bare LF are both accepted.

use std::fmt::Write as _;

/// Parse `text` into rows of fields. Blank lines are skipped.
pub fn parse(text: &str) -> Vec<Vec<String>> {
  let mut rows: Vec<Vec<String>> = Vec::new();
  let mut row: Vec<String> = Vec::new();
  let mut field = String::new();
  let mut in_quotes = false;

  let mut chars = text.chars().peekable();
  while let Some(ch) = chars.next() {
    match ch {
      '"' => {
        if in_quotes && matches!(chars.peek(), Some('"')) {
          chars.next();
          field.push('"');
        } else {
          in_quotes = !in_quotes;
        }
      }
      ',' if !in_quotes => {
        row.push(std::mem::take(&mut field));
      }
      '\r' | '\n' if !in_quotes => {
        if ch == '\r' && matches!(chars.peek(), Some('\n')) {
          chars.next();
        }
        row.push(std::mem::take(&mut field));
        if row.len() > 1 || !row[0].is_empty() {
          rows.push(std::mem::take(&mut row));
        } else {
          row.clear();
        }
      }
      _ => field.push(ch),
    }
  }

  // Flush a trailing row without a final newline.
  if !field.is_empty() || !row.is_empty() {
    row.push(field);
    rows.push(row);
  }

  rows
}

fn needs_quotes(field: &str) -> bool {
  field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Append one row to `out`, quoting fields as needed.
pub fn write_row(out: &mut String, row: &[String]) {
  for (i, cell) in row.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    if needs_quotes(cell) {
      let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
    } else {
      out.push_str(cell);
    }
  }
  out.push('\n');
}
