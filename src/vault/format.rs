//! On-disk vault format: a properties-style text file.
//!
//! ```text
//! #passhero vault
//! #Sun, 19 Oct 2026 10:12:44 +0000
//! <encrypted name>=<encrypted password>
//! <encrypted name>=<encrypted password>
//! ```
//!
//! - Lines starting with `#` or `!` are comments; blank lines are skipped.
//! - The first unescaped `=` or `:` separates key from value; whitespace
//!   around the separator is ignored.
//! - `\\`, `\=`, `\:`, `\#`, `\!`, `\ `, `\n`, `\r`, `\t` are escapes.
//!   Any other escaped character stands for itself.
//! - Entries are written sorted by key so identical vaults produce
//!   identical files (apart from the timestamp line).
//!
//! Encryptor tokens never need escaping; the escapes keep the format
//! usable for arbitrary strings.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use chrono::Utc;

use crate::errors::{PassHeroError, Result};

/// Encrypted key → encrypted value, ordered by key.
pub type EncryptedEntries = BTreeMap<String, String>;

/// First comment line of every file we write.
const HEADER: &str = "#passhero vault";

/// Parse all entries from `reader`.  Later duplicates replace earlier ones.
pub fn read_entries(mut reader: impl Read) -> Result<EncryptedEntries> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| {
        if e.kind() == std::io::ErrorKind::InvalidData {
            PassHeroError::InvalidVaultFormat("vault file is not valid UTF-8".into())
        } else {
            PassHeroError::Io(e)
        }
    })?;

    let mut entries = EncryptedEntries::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let line_no = index + 1;
        let (raw_key, raw_value) = split_entry(line).ok_or_else(|| {
            PassHeroError::InvalidVaultFormat(format!("line {line_no}: missing '=' separator"))
        })?;

        let key = unescape(trim_unescaped_end(raw_key), line_no)?;
        let value = unescape(raw_value.trim_start(), line_no)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

/// Write `entries` to `writer`, header comments first.
pub fn write_entries<W: Write + ?Sized>(writer: &mut W, entries: &EncryptedEntries) -> Result<()> {
    writeln!(writer, "{HEADER}")?;
    writeln!(writer, "#{}", Utc::now().to_rfc2822())?;
    for (key, value) in entries {
        writeln!(writer, "{}={}", escape(key), escape(value))?;
    }
    writer.flush()?;
    Ok(())
}

/// Split at the first unescaped `=` or `:`.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' | ':' => return Some((&line[..i], &line[i + 1..])),
            _ => {}
        }
    }
    None
}

/// Trim trailing whitespace, keeping a space the writer escaped as `\ `.
fn trim_unescaped_end(s: &str) -> &str {
    let trimmed = s.trim_end();
    let backslashes = trimmed.bytes().rev().take_while(|&b| b == b'\\').count();
    if backslashes % 2 == 0 {
        return trimmed;
    }
    match s[trimmed.len()..].chars().next() {
        Some(escaped) => &s[..trimmed.len() + escaped.len_utf8()],
        None => trimmed,
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '=' | ':' | '#' | '!' | ' ' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(s: &str, line_no: usize) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {
                return Err(PassHeroError::InvalidVaultFormat(format!(
                    "line {line_no}: trailing backslash (line continuations are not supported)"
                )))
            }
        }
    }
    Ok(out)
}
