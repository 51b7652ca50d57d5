//! Dotenv-style key/value parsing for credential files.

use std::collections::HashMap;

/// Parse `KEY=VALUE` lines.
///
/// Blank lines and lines starting with `#` are skipped. Keys and values are
/// trimmed; a value wrapped in matching single or double quotes is
/// unwrapped. Lines without `=` are ignored. Later duplicates win.
pub fn parse_env(contents: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }
    vars
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        let bytes = value.as_bytes();
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[value.len() - 1] == first {
            return &value[1..value.len() - 1];
        }
    }
    value
}
