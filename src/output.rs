//! Report output: pretty JSON or JSON Lines, to a file or stdout.
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn to_json_lines<T: Serialize>(items: &[T]) -> Result<String> {
    let mut text = String::new();
    for item in items {
        text.push_str(&serde_json::to_string(item).context("serialize JSONL record")?);
        text.push('\n');
    }
    Ok(text)
}

/// Write `text` to `path`, or to stdout when no path is given.
pub fn emit(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => write_bytes(path, text.as_bytes()),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes()).context("write stdout")?;
            stdout.flush().context("flush stdout")
        }
    }
}

pub fn emit_json<T: Serialize>(path: Option<&Path>, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context("serialize JSON output")?;
    text.push('\n');
    emit(path, &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_put_one_record_per_line() {
        let text = to_json_lines(&[serde_json::json!({"a": 1}), serde_json::json!({"b": "x"})])
            .expect("serialize records");
        assert_eq!(text, "{\"a\":1}\n{\"b\":\"x\"}\n");
    }

    #[test]
    fn write_bytes_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("nested/out/records.jsonl");
        write_bytes(&path, b"{}\n").expect("write nested file");
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "{}\n");
    }
}
