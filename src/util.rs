use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// `part / whole * 100`, rounded to two decimals; 0 when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 / whole as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

pub fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Write pretty JSON to `path` through a temp file in the same directory.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let bytes = serde_json::to_vec_pretty(value).context("serialize JSON")?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    temp.write_all(&bytes)
        .with_context(|| format!("write temp file for {}", path.display()))?;
    temp.persist(path)
        .map_err(|err| anyhow!("persist {}: {}", path.display(), err.error))?;
    Ok(())
}

/// Keep at most `limit` items of an iterator.
pub fn bounded<'a, T: Clone + 'a>(items: impl Iterator<Item = &'a T>, limit: usize) -> Vec<T> {
    items.take(limit).cloned().collect()
}
