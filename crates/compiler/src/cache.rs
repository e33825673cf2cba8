//! Compile Cache (`spec.md` §4.6, §6 "Cache layout"). A thin key/value
//! store keyed by source path, storing the compiled artifact alongside
//! the source's modification time at the point it was compiled.

use crate::error::{CompileError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    artifact: String,
    source_mtime: u64,
}

/// A filesystem-backed compile cache. One entry per source path, stored
/// as a JSON sidecar file under `directory`.
pub struct CompileCache {
    directory: PathBuf,
}

impl CompileCache {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        CompileCache { directory: directory.into() }
    }

    /// Probes `directory` for writability by creating it (if absent)
    /// and touching a throwaway file inside it.
    pub fn ensure_writable(&self) -> Result<()> {
        fs::create_dir_all(&self.directory).map_err(|_| CompileError::CacheDirNotWritable {
            path: self.directory.display().to_string(),
        })?;
        let probe = self.directory.join(".write-probe");
        fs::write(&probe, b"").map_err(|_| CompileError::CacheDirNotWritable {
            path: self.directory.display().to_string(),
        })?;
        let _ = fs::remove_file(&probe);
        Ok(())
    }

    /// `get(source_path) -> (artifact, source_mtime_stored) | absent`.
    pub fn get(&self, source_path: &Path) -> Option<(String, u64)> {
        let cache_file = self.directory.join(cache_filename(source_path));
        let raw = fs::read_to_string(cache_file).ok()?;
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        Some((entry.artifact, entry.source_mtime))
    }

    /// `put(source_path, artifact, source_mtime) -> ok`.
    pub fn put(&self, source_path: &Path, artifact: &str, source_mtime: u64) -> Result<()> {
        let cache_file = self.directory.join(cache_filename(source_path));
        let entry = CacheEntry {
            artifact: artifact.to_string(),
            source_mtime,
        };
        let serialized = serde_json::to_string(&entry).expect("CacheEntry is always serializable");
        fs::write(&cache_file, serialized).map_err(|_| CompileError::CacheDirNotWritable {
            path: self.directory.display().to_string(),
        })
    }

    /// Whether a recompile is required: the cache is disabled, the
    /// entry is absent, or the source's current mtime is at or past the
    /// mtime stored at the entry's last compile, per `spec.md` §4.6.
    pub fn needs_recompile(&self, source_path: &Path, cache_enabled: bool) -> bool {
        if !cache_enabled {
            return true;
        }
        let Some((_, stored_mtime)) = self.get(source_path) else {
            return true;
        };
        match source_mtime(source_path) {
            Some(now) => now >= stored_mtime,
            None => true,
        }
    }
}

/// Reads a path's modification time as a Unix timestamp in seconds.
pub fn source_mtime(path: &Path) -> Option<u64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// Implements `spec.md` §6's "Cache layout" filename rule: the last 30
/// characters of `basepath+name`, with path separators and spaces
/// replaced by `-`, any character outside `[0-9a-zA-Z_\-.]` stripped,
/// followed by `-<fingerprint-of-full-path>` and the original
/// extension.
fn cache_filename(source_path: &Path) -> String {
    let full = source_path.to_string_lossy().replace(['/', '\\', ' '], "-");
    let sanitized: String = full
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let truncated: String = sanitized
        .chars()
        .rev()
        .take(30)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let mut hasher = DefaultHasher::new();
    source_path.to_string_lossy().hash(&mut hasher);
    let fingerprint = hasher.finish();

    let extension = source_path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if extension.is_empty() {
        format!("{truncated}-{fingerprint:016x}")
    } else {
        format!("{truncated}-{fingerprint:016x}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_filename_is_deterministic_and_bounded() {
        let a = cache_filename(Path::new("/var/www/app/templates/very/deep/path/page.sft"));
        let b = cache_filename(Path::new("/var/www/app/templates/very/deep/path/page.sft"));
        assert_eq!(a, b);
        assert!(a.ends_with(".sft"));
    }

    #[test]
    fn cache_filename_differs_for_different_paths() {
        let a = cache_filename(Path::new("/templates/a.sft"));
        let b = cache_filename(Path::new("/templates/b.sft"));
        assert_ne!(a, b);
    }
}
