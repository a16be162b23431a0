//! Speech synthesis glue and the rolling audio-output directory.
//!
//! Each synthesis call writes one uniquely named artifact; a retention sweep
//! keeps the directory bounded to the N most recent files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::engines::SpeechSynthesizer;
use crate::log_debug;

// Disambiguates artifacts created within the same millisecond.
static ARTIFACT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Build a collision-free artifact path inside `dir`.
pub fn artifact_path(dir: &Path, extension: &str) -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let seq = ARTIFACT_SEQ.fetch_add(1, Ordering::Relaxed);
    dir.join(format!("caption_{millis}_{seq}.{extension}"))
}

/// Synthesize speech for a description and return the artifact path, or
/// `None` when synthesis failed. The caller falls back to text-only output.
pub fn synthesize_description(
    synthesizer: &dyn SpeechSynthesizer,
    text: &str,
    output_dir: &Path,
    extension: &str,
) -> Option<PathBuf> {
    if let Err(err) = fs::create_dir_all(output_dir) {
        log_debug(&format!(
            "could not create audio output dir {}: {err}",
            output_dir.display()
        ));
        return None;
    }
    let path = artifact_path(output_dir, extension);
    match synthesizer.synthesize(text, &path) {
        Ok(()) => Some(path),
        Err(err) => {
            log_debug(&format!("speech synthesis failed: {err:#}"));
            let _ = fs::remove_file(&path);
            None
        }
    }
}

/// Keep at most `max_files` artifacts with the given extension, evicting the
/// oldest by modification time. Other files in the directory are untouched.
/// Returns how many files were removed.
pub fn enforce_retention(dir: &Path, max_files: usize, extension: &str) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut artifacts: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read audio dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(UNIX_EPOCH);
        artifacts.push((modified, path));
    }
    if artifacts.len() <= max_files {
        return Ok(0);
    }

    // Oldest first; path as tie-breaker keeps the order stable.
    artifacts.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    let excess = artifacts.len() - max_files;
    let mut removed = 0;
    for (_, path) in artifacts.into_iter().take(excess) {
        if fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}
