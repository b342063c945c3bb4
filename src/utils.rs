//! General utility functions for undat64
//!
//! Helpers for walking data dumps and presenting sizes, shared by the CLI
//! batch commands.

use anyhow::{Context, Result};
use globset::{Glob, GlobMatcher};
use std::fs;
use std::path::{Path, PathBuf};

/// Format a file size in human-readable form (B, KB, MB, GB)
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Create a glob matcher from a pattern string
///
/// Handles common patterns:
/// - `*.ext` becomes `**/*.ext` (match in any directory)
/// - Plain text without wildcards becomes `**/*text*` (substring search)
pub fn create_glob_matcher(pattern: &str) -> Result<GlobMatcher> {
    let pattern = if pattern.starts_with("*.") {
        format!("**/{}", pattern)
    } else if !pattern.contains('*') && !pattern.contains('?') {
        format!("**/*{}*", pattern)
    } else {
        pattern.to_string()
    };

    let glob = Glob::new(&pattern).with_context(|| format!("Invalid pattern: {}", pattern))?;
    Ok(glob.compile_matcher())
}

/// Recursively collect table files under `dir` that match the optional
/// filter. With no filter, anything with a `.datc64` extension qualifies.
pub fn collect_table_files(dir: &Path, matcher: Option<&GlobMatcher>) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_recursive(dir, matcher, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_recursive(
    dir: &Path,
    matcher: Option<&GlobMatcher>,
    files: &mut Vec<PathBuf>,
) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_recursive(&path, matcher, files)?;
        } else {
            let keep = match matcher {
                Some(m) => m.is_match(&path),
                None => path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("datc64"))
                    .unwrap_or(false),
            };
            if keep {
                files.push(path);
            }
        }
    }
    Ok(())
}
