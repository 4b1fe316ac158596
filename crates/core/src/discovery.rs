//! Finding script files to analyze under a directory
//!
//! Build output and dependency trees (`node_modules/`, `.next/cache/`,
//! coverage reports) hold most of the JavaScript in a typical checkout but
//! rarely the code under review, so they are excluded through
//! `[ignore] paths` in `.jshunter.toml`. Whatever git ignores is skipped too.

use anyhow::Result;
use ignore::overrides::{Override, OverrideBuilder};
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// Every file under `root` with one of `extensions` (`.js`, `.tsx`, ...)
/// that is neither hidden, git-ignored, nor matched by `ignore_patterns`.
///
/// Extensions compare case-insensitively, so `BUNDLE.JS` counts. The result
/// holds absolute paths in sorted order.
pub fn discover_files(
    root: &Path,
    extensions: &[&str],
    ignore_patterns: &[String],
) -> Result<Vec<PathBuf>> {
    let root = root.canonicalize()?;

    let mut walker = WalkBuilder::new(&root);
    walker
        .hidden(true)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true);
    if let Some(excludes) = excludes(&root, ignore_patterns)? {
        walker.overrides(excludes);
    }

    let mut scripts: Vec<PathBuf> = walker
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(is_file)
        .map(DirEntry::into_path)
        .filter(|path| is_script(path, extensions))
        .map(|path| if path.is_absolute() { path } else { root.join(path) })
        .collect();

    scripts.sort();
    tracing::debug!("found {} script files under {}", scripts.len(), root.display());
    Ok(scripts)
}

/// Turn ignore paths into exclude globs: `node_modules/` drops the whole
/// directory, `vendor.js` or `*.min.js` drop matching files
fn excludes(root: &Path, ignore_patterns: &[String]) -> Result<Option<Override>> {
    if ignore_patterns.is_empty() {
        return Ok(None);
    }

    let mut builder = OverrideBuilder::new(root);
    for pattern in ignore_patterns {
        let glob = match pattern.strip_suffix('/') {
            Some(dir) => format!("!{dir}/**"),
            None => format!("!{pattern}"),
        };
        builder.add(&glob)?;
    }
    Ok(Some(builder.build()?))
}

fn is_file(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|kind| kind.is_file())
}

fn is_script(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}
