//! Blueprint source reading and include expansion.
//!
//! `<!-- include(file.md) -->` statements are a plain text-substitution pass
//! that runs before any parsing. Paths starting with `/` resolve from the
//! blueprint root, anything else from the including file's directory.

use regex::Regex;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, thiserror::Error)]
pub enum BlueprintIoError {
    #[error("Fail to read API Blueprint {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Infinite include loop detected at {path}. check your API definitions")]
    IncludeLoop { path: PathBuf },
}

/// Fully include-expanded blueprint text, plus every file that was read while
/// expanding it so callers can track rebuild dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlueprintSource {
    pub text: String,
    pub dependencies: Vec<RelativePathBuf>,
}

fn include_regex() -> &'static Regex {
    static INCLUDE_REGEX: OnceLock<Regex> = OnceLock::new();
    INCLUDE_REGEX
        .get_or_init(|| Regex::new(r"<!--\s+include\(([^)]+)\)\s+-->").expect("Invalid include regex"))
}

/// Reads `entry` (relative to `root`) and recursively expands every include
/// statement in place.
pub fn read_blueprint(
    root: &Path,
    entry: &RelativePath,
) -> Result<BlueprintSource, BlueprintIoError> {
    let mut dependencies = Vec::new();
    let mut stack = Vec::new();
    let text = read_expanded(root, entry, &mut stack, &mut dependencies)?;
    Ok(BlueprintSource { text, dependencies })
}

fn read_expanded(
    root: &Path,
    relative_path: &RelativePath,
    stack: &mut Vec<PathBuf>,
    dependencies: &mut Vec<RelativePathBuf>,
) -> Result<String, BlueprintIoError> {
    let absolute_path = relative_path.to_path(root);
    if stack.contains(&absolute_path) {
        return Err(BlueprintIoError::IncludeLoop {
            path: absolute_path,
        });
    }

    let raw = fs::read_to_string(&absolute_path).map_err(|source| BlueprintIoError::Read {
        path: absolute_path.clone(),
        source,
    })?;
    // Files saved by Windows editors may start with a UTF-8 byte order mark
    let mut content = raw.strip_prefix('\u{feff}').unwrap_or(&raw).to_string();

    dependencies.push(relative_path.to_relative_path_buf());
    stack.push(absolute_path);

    loop {
        let found = include_regex()
            .captures(&content)
            .map(|caps| (caps.get(0).map(|m| m.range()), caps[1].to_string()));
        let Some((Some(range), filename)) = found else {
            break;
        };
        let included = resolve_include(relative_path, &filename);
        let replacement = read_expanded(root, &included, stack, dependencies)?;
        content.replace_range(range, &replacement);
    }

    stack.pop();
    Ok(content)
}

fn resolve_include(current: &RelativePath, filename: &str) -> RelativePathBuf {
    let filename = filename.trim();
    match filename.strip_prefix('/') {
        Some(from_root) => RelativePath::new(from_root).normalize(),
        None => {
            let dir = current.parent().unwrap_or_else(|| RelativePath::new(""));
            dir.join_normalized(filename)
        }
    }
}
