use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Comma-separated transcript paths. A directory expands to the files it
/// contains, sorted by name.
pub fn parse_transcript_csv(input: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let path = PathBuf::from(token);
        if path.is_dir() {
            paths.extend(list_transcript_dir(&path)?);
        } else {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(anyhow!("no transcripts resolved from --transcripts"));
    }
    Ok(paths)
}

fn list_transcript_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed reading directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("failed listing {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Transcript file name without its extension, for report keys.
pub fn transcript_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
