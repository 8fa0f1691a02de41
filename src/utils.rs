// ABOUTME: Utility functions for the bitacora site
// ABOUTME: Provides path validation, path segment checks and content type lookup

use crate::errors::{BitacoraError, Result};
use std::path::{Path, PathBuf};

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BitacoraError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(BitacoraError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(BitacoraError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BitacoraError::ValidationError(format!(
            "Path is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// True when `segment` names exactly one entry inside a directory.
pub fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains('/')
        && !segment.contains('\\')
        && !segment.contains('\0')
}

/// Join URL path segments under `root`, refusing anything that could escape it.
pub fn resolve_under(root: &Path, segments: &[&str]) -> Option<PathBuf> {
    if segments.is_empty() || !segments.iter().all(|s| is_plain_segment(s)) {
        return None;
    }
    let mut path = root.to_path_buf();
    for segment in segments {
        path.push(segment);
    }
    Some(path)
}

/// Content type for a static file, based on its extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
