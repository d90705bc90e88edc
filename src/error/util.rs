//! Utility functions for error handling
//!
//! Path-aware helpers that turn filesystem failures into errors that say which
//! file was involved and why it was needed.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{Result, TriageError};

/// Read a file to a string with rich error information
///
/// # Arguments
/// * `path` - The file to read
/// * `purpose` - Why the file is being read (for error context)
pub fn safe_read_to_string(path: &Path, purpose: &str) -> Result<String> {
    if !path.exists() {
        return Err(TriageError::ConfigError(format!(
            "File not found: {} (needed for: {purpose})",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(TriageError::ConfigError(format!(
            "Path is not a file: {} (expected a file for: {purpose})",
            path.display()
        )));
    }

    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) => {
            let context = match e.kind() {
                io::ErrorKind::PermissionDenied => "Permission denied - check file permissions",
                io::ErrorKind::InvalidData => "File contains invalid UTF-8 data - cannot read as text",
                _ => "Failed to read file content",
            };
            log::warn!("{context}: {} ({purpose})", path.display());
            Err(TriageError::IoError(io::Error::new(
                e.kind(),
                format!("{context}: {}: {e}", path.display()),
            )))
        }
    }
}
