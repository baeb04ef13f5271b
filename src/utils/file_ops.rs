use log::warn;
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{TransformationError, TransformationResult};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Read a dump or script. A leading byte order mark is dropped so that the
/// first statement is still recognized.
pub fn read_sql_file<P: AsRef<Path>>(path: P) -> TransformationResult<String> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| with_path(path, e))?;
    Ok(content
        .strip_prefix(BYTE_ORDER_MARK)
        .map(str::to_string)
        .unwrap_or(content))
}

/// Read every script and join them into one. A file that does not end with
/// `;` must not run into the next one, so scripts are joined with `;\n`.
/// Empty statements are skipped downstream.
pub fn read_sql_script<P: AsRef<Path>>(paths: &[P]) -> TransformationResult<String> {
    let mut scripts = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        if !is_sql_file(path) {
            warn!("{} does not have a .sql extension", path.display());
        }
        scripts.push(read_sql_file(path)?);
    }
    Ok(scripts.join(";\n"))
}

/// Write the translation, creating parent directories as needed.
pub fn write_sql_file<P: AsRef<Path>>(path: P, content: &str) -> TransformationResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| with_path(parent, e))?;
    }
    fs::write(path, content).map_err(|e| with_path(path, e))
}

pub fn is_sql_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"))
}

fn with_path(path: &Path, e: io::Error) -> TransformationError {
    TransformationError::IoError(io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}
