//! JSON problem files
//!
//! One problem per `.json` file.

use super::{GeometryProblem, LoadError, LoadResult};
use std::fs;
use std::path::Path;

/// Parse a problem from JSON text
pub fn parse_problem(contents: &str) -> LoadResult<GeometryProblem> {
    Ok(serde_json::from_str(contents)?)
}

/// Load a single problem from a JSON file
pub fn load_problem<P: AsRef<Path>>(path: P) -> LoadResult<GeometryProblem> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    parse_problem(&contents)
}

/// Load every problem in a directory, sorted by file name
///
/// Files that fail to parse are skipped with a warning.
pub fn load_problems<P: AsRef<Path>>(dir: P) -> LoadResult<Vec<GeometryProblem>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(LoadError::FileNotFound(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| LoadError::FileNotFound(format!("{}: {}", dir.display(), e)))?
    {
        let entry = entry.map_err(|e| LoadError::FileNotFound(e.to_string()))?;
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut problems = Vec::new();
    for path in paths {
        match load_problem(&path) {
            Ok(problem) => problems.push(problem),
            Err(e) => log::warn!("failed to load {}: {}", path.display(), e),
        }
    }

    Ok(problems)
}
