//! Input discovery and JSON loading.
//!
//! Each input path is used as a file, as a directory of `*.json` files, or as
//! a glob prefix (`<path>*.json`), in that order of preference.

use serde_json::Value;
use std::path::{Path, PathBuf};

/// A JSON document and the file it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub json: Value,
}

/// Expand the input paths into the list of JSON files to read.
pub fn discover(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let dir = glob::Pattern::escape(&input.to_string_lossy());
            let pattern = Path::new(&dir).join("*.json");
            files.extend(glob_files(&pattern.to_string_lossy())?);
        } else {
            let pattern = format!("{}*.json", input.display());
            files.extend(glob_files(&pattern)?);
        }
    }

    if files.is_empty() {
        return Err(InputError::NoFiles {
            searched: inputs.to_vec(),
        });
    }
    Ok(files)
}

fn glob_files(pattern: &str) -> Result<Vec<PathBuf>, InputError> {
    let paths = glob::glob(pattern).map_err(|e| InputError::Pattern {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable glob match");
                continue;
            }
        };
        if path.is_file() {
            files.push(std::fs::canonicalize(&path).unwrap_or(path));
        }
    }
    Ok(files)
}

/// Read and parse every file. Any failure aborts the whole load.
pub fn load(files: &[PathBuf]) -> Result<Vec<LoadedDocument>, InputError> {
    let mut documents = Vec::with_capacity(files.len());
    for path in files {
        documents.push(load_file(path)?);
    }
    Ok(documents)
}

fn load_file(path: &Path) -> Result<LoadedDocument, InputError> {
    tracing::debug!(path = %path.display(), "reading file");
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json = serde_json::from_str(&contents).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedDocument {
        path: path.to_path_buf(),
        json,
    })
}

/// Discover and load in one step, failing when nothing was loaded.
pub fn load_inputs(inputs: &[PathBuf]) -> Result<Vec<LoadedDocument>, InputError> {
    let files = discover(inputs)?;
    let documents = load(&files)?;
    if documents.is_empty() {
        return Err(InputError::NoFiles {
            searched: inputs.to_vec(),
        });
    }
    Ok(documents)
}

/// Errors from finding or reading input files.
#[derive(Debug)]
pub enum InputError {
    /// No JSON files were found under any input path.
    NoFiles { searched: Vec<PathBuf> },
    /// An input path produced an invalid glob pattern.
    Pattern { pattern: String, detail: String },
    /// A discovered file could not be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A discovered file is not valid JSON.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::NoFiles { searched } => {
                let list = searched
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "no files were found in {list}")
            }
            InputError::Pattern { pattern, detail } => {
                write!(f, "invalid input pattern '{pattern}': {detail}")
            }
            InputError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            InputError::Parse { path, source } => {
                write!(f, "failed to parse JSON in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::Read { source, .. } => Some(source),
            InputError::Parse { source, .. } => Some(source),
            InputError::NoFiles { .. } | InputError::Pattern { .. } => None,
        }
    }
}
