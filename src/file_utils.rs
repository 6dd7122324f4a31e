use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::GapError;

// @module: File and directory utilities

/// One file to process, or a path the directory scan could not read
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedInput {
    pub path: PathBuf,
    pub error: Option<GapError>,
}

impl ExpandedInput {
    pub fn file(path: PathBuf) -> Self {
        Self { path, error: None }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), GapError> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| {
                GapError::IoFailure(format!("failed to create directory {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }

    // @generates: Output path "<output_dir>/<stem>_<suffix>.<extension>"
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
        extension: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let output_dir = output_dir.as_ref();

        // Get the file stem (filename without extension)
        let stem = input_file.file_stem().unwrap_or_default();

        let output_filename = format!("{}_{}.{}", stem.to_string_lossy(), suffix, extension);

        output_dir.join(output_filename)
    }

    /// Find files with a specific extension in a directory, sorted by path
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>, GapError> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.map_err(|e| {
                GapError::IoFailure(format!("failed to read directory entry: {}", e))
            })?;
            let path = entry.path();

            if path.is_file() && Self::has_extension(path, &[extension]) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Expand a mix of files and directories into a list of files.
    /// Directories contribute every file with one of `extensions`, sorted by
    /// path; plain paths are passed through untouched so the loader can report
    /// on them. A directory entry that cannot be read is kept with its error
    /// instead of stopping the expansion.
    pub fn expand_inputs(inputs: &[PathBuf], extensions: &[&str]) -> Vec<ExpandedInput> {
        let mut files = Vec::new();

        for input in inputs {
            if Self::dir_exists(input) {
                files.extend(Self::scan_dir(input, extensions));
            } else {
                files.push(ExpandedInput::file(input.clone()));
            }
        }

        files
    }

    // @returns: Matching files and unreadable entries below `dir`, sorted by path
    fn scan_dir(dir: &Path, extensions: &[&str]) -> Vec<ExpandedInput> {
        let mut found = Vec::new();

        for entry in WalkDir::new(dir).follow_links(true) {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && Self::has_extension(path, extensions) {
                        found.push(ExpandedInput::file(path.to_path_buf()));
                    }
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    let error = GapError::IoFailure(format!(
                        "failed to read directory entry {}: {}", path.display(), e
                    ));
                    found.push(ExpandedInput { path, error: Some(error) });
                }
            }
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }

    fn has_extension(path: &Path, extensions: &[&str]) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|wanted| ext.eq_ignore_ascii_case(wanted.trim_start_matches('.')))
            })
    }

    /// Write a string to a file as UTF-8
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), GapError> {
        let path = path.as_ref();

        // Ensure the parent directory exists
        if let Some(parent) = path.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(path, content).map_err(|e| {
            GapError::IoFailure(format!("failed to write to file {}: {}", path.display(), e))
        })
    }
}
