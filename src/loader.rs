//! This module provides the `DescriptorLoader` struct, responsible for loading automaton
//! descriptors from JSON files and strings.

use crate::types::{AutomatonError, Descriptor, MAX_DESCRIPTOR_SIZE};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// `DescriptorLoader` is a utility struct for loading automaton descriptors.
/// It provides methods to load descriptors from individual files, from string content,
/// and to discover and load all `.json` files within a specified directory.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Loads a single descriptor from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the `.json` file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Descriptor)` if the file is successfully read and parsed.
    /// * `Err(AutomatonError::FileError)` if the file cannot be read.
    /// * `Err(AutomatonError::ParseError)` if the file content is not a valid descriptor document.
    pub fn load_descriptor(path: &Path) -> Result<Descriptor, AutomatonError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutomatonError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("Loading descriptor from {}", path.display());
        Self::load_descriptor_from_string(&content)
    }

    /// Loads a single descriptor from JSON content, e.g. piped input.
    ///
    /// Only the document shape is checked here; the automaton itself is
    /// validated when it is constructed.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the JSON descriptor.
    ///
    /// # Returns
    ///
    /// * `Ok(Descriptor)` if the content is a descriptor document.
    /// * `Err(AutomatonError::ParseError)` if it is too large or not a descriptor document.
    pub fn load_descriptor_from_string(content: &str) -> Result<Descriptor, AutomatonError> {
        if content.len() > MAX_DESCRIPTOR_SIZE {
            return Err(AutomatonError::ParseError(format!(
                "Descriptor is {} bytes, the limit is {}",
                content.len(),
                MAX_DESCRIPTOR_SIZE
            )));
        }

        Ok(serde_json::from_str(content)?)
    }

    /// Loads every descriptor file (`.json` extension) from a given directory.
    ///
    /// Directories and other files are skipped. Each loaded file yields its own
    /// result so one broken file does not hide the others.
    ///
    /// # Arguments
    ///
    /// * `directory` - A reference to the `Path` of the directory to scan.
    ///
    /// # Returns
    ///
    /// * One result per `.json` file, successes first and sorted by path.
    pub fn load_descriptors(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, Descriptor), AutomatonError>> {
        if !directory.exists() {
            return vec![Err(AutomatonError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(AutomatonError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(AutomatonError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "json") {
                    return None;
                }

                match Self::load_descriptor(&path) {
                    Ok(descriptor) => Some(Ok((path, descriptor))),
                    Err(e) => Some(Err(AutomatonError::FileError(format!(
                        "Failed to load descriptor from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}
