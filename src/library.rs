//! Built-in example automata, embedded at compile time.

use crate::analyzer::diagnose;
use crate::loader::DescriptorLoader;
use crate::types::{AutomatonError, Descriptor};
use crate::Automaton;
use log::warn;
use std::sync::RwLock;

// Default embedded examples
const EXAMPLE_TEXTS: [&str; 7] = [
    include_str!("../automata/even-as.json"),
    include_str!("../automata/ends-with-ab.json"),
    include_str!("../automata/divisible-by-three.json"),
    include_str!("../automata/contains-aa.json"),
    include_str!("../automata/no-double-b.json"),
    include_str!("../automata/same-ends.json"),
    include_str!("../automata/incomplete.json"),
];

lazy_static::lazy_static! {
    pub static ref EXAMPLES: RwLock<Vec<Descriptor>> = RwLock::new(Vec::new());
}

pub struct ExampleLibrary;

impl ExampleLibrary {
    /// Parses the embedded examples into [`EXAMPLES`], once.
    pub fn load() -> Result<(), AutomatonError> {
        if EXAMPLES.read().is_ok_and(|examples| !examples.is_empty()) {
            return Ok(());
        }

        let mut examples = Vec::new();

        for (index, text) in EXAMPLE_TEXTS.iter().enumerate() {
            match DescriptorLoader::load_descriptor_from_string(text) {
                Ok(descriptor) => examples.push(descriptor),
                Err(e) => warn!("Failed to parse example {}: {}", index, e),
            }
        }

        let mut write_guard = EXAMPLES
            .write()
            .map_err(|_| AutomatonError::FileError("Failed to acquire write lock".to_string()))?;
        *write_guard = examples;

        Ok(())
    }

    /// Get the number of available examples
    pub fn count() -> usize {
        let _ = Self::load();

        EXAMPLES.read().map(|examples| examples.len()).unwrap_or(0)
    }

    /// Get an example descriptor by its index
    pub fn get_by_index(index: usize) -> Result<Descriptor, AutomatonError> {
        let _ = Self::load();

        EXAMPLES
            .read()
            .map_err(|_| AutomatonError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| AutomatonError::NotFound(format!("Example index {} out of range", index)))
    }

    /// Builds the automaton for an example.
    pub fn automaton(index: usize) -> Result<Automaton, AutomatonError> {
        Self::get_by_index(index).map(Automaton::new)
    }

    /// Language labels of all examples, in index order.
    pub fn list_languages() -> Vec<String> {
        let _ = Self::load();

        EXAMPLES
            .read()
            .map(|examples| {
                examples
                    .iter()
                    .map(|example| example.language.clone().unwrap_or_default())
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }

    /// Summary of an example, for listings.
    pub fn info(index: usize) -> Result<ExampleInfo, AutomatonError> {
        let descriptor = Self::get_by_index(index)?;

        Ok(ExampleInfo {
            index,
            language: descriptor.language.clone().unwrap_or_default(),
            state_count: descriptor.states.as_ref().map_or(0, |states| states.len()),
            transition_count: descriptor
                .transitions
                .iter()
                .flatten()
                .map(|(_, row)| row.len())
                .sum(),
            valid: diagnose(&descriptor).is_empty(),
        })
    }

    /// Indices of the examples whose language label contains `query`.
    pub fn search(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        Self::list_languages()
            .iter()
            .enumerate()
            .filter(|(_, language)| language.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original JSON text of an example by its index
    pub fn get_text_by_index(index: usize) -> Result<&'static str, AutomatonError> {
        EXAMPLE_TEXTS.get(index).copied().ok_or_else(|| {
            AutomatonError::NotFound(format!("Example text index {} out of range", index))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ExampleInfo {
    pub index: usize,
    pub language: String,
    pub state_count: usize,
    pub transition_count: usize,
    pub valid: bool,
}
