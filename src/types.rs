//! This module defines the core data structures and types used throughout the DFA
//! animator, including the automaton descriptor, execution outcomes, rendering theme
//! and error types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use crate::geometry::Point;

/// Radius of a state circle. Arrows stop on this boundary.
pub const STATE_RADIUS: f64 = 30.0;
/// Distance between the outer circle and the inner ring of an accepting state.
pub const ACCEPT_RING_INSET: f64 = 7.0;
/// Distance from the start state's centre at which the start pointer begins.
pub const START_ARROW_LENGTH: f64 = 100.0;
/// Downward shift applied when centring the diagram on the surface.
pub const VERTICAL_BIAS: f64 = 50.0;
/// Font used for state names and transition labels.
pub const LABEL_FONT: &str = "24px Arial";
/// Default canvas size used when no surface size is given.
pub const DEFAULT_CANVAS_WIDTH: f64 = 960.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 720.0;
/// The maximum allowed size for a descriptor document in bytes.
pub const MAX_DESCRIPTOR_SIZE: usize = 65536; // 64KB

/// Transition table: source state -> symbol -> destination state.
///
/// Symbols are kept as strings so that a multi-character entry still loads and
/// is reported by validation.
pub type TransitionTable = IndexMap<String, IndexMap<String, String>>;

/// Returns the symbol spelled by `text` if it is exactly one character.
pub fn as_symbol(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Some(symbol),
        _ => None,
    }
}

/// Structural description of a DFA as found in descriptor files.
///
/// Every field of the 5-tuple is optional so that a missing field can be
/// reported by validation instead of failing deserialisation. Maps keep their
/// document order, which determines label merge order and draw order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// State names and their fixed positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<IndexMap<String, Point>>,
    /// Input symbols. Each entry must be a single character to be valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alphabet: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<TransitionTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accepting_states: Option<Vec<String>>,
    /// Display label describing the recognised language. Not used by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Descriptor {
    /// Returns `true` if `name` is a declared state.
    pub fn has_state(&self, name: &str) -> bool {
        self.states
            .as_ref()
            .is_some_and(|states| states.contains_key(name))
    }

    /// Returns `true` if `symbol` belongs to the alphabet.
    pub fn has_symbol(&self, symbol: char) -> bool {
        self.alphabet
            .as_ref()
            .is_some_and(|alphabet| alphabet.iter().any(|s| as_symbol(s) == Some(symbol)))
    }

    /// Returns `true` if `name` is an accepting state.
    pub fn is_accepting(&self, name: &str) -> bool {
        self.accepting_states
            .as_ref()
            .is_some_and(|accepting| accepting.iter().any(|s| s == name))
    }

    /// Position of a declared state.
    pub fn position(&self, name: &str) -> Option<Point> {
        self.states.as_ref()?.get(name).copied()
    }

    /// Destination of the transition from `state` on `symbol`.
    pub fn destination(&self, state: &str, symbol: char) -> Option<&str> {
        let mut buffer = [0; 4];
        self.transitions
            .as_ref()?
            .get(state)?
            .get(&*symbol.encode_utf8(&mut buffer))
            .map(String::as_str)
    }
}

/// The acceptance verdict of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The input has not been fully consumed yet.
    #[default]
    #[serde(rename = "still processing")]
    StillProcessing,
    #[serde(rename = "true")]
    Accepted,
    #[serde(rename = "false")]
    Rejected,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Verdict::StillProcessing => "still processing",
            Verdict::Accepted => "true",
            Verdict::Rejected => "false",
        };
        f.write_str(text)
    }
}

/// Represents the outcome of a single simulation step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A symbol was consumed and more input remains.
    Continue,
    /// The whole input has been consumed, or the run cannot proceed.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Input consumed, finished in an accepting state.
    Accept,
    /// Input consumed, finished in a non-accepting state.
    Reject,

    Err(AutomatonError),
}

impl Step {
    /// `true` while the input is still being processed.
    pub fn is_running(&self) -> bool {
        matches!(self, Step::Continue)
    }
}

/// Identifies an arrow in the engine's arrow collection.
///
/// The composite key avoids ambiguity when state names contain separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    /// The pointer into the start state.
    Start,
    /// The transition leaving `from` on `symbol`.
    Transition { from: String, symbol: char },
}

impl ArrowKey {
    pub fn transition(from: impl Into<String>, symbol: char) -> Self {
        ArrowKey::Transition {
            from: from.into(),
            symbol,
        }
    }
}

/// Index of an arrow inside an automaton. Merged transitions share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrowId(pub(crate) usize);

/// Colours used when drawing an automaton. Values are CSS colour strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub background: String,
    pub state_fill: String,
    /// Outline, text and arrow colour.
    pub foreground: String,
    /// Colour of the current state and the last traversed arrow.
    pub highlight: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            state_fill: "darkgray".to_string(),
            foreground: "black".to_string(),
            highlight: "deepskyblue".to_string(),
        }
    }
}

/// Structural problems found while validating a [`Descriptor`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// One of the five required descriptor fields is absent.
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    /// An alphabet entry is empty or longer than one character.
    #[error("Alphabet entry '{0}' is not a single character")]
    InvalidSymbol(String),
    #[error("Start state '{0}' is not a declared state")]
    UnknownStartState(String),
    #[error("Accepting state '{0}' is not a declared state")]
    UnknownAcceptingState(String),
    /// A transition uses a symbol outside the alphabet.
    #[error("State '{state}' has a transition on '{symbol}', which is not in the alphabet")]
    ForeignSymbol { state: String, symbol: String },
    /// A state does not transition on every alphabet symbol.
    #[error("State '{state}' has no transition for {missing:?}")]
    IncompleteTransitions { state: String, missing: Vec<String> },
    /// A transition starts or ends in a state that is not declared.
    #[error("Transition references undeclared state '{0}'")]
    UndeclaredState(String),
    /// Declared states that never appear as a transition source.
    #[error("States without transitions: {0:?}")]
    StatesWithoutTransitions(Vec<String>),
}

/// Represents the errors that can occur while loading or simulating an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomatonError {
    /// The descriptor failed validation.
    #[error("Invalid automaton: {0}")]
    Invalid(#[from] AnalysisError),
    /// The input string contains a symbol outside the alphabet.
    #[error("Symbol '{0}' is not in the alphabet")]
    SymbolNotInAlphabet(char),
    /// There is no transition for the current state and symbol.
    #[error("No transition defined for state {state} and symbol '{symbol}'")]
    UndefinedTransition { state: String, symbol: char },
    #[error("Descriptor parsing error: {0}")]
    ParseError(String),
    #[error("File error: {0}")]
    FileError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for AutomatonError {
    fn from(error: serde_json::Error) -> Self {
        AutomatonError::ParseError(error.to_string())
    }
}
