//! This crate provides the core logic for a deterministic finite automaton animator.
//! It includes modules for validating automaton descriptors, laying out transition
//! arrows, stepping through an input string, and drawing the diagram onto an
//! abstract 2D surface.

pub mod analyzer;
pub mod arrow;
pub mod automaton;
pub mod geometry;
pub mod library;
pub mod loader;
pub mod surface;
pub mod svg;
pub mod types;

/// Re-exports the `analyze` and `diagnose` functions from the analyzer module.
pub use analyzer::{analyze, diagnose};
/// Re-exports the arrow primitive and its variants.
pub use arrow::{Arrow, ArrowKind};
/// Re-exports the `Automaton` struct from the automaton module.
pub use automaton::Automaton;
pub use geometry::normalize_angle;
/// Re-exports `ExampleLibrary` and `ExampleInfo` from the library module.
pub use library::{ExampleInfo, ExampleLibrary};
/// Re-exports the `DescriptorLoader` struct from the loader module.
pub use loader::DescriptorLoader;
/// Re-exports the drawing surface contract and the command recorder.
pub use surface::{DrawCommand, Path, PathSegment, Recorder, Stroke, Surface, Text};
pub use svg::SvgSurface;
/// Re-exports the descriptor, outcome and error types from the types module.
pub use types::{
    AnalysisError, ArrowId, ArrowKey, AutomatonError, Descriptor, Halt, Point, Step, Theme,
    Verdict, MAX_DESCRIPTOR_SIZE,
};
