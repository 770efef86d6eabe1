//! This module defines the `Automaton` struct, which simulates a deterministic finite
//! automaton one symbol at a time. It owns the descriptor, the arrow layout computed
//! at construction, and the execution state, and it can draw itself onto any
//! [`Surface`].

use crate::analyzer::diagnose;
use crate::arrow::{Arrow, ArrowKind};
use crate::geometry::Point;
use crate::surface::{Stroke, Surface, Text};
use crate::types::{
    as_symbol, AnalysisError, ArrowId, ArrowKey, AutomatonError, Descriptor, Halt, Step, Theme, Verdict,
    ACCEPT_RING_INSET, LABEL_FONT, START_ARROW_LENGTH, STATE_RADIUS, VERTICAL_BIAS,
};
use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

/// Angular offset of curved and looped arrow endpoints from the direct line.
const ENDPOINT_ANGLE_OFFSET: f64 = PI / 10.0;
const STATE_LINE_WIDTH: f64 = 4.0;
const RING_LINE_WIDTH: f64 = 3.0;
/// Moves state names down so they sit in the middle of the circle.
const STATE_NAME_SHIFT: f64 = 7.0;

/// A deterministic finite automaton together with its diagram layout and the
/// state of the current run.
///
/// The descriptor is validated once at construction; the result is exposed by
/// [`Automaton::is_valid`]. An invalid automaton can still be constructed and
/// drawn, but callers should not step it.
#[derive(Debug, Clone)]
pub struct Automaton {
    descriptor: Descriptor,
    valid: bool,
    diagnostics: Vec<AnalysisError>,

    /// `(to, from)` for every transition `from -> to`.
    neighbors: HashSet<(String, String)>,
    arrows: Vec<Arrow>,
    arrow_index: IndexMap<ArrowKey, ArrowId>,

    input: Vec<char>,
    input_index: Option<usize>,
    current_state: String,
    accepts: Verdict,
    last_arrow_used: Option<ArrowId>,
}

impl Automaton {
    /// Creates a new `Automaton` from a [`Descriptor`].
    ///
    /// Computes the neighbor relation and the arrow layout, then validates the
    /// descriptor. The run starts in the start state with no input entered.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - The automaton to simulate. It does not have to be valid.
    pub fn new(descriptor: Descriptor) -> Self {
        let current_state = descriptor.start_state.clone().unwrap_or_default();

        let mut automaton = Self {
            descriptor,
            valid: false,
            diagnostics: Vec::new(),
            neighbors: HashSet::new(),
            arrows: Vec::new(),
            arrow_index: IndexMap::new(),
            input: Vec::new(),
            input_index: None,
            current_state,
            accepts: Verdict::StillProcessing,
            last_arrow_used: None,
        };

        automaton.find_neighbors();
        automaton.create_arrows();

        automaton.diagnostics = diagnose(&automaton.descriptor);
        automaton.valid = automaton.diagnostics.is_empty();

        if automaton.valid {
            debug!(
                "Built automaton with {} states and {} arrows",
                automaton.descriptor.states.as_ref().map_or(0, |s| s.len()),
                automaton.arrows.len()
            );
        } else {
            warn!("Invalid automaton: {:?}", automaton.diagnostics);
        }

        automaton
    }

    fn find_neighbors(&mut self) {
        self.neighbors = self
            .descriptor
            .transitions
            .iter()
            .flatten()
            .flat_map(|(from, row)| row.values().map(move |to| (to.clone(), from.clone())))
            .collect();
    }

    /// Returns `true` if there is a transition from `from` to `to`.
    fn has_transition(&self, from: &str, to: &str) -> bool {
        self.neighbors.contains(&(to.to_string(), from.to_string()))
    }

    fn create_arrows(&mut self) {
        if let Some(start) = self
            .descriptor
            .start_state
            .as_deref()
            .and_then(|name| self.descriptor.position(name))
        {
            let arrow = Arrow::straight(
                Point::new(start.x - START_ARROW_LENGTH, start.y),
                Point::new(start.x - STATE_RADIUS, start.y),
                "",
            );
            self.insert_arrow(ArrowKey::Start, arrow);
        }

        let Some(transitions) = self.descriptor.transitions.clone() else {
            return;
        };

        for (from, row) in &transitions {
            // Arrows already leaving `from`, by destination.
            let mut existing: HashMap<&str, ArrowId> = HashMap::new();

            for (text, to) in row {
                let Some(symbol) = as_symbol(text) else {
                    warn!("Skipping transition {} on '{}': not a single symbol", from, text);
                    continue;
                };
                let key = ArrowKey::transition(from.as_str(), symbol);

                if let Some(&id) = existing.get(to.as_str()) {
                    self.arrows[id.0].push_symbol(symbol);
                    self.arrow_index.insert(key, id);
                    continue;
                }

                let Some(arrow) = self.layout_arrow(from, to, symbol) else {
                    warn!("Cannot lay out arrow {} -> {}: missing position", from, to);
                    continue;
                };

                let id = self.insert_arrow(key, arrow);
                existing.insert(to.as_str(), id);
            }
        }
    }

    fn insert_arrow(&mut self, key: ArrowKey, arrow: Arrow) -> ArrowId {
        let id = ArrowId(self.arrows.len());
        self.arrows.push(arrow);
        self.arrow_index.insert(key, id);
        id
    }

    /// Picks the arrow variant for `from -> to` and moves its endpoints onto the
    /// state boundaries.
    fn layout_arrow(&self, from: &str, to: &str, symbol: char) -> Option<Arrow> {
        let source = self.descriptor.position(from)?;
        let target = self.descriptor.position(to)?;
        let label = symbol.to_string();

        if from == to {
            // Both ends sit on the top of the circle, either side of the apex.
            let start = source.polar(-STATE_RADIUS, PI / 2.0 - ENDPOINT_ANGLE_OFFSET);
            let end = target.polar(-STATE_RADIUS, PI / 2.0 + ENDPOINT_ANGLE_OFFSET);
            return Some(Arrow::new(ArrowKind::Looped, start, end, label));
        }

        let angle = source.angle_from(target);

        if self.has_transition(to, from) {
            let start = source.polar(-STATE_RADIUS, angle + ENDPOINT_ANGLE_OFFSET);
            let end = target.polar(-STATE_RADIUS, angle + PI - ENDPOINT_ANGLE_OFFSET);
            return Some(Arrow::new(ArrowKind::Curved, start, end, label));
        }

        let start = source.polar(-STATE_RADIUS, angle);
        let end = target.polar(STATE_RADIUS, angle);
        Some(Arrow::new(ArrowKind::Straight, start, end, label))
    }

    /// Enters a new input string and resets the run.
    ///
    /// # Arguments
    ///
    /// * `input` - The string to process, one character per symbol.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if every character is in the alphabet. The run restarts from
    ///   the start state with the cursor at 0.
    /// * `Err(AutomatonError::SymbolNotInAlphabet)` otherwise. Nothing changes.
    pub fn enter_string(&mut self, input: &str) -> Result<(), AutomatonError> {
        if let Some(symbol) = input.chars().find(|&c| !self.descriptor.has_symbol(c)) {
            return Err(AutomatonError::SymbolNotInAlphabet(symbol));
        }

        self.input = input.chars().collect();
        self.input_index = Some(0);
        self.current_state = self.start_state().to_string();
        self.accepts = Verdict::StillProcessing;
        self.last_arrow_used = None;

        Ok(())
    }

    /// Restarts the run on the current input string.
    pub fn reset(&mut self) {
        self.input_index = Some(0);
        self.current_state = self.start_state().to_string();
        self.accepts = Verdict::StillProcessing;
        self.last_arrow_used = None;
    }

    /// Processes one symbol of the input string.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if more input remains.
    /// * `Step::Halt(Halt::Accept | Halt::Reject)` once the whole input has been
    ///   consumed. Further calls return the same verdict without changing anything.
    /// * `Step::Halt(Halt::Err(_))` if the current state has no transition on the
    ///   next symbol. This only happens on invalid automata; nothing changes.
    ///
    /// Before any string has been entered there is nothing to process: the
    /// result is `Step::Continue` and nothing changes.
    pub fn step(&mut self) -> Step {
        let Some(index) = self.input_index else {
            return Step::Continue;
        };

        if index == self.input.len() && !self.input.is_empty() {
            return self.verdict_step();
        }

        if let Some(&symbol) = self.input.get(index) {
            let Some(next) = self.descriptor.destination(&self.current_state, symbol) else {
                return Step::Halt(Halt::Err(AutomatonError::UndefinedTransition {
                    state: self.current_state.clone(),
                    symbol,
                }));
            };
            let next = next.to_string();

            debug!("{} --{}--> {}", self.current_state, symbol, next);

            let key = ArrowKey::transition(self.current_state.as_str(), symbol);
            self.last_arrow_used = self.arrow_index.get(&key).copied();
            self.current_state = next;
            self.input_index = Some(index + 1);
        }

        if self.input_index == Some(self.input.len()) {
            self.accepts = if self.descriptor.is_accepting(&self.current_state) {
                Verdict::Accepted
            } else {
                Verdict::Rejected
            };
            debug!("Finished in {}: accepts {}", self.current_state, self.accepts);
            return self.verdict_step();
        }

        Step::Continue
    }

    fn verdict_step(&self) -> Step {
        match self.accepts {
            Verdict::Accepted => Step::Halt(Halt::Accept),
            _ => Step::Halt(Halt::Reject),
        }
    }

    /// Steps until the input is consumed or the run fails.
    ///
    /// Returns `Step::Continue` without stepping if no string has been entered.
    pub fn run(&mut self) -> Step {
        if self.input_index.is_none() {
            return Step::Continue;
        }

        loop {
            match self.step() {
                Step::Continue => continue,
                halt => return halt,
            }
        }
    }

    /// Draws the current frame, then steps through the rest of the input and
    /// draws again after every step.
    ///
    /// # Arguments
    ///
    /// * `new_surface` - Creates the surface each frame is drawn on.
    /// * `theme` - Colours used for every frame.
    ///
    /// # Returns
    ///
    /// * `Ok(frames)` with one frame for the current position and one per step.
    ///   Only the current frame is drawn if no string has been entered or the
    ///   run is already finished.
    /// * `Err(AutomatonError::UndefinedTransition)` if a step fails.
    pub fn animate<S, F>(
        &mut self,
        mut new_surface: F,
        theme: &Theme,
    ) -> Result<Vec<S>, AutomatonError>
    where
        S: Surface,
        F: FnMut() -> S,
    {
        let mut frame = new_surface();
        self.draw_with(&mut frame, theme);
        let mut frames = vec![frame];

        if self.input_index.is_none() || self.accepts != Verdict::StillProcessing {
            return Ok(frames);
        }

        loop {
            let step = self.step();
            if let Step::Halt(Halt::Err(e)) = step {
                return Err(e);
            }

            let mut frame = new_surface();
            self.draw_with(&mut frame, theme);
            frames.push(frame);

            if !step.is_running() {
                debug!("Animated {} frames", frames.len());
                return Ok(frames);
            }
        }
    }

    /// Draws the automaton with the default [`Theme`].
    pub fn draw(&self, surface: &mut dyn Surface) {
        self.draw_with(surface, &Theme::default());
    }

    /// Draws the background, every state and every arrow, centred on the surface.
    ///
    /// The current state and the last traversed arrow use the theme's highlight colour.
    ///
    /// # Arguments
    ///
    /// * `surface` - The surface to draw on. Its size determines the centring.
    /// * `theme` - Colours for the background, states, arrows and highlight.
    pub fn draw_with(&self, surface: &mut dyn Surface, theme: &Theme) {
        let (width, height) = (surface.width(), surface.height());
        let offset = self.centering_offset(width, height);

        surface.fill_rect(Point::default(), width, height, &theme.background);

        for (name, position) in self.descriptor.states.iter().flatten() {
            let center = position.offset(offset);
            let outline = if *name == self.current_state {
                &theme.highlight
            } else {
                &theme.foreground
            };

            surface.circle(
                center,
                STATE_RADIUS,
                Some(&theme.state_fill),
                Some(&Stroke::new(outline, STATE_LINE_WIDTH)),
            );
            surface.text(&Text {
                content: name.clone(),
                anchor: Point::new(center.x, center.y + STATE_NAME_SHIFT),
                rotation: 0.0,
                baseline_shift: 0.0,
                font: LABEL_FONT.to_string(),
                color: theme.foreground.clone(),
            });

            if self.descriptor.is_accepting(name) {
                surface.circle(
                    center,
                    STATE_RADIUS - ACCEPT_RING_INSET,
                    None,
                    Some(&Stroke::new(outline, RING_LINE_WIDTH)),
                );
            }
        }

        for (i, arrow) in self.arrows.iter().enumerate() {
            let color = if self.last_arrow_used == Some(ArrowId(i)) {
                &theme.highlight
            } else {
                &theme.foreground
            };
            arrow.render(surface, color, offset);
        }
    }

    /// Translation that maps the average state position to the centre of a
    /// `width` × `height` surface, shifted down by [`VERTICAL_BIAS`].
    ///
    /// # Arguments
    ///
    /// * `width` - Width of the target surface.
    /// * `height` - Height of the target surface.
    pub fn centering_offset(&self, width: f64, height: f64) -> Point {
        let positions: Vec<Point> = self
            .descriptor
            .states
            .iter()
            .flat_map(|states| states.values().copied())
            .collect();

        let average = if positions.is_empty() {
            Point::default()
        } else {
            let count = positions.len() as f64;
            let sum = positions
                .iter()
                .fold(Point::default(), |sum, p| sum.offset(*p));
            Point::new(sum.x / count, sum.y / count)
        };

        Point::new(
            width / 2.0 - average.x,
            height / 2.0 - average.y + VERTICAL_BIAS,
        )
    }

    /// Returns `true` if the descriptor passed validation.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Every validation problem found at construction.
    pub fn diagnostics(&self) -> &[AnalysisError] {
        &self.diagnostics
    }

    /// Returns the descriptor this automaton was built from.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Returns the display label of the recognised language, if any.
    pub fn language(&self) -> Option<&str> {
        self.descriptor.language.as_deref()
    }

    /// Returns the start state, or `""` if the descriptor has none.
    pub fn start_state(&self) -> &str {
        self.descriptor.start_state.as_deref().unwrap_or_default()
    }

    /// Returns the current state of the run.
    pub fn current_state(&self) -> &str {
        &self.current_state
    }

    /// Returns the verdict of the run: still processing until the input is consumed.
    pub fn accepts(&self) -> Verdict {
        self.accepts
    }

    /// Returns the input string being processed.
    pub fn input_string(&self) -> String {
        self.input.iter().collect()
    }

    /// Number of symbols consumed so far, or `None` before any string was entered.
    pub fn input_index(&self) -> Option<usize> {
        self.input_index
    }

    /// Splits the input around the symbol consumed last: everything before it,
    /// the symbol itself, and everything after it.
    ///
    /// Before the first step the whole input is returned as the first part.
    pub fn input_window(&self) -> (String, String, String) {
        match self.input_index {
            Some(index) if index > 0 => (
                self.input[..index - 1].iter().collect(),
                self.input[index - 1..index].iter().collect(),
                self.input[index..].iter().collect(),
            ),
            _ => (self.input_string(), String::new(), String::new()),
        }
    }

    /// Returns the arrow traversed by the most recent step, if any.
    pub fn last_arrow_used(&self) -> Option<&Arrow> {
        self.last_arrow_used.map(|id| &self.arrows[id.0])
    }

    /// Returns the id of the arrow traversed by the most recent step, if any.
    pub fn last_arrow_id(&self) -> Option<ArrowId> {
        self.last_arrow_used
    }

    /// Returns the distinct arrows in layout order.
    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    /// Looks up the arrow drawn for a transition or for the start pointer.
    ///
    /// # Arguments
    ///
    /// * `key` - [`ArrowKey::Start`] or the source state and symbol of a transition.
    pub fn arrow(&self, key: &ArrowKey) -> Option<&Arrow> {
        self.arrow_id(key).map(|id| &self.arrows[id.0])
    }

    /// Returns the id of the arrow drawn for `key`. Merged transitions share an id.
    ///
    /// # Arguments
    ///
    /// * `key` - [`ArrowKey::Start`] or the source state and symbol of a transition.
    pub fn arrow_id(&self, key: &ArrowKey) -> Option<ArrowId> {
        self.arrow_index.get(key).copied()
    }
}
