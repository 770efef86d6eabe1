//! This module validates automaton descriptors before simulation. The checks cover
//! the presence of every descriptor field, membership of the start and accepting
//! states, and totality of the transition table over states × alphabet.

use crate::types::{as_symbol, AnalysisError, AutomatonError, Descriptor};

type Check = fn(&Descriptor) -> Result<(), AnalysisError>;

const CHECKS: [Check; 6] = [
    check_fields,
    check_alphabet,
    check_start_state,
    check_accepting_states,
    check_transitions,
    check_states_have_transitions,
];

/// Analyzes a [`Descriptor`] and returns the first problem found.
///
/// # Returns
///
/// * `Ok(())` if the descriptor describes a valid DFA.
/// * `Err(AutomatonError::Invalid)` if any validation rule is violated.
pub fn analyze(descriptor: &Descriptor) -> Result<(), AutomatonError> {
    match diagnose(descriptor).into_iter().next() {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Runs every check and collects all problems, in check order.
///
/// When a required field is missing the remaining checks are skipped, since
/// they would only report consequences of the missing field.
pub fn diagnose(descriptor: &Descriptor) -> Vec<AnalysisError> {
    if let Err(error) = check_fields(descriptor) {
        return vec![error];
    }

    CHECKS
        .iter()
        .filter_map(|check| check(descriptor).err())
        .collect()
}

/// Checks that all five parts of the 5-tuple were given.
fn check_fields(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    if descriptor.states.is_none() {
        return Err(AnalysisError::MissingField("states"));
    }
    if descriptor.alphabet.is_none() {
        return Err(AnalysisError::MissingField("alphabet"));
    }
    if descriptor.transitions.is_none() {
        return Err(AnalysisError::MissingField("transitions"));
    }
    if descriptor
        .start_state
        .as_deref()
        .is_none_or(|start| start.is_empty())
    {
        return Err(AnalysisError::MissingField("startState"));
    }
    if descriptor.accepting_states.is_none() {
        return Err(AnalysisError::MissingField("acceptingStates"));
    }

    Ok(())
}

/// Checks that every alphabet entry is a single character.
fn check_alphabet(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    descriptor
        .alphabet
        .iter()
        .flatten()
        .find(|symbol| as_symbol(symbol).is_none())
        .map_or(Ok(()), |symbol| {
            Err(AnalysisError::InvalidSymbol(symbol.clone()))
        })
}

/// Checks that the start state is a declared state.
fn check_start_state(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    match descriptor.start_state.as_deref() {
        Some(start) if !descriptor.has_state(start) => {
            Err(AnalysisError::UnknownStartState(start.to_string()))
        }
        _ => Ok(()),
    }
}

/// Checks that the accepting states are a subset of the declared states.
fn check_accepting_states(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    descriptor
        .accepting_states
        .iter()
        .flatten()
        .find(|state| !descriptor.has_state(state))
        .map_or(Ok(()), |state| {
            Err(AnalysisError::UnknownAcceptingState(state.clone()))
        })
}

/// Checks every row of the transition table.
///
/// Each row must consume exactly the alphabet: every symbol it uses must be
/// in the alphabet, and no alphabet symbol may be left over. Sources and
/// destinations must be declared states.
fn check_transitions(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    let alphabet = descriptor.alphabet.as_deref().unwrap_or_default();

    for (from, row) in descriptor.transitions.iter().flatten() {
        if !descriptor.has_state(from) {
            return Err(AnalysisError::UndeclaredState(from.clone()));
        }

        let mut remaining = alphabet.to_vec();

        for (symbol, to) in row {
            let Some(index) = remaining.iter().position(|s| s == symbol) else {
                return Err(AnalysisError::ForeignSymbol {
                    state: from.clone(),
                    symbol: symbol.clone(),
                });
            };
            remaining.remove(index);

            if !descriptor.has_state(to) {
                return Err(AnalysisError::UndeclaredState(to.clone()));
            }
        }

        if !remaining.is_empty() {
            return Err(AnalysisError::IncompleteTransitions {
                state: from.clone(),
                missing: remaining,
            });
        }
    }

    Ok(())
}

/// Checks that every declared state has at least one outgoing transition.
///
/// This differs from the completeness check above: a state that is absent
/// from the transition table (or whose row is empty) is only caught here.
fn check_states_have_transitions(descriptor: &Descriptor) -> Result<(), AnalysisError> {
    let transitions = descriptor.transitions.as_ref();

    let missing: Vec<String> = descriptor
        .states
        .iter()
        .flat_map(|states| states.keys())
        .filter(|state| {
            transitions
                .and_then(|table| table.get(*state))
                .is_none_or(|row| row.is_empty())
        })
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::StatesWithoutTransitions(missing));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, TransitionTable};
    use indexmap::IndexMap;

    fn row(entries: &[(&str, &str)]) -> IndexMap<String, String> {
        entries
            .iter()
            .map(|(symbol, to)| (symbol.to_string(), to.to_string()))
            .collect()
    }

    fn create_descriptor() -> Descriptor {
        let mut states = IndexMap::new();
        states.insert("q0".to_string(), Point::new(0.0, 0.0));
        states.insert("q1".to_string(), Point::new(100.0, 0.0));

        let mut transitions = TransitionTable::new();
        transitions.insert("q0".to_string(), row(&[("a", "q1"), ("b", "q0")]));
        transitions.insert("q1".to_string(), row(&[("a", "q1"), ("b", "q0")]));

        Descriptor {
            states: Some(states),
            alphabet: Some(vec!["a".to_string(), "b".to_string()]),
            transitions: Some(transitions),
            start_state: Some("q0".to_string()),
            accepting_states: Some(vec!["q1".to_string()]),
            language: None,
        }
    }

    #[test]
    fn test_valid_descriptor() {
        let descriptor = create_descriptor();

        assert!(analyze(&descriptor).is_ok());
        assert!(diagnose(&descriptor).is_empty());
    }

    #[test]
    fn test_missing_fields() {
        let cases: [(fn(&mut Descriptor), &'static str); 5] = [
            (|d| d.states = None, "states"),
            (|d| d.alphabet = None, "alphabet"),
            (|d| d.transitions = None, "transitions"),
            (|d| d.start_state = None, "startState"),
            (|d| d.accepting_states = None, "acceptingStates"),
        ];

        for (remove, field) in cases {
            let mut descriptor = create_descriptor();
            remove(&mut descriptor);

            assert_eq!(
                diagnose(&descriptor),
                vec![AnalysisError::MissingField(field)]
            );
            assert!(analyze(&descriptor).is_err());
        }
    }

    #[test]
    fn test_empty_start_state_counts_as_missing() {
        let mut descriptor = create_descriptor();
        descriptor.start_state = Some(String::new());

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::MissingField("startState")]
        );
    }

    #[test]
    fn test_unknown_start_state() {
        let mut descriptor = create_descriptor();
        descriptor.start_state = Some("q9".to_string());

        assert_eq!(
            analyze(&descriptor),
            Err(AutomatonError::Invalid(AnalysisError::UnknownStartState(
                "q9".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_accepting_state() {
        let mut descriptor = create_descriptor();
        descriptor.accepting_states = Some(vec!["q1".to_string(), "q7".to_string()]);

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::UnknownAcceptingState("q7".to_string())]
        );
    }

    #[test]
    fn test_foreign_symbol() {
        let mut descriptor = create_descriptor();
        if let Some(transitions) = descriptor.transitions.as_mut() {
            transitions["q1"].insert("c".to_string(), "q0".to_string());
        }

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::ForeignSymbol {
                state: "q1".to_string(),
                symbol: "c".to_string()
            }]
        );
    }

    #[test]
    fn test_incomplete_transitions() {
        let mut descriptor = create_descriptor();
        if let Some(transitions) = descriptor.transitions.as_mut() {
            transitions["q0"].shift_remove("b");
        }

        // q0 still has a transition, so only the completeness check fails.
        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::IncompleteTransitions {
                state: "q0".to_string(),
                missing: vec!["b".to_string()]
            }]
        );
    }

    #[test]
    fn test_state_absent_from_transition_table() {
        let mut descriptor = create_descriptor();
        if let Some(states) = descriptor.states.as_mut() {
            states.insert("q2".to_string(), Point::new(200.0, 0.0));
        }

        // Every row is complete, but q2 has no row at all.
        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::StatesWithoutTransitions(vec![
                "q2".to_string()
            ])]
        );
    }

    #[test]
    fn test_empty_row_with_empty_alphabet() {
        let mut states = IndexMap::new();
        states.insert("q0".to_string(), Point::new(0.0, 0.0));
        let mut transitions = TransitionTable::new();
        transitions.insert("q0".to_string(), IndexMap::new());

        let descriptor = Descriptor {
            states: Some(states),
            alphabet: Some(Vec::new()),
            transitions: Some(transitions),
            start_state: Some("q0".to_string()),
            accepting_states: Some(Vec::new()),
            language: None,
        };

        // The row consumes the whole (empty) alphabet but the state has no transitions.
        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::StatesWithoutTransitions(vec![
                "q0".to_string()
            ])]
        );
    }

    #[test]
    fn test_undeclared_destination() {
        let mut descriptor = create_descriptor();
        if let Some(transitions) = descriptor.transitions.as_mut() {
            transitions["q1"]["a"] = "q5".to_string();
        }

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::UndeclaredState("q5".to_string())]
        );
    }

    #[test]
    fn test_undeclared_source() {
        let mut descriptor = create_descriptor();
        if let Some(transitions) = descriptor.transitions.as_mut() {
            transitions.insert("ghost".to_string(), row(&[("a", "q0"), ("b", "q0")]));
        }

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::UndeclaredState("ghost".to_string())]
        );
    }

    #[test]
    fn test_multi_character_transition_symbol() {
        let mut descriptor = create_descriptor();
        if let Some(transitions) = descriptor.transitions.as_mut() {
            transitions["q0"].insert("ab".to_string(), "q0".to_string());
        }

        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::ForeignSymbol {
                state: "q0".to_string(),
                symbol: "ab".to_string()
            }]
        );
    }

    #[test]
    fn test_multi_character_alphabet_entry() {
        let descriptor: Descriptor = serde_json::from_str(
            r#"{
                "states": {"q0": {"x": 0, "y": 0}},
                "alphabet": ["ab"],
                "transitions": {"q0": {"ab": "q0"}},
                "startState": "q0",
                "acceptingStates": ["q0"]
            }"#,
        )
        .unwrap();

        // The row matches the alphabet exactly, only the entry itself is wrong.
        assert_eq!(
            diagnose(&descriptor),
            vec![AnalysisError::InvalidSymbol("ab".to_string())]
        );
        assert!(analyze(&descriptor).is_err());
    }

    #[test]
    fn test_empty_alphabet_entry() {
        let mut descriptor = create_descriptor();
        if let Some(alphabet) = descriptor.alphabet.as_mut() {
            alphabet.push(String::new());
        }

        let errors = diagnose(&descriptor);
        assert_eq!(errors[0], AnalysisError::InvalidSymbol(String::new()));
    }

    #[test]
    fn test_diagnose_reports_every_problem() {
        let mut descriptor = create_descriptor();
        descriptor.start_state = Some("nowhere".to_string());
        descriptor.accepting_states = Some(vec!["elsewhere".to_string()]);

        let errors = diagnose(&descriptor);
        assert_eq!(errors.len(), 2);
        assert_eq!(
            analyze(&descriptor),
            Err(AutomatonError::Invalid(errors[0].clone()))
        );
    }
}
