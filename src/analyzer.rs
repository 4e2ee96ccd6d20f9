//! This module provides functions for analyzing Turing Machine programs before execution.
//! Every load path runs `analyze`; `unreachable_states` is an advisory diagnostic.

use crate::types::{Program, StateId, TuringMachineError, REJECT_STATE};
use std::collections::HashSet;

/// Represents the problems that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The start state label is empty.
    InvalidStartState(String),
    /// States that are both accept and reject states.
    OverlappingHaltingStates(Vec<String>),
    /// The table defines transitions out of the reserved reject label.
    ReservedState(String),
    /// The blank symbol is a control character.
    InvalidBlank(char),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidStartState(state) => {
                TuringMachineError::ValidationError(format!("Invalid start state: '{}'", state))
            }
            AnalysisError::OverlappingHaltingStates(states) => TuringMachineError::ValidationError(
                format!("States are both accepting and rejecting: {:?}", states),
            ),
            AnalysisError::ReservedState(state) => TuringMachineError::ValidationError(format!(
                "State '{}' is reserved and cannot have transitions",
                state
            )),
            AnalysisError::InvalidBlank(blank) => {
                TuringMachineError::ValidationError(format!("Invalid blank symbol: {:?}", blank))
            }
        }
    }
}

/// Analyzes a `Program` for structural errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` for the first violated check.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    let errors = [
        check_start_state,
        check_halting_states,
        check_reserved_state,
        check_blank,
    ]
    .iter()
    .filter_map(|f| f(program).err())
    .collect::<Vec<_>>();

    match errors.into_iter().next() {
        Some(first_error) => Err(first_error.into()),
        None => Ok(()),
    }
}

/// Returns the states that have transitions but cannot be reached from the start state,
/// sorted by label.
///
/// Unreachable rows are legal in the positional format, so this is a diagnostic only.
pub fn unreachable_states(program: &Program) -> Vec<StateId> {
    let mut visited = HashSet::new();
    let mut queue = vec![&program.start_state];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for (from, _, transition) in program.rules.iter() {
            if from == state && !visited.contains(&transition.next_state) {
                queue.push(&transition.next_state);
            }
        }
    }

    let mut unreachable: Vec<StateId> = program
        .rules
        .states()
        .filter(|state| !visited.contains(state))
        .cloned()
        .collect();

    unreachable.sort();
    unreachable
}

/// Checks that the start state has a non-empty label.
fn check_start_state(program: &Program) -> Result<(), AnalysisError> {
    if program.start_state.as_str().trim().is_empty() {
        return Err(AnalysisError::InvalidStartState(
            program.start_state.to_string(),
        ));
    }

    Ok(())
}

/// Checks that no state is both an accept state and a reject state.
fn check_halting_states(program: &Program) -> Result<(), AnalysisError> {
    let mut overlap: Vec<String> = program
        .accept_states
        .intersection(&program.reject_states)
        .map(StateId::to_string)
        .collect();

    if !overlap.is_empty() {
        overlap.sort();
        return Err(AnalysisError::OverlappingHaltingStates(overlap));
    }

    Ok(())
}

/// Checks that the table does not define transitions out of the reject label, which the machine
/// enters on an undefined transition and must never leave.
fn check_reserved_state(program: &Program) -> Result<(), AnalysisError> {
    if program.rules.contains_state(&StateId::reject()) {
        return Err(AnalysisError::ReservedState(REJECT_STATE.to_string()));
    }

    Ok(())
}

fn check_blank(program: &Program) -> Result<(), AnalysisError> {
    if program.blank.is_control() {
        return Err(AnalysisError::InvalidBlank(program.blank));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TransitionTable;
    use crate::types::{Direction, Transition};

    fn create_program(entries: Vec<((StateId, char), Transition)>) -> Program {
        Program {
            name: "Analysis Test".to_string(),
            start_state: "0".into(),
            accept_states: HashSet::from(["9".into()]),
            reject_states: HashSet::new(),
            input: String::new(),
            blank: '0',
            rules: entries.into_iter().collect::<TransitionTable>(),
        }
    }

    #[test]
    fn test_valid_program() {
        let program = create_program(vec![(
            ("0".into(), '0'),
            Transition::new("9", '1', Direction::Right),
        )]);

        assert!(analyze(&program).is_ok());
        assert!(unreachable_states(&program).is_empty());
    }

    #[test]
    fn test_empty_start_state() {
        let mut program = create_program(Vec::new());
        program.start_state = StateId::new("");

        assert_eq!(
            check_start_state(&program),
            Err(AnalysisError::InvalidStartState(String::new()))
        );
        assert!(analyze(&program).is_err());
    }

    #[test]
    fn test_overlapping_halting_states() {
        let mut program = create_program(Vec::new());
        program.reject_states.insert("9".into());

        let result = analyze(&program);
        assert_eq!(
            result,
            Err(TuringMachineError::ValidationError(
                "States are both accepting and rejecting: [\"9\"]".to_string()
            ))
        );
    }

    #[test]
    fn test_reserved_reject_state() {
        let program = create_program(vec![(
            (StateId::reject(), '0'),
            Transition::new("0", '0', Direction::Left),
        )]);

        assert_eq!(
            check_reserved_state(&program),
            Err(AnalysisError::ReservedState(REJECT_STATE.to_string()))
        );
    }

    #[test]
    fn test_control_character_blank() {
        let mut program = create_program(Vec::new());
        program.blank = '\n';

        assert_eq!(check_blank(&program), Err(AnalysisError::InvalidBlank('\n')));
    }

    #[test]
    fn test_unreachable_states() {
        let program = create_program(vec![
            (("0".into(), '0'), Transition::new("1", '1', Direction::Right)),
            (("1".into(), '0'), Transition::new("9", '1', Direction::Right)),
            (("3".into(), '0'), Transition::new("2", '1', Direction::Left)),
            (("2".into(), '1'), Transition::new("3", '1', Direction::Left)),
        ]);

        assert!(analyze(&program).is_ok());
        assert_eq!(
            unreachable_states(&program),
            vec![StateId::from("2"), StateId::from("3")]
        );
    }
}
