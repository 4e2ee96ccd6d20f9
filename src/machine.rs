//! This module defines the `TuringMachine` struct, which executes a single-tape deterministic
//! Turing Machine one transition at a time and classifies how it halted.

use crate::tape::Tape;
use crate::table::TransitionTable;
use crate::types::{Halt, Program, StateId, DEFAULT_SNAPSHOT_RADIUS};
use std::collections::HashSet;

/// Represents a single-tape Turing Machine.
///
/// The machine owns its program (and therefore its transition table) and its tape. All
/// run-loop policy such as step caps and progress reporting lives in the caller; see
/// [`crate::runner::Runner`].
pub struct TuringMachine {
    state: StateId,
    tape: Tape,
    program: Program,
    halt: Option<Halt>,
    step_count: u64,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` from a `Program`.
    ///
    /// The input is placed on the tape from position 0, the head starts at position 0 and the
    /// current state is the program's start state.
    pub fn new(program: Program) -> Self {
        let mut machine = Self {
            state: program.start_state.clone(),
            tape: Tape::new(&program.input, program.blank),
            program,
            halt: None,
            step_count: 0,
        };
        machine.halt = machine.halting_state();
        machine
    }

    /// Executes a single step.
    ///
    /// Returns `true` if a transition was applied. Returns `false` if the machine is halted, in
    /// which case nothing is changed. When no transition is defined for the current state and
    /// symbol, the machine switches to [`crate::types::REJECT_STATE`] and halts for good.
    pub fn step(&mut self) -> bool {
        if self.halt.is_some() {
            return false;
        }

        let symbol = self.tape.read();
        let Some(transition) = self.program.rules.lookup(&self.state, symbol) else {
            tracing::debug!(state = %self.state, symbol = %symbol, "undefined transition");
            let state = std::mem::replace(&mut self.state, StateId::reject());
            self.halt = Some(Halt::UndefinedTransition { state, symbol });
            return false;
        };

        self.tape.write(transition.write);
        self.tape.shift(transition.direction);
        self.state = transition.next_state.clone();
        self.step_count += 1;

        tracing::trace!(
            step = self.step_count,
            state = %self.state,
            head = self.tape.head_position(),
            "applied transition"
        );

        self.halt = self.halting_state();
        if let Some(halt) = &self.halt {
            tracing::debug!(state = %self.state, steps = self.step_count, ?halt, "machine halted");
        }

        true
    }

    /// Restores the initial configuration: start state, initial tape, head at 0.
    pub fn reset(&mut self) {
        self.state = self.program.start_state.clone();
        self.tape = Tape::new(&self.program.input, self.program.blank);
        self.step_count = 0;
        self.halt = self.halting_state();
    }

    /// Returns the current state.
    pub fn state(&self) -> &StateId {
        &self.state
    }

    /// Returns the start state.
    pub fn start_state(&self) -> &StateId {
        &self.program.start_state
    }

    pub fn accept_states(&self) -> &HashSet<StateId> {
        &self.program.accept_states
    }

    pub fn reject_states(&self) -> &HashSet<StateId> {
        &self.program.reject_states
    }

    /// Returns how the machine halted, or `None` while it can still step.
    pub fn halt(&self) -> Option<&Halt> {
        self.halt.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Returns the number of transitions applied since construction or the last reset.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn head_position(&self) -> i64 {
        self.tape.head_position()
    }

    pub fn blank(&self) -> char {
        self.tape.blank()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn table(&self) -> &TransitionTable {
        &self.program.rules
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Returns the `2 * radius + 1` cells centered on the head as a string.
    pub fn tape_snapshot(&self, radius: usize) -> String {
        self.tape.window(radius).into_iter().collect()
    }

    /// Returns the tape snapshot with the default radius of 10.
    pub fn snapshot(&self) -> String {
        self.tape_snapshot(DEFAULT_SNAPSHOT_RADIUS)
    }

    /// Returns the number of stored tape cells, counting explicit blank writes.
    pub fn output_length(&self) -> usize {
        self.tape.stored_cell_count()
    }

    /// Returns the sum of the stored digit symbols.
    pub fn tape_sum(&self) -> u64 {
        self.tape.sum_of_digit_symbols()
    }

    fn halting_state(&self) -> Option<Halt> {
        if self.program.accept_states.contains(&self.state) {
            Some(Halt::Accepted)
        } else if self.program.reject_states.contains(&self.state) {
            Some(Halt::Rejected)
        } else {
            None
        }
    }
}
