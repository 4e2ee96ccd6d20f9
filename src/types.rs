//! This module defines the core data structures and types used throughout the Turing Machine
//! interpreter, including state labels, transitions, program definitions, halting outcomes
//! and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::table::TransitionTable;
use crate::Rule;

/// The default blank symbol used on the tape. In the positional format the blank is also
/// the symbol with alphabet index 0.
pub const DEFAULT_BLANK_SYMBOL: char = '0';
/// The label the machine switches to when no transition is defined for the current
/// state and symbol.
pub const REJECT_STATE: &str = "REJECT";
/// The number of cells shown on each side of the head in a tape snapshot.
pub const DEFAULT_SNAPSHOT_RADIUS: usize = 10;
/// The largest snapshot radius a `RunConfig` accepts.
pub const MAX_SNAPSHOT_RADIUS: usize = 1_000_000;
/// The default step cap applied by the runner.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000_000;
/// The default number of applied steps between two progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 1_000_000;
/// The maximum allowed size for a program definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 1 << 20; // 1MB
/// The name given to programs that were not loaded from a named file.
pub const DEFAULT_PROGRAM_NAME: &str = "untitled";

/// An opaque state label.
///
/// The engine never enumerates states: any label that appears in the transition table,
/// in the halting sets, or the synthesized [`REJECT_STATE`] is a valid state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(String);

impl StateId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The synthetic state entered on an undefined transition.
    pub fn reject() -> Self {
        Self(REJECT_STATE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateId {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for StateId {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl From<usize> for StateId {
    fn from(index: usize) -> Self {
        Self(index.to_string())
    }
}

impl PartialEq<str> for StateId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Represents a Turing Machine program: everything needed to construct a machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Program {
    /// The name of the program, usually the file stem it was loaded from.
    #[serde(default = "default_name")]
    pub name: String,
    /// The state the machine starts in.
    pub start_state: StateId,
    /// Halting states that signal acceptance.
    #[serde(default)]
    pub accept_states: HashSet<StateId>,
    /// Halting states that signal rejection.
    #[serde(default)]
    pub reject_states: HashSet<StateId>,
    /// The initial tape contents, placed left-aligned from position 0.
    #[serde(default)]
    pub input: String,
    /// The symbol read from every cell that was never written.
    #[serde(default = "default_blank")]
    pub blank: char,
    /// The transition rules.
    pub rules: TransitionTable,
}

fn default_name() -> String {
    DEFAULT_PROGRAM_NAME.to_string()
}

fn default_blank() -> char {
    DEFAULT_BLANK_SYMBOL
}

impl Program {
    /// Returns `true` if `state` is in either halting set.
    pub fn is_halting_state(&self, state: &StateId) -> bool {
        self.accept_states.contains(state) || self.reject_states.contains(state)
    }
}

/// A single transition rule, applied when its `(state, symbol)` key is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine transitions to.
    pub next_state: StateId,
    /// The symbol written under the head before it moves.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(next_state: impl Into<StateId>, write: char, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Parses the single-letter form used by the positional format.
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Why a machine stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The machine is in an accept state.
    Accepted,
    /// The machine is in a reject state.
    Rejected,
    /// No rule was defined for `state` reading `symbol`; the machine is now in
    /// [`REJECT_STATE`].
    UndefinedTransition { state: StateId, symbol: char },
}

impl Halt {
    /// Returns `true` only for [`Halt::Accepted`].
    pub fn is_accepted(&self) -> bool {
        matches!(self, Halt::Accepted)
    }
}

/// Represents various errors that can occur while loading Turing Machine programs.
///
/// The engine itself has no failure modes: an undefined transition is a [`Halt`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a positional program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a JSON program or configuration that could not be decoded.
    #[error("JSON error: {0}")]
    JsonError(String),
}
