//! This crate provides the core of a deterministic single-tape Turing Machine interpreter.
//! It includes the sparse tape, the transition table and the step engine, a loader for the
//! positional transition-table format, and a runner that applies step caps and progress
//! reporting around the engine.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod runner;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, unreachable_states, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramManager` and `PROGRAMS` from the programs module.
pub use programs::{ProgramManager, PROGRAMS};
/// Re-exports the run-loop types from the runner module.
pub use runner::{Outcome, Progress, RunConfig, RunReport, Runner};
pub use table::TransitionTable;
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Halt, Program, StateId, Transition, TuringMachineError, DEFAULT_BLANK_SYMBOL,
    REJECT_STATE,
};
