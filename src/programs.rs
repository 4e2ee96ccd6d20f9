//! This module embeds a small library of built-in machines in the positional format.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError};

// Embedded programs, named after their files.
const PROGRAM_TEXTS: [(&str, &str); 4] = [
    (
        "unary-increment",
        include_str!("../machines/unary-increment.tm"),
    ),
    (
        "binary-inverter",
        include_str!("../machines/binary-inverter.tm"),
    ),
    ("busy-beaver-2", include_str!("../machines/busy-beaver-2.tm")),
    ("shuttle", include_str!("../machines/shuttle.tm")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load_embedded();
}

fn load_embedded() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|(name, text)| match parse(text) {
            Ok(mut program) => {
                program.name = name.to_string();
                Some(program)
            }
            Err(e) => {
                tracing::error!(name, error = %e, "failed to parse built-in program");
                None
            }
        })
        .collect()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|program| program.name.clone())
            .collect()
    }
}
