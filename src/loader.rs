//! This module provides the `ProgramLoader` struct, responsible for loading Turing Machine
//! programs from files, directories and strings.

use crate::analyzer::analyze;
use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of programs in the positional format.
pub const PROGRAM_EXTENSION: &str = "tm";
/// File extension of programs stored as JSON.
pub const JSON_EXTENSION: &str = "json";

/// `ProgramLoader` is a utility struct for loading Turing Machine programs.
///
/// Positional (`.tm` or any other extension) and JSON (`.json`) programs are supported. Every
/// program is validated by the analyzer before it is returned.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// The program is named after the file stem.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is successfully read and parsed into a `Program`.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    /// * `Err(TuringMachineError::ParseError)`, `JsonError` or `ValidationError` if the content
    ///   is not a valid program.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let metadata = fs::metadata(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if metadata.len() > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds the maximum program size of {} bytes",
                path.display(),
                MAX_PROGRAM_SIZE
            )));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let mut program = if has_extension(path, JSON_EXTENSION) {
            Self::load_program_from_json(&content)?
        } else {
            Self::load_program_from_string(&content)?
        };

        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            program.name = stem.to_string();
        }

        tracing::debug!(path = %path.display(), name = %program.name, "loaded program");

        Ok(program)
    }

    /// Loads a program in the positional format from the provided string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        parse(content)
    }

    /// Loads a program from its JSON form, as produced by serializing a `Program`.
    pub fn load_program_from_json(content: &str) -> Result<Program, TuringMachineError> {
        let program: Program = serde_json::from_str(content)
            .map_err(|e| TuringMachineError::JsonError(e.to_string()))?;

        analyze(&program)?;

        Ok(program)
    }

    /// Loads all program files (`.tm` and `.json`) from a given directory.
    ///
    /// Directories and other files are skipped. Each element of the result is either the path
    /// and loaded program, or the error for that file.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir()
                    || !(has_extension(&path, PROGRAM_EXTENSION)
                        || has_extension(&path, JSON_EXTENSION))
                {
                    return None;
                }

                match Self::load_program(&path) {
                    Ok(program) => Some(Ok((path, program))),
                    Err(e) => Some(Err(TuringMachineError::FileError(format!(
                        "Failed to load program from {}: {}",
                        path.display(),
                        e
                    )))),
                }
            })
            .collect()
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().is_some_and(|ext| ext == extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, StateId, Transition};
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const UNARY_INCREMENT: &str = "2\n1\n1,1,R\n0,1,R\n111\n";

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("increment.tm");
        write_file(&file_path, UNARY_INCREMENT);

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.name, "increment");
        assert_eq!(program.input, "111");
        assert_eq!(program.rules.len(), 2);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_json_program() {
        let content = r#"{
            "name": "Labelled",
            "start_state": "scan",
            "accept_states": ["done"],
            "reject_states": ["stuck"],
            "input": "ab",
            "blank": "_",
            "rules": {
                "scan": {
                    "a": { "next_state": "scan", "write": "a", "direction": "Right" },
                    "b": { "next_state": "done", "write": "B", "direction": "Left" }
                }
            }
        }"#;

        let program = ProgramLoader::load_program_from_json(content).unwrap();
        assert_eq!(program.name, "Labelled");
        assert_eq!(program.start_state, "scan");
        assert_eq!(program.blank, '_');
        assert!(program.reject_states.contains(&StateId::from("stuck")));
        assert_eq!(
            program.rules.lookup(&"scan".into(), 'b'),
            Some(&Transition::new("done", 'B', Direction::Left))
        );
    }

    #[test]
    fn test_load_json_program_from_file_uses_file_stem() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("flip.json");
        write_file(
            &file_path,
            r#"{ "start_state": "0", "accept_states": ["1"], "rules": {} }"#,
        );

        let program = ProgramLoader::load_program(&file_path).unwrap();
        assert_eq!(program.name, "flip");
        assert_eq!(program.blank, '0');
        assert!(program.input.is_empty());
        assert!(program.rules.is_empty());
    }

    #[test]
    fn test_load_invalid_json_program() {
        let result = ProgramLoader::load_program_from_json("{ \"rules\": 3 }");
        assert!(matches!(result, Err(TuringMachineError::JsonError(_))));

        let overlapping = r#"{ "start_state": "0", "accept_states": ["1"], "reject_states": ["1"], "rules": {} }"#;
        let result = ProgramLoader::load_program_from_json(overlapping);
        assert!(matches!(result, Err(TuringMachineError::ValidationError(_))));
    }

    #[test]
    fn test_load_oversized_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("huge.tm");
        let mut content = String::from("2\n1\n1,1,R\n0,1,R\n");
        content.push_str(&"1".repeat(MAX_PROGRAM_SIZE));
        write_file(&file_path, &content);

        let result = ProgramLoader::load_program(&file_path);
        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();

        write_file(&dir.path().join("valid.tm"), UNARY_INCREMENT);
        write_file(&dir.path().join("invalid.tm"), "2\n1\n1,1,R\n");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let results = ProgramLoader::load_programs(dir.path());

        // We should have 2 results: 1 success and 1 error
        assert_eq!(results.len(), 2);

        let success_count = results.iter().filter(|result| result.is_ok()).count();
        let error_count = results.iter().filter(|result| result.is_err()).count();

        assert_eq!(success_count, 1);
        assert_eq!(error_count, 1);
    }

    #[test]
    fn test_load_programs_from_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }
}
