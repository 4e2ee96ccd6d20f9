//! This module drives a `TuringMachine` to completion. All run-loop policy lives here: the step
//! cap, the progress reporting cadence and timing. The machine itself never limits itself.

use crate::machine::TuringMachine;
use crate::types::{
    Halt, TuringMachineError, DEFAULT_MAX_STEPS, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_SNAPSHOT_RADIUS, MAX_SNAPSHOT_RADIUS,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;

/// Run-loop settings. Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// The maximum number of transitions to apply.
    pub max_steps: u64,
    /// Report progress every this many applied steps. `None` disables progress reports.
    pub progress_interval: Option<u64>,
    /// Cells shown on each side of the head in snapshots.
    pub snapshot_radius: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            progress_interval: Some(DEFAULT_PROGRESS_INTERVAL),
            snapshot_radius: DEFAULT_SNAPSHOT_RADIUS,
        }
    }
}

impl RunConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| TuringMachineError::JsonError(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Checks that the settings can be honored.
    pub fn validate(&self) -> Result<(), TuringMachineError> {
        if self.snapshot_radius > MAX_SNAPSHOT_RADIUS {
            return Err(TuringMachineError::ValidationError(format!(
                "Snapshot radius {} exceeds the maximum of {}",
                self.snapshot_radius, MAX_SNAPSHOT_RADIUS
            )));
        }

        Ok(())
    }
}

/// A periodic progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub step: u64,
    pub state: String,
    pub head_position: i64,
    pub snapshot: String,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine reached an accept state.
    Accepted,
    /// The machine reached a reject state.
    Rejected,
    /// No transition was defined; the machine is in the reject sentinel state.
    UndefinedTransition { state: String, symbol: char },
    /// The step cap was reached while the machine could still step.
    StepLimit,
}

impl From<&Halt> for Outcome {
    fn from(halt: &Halt) -> Self {
        match halt {
            Halt::Accepted => Outcome::Accepted,
            Halt::Rejected => Outcome::Rejected,
            Halt::UndefinedTransition { state, symbol } => Outcome::UndefinedTransition {
                state: state.to_string(),
                symbol: *symbol,
            },
        }
    }
}

/// The final results of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub outcome: Outcome,
    /// The state the machine ended in.
    pub state: String,
    /// Transitions applied during this run.
    pub steps: u64,
    pub snapshot: String,
    pub output_length: usize,
    pub tape_sum: u64,
    pub head_position: i64,
    pub elapsed_ms: f64,
}

/// Runs machines under a `RunConfig`.
pub struct Runner;

impl Runner {
    /// Steps `machine` until it halts or `config.max_steps` transitions were applied, calling
    /// `on_progress` every `config.progress_interval` applied steps.
    pub fn run<F>(machine: &mut TuringMachine, config: &RunConfig, mut on_progress: F) -> RunReport
    where
        F: FnMut(&Progress),
    {
        let interval = config.progress_interval.filter(|&interval| interval > 0);
        let started = Instant::now();
        let mut steps = 0u64;

        while steps < config.max_steps && machine.step() {
            steps += 1;

            if interval.is_some_and(|interval| steps % interval == 0) {
                on_progress(&Progress {
                    step: steps,
                    state: machine.state().to_string(),
                    head_position: machine.head_position(),
                    snapshot: machine.tape_snapshot(config.snapshot_radius),
                });
            }
        }

        let elapsed = started.elapsed();

        // A machine that halted on the very step that hit the cap still counts as halted.
        let outcome = match machine.halt() {
            Some(halt) => Outcome::from(halt),
            None => {
                tracing::warn!(steps, "step limit reached before the machine halted");
                Outcome::StepLimit
            }
        };

        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        tracing::debug!(steps, ?outcome, elapsed_ms, "run finished");

        RunReport {
            name: machine.program().name.clone(),
            outcome,
            state: machine.state().to_string(),
            steps,
            snapshot: machine.tape_snapshot(config.snapshot_radius),
            output_length: machine.output_length(),
            tape_sum: machine.tape_sum(),
            head_position: machine.head_position(),
            elapsed_ms,
        }
    }

    /// Runs `machine` without progress reports.
    pub fn run_to_completion(machine: &mut TuringMachine, config: &RunConfig) -> RunReport {
        Self::run(machine, config, |_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TransitionTable;
    use crate::types::{Direction, Program, StateId, Transition};
    use std::collections::HashSet;
    use std::io::Write;

    /// Two states bouncing the head between cells 0 and 1 forever.
    fn create_shuttle_program() -> Program {
        let rules = [
            ((StateId::from("a"), '0'), Transition::new("b", '0', Direction::Right)),
            ((StateId::from("b"), '0'), Transition::new("a", '0', Direction::Left)),
        ]
        .into_iter()
        .collect::<TransitionTable>();

        Program {
            name: "Shuttle".to_string(),
            start_state: "a".into(),
            accept_states: HashSet::from(["never".into()]),
            reject_states: HashSet::new(),
            input: String::new(),
            blank: '0',
            rules,
        }
    }

    fn config(max_steps: u64, progress_interval: Option<u64>) -> RunConfig {
        RunConfig {
            max_steps,
            progress_interval,
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::default();

        assert_eq!(config.max_steps, 1_000_000_000);
        assert_eq!(config.progress_interval, Some(1_000_000));
        assert_eq!(config.snapshot_radius, 10);
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let config: RunConfig = serde_json::from_str(r#"{ "max_steps": 50 }"#).unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.progress_interval, Some(DEFAULT_PROGRESS_INTERVAL));

        let config: RunConfig =
            serde_json::from_str(r#"{ "progress_interval": null, "snapshot_radius": 2 }"#)
                .unwrap();
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(config.progress_interval, None);
        assert_eq!(config.snapshot_radius, 2);
    }

    #[test]
    fn test_config_rejects_oversized_radius() {
        let mut config = RunConfig::default();
        assert!(config.validate().is_ok());

        config.snapshot_radius = MAX_SNAPSHOT_RADIUS;
        assert!(config.validate().is_ok());

        config.snapshot_radius = usize::MAX;
        let error = config.validate().unwrap_err();
        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert!(error.to_string().contains("exceeds the maximum"));
    }

    #[test]
    fn test_load_validates_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "snapshot_radius": {} }}"#, usize::MAX).unwrap();
        assert!(RunConfig::load(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_steps": 7 }}"#).unwrap();
        assert_eq!(RunConfig::load(file.path()).unwrap().max_steps, 7);
    }

    #[test]
    fn test_step_cap_is_exact() {
        let mut machine = TuringMachine::new(create_shuttle_program());
        let report = Runner::run_to_completion(&mut machine, &config(10_000, None));

        assert_eq!(report.steps, 10_000);
        assert_eq!(report.outcome, Outcome::StepLimit);
        assert_eq!(machine.step_count(), 10_000);
        // The machine itself is still steppable.
        assert!(machine.step());
    }

    #[test]
    fn test_progress_cadence() {
        let mut machine = TuringMachine::new(create_shuttle_program());
        let mut reports = Vec::new();

        Runner::run(&mut machine, &config(10, Some(3)), |progress| {
            reports.push(progress.clone())
        });

        let steps: Vec<u64> = reports.iter().map(|progress| progress.step).collect();
        assert_eq!(steps, vec![3, 6, 9]);
        assert_eq!(reports[0].state, "b");
        assert_eq!(reports[0].head_position, 1);
        assert_eq!(reports[0].snapshot.len(), 21);
    }

    #[test]
    fn test_zero_interval_disables_progress() {
        let mut machine = TuringMachine::new(create_shuttle_program());
        let mut calls = 0;

        Runner::run(&mut machine, &config(100, Some(0)), |_| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_report_for_halting_machine() {
        let mut program = create_shuttle_program();
        program.accept_states = HashSet::from(["b".into()]);
        program.input = "0".to_string();

        let mut machine = TuringMachine::new(program);
        let report = Runner::run_to_completion(&mut machine, &RunConfig::default());

        assert_eq!(report.name, "Shuttle");
        assert_eq!(report.outcome, Outcome::Accepted);
        assert_eq!(report.state, "b");
        assert_eq!(report.steps, 1);
        assert_eq!(report.output_length, 1);
        assert_eq!(report.tape_sum, 0);
        assert_eq!(report.head_position, 1);
    }

    #[test]
    fn test_halt_on_the_capped_step_is_reported() {
        let mut program = create_shuttle_program();
        program.accept_states = HashSet::from(["b".into()]);

        let mut machine = TuringMachine::new(program);
        let report = Runner::run_to_completion(&mut machine, &config(1, None));

        assert_eq!(report.steps, 1);
        assert_eq!(report.outcome, Outcome::Accepted);
    }

    #[test]
    fn test_report_for_undefined_transition() {
        let mut program = create_shuttle_program();
        program.input = "7".to_string();

        let mut machine = TuringMachine::new(program);
        let report = Runner::run_to_completion(&mut machine, &RunConfig::default());

        assert_eq!(report.steps, 0);
        assert_eq!(report.state, "REJECT");
        assert_eq!(
            report.outcome,
            Outcome::UndefinedTransition {
                state: "a".to_string(),
                symbol: '7'
            }
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["output_length"], 1);
        assert_eq!(json["outcome"]["UndefinedTransition"]["symbol"], "7");
    }
}
