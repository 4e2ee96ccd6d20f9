use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use tmsim::{
    unreachable_states, Outcome, Program, ProgramLoader, ProgramManager, RunConfig, RunReport,
    Runner, TuringMachine,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim machines/busy-beaver-2.tm
  tmsim --builtin unary-increment --input 11111
  cat machines/shuttle.tm | tmsim --max-steps 10000 --json")]
struct Cli {
    /// The program file to execute (positional format, or JSON with a .json extension).
    /// The program is read from stdin when it is piped and no file is given.
    program: Option<PathBuf>,

    /// Run a built-in program instead of a file
    #[clap(short, long, conflicts_with = "program")]
    builtin: Option<String>,

    /// List the built-in programs and exit
    #[clap(long)]
    list: bool,

    /// The initial tape contents, replacing the program's tape line
    #[clap(short, long)]
    input: Option<String>,

    /// Read run settings from a JSON file; flags below override it
    #[clap(long)]
    config: Option<PathBuf>,

    /// Stop after this many steps
    #[clap(long)]
    max_steps: Option<u64>,

    /// Print progress every N steps (0 disables)
    #[clap(long)]
    progress_interval: Option<u64>,

    /// Cells shown on each side of the head
    #[clap(long)]
    radius: Option<usize>,

    /// Print the final report as JSON
    #[clap(long)]
    json: bool,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.list {
        for name in ProgramManager::list_program_names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = run_config(&cli)?;
    let mut program = load_program(&cli)?;

    if let Some(input) = &cli.input {
        program.input = input.trim().to_string();
    }

    let unreachable = unreachable_states(&program);
    if !unreachable.is_empty() {
        tracing::warn!(?unreachable, "program has unreachable states");
    }

    let mut machine = TuringMachine::new(program);

    let report = if cli.debug {
        run_debug(&mut machine, &config)
    } else if cli.json {
        Runner::run_to_completion(&mut machine, &config)
    } else {
        Runner::run(&mut machine, &config, |progress| {
            println!(
                "Step {} | State: {} | Tape: {}",
                progress.step, progress.state, progress.snapshot
            );
        })
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, config.max_steps);
    }

    Ok(())
}

/// Builds the run settings: defaults, then the config file, then flags.
fn run_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load run config {}", path.display()))?,
        None => RunConfig::default(),
    };

    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }
    if let Some(interval) = cli.progress_interval {
        config.progress_interval = (interval > 0).then_some(interval);
    }
    if let Some(radius) = cli.radius {
        config.snapshot_radius = radius;
    }

    config.validate()?;

    Ok(config)
}

/// Loads a program from a file, a built-in name, or stdin.
fn load_program(cli: &Cli) -> Result<Program> {
    if let Some(path) = &cli.program {
        return ProgramLoader::load_program(path)
            .with_context(|| format!("Failed to load program {}", path.display()));
    }

    if let Some(name) = &cli.builtin {
        return Ok(ProgramManager::get_program_by_name(name)?);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        return Ok(ProgramLoader::load_program_from_string(&buffer)?);
    }

    bail!("No program given: pass a file, pipe one on stdin, or use --builtin (see --list)")
}

/// Runs with a progress report after every step, printing each configuration.
fn run_debug(machine: &mut TuringMachine, config: &RunConfig) -> RunReport {
    println!(
        "Step: 0, State: {}, Head: {}, Tape: {}",
        machine.state(),
        machine.head_position(),
        machine.tape_snapshot(config.snapshot_radius)
    );

    let debug_config = RunConfig {
        progress_interval: Some(1),
        ..config.clone()
    };

    Runner::run(machine, &debug_config, |progress| {
        println!(
            "Step: {}, State: {}, Head: {}, Tape: {}",
            progress.step, progress.state, progress.head_position, progress.snapshot
        );
    })
}

fn print_report(report: &RunReport, max_steps: u64) {
    if report.outcome == Outcome::StepLimit {
        println!("Terminating after {max_steps} steps: possible infinite loop");
    }

    println!("Machine halted in state: {}", report.state);
    println!("Final tape: {}", report.snapshot);
    println!("Output length: {}", report.output_length);
    println!("Sum of output tape: {}", report.tape_sum);
    println!(
        "Time taken: {:.3} ms ({:.3} s)",
        report.elapsed_ms,
        report.elapsed_ms / 1000.0
    );
}
