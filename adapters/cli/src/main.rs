#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that validates a level document and prints the report.

mod inputs;

use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Result};
use clap::Parser;
use traverse_core::{
    AbilityState, AbilityTable, MovementConstants, PlayerStats, RepairPlan, StageReport,
    StagedReport, Status, TileCoord, ValidationOutcome,
};
use traverse_level::{query, Level, LevelDocument};
use traverse_system_feasibility::FeasibilityValidator;
use traverse_system_repair::{with_spawn_override, AutoRepair, RepairSubject};
use traverse_system_spawn_check::check_spawn;
use traverse_system_staged::{run_staged, StagePlan};

/// Traversability validator for tile-based platformer levels.
#[derive(Parser, Debug)]
#[command(name = "traverse", version, about, long_about = None)]
struct Args {
    /// Level document to validate.
    #[arg(long = "level")]
    level: PathBuf,

    /// Repair plan applied before and during validation.
    #[arg(long = "repairs")]
    repairs: Option<PathBuf>,

    /// Replay the ability progression stage by stage.
    #[arg(long = "staged")]
    staged: bool,

    /// Ability unlocked for a single-stage run. May be repeated.
    #[arg(long = "unlock", value_name = "NAME")]
    unlock: Vec<String>,

    /// Repair attempts allowed after the first validation.
    #[arg(long = "max-attempts", default_value_t = traverse_system_repair::DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Write the repair plan here after the run, with any spawn override the
    /// spawn gate suggested. Written even when nothing changed.
    #[arg(long = "write-repairs", value_name = "PATH")]
    write_repairs: Option<PathBuf>,
}

/// What a validation pass checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Single(AbilityState),
    Staged,
}

/// Report of either validation mode.
#[derive(Clone, Debug)]
enum Outcome {
    Single(StageReport),
    Staged(StagedReport),
}

impl ValidationOutcome for Outcome {
    fn status(&self) -> Status {
        match self {
            Self::Single(report) => report.status,
            Self::Staged(report) => report.status,
        }
    }

    fn into_lines(self) -> Vec<String> {
        match self {
            Self::Single(report) => report.into_lines(),
            Self::Staged(report) => report.into_lines(),
        }
    }
}

/// Entry point for the traverse command-line interface.
fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(status) if status.is_pass() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<Status> {
    let inputs::LoadedLevel {
        document,
        mut level,
    } = inputs::load_level(&args.level)?;
    let mut constants = document.movement.clone();
    let player = document.player.clone();
    let mode = if args.staged {
        Mode::Staged
    } else {
        Mode::Single(resolve_unlocks(level.abilities(), &args.unlock)?)
    };

    let base = AbilityState::none();
    let spawn = check_spawn(&level, level.spawn_point(), &player, base);
    print_lines(&spawn.lines);

    let loaded = args
        .repairs
        .as_deref()
        .map(inputs::load_repairs)
        .transpose()?;

    let status = match &loaded {
        None => {
            let outcome = validate(&level, &document, &constants, &player, mode);
            let status = outcome.status();
            print_lines(&outcome.into_lines());
            status
        }
        Some(plan) => {
            let mut repair = AutoRepair::new(plan.clone());
            let mut subject = RepairSubject::new(&mut level, &mut constants);
            repair.apply_persistent_patches(&mut subject);
            let _ = repair.apply_spawn_override(&mut subject);
            let report = repair.run_repair_loop(&mut subject, args.max_attempts, |subject| {
                validate(subject.level(), &document, subject.constants(), &player, mode)
            });
            print_lines(&report.lines);
            report.status
        }
    };

    if let Some(target) = &args.write_repairs {
        let plan = effective_plan(loaded.unwrap_or_default(), spawn.suggested_override);
        inputs::save_repairs(target, &plan)?;
    }
    Ok(status)
}

/// Plan written by `--write-repairs`: the loaded plan, plus the spawn gate's
/// suggestion when it rejected the spawn.
fn effective_plan(plan: RepairPlan, suggestion: Option<TileCoord>) -> RepairPlan {
    match suggestion {
        Some(tile) => with_spawn_override(&plan, Some(tile)),
        None => plan,
    }
}

fn resolve_unlocks(table: &AbilityTable, names: &[String]) -> Result<AbilityState> {
    let mut state = AbilityState::none();
    for name in names {
        let Some(id) = table.find(name) else {
            bail!("unknown ability `{name}`");
        };
        state.unlock(id);
    }
    Ok(state)
}

fn validate(
    level: &Level,
    document: &LevelDocument,
    constants: &MovementConstants,
    player: &PlayerStats,
    mode: Mode,
) -> Outcome {
    let validator = FeasibilityValidator::for_level(level, constants, player);
    match mode {
        Mode::Single(abilities) => {
            let label = stage_label(level.abilities(), abilities);
            Outcome::Single(validator.run_single_stage(
                abilities,
                query::objectives(document),
                &label,
            ))
        }
        Mode::Staged => {
            let plan = StagePlan::new(
                query::stage_targets(level, document),
                query::boss_target(level, document),
            );
            Outcome::Staged(run_staged(&validator, &plan))
        }
    }
}

fn stage_label(table: &AbilityTable, abilities: AbilityState) -> String {
    let names: Vec<&str> = table
        .ids()
        .filter(|&id| abilities.has(id))
        .map(|id| table.ability_name(id))
        .collect();
    if names.is_empty() {
        "base".to_owned()
    } else {
        names.join(", ")
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
