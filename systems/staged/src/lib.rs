#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Staged runner that replays the intended ability progression.
//!
//! Each stage validates only its own target under the abilities granted by
//! earlier stages, so an objective that needs a later ability fails even when
//! the final, fully unlocked stage could reach it.

use traverse_core::{
    AbilityId, AbilityState, ObjectiveTarget, StagedReport, Status, TileCoord, TileGrid,
    PASS_MARKER,
};
use traverse_system_feasibility::FeasibilityValidator;

/// Label of the stage run with every ability unlocked.
pub const FINAL_STAGE_LABEL: &str = "Final Stage";

/// Objective label of the final stage target.
pub const FINAL_TARGET_LABEL: &str = "final boss gate";

/// One step of the unlock progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageTarget {
    /// Ability granted once the stage completes.
    pub ability: AbilityId,
    /// Tile that must be reachable before the ability is granted.
    pub target: Option<TileCoord>,
}

/// Ordered stages plus the final target.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<StageTarget>,
    boss: Option<TileCoord>,
}

impl StagePlan {
    /// Creates a plan from `(ability, target)` pairs in unlock order.
    #[must_use]
    pub fn new<I>(stages: I, boss: Option<TileCoord>) -> Self
    where
        I: IntoIterator<Item = (AbilityId, Option<TileCoord>)>,
    {
        Self {
            stages: stages
                .into_iter()
                .map(|(ability, target)| StageTarget { ability, target })
                .collect(),
            boss,
        }
    }

    /// Stages in unlock order.
    #[must_use]
    pub fn stages(&self) -> &[StageTarget] {
        &self.stages
    }

    /// Target checked with every ability unlocked.
    #[must_use]
    pub const fn boss(&self) -> Option<TileCoord> {
        self.boss
    }
}

/// Runs every stage of the plan in order.
///
/// Stage `i` is labelled with the abilities granted before it, or `base` for
/// the first stage. The overall status passes only when every summary line
/// carries the pass marker.
#[must_use]
pub fn run_staged<G>(validator: &FeasibilityValidator<'_, G>, plan: &StagePlan) -> StagedReport
where
    G: TileGrid + ?Sized,
{
    let table = validator.abilities();
    let mut abilities = AbilityState::none();
    let mut granted: Vec<&str> = Vec::new();
    let mut summary = Vec::new();
    let mut detail = Vec::new();

    for (index, stage) in plan.stages.iter().enumerate() {
        let name = table.ability_name(stage.ability);
        let previous = if granted.is_empty() {
            "base".to_owned()
        } else {
            granted.join(", ")
        };
        let label = format!("Stage {index} ({previous})");
        let objectives: Vec<ObjectiveTarget> = stage
            .target
            .map(|coord| ObjectiveTarget::new(format!("{name} cache"), coord))
            .into_iter()
            .collect();

        let report = validator.run_single_stage(abilities, &objectives, &label);
        summary.push(format!("{} {label}", report.status.marker()));
        detail.extend(report.lines);

        abilities.unlock(stage.ability);
        granted.push(name);
    }

    let finals: Vec<ObjectiveTarget> = plan
        .boss
        .map(|coord| ObjectiveTarget::new(FINAL_TARGET_LABEL, coord))
        .into_iter()
        .collect();
    let report = validator.run_single_stage(table.all_unlocked(), &finals, FINAL_STAGE_LABEL);
    summary.push(format!("{} {FINAL_STAGE_LABEL}", report.status.marker()));
    detail.extend(report.lines);

    let status = if summary.iter().all(|line| line.starts_with(PASS_MARKER)) {
        Status::Pass
    } else {
        Status::Fail
    };

    StagedReport {
        status,
        summary,
        detail,
    }
}
