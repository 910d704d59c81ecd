#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Auto-repair loop that applies pre-authored fixes until validation passes.
//!
//! The loop never invents fixes. It walks the plan's fix list in order,
//! applies the first fix not yet used in this session, asks the target to
//! refresh its caches, and validates again. The number of validator calls is
//! bounded by the attempt budget plus the initial run.

use std::collections::BTreeSet;

use traverse_core::{
    FixKind, MovementConstants, RepairPlan, Status, TileCoord, TilePatch, ValidationOutcome,
    FAIL_MARKER,
};
use traverse_level::{self as level, Level, LevelCommand};

/// Attempt budget used when the caller does not pick one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Line appended when the loop gives up on a failing report.
pub const HARD_FAIL_LINE: &str = "Auto-repair exceeded attempts.";

/// Prefix of every repair log line merged into a report.
pub const LOG_PREFIX: &str = "↺";

/// Mutable state the repair loop is allowed to touch.
pub trait RepairTarget {
    /// Writes every change of the patch into the tile grid.
    fn apply_tile_patch(&mut self, patch: &TilePatch);

    /// Movement constants that tweak fixes overwrite.
    fn constants_mut(&mut self) -> &mut MovementConstants;

    /// Rebuilds caches derived from the tile grid.
    fn refresh(&mut self);

    /// Moves the player spawn to the tile.
    fn move_spawn(&mut self, tile: TileCoord);
}

/// Level and constants borrowed for one repair session.
#[derive(Debug)]
pub struct RepairSubject<'a> {
    level: &'a mut Level,
    constants: &'a mut MovementConstants,
    events: Vec<level::LevelEvent>,
}

impl<'a> RepairSubject<'a> {
    /// Borrows the level and constants a repair session mutates.
    pub fn new(level: &'a mut Level, constants: &'a mut MovementConstants) -> Self {
        Self {
            level,
            constants,
            events: Vec::new(),
        }
    }

    /// Current level state.
    #[must_use]
    pub fn level(&self) -> &Level {
        &*self.level
    }

    /// Current movement constants.
    #[must_use]
    pub fn constants(&self) -> &MovementConstants {
        &*self.constants
    }

    /// Level events emitted by every mutation so far.
    #[must_use]
    pub fn events(&self) -> &[level::LevelEvent] {
        &self.events
    }
}

impl RepairTarget for RepairSubject<'_> {
    fn apply_tile_patch(&mut self, patch: &TilePatch) {
        level::apply(
            self.level,
            LevelCommand::ApplyPatch {
                patch: patch.clone(),
            },
            &mut self.events,
        );
    }

    fn constants_mut(&mut self) -> &mut MovementConstants {
        &mut *self.constants
    }

    fn refresh(&mut self) {
        level::apply(self.level, LevelCommand::RebuildCaches, &mut self.events);
    }

    fn move_spawn(&mut self, tile: TileCoord) {
        level::apply(self.level, LevelCommand::MoveSpawn { tile }, &mut self.events);
    }
}

/// Final outcome of a repair session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepairReport {
    /// Status of the last validation run.
    pub status: Status,
    /// Lines of the last report, followed by the hard-fail line and the
    /// prefixed repair log.
    pub lines: Vec<String>,
    /// Set when validation still failed after the loop stopped.
    pub hard_fail: bool,
    /// Fix and patch identifiers applied, in application order.
    pub applied_fixes: Vec<String>,
    /// Unprefixed repair log.
    pub logs: Vec<String>,
}

/// Repair session over one [`RepairPlan`].
#[derive(Clone, Debug, Default)]
pub struct AutoRepair {
    plan: RepairPlan,
    applied: BTreeSet<String>,
    order: Vec<String>,
    logs: Vec<String>,
}

impl AutoRepair {
    /// Starts a session with nothing applied.
    #[must_use]
    pub fn new(plan: RepairPlan) -> Self {
        Self {
            plan,
            ..Self::default()
        }
    }

    /// Plan the session draws fixes from.
    #[must_use]
    pub fn plan(&self) -> &RepairPlan {
        &self.plan
    }

    /// Identifiers applied so far, in application order.
    #[must_use]
    pub fn applied(&self) -> &[String] {
        &self.order
    }

    /// Repair log accumulated so far.
    #[must_use]
    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Applies the plan's movement tweaks and every tile patch.
    ///
    /// Clears the log first. Does nothing while the plan is disabled.
    pub fn apply_persistent_patches<T>(&mut self, target: &mut T)
    where
        T: RepairTarget + ?Sized,
    {
        self.logs.clear();
        if !self.plan.enabled {
            return;
        }

        let tweaks = self.plan.movement_tweaks.clone();
        self.apply_movement_tweaks(target, tweaks.iter());

        if self.plan.tile_patches.is_empty() {
            return;
        }
        let patches = self.plan.tile_patches.clone();
        for patch in &patches {
            self.apply_patch(target, patch);
        }
        target.refresh();
    }

    /// Moves the spawn to the plan's override tile.
    ///
    /// Returns `false` when the plan is disabled or carries no override.
    pub fn apply_spawn_override<T>(&mut self, target: &mut T) -> bool
    where
        T: RepairTarget + ?Sized,
    {
        if !self.plan.enabled {
            return false;
        }
        let Some(tile) = self.plan.spawn_override else {
            return false;
        };
        target.move_spawn(tile);
        self.logs.push(format!("Applied spawn override to {tile}."));
        true
    }

    /// Repairs the target until validation passes or the budget runs out.
    ///
    /// Stops early when no unapplied fix remains. The validator runs at most
    /// `max_attempts + 1` times and no fix is applied twice.
    pub fn run_repair_loop<T, R, F>(
        &mut self,
        target: &mut T,
        max_attempts: u32,
        mut validate: F,
    ) -> RepairReport
    where
        T: RepairTarget + ?Sized,
        R: ValidationOutcome,
        F: FnMut(&T) -> R,
    {
        let mut report = validate(&*target);
        let mut attempt = 0;
        while !report.status().is_pass() && attempt < max_attempts {
            if !self.apply_next_fix(target) {
                break;
            }
            target.refresh();
            report = validate(&*target);
            attempt += 1;
        }

        let status = report.status();
        let hard_fail = !status.is_pass();
        let mut lines = report.into_lines();
        if hard_fail {
            lines.push(format!("{FAIL_MARKER} {HARD_FAIL_LINE}"));
        }
        lines.extend(self.logs.iter().map(|line| format!("{LOG_PREFIX} {line}")));

        RepairReport {
            status,
            lines,
            hard_fail,
            applied_fixes: self.order.clone(),
            logs: self.logs.clone(),
        }
    }

    fn apply_next_fix<T>(&mut self, target: &mut T) -> bool
    where
        T: RepairTarget + ?Sized,
    {
        let Some(fix) = self
            .plan
            .auto_fixes
            .iter()
            .find(|fix| !self.applied.contains(&fix.id))
            .cloned()
        else {
            return false;
        };

        match &fix.kind {
            FixKind::TilePatch { patch } => {
                let Some(patch) = self.plan.patch(patch).cloned() else {
                    return false;
                };
                self.apply_patch(target, &patch);
            }
            FixKind::MovementTweaks { values } => {
                self.apply_movement_tweaks(target, values.iter());
            }
        }
        self.mark_applied(&fix.id);
        true
    }

    fn apply_patch<T>(&mut self, target: &mut T, patch: &TilePatch)
    where
        T: RepairTarget + ?Sized,
    {
        if patch.changes.is_empty() || self.applied.contains(&patch.id) {
            return;
        }
        target.apply_tile_patch(patch);
        self.mark_applied(&patch.id);
        self.logs.push(format!("Patch applied: {}", patch.id));
    }

    fn apply_movement_tweaks<'t, T, I>(&mut self, target: &mut T, tweaks: I)
    where
        T: RepairTarget + ?Sized,
        I: Iterator<Item = (&'t String, &'t f64)>,
    {
        let constants = target.constants_mut();
        for (name, value) in tweaks {
            if constants.set(name, *value) {
                self.logs.push(format!("Movement tweak: {name} -> {value}"));
            }
        }
    }

    fn mark_applied(&mut self, id: &str) {
        if self.applied.insert(id.to_owned()) {
            self.order.push(id.to_owned());
        }
    }
}

/// Copy of the plan with the override set and the plan enabled.
#[must_use]
pub fn with_spawn_override(plan: &RepairPlan, spawn_override: Option<TileCoord>) -> RepairPlan {
    let mut plan = plan.clone();
    if spawn_override.is_some() {
        plan.spawn_override = spawn_override;
    }
    plan.enabled = true;
    plan
}

/// Renders the plan as pretty JSON with patches and fixes sorted by id.
///
/// Movement tweaks are already keyed in sorted order.
pub fn serialize_plan(plan: &RepairPlan) -> Result<String, serde_json::Error> {
    let mut sorted = plan.clone();
    sorted.tile_patches.sort_by(|a, b| a.id.cmp(&b.id));
    sorted.auto_fixes.sort_by(|a, b| a.id.cmp(&b.id));
    serde_json::to_string_pretty(&sorted)
}

#[cfg(test)]
mod tests {
    use super::{serialize_plan, with_spawn_override};
    use traverse_core::{RepairPlan, TileCoord, TilePatch};

    #[test]
    fn serialised_plan_orders_patches_and_fixes() {
        let plan: RepairPlan = serde_json::from_str(
            r#"{
                "tilePatches": [{ "id": "zeta" }, { "id": "alpha" }],
                "movementTweaks": { "gravity": 1400, "baseSpeed": 250 },
                "autoFixes": [
                    { "id": "fix-b", "type": "tilePatch", "ref": "zeta" },
                    { "id": "fix-a", "type": "tilePatch", "ref": "alpha" }
                ]
            }"#,
        )
        .expect("plan parses");

        let text = serialize_plan(&plan).expect("plan serialises");
        let alpha = text.find("\"alpha\"").expect("alpha present");
        let zeta = text.find("\"zeta\"").expect("zeta present");
        let fix_a = text.find("\"fix-a\"").expect("fix-a present");
        let fix_b = text.find("\"fix-b\"").expect("fix-b present");
        let speed = text.find("\"baseSpeed\"").expect("baseSpeed present");
        let gravity = text.find("\"gravity\"").expect("gravity present");
        assert!(alpha < zeta);
        assert!(fix_a < fix_b);
        assert!(speed < gravity);

        let restored: RepairPlan = serde_json::from_str(&text).expect("output parses");
        assert_eq!(restored.tile_patches[0].id, "alpha");
        assert_eq!(restored.auto_fixes[0].id, "fix-a");
    }

    #[test]
    fn override_enables_the_plan() {
        let plan = RepairPlan {
            tile_patches: vec![TilePatch {
                id: "p".to_owned(),
                changes: Vec::new(),
            }],
            ..RepairPlan::default()
        };

        let updated = with_spawn_override(&plan, Some(TileCoord::new(3, 4)));
        assert!(updated.enabled);
        assert_eq!(updated.spawn_override, Some(TileCoord::new(3, 4)));
        assert_eq!(updated.tile_patches, plan.tile_patches);

        let kept = with_spawn_override(&updated, None);
        assert_eq!(kept.spawn_override, Some(TileCoord::new(3, 4)));
    }
}
