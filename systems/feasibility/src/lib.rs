#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure feasibility system that decides whether objectives are reachable.
//!
//! Every call derives a [`MovementProfile`] from the caller's constants and
//! ability flags, scans the level into a [`TraversalGraph`], and walks it
//! breadth-first from the spawn. Nothing is cached between calls; the graph
//! lives exactly as long as one validation pass.

use std::fmt;

use traverse_core::{
    AbilityState, AbilityTable, MovementConstants, ObjectiveTarget, PlayerStats,
    PointsOfInterest, ReachableSet, StageReport, Status, TileCoord, TileGrid, WorldPoint,
    FAIL_MARKER, PASS_MARKER,
};
use traverse_level::Level;

pub mod arc;
pub mod diagnostics;
pub mod graph;
pub mod profile;
pub mod search;

pub use arc::ArcSimulator;
pub use diagnostics::{diagnose, Constraint, Diagnosis, Suggestion};
pub use graph::{Node, NodeIndex, NodeKind, TraversalGraph};
pub use profile::MovementProfile;

/// Reason a path could not be planned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlanFailure {
    /// The graph has no node near either endpoint.
    NoNodesNearby,
    /// Both endpoints resolved but no route connects them.
    TargetUnreachable,
}

impl fmt::Display for PlanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoNodesNearby => write!(f, "no nodes nearby"),
            Self::TargetUnreachable => write!(f, "target unreachable"),
        }
    }
}

/// Outcome of a point-to-point path query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathPlan {
    /// Route found, listed from the start node to the target node.
    Found {
        /// Visited tiles in travel order.
        path: Vec<TileCoord>,
    },
    /// No route exists.
    Failed {
        /// Why planning failed.
        reason: PlanFailure,
        /// Diagnosis of the target relative to what the start can reach.
        diagnosis: Diagnosis,
    },
}

impl PathPlan {
    /// Pass when a route was found.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Found { .. } => Status::Pass,
            Self::Failed { .. } => Status::Fail,
        }
    }
}

/// Read-only view over everything a validation pass consumes.
#[derive(Debug)]
pub struct FeasibilityValidator<'a, G: ?Sized> {
    grid: &'a G,
    points: &'a PointsOfInterest,
    table: &'a AbilityTable,
    constants: &'a MovementConstants,
    player: &'a PlayerStats,
    spawn: WorldPoint,
}

impl<'a> FeasibilityValidator<'a, Level> {
    /// Validator over a level, spawning at the level's spawn tile.
    #[must_use]
    pub fn for_level(
        level: &'a Level,
        constants: &'a MovementConstants,
        player: &'a PlayerStats,
    ) -> Self {
        Self::new(
            level,
            level.points_of_interest(),
            level.abilities(),
            constants,
            player,
            level.spawn_point(),
        )
    }
}

impl<'a, G> FeasibilityValidator<'a, G>
where
    G: TileGrid + ?Sized,
{
    /// Creates a validator over an arbitrary tile grid.
    #[must_use]
    pub const fn new(
        grid: &'a G,
        points: &'a PointsOfInterest,
        table: &'a AbilityTable,
        constants: &'a MovementConstants,
        player: &'a PlayerStats,
        spawn: WorldPoint,
    ) -> Self {
        Self {
            grid,
            points,
            table,
            constants,
            player,
            spawn,
        }
    }

    /// Ability vocabulary used for names and bonuses.
    #[must_use]
    pub const fn abilities(&self) -> &'a AbilityTable {
        self.table
    }

    /// Tile containing the spawn point.
    #[must_use]
    pub fn spawn_tile(&self) -> TileCoord {
        self.spawn.tile(self.grid.tile_size())
    }

    /// Movement envelope under the provided ability flags.
    #[must_use]
    pub fn movement_profile(&self, abilities: AbilityState) -> MovementProfile {
        MovementProfile::compute(
            self.constants,
            self.player,
            self.table,
            abilities,
            self.grid.tile_size(),
        )
    }

    /// Builds the traversal graph for the provided ability flags.
    #[must_use]
    pub fn build_graph(&self, abilities: AbilityState) -> TraversalGraph {
        let profile = self.movement_profile(abilities);
        self.graph_with(&profile, abilities)
    }

    fn graph_with(&self, profile: &MovementProfile, abilities: AbilityState) -> TraversalGraph {
        let arc = ArcSimulator::new(profile, self.constants, self.grid.tile_size());
        TraversalGraph::build(self.grid, self.points, abilities, &arc)
    }

    /// Every tile reachable from the spawn under the provided ability flags.
    #[must_use]
    pub fn reachable(&self, abilities: AbilityState) -> ReachableSet {
        let graph = self.build_graph(abilities);
        let start = search::resolve_start(&graph, self.spawn_tile());
        search::reachable_from(&graph, start)
    }

    /// Checks every objective against one ability state.
    ///
    /// Objectives are reported in the order given; each failure carries its
    /// stage label, the nearest reached node, and a diagnosis.
    #[must_use]
    pub fn run_single_stage(
        &self,
        abilities: AbilityState,
        objectives: &[ObjectiveTarget],
        stage_label: &str,
    ) -> StageReport {
        let profile = self.movement_profile(abilities);
        let graph = self.graph_with(&profile, abilities);
        let start = search::resolve_start(&graph, self.spawn_tile());
        let reachable = search::reachable_from(&graph, start);

        let mut status = Status::Pass;
        let mut lines = Vec::new();
        for objective in objectives {
            if reachable.contains(objective.coord) {
                lines.push(format!("{PASS_MARKER} {} feasible", objective.label));
                continue;
            }

            status = Status::Fail;
            let nearest = graph
                .nearest(objective.coord, Some(&reachable))
                .and_then(|index| graph.node(index))
                .map(|node| node.coord);
            let diagnosis = diagnose(
                self.grid,
                self.table,
                &profile,
                abilities,
                nearest,
                objective.coord,
            );
            lines.push(format!("{FAIL_MARKER} {} unreachable", objective.label));
            lines.push(format!("  Stage: {stage_label}"));
            if let Some(nearest) = diagnosis.nearest {
                lines.push(format!("  Nearest node: {nearest}"));
            }
            lines.push(format!("  Constraint: {}", diagnosis.constraint));
            lines.push(format!("  Suggest: {}", diagnosis.suggestion));
        }

        StageReport {
            status,
            lines,
            reachable,
        }
    }

    /// Plans a route between two tiles for a path preview.
    ///
    /// Each endpoint snaps to its nearest node. On failure the target is
    /// diagnosed against the nodes reachable from the start node.
    #[must_use]
    pub fn plan_path(
        &self,
        start: TileCoord,
        target: TileCoord,
        abilities: AbilityState,
    ) -> PathPlan {
        let profile = self.movement_profile(abilities);
        let graph = self.graph_with(&profile, abilities);
        let from = graph.nearest(start, None);
        let to = graph.nearest(target, None);

        let (Some(from), Some(to)) = (from, to) else {
            let nearest = from.and_then(|index| graph.node(index)).map(|node| node.coord);
            return PathPlan::Failed {
                reason: PlanFailure::NoNodesNearby,
                diagnosis: diagnose(self.grid, self.table, &profile, abilities, nearest, target),
            };
        };

        if let Some(path) = search::route(&graph, from, to) {
            return PathPlan::Found { path };
        }

        let reachable = search::reachable_from(&graph, Some(from));
        let nearest = graph
            .nearest(target, Some(&reachable))
            .and_then(|index| graph.node(index))
            .map(|node| node.coord);
        PathPlan::Failed {
            reason: PlanFailure::TargetUnreachable,
            diagnosis: diagnose(self.grid, self.table, &profile, abilities, nearest, target),
        }
    }
}
