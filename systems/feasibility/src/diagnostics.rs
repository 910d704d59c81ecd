//! Classification of unreachable objectives.

use std::fmt;

use traverse_core::{AbilityState, AbilityTable, TileCoord, TileGrid};

use crate::profile::MovementProfile;

/// Movement limit that most plausibly blocks an objective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// Nothing is reachable from the spawn.
    NoReachableNodes,
    /// The objective sits on a gate whose ability is still locked.
    GateRequires(String),
    /// The climb exceeds the maximum jump height.
    JumpTooHigh,
    /// The fall exceeds the maximum survivable drop.
    DropTooFar,
    /// The horizontal distance exceeds the jump reach.
    GapTooWide,
    /// The move fits the envelope but geometry is in the way.
    BlockedTrajectory,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoReachableNodes => write!(f, "no reachable nodes"),
            Self::GateRequires(ability) => write!(f, "gate requires {ability}"),
            Self::JumpTooHigh => write!(f, "jump height too high"),
            Self::DropTooFar => write!(f, "drop too far"),
            Self::GapTooWide => write!(f, "gap too wide"),
            Self::BlockedTrajectory => write!(f, "blocked trajectory"),
        }
    }
}

/// Broad area a level author should look at to resolve a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Suggestion {
    /// Move or add geometry.
    Layout,
    /// Move geometry or retune the movement constants.
    LayoutOrPhysics,
    /// Grant the gating ability earlier in the progression.
    AbilityOrder,
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout => write!(f, "layout"),
            Self::LayoutOrPhysics => write!(f, "layout or physics constants"),
            Self::AbilityOrder => write!(f, "ability order"),
        }
    }
}

/// Explanation attached to an unreachable objective.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnosis {
    /// Reachable node closest to the objective, if any node was reached.
    pub nearest: Option<TileCoord>,
    /// Blocking constraint.
    pub constraint: Constraint,
    /// Suggested remediation area.
    pub suggestion: Suggestion,
}

/// Classifies why `target` could not be reached from `nearest`.
///
/// The first matching rule wins: no reachable node, a locked gate on the
/// target tile, then the jump height, drop and gap limits of the profile.
#[must_use]
pub fn diagnose<G>(
    grid: &G,
    table: &AbilityTable,
    profile: &MovementProfile,
    abilities: AbilityState,
    nearest: Option<TileCoord>,
    target: TileCoord,
) -> Diagnosis
where
    G: TileGrid + ?Sized,
{
    let Some(from) = nearest else {
        return Diagnosis {
            nearest,
            constraint: Constraint::NoReachableNodes,
            suggestion: Suggestion::Layout,
        };
    };

    let (constraint, suggestion) = classify(grid, table, profile, abilities, from, target);
    Diagnosis {
        nearest,
        constraint,
        suggestion,
    }
}

fn classify<G>(
    grid: &G,
    table: &AbilityTable,
    profile: &MovementProfile,
    abilities: AbilityState,
    from: TileCoord,
    target: TileCoord,
) -> (Constraint, Suggestion)
where
    G: TileGrid + ?Sized,
{
    if let Some(ability) = grid.gate_ability(target) {
        if !abilities.has(ability) {
            let name = table.ability_name(ability).to_owned();
            return (Constraint::GateRequires(name), Suggestion::AbilityOrder);
        }
    }

    let dx = (target.tx() - from.tx()).abs();
    let dy = target.ty() - from.ty();
    if dy < -profile.max_jump_height {
        (Constraint::JumpTooHigh, Suggestion::LayoutOrPhysics)
    } else if dy > profile.max_drop_distance {
        (Constraint::DropTooFar, Suggestion::Layout)
    } else if dx > profile.max_jump_distance {
        (Constraint::GapTooWide, Suggestion::LayoutOrPhysics)
    } else {
        (Constraint::BlockedTrajectory, Suggestion::Layout)
    }
}
