#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn validity gate run before feasibility validation.
//!
//! A spawn is accepted when the player can stand on it without overlapping
//! solid tiles. Otherwise the gate searches outward for the closest standable
//! tile and proposes it as a spawn override.

use std::{collections::VecDeque, fmt};

use traverse_core::{
    AbilityState, PlayerStats, Status, TileCoord, TileGrid, WorldPoint, FAIL_MARKER,
    PASS_MARKER,
};

/// Minimum number of clear tiles required above a standable tile.
pub const MIN_CLEARANCE_TILES: i32 = 2;

/// Why a spawn point was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnProblem {
    /// The spawn tile is solid, floats in the air, or lacks headroom.
    NotStandable,
    /// The player's body overlaps a solid tile at the exact spawn point.
    Collision,
}

impl fmt::Display for SpawnProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStandable => write!(f, "tile not standable"),
            Self::Collision => write!(f, "collision at spawn"),
        }
    }
}

/// Result of checking a spawn point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpawnReport {
    /// Pass when the spawn is valid as placed.
    pub status: Status,
    /// Human-readable outcome lines.
    pub lines: Vec<String>,
    /// Rejection reason, if the spawn was rejected.
    pub problem: Option<SpawnProblem>,
    /// Closest standable tile when the spawn was rejected.
    pub suggested_override: Option<TileCoord>,
}

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
struct BodyRect {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl BodyRect {
    fn centred(point: WorldPoint, width: f64, height: f64) -> Self {
        Self {
            left: point.x - width / 2.0,
            top: point.y - height / 2.0,
            width,
            height,
        }
    }
}

/// Checks the spawn point and proposes an override when it is invalid.
#[must_use]
pub fn check_spawn<G>(
    grid: &G,
    spawn: WorldPoint,
    player: &PlayerStats,
    abilities: AbilityState,
) -> SpawnReport
where
    G: TileGrid + ?Sized,
{
    let Some(problem) = spawn_problem(grid, spawn, player, abilities) else {
        return SpawnReport {
            status: Status::Pass,
            lines: vec![
                format!("{PASS_MARKER} Spawn valid and standable."),
                format!("{PASS_MARKER} World validity pass."),
            ],
            problem: None,
            suggested_override: None,
        };
    };

    let start = spawn.tile(grid.tile_size());
    let suggested_override = find_nearest_standable(grid, start, player, abilities);
    let mut lines = vec![format!("{FAIL_MARKER} Spawn invalid: {problem}.")];
    match suggested_override {
        Some(tile) => lines.push(format!("  Suggested spawn override: {tile}.")),
        None => lines.push("  No standable fallback found for spawn override.".to_owned()),
    }

    SpawnReport {
        status: Status::Fail,
        lines,
        problem: Some(problem),
        suggested_override,
    }
}

fn spawn_problem<G>(
    grid: &G,
    spawn: WorldPoint,
    player: &PlayerStats,
    abilities: AbilityState,
) -> Option<SpawnProblem>
where
    G: TileGrid + ?Sized,
{
    let tile = spawn.tile(grid.tile_size());
    if !is_standable(grid, tile, player, abilities) {
        return Some(SpawnProblem::NotStandable);
    }
    let body = BodyRect::centred(spawn, player.width, player.height);
    if intersects_solid(grid, body, abilities) {
        return Some(SpawnProblem::Collision);
    }
    None
}

/// Reports whether the player can stand on the tile.
///
/// The tile must be open with solid ground below, the player's body centred
/// on the tile must not overlap anything solid, and the tiles above must be
/// clear for at least the body height.
#[must_use]
pub fn is_standable<G>(
    grid: &G,
    tile: TileCoord,
    player: &PlayerStats,
    abilities: AbilityState,
) -> bool
where
    G: TileGrid + ?Sized,
{
    if grid.is_solid(tile, abilities) || !grid.is_solid(tile.offset(0, 1), abilities) {
        return false;
    }

    let tile_size = grid.tile_size();
    let centre = WorldPoint::tile_centre(tile, tile_size);
    if intersects_solid(grid, BodyRect::centred(centre, player.width, player.height), abilities) {
        return false;
    }

    let clearance = MIN_CLEARANCE_TILES.max((player.height / tile_size).ceil() as i32);
    (1..=clearance).all(|dy| !grid.is_solid(tile.offset(0, -dy), abilities))
}

/// Closest standable tile found by a breadth-first flood from `start`.
///
/// The flood stays inside the grid and gives up after visiting as many tiles
/// as the grid holds.
#[must_use]
pub fn find_nearest_standable<G>(
    grid: &G,
    start: TileCoord,
    player: &PlayerStats,
    abilities: AbilityState,
) -> Option<TileCoord>
where
    G: TileGrid + ?Sized,
{
    let columns = usize::try_from(grid.columns()).ok()?;
    let rows = usize::try_from(grid.rows()).ok()?;
    let max_steps = columns.checked_mul(rows)?;
    let mut visited = vec![false; max_steps];
    let index = |coord: TileCoord| -> Option<usize> {
        if !grid.contains(coord) {
            return None;
        }
        Some(usize::try_from(coord.ty()).ok()? * columns + usize::try_from(coord.tx()).ok()?)
    };

    let mut queue = VecDeque::new();
    if let Some(slot) = index(start) {
        visited[slot] = true;
    }
    queue.push_back(start);

    let mut steps = 0;
    while steps < max_steps {
        let Some(tile) = queue.pop_front() else {
            break;
        };
        if is_standable(grid, tile, player, abilities) {
            return Some(tile);
        }
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let next = tile.offset(dx, dy);
            let Some(slot) = index(next) else {
                continue;
            };
            if !visited[slot] {
                visited[slot] = true;
                queue.push_back(next);
            }
        }
        steps += 1;
    }
    None
}

fn intersects_solid<G>(grid: &G, body: BodyRect, abilities: AbilityState) -> bool
where
    G: TileGrid + ?Sized,
{
    let tile_size = grid.tile_size();
    let first_column = (body.left / tile_size).floor() as i32;
    let last_column = ((body.left + body.width) / tile_size).floor() as i32;
    let first_row = (body.top / tile_size).floor() as i32;
    let last_row = ((body.top + body.height) / tile_size).floor() as i32;

    (first_row..=last_row).any(|ty| {
        (first_column..=last_column).any(|tx| grid.is_solid(TileCoord::new(tx, ty), abilities))
    })
}
