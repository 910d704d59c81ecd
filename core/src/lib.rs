#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the traversal validation engine.
//!
//! This crate defines the data surface that connects the authoritative level,
//! the pure validation systems, and adapters. The level exposes its tiles
//! through the [`TileGrid`] trait and its points of interest through
//! [`PointsOfInterest`]; systems derive a traversal graph from those views and
//! answer with [`StageReport`] and [`StagedReport`] values. Nothing in this
//! crate holds long-lived mutable state.

use std::fmt;

use serde::{Deserialize, Serialize};

mod ability;
mod movement;
mod repair;

pub use ability::{AbilityDescriptor, AbilityId, AbilityState, AbilityTable, MAX_ABILITIES};
pub use movement::{MovementConstants, PlayerStats};
pub use repair::{FixKind, RepairFix, RepairPlan, TileChange, TilePatch};

/// Marker that opens every passing report line.
pub const PASS_MARKER: &str = "✓";

/// Marker that opens every failing report line.
pub const FAIL_MARKER: &str = "✗";

/// Glyph reported for tiles outside the grid.
pub const OUT_OF_BOUNDS_GLYPH: char = '#';

/// Location of a single tile expressed as signed column and row indices.
///
/// Coordinates may point outside the grid; such tiles read as solid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    tx: i32,
    ty: i32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(tx: i32, ty: i32) -> Self {
        Self { tx, ty }
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn tx(&self) -> i32 {
        self.tx
    }

    /// Zero-based row index, growing downwards.
    #[must_use]
    pub const fn ty(&self) -> i32 {
        self.ty
    }

    /// Coordinate shifted by the provided tile delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.tx + dx, self.ty + dy)
    }

    /// Computes the Manhattan distance between two tile coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.tx.abs_diff(other.tx) + self.ty.abs_diff(other.ty)
    }

    /// Tile-space Euclidean distance between two coordinates.
    #[must_use]
    pub fn euclidean_distance(self, other: TileCoord) -> f64 {
        let dx = f64::from(self.tx - other.tx);
        let dy = f64::from(self.ty - other.ty);
        dx.hypot(dy)
    }

    /// Canonical `"tx,ty"` key used in report text.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.tx, self.ty)
    }
}

/// Position in world space, measured in the same units as the tile size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal world coordinate.
    pub x: f64,
    /// Vertical world coordinate, growing downwards.
    pub y: f64,
}

impl WorldPoint {
    /// Creates a new world-space point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Centre of the provided tile in world space.
    #[must_use]
    pub fn tile_centre(coord: TileCoord, tile_size: f64) -> Self {
        Self::new(
            f64::from(coord.tx()) * tile_size + tile_size / 2.0,
            f64::from(coord.ty()) * tile_size + tile_size / 2.0,
        )
    }

    /// Tile containing the point, using `floor(coord / tile_size)` per axis.
    #[must_use]
    pub fn tile(&self, tile_size: f64) -> TileCoord {
        TileCoord::new(
            (self.x / tile_size).floor() as i32,
            (self.y / tile_size).floor() as i32,
        )
    }
}

/// Extra switches for solidity queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolidityOptions {
    /// Treat one-way platforms as passable.
    pub ignore_one_way: bool,
}

/// Read-only access to a rectangular tile grid.
///
/// Implementations must report every tile outside `[0, columns) × [0, rows)`
/// as solid, and every ability-gate tile as solid exactly while its ability is
/// locked.
pub trait TileGrid {
    /// Number of tile columns.
    fn columns(&self) -> u32;

    /// Number of tile rows.
    fn rows(&self) -> u32;

    /// Side length of a square tile in world units.
    fn tile_size(&self) -> f64;

    /// Glyph stored at the tile, or [`OUT_OF_BOUNDS_GLYPH`] outside the grid.
    fn glyph(&self, coord: TileCoord) -> char;

    /// Solidity of the tile under the provided abilities and options.
    fn is_solid_with(
        &self,
        coord: TileCoord,
        abilities: AbilityState,
        options: SolidityOptions,
    ) -> bool;

    /// Ability that opens the gate at the tile, if the tile is an ability gate.
    fn gate_ability(&self, coord: TileCoord) -> Option<AbilityId>;

    /// Solidity of the tile with default options.
    fn is_solid(&self, coord: TileCoord, abilities: AbilityState) -> bool {
        self.is_solid_with(coord, abilities, SolidityOptions::default())
    }

    /// Reports whether the coordinate lies inside the grid.
    fn contains(&self, coord: TileCoord) -> bool {
        coord.tx() >= 0
            && coord.ty() >= 0
            && u32::try_from(coord.tx()).is_ok_and(|tx| tx < self.columns())
            && u32::try_from(coord.ty()).is_ok_and(|ty| ty < self.rows())
    }
}

/// Ability pickup placed in the level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityPickup {
    /// Ability granted by the pickup.
    pub ability: AbilityId,
    /// World-space location of the pickup.
    pub point: WorldPoint,
}

/// Ability gate placed in the level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AbilityGate {
    /// Ability that opens the gate.
    pub ability: AbilityId,
    /// World-space location of the gate.
    pub point: WorldPoint,
}

/// Ordered collections of interesting locations extracted from a level.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointsOfInterest {
    /// Save points.
    pub saves: Vec<WorldPoint>,
    /// Shops.
    pub shops: Vec<WorldPoint>,
    /// Ability pickups.
    pub ability_pickups: Vec<AbilityPickup>,
    /// Health and vitality upgrades.
    pub vitality: Vec<WorldPoint>,
    /// Grapple anchors.
    pub anchors: Vec<WorldPoint>,
    /// Ability-gated passages.
    pub gates: Vec<AbilityGate>,
    /// Entrance to the boss arena, if the level has one.
    pub boss_gate: Option<WorldPoint>,
}

impl PointsOfInterest {
    /// Location of the pickup granting the provided ability.
    #[must_use]
    pub fn pickup_for(&self, ability: AbilityId) -> Option<WorldPoint> {
        self.ability_pickups
            .iter()
            .find(|pickup| pickup.ability == ability)
            .map(|pickup| pickup.point)
    }
}

/// Named tile whose reachability should be verified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveTarget {
    /// Free-form label used only in report text.
    pub label: String,
    /// Tile that must be reachable.
    #[serde(flatten)]
    pub coord: TileCoord,
}

impl ObjectiveTarget {
    /// Creates a new objective.
    #[must_use]
    pub fn new(label: impl Into<String>, coord: TileCoord) -> Self {
        Self {
            label: label.into(),
            coord,
        }
    }
}

/// Outcome of a validation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    /// Every checked objective was satisfied.
    Pass,
    /// At least one objective failed.
    Fail,
}

impl Status {
    /// Reports whether the status is [`Status::Pass`].
    #[must_use]
    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Line marker matching the status.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Pass => PASS_MARKER,
            Self::Fail => FAIL_MARKER,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Dense set of reached tiles, indexed row-major over the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReachableSet {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
    len: usize,
}

impl ReachableSet {
    /// Creates an empty set sized for the provided grid dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![false; count],
            len: 0,
        }
    }

    /// Adds the tile, returning `true` when it was not yet present.
    ///
    /// Tiles outside the grid are never stored.
    pub fn insert(&mut self, coord: TileCoord) -> bool {
        let Some(index) = self.index(coord) else {
            return false;
        };
        if self.cells[index] {
            return false;
        }
        self.cells[index] = true;
        self.len += 1;
        true
    }

    /// Reports whether the tile was reached.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        self.index(coord).is_some_and(|index| self.cells[index])
    }

    /// Number of reached tiles.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether nothing was reached.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reached tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let columns = self.columns.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, reached)| **reached)
            .map(move |(index, _)| {
                TileCoord::new((index % columns) as i32, (index / columns) as i32)
            })
    }

    /// Reached tiles formatted as `"tx,ty"` keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|coord| coord.key()).collect()
    }

    fn index(&self, coord: TileCoord) -> Option<usize> {
        let column = u32::try_from(coord.tx()).ok()?;
        let row = u32::try_from(coord.ty()).ok()?;
        if column >= self.columns || row >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        Some(usize::try_from(row).ok()? * width + usize::try_from(column).ok()?)
    }
}

/// Result of validating a set of objectives under one ability state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageReport {
    /// Overall outcome.
    pub status: Status,
    /// One line per objective plus indented diagnostic sub-lines.
    pub lines: Vec<String>,
    /// Every tile reached from the spawn.
    pub reachable: ReachableSet,
}

/// Result of validating the full ability progression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedReport {
    /// Pass iff every stage passed.
    pub status: Status,
    /// One line per stage.
    pub summary: Vec<String>,
    /// Concatenated per-stage lines.
    pub detail: Vec<String>,
}

/// Common view over single-stage and staged reports.
pub trait ValidationOutcome {
    /// Overall outcome of the run.
    fn status(&self) -> Status;

    /// Consumes the report, yielding its human-readable lines.
    fn into_lines(self) -> Vec<String>;
}

impl ValidationOutcome for StageReport {
    fn status(&self) -> Status {
        self.status
    }

    fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl ValidationOutcome for StagedReport {
    fn status(&self) -> Status {
        self.status
    }

    fn into_lines(self) -> Vec<String> {
        let mut lines = self.summary;
        lines.extend(self.detail);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectiveTarget, ReachableSet, Status, TileCoord, WorldPoint};
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(-2, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn tile_key_uses_comma_separator() {
        assert_eq!(TileCoord::new(12, -3).key(), "12,-3");
    }

    #[test]
    fn world_points_snap_with_floor() {
        assert_eq!(WorldPoint::new(63.9, 32.0).tile(32.0), TileCoord::new(1, 1));
        assert_eq!(WorldPoint::new(-0.5, 10.0).tile(32.0), TileCoord::new(-1, 0));
        let centre = WorldPoint::tile_centre(TileCoord::new(2, 3), 32.0);
        assert_eq!(centre, WorldPoint::new(80.0, 112.0));
        assert_eq!(centre.tile(32.0), TileCoord::new(2, 3));
    }

    #[test]
    fn reachable_set_ignores_out_of_bounds_and_duplicates() {
        let mut set = ReachableSet::new(3, 2);
        assert!(set.insert(TileCoord::new(2, 1)));
        assert!(!set.insert(TileCoord::new(2, 1)));
        assert!(!set.insert(TileCoord::new(3, 0)));
        assert!(!set.insert(TileCoord::new(-1, 0)));
        assert!(set.insert(TileCoord::new(0, 0)));

        assert_eq!(set.len(), 2);
        assert_eq!(set.keys(), vec!["0,0".to_owned(), "2,1".to_owned()]);
        assert!(!set.contains(TileCoord::new(1, 1)));
    }

    #[test]
    fn tile_coord_round_trips_through_bincode() {
        assert_round_trip(&TileCoord::new(7, 9));
    }

    #[test]
    fn status_round_trips_through_bincode() {
        assert_round_trip(&Status::Fail);
    }

    #[test]
    fn objective_reads_flat_coordinates() {
        let objective: ObjectiveTarget =
            serde_json::from_str(r#"{ "label": "exit", "tx": 4, "ty": 2 }"#)
                .expect("objective parses");
        assert_eq!(objective, ObjectiveTarget::new("exit", TileCoord::new(4, 2)));
    }
}
