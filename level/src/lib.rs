#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative glyph-grid level state.
//!
//! The level owns the tile rows, the spawn tile, and the cached points of
//! interest scanned from the glyphs. Mutations go through [`apply`], which
//! reports what changed as [`LevelEvent`] values. Read access for the
//! validation systems goes through the [`TileGrid`] implementation and the
//! [`query`] module.

use thiserror::Error;
use traverse_core::{
    AbilityGate, AbilityId, AbilityPickup, AbilityState, AbilityTable, PointsOfInterest,
    SolidityOptions, TileCoord, TileGrid, TilePatch, WorldPoint, OUT_OF_BOUNDS_GLYPH,
};

mod document;
pub mod glyph;

pub use document::{LevelDocument, DEFAULT_TILE_SIZE};

/// Errors raised while constructing a level.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The document could not be parsed.
    #[error("could not parse level document: {0}")]
    Json(#[from] serde_json::Error),
    /// The grid has no rows or no columns.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A row differs in length from the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    RaggedRow {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The tile size is zero, negative, or not a number.
    #[error("tile size must be positive, got {0}")]
    NonPositiveTileSize(f64),
    /// The document names an ability table that does not exist.
    #[error("unknown ability table '{0}'")]
    UnknownAbilityTable(String),
}

/// Mutations the level accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum LevelCommand {
    /// Overwrites a single tile glyph.
    SetTile {
        /// Tile to overwrite.
        coord: TileCoord,
        /// Replacement glyph.
        glyph: char,
    },
    /// Applies every change of a tile patch.
    ApplyPatch {
        /// Patch to apply.
        patch: TilePatch,
    },
    /// Rescans the glyphs and rebuilds the points-of-interest cache.
    RebuildCaches,
    /// Moves the player spawn to the provided tile.
    MoveSpawn {
        /// New spawn tile.
        tile: TileCoord,
    },
}

/// Notifications emitted by [`apply`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    /// A tile glyph changed.
    TileChanged {
        /// Tile that changed.
        coord: TileCoord,
        /// Glyph before the change.
        from: char,
        /// Glyph after the change.
        to: char,
    },
    /// A tile patch finished applying.
    PatchApplied {
        /// Identifier of the patch.
        id: String,
        /// Number of tiles that actually changed.
        changed: usize,
    },
    /// The points-of-interest cache was rebuilt.
    CachesRebuilt,
    /// The spawn tile moved.
    SpawnMoved {
        /// New spawn tile.
        tile: TileCoord,
    },
}

/// Rectangular glyph grid plus its derived caches.
#[derive(Clone, Debug)]
pub struct Level {
    columns: u32,
    rows: u32,
    tile_size: f64,
    tiles: Vec<Vec<char>>,
    spawn: TileCoord,
    abilities: AbilityTable,
    points: PointsOfInterest,
}

impl Level {
    /// Builds a level from glyph rows.
    pub fn from_rows<S>(
        rows: &[S],
        tile_size: f64,
        abilities: AbilityTable,
    ) -> Result<Self, LevelError>
    where
        S: AsRef<str>,
    {
        if !(tile_size > 0.0) {
            return Err(LevelError::NonPositiveTileSize(tile_size));
        }

        let tiles: Vec<Vec<char>> = rows
            .iter()
            .map(|row| row.as_ref().chars().collect())
            .collect();
        let expected = tiles.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(LevelError::EmptyGrid);
        }
        if let Some((row, found)) = tiles
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != expected)
        {
            return Err(LevelError::RaggedRow {
                row,
                expected,
                found,
            });
        }

        let mut level = Self {
            columns: u32::try_from(expected).map_err(|_| LevelError::EmptyGrid)?,
            rows: u32::try_from(tiles.len()).map_err(|_| LevelError::EmptyGrid)?,
            tile_size,
            tiles,
            spawn: TileCoord::new(0, 0),
            abilities,
            points: PointsOfInterest::default(),
        };
        level.rebuild_caches();
        Ok(level)
    }

    /// Builds a level from a parsed document.
    pub fn from_document(document: &LevelDocument) -> Result<Self, LevelError> {
        let abilities = AbilityTable::by_name(&document.ability_table)
            .ok_or_else(|| LevelError::UnknownAbilityTable(document.ability_table.clone()))?;
        let mut level = Self::from_rows(&document.tiles, document.tile_size, abilities)?;
        if let Some(spawn) = document.spawn {
            level.spawn = spawn;
        }
        Ok(level)
    }

    /// Ability vocabulary the glyphs are interpreted with.
    #[must_use]
    pub fn abilities(&self) -> &AbilityTable {
        &self.abilities
    }

    /// Cached points of interest.
    #[must_use]
    pub fn points_of_interest(&self) -> &PointsOfInterest {
        &self.points
    }

    /// Tile the player spawns in.
    #[must_use]
    pub const fn spawn_tile(&self) -> TileCoord {
        self.spawn
    }

    /// World-space centre of the spawn tile.
    #[must_use]
    pub fn spawn_point(&self) -> WorldPoint {
        WorldPoint::tile_centre(self.spawn, self.tile_size)
    }

    fn set_tile(&mut self, coord: TileCoord, glyph: char) -> Option<char> {
        if !self.contains(coord) {
            return None;
        }
        let row = usize::try_from(coord.ty()).ok()?;
        let column = usize::try_from(coord.tx()).ok()?;
        let slot = self.tiles.get_mut(row)?.get_mut(column)?;
        let previous = *slot;
        *slot = glyph;
        Some(previous)
    }

    fn rebuild_caches(&mut self) {
        let mut points = PointsOfInterest::default();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, &tile) in row.iter().enumerate() {
                let coord = TileCoord::new(x as i32, y as i32);
                let point = WorldPoint::tile_centre(coord, self.tile_size);
                match tile {
                    glyph::SAVE_GLYPH => points.saves.push(point),
                    glyph::SHOP_GLYPH => points.shops.push(point),
                    glyph::VITALITY_GLYPH => points.vitality.push(point),
                    glyph::ANCHOR_GLYPH => points.anchors.push(point),
                    glyph::BOSS_GATE_GLYPH => {
                        if points.boss_gate.is_none() {
                            points.boss_gate = Some(point);
                        }
                    }
                    other => {
                        if let Some(ability) = self.abilities.ability_for_pickup(other) {
                            points.ability_pickups.push(AbilityPickup { ability, point });
                        } else if let Some(ability) = self.abilities.ability_for_gate(other) {
                            points.gates.push(AbilityGate { ability, point });
                        }
                    }
                }
            }
        }
        self.points = points;
    }
}

impl TileGrid for Level {
    fn columns(&self) -> u32 {
        self.columns
    }

    fn rows(&self) -> u32 {
        self.rows
    }

    fn tile_size(&self) -> f64 {
        self.tile_size
    }

    fn glyph(&self, coord: TileCoord) -> char {
        let (Ok(column), Ok(row)) = (usize::try_from(coord.tx()), usize::try_from(coord.ty()))
        else {
            return OUT_OF_BOUNDS_GLYPH;
        };
        self.tiles
            .get(row)
            .and_then(|tiles| tiles.get(column))
            .copied()
            .unwrap_or(OUT_OF_BOUNDS_GLYPH)
    }

    fn is_solid_with(
        &self,
        coord: TileCoord,
        abilities: AbilityState,
        options: SolidityOptions,
    ) -> bool {
        let tile = self.glyph(coord);
        if glyph::is_solid_glyph(tile) {
            return true;
        }
        if tile == glyph::ONE_WAY_GLYPH {
            return !options.ignore_one_way;
        }
        match self.abilities.ability_for_gate(tile) {
            Some(ability) => !abilities.has(ability),
            None => false,
        }
    }

    fn gate_ability(&self, coord: TileCoord) -> Option<AbilityId> {
        self.abilities.ability_for_gate(self.glyph(coord))
    }
}

/// Applies the provided command to the level, reporting the resulting changes.
///
/// Tile writes do not refresh the points-of-interest cache on their own; callers
/// follow a batch of writes with [`LevelCommand::RebuildCaches`].
pub fn apply(level: &mut Level, command: LevelCommand, out_events: &mut Vec<LevelEvent>) {
    match command {
        LevelCommand::SetTile { coord, glyph } => {
            let _ = write_tile(level, coord, glyph, out_events);
        }
        LevelCommand::ApplyPatch { patch } => {
            let mut changed = 0;
            for change in &patch.changes {
                if write_tile(level, TileCoord::new(change.x, change.y), change.value, out_events) {
                    changed += 1;
                }
            }
            out_events.push(LevelEvent::PatchApplied {
                id: patch.id,
                changed,
            });
        }
        LevelCommand::RebuildCaches => {
            level.rebuild_caches();
            out_events.push(LevelEvent::CachesRebuilt);
        }
        LevelCommand::MoveSpawn { tile } => {
            level.spawn = tile;
            out_events.push(LevelEvent::SpawnMoved { tile });
        }
    }
}

fn write_tile(
    level: &mut Level,
    coord: TileCoord,
    glyph: char,
    out_events: &mut Vec<LevelEvent>,
) -> bool {
    match level.set_tile(coord, glyph) {
        Some(from) if from != glyph => {
            out_events.push(LevelEvent::TileChanged {
                coord,
                from,
                to: glyph,
            });
            true
        }
        _ => false,
    }
}

/// Read-only helpers over the level used by systems and adapters.
pub mod query {
    use traverse_core::{AbilityId, ObjectiveTarget, TileCoord, TileGrid};

    use super::{Level, LevelDocument};

    /// Tile of the pickup granting the provided ability.
    #[must_use]
    pub fn pickup_tile(level: &Level, ability: AbilityId) -> Option<TileCoord> {
        level
            .points_of_interest()
            .pickup_for(ability)
            .map(|point| point.tile(level.tile_size()))
    }

    /// Tile of the boss gate, if any.
    #[must_use]
    pub fn boss_gate_tile(level: &Level) -> Option<TileCoord> {
        level
            .points_of_interest()
            .boss_gate
            .map(|point| point.tile(level.tile_size()))
    }

    /// Stage target of every ability in unlock order.
    ///
    /// Document entries win; otherwise the ability's pickup is used.
    #[must_use]
    pub fn stage_targets(
        level: &Level,
        document: &LevelDocument,
    ) -> Vec<(AbilityId, Option<TileCoord>)> {
        level
            .abilities()
            .ids()
            .map(|id| {
                let name = level.abilities().ability_name(id);
                let target = document
                    .stage_targets
                    .get(name)
                    .copied()
                    .or_else(|| pickup_tile(level, id));
                (id, target)
            })
            .collect()
    }

    /// Final target checked with every ability unlocked.
    #[must_use]
    pub fn boss_target(level: &Level, document: &LevelDocument) -> Option<TileCoord> {
        document.boss.or_else(|| boss_gate_tile(level))
    }

    /// Objectives listed in the document.
    #[must_use]
    pub fn objectives(document: &LevelDocument) -> &[ObjectiveTarget] {
        &document.objectives
    }
}
