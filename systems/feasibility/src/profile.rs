//! Movement envelope derived from physics constants and unlocked abilities.

use traverse_core::{AbilityState, AbilityTable, MovementConstants, PlayerStats};

/// Jump height never drops below this many tiles.
pub const MIN_JUMP_HEIGHT_TILES: i32 = 2;
/// Horizontal jump reach never drops below this many tiles.
pub const MIN_JUMP_DISTANCE_TILES: i32 = 3;
/// Dash reach never drops below this many tiles.
pub const MIN_DASH_DISTANCE_TILES: i32 = 3;
/// Longest survivable drop without fall protection.
pub const BASE_MAX_DROP_TILES: i32 = 6;
/// Longest survivable drop with the fall-safety ability.
pub const FALL_SAFETY_MAX_DROP_TILES: i32 = 9;
/// Reach of the grapple line, in tiles.
pub const GRAPPLE_RANGE_TILES: f64 = 5.0;

/// Seconds of run time that make up the horizontal reach of a jump.
const JUMP_AIRTIME_SECONDS: f64 = 0.45;

/// Numeric traversal limits available under one ability state.
///
/// Tile counts are measured in whole tiles; `speed` and `jump_power` stay in
/// world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementProfile {
    /// Highest climb in tiles a single jump can cover.
    pub max_jump_height: i32,
    /// Widest horizontal distance in tiles a single jump can cover.
    pub max_jump_distance: i32,
    /// Deepest fall in tiles that still counts as traversable.
    pub max_drop_distance: i32,
    /// Horizontal reach in tiles of a grounded dash.
    pub dash_distance: i32,
    /// Horizontal run speed in world units per second.
    pub speed: f64,
    /// Initial upward jump velocity in world units per second.
    pub jump_power: f64,
    /// Grapple reach in tiles, zero while the grapple is locked.
    pub grapple_range: f64,
}

impl MovementProfile {
    /// Derives the profile for the provided inputs.
    ///
    /// Pure and total; a zero tile size is a caller contract violation.
    #[must_use]
    pub fn compute(
        constants: &MovementConstants,
        player: &PlayerStats,
        table: &AbilityTable,
        abilities: AbilityState,
        tile_size: f64,
    ) -> Self {
        let jump_power = player.jump_power_or(constants);
        let speed = player.speed_or(constants);

        let jump_tiles = (constants.jump_height(jump_power) / tile_size).ceil() as i32;
        let max_jump_height =
            jump_tiles.max(MIN_JUMP_HEIGHT_TILES) + i32::from(table.grants_jump_bonus(abilities));

        let reach_tiles = (speed * JUMP_AIRTIME_SECONDS / tile_size).ceil() as i32;
        let max_jump_distance = reach_tiles.max(MIN_JUMP_DISTANCE_TILES)
            + i32::from(table.grants_reach_bonus(abilities));

        let max_drop_distance = if table.grants_fall_safety(abilities) {
            FALL_SAFETY_MAX_DROP_TILES
        } else {
            BASE_MAX_DROP_TILES
        };

        let dash_tiles = (constants.dash_distance() / tile_size).ceil() as i32;
        let dash_distance = dash_tiles.max(MIN_DASH_DISTANCE_TILES);

        let grapple_range = if table.grapple_unlocked(abilities) {
            GRAPPLE_RANGE_TILES
        } else {
            0.0
        };

        Self {
            max_jump_height,
            max_jump_distance,
            max_drop_distance,
            dash_distance,
            speed,
            jump_power,
            grapple_range,
        }
    }
}
