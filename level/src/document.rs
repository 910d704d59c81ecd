//! Serialized level documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use traverse_core::{MovementConstants, ObjectiveTarget, PlayerStats, TileCoord};

use crate::LevelError;

/// Tile size assumed when a document omits it.
pub const DEFAULT_TILE_SIZE: f64 = 32.0;

/// On-disk description of a level and the objectives checked against it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    /// Side length of a tile in world units.
    #[serde(default = "default_tile_size")]
    pub tile_size: f64,
    /// Grid rows, top to bottom, one glyph per tile.
    pub tiles: Vec<String>,
    /// Tile the player spawns in.
    #[serde(default)]
    pub spawn: Option<TileCoord>,
    /// Name of the ability vocabulary, `classic` or `grapple`.
    #[serde(default = "default_ability_table")]
    pub ability_table: String,
    /// Physics constants.
    #[serde(default)]
    pub movement: MovementConstants,
    /// Player stat overrides and body size.
    #[serde(default)]
    pub player: PlayerStats,
    /// Objectives checked by a single-stage run.
    #[serde(default)]
    pub objectives: Vec<ObjectiveTarget>,
    /// Per-ability stage targets keyed by ability name.
    ///
    /// Abilities without an entry fall back to their pickup location.
    #[serde(default)]
    pub stage_targets: BTreeMap<String, TileCoord>,
    /// Final target checked with every ability unlocked.
    ///
    /// Falls back to the boss gate when omitted.
    #[serde(default)]
    pub boss: Option<TileCoord>,
}

impl LevelDocument {
    /// Parses a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(text)?)
    }
}

fn default_tile_size() -> f64 {
    DEFAULT_TILE_SIZE
}

fn default_ability_table() -> String {
    "classic".to_owned()
}
