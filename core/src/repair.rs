//! Externally authored repair data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::TileCoord;

/// Replacement of a single tile glyph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileChange {
    /// Column of the tile to overwrite.
    pub x: i32,
    /// Row of the tile to overwrite.
    pub y: i32,
    /// Glyph written into the tile.
    pub value: char,
}

/// Named batch of tile changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePatch {
    /// Identifier referenced by [`FixKind::TilePatch`].
    pub id: String,
    /// Changes applied in order.
    #[serde(default)]
    pub changes: Vec<TileChange>,
}

/// Remediation performed by a [`RepairFix`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FixKind {
    /// Applies the tile patch with the referenced identifier.
    TilePatch {
        /// Identifier of the patch within [`RepairPlan::tile_patches`].
        #[serde(rename = "ref")]
        patch: String,
    },
    /// Overwrites named movement constants.
    MovementTweaks {
        /// Constant name to new value.
        #[serde(default)]
        values: BTreeMap<String, f64>,
    },
}

/// Pre-authored remediation the auto-repair loop may apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepairFix {
    /// Unique identifier; a fix is applied at most once per repair session.
    pub id: String,
    /// What the fix does.
    #[serde(flatten)]
    pub kind: FixKind,
}

/// Complete repair document for a level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepairPlan {
    /// Gates persistent patches and the spawn override.
    pub enabled: bool,
    /// Tile the spawn is relocated to when enabled.
    pub spawn_override: Option<TileCoord>,
    /// Tile patches addressable by fixes.
    pub tile_patches: Vec<TilePatch>,
    /// Constant overrides applied with the persistent patches.
    pub movement_tweaks: BTreeMap<String, f64>,
    /// Fixes tried in order by the auto-repair loop.
    pub auto_fixes: Vec<RepairFix>,
}

impl RepairPlan {
    /// Looks up a tile patch by identifier.
    #[must_use]
    pub fn patch(&self, id: &str) -> Option<&TilePatch> {
        self.tile_patches.iter().find(|patch| patch.id == id)
    }
}
