//! Glyph vocabulary of the level tile grid.

/// Glyphs that block movement unconditionally.
pub const SOLID_GLYPHS: [char; 16] = [
    '#', 'F', 'R', '^', 'v', 'B', 'W', 'X', 'C', 'U', 'I', '<', '>', 'Y', 'N', 'P',
];

/// One-way platform, solid from above unless the query ignores it.
pub const ONE_WAY_GLYPH: char = '=';

/// Save point.
pub const SAVE_GLYPH: char = 'S';

/// Shop.
pub const SHOP_GLYPH: char = '$';

/// Health or vitality upgrade.
pub const VITALITY_GLYPH: char = 'H';

/// Grapple anchor.
pub const ANCHOR_GLYPH: char = 'a';

/// Entrance to the boss arena.
pub const BOSS_GATE_GLYPH: char = 'B';

/// Reports whether the glyph is unconditionally solid.
#[must_use]
pub fn is_solid_glyph(glyph: char) -> bool {
    SOLID_GLYPHS.contains(&glyph)
}
