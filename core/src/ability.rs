//! Ability vocabulary and unlock flags.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of abilities a single table may declare.
pub const MAX_ABILITIES: usize = 16;

/// Index of an ability within its [`AbilityTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId(u8);

impl AbilityId {
    /// Creates an identifier from its position in the owning table.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Position of the ability within the owning table.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Describes a single named ability and the glyphs tied to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityDescriptor {
    name: String,
    pickup_glyph: char,
    gate_glyph: char,
}

impl AbilityDescriptor {
    /// Human-readable ability name used in report text.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered ability vocabulary plus the movement roles each ability plays.
///
/// The order of the table is the intended unlock order used by staged runs.
/// Gate glyphs are assigned as the digits `1..=n` following that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbilityTable {
    abilities: Vec<AbilityDescriptor>,
    jump_bonus: Vec<AbilityId>,
    reach_bonus: Vec<AbilityId>,
    fall_safety: Option<AbilityId>,
    grapple: Option<AbilityId>,
}

impl AbilityTable {
    /// Anchor, flame, magboots and resonance. Anchor or magboots add jump height.
    #[must_use]
    pub fn classic() -> Self {
        Self {
            abilities: descriptors(&[
                ("anchor", 'g'),
                ("flame", 'p'),
                ("magboots", 'm'),
                ("resonance", 'r'),
            ]),
            jump_bonus: vec![AbilityId::new(0), AbilityId::new(2)],
            reach_bonus: Vec::new(),
            fall_safety: None,
            grapple: None,
        }
    }

    /// Grapple, phase, magboots and resonance, with grapple-anchor edges and
    /// a magboots fall-safety bonus.
    #[must_use]
    pub fn grapple() -> Self {
        Self {
            abilities: descriptors(&[
                ("grapple", 'g'),
                ("phase", 'z'),
                ("magboots", 'm'),
                ("resonance", 'r'),
            ]),
            jump_bonus: vec![AbilityId::new(2)],
            reach_bonus: vec![AbilityId::new(0), AbilityId::new(1)],
            fall_safety: Some(AbilityId::new(2)),
            grapple: Some(AbilityId::new(0)),
        }
    }

    /// Resolves a built-in table by its name.
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" => Some(Self::classic()),
            "grapple" => Some(Self::grapple()),
            _ => None,
        }
    }

    /// Ability identifiers in unlock order.
    pub fn ids(&self) -> impl Iterator<Item = AbilityId> + '_ {
        (0..self.abilities.len())
            .filter_map(|index| u8::try_from(index).ok().map(AbilityId::new))
    }

    /// Descriptor for the provided ability, if it belongs to this table.
    #[must_use]
    pub fn descriptor(&self, id: AbilityId) -> Option<&AbilityDescriptor> {
        self.abilities.get(id.index())
    }

    /// Name of the provided ability, or `"unknown"` for foreign identifiers.
    #[must_use]
    pub fn ability_name(&self, id: AbilityId) -> &str {
        self.descriptor(id).map_or("unknown", AbilityDescriptor::name)
    }

    /// Looks up an ability by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<AbilityId> {
        self.ids().find(|id| self.ability_name(*id) == name)
    }

    /// Ability whose gate is drawn with the provided glyph.
    #[must_use]
    pub fn ability_for_gate(&self, glyph: char) -> Option<AbilityId> {
        self.ids()
            .find(|id| self.abilities[id.index()].gate_glyph == glyph)
    }

    /// Ability whose pickup is drawn with the provided glyph.
    #[must_use]
    pub fn ability_for_pickup(&self, glyph: char) -> Option<AbilityId> {
        self.ids()
            .find(|id| self.abilities[id.index()].pickup_glyph == glyph)
    }

    /// Whether the unlocked set raises the maximum jump height.
    #[must_use]
    pub fn grants_jump_bonus(&self, abilities: AbilityState) -> bool {
        self.jump_bonus.iter().any(|id| abilities.has(*id))
    }

    /// Whether the unlocked set extends horizontal jump reach.
    #[must_use]
    pub fn grants_reach_bonus(&self, abilities: AbilityState) -> bool {
        self.reach_bonus.iter().any(|id| abilities.has(*id))
    }

    /// Whether the unlocked set protects against long falls.
    #[must_use]
    pub fn grants_fall_safety(&self, abilities: AbilityState) -> bool {
        self.fall_safety.is_some_and(|id| abilities.has(id))
    }

    /// Whether the grapple-class ability is unlocked.
    #[must_use]
    pub fn grapple_unlocked(&self, abilities: AbilityState) -> bool {
        self.grapple.is_some_and(|id| abilities.has(id))
    }

    /// Flags with every ability of the table unlocked.
    #[must_use]
    pub fn all_unlocked(&self) -> AbilityState {
        self.ids().fold(AbilityState::none(), AbilityState::with)
    }
}

impl Default for AbilityTable {
    fn default() -> Self {
        Self::classic()
    }
}

fn descriptors(entries: &[(&str, char)]) -> Vec<AbilityDescriptor> {
    entries
        .iter()
        .zip(['1', '2', '3', '4', '5', '6', '7', '8', '9'])
        .map(|(&(name, pickup_glyph), gate_glyph)| AbilityDescriptor {
            name: name.to_owned(),
            pickup_glyph,
            gate_glyph,
        })
        .collect()
}

/// Set of unlocked abilities, stored as a bit per table index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbilityState {
    bits: u16,
}

impl AbilityState {
    /// Flags with every ability locked.
    #[must_use]
    pub const fn none() -> Self {
        Self { bits: 0 }
    }

    /// Returns a copy with the provided ability unlocked.
    #[must_use]
    pub const fn with(self, id: AbilityId) -> Self {
        Self {
            bits: self.bits | bit(id),
        }
    }

    /// Unlocks the provided ability in place.
    pub fn unlock(&mut self, id: AbilityId) {
        self.bits |= bit(id);
    }

    /// Reports whether the provided ability is unlocked.
    #[must_use]
    pub const fn has(&self, id: AbilityId) -> bool {
        self.bits & bit(id) != 0
    }

    /// Reports whether every ability unlocked in `other` is also unlocked here.
    #[must_use]
    pub const fn contains_all(&self, other: AbilityState) -> bool {
        self.bits & other.bits == other.bits
    }

    /// Number of unlocked abilities.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.bits.count_ones()
    }
}

const fn bit(id: AbilityId) -> u16 {
    if id.index() < MAX_ABILITIES {
        1 << id.index()
    } else {
        0
    }
}
