//! Physics constants and player stats consumed by the movement profile.

use serde::{Deserialize, Serialize};

/// Tunable physics constants shared by the player controller and the validator.
///
/// Values are expressed in world units per second. The table is owned by the
/// caller and passed explicitly to every validation call; repair fixes mutate it
/// through [`MovementConstants::set`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovementConstants {
    /// Downward acceleration applied every simulated tick.
    pub gravity: f64,
    /// Horizontal run speed when the player carries no override.
    pub base_speed: f64,
    /// Initial upward velocity of a jump when the player carries no override.
    pub base_jump_power: f64,
    /// Horizontal velocity while dashing.
    pub dash_speed: f64,
    /// Length of a dash in seconds.
    pub dash_duration: f64,
    /// Grace period after leaving a ledge during which a jump is still allowed.
    pub coyote_time: f64,
    /// Window during which an early jump press is remembered.
    pub jump_buffer: f64,
}

impl MovementConstants {
    /// Names accepted by [`MovementConstants::set`], in declaration order.
    pub const NAMES: [&'static str; 7] = [
        "gravity",
        "baseSpeed",
        "baseJumpPower",
        "dashSpeed",
        "dashDuration",
        "coyoteTime",
        "jumpBuffer",
    ];

    /// Apex height reached by a jump launched with the provided power.
    #[must_use]
    pub fn jump_height(&self, jump_power: f64) -> f64 {
        jump_power * jump_power / (2.0 * self.gravity)
    }

    /// Horizontal distance covered by a single dash.
    #[must_use]
    pub fn dash_distance(&self) -> f64 {
        self.dash_speed * self.dash_duration
    }

    /// Overwrites the constant with the provided name.
    ///
    /// Returns `false` and leaves the table untouched for unknown names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "gravity" => &mut self.gravity,
            "baseSpeed" => &mut self.base_speed,
            "baseJumpPower" => &mut self.base_jump_power,
            "dashSpeed" => &mut self.dash_speed,
            "dashDuration" => &mut self.dash_duration,
            "coyoteTime" => &mut self.coyote_time,
            "jumpBuffer" => &mut self.jump_buffer,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Reads the constant with the provided name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "gravity" => Some(self.gravity),
            "baseSpeed" => Some(self.base_speed),
            "baseJumpPower" => Some(self.base_jump_power),
            "dashSpeed" => Some(self.dash_speed),
            "dashDuration" => Some(self.dash_duration),
            "coyoteTime" => Some(self.coyote_time),
            "jumpBuffer" => Some(self.jump_buffer),
            _ => None,
        }
    }
}

impl Default for MovementConstants {
    fn default() -> Self {
        Self {
            gravity: 1500.0,
            base_speed: 240.0,
            base_jump_power: 520.0,
            dash_speed: 620.0,
            dash_duration: 0.12,
            coyote_time: 0.1,
            jump_buffer: 0.12,
        }
    }
}

/// Player-specific stat overrides and body dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerStats {
    /// Run speed override; falls back to [`MovementConstants::base_speed`].
    pub speed: Option<f64>,
    /// Jump power override; falls back to [`MovementConstants::base_jump_power`].
    pub jump_power: Option<f64>,
    /// Width of the player's collision box in world units.
    pub width: f64,
    /// Height of the player's collision box in world units.
    pub height: f64,
}

impl PlayerStats {
    /// Effective run speed under the provided constants.
    #[must_use]
    pub fn speed_or(&self, constants: &MovementConstants) -> f64 {
        self.speed.unwrap_or(constants.base_speed)
    }

    /// Effective jump power under the provided constants.
    #[must_use]
    pub fn jump_power_or(&self, constants: &MovementConstants) -> f64 {
        self.jump_power.unwrap_or(constants.base_jump_power)
    }
}

impl Default for PlayerStats {
    fn default() -> Self {
        Self {
            speed: None,
            jump_power: None,
            width: 20.0,
            height: 28.0,
        }
    }
}
