//! Fixed-timestep jump and dash integration.

use traverse_core::MovementConstants;

use crate::profile::MovementProfile;

/// Length of one simulated tick in seconds.
pub const TIMESTEP_SECONDS: f64 = 1.0 / 60.0;
/// Simulated time after which an arc is abandoned.
pub const HORIZON_SECONDS: f64 = 1.2;
/// Delay before the mid-air dash fires.
pub const DASH_DELAY_SECONDS: f64 = 0.1;
/// Distance from the target offset, in tiles, that counts as a landing.
pub const LANDING_TOLERANCE_TILES: f64 = 0.6;
/// Overshoot below a descending target, in tiles, that guarantees a landing.
pub const DROP_OVERSHOOT_TILES: f64 = 2.0;

/// Answers whether a tile delta can be physically completed.
#[derive(Clone, Copy, Debug)]
pub struct ArcSimulator<'a> {
    profile: &'a MovementProfile,
    constants: &'a MovementConstants,
    tile_size: f64,
}

impl<'a> ArcSimulator<'a> {
    /// Creates a simulator for one profile.
    #[must_use]
    pub const fn new(
        profile: &'a MovementProfile,
        constants: &'a MovementConstants,
        tile_size: f64,
    ) -> Self {
        Self {
            profile,
            constants,
            tile_size,
        }
    }

    /// Profile the simulator checks against.
    #[must_use]
    pub const fn profile(&self) -> &'a MovementProfile {
        self.profile
    }

    /// Reports whether the delta lies inside the profile's jump envelope.
    #[must_use]
    pub fn within_envelope(&self, dx: i32, dy: i32) -> bool {
        dy >= -self.profile.max_jump_height
            && dy <= self.profile.max_drop_distance
            && dx.abs() <= self.profile.max_jump_distance
    }

    /// Feasibility of a move by `(dx, dy)` tiles.
    ///
    /// Level and descending moves inside the envelope always land. Ascending
    /// moves must be completed by a simulated jump, with or without a dash.
    #[must_use]
    pub fn accepts(&self, dx: i32, dy: i32) -> bool {
        if !self.within_envelope(dx, dy) {
            return false;
        }
        if dy < 0 {
            return self.simulate(dx, dy, false) || self.simulate(dx, dy, true);
        }
        true
    }

    /// Integrates a single arc toward the target offset.
    #[must_use]
    pub fn simulate(&self, dx: i32, dy: i32, use_dash: bool) -> bool {
        let tile = self.tile_size;
        let target_x = f64::from(dx) * tile;
        let target_y = f64::from(dy) * tile;
        let tolerance = tile * LANDING_TOLERANCE_TILES;
        let direction = if dx < 0 { -1.0 } else { 1.0 };
        let run_velocity = self.profile.speed * direction;
        let can_dash = use_dash && dx.abs() > 1;

        let mut x = 0.0;
        let mut y = 0.0;
        let mut vx = run_velocity;
        let mut vy = if dy < 0 { -self.profile.jump_power } else { 0.0 };
        let mut dash_timer = 0.0;
        let mut dash_spent = false;

        let mut t = 0.0;
        while t < HORIZON_SECONDS {
            if can_dash && !dash_spent && t >= DASH_DELAY_SECONDS {
                dash_spent = true;
                dash_timer = self.constants.dash_duration;
                vx = self.constants.dash_speed * direction;
            }
            if dash_timer > 0.0 {
                dash_timer -= TIMESTEP_SECONDS;
            } else {
                vx = run_velocity;
                vy += self.constants.gravity * TIMESTEP_SECONDS;
            }
            x += vx * TIMESTEP_SECONDS;
            y += vy * TIMESTEP_SECONDS;

            if (x - target_x).abs() < tolerance && (y - target_y).abs() < tolerance {
                return true;
            }
            if dy > 0 && y > target_y + tile * DROP_OVERSHOOT_TILES {
                return true;
            }
            t += TIMESTEP_SECONDS;
        }
        false
    }
}
