//! Sail angle from apparent wind via the angle-of-attack rule. Grounded in
//! the `SailController::BestGammaSail` call sites in `helmsman/new_gamma_sail.cc`
//! (the class's own implementation isn't in the filtered source pack).

use crate::angle::{delta_old_new_rad, limit_rate_wrap_rad};
use crate::boat::{OMEGA_MAX_SAIL, SAMPLING_PERIOD_S};
use std::f64::consts::PI;

/// Optimal angle of attack between sail chord and apparent wind.
pub const OPTIMAL_AOA_RAD: f64 = 10.0 * PI / 180.0;

/// Sail angle that puts the sail at `OPTIMAL_AOA_RAD` off the apparent wind,
/// on the side opposite the wind: the sail chord bisects the angle between
/// the centerline and the apparent wind direction, held back by half the
/// optimal angle of attack so the luff just stops lifting.
pub fn best_gamma_sail(alpha_app_rad: f64, _mag_app_m_s: f64) -> f64 {
    let sign = if alpha_app_rad >= 0.0 { 1.0 } else { -1.0 };
    let magnitude = ((alpha_app_rad.abs() - OPTIMAL_AOA_RAD) / 2.0).clamp(0.0, PI / 2.0);
    -sign * magnitude
}

pub struct StabilizedSailController {
    follows_rad: f64,
    initialized: bool,
}

impl StabilizedSailController {
    pub fn new() -> Self {
        StabilizedSailController { follows_rad: 0.0, initialized: false }
    }

    /// Rate-limits `best_gamma_sail` so the sail reference doesn't chase
    /// apparent-wind noise tick to tick.
    pub fn step(&mut self, alpha_app_rad: f64, mag_app_m_s: f64) -> f64 {
        let target = best_gamma_sail(alpha_app_rad, mag_app_m_s);
        if !self.initialized {
            self.follows_rad = target;
            self.initialized = true;
            return target;
        }
        limit_rate_wrap_rad(target, OMEGA_MAX_SAIL * SAMPLING_PERIOD_S, &mut self.follows_rad);
        self.follows_rad
    }

    pub fn seed(&mut self, gamma_sail_rad: f64) {
        self.follows_rad = gamma_sail_rad;
        self.initialized = true;
    }
}

impl Default for StabilizedSailController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest angular step from `old` toward `new`, used by the maneuver
/// planner when it needs a plain delta rather than a stabilized step.
pub fn gamma_delta(old_rad: f64, new_rad: f64) -> f64 {
    delta_old_new_rad(old_rad, new_rad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sail_on_opposite_side_from_wind() {
        let g_pos = best_gamma_sail(0.5, 5.0);
        let g_neg = best_gamma_sail(-0.5, 5.0);
        assert!(g_pos < 0.0);
        assert!(g_neg > 0.0);
    }

    #[test]
    fn close_hauled_gives_small_sail_angle() {
        // Apparent wind almost dead ahead: sail should be trimmed in tight.
        let g = best_gamma_sail(10.0_f64.to_radians(), 5.0);
        assert!(g.abs() < 20.0_f64.to_radians());
    }

    #[test]
    fn running_gives_large_sail_angle() {
        // Apparent wind almost dead astern: sail should be eased way out.
        let g = best_gamma_sail(170.0_f64.to_radians(), 5.0);
        assert!(g.abs() > 60.0_f64.to_radians());
    }

    #[test]
    fn stabilized_controller_rate_limits() {
        let mut c = StabilizedSailController::new();
        c.seed(0.0);
        let out = c.step(170.0_f64.to_radians(), 5.0);
        assert!(out.abs() <= OMEGA_MAX_SAIL * SAMPLING_PERIOD_S + 1e-9);
    }
}
