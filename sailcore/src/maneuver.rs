//! Maneuver-type classification and the post-maneuver sail angle/delta.
//! Grounded in `helmsman/maneuver_type.h` and `helmsman/new_gamma_sail.cc`.

use crate::angle::{delta_old_new_rad, symmetric_rad};
use crate::polar_diagram::jibe_zone_rad;
use crate::sail_controller::best_gamma_sail;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverType {
    Tack,
    Jibe,
    Change,
}

/// Classifies the heading change from `old_heading_rad` to `new_heading_rad`
/// relative to `alpha_true_rad`: crossing the bow-through-wind line is a
/// tack, crossing the stern-through-wind line is a jibe, anything else
/// within `1.8 * (pi - jibe_zone)` is a plain change. At the exact symmetry
/// point, tack wins.
pub fn find_maneuver_type(old_heading_rad: f64, new_heading_rad: f64, alpha_true_rad: f64) -> ManeuverType {
    let bow_through_wind = alpha_true_rad + PI;
    let stern_through_wind = alpha_true_rad;

    let old_side_bow = delta_old_new_rad(bow_through_wind, old_heading_rad).signum();
    let new_side_bow = delta_old_new_rad(bow_through_wind, new_heading_rad).signum();
    let old_side_stern = delta_old_new_rad(stern_through_wind, old_heading_rad).signum();
    let new_side_stern = delta_old_new_rad(stern_through_wind, new_heading_rad).signum();

    if old_side_bow != new_side_bow {
        return ManeuverType::Tack;
    }
    if old_side_stern != new_side_stern {
        return ManeuverType::Jibe;
    }
    ManeuverType::Change
}

pub struct NewSailAngle {
    pub new_gamma_sail_rad: f64,
    pub delta_gamma_sail_rad: f64,
}

/// Post-maneuver sail angle and the sweep delta used to seed the reference
/// planner, per the maneuver type.
pub fn next_gamma_sail_with_old(
    alpha_app_rad: f64,
    mag_app_m_s: f64,
    maneuver: ManeuverType,
    old_gamma_sail_rad: f64,
) -> NewSailAngle {
    match maneuver {
        ManeuverType::Tack => {
            let new_gamma = -old_gamma_sail_rad;
            NewSailAngle {
                new_gamma_sail_rad: new_gamma,
                delta_gamma_sail_rad: new_gamma - old_gamma_sail_rad,
            }
        }
        ManeuverType::Jibe => {
            let new_gamma = -old_gamma_sail_rad;
            // The sail sweeps the long way, around the stern, rather than
            // snapping straight across like a tack.
            let sign = if old_gamma_sail_rad >= 0.0 { 1.0 } else { -1.0 };
            let delta = new_gamma - old_gamma_sail_rad - 2.0 * PI * sign;
            NewSailAngle { new_gamma_sail_rad: new_gamma, delta_gamma_sail_rad: delta }
        }
        ManeuverType::Change => {
            let new_gamma = best_gamma_sail(alpha_app_rad, mag_app_m_s);
            NewSailAngle {
                new_gamma_sail_rad: new_gamma,
                delta_gamma_sail_rad: new_gamma - old_gamma_sail_rad,
            }
        }
    }
}

/// Whether a restricted-heading jump is large enough to warrant planning a
/// synchronized turn rather than just stepping the rudder loop.
pub fn is_jump(prev_restricted_rad: f64, new_restricted_rad: f64) -> bool {
    let jibe_zone = jibe_zone_rad();
    let delta = delta_old_new_rad(prev_restricted_rad, new_restricted_rad);
    delta.abs() > 1.8 * (PI - jibe_zone)
}

/// Clean wrap of a delta so accumulated plan maths stays in (-pi, pi].
pub fn normalize_delta(delta_rad: f64) -> f64 {
    symmetric_rad(delta_rad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_bow_through_wind_is_a_tack() {
        // true wind from north: bow-through-wind line is at heading 0 (pi true + pi).
        let alpha_true = PI;
        let m = find_maneuver_type(10.0_f64.to_radians(), -10.0_f64.to_radians(), alpha_true);
        assert_eq!(m, ManeuverType::Tack);
    }

    #[test]
    fn crossing_stern_through_wind_is_a_jibe() {
        let alpha_true = PI;
        let m = find_maneuver_type(170.0_f64.to_radians(), -170.0_f64.to_radians(), alpha_true);
        assert_eq!(m, ManeuverType::Jibe);
    }

    #[test]
    fn small_reach_adjustment_is_a_change() {
        let alpha_true = PI;
        let m = find_maneuver_type(90.0_f64.to_radians(), 95.0_f64.to_radians(), alpha_true);
        assert_eq!(m, ManeuverType::Change);
    }

    #[test]
    fn tack_negates_sail_angle() {
        let old_gamma = 0.3;
        let out = next_gamma_sail_with_old(0.5, 5.0, ManeuverType::Tack, old_gamma);
        assert!((out.new_gamma_sail_rad - (-old_gamma)).abs() < 1e-9);
    }

    #[test]
    fn jibe_sweeps_over_the_stern() {
        let old_gamma = 0.3;
        let out = next_gamma_sail_with_old(2.9, 5.0, ManeuverType::Jibe, old_gamma);
        assert!(out.delta_gamma_sail_rad.abs() > PI);
    }

    #[test]
    fn change_delta_matches_new_minus_old() {
        let old_gamma = 0.3;
        let out = next_gamma_sail_with_old(0.5, 5.0, ManeuverType::Change, old_gamma);
        assert!((out.delta_gamma_sail_rad - (out.new_gamma_sail_rad - old_gamma)).abs() < 1e-9);
    }
}
