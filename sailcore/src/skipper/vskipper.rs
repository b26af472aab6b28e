//! AIS-based collision avoidance. Grounded in `vskipper/vskipper.cc` /
//! `vskipper/util.cc`.

use crate::angle::{delta_old_new_rad, symmetric_rad};
use crate::latlon::{min_distance, spherical_shortest_path, LatLon};
use crate::polar_diagram::read_polar_diagram;
use std::f64::consts::{PI, TAU};

pub const MAX_TIME_WINDOW_S: f64 = 15.0 * 60.0;
pub const MIN_TIME_WINDOW_S: f64 = 60.0;
const DANGER_RADIUS_M: f64 = 200.0;
const CORRIDOR_HALF_WIDTH_RAD: f64 = 5.0 * PI / 180.0;
const CANDIDATE_STEP_RAD: f64 = TAU / 360.0;

#[derive(Debug, Clone, Copy)]
pub struct AisContact {
    pub position: LatLon,
    pub bearing_rad: f64,
    pub speed_m_s: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AvoidanceResult {
    pub bearing_rad: f64,
    pub no_safe_way: bool,
}

/// Weight `P(f) = max(0, 1 - |f - 1|)` for a wind-speed fraction `f`, summed
/// over `f in [0, 2]` step `0.2`, as the candidate-evaluation's robustness
/// sweep against the uncertain actual wind strength.
fn wind_fraction_weights() -> impl Iterator<Item = (f64, f64)> {
    (0..=10).map(|i| {
        let f = i as f64 * 0.2;
        (f, (1.0 - (f - 1.0).abs()).max(0.0))
    })
}

fn danger(min_distance_m: f64) -> f64 {
    (1.0 - min_distance_m / DANGER_RADIUS_M).max(0.0)
}

/// Danger of steering `candidate_bearing_rad` given our own wind-derived
/// speed and the AIS contact, swept over `[0, 2]x` wind-speed fractions.
fn candidate_danger(candidate_bearing_rad: f64, alpha_true_rad: f64, wind_m_s: f64, own_pos: LatLon, contact: &AisContact, time_window_s: f64) -> f64 {
    let (bearing_to_ship, distance_to_ship) = spherical_shortest_path(own_pos, contact.position);
    let true_wind_angle_on_bow = symmetric_rad(alpha_true_rad - candidate_bearing_rad);

    wind_fraction_weights()
        .map(|(f, weight)| {
            if weight <= 0.0 {
                return 0.0;
            }
            let (_, _, expected_speed) = read_polar_diagram(true_wind_angle_on_bow, wind_m_s * f);
            let d = min_distance(
                candidate_bearing_rad,
                expected_speed,
                contact.bearing_rad,
                contact.speed_m_s,
                bearing_to_ship,
                distance_to_ship,
                time_window_s,
            );
            weight * danger(d)
        })
        .sum()
}

/// Evaluates 360 one-degree candidate bearings around `plan_bearing_rad`,
/// picks the one with the lowest corridor danger (summed danger over all
/// candidates within +-5 deg of it), ties broken by smaller deviation from
/// the plan. Halves the time window down to `MIN_TIME_WINDOW_S` if the best
/// corridor is still dangerous, reporting `no_safe_way` if even that fails.
pub fn avoid_collisions(
    plan_bearing_rad: f64,
    alpha_true_rad: f64,
    wind_m_s: f64,
    own_pos: LatLon,
    contacts: &[AisContact],
) -> AvoidanceResult {
    if contacts.is_empty() {
        return AvoidanceResult { bearing_rad: plan_bearing_rad, no_safe_way: false };
    }

    let mut time_window_s = MAX_TIME_WINDOW_S;
    loop {
        let dangers: Vec<f64> = (0..360)
            .map(|i| {
                let candidate = symmetric_rad(plan_bearing_rad + i as f64 * CANDIDATE_STEP_RAD - PI);
                contacts
                    .iter()
                    .map(|c| candidate_danger(candidate, alpha_true_rad, wind_m_s, own_pos, c, time_window_s))
                    .sum::<f64>()
            })
            .collect();

        let corridor = |i: usize| -> f64 {
            let candidate_i = symmetric_rad(plan_bearing_rad + i as f64 * CANDIDATE_STEP_RAD - PI);
            dangers
                .iter()
                .enumerate()
                .filter(|(j, _)| {
                    let candidate_j = symmetric_rad(plan_bearing_rad + *j as f64 * CANDIDATE_STEP_RAD - PI);
                    delta_old_new_rad(candidate_i, candidate_j).abs() <= CORRIDOR_HALF_WIDTH_RAD
                })
                .map(|(_, d)| *d)
                .sum()
        };

        let mut best_index = 0usize;
        let mut best_corridor = f64::MAX;
        let mut best_plan_diff = f64::MAX;
        for i in 0..360 {
            let c = corridor(i);
            let candidate = symmetric_rad(plan_bearing_rad + i as f64 * CANDIDATE_STEP_RAD - PI);
            let diff = delta_old_new_rad(plan_bearing_rad, candidate).abs();
            if c < best_corridor || (c == best_corridor && diff < best_plan_diff) {
                best_corridor = c;
                best_plan_diff = diff;
                best_index = i;
            }
        }

        let best_bearing = symmetric_rad(plan_bearing_rad + best_index as f64 * CANDIDATE_STEP_RAD - PI);

        if best_corridor <= 0.0 {
            return AvoidanceResult { bearing_rad: best_bearing, no_safe_way: false };
        }
        if time_window_s <= MIN_TIME_WINDOW_S {
            return AvoidanceResult { bearing_rad: best_bearing, no_safe_way: true };
        }
        time_window_s = (time_window_s / 2.0).max(MIN_TIME_WINDOW_S);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_on_contact_deflects_the_plan_bearing() {
        // Ship 400m due west, bearing east at 5 m/s; plan says west (270).
        let own_pos = LatLon::new(0.0, 0.0);
        let contact = AisContact {
            position: crate::latlon::spherical_move(own_pos, 270.0_f64.to_radians(), 400.0),
            bearing_rad: 90.0_f64.to_radians(),
            speed_m_s: 5.0,
        };
        let plan_bearing = 270.0_f64.to_radians();
        let result = avoid_collisions(plan_bearing, 90.0_f64.to_radians(), 8.0, own_pos, &[contact]);
        let deflection = delta_old_new_rad(plan_bearing, result.bearing_rad).abs();
        assert!(deflection.to_degrees() >= 1.0, "expected a deflection, got {deflection}");
    }

    #[test]
    fn no_contacts_returns_plan_bearing_unchanged() {
        let result = avoid_collisions(1.0, 0.0, 8.0, LatLon::new(0.0, 0.0), &[]);
        assert_eq!(result.bearing_rad, 1.0);
        assert!(!result.no_safe_way);
    }
}
