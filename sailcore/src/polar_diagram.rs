//! Boat-speed-vs-wind-angle polar diagram. Grounded in
//! `common/polar_diagram.cc`: a fixed cubic fit to boat speed at the given
//! wind angle and speed, projected onto the dead zones by cosine.

use std::f64::consts::PI;

/// Edge of the no-go zone around head-to-wind, radians.
pub const TACK_ZONE_RAD: f64 = 50.0 * PI / 180.0;
/// Edge of the no-go zone around dead-downwind, radians.
pub const JIBE_ZONE_RAD: f64 = 165.0 * PI / 180.0;

pub fn tack_zone_rad() -> f64 {
    TACK_ZONE_RAD
}

pub fn jibe_zone_rad() -> f64 {
    JIBE_ZONE_RAD
}

/// Cubic fit (degrees of `|angle|` on the bow -> relative speed), valid
/// inside the sailable zone [tack_zone, jibe_zone]. Coefficients from
/// `common/polar_diagram.cc`'s `Speed()`.
fn reference_relative_speed(angle_abs_deg: f64) -> f64 {
    const K0: f64 = -2.983_991_445_377_559e-1;
    const K1: f64 = 1.277_493_718_478_512_5e-2;
    const K2: f64 = -6.790_713_288_237_560_7e-5;
    const K3: f64 = 7.955_697_492_673_201_2e-8;
    let a = angle_abs_deg;
    (K0 + K1 * a + K2 * a * a + K3 * a * a * a).max(0.0)
}

/// `(dead_tack, dead_jibe, boat_speed_m_s)` at the given true-wind angle on
/// the bow (any sign) and wind speed. `dead_tack`/`dead_jibe` are the
/// reference-speed values at the tack/jibe zone boundary, useful for the
/// dead-zone projection in `best_sailable_heading`.
pub fn read_polar_diagram(angle_rad: f64, wind_m_s: f64) -> (f64, f64, f64) {
    let angle_abs_deg = crate::angle::symmetric_rad(angle_rad).abs().to_degrees();
    let tack_zone_deg = TACK_ZONE_RAD.to_degrees();
    let jibe_zone_deg = JIBE_ZONE_RAD.to_degrees();

    let dead_tack = reference_relative_speed(tack_zone_deg);
    let dead_jibe = reference_relative_speed(jibe_zone_deg);

    let relative_speed = if angle_abs_deg < tack_zone_deg {
        dead_tack * (angle_abs_deg.to_radians()).cos() / tack_zone_deg.to_radians().cos()
    } else if angle_abs_deg > jibe_zone_deg {
        dead_jibe * (PI - angle_abs_deg.to_radians()).cos() / (PI - jibe_zone_deg.to_radians()).cos()
    } else {
        reference_relative_speed(angle_abs_deg)
    };

    let effective_wind = if wind_m_s > 5.0 {
        4.0 + (wind_m_s - 4.0).max(0.0).sqrt()
    } else {
        wind_m_s
    };
    let raw_speed = relative_speed * effective_wind;

    let boat_speed = if raw_speed > 2.3 {
        (1.3 + (raw_speed - 1.3).max(0.0).sqrt()).min(2.6)
    } else {
        raw_speed
    };

    (dead_tack, dead_jibe, boat_speed)
}

/// Picks the nearest sailable heading to `alpha_star`, snapping it to the
/// tack or jibe zone boundary if it falls inside a dead zone. `prev` is the
/// previous output, used only by the hysteresis variant below.
pub fn best_sailable_heading(alpha_star_rad: f64, alpha_true_rad: f64) -> f64 {
    best_sailable_heading_hysteresis(alpha_star_rad, alpha_true_rad, alpha_star_rad)
}

/// Hysteresis variant: biases the snap decision by 30% of the delta from the
/// previous output, to resist maneuver flapping right at a dead-zone edge.
pub fn best_sailable_heading_hysteresis(alpha_star_rad: f64, alpha_true_rad: f64, prev_rad: f64) -> f64 {
    use crate::angle::{delta_old_new_rad, symmetric_rad};

    let bow_angle = delta_old_new_rad(alpha_true_rad + PI, alpha_star_rad);
    let stern_angle = delta_old_new_rad(alpha_true_rad, alpha_star_rad);

    let hysteresis = 0.3 * delta_old_new_rad(prev_rad, alpha_star_rad);

    if bow_angle.abs() < TACK_ZONE_RAD {
        let biased = bow_angle + hysteresis;
        let boundary = if biased >= 0.0 { TACK_ZONE_RAD } else { -TACK_ZONE_RAD };
        return symmetric_rad(alpha_true_rad + PI + boundary);
    }
    if stern_angle.abs() < PI - JIBE_ZONE_RAD {
        let biased = stern_angle + hysteresis;
        let boundary = if biased >= 0.0 { PI - JIBE_ZONE_RAD } else { -(PI - JIBE_ZONE_RAD) };
        return symmetric_rad(alpha_true_rad + boundary);
    }
    symmetric_rad(alpha_star_rad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_outside_tack_dead_zone() {
        let alpha_true = 0.0;
        let alpha_star = 0.1; // 5.7 deg off the bow, inside the 50 deg tack zone
        let out = best_sailable_heading(alpha_star, alpha_true);
        let bow_angle = crate::angle::delta_old_new_rad(alpha_true + PI, out).abs();
        assert!(bow_angle >= TACK_ZONE_RAD - 1e-9);
    }

    #[test]
    fn stays_outside_jibe_dead_zone() {
        let alpha_true = 0.0;
        let alpha_star = PI - 0.05; // within the 165 deg jibe zone around dead downwind
        let out = best_sailable_heading(alpha_star, alpha_true);
        let stern_angle = crate::angle::delta_old_new_rad(alpha_true, out).abs();
        assert!(stern_angle >= PI - JIBE_ZONE_RAD - 1e-9);
    }

    #[test]
    fn passthrough_outside_dead_zones() {
        let alpha_true = 0.0;
        let alpha_star = PI / 2.0; // beam reach, well clear of both dead zones
        let out = best_sailable_heading(alpha_star, alpha_true);
        assert!((out - alpha_star).abs() < 1e-9);
    }

    #[test]
    fn boat_speed_is_clipped() {
        let (_, _, speed) = read_polar_diagram(90.0_f64.to_radians(), 40.0);
        assert!(speed <= 2.6 + 1e-9);
    }
}
