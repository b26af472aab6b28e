//! Point-of-sail sector classification and anti-gust correction. Grounded in
//! `common/point_of_sail.cc`.

use crate::angle::{delta_old_new_rad, normalize_rad, symmetric_rad};
use crate::polar_diagram::{jibe_zone_rad, tack_zone_rad};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sector {
    TackPort,
    TackStar,
    ReachStar,
    JibeStar,
    JibePort,
    ReachPort,
}

/// Classifies `alpha_star` relative to `alpha_true` into one of six sectors,
/// using `hysteresis_source` (alpha_star - previous_output) to bias the
/// snap decision near a dead-zone boundary (10% in the tack zone, 30% in
/// the jibe zone, per spec).
pub fn classify(alpha_star_rad: f64, alpha_true_rad: f64, hysteresis_source_rad: f64) -> Sector {
    let tack_zone = tack_zone_rad();
    let jibe_zone = jibe_zone_rad();

    let limit1 = symmetric_rad(alpha_true_rad - PI - tack_zone);
    let limit2 = symmetric_rad(alpha_true_rad - PI + tack_zone);
    let limit3 = symmetric_rad(alpha_true_rad - (PI - jibe_zone));
    let limit4 = symmetric_rad(alpha_true_rad + (PI - jibe_zone));

    let bow_angle = delta_old_new_rad(alpha_true_rad + PI, alpha_star_rad);

    if bow_angle.abs() < tack_zone {
        let biased = bow_angle + 0.1 * hysteresis_source_rad;
        return if biased >= 0.0 { Sector::TackStar } else { Sector::TackPort };
    }

    let stern_angle = delta_old_new_rad(alpha_true_rad, alpha_star_rad);
    if stern_angle.abs() < PI - jibe_zone {
        let biased = stern_angle + 0.3 * hysteresis_source_rad;
        return if biased >= 0.0 { Sector::JibeStar } else { Sector::JibePort };
    }

    // Clear of both dead zones: the sailable half of the circle splits into
    // two reach arcs, starboard from limit2 to limit3 and port from limit4
    // back around to limit1.
    if in_forward_arc(limit2, limit3, alpha_star_rad) {
        Sector::ReachStar
    } else if in_forward_arc(limit4, limit1, alpha_star_rad) {
        Sector::ReachPort
    } else {
        // Falls exactly on a limit (rounding) rather than inside an arc;
        // resolve from which dead zone it's adjacent to.
        if bow_angle > 0.0 {
            Sector::ReachStar
        } else {
            Sector::ReachPort
        }
    }
}

/// Whether `x_rad` lies in the arc swept counterclockwise from `start_rad`
/// up to (not including) `end_rad`, wrapping through the full circle.
fn in_forward_arc(start_rad: f64, end_rad: f64, x_rad: f64) -> bool {
    const TWO_PI: f64 = 2.0 * PI;
    let s = normalize_rad(start_rad);
    let e = normalize_rad(end_rad);
    let x = normalize_rad(x_rad);
    let span = if e >= s { e - s } else { e - s + TWO_PI };
    let pos = if x >= s { x - s } else { x - s + TWO_PI };
    pos < span
}

/// Asymmetric-decay anti-gust correction: rises instantly when the apparent
/// wind creeps into the forbidden frontal zone, decays slowly (<= 0.2 deg/s)
/// when it retreats, like a helmsman who eases out cautiously but responds
/// to a gust immediately. Zero in jibe sectors and below 0.5 m/s apparent
/// wind.
pub struct AntiGustFilter {
    correction_rad: f64,
}

const DECAY_DEG_PER_S: f64 = 0.2;
const DECAY_RAD_PER_TICK: f64 = DECAY_DEG_PER_S * (PI / 180.0) * crate::boat::SAMPLING_PERIOD_S;
const CLIP_RAD: f64 = 45.0 * PI / 180.0;
const FRONTAL_OFFSET_RAD: f64 = 12.0 * PI / 180.0;

impl AntiGustFilter {
    pub fn new() -> Self {
        AntiGustFilter { correction_rad: 0.0 }
    }

    pub fn step(&mut self, sector: Sector, alpha_app_rad: f64, mag_app_m_s: f64) -> f64 {
        if matches!(sector, Sector::JibeStar | Sector::JibePort) || mag_app_m_s < 0.5 {
            self.correction_rad = decay_toward_zero(self.correction_rad, DECAY_RAD_PER_TICK);
            return self.correction_rad;
        }

        // How far the apparent wind angle has crept past the forbidden
        // frontal boundary (head to wind +- offset).
        let penetration = FRONTAL_OFFSET_RAD - alpha_app_rad.abs();
        let target = (penetration.max(0.0)).min(CLIP_RAD);

        if target > self.correction_rad.abs() {
            self.correction_rad = target * alpha_app_rad.signum();
        } else {
            self.correction_rad = decay_toward_zero(self.correction_rad, DECAY_RAD_PER_TICK);
        }
        self.correction_rad.clamp(-CLIP_RAD, CLIP_RAD)
    }
}

impl Default for AntiGustFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn decay_toward_zero(x: f64, step: f64) -> f64 {
    if x > 0.0 {
        (x - step).max(0.0)
    } else if x < 0.0 {
        (x + step).min(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_close_hauled_starboard() {
        // true wind from north (blowing toward south, alpha_true = pi),
        // boat heading 40 deg off the bow to starboard relative to wind.
        let alpha_true = PI;
        let alpha_star = (PI - 40.0_f64.to_radians()).rem_euclid(2.0 * PI) - PI;
        let sector = classify(symmetric_rad(alpha_star), alpha_true, 0.0);
        assert!(matches!(sector, Sector::TackStar | Sector::TackPort));
    }

    #[test]
    fn beam_reach_splits_by_side_of_boat() {
        // True wind from north; a beam reach to starboard and one to port
        // should land on opposite sides of the dead zones they're clear of.
        let alpha_true = PI;
        let star = classify(PI / 2.0, alpha_true, 0.0);
        let port = classify(-PI / 2.0, alpha_true, 0.0);
        assert_eq!(star, Sector::ReachStar);
        assert_eq!(port, Sector::ReachPort);
    }

    #[test]
    fn anti_gust_decays_no_faster_than_cap() {
        let mut f = AntiGustFilter::new();
        f.step(Sector::ReachStar, 10.0_f64.to_radians(), 5.0);
        let before = f.correction_rad.abs();
        let after = f.step(Sector::ReachStar, 0.0, 5.0).abs();
        assert!(before - after <= DECAY_RAD_PER_TICK + 1e-9);
    }

    #[test]
    fn anti_gust_zero_in_jibe_sectors() {
        let mut f = AntiGustFilter::new();
        let out = f.step(Sector::JibeStar, 5.0_f64.to_radians(), 5.0);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn anti_gust_zero_below_threshold_wind() {
        let mut f = AntiGustFilter::new();
        let out = f.step(Sector::ReachStar, 5.0_f64.to_radians(), 0.2);
        assert_eq!(out, 0.0);
    }
}
