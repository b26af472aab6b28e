//! Wrap-safe angle arithmetic.
//!
//! An `Angle` is stored as a 64-bit two's-complement fixed-point value over
//! the full circle: `i64::MIN` is -180 deg and `i64::MAX` is just under
//! +180 deg. Addition and subtraction are native wrapping integer ops, so
//! repeated accumulation never drifts the way repeated `double` degree
//! arithmetic does — this is the one data type allowed to hold a bearing
//! anywhere in this crate; `f64` degrees are only for bit-exact external
//! interfaces (see module `bus-proto`).

use crate::error::{CoreError, CoreResult};
use std::f64::consts::PI;

/// Half of the full `i64` range; represents exactly 180 degrees / pi radians.
const HALF_RANGE: i64 = i64::MIN; // wrapping_neg(i64::MIN) == i64::MIN, i.e. 180 == -180
const DEG_TO_ATYPE: f64 = -(i64::MIN as f64) / 180.0;
const RAD_TO_ATYPE: f64 = -(i64::MIN as f64) / PI;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Angle(i64);

impl Angle {
    pub const ZERO: Angle = Angle(0);

    /// Build from a fixed-point atype value directly (used internally and by filters).
    pub(crate) fn from_atype(v: i64) -> Angle {
        Angle(v)
    }

    pub(crate) fn atype(&self) -> i64 {
        self.0
    }

    /// Accepts degrees in [-180, 360).
    pub fn from_deg(deg: f64) -> CoreResult<Angle> {
        if !(deg >= -180.0 && deg < 360.0) {
            return Err(CoreError::AngleOutOfRange(deg));
        }
        Ok(Angle((deg * DEG_TO_ATYPE).round() as i64))
    }

    /// Accepts radians in [-pi, 2*pi).
    pub fn from_rad(rad: f64) -> CoreResult<Angle> {
        if !(rad >= -PI && rad < 2.0 * PI) {
            return Err(CoreError::RadianOutOfRange(rad));
        }
        Ok(Angle((rad * RAD_TO_ATYPE).round() as i64))
    }

    /// Signed projection in [-180, 180).
    pub fn to_deg(&self) -> f64 {
        self.0 as f64 / DEG_TO_ATYPE
    }

    /// Unsigned projection in [0, 360).
    pub fn to_deg_unsigned(&self) -> f64 {
        let d = self.to_deg();
        if d < 0.0 {
            d + 360.0
        } else {
            d
        }
    }

    pub fn to_rad(&self) -> f64 {
        self.0 as f64 / RAD_TO_ATYPE
    }

    pub fn opposite(&self) -> Angle {
        Angle(self.0.wrapping_add(HALF_RANGE))
    }

    pub fn div(&self, divisor: i64) -> CoreResult<Angle> {
        if divisor == 0 {
            return Err(CoreError::DivideByZero);
        }
        Ok(Angle(self.0 / divisor))
    }

    pub fn sin(&self) -> f64 {
        self.to_rad().sin()
    }

    pub fn cos(&self) -> f64 {
        self.to_rad().cos()
    }

    pub fn atan2(y: f64, x: f64) -> Angle {
        // atan2(0, 0) is defined as 0 rad, within the accepted input range.
        Angle::from_rad(y.atan2(x)).unwrap_or(Angle::ZERO)
    }

    pub fn sign(&self) -> i32 {
        self.0.signum() as i32
    }

    /// Like `sign`, but zero maps to +1 (used where a maneuver direction
    /// must never come out "no direction").
    pub fn sign_not_zero(&self) -> i32 {
        if self.0 >= 0 {
            1
        } else {
            -1
        }
    }

    pub fn positive(&self) -> bool {
        self.0 > 0
    }

    pub fn negative(&self) -> bool {
        self.0 < 0
    }

    pub fn zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_add(rhs.0))
    }
}

impl std::ops::Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle(self.0.wrapping_sub(rhs.0))
    }
}

impl std::ops::Neg for Angle {
    type Output = Angle;
    fn neg(self) -> Angle {
        Angle(self.0.wrapping_neg())
    }
}

impl PartialOrd for Angle {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

// ── Free normalization helpers (for the unavoidable f64-degree boundaries) ──

/// Force angle into (-180, 180].
pub fn symmetric_deg(mut alpha_deg: f64) -> f64 {
    while alpha_deg > 180.0 {
        alpha_deg -= 360.0;
    }
    while alpha_deg <= -180.0 {
        alpha_deg += 360.0;
    }
    alpha_deg
}

/// Force angle into [-180, 180).
pub fn normalize_deg(mut alpha_deg: f64) -> f64 {
    while alpha_deg >= 180.0 {
        alpha_deg -= 360.0;
    }
    while alpha_deg < -180.0 {
        alpha_deg += 360.0;
    }
    alpha_deg
}

/// Force radians into (-pi, pi].
pub fn symmetric_rad(mut alpha_rad: f64) -> f64 {
    while alpha_rad > PI {
        alpha_rad -= 2.0 * PI;
    }
    while alpha_rad <= -PI {
        alpha_rad += 2.0 * PI;
    }
    alpha_rad
}

/// Force radians into [0, 2*pi).
pub fn normalize_rad(mut alpha_rad: f64) -> f64 {
    while alpha_rad >= 2.0 * PI {
        alpha_rad -= 2.0 * PI;
    }
    while alpha_rad < 0.0 {
        alpha_rad += 2.0 * PI;
    }
    alpha_rad
}

/// Signed smallest change mapping `old` to `new`, magnitude <= 180 deg.
pub fn delta_old_new_rad(old_rad: f64, new_rad: f64) -> f64 {
    symmetric_rad(new_rad - old_rad)
}

pub fn delta_old_new_deg(old_deg: f64, new_deg: f64) -> f64 {
    symmetric_deg(new_deg - old_deg)
}

/// Picks whichever of opt1, opt2 is angularly closer to target. Ties go to opt1.
pub fn nearer_rad(target: f64, opt1: f64, opt2: f64) -> f64 {
    let d1 = delta_old_new_rad(target, opt1).abs();
    let d2 = delta_old_new_rad(target, opt2).abs();
    if d2 < d1 {
        opt2
    } else {
        opt1
    }
}

pub fn nearer_deg(target: f64, opt1: f64, opt2: f64) -> f64 {
    let d1 = delta_old_new_deg(target, opt1).abs();
    let d2 = delta_old_new_deg(target, opt2).abs();
    if d2 < d1 {
        opt2
    } else {
        opt1
    }
}

/// Rate-limits `in_value` with correct wraparound handling, mutating `follows`
/// toward it by at most `max_delta` radians this step.
pub fn limit_rate_wrap_rad(in_value: f64, max_delta: f64, follows: &mut f64) {
    let mut delta = in_value - *follows;
    if delta > PI {
        delta -= 2.0 * PI;
    }
    if delta < -PI {
        delta += 2.0 * PI;
    }
    let delta = delta.clamp(-max_delta, max_delta);
    *follows += delta;
    *follows = symmetric_rad(*follows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_deg() {
        for d in [-180.0, -90.0, -0.1, 0.0, 0.1, 90.0, 179.9] {
            let a = Angle::from_deg(d).unwrap();
            assert!((a.to_deg() - d).abs() < 1e-6, "d={d} got={}", a.to_deg());
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Angle::from_deg(360.0).is_err());
        assert!(Angle::from_deg(-180.1).is_err());
    }

    #[test]
    fn add_then_sub_is_identity() {
        let a = Angle::from_deg(170.0).unwrap();
        let b = Angle::from_deg(-50.0).unwrap();
        let sum = a + b;
        assert_eq!(sum - b, a);
    }

    #[test]
    fn wraps_at_boundary() {
        let a = Angle::from_deg(170.0).unwrap();
        let b = Angle::from_deg(20.0).unwrap();
        let sum = a + b;
        // 170 + 20 = 190 -> wraps to -170
        assert!((sum.to_deg() - (-170.0)).abs() < 1e-6);
    }

    #[test]
    fn opposite_is_180_away() {
        let a = Angle::from_deg(10.0).unwrap();
        assert!((a.opposite().to_deg() - (-170.0)).abs() < 1e-6);
    }

    #[test]
    fn normalize_deg_always_in_range() {
        for d in [-720.0, -400.0, -1.0, 0.0, 179.9, 400.0, 720.5] {
            let n = normalize_deg(d);
            assert!((-180.0..180.0).contains(&n), "d={d} n={n}");
        }
    }

    #[test]
    fn symmetric_deg_always_in_range() {
        for d in [-720.0, -181.0, -1.0, 0.0, 180.0, 400.0] {
            let n = symmetric_deg(d);
            assert!(n > -180.0 && n <= 180.0, "d={d} n={n}");
        }
    }

    #[test]
    fn nearer_deg_ties_go_to_opt1() {
        assert_eq!(nearer_deg(0.0, 10.0, -10.0), 10.0);
    }

    #[test]
    fn limit_rate_wrap_handles_crossing() {
        let mut follows = 179.0_f64.to_radians();
        limit_rate_wrap_rad((-179.0_f64).to_radians(), 4.0_f64.to_radians(), &mut follows);
        // Should move toward -180/180 by the short way, i.e. increase past 180.
        assert!(follows.to_degrees() > 179.0 || follows.to_degrees() < -179.0);
    }
}
