//! Tilt-independent magnetic-to-geographic bearing correction. Grounded in
//! `helmsman/compass.cc`, which (despite `spec.md`'s Open Question that the
//! correction is a stub) implements a working fixed-declination correction —
//! see `SPEC_FULL.md`'s supplemented-features note #2.

/// Magnetic declination at the operating area, radians, positive east.
/// A configured constant rather than a WMM table lookup (no online
/// learning, per the Non-goals).
pub const DEFAULT_DECLINATION_RAD: f64 = 1.0_f64.to_radians();

/// Converts a magnetic bearing to a geographic (true) bearing.
pub fn magnetic_to_geographic(magnetic_bearing_rad: f64, declination_rad: f64) -> f64 {
    crate::angle::symmetric_rad(magnetic_bearing_rad + declination_rad)
}

pub fn geographic_to_magnetic(geographic_bearing_rad: f64, declination_rad: f64) -> f64 {
    crate::angle::symmetric_rad(geographic_bearing_rad - declination_rad)
}

/// Raw magnetometer-derived heading in the boat's horizontal plane, ignoring
/// tilt compensation (the full `GravityVectorToPitchAndRoll` treatment in
/// the original is out of scope here: the filter block already has an IMU
/// attitude estimate and only needs this as one of three mixed inputs).
pub fn raw_mag_heading_rad(mag_x: f64, mag_y: f64) -> f64 {
    mag_y.atan2(mag_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declination_correction_round_trips() {
        let mag = 42.0_f64.to_radians();
        let geo = magnetic_to_geographic(mag, DEFAULT_DECLINATION_RAD);
        let back = geographic_to_magnetic(geo, DEFAULT_DECLINATION_RAD);
        assert!((back - mag).abs() < 1e-9);
    }
}
