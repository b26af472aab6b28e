//! Apparent/true wind vector algebra. Grounded in `helmsman/apparent.cc`.

use crate::angle::symmetric_rad;
use crate::polar::Polar;

/// Apparent wind angle on the boat, given the true wind vector (global
/// frame), the boat's velocity vector (global frame) and current heading.
pub fn apparent_angle_rad(true_wind: Polar, boat_velocity: Polar, phi_z_boat_rad: f64) -> f64 {
    let apparent = true_wind - boat_velocity;
    symmetric_rad(apparent.angle_rad() - phi_z_boat_rad)
}

pub fn apparent_polar(true_wind: Polar, boat_velocity: Polar) -> Polar {
    true_wind - boat_velocity
}

/// Reconstructs the true wind vector (global frame) from the apparent wind
/// as measured on the boat (boat-relative angle) plus the boat's own
/// velocity (global frame).
pub fn true_polar(apparent_on_boat: Polar, phi_z_boat_rad: f64, boat_velocity: Polar) -> Polar {
    let apparent_global = Polar::new(apparent_on_boat.angle_rad() + phi_z_boat_rad, apparent_on_boat.mag());
    apparent_global + boat_velocity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apparent_then_true_round_trips() {
        let phi_z_boat = 0.3;
        let boat_velocity_global = Polar::new(phi_z_boat, 3.0);
        let true_wind_global = Polar::new(1.0, 8.0);

        let apparent_global = true_wind_global - boat_velocity_global;
        let apparent_on_boat = Polar::new(apparent_global.angle_rad() - phi_z_boat, apparent_global.mag());

        let reconstructed = true_polar(apparent_on_boat, phi_z_boat, boat_velocity_global);
        assert!((reconstructed.x() - true_wind_global.x()).abs() < 1e-9);
        assert!((reconstructed.y() - true_wind_global.y()).abs() < 1e-9);
    }
}
