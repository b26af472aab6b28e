//! Single-vessel physics model: reacts to commanded rudder/sail angles the
//! way the real boat would, so the daemon can be exercised end to end
//! without real hardware. Grounded in `sailcore`'s own primitives (the
//! polar diagram, apparent-wind algebra, and spherical geodesy) rather than
//! a from-scratch hydrodynamic model, per spec.md's Non-goal on simulation
//! fidelity: this only needs to be plausible enough to drive the daemon's
//! state machine through its transitions.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use sailcore::polar::Polar;
use sailcore::polar_diagram::read_polar_diagram;
use sailcore::{angle, apparent, boat, latlon};

/// Maximum rudder slew rate, rad/s (no authoritative figure in spec.md; set
/// comfortably faster than `OMEGA_MAX_SAIL` since rudders are the lighter
/// actuator).
const OMEGA_MAX_RUDDER_RAD_S: f64 = 0.6;
/// Proportional gain from (mean rudder angle * boat speed) to yaw rate.
const TURN_GAIN: f64 = 0.35;
/// Rate at which boat speed chases the polar diagram's target, m/s^2.
const SPEED_ACCEL_M_S2: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct AisTrack {
    pub mmsi: i64,
    pub position: latlon::LatLon,
    pub bearing_rad: f64,
    pub speed_m_s: f64,
}

impl AisTrack {
    pub fn advance(&mut self, dt_s: f64) {
        self.position = latlon::spherical_move(self.position, self.bearing_rad, self.speed_m_s * dt_s);
    }
}

/// Everything the simulator needs to produce a full tick's worth of bus
/// traffic: boat kinematics, true wind, and any AIS contacts in scope.
pub struct BoatSim {
    pub position: latlon::LatLon,
    pub heading_rad: f64,
    pub yaw_rate_rad_s: f64,
    pub boat_speed_m_s: f64,
    pub gamma_rudder_left_actual_rad: f64,
    pub gamma_rudder_right_actual_rad: f64,
    pub gamma_sail_actual_rad: f64,
    gamma_rudder_left_cmd_rad: f64,
    gamma_rudder_right_cmd_rad: f64,
    gamma_sail_cmd_rad: f64,
    pub true_wind_bearing_rad: f64,
    pub true_wind_speed_m_s: f64,
    pub ais_tracks: Vec<AisTrack>,
    noise: Normal<f64>,
}

impl BoatSim {
    pub fn new(
        position: latlon::LatLon,
        heading_rad: f64,
        true_wind_bearing_rad: f64,
        true_wind_speed_m_s: f64,
        ais_tracks: Vec<AisTrack>,
    ) -> Self {
        BoatSim {
            position,
            heading_rad,
            yaw_rate_rad_s: 0.0,
            boat_speed_m_s: 0.0,
            gamma_rudder_left_actual_rad: 0.0,
            gamma_rudder_right_actual_rad: 0.0,
            gamma_sail_actual_rad: 0.0,
            gamma_rudder_left_cmd_rad: 0.0,
            gamma_rudder_right_cmd_rad: 0.0,
            gamma_sail_cmd_rad: 0.0,
            true_wind_bearing_rad,
            true_wind_speed_m_s,
            ais_tracks,
            noise: Normal::new(0.0, 0.01).expect("fixed sigma is always valid"),
        }
    }

    /// Latest `rudderctl` command received from the daemon.
    pub fn command(&mut self, rudder_l_rad: f64, rudder_r_rad: f64, sail_rad: f64) {
        self.gamma_rudder_left_cmd_rad = rudder_l_rad;
        self.gamma_rudder_right_cmd_rad = rudder_r_rad;
        self.gamma_sail_cmd_rad = sail_rad;
    }

    /// Advances the simulation by `dt_s`, letting the actuators chase their
    /// last commanded angle and the boat chase the polar diagram's speed
    /// for the current point of sail.
    pub fn tick(&mut self, dt_s: f64) {
        angle::limit_rate_wrap_rad(
            self.gamma_rudder_left_cmd_rad,
            OMEGA_MAX_RUDDER_RAD_S * dt_s,
            &mut self.gamma_rudder_left_actual_rad,
        );
        angle::limit_rate_wrap_rad(
            self.gamma_rudder_right_cmd_rad,
            OMEGA_MAX_RUDDER_RAD_S * dt_s,
            &mut self.gamma_rudder_right_actual_rad,
        );
        angle::limit_rate_wrap_rad(
            self.gamma_sail_cmd_rad,
            boat::OMEGA_MAX_SAIL * dt_s,
            &mut self.gamma_sail_actual_rad,
        );

        let mean_rudder = (self.gamma_rudder_left_actual_rad + self.gamma_rudder_right_actual_rad) / 2.0;
        self.yaw_rate_rad_s = TURN_GAIN * mean_rudder * self.boat_speed_m_s.max(0.1);
        self.heading_rad = angle::symmetric_rad(self.heading_rad + self.yaw_rate_rad_s * dt_s);

        let wind_angle_on_bow = angle::symmetric_rad(self.true_wind_bearing_rad - self.heading_rad);
        let (_, _, target_speed) = read_polar_diagram(wind_angle_on_bow, self.true_wind_speed_m_s);
        let speed_delta = (target_speed - self.boat_speed_m_s).clamp(
            -SPEED_ACCEL_M_S2 * dt_s,
            SPEED_ACCEL_M_S2 * dt_s,
        );
        self.boat_speed_m_s = (self.boat_speed_m_s + speed_delta).max(0.0);

        self.position = latlon::spherical_move(self.position, self.heading_rad, self.boat_speed_m_s * dt_s);

        for track in &mut self.ais_tracks {
            track.advance(dt_s);
        }
    }

    /// Apparent wind as the mast sensor would read it: boat-relative angle
    /// and magnitude, a little measurement noise included.
    pub fn apparent_wind(&self, rng: &mut impl Rng) -> (f64, f64) {
        let true_wind_global = Polar::new(self.true_wind_bearing_rad, self.true_wind_speed_m_s);
        let boat_velocity_global = Polar::new(self.heading_rad, self.boat_speed_m_s);
        let apparent_global = apparent::apparent_polar(true_wind_global, boat_velocity_global);
        let angle_on_boat = angle::symmetric_rad(apparent_global.angle_rad() - self.heading_rad)
            + self.noise.sample(rng);
        (angle_on_boat, apparent_global.mag().max(0.0))
    }

    /// A small heel/pitch estimate so the simulated IMU isn't flat-lined.
    /// Heel scales with boat speed and sail angle; a simple proxy, not a
    /// hydrodynamic model.
    pub fn heel_pitch_rad(&self) -> (f64, f64) {
        let heel = (self.boat_speed_m_s * self.gamma_sail_actual_rad.abs()).min(0.35);
        let pitch = 0.02 * self.boat_speed_m_s.min(3.0);
        (heel, pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn boat_accelerates_on_a_reach() {
        let mut sim = BoatSim::new(latlon::LatLon::new(47.0, 8.0), 0.0, PI, 8.0, Vec::new());
        // Beam reach: true wind from the north, heading due east.
        sim.heading_rad = PI / 2.0;
        sim.command(0.0, 0.0, -0.3);
        for _ in 0..200 {
            sim.tick(0.1);
        }
        assert!(sim.boat_speed_m_s > 0.5, "expected the boat to pick up speed, got {}", sim.boat_speed_m_s);
    }

    #[test]
    fn rudder_actual_chases_command_without_overshoot() {
        let mut sim = BoatSim::new(latlon::LatLon::new(0.0, 0.0), 0.0, 0.0, 5.0, Vec::new());
        sim.command(0.4, 0.4, 0.0);
        for _ in 0..50 {
            sim.tick(0.1);
        }
        assert!((sim.gamma_rudder_left_actual_rad - 0.4).abs() < 1e-6);
    }

    #[test]
    fn ais_track_advances_along_its_bearing() {
        let mut track = AisTrack {
            mmsi: 1,
            position: latlon::LatLon::new(0.0, 0.0),
            bearing_rad: PI / 2.0,
            speed_m_s: 5.0,
        };
        let start = track.position;
        track.advance(10.0);
        let (_, distance) = latlon::spherical_shortest_path(start, track.position);
        assert!((distance - 50.0).abs() < 1.0);
    }
}
