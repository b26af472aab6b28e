//! The tactical brain: shapes `alpha_star` into a sailable heading, plans
//! synchronized tack/jibe/change maneuvers, and runs the rudder and sail
//! inner loops every tick in between. Grounded in
//! `helmsman/normal_controller.cc`.

use crate::angle::{delta_old_new_rad, limit_rate_wrap_rad};
use crate::controller_io::{ControllerInput, ControllerOutput, FilteredMeasurements};
use crate::maneuver::{find_maneuver_type, is_jump, next_gamma_sail_with_old, ManeuverType};
use crate::point_of_sail::{classify, AntiGustFilter};
use crate::polar_diagram::best_sailable_heading_hysteresis;
use crate::reference_values::ReferenceValues;
use crate::rudder_controller::{self, MIN_SPEED_M_S};
use crate::sail_controller::StabilizedSailController;

const ALPHA_STAR_RATE_LIMIT_RAD_S: f64 = 4.0_f64.to_radians();
const GIVE_UP_SPEED_M_S: f64 = 0.03;
const GIVE_UP_SECONDS: f64 = 120.0;

pub struct NormalController {
    alpha_star_rate_limited_rad: f64,
    alpha_star_restricted_rad: f64,
    prev_alpha_star_restricted_rad: f64,
    give_up_ticks: u64,
    plan: ReferenceValues,
    sail_stabilizer: StabilizedSailController,
    anti_gust: AntiGustFilter,
    tacks: u64,
    jibes: u64,
}

impl NormalController {
    pub fn new() -> Self {
        NormalController {
            alpha_star_rate_limited_rad: 0.0,
            alpha_star_restricted_rad: 0.0,
            prev_alpha_star_restricted_rad: 0.0,
            give_up_ticks: 0,
            plan: ReferenceValues::idle(),
            sail_stabilizer: StabilizedSailController::new(),
            anti_gust: AntiGustFilter::new(),
            tacks: 0,
            jibes: 0,
        }
    }

    /// Reseeds all persisted state to the current heading/sail angle and
    /// clears the give-up counter, per spec's NormalController `entry`. The
    /// cumulative tack/jibe counters survive re-entry: they tally maneuvers
    /// over the boat's whole run, not just this stint in Normal.
    pub fn entry(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements) {
        self.alpha_star_rate_limited_rad = filtered.phi_z_boat;
        self.alpha_star_restricted_rad = filtered.phi_z_boat;
        self.prev_alpha_star_restricted_rad = filtered.phi_z_boat;
        self.give_up_ticks = 0;
        self.plan = ReferenceValues::idle();
        self.sail_stabilizer.seed(input.drives.gamma_sail_rad);
        self.anti_gust = AntiGustFilter::new();
    }

    /// Total tacks/jibes completed since this controller was constructed.
    pub fn tacks(&self) -> u64 {
        self.tacks
    }

    pub fn jibes(&self) -> u64 {
        self.jibes
    }

    pub fn give_up(&self, filtered: &FilteredMeasurements) -> bool {
        filtered.mag_boat.abs() < GIVE_UP_SPEED_M_S
            && self.give_up_ticks as f64 * crate::boat::SAMPLING_PERIOD_S >= GIVE_UP_SECONDS
    }

    pub fn run(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements) -> ControllerOutput {
        if filtered.mag_boat.abs() < GIVE_UP_SPEED_M_S {
            self.give_up_ticks += 1;
        } else {
            self.give_up_ticks = 0;
        }

        let (phi_z_star, omega_z_star, gamma_sail_star, maneuver) =
            self.reference_value_switch(input, filtered);

        let hysteresis_source_rad =
            delta_old_new_rad(self.prev_alpha_star_restricted_rad, self.alpha_star_restricted_rad);
        self.prev_alpha_star_restricted_rad = self.alpha_star_restricted_rad;

        // Anti-gust: nudge the commanded heading when the apparent wind
        // creeps into the forbidden frontal zone, so a gust doesn't luff
        // the sail before the rudder loop can react.
        let sector = classify(self.alpha_star_restricted_rad, filtered.alpha_true, hysteresis_source_rad);
        let gust_correction_rad = self.anti_gust.step(sector, filtered.angle_app, filtered.mag_app);
        let phi_z_star = phi_z_star + gust_correction_rad;

        let speed = filtered.mag_boat.abs().max(MIN_SPEED_M_S);
        let gamma_rudder = rudder_controller::gamma_rudder(
            phi_z_star,
            omega_z_star,
            filtered.phi_z_boat,
            filtered.omega_boat,
            speed,
        );

        let mut out = ControllerOutput::default();
        out.drives_reference.gamma_rudder_left_rad = gamma_rudder;
        out.drives_reference.gamma_rudder_right_rad = gamma_rudder;
        out.drives_reference.gamma_sail_rad = gamma_sail_star;
        if let Some(m) = maneuver {
            match m {
                ManeuverType::Tack => self.tacks += 1,
                ManeuverType::Jibe => self.jibes += 1,
                ManeuverType::Change => {}
            }
        }
        out.status.tacks = self.tacks;
        out.status.jibes = self.jibes;
        out
    }

    fn reference_value_switch(
        &mut self,
        input: &ControllerInput,
        filtered: &FilteredMeasurements,
    ) -> (f64, f64, f64, Option<ManeuverType>) {
        limit_rate_wrap_rad(
            input.alpha_star_rad,
            ALPHA_STAR_RATE_LIMIT_RAD_S * crate::boat::SAMPLING_PERIOD_S,
            &mut self.alpha_star_rate_limited_rad,
        );

        self.alpha_star_restricted_rad = best_sailable_heading_hysteresis(
            self.alpha_star_rate_limited_rad,
            filtered.alpha_true,
            self.prev_alpha_star_restricted_rad,
        );

        let jump = is_jump(self.prev_alpha_star_restricted_rad, self.alpha_star_restricted_rad);

        if jump && !self.plan.running_plan() {
            let maneuver = find_maneuver_type(
                self.prev_alpha_star_restricted_rad,
                self.alpha_star_restricted_rad,
                filtered.alpha_true,
            );
            let old_gamma_sail = input.drives.gamma_sail_rad;
            let new_sail = next_gamma_sail_with_old(filtered.angle_app, filtered.mag_app, maneuver, old_gamma_sail);
            self.plan = ReferenceValues::new_plan(
                self.prev_alpha_star_restricted_rad,
                self.alpha_star_restricted_rad,
                old_gamma_sail,
                new_sail.delta_gamma_sail_rad,
                filtered.mag_boat,
            );
            let sample = self.plan.step();
            return (
                sample.phi_z_star_rad,
                sample.omega_z_star_rad_s,
                sample.gamma_sail_star_rad,
                Some(maneuver),
            );
        }

        if self.plan.running_plan() {
            let sample = self.plan.step();
            return (sample.phi_z_star_rad, sample.omega_z_star_rad_s, sample.gamma_sail_star_rad, None);
        }

        let gamma_sail = self.sail_stabilizer.step(filtered.angle_app, filtered.mag_app);
        (self.alpha_star_restricted_rad, 0.0, gamma_sail, None)
    }
}

impl Default for NormalController {
    fn default() -> Self {
        Self::new()
    }
}

/// Exposed for the helmsman state machine, which needs to know the
/// magnitude of a heading change without going through `run`.
pub fn heading_delta(old_rad: f64, new_rad: f64) -> f64 {
    delta_old_new_rad(old_rad, new_rad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered_with(phi_z_boat: f64, alpha_true: f64, mag_boat: f64) -> FilteredMeasurements {
        FilteredMeasurements {
            phi_z_boat,
            alpha_true,
            mag_boat,
            valid: true,
            valid_app_wind: true,
            valid_true_wind: true,
            ..Default::default()
        }
    }

    #[test]
    fn becalmed_produces_zero_rudder_and_no_maneuver() {
        let mut nc = NormalController::new();
        let input = ControllerInput::default();
        // Beam reach: 90 deg clear of both the tack and jibe dead zones.
        let filtered = filtered_with(45.0_f64.to_radians(), 135.0_f64.to_radians(), 0.0);
        nc.entry(&input, &filtered);
        let mut input2 = input;
        input2.alpha_star_rad = 45.0_f64.to_radians();
        let out = nc.run(&input2, &filtered);
        assert!(out.drives_reference.gamma_rudder_left_rad.abs() < 1e-6);
        assert_eq!(out.status.tacks, 0);
        assert_eq!(out.status.jibes, 0);
    }

    #[test]
    fn small_heading_change_does_not_start_a_plan() {
        let mut nc = NormalController::new();
        let input = ControllerInput::default();
        let filtered = filtered_with(45.0_f64.to_radians(), 135.0_f64.to_radians(), 3.0);
        nc.entry(&input, &filtered);
        let mut input2 = input;
        input2.alpha_star_rad = 50.0_f64.to_radians();
        for _ in 0..5 {
            nc.run(&input2, &filtered);
        }
        assert!(!nc.plan.running_plan());
    }

    #[test]
    fn give_up_fires_after_sustained_near_zero_speed() {
        let mut nc = NormalController::new();
        let input = ControllerInput::default();
        let filtered = filtered_with(0.0, 0.0, 0.0);
        nc.entry(&input, &filtered);
        assert!(!nc.give_up(&filtered));
        for _ in 0..1201 {
            nc.run(&input, &filtered);
        }
        assert!(nc.give_up(&filtered));
    }
}
