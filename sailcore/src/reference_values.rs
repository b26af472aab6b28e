//! Time-profiled synchronized boat-and-sail turn planner. Grounded in
//! `helmsman/reference_values.cc`.

use crate::boat::{ticks_for, SAMPLING_PERIOD_S};
use crate::sail_controller::gamma_delta;

const DURATION_NORMAL_S: f64 = 4.0;
const OMEGA_MAX_SAIL: f64 = crate::boat::OMEGA_MAX_SAIL;
const STABILIZATION_S: f64 = 1.2;

/// `(phi_z_star, omega_z_star, gamma_sail_star)` sampled once per tick.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceSample {
    pub phi_z_star_rad: f64,
    pub omega_z_star_rad_s: f64,
    pub gamma_sail_star_rad: f64,
}

/// A single synchronized turn: boat heading ramps accel/cruise/decel over
/// `total_ticks`, sail sweeps linearly over the same span, then both hold
/// for a stabilization period before the plan goes idle.
#[derive(Debug, Clone)]
pub struct ReferenceValues {
    tick: u64,
    total_ticks: u64,
    stabilization_ticks: u64,
    acc_rad_s2: f64,
    goal_heading_rad: f64,
    goal_gamma_sail_rad: f64,
    start_heading_rad: f64,
    start_gamma_sail_rad: f64,
    omega_sail_increment_rad: f64,
}

impl ReferenceValues {
    /// An idle planner (as at start-up, before any maneuver has been seeded).
    pub fn idle() -> Self {
        ReferenceValues {
            tick: 0,
            total_ticks: 0,
            stabilization_ticks: 0,
            acc_rad_s2: 0.0,
            goal_heading_rad: 0.0,
            goal_gamma_sail_rad: 0.0,
            start_heading_rad: 0.0,
            start_gamma_sail_rad: 0.0,
            omega_sail_increment_rad: 0.0,
        }
    }

    /// Starts a new plan from `start_heading_rad`/`start_gamma_sail_rad` to
    /// `phi_z_goal_rad`, sweeping the sail by `delta_gamma_sail_rad`, at the
    /// given boat `speed_m_s`.
    pub fn new_plan(
        start_heading_rad: f64,
        phi_z_goal_rad: f64,
        start_gamma_sail_rad: f64,
        delta_gamma_sail_rad: f64,
        speed_m_s: f64,
    ) -> Self {
        let delta_phi = crate::angle::delta_old_new_rad(start_heading_rad, phi_z_goal_rad);
        let acc_max = (0.25 * speed_m_s * speed_m_s).max(0.1);

        let duration_sail_s = if OMEGA_MAX_SAIL > 0.0 {
            delta_gamma_sail_rad.abs() / OMEGA_MAX_SAIL
        } else {
            0.0
        };
        let duration_acc_s = (delta_phi.abs() / acc_max * 36.0 / 5.0).sqrt();

        let duration_s = DURATION_NORMAL_S.max(duration_sail_s).max(duration_acc_s);
        let raw_ticks = ticks_for(duration_s) as u64;
        let total_ticks = ((raw_ticks + 5) / 6) * 6;
        let total_ticks = total_ticks.max(6);

        let duration_s = total_ticks as f64 * SAMPLING_PERIOD_S;
        let acc_rad_s2 = delta_phi * 36.0 / (5.0 * duration_s * duration_s);

        ReferenceValues {
            tick: 0,
            total_ticks,
            stabilization_ticks: ticks_for(STABILIZATION_S) as u64,
            acc_rad_s2,
            goal_heading_rad: phi_z_goal_rad,
            goal_gamma_sail_rad: start_gamma_sail_rad + delta_gamma_sail_rad,
            start_heading_rad,
            start_gamma_sail_rad,
            omega_sail_increment_rad: delta_gamma_sail_rad / total_ticks as f64,
        }
    }

    /// True while the plan is still producing non-final samples.
    pub fn running_plan(&self) -> bool {
        self.tick < self.total_ticks + self.stabilization_ticks
    }

    /// Advances the plan by one tick and returns the sample for this tick.
    /// Calling this past the end of the plan keeps returning the final,
    /// drift-free values.
    pub fn step(&mut self) -> ReferenceSample {
        if !self.running_plan() {
            return ReferenceSample {
                phi_z_star_rad: self.goal_heading_rad,
                omega_z_star_rad_s: 0.0,
                gamma_sail_star_rad: self.goal_gamma_sail_rad,
            };
        }

        let sixth = self.total_ticks / 6;
        let acc = if self.tick < sixth {
            self.acc_rad_s2
        } else if self.tick < 5 * sixth {
            0.0
        } else if self.tick < self.total_ticks {
            -self.acc_rad_s2
        } else {
            0.0
        };

        let sample = if self.tick < self.total_ticks {
            let omega = self.integrate_omega(acc);
            let phi = self.integrate_phi(omega);
            let gamma_sail = self.start_gamma_sail_rad
                + self.omega_sail_increment_rad * (self.tick + 1) as f64;
            ReferenceSample {
                phi_z_star_rad: phi,
                omega_z_star_rad_s: omega,
                gamma_sail_star_rad: gamma_sail,
            }
        } else {
            ReferenceSample {
                phi_z_star_rad: self.goal_heading_rad,
                omega_z_star_rad_s: 0.0,
                gamma_sail_star_rad: self.goal_gamma_sail_rad,
            }
        };

        self.tick += 1;
        if !self.running_plan() {
            return ReferenceSample {
                phi_z_star_rad: self.goal_heading_rad,
                omega_z_star_rad_s: 0.0,
                gamma_sail_star_rad: self.goal_gamma_sail_rad,
            };
        }
        sample
    }

    /// omega at the *end* of tick `self.tick`, integrated piecewise-linearly
    /// from the trapezoidal acceleration profile.
    fn integrate_omega(&self, _acc_this_tick: f64) -> f64 {
        let sixth = self.total_ticks / 6;
        let t = self.tick + 1;
        let dt = SAMPLING_PERIOD_S;
        if t <= sixth {
            self.acc_rad_s2 * (t as f64) * dt
        } else if t <= 5 * sixth {
            self.acc_rad_s2 * (sixth as f64) * dt
        } else {
            let peak = self.acc_rad_s2 * (sixth as f64) * dt;
            let decel_ticks = (t - 5 * sixth) as f64;
            peak - self.acc_rad_s2 * decel_ticks * dt
        }
    }

    fn integrate_phi(&self, _omega_end: f64) -> f64 {
        // Closed-form trapezoid-profile displacement up to tick `self.tick+1`,
        // expressed directly in terms of the six-phase schedule rather than
        // re-summed every call.
        let sixth = self.total_ticks / 6;
        let dt = SAMPLING_PERIOD_S;
        let t = (self.tick + 1).min(self.total_ticks);
        let acc = self.acc_rad_s2;

        let phase1 = |n: u64| 0.5 * acc * (n as f64 * dt).powi(2);
        let t1 = sixth.min(t);
        let mut phi = phase1(t1);

        if t > sixth {
            let t2 = (5 * sixth).min(t) - sixth;
            let v1 = acc * (sixth as f64 * dt);
            phi += v1 * (t2 as f64 * dt);
        }
        if t > 5 * sixth {
            let t3 = t - 5 * sixth;
            let v1 = acc * (sixth as f64 * dt);
            phi += v1 * (t3 as f64 * dt) - 0.5 * acc * (t3 as f64 * dt).powi(2);
        }
        self.start_heading_rad + phi
    }
}

impl Default for ReferenceValues {
    fn default() -> Self {
        Self::idle()
    }
}

/// Convenience re-export so callers computing a sail delta for `new_plan`
/// don't need to reach into `sail_controller` directly.
pub fn sail_delta(old_gamma_sail_rad: f64, new_gamma_sail_rad: f64) -> f64 {
    gamma_delta(old_gamma_sail_rad, new_gamma_sail_rad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_reaches_goal_heading_exactly_at_end() {
        let mut p = ReferenceValues::new_plan(0.0, 1.0, 0.0, 0.5, 2.0);
        let mut last = ReferenceSample { phi_z_star_rad: 0.0, omega_z_star_rad_s: 0.0, gamma_sail_star_rad: 0.0 };
        while p.running_plan() {
            last = p.step();
        }
        assert!((last.phi_z_star_rad - 1.0).abs() < 1e-6);
        assert_eq!(last.omega_z_star_rad_s, 0.0);
    }

    #[test]
    fn running_plan_transitions_exactly_once() {
        let mut p = ReferenceValues::new_plan(0.0, 0.5, 0.0, 0.2, 2.0);
        let mut transitions = 0;
        let mut was_running = p.running_plan();
        for _ in 0..10_000 {
            p.step();
            let now_running = p.running_plan();
            if was_running && !now_running {
                transitions += 1;
            }
            was_running = now_running;
        }
        assert_eq!(transitions, 1);
    }

    #[test]
    fn idle_plan_is_not_running() {
        let p = ReferenceValues::idle();
        assert!(!p.running_plan());
    }

    #[test]
    fn duration_is_at_least_the_normal_minimum() {
        let p = ReferenceValues::new_plan(0.0, 0.01, 0.0, 0.0, 0.1);
        assert!(p.total_ticks as f64 * SAMPLING_PERIOD_S >= DURATION_NORMAL_S - 1e-9);
    }

    #[test]
    fn total_ticks_is_a_multiple_of_six() {
        let p = ReferenceValues::new_plan(0.0, 2.0, 0.0, 1.0, 3.0);
        assert_eq!(p.total_ticks % 6, 0);
    }
}
