//! Strategic layer: picks the desired global heading (`alpha_star`) each
//! time fresh GPS/wind data arrives, from a target-circle plan, overridden
//! by storm handling and AIS collision avoidance. Grounded in
//! `skipper/skipper.cc`.

mod target_circle;
mod vskipper;

pub use target_circle::{TargetCircle, TargetCircleCascade};
pub use vskipper::{AisContact, AvoidanceResult};

use crate::boat::SAMPLING_PERIOD_S;
use crate::latlon::LatLon;
use crate::polar_diagram::best_sailable_heading;
use crate::wind_classifier::{WindClassifier, WindStrength};
use std::f64::consts::PI;

/// Fallback heading when no plan has been loaded yet, per spec error
/// taxonomy item 4.
pub const NO_PLAN_BEARING_RAD: f64 = 225.0 * PI / 180.0;

/// Broad-reach angle off the true wind held during a storm.
const STORM_REACH_RAD: f64 = 50.0 * PI / 180.0;

/// Rotation applied to the held bearing every `LOITER_PERIOD_S` once the
/// final target circle has been reached, so the boat station-keeps instead
/// of holding a bearing through the destination forever. Supplemented from
/// `original_source/skipper/planner.cc`'s `alpha_star_ -= 72` loiter step.
const LOITER_STEP_RAD: f64 = -72.0 * PI / 180.0;
const LOITER_PERIOD_S: f64 = 120.0;

#[derive(Debug, Default)]
struct StormState {
    active: bool,
    sign_plus: bool,
}

/// All of Skipper's persisted state, owned by whoever runs the control
/// loop (see design notes: no module-level globals).
pub struct SkipperState {
    cascade: Option<TargetCircleCascade>,
    wind_classifier: WindClassifier,
    storm: StormState,
    loiter_ticks_since_turn: u64,
    loiter_heading_rad: f64,
    alpha_star_rad: f64,
    last_logged_rad: f64,
}

impl SkipperState {
    pub fn new() -> Self {
        SkipperState {
            cascade: None,
            wind_classifier: WindClassifier::new(),
            storm: StormState::default(),
            loiter_ticks_since_turn: 0,
            loiter_heading_rad: NO_PLAN_BEARING_RAD,
            alpha_star_rad: NO_PLAN_BEARING_RAD,
            last_logged_rad: NO_PLAN_BEARING_RAD,
        }
    }

    /// Loads the plan once; subsequent calls are a no-op. Mirrors the
    /// original's "load based on first-call GPS position" behavior, except
    /// the cascade is always supplied by the caller rather than selected
    /// from a hardcoded named region (there is no chart database here).
    pub fn load_plan(&mut self, cascade: TargetCircleCascade) {
        if self.cascade.is_none() {
            self.cascade = Some(cascade);
        }
    }

    pub fn has_plan(&self) -> bool {
        self.cascade.is_some()
    }

    pub fn wind_strength(&self) -> WindStrength {
        self.wind_classifier.state()
    }

    /// One strategic tick: `pos` must come from a fresh GPS fix (caller's
    /// responsibility — this does not itself gate on fix validity, since
    /// spec's "lost GPS fix" handling is "continue with last known safe
    /// bearing", i.e. simply do not call this and keep the previous output).
    pub fn run(
        &mut self,
        pos: LatLon,
        alpha_true_rad: f64,
        mag_true_m_s: f64,
        contacts: &[AisContact],
    ) -> f64 {
        let plan_bearing = match &self.cascade {
            None => {
                tracing::warn!("skipper: no plan loaded, falling back to default bearing");
                NO_PLAN_BEARING_RAD
            }
            Some(cascade) => {
                if cascade.target_reached(pos) {
                    self.loiter_ticks_since_turn += 1;
                    if self.loiter_ticks_since_turn as f64 * SAMPLING_PERIOD_S >= LOITER_PERIOD_S {
                        self.loiter_ticks_since_turn = 0;
                        self.loiter_heading_rad =
                            crate::angle::symmetric_rad(self.loiter_heading_rad + LOITER_STEP_RAD);
                    }
                    self.loiter_heading_rad
                } else {
                    self.loiter_ticks_since_turn = 0;
                    self.loiter_heading_rad = cascade.to_deg(pos);
                    self.loiter_heading_rad
                }
            }
        };
        self.log_stage("plan", plan_bearing);

        let wind_strength = self.wind_classifier.step(mag_true_m_s);
        let after_storm = self.apply_storm(wind_strength, plan_bearing, alpha_true_rad);
        self.log_stage("storm", after_storm);

        let after_collision = if contacts.is_empty() {
            after_storm
        } else {
            let result = vskipper::avoid_collisions(after_storm, alpha_true_rad, mag_true_m_s.max(0.1), pos, contacts);
            if result.no_safe_way {
                tracing::warn!("skipper: no safe way found around AIS contacts");
            }
            result.bearing_rad
        };
        self.log_stage("collision", after_collision);

        let sailable = best_sailable_heading(after_collision, alpha_true_rad);
        self.log_stage("sailable", sailable);

        self.alpha_star_rad = sailable;
        sailable
    }

    fn apply_storm(&mut self, wind_strength: WindStrength, plan_bearing_rad: f64, alpha_true_rad: f64) -> f64 {
        match wind_strength {
            WindStrength::Storm => {
                if !self.storm.active {
                    // Entering storm: fix the tack (port/starboard side of
                    // the broad reach) to whichever is closest to the plan.
                    let plus = crate::angle::symmetric_rad(alpha_true_rad + STORM_REACH_RAD);
                    let minus = crate::angle::symmetric_rad(alpha_true_rad - STORM_REACH_RAD);
                    let nearer_is_plus = crate::angle::delta_old_new_rad(plan_bearing_rad, plus).abs()
                        <= crate::angle::delta_old_new_rad(plan_bearing_rad, minus).abs();
                    self.storm = StormState { active: true, sign_plus: nearer_is_plus };
                    tracing::info!("skipper: storm entered, holding {} tack", if nearer_is_plus { "plus" } else { "minus" });
                }
                let sign = if self.storm.sign_plus { 1.0 } else { -1.0 };
                crate::angle::symmetric_rad(alpha_true_rad + sign * STORM_REACH_RAD)
            }
            _ => {
                if self.storm.active {
                    tracing::info!("skipper: storm cleared");
                }
                self.storm = StormState::default();
                plan_bearing_rad
            }
        }
    }

    fn log_stage(&mut self, stage: &str, bearing_rad: f64) {
        let delta = crate::angle::delta_old_new_rad(self.last_logged_rad, bearing_rad).abs();
        if delta.to_degrees() > 0.1 {
            tracing::debug!(stage, bearing_deg = bearing_rad.to_degrees(), "skipper stage changed alpha_star");
        }
        self.last_logged_rad = bearing_rad;
    }
}

impl Default for SkipperState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skipper::target_circle::TargetCircle;

    #[test]
    fn no_plan_falls_back_to_default_bearing() {
        let mut s = SkipperState::new();
        let out = s.run(LatLon::new(47.0, 8.0), 0.0, 5.0, &[]);
        assert!((out - best_sailable_heading(NO_PLAN_BEARING_RAD, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn storm_onset_picks_the_nearer_tack() {
        let mut s = SkipperState::new();
        s.load_plan(TargetCircleCascade::new(vec![TargetCircle::new(LatLon::new(50.0, 8.0), 0.01)]));
        let pos = LatLon::new(47.0, 8.0);
        // True wind from north (blowing toward 180 / south); plan heading
        // 225 deg; 230 (180+50) is closer to 225 than 130 (180-50).
        for mag in [19.0, 19.5, 20.5, 21.0] {
            s.run(pos, PI, mag, &[]);
        }
        assert_eq!(s.wind_strength(), WindStrength::Storm);
        let out_unsailed = s.apply_storm(WindStrength::Storm, 225.0_f64.to_radians(), PI);
        assert!((out_unsailed.to_degrees() - 230.0).abs() < 1.0);
    }

    #[test]
    fn storm_holds_tack_until_wind_drops_below_exit_threshold() {
        let mut s = SkipperState::new();
        s.load_plan(TargetCircleCascade::new(vec![TargetCircle::new(LatLon::new(50.0, 8.0), 0.01)]));
        let pos = LatLon::new(47.0, 8.0);
        s.run(pos, PI, 21.0, &[]);
        assert_eq!(s.wind_strength(), WindStrength::Storm);
        s.run(pos, PI, 17.0, &[]);
        assert_eq!(s.wind_strength(), WindStrength::Storm);
        s.run(pos, PI, 15.0, &[]);
        assert_eq!(s.wind_strength(), WindStrength::Normal);
    }
}
