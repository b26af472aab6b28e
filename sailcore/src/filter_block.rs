//! Debounces and fuses raw sensor samples into `FilteredMeasurements`.
//! Grounded in `helmsman/filter_block.cc`.

use crate::angle::{delta_old_new_rad, limit_rate_wrap_rad, symmetric_rad};
use crate::apparent;
use crate::boat::{ticks_for, OMEGA_MAX_SAIL, SAMPLING_PERIOD_S};
use crate::compass;
use crate::controller_io::{ControllerInput, FilteredMeasurements};
use crate::filter::{Filter, Median5Filter, PolarFilter, SlidingAverageFilter, WrapAroundFilter};
use crate::polar::Polar;

const MAX_BOAT_SPEED_M_S: f64 = 2.8;
const COMPASS_CONSENSUS_MIN: f64 = 0.5;
const COMPASS_WEIGHT_MIN: f64 = 0.5;
const WEIGHT_IMU_HEADING: f64 = 0.15;
const WEIGHT_RAW_MAG: f64 = 0.075;
const WEIGHT_INDEPENDENT_COMPASS: f64 = 1.0;

pub struct FilterBlock {
    heading_filter: WrapAroundFilter<SlidingAverageFilter>,
    yaw_rate_median: Median5Filter,
    yaw_rate_avg: SlidingAverageFilter,
    speed_filter: SlidingAverageFilter,
    app_angle_filter: WrapAroundFilter<SlidingAverageFilter>,
    app_mag_filter: SlidingAverageFilter,
    true_wind_filter: PolarFilter<SlidingAverageFilter, SlidingAverageFilter>,
    aoa_filter: PolarFilter<SlidingAverageFilter, SlidingAverageFilter>,
    gamma_sail_model: f64,
    prev_heading: f64,
    prev_position: (f64, f64),
    declination_rad: f64,
}

impl FilterBlock {
    pub fn new() -> Self {
        FilterBlock {
            heading_filter: WrapAroundFilter::new(SlidingAverageFilter::new(ticks_for(0.6))),
            yaw_rate_median: Median5Filter::new(),
            yaw_rate_avg: SlidingAverageFilter::new(ticks_for(8.0)),
            speed_filter: SlidingAverageFilter::new(ticks_for(60.0)),
            app_angle_filter: WrapAroundFilter::new(SlidingAverageFilter::new(ticks_for(4.0))),
            app_mag_filter: SlidingAverageFilter::new(ticks_for(4.0)),
            true_wind_filter: PolarFilter::new(
                SlidingAverageFilter::new(ticks_for(100.0)),
                SlidingAverageFilter::new(ticks_for(100.0)),
            ),
            aoa_filter: PolarFilter::new(
                SlidingAverageFilter::new(ticks_for(30.0)),
                SlidingAverageFilter::new(ticks_for(30.0)),
            ),
            gamma_sail_model: 0.0,
            prev_heading: 0.0,
            prev_position: (0.0, 0.0),
            declination_rad: compass::DEFAULT_DECLINATION_RAD,
        }
    }

    fn censor_speed(x: f64) -> f64 {
        x.clamp(-MAX_BOAT_SPEED_M_S, MAX_BOAT_SPEED_M_S)
    }

    /// Advance the filter block by one tick. `gamma_sail_star_rad` is the
    /// currently commanded sail angle, used to rate-limit a delay-matched
    /// sail-angle model (the wind sensor lags the actual drive).
    pub fn step(&mut self, input: &ControllerInput, gamma_sail_star_rad: f64) -> FilteredMeasurements {
        let imu = &input.imu;
        let gps = &input.gps;
        let wind = &input.wind;

        // ── Heading: three-way compass mixer, then wrap-safe smoothing ──
        let raw_mag_rad = compass::raw_mag_heading_rad(imu.mag_x_au, imu.mag_y_au);
        let raw_mag_geo = compass::magnetic_to_geographic(raw_mag_rad, self.declination_rad);
        let independent_geo =
            compass::magnetic_to_geographic(input.compass.phi_z_rad, self.declination_rad);
        let (mixed, accepted) = mix_heading(
            imu.phi_z_rad,
            imu.valid,
            raw_mag_geo,
            input.compass.valid,
            independent_geo,
            input.compass.valid,
            self.prev_heading,
        );
        let heading_input = if accepted { mixed } else { self.prev_heading };
        self.prev_heading = heading_input;
        let phi_z_boat = self.heading_filter.filter(heading_input);

        // ── Yaw rate: Median5 -> SlidingAverage(8s) ──
        let omega_boat = self.yaw_rate_avg.filter(self.yaw_rate_median.filter(imu.gyro_z_rad_s));

        // ── Speed: weighted IMU/GPS mean, astern-drift sign flip, clip, average ──
        let imu_fault = !imu.valid;
        let gps_fault = !gps.valid;
        let weight_imu = if imu_fault { 0.0 } else { 0.5 };
        let weight_gps = if gps_fault { 0.0 } else { 0.5 };
        let weight_sum = weight_imu + weight_gps;
        let mut raw_speed = if weight_sum > 0.0 {
            (weight_imu * imu.velocity_x_m_s + weight_gps * gps.speed_m_s) / weight_sum
        } else {
            1.0 // optimistic assumption when both sources are faulty
        };
        if weight_sum > 0.0 {
            let astern = delta_old_new_rad(gps.cog_rad, phi_z_boat + std::f64::consts::PI);
            if astern.abs() <= std::f64::consts::FRAC_PI_4 {
                raw_speed = -raw_speed;
            }
        }
        let mag_boat = self.speed_filter.filter(Self::censor_speed(raw_speed));

        // ── Position: plain weighted mean, no range check ──
        let (lat, lon) = if weight_sum > 0.0 {
            (
                (weight_imu * imu.latitude_deg + weight_gps * gps.latitude_deg) / weight_sum,
                (weight_imu * imu.longitude_deg + weight_gps * gps.longitude_deg) / weight_sum,
            )
        } else {
            self.prev_position
        };
        self.prev_position = (lat, lon);

        // ── Apparent wind ──
        let angle_app = self
            .app_angle_filter
            .filter(symmetric_rad(wind.angle_deg.to_radians()));
        let mag_app = self.app_mag_filter.filter(wind.mag_m_s);

        // ── True wind: apparent + boat motion, Polar-filtered ──
        let boat_velocity_global = Polar::new(phi_z_boat, mag_boat.max(0.0));
        let apparent_on_boat = Polar::new(angle_app, mag_app.max(0.0));
        let true_raw = apparent::true_polar(apparent_on_boat, phi_z_boat, boat_velocity_global);
        let true_filtered = self.true_wind_filter.filter(true_raw);

        // ── Sail-angle delay model, rate-limited toward the commanded angle ──
        limit_rate_wrap_rad(
            gamma_sail_star_rad,
            OMEGA_MAX_SAIL * SAMPLING_PERIOD_S,
            &mut self.gamma_sail_model,
        );

        // ── Angle-of-attack wind: apparent wind referenced through the sail ──
        let aoa_raw = Polar::new(
            symmetric_rad(angle_app - self.gamma_sail_model),
            mag_app.max(0.0),
        );
        let aoa_filtered = self.aoa_filter.filter(aoa_raw);

        let valid = self.heading_filter.valid_output()
            && self.yaw_rate_avg.valid_output()
            && self.speed_filter.valid_output()
            && self.app_angle_filter.valid_output()
            && self.app_mag_filter.valid_output();
        let valid_app_wind = self.app_angle_filter.valid_output() && self.app_mag_filter.valid_output();
        let valid_true_wind = valid && self.true_wind_filter.valid_output();

        FilteredMeasurements {
            phi_z_boat,
            omega_boat,
            mag_boat,
            latitude_deg: lat,
            longitude_deg: lon,
            phi_x_rad: nan_guard(imu.phi_x_rad),
            phi_y_rad: nan_guard(imu.phi_y_rad),
            angle_app,
            mag_app,
            angle_aoa: aoa_filtered.angle_rad(),
            mag_aoa: aoa_filtered.mag(),
            alpha_true: true_filtered.angle_rad(),
            mag_true: true_filtered.mag(),
            temperature_c: nan_guard(imu.temperature_c),
            valid,
            valid_app_wind,
            valid_true_wind,
        }
    }
}

impl Default for FilterBlock {
    fn default() -> Self {
        Self::new()
    }
}

fn nan_guard(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

/// Three-way compass mixer: weighted circular mean of up to three heading
/// estimates, gated by a consensus check. Returns `(mixed_heading, accepted)`;
/// when not accepted, the caller should hold the previous value.
#[allow(clippy::too_many_arguments)]
fn mix_heading(
    imu_rad: f64,
    imu_valid: bool,
    raw_mag_rad: f64,
    raw_mag_valid: bool,
    independent_rad: f64,
    independent_valid: bool,
    _prev: f64,
) -> (f64, bool) {
    let mut sx = 0.0;
    let mut sy = 0.0;
    let mut weight_sum = 0.0;

    if imu_valid && !imu_rad.is_nan() {
        weight_sum += WEIGHT_IMU_HEADING;
        sx += WEIGHT_IMU_HEADING * imu_rad.cos();
        sy += WEIGHT_IMU_HEADING * imu_rad.sin();
    }
    if raw_mag_valid && !raw_mag_rad.is_nan() {
        weight_sum += WEIGHT_RAW_MAG;
        sx += WEIGHT_RAW_MAG * raw_mag_rad.cos();
        sy += WEIGHT_RAW_MAG * raw_mag_rad.sin();
    }
    if independent_valid && !independent_rad.is_nan() {
        weight_sum += WEIGHT_INDEPENDENT_COMPASS;
        sx += WEIGHT_INDEPENDENT_COMPASS * independent_rad.cos();
        sy += WEIGHT_INDEPENDENT_COMPASS * independent_rad.sin();
    }

    if weight_sum < COMPASS_WEIGHT_MIN {
        return (0.0, false);
    }
    let magnitude = (sx * sx + sy * sy).sqrt();
    let consensus = magnitude / weight_sum;
    if consensus < COMPASS_CONSENSUS_MIN {
        return (0.0, false);
    }
    (sy.atan2(sx), true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixer_agrees_when_all_inputs_match() {
        let (h, ok) = mix_heading(0.5, true, 0.5, true, 0.5, true, 0.0);
        assert!(ok);
        assert!((h - 0.5).abs() < 1e-9);
    }

    #[test]
    fn mixer_rejects_when_inputs_disagree() {
        let (_h, ok) = mix_heading(0.0, true, std::f64::consts::PI, true, std::f64::consts::PI, true, 0.0);
        assert!(!ok);
    }

    #[test]
    fn mixer_rejects_when_too_few_valid_inputs() {
        let (_h, ok) = mix_heading(0.0, false, 0.0, false, 0.3, false, 0.0);
        assert!(!ok);
    }

    #[test]
    fn filter_block_eventually_reports_valid() {
        let mut fb = FilterBlock::new();
        let mut input = ControllerInput::default();
        input.imu.valid = true;
        input.gps.valid = true;
        input.compass.valid = true;
        input.wind.valid = true;
        let mut last_valid = false;
        for _ in 0..1200 {
            let out = fb.step(&input, 0.0);
            last_valid = out.valid;
        }
        assert!(last_valid);
    }

    #[test]
    fn speed_is_clipped() {
        let mut fb = FilterBlock::new();
        let mut input = ControllerInput::default();
        input.imu.valid = true;
        input.imu.velocity_x_m_s = 100.0;
        input.gps.valid = true;
        input.gps.speed_m_s = 100.0;
        let mut out = fb.step(&input, 0.0);
        for _ in 0..600 {
            out = fb.step(&input, 0.0);
        }
        assert!(out.mag_boat <= MAX_BOAT_SPEED_M_S + 1e-9);
    }
}
