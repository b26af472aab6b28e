//! Physical constants of the vessel. Grounded in `helmsman/boat.h`
//! (auto-generated by the original project's system-identification script).

/// Yaw moment of inertia, kg*m^2.
pub const INERTIA_Z: f64 = 150.0;
/// Single rudder blade area, m^2.
pub const AREA_R: f64 = 0.085;
/// Number of rudders.
pub const NUMBER_R: f64 = 2.0;
/// Lever arm from CoG to rudder axis, m.
pub const LEVER_R: f64 = 1.430_48;
/// Wind sensor mounting offset from the bow centerline, rad.
pub const WIND_SENSOR_OFFSET_RAD: f64 = -0.546_288;
/// Water density, kg/m^3.
pub const RHO_WATER: f64 = 1030.0;
/// Maximum sail slew rate, rad/s.
pub const OMEGA_MAX_SAIL: f64 = 0.241_661;

/// Control tick period, seconds (100 ms per spec).
pub const SAMPLING_PERIOD_S: f64 = 0.1;

/// Number of ticks spanning `seconds`, rounded to nearest, minimum 1.
pub fn ticks_for(seconds: f64) -> usize {
    ((seconds / SAMPLING_PERIOD_S) + 0.5).max(1.0) as usize
}
