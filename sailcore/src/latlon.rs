//! Geographic position and great-circle geodesy on a spherical Earth.
//!
//! Grounded in `vskipper/util.cc`'s `SphericalShortestPath` / `SphericalMove`.

const EARTH_RADIUS_M: f64 = 6_371_009.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    lat_deg: f64,
    lon_deg: f64,
}

impl LatLon {
    pub fn new(lat_deg: f64, lon_deg: f64) -> LatLon {
        LatLon { lat_deg, lon_deg }
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_deg
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_deg
    }

    pub fn lat_rad(&self) -> f64 {
        self.lat_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.lon_deg.to_radians()
    }
}

/// Returns (bearing from `from` to `to`, in radians clockwise from north;
/// distance in meters).
pub fn spherical_shortest_path(from: LatLon, to: LatLon) -> (f64, f64) {
    let dlat = to.lat_rad() - from.lat_rad();
    let dlon = to.lon_rad() - from.lon_rad();
    let a = (dlat / 2.0).sin().powi(2)
        + from.lat_rad().cos() * to.lat_rad().cos() * (dlon / 2.0).sin().powi(2);
    let distance_m = EARTH_RADIUS_M * 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let bearing_rad = (dlon.sin() * to.lat_rad().cos()).atan2(
        from.lat_rad().cos() * to.lat_rad().sin() - from.lat_rad().sin() * to.lat_rad().cos() * dlon.cos(),
    );
    (bearing_rad, distance_m)
}

/// Moves `from` by `distance_m` along `bearing_rad` (clockwise from north).
/// Undefined within 80 degrees of either pole, matching the original's
/// singularity guard.
pub fn spherical_move(from: LatLon, bearing_rad: f64, distance_m: f64) -> LatLon {
    debug_assert!(from.lat_deg().abs() < 80.0);
    let dist = distance_m / EARTH_RADIUS_M;
    let sin_lat = from.lat_rad().sin();
    let cos_lat = from.lat_rad().cos();
    let lat2 = (sin_lat * dist.cos() + cos_lat * dist.sin() * bearing_rad.cos()).asin();
    let dlon = (bearing_rad.sin() * dist.sin() * cos_lat).atan2(dist.cos() - sin_lat * lat2.sin());
    let lon2 = from.lon_rad() + dlon;
    LatLon::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Closed-form minimum distance over `[0, time_window_s]` between two points
/// moving at constant bearing/speed, given the initial bearing and distance
/// from a to b. Grounded in `vskipper/util.cc`'s `MinDistance`.
#[allow(clippy::too_many_arguments)]
pub fn min_distance(
    bearing_a_rad: f64,
    speed_a: f64,
    bearing_b_rad: f64,
    speed_b: f64,
    bearing_a_to_b_rad: f64,
    distance_a_b_m: f64,
    time_window_s: f64,
) -> f64 {
    if speed_a < 1e-9 && speed_b < 1e-9 {
        return distance_a_b_m;
    }

    let sin_alpha = (bearing_a_to_b_rad - bearing_a_rad).sin();
    let cos_alpha = (bearing_a_to_b_rad - bearing_a_rad).cos();
    let sin_beta = (bearing_b_rad - bearing_a_to_b_rad - std::f64::consts::PI).sin();
    let cos_beta = (bearing_b_rad - bearing_a_to_b_rad - std::f64::consts::PI).cos();

    let px = speed_b * cos_beta + speed_a * cos_alpha;
    let py = speed_b * sin_beta - speed_a * sin_alpha;

    let t = if (sin_alpha * cos_beta + sin_beta * cos_alpha).abs() < 1e-9 {
        let v_proj = speed_a + speed_b * (cos_alpha * cos_beta - sin_alpha * sin_beta);
        if v_proj.abs() < 1e-9 {
            return distance_a_b_m;
        }
        cos_alpha * distance_a_b_m / v_proj
    } else {
        distance_a_b_m * px / (px * px + py * py)
    };
    let t = t.clamp(0.0, time_window_s);

    let dx = distance_a_b_m - t * px;
    let dy = t * py;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_then_shortest_path_round_trips() {
        let p1 = LatLon::new(47.2, 8.5);
        let bearing = 35.0_f64.to_radians();
        let distance = 10_000.0;
        let p2 = spherical_move(p1, bearing, distance);
        let (b, d) = spherical_shortest_path(p1, p2);
        assert!((d - distance).abs() < 1.0, "distance off by {}", (d - distance).abs());
        assert!((b - bearing).abs() < 1e-3, "bearing off by {}", (b - bearing).abs());
    }

    #[test]
    fn stationary_targets_return_initial_distance() {
        let d = min_distance(0.0, 0.0, 0.0, 0.0, 0.0, 250.0, 900.0);
        assert_eq!(d, 250.0);
    }

    #[test]
    fn head_on_closure_reduces_distance() {
        // a stationary at origin; b is 400m away at bearing 0 from a, and
        // b moves back toward a (bearing pi) at 5 m/s.
        let d = min_distance(
            0.0,
            0.0,
            std::f64::consts::PI,
            5.0,
            0.0,
            400.0,
            100.0,
        );
        assert!(d < 400.0);
    }
}
