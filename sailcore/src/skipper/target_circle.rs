//! Nested target-circle geographic plan. Grounded in
//! `skipper/target_circle.cc`/`target_circle_cascade.cc`.

use crate::latlon::{spherical_shortest_path, LatLon};

/// A geographic disk around `center` with `radius_deg`. The longitude
/// degrees-to-meters factor varies with latitude (meridian convergence), so
/// `In`/`ToDeg` compare against a locally-scaled longitude delta rather than
/// plain degrees.
#[derive(Debug, Clone, Copy)]
pub struct TargetCircle {
    center: LatLon,
    radius_deg: f64,
    lon_factor: f64,
}

impl TargetCircle {
    pub fn new(center: LatLon, radius_deg: f64) -> Self {
        TargetCircle { center, radius_deg, lon_factor: center.lat_rad().cos() }
    }

    pub fn center(&self) -> LatLon {
        self.center
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    /// True if `pos` lies within the circle's radius.
    pub fn contains(&self, pos: LatLon) -> bool {
        let dlat = pos.lat_deg() - self.center.lat_deg();
        let dlon = (pos.lon_deg() - self.center.lon_deg()) * self.lon_factor;
        (dlat * dlat + dlon * dlon).sqrt() <= self.radius_deg
    }

    /// Straight-line distance from `pos` to the circle's edge, in the same
    /// locally-scaled degree units as `radius_deg` (negative when inside).
    fn distance_to_edge_deg(&self, pos: LatLon) -> f64 {
        let dlat = pos.lat_deg() - self.center.lat_deg();
        let dlon = (pos.lon_deg() - self.center.lon_deg()) * self.lon_factor;
        (dlat * dlat + dlon * dlon).sqrt() - self.radius_deg
    }

    /// Bearing from `pos` to the circle's center, radians clockwise from
    /// north.
    pub fn bearing_to_center_rad(&self, pos: LatLon) -> f64 {
        spherical_shortest_path(pos, self.center).0
    }
}

/// An ordered sequence of nested target circles: the center of circle i+1
/// lies strictly inside circle i. `C0` is the ultimate destination.
#[derive(Debug, Clone)]
pub struct TargetCircleCascade {
    circles: Vec<TargetCircle>,
}

impl TargetCircleCascade {
    pub fn new(circles: Vec<TargetCircle>) -> Self {
        assert!(!circles.is_empty(), "a cascade needs at least the final destination circle");
        TargetCircleCascade { circles }
    }

    /// The bearing to steer toward `pos`'s current plan target: the
    /// smallest-index circle containing `pos`, or the closest circle by
    /// edge distance if `pos` has drifted outside every circle.
    pub fn to_deg(&self, pos: LatLon) -> f64 {
        for circle in &self.circles {
            if circle.contains(pos) {
                return circle.bearing_to_center_rad(pos);
            }
        }
        self.closest(pos).bearing_to_center_rad(pos)
    }

    fn closest(&self, pos: LatLon) -> &TargetCircle {
        self.circles
            .iter()
            .min_by(|a, b| {
                a.distance_to_edge_deg(pos)
                    .partial_cmp(&b.distance_to_edge_deg(pos))
                    .unwrap()
            })
            .expect("cascade is non-empty")
    }

    /// `C0.In(pos)`: the ultimate destination has been reached.
    pub fn target_reached(&self, pos: LatLon) -> bool {
        self.circles[0].contains(pos)
    }

    pub fn final_circle(&self) -> &TargetCircle {
        &self.circles[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_circle_when_within_radius() {
        let c = TargetCircle::new(LatLon::new(47.0, 8.0), 0.01);
        assert!(c.contains(LatLon::new(47.0, 8.0)));
        assert!(!c.contains(LatLon::new(48.0, 8.0)));
    }

    #[test]
    fn single_circle_cascade_reaches_target() {
        let cascade = TargetCircleCascade::new(vec![TargetCircle::new(LatLon::new(47.0, 8.0), 0.01)]);
        assert!(!cascade.target_reached(LatLon::new(47.5, 8.0)));
        assert!(cascade.target_reached(LatLon::new(47.0, 8.001)));
    }

    #[test]
    fn off_plan_position_steers_to_closest_circle() {
        let cascade = TargetCircleCascade::new(vec![
            TargetCircle::new(LatLon::new(47.0, 8.0), 0.01),
            TargetCircle::new(LatLon::new(47.5, 8.5), 0.02),
        ]);
        // Far from both circles; bearing should at least be finite and
        // point roughly toward one of them rather than panicking.
        let bearing = cascade.to_deg(LatLon::new(40.0, 1.0));
        assert!(bearing.is_finite());
    }

    #[test]
    fn sails_at_cascade_bearing_reaches_target_within_bound_time() {
        use crate::latlon::spherical_move;
        let cascade = TargetCircleCascade::new(vec![TargetCircle::new(LatLon::new(47.1, 8.2), 0.02)]);
        let mut pos = LatLon::new(47.0, 8.0);
        let speed_m_s = 3.0;
        let dt_s = 10.0;
        let mut reached = false;
        for _ in 0..2000 {
            if cascade.target_reached(pos) {
                reached = true;
                break;
            }
            let bearing = cascade.to_deg(pos);
            pos = spherical_move(pos, bearing, speed_m_s * dt_s);
        }
        assert!(reached, "never reached target circle");
    }
}
