//! Named initial conditions for `boat-sim`, one per end-to-end scenario in
//! spec.md §8 ("End-to-end scenarios"), so the daemon can be exercised
//! against each without hand-assembling a config file.

use sailcore::latlon::LatLon;
use std::f64::consts::PI;

use crate::boat_sim::{AisTrack, BoatSim};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// No wind, no way on: rudders and sail should stay at zero.
    Becalmed,
    /// A small alpha-star step on a steady reach: a `change`, not a plan.
    SmallHeadingChange,
    /// Port close-hauled to starboard close-hauled: a tack.
    Tack,
    /// Broad reach starboard to broad reach port: a jibe.
    Jibe,
    /// True wind climbing through the storm threshold.
    StormOnset,
    /// A head-on AIS contact on the plan bearing.
    AisCollision,
}

impl Scenario {
    pub fn parse(name: &str) -> Option<Scenario> {
        match name {
            "becalmed" => Some(Scenario::Becalmed),
            "small-heading-change" => Some(Scenario::SmallHeadingChange),
            "tack" => Some(Scenario::Tack),
            "jibe" => Some(Scenario::Jibe),
            "storm-onset" => Some(Scenario::StormOnset),
            "ais-collision" => Some(Scenario::AisCollision),
            _ => None,
        }
    }

    pub fn names() -> &'static [&'static str] {
        &["becalmed", "small-heading-change", "tack", "jibe", "storm-onset", "ais-collision"]
    }

    /// Builds the initial `BoatSim` state for this scenario. The home
    /// position is an arbitrary lake-trial fix; only relative geometry to
    /// AIS contacts or wind matters for the scenario's intent.
    pub fn build(self) -> BoatSim {
        let home = LatLon::new(47.0, 8.5);
        match self {
            Scenario::Becalmed => BoatSim::new(home, 45.0_f64.to_radians(), 45.0_f64.to_radians(), 0.0, Vec::new()),
            Scenario::SmallHeadingChange => {
                BoatSim::new(home, 45.0_f64.to_radians(), 225.0_f64.to_radians(), 10.0, Vec::new())
            }
            Scenario::Tack => BoatSim::new(home, 40.0_f64.to_radians(), 180.0_f64.to_radians(), 8.0, Vec::new()),
            Scenario::Jibe => BoatSim::new(home, 130.0_f64.to_radians(), 180.0_f64.to_radians(), 8.0, Vec::new()),
            Scenario::StormOnset => {
                BoatSim::new(home, 225.0_f64.to_radians(), 180.0_f64.to_radians(), 19.0, Vec::new())
            }
            Scenario::AisCollision => {
                let contact = AisTrack {
                    mmsi: 244_000_001,
                    position: sailcore::latlon::spherical_move(home, 270.0_f64.to_radians(), 400.0),
                    bearing_rad: 90.0_f64.to_radians(),
                    speed_m_s: 5.0,
                };
                let mut sim = BoatSim::new(home, 270.0_f64.to_radians(), PI, 8.0, vec![contact]);
                sim.boat_speed_m_s = 2.0;
                sim
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_published_name_parses_back_to_its_scenario() {
        for name in Scenario::names() {
            assert!(Scenario::parse(name).is_some(), "name {name} failed to parse");
        }
    }

    #[test]
    fn ais_collision_seeds_a_contact() {
        let sim = Scenario::AisCollision.build();
        assert_eq!(sim.ais_tracks.len(), 1);
    }
}
