//! Pure-computation core of the sailing control stack: angle/vector/geodesy
//! primitives, scalar filters, the sensor-fusion filter block, the strategic
//! Skipper layer, and the tactical Helmsman layer.
//!
//! This crate performs no I/O and knows nothing of the bus wire format or
//! of wall-clock time; it is driven one 100ms tick at a time by a caller
//! that owns a [`helmsman::Helmsman`] and a [`skipper::SkipperState`].

#![forbid(unsafe_code)]

pub mod angle;
pub mod apparent;
pub mod boat;
pub mod compass;
pub mod controller_io;
pub mod error;
pub mod filter;
pub mod filter_block;
pub mod helmsman;
pub mod latlon;
pub mod maneuver;
pub mod normal_controller;
pub mod point_of_sail;
pub mod polar;
pub mod polar_diagram;
pub mod reference_values;
pub mod rudder_controller;
pub mod sail_controller;
pub mod skipper;
pub mod wind_classifier;

pub use angle::Angle;
pub use controller_io::{ControllerInput, ControllerOutput, FilteredMeasurements, HelmsmanState};
pub use error::{CoreError, CoreResult};
pub use filter_block::FilterBlock;
pub use helmsman::{Helmsman, ModeRequest};
pub use latlon::LatLon;
pub use polar::Polar;
pub use skipper::{SkipperState, TargetCircle, TargetCircleCascade};
