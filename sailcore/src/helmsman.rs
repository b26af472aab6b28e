//! Hierarchical helmsman state machine: TestController -> InitialController
//! -> NormalController -> DockingController, with a Brake state reachable
//! from Normal. Grounded in the `Controller` `Entry`/`Run`/`Exit`/`Done`
//! shape declared in `helmsman/test_controller.h` and `normal_controller.h`.

use crate::angle::delta_old_new_rad;
use crate::controller_io::{ControllerInput, ControllerOutput, FilteredMeasurements, HelmsmanState as StateTag};
use crate::normal_controller::NormalController;

const BEARING_STABLE_RAD: f64 = 5.0_f64.to_radians();
const MIN_SPEED_TO_ENTER_NORMAL_M_S: f64 = 0.3;
const TEST_RETRY_SECONDS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestStep {
    Homing,
    ZeroPosition,
    RudderLeftStep,
    RudderRightStep,
    SailStep,
    WindSensorCheck,
    Done,
    Failed,
}

struct TestController {
    step: TestStep,
    retry_ticks: u64,
}

impl TestController {
    fn new() -> Self {
        TestController { step: TestStep::Homing, retry_ticks: 0 }
    }

    fn entry(&mut self) {
        self.step = TestStep::Homing;
        self.retry_ticks = 0;
    }

    fn run(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements) {
        if self.step == TestStep::Failed {
            self.retry_ticks += 1;
            if self.retry_ticks as f64 * crate::boat::SAMPLING_PERIOD_S >= TEST_RETRY_SECONDS {
                self.step = TestStep::Homing;
                self.retry_ticks = 0;
            }
            return;
        }

        self.step = match self.step {
            TestStep::Homing => {
                if input.drives.sail_homed && (input.drives.rudder_left_homed || input.drives.rudder_right_homed) {
                    TestStep::ZeroPosition
                } else {
                    TestStep::Homing
                }
            }
            TestStep::ZeroPosition => TestStep::RudderLeftStep,
            TestStep::RudderLeftStep => TestStep::RudderRightStep,
            TestStep::RudderRightStep => TestStep::SailStep,
            TestStep::SailStep => TestStep::WindSensorCheck,
            TestStep::WindSensorCheck => {
                if input.wind.valid {
                    TestStep::Done
                } else {
                    TestStep::Failed
                }
            }
            TestStep::Done => TestStep::Done,
            TestStep::Failed => TestStep::Failed,
        };
        let _ = filtered;
    }

    fn done(&self) -> bool {
        self.step == TestStep::Done
    }
}

struct InitialController {
    stable_heading_rad: Option<f64>,
}

impl InitialController {
    fn new() -> Self {
        InitialController { stable_heading_rad: None }
    }

    fn entry(&mut self) {
        self.stable_heading_rad = None;
    }

    fn run(&mut self, _input: &ControllerInput, filtered: &FilteredMeasurements, out: &mut ControllerOutput) {
        // Hold the current heading with zero helm and zero sail while
        // waiting for a stable bearing and steerageway, per spec's
        // InitialController.
        out.drives_reference.gamma_rudder_left_rad = 0.0;
        out.drives_reference.gamma_rudder_right_rad = 0.0;
        out.drives_reference.gamma_sail_rad = 0.0;

        match self.stable_heading_rad {
            None => self.stable_heading_rad = Some(filtered.phi_z_boat),
            Some(h) if delta_old_new_rad(h, filtered.phi_z_boat).abs() > BEARING_STABLE_RAD => {
                self.stable_heading_rad = Some(filtered.phi_z_boat);
            }
            Some(_) => {}
        }
    }

    fn done(&self, filtered: &FilteredMeasurements) -> bool {
        self.stable_heading_rad.is_some() && filtered.mag_boat.abs() > MIN_SPEED_TO_ENTER_NORMAL_M_S
    }
}

struct DockingController;

impl DockingController {
    fn run(&mut self, _input: &ControllerInput, _filtered: &FilteredMeasurements, out: &mut ControllerOutput) {
        out.drives_reference.gamma_rudder_left_rad = 0.0;
        out.drives_reference.gamma_rudder_right_rad = 0.0;
        out.drives_reference.gamma_sail_rad = 0.0;
    }
}

struct BrakeController;

impl BrakeController {
    fn run(&mut self, _input: &ControllerInput, _filtered: &FilteredMeasurements, out: &mut ControllerOutput) {
        // Rudders hard over in opposition, sail eased flat, to scrub speed.
        out.drives_reference.gamma_rudder_left_rad = 0.5;
        out.drives_reference.gamma_rudder_right_rad = -0.5;
        out.drives_reference.gamma_sail_rad = 1.4;
    }
}

/// Externally requested mode changes that can pull the state machine out of
/// `Normal` (docking at the pier, emergency braking). `None` means no
/// override: stay in the plan-driven Normal/Initial/Test progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeRequest {
    None,
    Dock,
    Brake,
}

pub struct Helmsman {
    state: StateTag,
    test: TestController,
    initial: InitialController,
    normal: NormalController,
    docking: DockingController,
    brake: BrakeController,
}

impl Helmsman {
    pub fn new() -> Self {
        let mut h = Helmsman {
            state: StateTag::Test,
            test: TestController::new(),
            initial: InitialController::new(),
            normal: NormalController::new(),
            docking: DockingController,
            brake: BrakeController,
        };
        h.test.entry();
        h
    }

    pub fn state(&self) -> StateTag {
        self.state
    }

    /// Runs one control tick: evaluates `done()` for the current state
    /// first, transitions if appropriate (`exit` then the next state's
    /// `entry`), then runs the (possibly new) current state. The tack/jibe
    /// counters are carried on `NormalController` and copied into every
    /// tick's output regardless of which state ran, so they read as a
    /// running total rather than resetting to zero outside Normal.
    pub fn run(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements, mode: ModeRequest) -> ControllerOutput {
        self.maybe_transition(input, filtered, mode);

        let mut out = ControllerOutput::default();
        match self.state {
            StateTag::Test => self.test.run(input, filtered),
            StateTag::Initial => self.initial.run(input, filtered, &mut out),
            StateTag::Normal => out = self.normal.run(input, filtered),
            StateTag::Docking => self.docking.run(input, filtered, &mut out),
            StateTag::Brake => self.brake.run(input, filtered, &mut out),
        }
        out.status.tacks = self.normal.tacks();
        out.status.jibes = self.normal.jibes();
        out.status.helmsman_state = self.state;
        out
    }

    fn maybe_transition(&mut self, input: &ControllerInput, filtered: &FilteredMeasurements, mode: ModeRequest) {
        let next = match self.state {
            StateTag::Test if self.test.done() && filtered.valid => Some(StateTag::Initial),
            StateTag::Initial if self.initial.done(filtered) => Some(StateTag::Normal),
            StateTag::Normal if self.normal.give_up(filtered) => Some(StateTag::Initial),
            StateTag::Normal if mode == ModeRequest::Dock => Some(StateTag::Docking),
            StateTag::Normal if mode == ModeRequest::Brake => Some(StateTag::Brake),
            _ => None,
        };

        if let Some(next) = next {
            tracing::info!(from = ?self.state, to = ?next, "helmsman state transition");
            match next {
                StateTag::Initial => self.initial.entry(),
                StateTag::Normal => self.normal.entry(input, filtered),
                StateTag::Test => self.test.entry(),
                _ => {}
            }
            self.state = next;
        }
    }
}

impl Default for Helmsman {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_homed_input() -> ControllerInput {
        let mut input = ControllerInput::default();
        input.drives.sail_homed = true;
        input.drives.rudder_left_homed = true;
        input.drives.rudder_right_homed = true;
        input.wind.valid = true;
        input
    }

    fn make_valid_filtered() -> FilteredMeasurements {
        FilteredMeasurements { valid: true, valid_app_wind: true, valid_true_wind: true, ..Default::default() }
    }

    #[test]
    fn progresses_from_test_to_initial_to_normal() {
        let mut h = Helmsman::new();
        let input = make_homed_input();
        let filtered = make_valid_filtered();

        // Drive the test sequence through all its steps.
        for _ in 0..10 {
            h.run(&input, &filtered, ModeRequest::None);
        }
        assert_eq!(h.state(), StateTag::Initial);

        // Initial needs a stable bearing then boat speed above threshold.
        h.run(&input, &filtered, ModeRequest::None);
        let mut moving_filtered = filtered;
        moving_filtered.mag_boat = 1.0;
        h.run(&input, &moving_filtered, ModeRequest::None);
        assert_eq!(h.state(), StateTag::Normal);
    }

    #[test]
    fn normal_returns_to_initial_on_give_up() {
        let mut h = Helmsman::new();
        let input = make_homed_input();
        let filtered = make_valid_filtered();
        for _ in 0..10 {
            h.run(&input, &filtered, ModeRequest::None);
        }
        let mut moving = filtered;
        moving.mag_boat = 1.0;
        h.run(&input, &moving, ModeRequest::None);
        assert_eq!(h.state(), StateTag::Normal);

        let becalmed = filtered; // mag_boat = 0.0
        for _ in 0..1210 {
            h.run(&input, &becalmed, ModeRequest::None);
        }
        assert_eq!(h.state(), StateTag::Initial);
    }

    #[test]
    fn docking_request_is_honored_from_normal() {
        let mut h = Helmsman::new();
        let input = make_homed_input();
        let filtered = make_valid_filtered();
        for _ in 0..10 {
            h.run(&input, &filtered, ModeRequest::None);
        }
        let mut moving = filtered;
        moving.mag_boat = 1.0;
        h.run(&input, &moving, ModeRequest::None);
        assert_eq!(h.state(), StateTag::Normal);

        h.run(&input, &moving, ModeRequest::Dock);
        assert_eq!(h.state(), StateTag::Docking);
    }
}
