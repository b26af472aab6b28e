use thiserror::Error;

/// Errors surfaced at a tick boundary. A tick that produces one of these
/// is aborted cleanly without corrupting any filter state (see
/// "Exceptions -> result types" in the design notes).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("angle value {0} out of the accepted input range [-180, 360)")]
    AngleOutOfRange(f64),
    #[error("radian value {0} out of the accepted input range [-pi, 2*pi)")]
    RadianOutOfRange(f64),
    #[error("filter has not reached steady state yet")]
    FilterNotValid,
    #[error("divide by zero divisor in angle division")]
    DivideByZero,
    #[error("drive '{0}' is not homed")]
    DriveNotHomed(&'static str),
    #[error("no target plan loaded")]
    NoPlan,
}

pub type CoreResult<T> = Result<T, CoreError>;
