//! Scalar filter capability shared by every noise-suppression stage in the
//! filter block. The set of filter kinds is closed (Median3, Median5,
//! SlidingAverage, QuickSlidingAverage, LowPass1, WrapAround, Polar) so a
//! plain trait with generic composition is used instead of a dyn-dispatch
//! registry — each concrete filter is a distinct type, wired together at
//! construction time in `filter_block.rs`.

mod low_pass;
mod median;
mod polar_filter;
mod sliding_average;
mod wrap_around;

pub use low_pass::LowPass1Filter;
pub use median::{Median3Filter, Median5Filter};
pub use polar_filter::PolarFilter;
pub use sliding_average::{QuickSlidingAverageFilter, SlidingAverageFilter};
pub use wrap_around::WrapAroundFilter;

/// Any NaN reaching a filter must never be folded into filter state (it
/// would poison all future output); callers substitute zero at the boundary.
pub fn sanitize(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

pub trait Filter {
    /// Feed one new sample, return the filtered output.
    fn filter(&mut self, x: f64) -> f64;

    /// True once the filter has observed enough samples to trust its output.
    fn valid_output(&self) -> bool;

    /// Warm-start: seed the internal state as if every past sample equaled `y0`.
    fn set_output(&mut self, y0: f64);

    /// Add `delta` to all internal state — used to rebase a filter after its
    /// wrapped input has been shifted by a whole period (see `WrapAroundFilter`).
    fn shift(&mut self, delta: f64);
}
