//! Wraps any scalar `Filter` so it can filter a quantity defined modulo a
//! period (angles, headings) without discontinuities at the wrap boundary.
//! Grounded in `lib/filter/wrap_around_filter.h`/`.cc`.

use super::Filter;
use crate::angle::symmetric_rad;
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct WrapAroundFilter<F: Filter> {
    inner: F,
    continuous: f64,
    period: f64,
}

impl<F: Filter> WrapAroundFilter<F> {
    /// `inner` filters the continuous (unwrapped) phase. `period` is the
    /// wrap period in radians (2*pi for a full-circle angle).
    pub fn new(inner: F) -> Self {
        WrapAroundFilter { inner, continuous: 0.0, period: 2.0 * PI }
    }
}

impl<F: Filter> Filter for WrapAroundFilter<F> {
    fn filter(&mut self, x: f64) -> f64 {
        let x = symmetric_rad(super::sanitize(x));
        let mut delta = x - symmetric_rad(self.continuous);
        if delta >= PI {
            delta -= 2.0 * PI;
        }
        if delta < -PI {
            delta += 2.0 * PI;
        }
        self.continuous += delta;

        // Rebase once the continuous phase has wound up more than two full
        // periods away from zero, shifting the inner filter's state along.
        if self.continuous.abs() > 2.0 * self.period {
            let shift = -self.period * self.continuous.signum();
            self.continuous += shift;
            self.inner.shift(shift);
        }

        let out = self.inner.filter(self.continuous);
        symmetric_rad(out)
    }

    fn valid_output(&self) -> bool {
        self.inner.valid_output()
    }

    fn set_output(&mut self, y0: f64) {
        self.continuous = symmetric_rad(y0);
        self.inner.set_output(self.continuous);
    }

    fn shift(&mut self, delta: f64) {
        self.continuous += delta;
        self.inner.shift(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SlidingAverageFilter;

    #[test]
    fn tracks_constant_angle_near_boundary() {
        let mut f = WrapAroundFilter::new(SlidingAverageFilter::new(4));
        let mut last = 0.0;
        for _ in 0..20 {
            last = f.filter(179.5_f64.to_radians());
        }
        assert!((last.to_degrees() - 179.5).abs() < 1e-6);
    }

    #[test]
    fn handles_crossing_the_wrap_boundary() {
        let mut f = WrapAroundFilter::new(SlidingAverageFilter::new(1));
        let inputs_deg = [179.0, -179.0, 179.0, -179.0];
        let mut last = 0.0;
        for d in inputs_deg {
            last = f.filter(d.to_radians());
        }
        // Oscillating +-179 deg should track near the boundary, not jump
        // toward 0.
        assert!(last.to_degrees().abs() > 170.0);
    }
}
