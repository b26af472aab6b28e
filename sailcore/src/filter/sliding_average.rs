//! Uniform moving average (DC gain 1) and its quick-converging variant.
//! Grounded in `helmsman/filter/sliding_average_filter.cc` and
//! `quick_sliding_average_filter.cc`.

use super::Filter;

#[derive(Debug, Clone)]
pub struct SlidingAverageFilter {
    buf: Vec<f64>,
    index: usize,
    sum: f64,
    valid: bool,
    window: usize,
}

impl SlidingAverageFilter {
    pub fn new(window: usize) -> Self {
        assert!(window > 0);
        SlidingAverageFilter { buf: vec![0.0; window], index: 0, sum: 0.0, valid: false, window }
    }

    fn push(&mut self, x: f64) -> f64 {
        let x = super::sanitize(x);
        self.sum += x - self.buf[self.index];
        self.buf[self.index] = x;
        self.index = (self.index + 1) % self.window;
        if self.index == 0 {
            self.valid = true;
        }
        self.sum / self.window as f64
    }
}

impl Filter for SlidingAverageFilter {
    fn filter(&mut self, x: f64) -> f64 {
        self.push(x)
    }

    fn valid_output(&self) -> bool {
        self.valid
    }

    fn set_output(&mut self, y0: f64) {
        self.buf = vec![y0; self.window];
        self.sum = y0 * self.window as f64;
        self.valid = true;
    }

    fn shift(&mut self, delta: f64) {
        for v in self.buf.iter_mut() {
            *v += delta;
        }
        self.sum += delta * self.window as f64;
    }
}

/// Identical to `SlidingAverageFilter`, but declares itself valid at the
/// halfway point by rescaling the partial sum, instead of waiting a full
/// window's worth of samples.
#[derive(Debug, Clone)]
pub struct QuickSlidingAverageFilter {
    inner: SlidingAverageFilter,
    count_to_halfway: usize,
    scale_up: f64,
    rescaled: bool,
}

impl QuickSlidingAverageFilter {
    pub fn new(window: usize) -> Self {
        let count_to_halfway = window / 2 + 1;
        let scale_up = window as f64 / (count_to_halfway - 1).max(1) as f64;
        QuickSlidingAverageFilter {
            inner: SlidingAverageFilter::new(window),
            count_to_halfway,
            scale_up,
            rescaled: false,
        }
    }
}

impl Filter for QuickSlidingAverageFilter {
    fn filter(&mut self, x: f64) -> f64 {
        let y = self.inner.push(x);
        if !self.rescaled {
            self.count_to_halfway -= 1;
            if self.count_to_halfway == 0 {
                self.rescaled = true;
                let y0 = y * self.scale_up;
                self.inner.set_output(y0);
                return y0;
            }
        }
        y
    }

    fn valid_output(&self) -> bool {
        self.rescaled || self.inner.valid_output()
    }

    fn set_output(&mut self, y0: f64) {
        self.inner.set_output(y0);
        self.rescaled = true;
    }

    fn shift(&mut self, delta: f64) {
        self.inner.shift(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_constant_input() {
        let mut f = SlidingAverageFilter::new(8);
        let mut last = 0.0;
        for _ in 0..16 {
            last = f.filter(2.0);
        }
        assert!((last - 2.0).abs() < 1e-9);
        assert!(f.valid_output());
    }

    #[test]
    fn becomes_valid_after_window_samples() {
        let mut f = SlidingAverageFilter::new(4);
        for i in 0..3 {
            f.filter(i as f64);
            assert!(!f.valid_output());
        }
        f.filter(3.0);
        assert!(f.valid_output());
    }

    #[test]
    fn quick_variant_is_valid_sooner() {
        let mut f = QuickSlidingAverageFilter::new(10);
        let mut became_valid_at = None;
        for i in 0..10 {
            f.filter(1.0);
            if f.valid_output() && became_valid_at.is_none() {
                became_valid_at = Some(i);
            }
        }
        assert!(became_valid_at.unwrap() < 9);
    }

    #[test]
    fn quick_variant_matches_plain_after_warmup() {
        let mut quick = QuickSlidingAverageFilter::new(10);
        let mut plain = SlidingAverageFilter::new(10);
        for _ in 0..30 {
            let a = quick.filter(5.0);
            let b = plain.filter(5.0);
            assert!((a - b).abs() < 1e-6);
        }
    }
}
