//! Filters a `Polar` signal by running two independent scalar filters over
//! its cartesian projection. Grounded in `common/polar.h`'s cartesian cache
//! and the filter block's use of paired sliding averages for true wind and
//! angle-of-attack wind.

use super::Filter;
use crate::polar::Polar;

pub struct PolarFilter<Fx: Filter, Fy: Filter> {
    fx: Fx,
    fy: Fy,
}

impl<Fx: Filter, Fy: Filter> PolarFilter<Fx, Fy> {
    pub fn new(fx: Fx, fy: Fy) -> Self {
        PolarFilter { fx, fy }
    }

    pub fn filter(&mut self, input: Polar) -> Polar {
        let x = self.fx.filter(input.x());
        let y = self.fy.filter(input.y());
        Polar::from_cartesian(x, y)
    }

    pub fn valid_output(&self) -> bool {
        self.fx.valid_output() && self.fy.valid_output()
    }

    pub fn set_output(&mut self, y0: Polar) {
        self.fx.set_output(y0.x());
        self.fy.set_output(y0.y());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SlidingAverageFilter;

    #[test]
    fn converges_to_constant_polar_input() {
        let mut f = PolarFilter::new(SlidingAverageFilter::new(4), SlidingAverageFilter::new(4));
        let input = Polar::new(0.3, 5.0);
        let mut last = input;
        for _ in 0..10 {
            last = f.filter(input);
        }
        assert!((last.mag() - input.mag()).abs() < 1e-6);
        assert!(f.valid_output());
    }
}
