use tracing::{debug, warn};

pub const GAUSSIAN_WIDTH_SCALE: f64 = 7.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Distribution {
    counts: Vec<u64>,
}

/// `mean` is the count in the mode bucket, not the arithmetic mean of the
/// buckets; the spread estimate is measured around that peak value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    pub mode_column: usize,
    pub peak: u64,
    pub mean: f64,
    pub sum_squared_diff: f64,
    pub standard_deviation: f64,
}

impl Distribution {
    pub fn new(columns: usize) -> Self {
        Self {
            counts: vec![0; columns],
        }
    }

    pub fn reset(&mut self) {
        self.counts.fill(0);
        debug!(columns = self.counts.len(), "distribution reset");
    }

    pub fn record_outcome(&mut self, column: usize) {
        match self.counts.get_mut(column) {
            Some(c) => *c += 1,
            None => warn!(column, "outcome outside the bin strip dropped"),
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    // empty histograms report a spread of zero
    pub fn compute_statistics(&self, peak_height: f64) -> Statistics {
        let mut peak = 0u64;
        let mut mode_column = 0usize;
        for (i, &n) in self.counts.iter().enumerate() {
            // first maximum wins
            if n > peak {
                peak = n;
                mode_column = i;
            }
        }

        let mean = peak as f64;
        let sum_squared_diff: f64 = self
            .counts
            .iter()
            .map(|&n| (n as f64 - mean).powi(2))
            .sum();

        let standard_deviation = if mean > 0.0 {
            (sum_squared_diff / mean).sqrt() * (peak_height / mean)
        } else {
            0.0
        };

        Statistics {
            mode_column,
            peak,
            mean,
            sum_squared_diff,
            standard_deviation,
        }
    }

    pub fn curve_center_column(&self, stats: &Statistics, unbiased: bool) -> usize {
        if unbiased {
            self.counts.len() / 2
        } else {
            stats.mode_column
        }
    }

    pub fn normalized(&self) -> Vec<f64> {
        let peak = self.counts.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&n| n as f64 / peak as f64)
            .collect()
    }
}

/// `amplitude * exp(-(x - center)^2 / (2 * (sd * 7)^2))`, flat for a zero spread.
pub fn gaussian_value(x: f64, amplitude: f64, standard_deviation: f64, center: f64) -> f64 {
    let c = standard_deviation * GAUSSIAN_WIDTH_SCALE;
    if !(c.abs() > 0.0) {
        return 0.0;
    }
    let d = x - center;
    amplitude * (-(d * d) / (2.0 * c * c)).exp()
}

pub fn sample_gaussian(
    left: i32,
    right: i32,
    amplitude: f64,
    standard_deviation: f64,
    center: f64,
) -> Vec<(f64, f64)> {
    (left..right)
        .map(|x| {
            let x = x as f64;
            (x, gaussian_value(x, amplitude, standard_deviation, center))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_counts(counts: &[u64]) -> Distribution {
        let mut d = Distribution::new(counts.len());
        for (col, &n) in counts.iter().enumerate() {
            for _ in 0..n {
                d.record_outcome(col);
            }
        }
        d
    }

    #[test]
    fn record_touches_one_bucket() {
        let mut d = Distribution::new(5);
        d.record_outcome(3);
        assert_eq!(d.counts(), &[0, 0, 0, 1, 0]);
        d.record_outcome(9);
        assert_eq!(d.total(), 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut d = from_counts(&[4, 1, 7, 2, 0]);
        d.reset();
        assert!(d.counts().iter().all(|&n| n == 0));
        assert_eq!(d.len(), 5);
    }

    #[test]
    fn mode_prefers_first_maximum() {
        let d = from_counts(&[1, 6, 2, 6, 0]);
        let s = d.compute_statistics(140.0);
        assert_eq!(s.mode_column, 1);
        assert_eq!(s.peak, 6);
        assert_eq!(s.mean, 6.0);
    }

    #[test]
    fn spread_is_measured_around_the_peak() {
        let d = from_counts(&[1, 4, 6, 4, 1]);
        let s = d.compute_statistics(140.0);
        // (25 + 4 + 0 + 4 + 25)
        assert_eq!(s.sum_squared_diff, 58.0);
        let expected = (58.0f64 / 6.0).sqrt() * (140.0 / 6.0);
        assert!((s.standard_deviation - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_histogram_has_no_spread() {
        let s = Distribution::new(5).compute_statistics(140.0);
        assert_eq!(s.peak, 0);
        assert_eq!(s.standard_deviation, 0.0);
    }

    #[test]
    fn curve_centre_depends_on_bias() {
        let d = from_counts(&[5, 1, 0, 0, 0]);
        let s = d.compute_statistics(140.0);
        assert_eq!(d.curve_center_column(&s, true), 2);
        assert_eq!(d.curve_center_column(&s, false), 0);
    }

    #[test]
    fn gaussian_peaks_at_centre() {
        assert_eq!(gaussian_value(50.0, 140.0, 3.0, 50.0), 140.0);
        let one_sigma = gaussian_value(50.0 + 21.0, 140.0, 3.0, 50.0);
        assert!((one_sigma - 140.0 * (-0.5f64).exp()).abs() < 1e-9);
        assert_eq!(gaussian_value(10.0, 140.0, 0.0, 50.0), 0.0);
    }

    #[test]
    fn normalized_bars() {
        let d = from_counts(&[2, 4, 0]);
        assert_eq!(d.normalized(), vec![0.5, 1.0, 0.0]);
        assert_eq!(Distribution::new(2).normalized(), vec![0.0, 0.0]);
    }

    #[test]
    fn samples_every_pixel_column() {
        let pts = sample_gaussian(0, 10, 1.0, 1.0, 5.0);
        assert_eq!(pts.len(), 10);
        assert_eq!(pts[5], (5.0, 1.0));
    }
}
