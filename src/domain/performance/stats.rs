use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::{Data, Distribution};

/// Variances below this are treated as zero.
const VARIANCE_EPSILON: f64 = 1e-12;

/// Largest |r| fed into Fisher's z transform, keeps atanh finite.
const MAX_FISHER_R: f64 = 0.999_999;

/// Shared statistics utilities for match-level calculations.
pub struct Stats;

impl Stats {
    /// Arithmetic mean. `None` for an empty slice or when the result overflows.
    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Data::new(values.to_vec()).mean().filter(|m| m.is_finite())
    }

    /// Sample variance (n-1). Zero for fewer than two values, `None` when the
    /// result overflows.
    pub fn sample_variance(values: &[f64]) -> Option<f64> {
        if values.len() < 2 {
            return Some(0.0);
        }
        Data::new(values.to_vec())
            .variance()
            .filter(|v| v.is_finite())
            .map(|v| v.max(0.0))
    }

    /// Pearson correlation coefficient of two equally long series.
    ///
    /// Returns 0.0 when either series has no variance, so callers never see NaN.
    pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return 0.0;
        }

        let x = &xs[..n];
        let y = &ys[..n];
        let (Some(mean_x), Some(mean_y)) = (Self::mean(x), Self::mean(y)) else {
            return 0.0;
        };

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for i in 0..n {
            let dx = x[i] - mean_x;
            let dy = y[i] - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x <= VARIANCE_EPSILON || var_y <= VARIANCE_EPSILON {
            return 0.0;
        }

        let r = cov / (var_x.sqrt() * var_y.sqrt());
        if r.is_finite() { r.clamp(-1.0, 1.0) } else { 0.0 }
    }

    /// Two-tailed p-value of a correlation coefficient via Student's t with n-2 df.
    pub fn correlation_p_value(r: f64, n: usize) -> f64 {
        if n < 3 || !r.is_finite() {
            return 1.0;
        }
        let r2 = r * r;
        if r2 >= 1.0 {
            return 0.0;
        }

        let df = (n - 2) as f64;
        let t = r * (df / (1.0 - r2)).sqrt();
        let dist = match StudentsT::new(0.0, 1.0, df) {
            Ok(d) => d,
            Err(_) => return 1.0,
        };
        let p = 2.0 * (1.0 - dist.cdf(t.abs()));
        if p.is_finite() { p.clamp(0.0, 1.0) } else { 1.0 }
    }

    /// Confidence interval for r via Fisher's z transform.
    pub fn correlation_interval(r: f64, n: usize, z_crit: f64) -> (f64, f64) {
        if n <= 3 || !r.is_finite() {
            return (r, r);
        }
        let z = r.clamp(-MAX_FISHER_R, MAX_FISHER_R).atanh();
        let se = 1.0 / ((n - 3) as f64).sqrt();
        let lo = (z - z_crit * se).tanh().clamp(-1.0, 1.0);
        let hi = (z + z_crit * se).tanh().clamp(-1.0, 1.0);
        (lo.min(r), hi.max(r))
    }

    /// z-score with a guarded denominator.
    pub fn z_score(value: f64, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= VARIANCE_EPSILON.sqrt() {
            return 0.0;
        }
        let z = (value - mean) / std_dev;
        if z.is_finite() { z } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_variance() {
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((Stats::sample_variance(&values).unwrap() - 32.0 / 7.0).abs() < 1e-12);
        assert_eq!(Stats::sample_variance(&[3.0]), Some(0.0));
    }

    #[test]
    fn test_overflowing_inputs_yield_none() {
        assert_eq!(Stats::mean(&[]), None);
        assert_eq!(Stats::sample_variance(&[f64::MAX, 0.0, f64::MAX, 0.0]), None);
    }

    #[test]
    fn test_pearson_perfect_and_flat() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        assert!((Stats::pearson(&x, &y) - 1.0).abs() < 1e-12);

        let neg: Vec<f64> = x.iter().map(|v| -v).collect();
        assert!((Stats::pearson(&x, &neg) + 1.0).abs() < 1e-12);

        let flat = vec![3.0; 5];
        assert_eq!(Stats::pearson(&x, &flat), 0.0);
    }

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(Stats::correlation_p_value(1.0, 10), 0.0);
        assert_eq!(Stats::correlation_p_value(0.0, 10), 1.0);
        let p = Stats::correlation_p_value(0.7, 10);
        // t = 2.77 with 8 df
        assert!(p > 0.02 && p < 0.03, "p = {}", p);
    }

    #[test]
    fn test_interval_contains_r() {
        let (lo, hi) = Stats::correlation_interval(0.6, 12, 1.96);
        assert!(lo < 0.6 && 0.6 < hi);
        assert!(lo >= -1.0 && hi <= 1.0);

        let (lo, hi) = Stats::correlation_interval(1.0, 10, 1.96);
        assert!(lo <= 1.0 && hi == 1.0);
    }

    #[test]
    fn test_z_score_guard() {
        assert_eq!(Stats::z_score(5.0, 5.0, 0.0), 0.0);
        assert_eq!(Stats::z_score(7.0, 5.0, 1.0), 2.0);
    }
}
