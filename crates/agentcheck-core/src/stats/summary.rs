use serde::{Deserialize, Serialize};

/// Two-sided 95% Student-t critical values for df = 1..=30.
const T_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Normal approximation beyond the table.
const Z_95: f64 = 1.96;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Descriptive statistics over one score series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` when `n < 2`.
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
    pub ci95: Option<(f64, f64)>,
}

impl ScoreSummary {
    /// `None` for an empty series.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = sorted.len();
        let nf = n as f64;
        let mean = sorted.iter().sum::<f64>() / nf;

        let std_dev = (n >= 2).then(|| {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (nf - 1.0);
            var.sqrt()
        });

        let ci95 = std_dev.map(|sd| {
            let half = t_multiplier(n - 1) * sd / nf.sqrt();
            (mean - half, mean + half)
        });

        let p = |q: f64| {
            let idx = ((q * (nf - 1.0)).floor() as usize).min(n - 1);
            sorted[idx]
        };

        Some(Self {
            n,
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            percentiles: Percentiles {
                p10: p(0.10),
                p50: p(0.50),
                p90: p(0.90),
            },
            ci95,
        })
    }
}

/// 95% multiplier for the given degrees of freedom (undefined, NaN, for 0).
pub fn t_multiplier(df: usize) -> f64 {
    match df {
        0 => f64::NAN,
        1..=30 => T_95[df - 1],
        _ => Z_95,
    }
}

/// Probability that at least one of `k` independent trials passes.
pub fn pass_at_k(pass_rate: f64, k: u32) -> f64 {
    1.0 - (1.0 - pass_rate).powf(f64::from(k))
}

/// Probability that all `k` independent trials pass.
pub fn pass_pow_k(pass_rate: f64, k: u32) -> f64 {
    pass_rate.powf(f64::from(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_known_series() {
        let scores: Vec<f64> = (75..=84).map(f64::from).collect();
        let s = ScoreSummary::from_scores(&scores).unwrap();
        assert_eq!(s.n, 10);
        assert!((s.mean - 79.5).abs() < 1e-9);
        // sample variance of 10 consecutive integers = 110 / 12
        assert!((s.std_dev.unwrap() - (110.0f64 / 12.0).sqrt()).abs() < 1e-9);
        assert_eq!(s.min, 75.0);
        assert_eq!(s.max, 84.0);
        assert_eq!(s.percentiles.p50, 79.0);

        let (lo, hi) = s.ci95.unwrap();
        let half = 2.262 * s.std_dev.unwrap() / 10f64.sqrt();
        assert!((lo - (79.5 - half)).abs() < 1e-9);
        assert!((hi - (79.5 + half)).abs() < 1e-9);
    }

    #[test]
    fn single_sample_has_no_spread() {
        let s = ScoreSummary::from_scores(&[88.0]).unwrap();
        assert_eq!(s.mean, 88.0);
        assert!(s.std_dev.is_none());
        assert!(s.ci95.is_none());
        assert_eq!(s.percentiles.p10, 88.0);
    }

    #[test]
    fn empty_series_has_no_summary() {
        assert!(ScoreSummary::from_scores(&[]).is_none());
    }

    #[test]
    fn t_multiplier_falls_back_to_normal() {
        assert_eq!(t_multiplier(1), 12.706);
        assert_eq!(t_multiplier(30), 2.042);
        assert_eq!(t_multiplier(31), 1.96);
    }

    #[test]
    fn pass_at_k_is_monotone_in_k() {
        for rate in [0.1, 0.5, 0.8, 0.99] {
            let mut prev_at = 0.0;
            let mut prev_pow = 1.0;
            for k in 1..=20 {
                let at = pass_at_k(rate, k);
                let pow = pass_pow_k(rate, k);
                assert!(at >= prev_at);
                assert!(pow <= prev_pow);
                prev_at = at;
                prev_pow = pow;
            }
        }
    }

    #[test]
    fn perfect_pass_rate_is_certain() {
        for k in [1, 5, 10, 100] {
            assert_eq!(pass_at_k(1.0, k), 1.0);
            assert_eq!(pass_pow_k(1.0, k), 1.0);
        }
    }

    #[test]
    fn large_k_stays_a_probability() {
        let k = u32::MAX;
        assert!((0.0..=1.0).contains(&pass_pow_k(0.8, k)));
        assert_eq!(pass_pow_k(0.8, k), 0.0);
        assert_eq!(pass_at_k(0.8, k), 1.0);
    }

    #[test]
    fn eight_of_ten() {
        assert!((pass_at_k(0.8, 10) - 0.9999999).abs() < 1e-6);
        assert!((pass_pow_k(0.8, 10) - 0.107).abs() < 1e-3);
    }
}
