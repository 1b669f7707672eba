use statrs::distribution::{ContinuousCDF, StudentsT};

/// Natural-log scale factor of the base-10 logistic with a 400 point spread.
pub const ELO_Q: f64 = std::f64::consts::LN_10 / 400.;

/// The Elo logistic: expected score of a player `diff` points above the opponent.
pub fn elo_logistic(diff: f64) -> f64 {
    (1. + 10f64.powf(-diff / 400.)).recip()
}

pub fn standard_logistic_cdf(z: f64) -> f64 {
    (1. + (-z).exp()).recip()
}

/// Two-sided Student-t critical value: the `(1 + confidence) / 2` quantile.
pub fn student_t_critical(confidence: f64, freedom: f64) -> f64 {
    match StudentsT::new(0., 1., freedom) {
        Ok(dist) => dist.inverse_cdf(0.5 + 0.5 * confidence),
        Err(err) => {
            tracing::warn!("No t-distribution with {} degrees of freedom: {}", freedom, err);
            f64::NAN
        }
    }
}

/// Critical values `t_{(1+confidence)/2, 100n-1}` for surface sample sizes `n`.
/// Small sizes are tabulated once; larger ones are computed on demand.
#[derive(Clone, Debug)]
pub struct ConfidenceTable {
    confidence: f64,
    values: Vec<f64>,
}

impl ConfidenceTable {
    pub const TABULATED: usize = 2000;

    pub fn new(confidence: f64) -> Self {
        let values = (0..Self::TABULATED)
            .map(|n| Self::compute(confidence, n))
            .collect();
        Self { confidence, values }
    }

    fn compute(confidence: f64, n: usize) -> f64 {
        if n == 0 {
            return f64::NAN;
        }
        student_t_critical(confidence, (100 * n - 1) as f64)
    }

    pub fn get(&self, n: usize) -> f64 {
        match self.values.get(n) {
            Some(&t) => t,
            None => Self::compute(self.confidence, n),
        }
    }
}

/// Simple exponential smoothing, seeded with the first observation.
pub fn smooth_exponential(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(series.len());
    let mut level = match series.first() {
        Some(&first) => first,
        None => return smoothed,
    };
    for &x in series {
        level = alpha * x + (1. - alpha) * level;
        smoothed.push(level);
    }
    smoothed
}

/// Returns the weighted mean and the weighted (population) standard deviation.
pub fn weighted_avg_and_std(values: &[f64], weights: &[f64]) -> (f64, f64) {
    assert_eq!(values.len(), weights.len());
    let total: f64 = weights.iter().sum();
    let avg = values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total;
    let var = values
        .iter()
        .zip(weights)
        .map(|(v, w)| w * (v - avg).powi(2))
        .sum::<f64>()
        / total;
    (avg, var.sqrt())
}
