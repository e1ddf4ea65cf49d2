use crate::data::FloatData;
use crate::errors::CartError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type MetricFn = fn(&[f64], &[f64], &[f64]) -> f64;

/// Compare to metric values, determining if b is better.
/// If one of them is NaN favor the non NaN value.
/// If both are NaN, consider the first value to be better.
pub fn is_comparison_better(value: f64, comparison: f64, maximize: bool) -> bool {
    match (value.is_nan(), comparison.is_nan()) {
        // Both nan, comparison is not better,
        // Or comparison is nan, also not better
        (true, true) | (false, true) => false,
        // comparison is not Nan, it's better
        (true, false) => true,
        // Perform numerical comparison.
        (false, false) => {
            if maximize {
                value < comparison
            } else {
                value > comparison
            }
        }
    }
}

/// The kind of response a tree is fit against.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum Task {
    #[default]
    Regression,
    Classification,
}

impl Task {
    /// The metric used when evaluating a tree of this task on held-out data.
    pub fn default_metric(&self) -> Metric {
        match self {
            Task::Regression => Metric::MeanSquaredError,
            Task::Classification => Metric::ErrorRate,
        }
    }
}

impl FromStr for Task {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Regression" => Ok(Task::Regression),
            "Classification" => Ok(Task::Classification),
            _ => Err(CartError::ParseString(
                s.to_string(),
                "Task".to_string(),
                items_to_strings(vec!["Regression", "Classification"]),
            )),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Task::Regression => write!(f, "Regression"),
            Task::Classification => write!(f, "Classification"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub enum Metric {
    MeanSquaredError,
    RootMeanSquaredError,
    ErrorRate,
}

impl FromStr for Metric {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MeanSquaredError" => Ok(Metric::MeanSquaredError),
            "RootMeanSquaredError" => Ok(Metric::RootMeanSquaredError),
            "ErrorRate" => Ok(Metric::ErrorRate),
            _ => Err(CartError::ParseString(
                s.to_string(),
                "Metric".to_string(),
                items_to_strings(vec!["MeanSquaredError", "RootMeanSquaredError", "ErrorRate"]),
            )),
        }
    }
}

pub fn metric_callables(metric_type: &Metric) -> (MetricFn, bool) {
    match metric_type {
        Metric::MeanSquaredError => (MeanSquaredErrorMetric::calculate_metric, MeanSquaredErrorMetric::maximize()),
        Metric::RootMeanSquaredError => (
            RootMeanSquaredErrorMetric::calculate_metric,
            RootMeanSquaredErrorMetric::maximize(),
        ),
        Metric::ErrorRate => (ErrorRateMetric::calculate_metric, ErrorRateMetric::maximize()),
    }
}

pub trait EvaluationMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64;
    fn maximize() -> bool;
}

pub struct MeanSquaredErrorMetric {}
impl EvaluationMetric for MeanSquaredErrorMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
        mean_squared_error(y, yhat, sample_weight)
    }
    fn maximize() -> bool {
        false
    }
}

pub struct RootMeanSquaredErrorMetric {}
impl EvaluationMetric for RootMeanSquaredErrorMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
        root_mean_squared_error(y, yhat, sample_weight)
    }
    fn maximize() -> bool {
        false
    }
}

pub struct ErrorRateMetric {}
impl EvaluationMetric for ErrorRateMetric {
    fn calculate_metric(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
        error_rate(y, yhat, sample_weight)
    }
    fn maximize() -> bool {
        false
    }
}

pub fn mean_squared_error(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            (y_ - yhat_).powi(2) * *w_
        })
        .sum::<f64>();
    res / w_sum
}

pub fn root_mean_squared_error(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    mean_squared_error(y, yhat, sample_weight).sqrt()
}

/// Fraction of records where the predicted label does not match the true label.
pub fn error_rate(y: &[f64], yhat: &[f64], sample_weight: &[f64]) -> f64 {
    let mut w_sum = 0.;
    let res = y
        .iter()
        .zip(yhat)
        .zip(sample_weight)
        .map(|((y_, yhat_), w_)| {
            w_sum += *w_;
            if y_ == yhat_ {
                f64::ZERO
            } else {
                f64::ONE * *w_
            }
        })
        .sum::<f64>();
    res / w_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::precision_round;

    #[test]
    fn test_mean_squared_error() {
        let y = vec![1., 3., 4., 5., 2., 4., 6.];
        let yhat = vec![3., 2., 3., 4., 4., 4., 4.];
        let sample_weight = vec![1., 1., 1., 1., 1., 2., 2.];
        let res = mean_squared_error(&y, &yhat, &sample_weight);
        assert_eq!(precision_round(res, 6), 2.111111);
        let rmse = root_mean_squared_error(&y, &yhat, &sample_weight);
        assert_eq!(precision_round(rmse, 6), 1.452966);
    }

    #[test]
    fn test_error_rate() {
        let y = vec![1., 0., 1., 0., 1., 1.];
        let yhat = vec![1., 0., 0., 0., 0., 1.];
        let sample_weight = vec![1.; 6];
        let res = error_rate(&y, &yhat, &sample_weight);
        assert_eq!(precision_round(res, 6), precision_round(2. / 6., 6));
        assert!(res >= 0.0);
        assert!(res <= 1.0);
    }

    #[test]
    fn test_is_comparison_better() {
        assert!(is_comparison_better(0.5, 0.3, false));
        assert!(!is_comparison_better(0.3, 0.5, false));
        assert!(is_comparison_better(0.3, 0.5, true));
        assert!(!is_comparison_better(f64::NAN, f64::NAN, false));
        assert!(is_comparison_better(f64::NAN, 0.5, false));
        assert!(!is_comparison_better(0.5, f64::NAN, false));
    }

    #[test]
    fn test_task_parsing() {
        assert_eq!(Task::from_str("Regression").unwrap(), Task::Regression);
        assert_eq!(Task::from_str("Classification").unwrap(), Task::Classification);
        assert!(Task::from_str("Ranking").is_err());
        assert_eq!(Task::Classification.default_metric(), Metric::ErrorRate);
    }
}
