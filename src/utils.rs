use crate::data::{FloatData, Matrix};
use crate::errors::CartError;
use std::collections::HashMap;

/// Create a string of all available items.
pub fn items_to_strings(items: Vec<&str>) -> String {
    let mut s = String::new();
    for i in items {
        s.push_str(i);
        s.push_str(&String::from(", "));
    }
    s
}

// Validation
pub fn validate_positive_float_parameter<T: FloatData<T>>(value: T, parameter: &str) -> Result<(), CartError> {
    validate_float_parameter(value, T::ZERO, T::INFINITY, parameter)
}

pub fn validate_float_parameter<T: FloatData<T>>(value: T, min: T, max: T, parameter: &str) -> Result<(), CartError> {
    if value.is_nan() || value < min || max < value {
        let ex_msg = format!("real value within range {} and {}", min, max);
        Err(CartError::InvalidParameter(
            parameter.to_string(),
            ex_msg,
            value.to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Partition a slice of row indices in place around a split, so that all
/// rows with `data[row][split_feature] < split_value` land in the front.
/// Returns the number of rows in the left partition.
pub fn pivot_on_split(index: &mut [usize], data: &Matrix<f64>, split_feature: usize, split_value: f64) -> usize {
    let mut i = 0;
    let mut j = index.len();
    while i < j {
        if *data.get(index[i], split_feature) < split_value {
            i += 1;
        } else {
            j -= 1;
            index.swap(i, j);
        }
    }
    i
}

/// Count the occurrences of each class label over the given rows.
/// Labels are keyed by their bit pattern so arbitrary float codes work.
pub fn class_counts(y: &[f64], index: &[usize]) -> HashMap<u64, usize> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for &i in index {
        *counts.entry(y[i].to_bits()).or_insert(0) += 1;
    }
    counts
}

/// The majority label and its count. Ties go to the numerically smaller label.
pub fn majority_class(counts: &HashMap<u64, usize>) -> (f64, usize) {
    let mut best: Option<(f64, usize)> = None;
    let mut labels: Vec<(f64, usize)> = counts.iter().map(|(k, v)| (f64::from_bits(*k), *v)).collect();
    labels.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (label, count) in labels {
        match best {
            None => best = Some((label, count)),
            Some((_, c)) if count > c => best = Some((label, count)),
            _ => {}
        }
    }
    best.unwrap_or((f64::NAN, 0))
}

/// Gini impurity of a set of class counts over `n` records.
pub fn gini_impurity(counts: &HashMap<u64, usize>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    let sum_sq: f64 = counts.values().map(|&c| {
        let p = c as f64 / nf;
        p * p
    }).sum();
    1.0 - sum_sq
}

pub fn precision_round(n: f64, precision: i32) -> f64 {
    let p = (10.0_f64).powi(precision);
    (n * p).round() / p
}
