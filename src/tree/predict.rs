use super::tree::Tree;
use crate::errors::CartError;
use crate::metric::metric_callables;
use crate::Matrix;
use rayon::prelude::*;

impl Tree {
    pub(crate) fn predict_row(&self, data: &Matrix<f64>, row: usize) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[&node_idx];
            if node.is_leaf {
                return node.predicted_value;
            } else {
                node_idx = node.get_child_idx(data.get(row, node.split_feature));
            }
        }
    }

    pub fn predict_row_from_row_slice(&self, row: &[f64]) -> f64 {
        let mut node_idx = 0;
        loop {
            let node = &self.nodes[&node_idx];
            if node.is_leaf {
                return node.predicted_value;
            } else {
                node_idx = node.get_child_idx(&row[node.split_feature]);
            }
        }
    }

    fn predict_single_threaded(&self, data: &Matrix<f64>) -> Vec<f64> {
        data.index.iter().map(|i| self.predict_row(data, *i)).collect()
    }

    fn predict_parallel(&self, data: &Matrix<f64>) -> Vec<f64> {
        data.index.par_iter().map(|i| self.predict_row(data, *i)).collect()
    }

    /// Predicted values for every record. The tree must be fit first.
    pub fn predict(&self, data: &Matrix<f64>, parallel: bool) -> Vec<f64> {
        if parallel {
            self.predict_parallel(data)
        } else {
            self.predict_single_threaded(data)
        }
    }

    pub(crate) fn validate_features(&self, data: &Matrix<f64>) -> Result<(), CartError> {
        if data.cols != self.n_features {
            return Err(CartError::SchemaMismatch(
                format!("{} feature columns", self.n_features),
                format!("{} feature columns", data.cols),
            ));
        }
        Ok(())
    }

    pub(crate) fn validate_schema(&self, data: &Matrix<f64>, y: &[f64]) -> Result<(), CartError> {
        self.validate_features(data)?;
        if y.len() != data.rows {
            return Err(CartError::SchemaMismatch(
                format!("{} target records", data.rows),
                format!("{} target records", y.len()),
            ));
        }
        Ok(())
    }

    /// Prediction error of the tree on held-out data: mean squared error
    /// for regression, misclassification rate for classification.
    pub fn evaluate(&self, data: &Matrix<f64>, y: &[f64]) -> Result<f64, CartError> {
        self.validate_schema(data, y)?;
        let yhat = self.predict(data, false);
        let sample_weight = vec![1.0; y.len()];
        let (metric_fn, _) = metric_callables(&self.task.default_metric());
        Ok(metric_fn(y, &yhat, &sample_weight))
    }
}
