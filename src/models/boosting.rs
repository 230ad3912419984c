//! Градиентный бустинг: классический (gbdt) и второго порядка в стиле XGBoost

#![allow(non_snake_case)]

use std::fmt;

use gbdt::config::Config as GbdtConfig;
use gbdt::decision_tree::{Data, DataVec, PredVec, ValueType};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::linear::check_fit_input;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::Estimator;

/// 100 деревьев глубины 3, shrinkage 0.1, квадратичная потеря
#[derive(Default, Serialize, Deserialize)]
pub struct GradientBoosting {
    n_features: usize,
    model: Option<GBDT>,
}

impl GradientBoosting {
    pub fn new() -> Self {
        Self::default()
    }

    fn config(n_features: usize) -> GbdtConfig {
        let mut cfg = GbdtConfig::new();
        cfg.set_feature_size(n_features);
        cfg.set_max_depth(3);
        cfg.set_iterations(100);
        cfg.set_shrinkage(0.1);
        cfg.set_loss("SquaredError");
        cfg.set_debug(false);
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg
    }
}

impl fmt::Debug for GradientBoosting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GradientBoosting")
            .field("n_features", &self.n_features)
            .field("fitted", &self.model.is_some())
            .finish()
    }
}

fn to_features(row: ndarray::ArrayView1<f64>) -> Vec<ValueType> {
    row.iter().map(|&v| v as ValueType).collect()
}

impl Estimator for GradientBoosting {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;

        let mut train: DataVec = X
            .rows()
            .into_iter()
            .zip(y.iter())
            .map(|(row, &label)| Data::new_training_data(to_features(row), 1.0, label as ValueType, None))
            .collect();

        let cfg = Self::config(X.ncols());
        let mut model = GBDT::new(&cfg);
        model.fit(&mut train);

        self.n_features = X.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let model = self.model.as_ref().ok_or(PipelineError::NotFitted("GradientBoosting"))?;
        if X.ncols() != self.n_features {
            return Err(PipelineError::ShapeMismatch {
                expected: self.n_features,
                actual: X.ncols(),
            });
        }

        let test: DataVec = X
            .rows()
            .into_iter()
            .map(|row| Data::new_test_data(to_features(row), None))
            .collect();
        let predictions: PredVec = model.predict(&test);

        Ok(predictions.into_iter().map(|p| p as f64).collect())
    }

    fn is_fitted(&self) -> bool {
        self.model.is_some()
    }
}

/// Бустинг второго порядка: веса листьев `-G / (H + lambda)`, base_score 0.5
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XgbRegressor {
    n_rounds: usize,
    eta: f64,
    base_score: f64,
    tree_params: TreeParams,
    trees: Vec<RegressionTree>,
}

impl XgbRegressor {
    pub fn new(n_rounds: usize, eta: f64, max_depth: usize, lambda: f64) -> Self {
        Self {
            n_rounds,
            eta,
            base_score: 0.5,
            tree_params: TreeParams {
                max_depth: Some(max_depth),
                min_samples_split: 2,
                min_samples_leaf: 1,
                min_child_weight: 1.0,
                lambda,
            },
            trees: Vec::new(),
        }
    }
}

impl Default for XgbRegressor {
    fn default() -> Self {
        Self::new(100, 0.3, 6, 1.0)
    }
}

impl Estimator for XgbRegressor {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;

        let n_samples = X.nrows();
        let mut predictions = Array1::from_elem(n_samples, self.base_score);
        // Квадратичная потеря: h = 1
        let hess = Array1::ones(n_samples);
        let mut trees = Vec::with_capacity(self.n_rounds);

        for _ in 0..self.n_rounds {
            let grad = &predictions - y;

            let mut tree = RegressionTree::new(self.tree_params);
            tree.fit_gradients(X, &grad, &hess, (0..n_samples).collect())?;

            let update = tree.predict(X)?;
            predictions.scaled_add(self.eta, &update);
            trees.push(tree);
        }

        let train_mse = (&predictions - y).mapv(|e| e * e).mean().unwrap_or(0.0);
        debug!(rounds = trees.len(), train_mse, "XGB-style boosting finished");

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted("XgbRegressor"));
        }

        let mut predictions = Array1::from_elem(X.nrows(), self.base_score);
        for tree in &self.trees {
            predictions.scaled_add(self.eta, &tree.predict(X)?);
        }
        Ok(predictions)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}
