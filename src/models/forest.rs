//! Случайный лес регрессии

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::linear::check_fit_input;
use crate::models::tree::{RegressionTree, TreeParams};
use crate::models::Estimator;

/// Бэггинг деревьев CART: бутстрап-выборки, все признаки в каждом разбиении
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    tree_params: TreeParams,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            tree_params: TreeParams::default(),
            seed,
            trees: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100, 42)
    }
}

impl Estimator for RandomForest {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;

        let n_samples = X.nrows();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let indices: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

            let mut tree = RegressionTree::new(self.tree_params);
            tree.fit_targets(X, y, indices)?;
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted("RandomForest"));
        }

        let mut sum = Array1::<f64>::zeros(X.nrows());
        for tree in &self.trees {
            sum += &tree.predict(X)?;
        }

        Ok(sum / self.trees.len() as f64)
    }

    fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn step_data() -> (Array2<f64>, Array1<f64>) {
        let X = Array2::from_shape_fn((40, 1), |(i, _)| i as f64);
        let y = X.column(0).mapv(|v| if v < 20.0 { 1.0 } else { 3.0 });
        (X, y)
    }

    #[test]
    fn fits_step_function() {
        let (X, y) = step_data();
        let mut forest = RandomForest::new(20, 7);
        forest.fit(&X, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let pred = forest.predict(&array![[2.0], [37.0]]).unwrap();
        assert!((pred[0] - 1.0).abs() < 0.2);
        assert!((pred[1] - 3.0).abs() < 0.2);
    }

    #[test]
    fn same_seed_same_forest() {
        let (X, y) = step_data();
        let mut a = RandomForest::new(10, 3);
        let mut b = RandomForest::new(10, 3);
        a.fit(&X, &y).unwrap();
        b.fit(&X, &y).unwrap();

        let probe = array![[5.5], [19.5], [20.5]];
        assert_eq!(a.predict(&probe).unwrap(), b.predict(&probe).unwrap());
    }

    #[test]
    fn unfitted_forest_fails() {
        let forest = RandomForest::default();
        assert!(!forest.is_fitted());
        assert!(forest.predict(&array![[1.0]]).is_err());
    }
}
