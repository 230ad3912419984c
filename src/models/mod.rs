/// ML модели

pub mod boosting;
pub mod factory;
pub mod forest;
pub mod linear;
pub mod svr;
pub mod tree;

use ndarray::{Array1, Array2};

use crate::error::Result;

pub use boosting::{GradientBoosting, XgbRegressor};
pub use factory::{Model, ModelFactory, ModelKind};
pub use forest::RandomForest;
pub use linear::{LassoRegression, LinearRegression, RidgeRegression};
pub use svr::SupportVectorRegressor;
pub use tree::{RegressionTree, TreeParams};

/// Общий контракт регрессора: fit / predict
pub trait Estimator {
    #[allow(non_snake_case)]
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    #[allow(non_snake_case)]
    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>>;

    fn is_fitted(&self) -> bool;
}
