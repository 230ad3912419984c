//! Фабрика моделей: имя -> новый необученный регрессор

#![allow(non_snake_case)]

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::models::{
    Estimator, GradientBoosting, LinearRegression, RandomForest, SupportVectorRegressor,
    XgbRegressor,
};

/// Фиксированный реестр моделей; порядок определяет выбор при равных RMSE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    LinearRegression,
    SupportVectorMachine,
    RandomForest,
    GradientBoostingRegressor,
    XgbRegressor,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::LinearRegression,
        ModelKind::SupportVectorMachine,
        ModelKind::RandomForest,
        ModelKind::GradientBoostingRegressor,
        ModelKind::XgbRegressor,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "Linear Regression",
            ModelKind::SupportVectorMachine => "Support Vector Machine",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::GradientBoostingRegressor => "Gradient Boosting Regressor",
            ModelKind::XgbRegressor => "XGBRegressor",
        }
    }

    pub fn build(self) -> Model {
        match self {
            ModelKind::LinearRegression => Model::Linear(LinearRegression::new()),
            ModelKind::SupportVectorMachine => Model::SupportVector(SupportVectorRegressor::default()),
            ModelKind::RandomForest => Model::RandomForest(RandomForest::default()),
            ModelKind::GradientBoostingRegressor => Model::GradientBoosting(GradientBoosting::new()),
            ModelKind::XgbRegressor => Model::Xgb(XgbRegressor::default()),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        ModelKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PipelineError::UnrecognizedModel(s.to_string()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub enum Model {
    Linear(LinearRegression),
    SupportVector(SupportVectorRegressor),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    Xgb(XgbRegressor),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::Linear(_) => ModelKind::LinearRegression,
            Model::SupportVector(_) => ModelKind::SupportVectorMachine,
            Model::RandomForest(_) => ModelKind::RandomForest,
            Model::GradientBoosting(_) => ModelKind::GradientBoostingRegressor,
            Model::Xgb(_) => ModelKind::XgbRegressor,
        }
    }

    fn estimator(&self) -> &dyn Estimator {
        match self {
            Model::Linear(m) => m,
            Model::SupportVector(m) => m,
            Model::RandomForest(m) => m,
            Model::GradientBoosting(m) => m,
            Model::Xgb(m) => m,
        }
    }

    fn estimator_mut(&mut self) -> &mut dyn Estimator {
        match self {
            Model::Linear(m) => m,
            Model::SupportVector(m) => m,
            Model::RandomForest(m) => m,
            Model::GradientBoosting(m) => m,
            Model::Xgb(m) => m,
        }
    }
}

impl Estimator for Model {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        self.estimator_mut().fit(X, y)
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        self.estimator().predict(X)
    }

    fn is_fitted(&self) -> bool {
        self.estimator().is_fitted()
    }
}

pub struct ModelFactory;

impl ModelFactory {
    pub fn get_model(model_name: &str) -> Result<Model> {
        Ok(model_name.parse::<ModelKind>()?.build())
    }
}
