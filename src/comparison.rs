//! Сравнение линейного семейства на сырых признаках Gender, Age, Annual Salary

#![allow(non_snake_case)]

use std::fmt;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::metrics::mean_squared_error;
use crate::models::{Estimator, LassoRegression, LinearRegression, RidgeRegression};
use crate::plotting::{plot_predictions, ScatterPanel};
use crate::preprocessing::{train_test_split, FeatureEngineer, MinMaxScaler};
use crate::types::{Column, Dataset, TARGET_COLUMN};

pub const COMPARISON_FEATURES: [Column; 3] = [Column::Gender, Column::Age, Column::AnnualSalary];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinearVariant {
    Linear,
    Ridge,
    Lasso,
    Polynomial,
}

impl LinearVariant {
    pub const ALL: [LinearVariant; 4] = [
        LinearVariant::Linear,
        LinearVariant::Ridge,
        LinearVariant::Lasso,
        LinearVariant::Polynomial,
    ];

    pub fn title(self) -> &'static str {
        match self {
            LinearVariant::Linear => "Linear Regression",
            LinearVariant::Ridge => "Ridge Regression",
            LinearVariant::Lasso => "Lasso Regression",
            LinearVariant::Polynomial => "Polynomial Regression (degree=2)",
        }
    }
}

impl fmt::Display for LinearVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub variant: LinearVariant,
    pub mse: f64,
    pub y_true: Array1<f64>,
    pub predictions: Array1<f64>,
}

pub fn compare_linear_models(dataset: &Dataset, config: &PipelineConfig) -> Result<Vec<ComparisonResult>> {
    let X = FeatureEngineer::extract_columns(dataset, &COMPARISON_FEATURES)?;
    let y = FeatureEngineer::extract_columns(dataset, &[TARGET_COLUMN])?
        .column(0)
        .to_owned();

    let split = train_test_split(dataset.len(), config.test_size, config.seed);
    let X_train = X.select(Axis(0), &split.train);
    let X_test = X.select(Axis(0), &split.test);
    let y_train = y.select(Axis(0), &split.train);
    let y_test = y.select(Axis(0), &split.test);

    let mut results = Vec::with_capacity(LinearVariant::ALL.len());
    for variant in LinearVariant::ALL {
        let predictions = match variant {
            LinearVariant::Linear => fit_predict(LinearRegression::new(), &X_train, &y_train, &X_test)?,
            LinearVariant::Ridge => fit_predict(RidgeRegression::new(1.0), &X_train, &y_train, &X_test)?,
            LinearVariant::Lasso => fit_predict(LassoRegression::new(1.0), &X_train, &y_train, &X_test)?,
            LinearVariant::Polynomial => {
                let (P_train, P_test) = polynomial_design(&X_train, &X_test)?;
                fit_predict(LinearRegression::new(), &P_train, &y_train, &P_test)?
            }
        };

        let mse = mean_squared_error(&y_test, &predictions)?;
        info!(model = %variant, mse, "Linear-family model evaluated");
        results.push(ComparisonResult {
            variant,
            mse,
            y_true: y_test.clone(),
            predictions,
        });
    }

    Ok(results)
}

/// Полиномиальные признаки, приведенные к [0, 1] по train, без постоянных и совпадающих колонок
fn polynomial_design(X_train: &Array2<f64>, X_test: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
    let mut scaler = MinMaxScaler::new();
    let P_train = scaler.fit_transform(&FeatureEngineer::polynomial_features(X_train))?;
    let P_test = scaler.transform(&FeatureEngineer::polynomial_features(X_test))?;

    let keep = FeatureEngineer::informative_columns(&P_train);
    Ok((P_train.select(Axis(1), &keep), P_test.select(Axis(1), &keep)))
}

fn fit_predict<E: Estimator>(
    mut model: E,
    X_train: &Array2<f64>,
    y_train: &Array1<f64>,
    X_test: &Array2<f64>,
) -> Result<Array1<f64>> {
    model.fit(X_train, y_train)?;
    model.predict(X_test)
}

pub fn plot_comparison(results: &[ComparisonResult], path: &Path) -> Result<()> {
    let panels: Vec<ScatterPanel<'_>> = results
        .iter()
        .map(|r| ScatterPanel {
            title: r.variant.title().to_string(),
            y_true: &r.y_true,
            y_pred: &r.predictions,
        })
        .collect();
    plot_predictions(&panels, "Regression Model Comparisons", path)
}
