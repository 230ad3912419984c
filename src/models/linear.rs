//! Линейные модели: OLS, Ridge, Lasso

#![allow(non_snake_case)]

use linfa::traits::Fit;
use linfa::Dataset as LinfaDataset;
use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::Estimator;
use crate::preprocessing::FeatureEngineer;

/// Обычные наименьшие квадраты со свободным членом (linfa-linear)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl Estimator for LinearRegression {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;

        // Постоянные и повторяющиеся колонки получают нулевой вес
        let keep = FeatureEngineer::informative_columns(X);
        let mut weights = Array1::<f64>::zeros(X.ncols());
        if keep.is_empty() {
            self.bias = y.mean().ok_or(PipelineError::EmptyDataset)?;
            self.weights = Some(weights);
            return Ok(());
        }

        let dataset = LinfaDataset::new(X.select(Axis(1), &keep), y.clone());
        let fitted = linfa_linear::LinearRegression::new()
            .fit(&dataset)
            .map_err(|e| PipelineError::Fit(e.to_string()))?;

        for (&j, &w) in keep.iter().zip(fitted.params().iter()) {
            weights[j] = w;
        }
        if keep.len() < X.ncols() {
            debug!(kept = keep.len(), total = X.ncols(), "Degenerate columns excluded from OLS");
        }
        self.weights = Some(weights);
        self.bias = fitted.intercept();
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(PipelineError::NotFitted("LinearRegression"))?;
        linear_predict(X, weights, self.bias)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

/// Ridge: (Xc^T Xc + alpha I)^(-1) Xc^T yc, свободный член не штрафуется
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    alpha: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            weights: None,
            bias: 0.0,
        }
    }
}

impl Estimator for RidgeRegression {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;
        let (Xc, yc, x_mean, y_mean) = center(X, y)?;

        let mut xtx = Xc.t().dot(&Xc);
        for i in 0..xtx.nrows() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = Xc.t().dot(&yc);

        let weights = cholesky_solve(&xtx, &xty)?;
        self.bias = y_mean - x_mean.dot(&weights);
        self.weights = Some(weights);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(PipelineError::NotFitted("RidgeRegression"))?;
        linear_predict(X, weights, self.bias)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

/// Lasso: минимизирует (1 / 2n) ||y - Xw||^2 + alpha ||w||_1 циклическим покоординатным спуском
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LassoRegression {
    alpha: f64,
    max_iter: usize,
    tol: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl LassoRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: 1000,
            tol: 1e-4,
            weights: None,
            bias: 0.0,
        }
    }
}

impl Estimator for LassoRegression {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;
        let (Xc, yc, x_mean, y_mean) = center(X, y)?;
        let n = Xc.nrows() as f64;

        let col_norms: Array1<f64> = Xc.map_axis(Axis(0), |c| c.dot(&c) / n);
        let mut w = Array1::<f64>::zeros(Xc.ncols());
        let mut residual = yc.clone();

        for _ in 0..self.max_iter {
            let mut max_step: f64 = 0.0;

            for j in 0..Xc.ncols() {
                if col_norms[j] == 0.0 {
                    continue;
                }
                let col = Xc.column(j);
                let rho = col.dot(&residual) / n + col_norms[j] * w[j];
                let updated = soft_threshold(rho, self.alpha) / col_norms[j];
                let delta = updated - w[j];

                if delta != 0.0 {
                    residual.scaled_add(-delta, &col);
                    w[j] = updated;
                    max_step = max_step.max(delta.abs());
                }
            }

            let w_max = w.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
            if w_max == 0.0 || max_step / w_max < self.tol {
                break;
            }
        }

        self.bias = y_mean - x_mean.dot(&w);
        self.weights = Some(w);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self.weights.as_ref().ok_or(PipelineError::NotFitted("LassoRegression"))?;
        linear_predict(X, weights, self.bias)
    }

    fn is_fitted(&self) -> bool {
        self.weights.is_some()
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

fn linear_predict(X: &Array2<f64>, weights: &Array1<f64>, bias: f64) -> Result<Array1<f64>> {
    if X.ncols() != weights.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: weights.len(),
            actual: X.ncols(),
        });
    }
    Ok(X.dot(weights) + bias)
}

pub(crate) fn check_fit_input(X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if X.nrows() == 0 || X.ncols() == 0 {
        return Err(PipelineError::EmptyDataset);
    }
    if X.nrows() != y.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: X.nrows(),
            actual: y.len(),
        });
    }
    Ok(())
}

fn center(
    X: &Array2<f64>,
    y: &Array1<f64>,
) -> Result<(Array2<f64>, Array1<f64>, Array1<f64>, f64)> {
    let x_mean = X.mean_axis(Axis(0)).ok_or(PipelineError::EmptyDataset)?;
    let y_mean = y.mean().ok_or(PipelineError::EmptyDataset)?;
    Ok((X - &x_mean, y - y_mean, x_mean, y_mean))
}

/// Решение A x = b для симметричной положительно определенной A через разложение Холецкого A = L L^T
fn cholesky_solve(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = A.nrows();
    let mut L = Array2::<f64>::zeros((n, n));

    for j in 0..n {
        let d = A[[j, j]] - {
            let row = L.slice(s![j, ..j]);
            row.dot(&row)
        };
        if d <= 1e-12 * A[[j, j]].abs().max(1.0) {
            return Err(PipelineError::Fit("Matrix is not positive definite".to_string()));
        }
        let diag = d.sqrt();
        L[[j, j]] = diag;

        for i in (j + 1)..n {
            let v = (A[[i, j]] - L.slice(s![i, ..j]).dot(&L.slice(s![j, ..j]))) / diag;
            L[[i, j]] = v;
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let v = (b[i] - L.slice(s![i, ..i]).dot(&z.slice(s![..i]))) / L[[i, i]];
        z[i] = v;
    }

    // L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let v = (z[i] - L.slice(s![(i + 1).., i]).dot(&x.slice(s![(i + 1)..]))) / L[[i, i]];
        x[i] = v;
    }

    Ok(x)
}
