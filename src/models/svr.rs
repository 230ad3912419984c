//! Epsilon-SVR с RBF-ядром.
//!
//! Двойственная задача решается покоординатным спуском:
//! `min 0.5 b^T K b - y^T b + eps |b|_1`, `-C <= b_i <= C`.
//! Свободный член включен в ядро (`K + 1`), поэтому ограничение
//! `sum b_i = 0` не нужно.

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::linear::check_fit_input;
use crate::models::Estimator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportVectorRegressor {
    c: f64,
    epsilon: f64,
    /// None - "scale": 1 / (n_features * Var(X))
    gamma: Option<f64>,
    max_iter: usize,
    tol: f64,
    fitted: Option<FittedSvr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedSvr {
    gamma: f64,
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
}

impl SupportVectorRegressor {
    pub fn new(c: f64, epsilon: f64) -> Self {
        Self {
            c,
            epsilon,
            gamma: None,
            max_iter: 1000,
            tol: 1e-3,
            fitted: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = Some(gamma);
        self
    }

    #[cfg(test)]
    pub(crate) fn n_support(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.dual_coef.len())
    }

    fn resolve_gamma(&self, X: &Array2<f64>) -> f64 {
        if let Some(gamma) = self.gamma {
            return gamma;
        }
        let mean = X.mean().unwrap_or(0.0);
        let var = X.mapv(|v| (v - mean).powi(2)).mean().unwrap_or(0.0);
        if var > 0.0 {
            1.0 / (X.ncols() as f64 * var)
        } else {
            1.0
        }
    }
}

impl Default for SupportVectorRegressor {
    fn default() -> Self {
        Self::new(1.0, 0.1)
    }
}

fn rbf(a: ArrayView1<f64>, b: ArrayView1<f64>, gamma: f64) -> f64 {
    let dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
    (-gamma * dist).exp()
}

impl Estimator for SupportVectorRegressor {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_fit_input(X, y)?;

        let n = X.nrows();
        let gamma = self.resolve_gamma(X);

        let mut K = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let k = rbf(X.row(i), X.row(j), gamma) + 1.0;
                K[[i, j]] = k;
                K[[j, i]] = k;
            }
        }

        let mut beta = Array1::<f64>::zeros(n);
        // f = K beta
        let mut f = Array1::<f64>::zeros(n);
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            let mut max_step: f64 = 0.0;

            for i in 0..n {
                let k_ii = K[[i, i]];
                let grad = f[i] - y[i];
                let z = beta[i] - grad / k_ii;
                let shrunk = z.signum() * (z.abs() - self.epsilon / k_ii).max(0.0);
                let updated = shrunk.clamp(-self.c, self.c);
                let delta = updated - beta[i];

                if delta != 0.0 {
                    beta[i] = updated;
                    f.scaled_add(delta, &K.column(i));
                    max_step = max_step.max(delta.abs());
                }
            }

            if max_step < self.tol * 1e-3 {
                break;
            }
        }

        let support: Vec<usize> = (0..n).filter(|&i| beta[i] != 0.0).collect();
        let mut support_vectors = Array2::zeros((support.len(), X.ncols()));
        for (row, &i) in support.iter().enumerate() {
            support_vectors.row_mut(row).assign(&X.row(i));
        }
        let dual_coef: Array1<f64> = support.iter().map(|&i| beta[i]).collect();

        debug!(iterations, n_support = support.len(), gamma, "SVR converged");

        self.fitted = Some(FittedSvr {
            gamma,
            support_vectors,
            dual_coef,
        });
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or(PipelineError::NotFitted("SupportVectorRegressor"))?;
        if fitted.support_vectors.nrows() > 0 && X.ncols() != fitted.support_vectors.ncols() {
            return Err(PipelineError::ShapeMismatch {
                expected: fitted.support_vectors.ncols(),
                actual: X.ncols(),
            });
        }

        let predictions = X
            .rows()
            .into_iter()
            .map(|x| {
                fitted
                    .support_vectors
                    .rows()
                    .into_iter()
                    .zip(fitted.dual_coef.iter())
                    .map(|(sv, coef)| coef * (rbf(sv, x, fitted.gamma) + 1.0))
                    .sum::<f64>()
            })
            .collect();

        Ok(predictions)
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
