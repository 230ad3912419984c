//! Min-max нормализация в диапазон [0, 1]

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Хранит min/max каждого признака для прямого и обратного преобразования
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: Option<Array1<f64>>,
    range: Option<Array1<f64>>,
    is_fitted: bool,
}

impl MinMaxScaler {
    pub fn new() -> Self {
        Self {
            min: None,
            range: None,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyDataset);
        }

        let min = X.fold_axis(Axis(0), f64::INFINITY, |acc, &v| acc.min(v));
        let max = X.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &v| acc.max(v));

        // Константный признак отображается в 0
        let mut range = &max - &min;
        for val in range.iter_mut() {
            if *val < 1e-12 {
                *val = 1.0;
            }
        }

        self.min = Some(min);
        self.range = Some(range);
        self.is_fitted = true;
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (min, range) = self.params()?;
        Self::check_width(min, X)?;

        let mut scaled = X.clone();
        for mut row in scaled.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - min[i]) / range[i];
            }
        }

        Ok(scaled)
    }

    pub fn inverse_transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let (min, range) = self.params()?;
        Self::check_width(min, X)?;

        let mut restored = X.clone();
        for mut row in restored.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = *val * range[i] + min[i];
            }
        }

        Ok(restored)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    pub fn n_features(&self) -> Option<usize> {
        self.min.as_ref().map(|m| m.len())
    }

    pub fn data_min(&self) -> Option<&Array1<f64>> {
        self.min.as_ref()
    }

    pub fn data_max(&self) -> Option<Array1<f64>> {
        match (&self.min, &self.range) {
            (Some(min), Some(range)) => Some(min + range),
            _ => None,
        }
    }

    fn params(&self) -> Result<(&Array1<f64>, &Array1<f64>)> {
        match (&self.min, &self.range) {
            (Some(min), Some(range)) if self.is_fitted => Ok((min, range)),
            _ => Err(PipelineError::NotFitted("Scaler")),
        }
    }

    fn check_width(min: &Array1<f64>, X: &Array2<f64>) -> Result<()> {
        if X.ncols() != min.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: min.len(),
                actual: X.ncols(),
            });
        }
        Ok(())
    }
}

impl Default for MinMaxScaler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn scales_each_column_to_unit_range() {
        let X = array![[1.0, 10.0], [3.0, 20.0], [2.0, 30.0]];
        let mut scaler = MinMaxScaler::new();
        let scaled = scaler.fit_transform(&X).unwrap();

        assert_eq!(scaled, array![[0.0, 0.0], [1.0, 0.5], [0.5, 1.0]]);
        assert_eq!(scaler.data_max().unwrap(), array![3.0, 30.0]);
    }

    #[test]
    fn inverse_transform_round_trips() {
        let y = array![[35321.45], [45115.52], [42925.71], [67422.36], [55915.46]];
        let mut scaler = MinMaxScaler::new();
        scaler.fit(&y).unwrap();

        let probe = array![[35321.45], [40000.0], [50123.456], [67422.36]];
        let back = scaler
            .inverse_transform(&scaler.transform(&probe).unwrap())
            .unwrap();
        for (a, b) in back.iter().zip(probe.iter()) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let X = array![[5.0], [5.0], [5.0]];
        let scaled = MinMaxScaler::new().fit_transform(&X).unwrap();
        assert!(scaled.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unfitted_and_width_errors() {
        let scaler = MinMaxScaler::new();
        assert!(matches!(
            scaler.transform(&array![[1.0]]),
            Err(PipelineError::NotFitted(_))
        ));

        let mut scaler = MinMaxScaler::new();
        scaler.fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&array![[1.0, 2.0, 3.0]]),
            Err(PipelineError::ShapeMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn empty_fit_fails() {
        let X = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            MinMaxScaler::new().fit(&X),
            Err(PipelineError::EmptyDataset)
        ));
    }
}
