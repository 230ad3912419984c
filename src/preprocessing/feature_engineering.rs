//! Извлечение признаков из датасета

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};

use crate::error::{PipelineError, Result};
use crate::preprocessing::MinMaxScaler;
use crate::types::{Column, Dataset, FEATURE_COLUMNS, TARGET_COLUMN};

/// Результат предобработки: масштабированные данные и обученные скейлеры
#[derive(Debug, Clone, PartialEq)]
pub struct Preprocessed {
    pub X: Array2<f64>,
    pub y: Array1<f64>,
    pub feature_scaler: MinMaxScaler,
    pub target_scaler: MinMaxScaler,
}

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Проекция колонок в матрицу; пустая ячейка - ошибка
    pub fn extract_columns(dataset: &Dataset, columns: &[Column]) -> Result<Array2<f64>> {
        let n_samples = dataset.len();
        let mut features = Array2::zeros((n_samples, columns.len()));

        for (i, record) in dataset.records().iter().enumerate() {
            for (j, &column) in columns.iter().enumerate() {
                features[[i, j]] = column.value(record).ok_or_else(|| PipelineError::MissingValue {
                    column: column.name().to_string(),
                    row: i,
                })?;
            }
        }

        Ok(features)
    }

    pub fn extract_features(dataset: &Dataset) -> Result<Array2<f64>> {
        Self::extract_columns(dataset, &FEATURE_COLUMNS)
    }

    pub fn extract_target(dataset: &Dataset) -> Result<Array1<f64>> {
        let y = Self::extract_columns(dataset, &[TARGET_COLUMN])?;
        Ok(y.column(0).to_owned())
    }

    /// Удаляет имя, e-mail, страну и цель; масштабирует признаки и цель независимо
    pub fn preprocess(dataset: &Dataset) -> Result<Preprocessed> {
        if dataset.is_empty() {
            return Err(PipelineError::EmptyDataset);
        }

        let X = Self::extract_features(dataset)?;
        let y = Self::extract_target(dataset)?;

        let mut feature_scaler = MinMaxScaler::new();
        let X_scaled = feature_scaler.fit_transform(&X)?;

        let mut target_scaler = MinMaxScaler::new();
        let y_scaled = target_scaler.fit_transform(&as_column(&y))?;

        Ok(Preprocessed {
            X: X_scaled,
            y: y_scaled.column(0).to_owned(),
            feature_scaler,
            target_scaler,
        })
    }

    /// Применяет уже обученные скейлеры (для тестовой части)
    pub fn transform_with(
        dataset: &Dataset,
        feature_scaler: &MinMaxScaler,
        target_scaler: &MinMaxScaler,
    ) -> Result<(Array2<f64>, Array1<f64>)> {
        let X = feature_scaler.transform(&Self::extract_features(dataset)?)?;
        let y = target_scaler.transform(&as_column(&Self::extract_target(dataset)?))?;
        Ok((X, y.column(0).to_owned()))
    }

    /// Полиномиальные признаки степени 2: [x_i, x_i * x_j (i <= j)].
    /// Столбец единиц не добавляется, свободный член остается за моделью.
    pub fn polynomial_features(X: &Array2<f64>) -> Array2<f64> {
        let n_features = X.ncols();
        let n_out = n_features + n_features * (n_features + 1) / 2;
        let mut out = Array2::zeros((X.nrows(), n_out));

        for (i, row) in X.rows().into_iter().enumerate() {
            let mut idx = 0;
            for j in 0..n_features {
                out[[i, idx]] = row[j];
                idx += 1;
            }

            for a in 0..n_features {
                for b in a..n_features {
                    out[[i, idx]] = row[a] * row[b];
                    idx += 1;
                }
            }
        }

        out
    }

    /// Индексы непостоянных и попарно различных колонок.
    /// Для бинарного x квадрат x^2 совпадает с x, такие дубли убираются.
    pub fn informative_columns(X: &Array2<f64>) -> Vec<usize> {
        let mut keep: Vec<usize> = Vec::new();
        for j in 0..X.ncols() {
            let col = X.column(j);
            let first = col.first().copied().unwrap_or(0.0);
            if col.iter().all(|&v| v == first) {
                continue;
            }
            if keep.iter().any(|&k| X.column(k) == col) {
                continue;
            }
            keep.push(j);
        }
        keep
    }
}

/// Вектор в матрицу n x 1
pub fn as_column(v: &Array1<f64>) -> Array2<f64> {
    v.clone().insert_axis(ndarray::Axis(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CustomerRecord;
    use ndarray::array;

    fn record(gender: f64, age: f64, salary: f64, amount: Option<f64>) -> CustomerRecord {
        CustomerRecord {
            customer_name: "Name".into(),
            customer_email: "mail@example.com".into(),
            country: "Nowhere".into(),
            gender: Some(gender),
            age: Some(age),
            annual_salary: Some(salary),
            credit_card_debt: Some(1000.0),
            net_worth: Some(age * 1000.0),
            car_purchase_amount: amount,
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![
            record(0.0, 30.0, 40000.0, Some(20000.0)),
            record(1.0, 50.0, 80000.0, Some(60000.0)),
            record(1.0, 40.0, 60000.0, Some(40000.0)),
        ])
    }

    #[test]
    fn preprocess_scales_features_and_target() {
        let p = FeatureEngineer::preprocess(&dataset()).unwrap();

        assert_eq!(p.X.dim(), (3, 5));
        assert_eq!(p.X.column(1).to_vec(), vec![0.0, 1.0, 0.5]);
        // Долг одинаков у всех - колонка нулевая
        assert!(p.X.column(3).iter().all(|&v| v == 0.0));
        assert_eq!(p.y, array![0.0, 1.0, 0.5]);
        assert_eq!(p.target_scaler.data_min().unwrap()[0], 20000.0);
    }

    #[test]
    fn preprocess_is_deterministic() {
        let a = FeatureEngineer::preprocess(&dataset()).unwrap();
        let b = FeatureEngineer::preprocess(&dataset()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_target_is_conversion_error() {
        let data = Dataset::new(vec![
            record(0.0, 30.0, 40000.0, Some(1.0)),
            record(0.0, 31.0, 40000.0, None),
        ]);
        let err = FeatureEngineer::preprocess(&data).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingValue { ref column, row: 1 } if column == "Car Purchase Amount"
        ));
    }

    #[test]
    fn polynomial_expansion_degree_two() {
        let X = array![[2.0, 3.0]];
        let poly = FeatureEngineer::polynomial_features(&X);
        assert_eq!(poly, array![[2.0, 3.0, 4.0, 6.0, 9.0]]);
    }

    #[test]
    fn binary_square_and_constant_columns_are_dropped() {
        let X = array![[0.0, 1.0, 7.0], [1.0, 2.0, 7.0], [1.0, 3.0, 7.0]];
        let poly = FeatureEngineer::polynomial_features(&X);
        // x0, x1, x2, x0^2, x0*x1, x0*x2, x1^2, x1*x2, x2^2
        let keep = FeatureEngineer::informative_columns(&poly);
        assert_eq!(keep, vec![0, 1, 4, 5, 6, 7]);
    }
}
