//! Пайплайн: разбиение, обучение, оценка, выбор и сохранение лучшей модели

#![allow(non_snake_case)]

use std::fs;
use std::path::PathBuf;

use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::inference::predict_new_data;
use crate::metrics::root_mean_squared_error;
use crate::models::{Estimator, Model, ModelKind};
use crate::persistence::{load_artifact, save_artifact, ModelArtifact};
use crate::plotting::{plot_model_performance, plot_predictions, ScatterPanel};
use crate::preprocessing::{train_test_split, FeatureEngineer, MinMaxScaler};
use crate::types::Dataset;

/// Масштабированные train/test части и скейлеры, обученные на train
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub X_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub X_test: Array2<f64>,
    pub y_test: Array1<f64>,
    pub feature_scaler: MinMaxScaler,
    pub target_scaler: MinMaxScaler,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelScore {
    pub kind: ModelKind,
    pub rmse: f64,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub score: ModelScore,
    pub predictions: Array1<f64>,
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub scores: Vec<ModelScore>,
    pub best: ModelKind,
    pub model_path: PathBuf,
    pub prediction: f64,
    pub plots: Vec<PathBuf>,
}

pub fn prepare_data(dataset: &Dataset, config: &PipelineConfig) -> Result<TrainingData> {
    let split = train_test_split(dataset.len(), config.test_size, config.seed);
    debug!(train = split.train.len(), test = split.test.len(), "Dataset split");

    if config.scale_before_split {
        // Поведение исходных скриптов: статистика теста попадает в скейлеры
        warn!("Scalers are fitted on the full dataset before splitting");
        let p = FeatureEngineer::preprocess(dataset)?;
        return Ok(TrainingData {
            X_train: p.X.select(Axis(0), &split.train),
            y_train: p.y.select(Axis(0), &split.train),
            X_test: p.X.select(Axis(0), &split.test),
            y_test: p.y.select(Axis(0), &split.test),
            feature_scaler: p.feature_scaler,
            target_scaler: p.target_scaler,
        });
    }

    let train = FeatureEngineer::preprocess(&dataset.select(&split.train))?;
    let (X_test, y_test) = FeatureEngineer::transform_with(
        &dataset.select(&split.test),
        &train.feature_scaler,
        &train.target_scaler,
    )?;

    Ok(TrainingData {
        X_train: train.X,
        y_train: train.y,
        X_test,
        y_test,
        feature_scaler: train.feature_scaler,
        target_scaler: train.target_scaler,
    })
}

/// Обучает все модели реестра в фиксированном порядке
pub fn train_models(X_train: &Array2<f64>, y_train: &Array1<f64>) -> Result<Vec<Model>> {
    let mut models = Vec::with_capacity(ModelKind::ALL.len());
    for kind in ModelKind::ALL {
        let mut model = kind.build();
        model.fit(X_train, y_train)?;
        info!(model = %kind, "Model trained");
        models.push(model);
    }
    Ok(models)
}

pub fn evaluate_models(
    models: &[Model],
    X_test: &Array2<f64>,
    y_test: &Array1<f64>,
) -> Result<Vec<Evaluation>> {
    models
        .iter()
        .map(|model| {
            let predictions = model.predict(X_test)?;
            let rmse = root_mean_squared_error(y_test, &predictions)?;
            info!(model = %model.kind(), rmse, "Model evaluated");
            Ok(Evaluation {
                score: ModelScore {
                    kind: model.kind(),
                    rmse,
                },
                predictions,
            })
        })
        .collect()
}

/// Минимальный RMSE; при равенстве побеждает первый по порядку. NaN проигрывает всему.
pub fn select_best(scores: &[ModelScore]) -> Option<ModelKind> {
    let mut best: Option<&ModelScore> = None;
    for score in scores {
        best = match best {
            None => Some(score),
            Some(b) if b.rmse.is_nan() && !score.rmse.is_nan() => Some(score),
            Some(b) if score.rmse < b.rmse => Some(score),
            keep => keep,
        };
    }
    best.map(|s| s.kind)
}

pub fn run_pipeline(dataset: &Dataset, config: &PipelineConfig) -> Result<PipelineReport> {
    let data = prepare_data(dataset, config)?;
    let models = train_models(&data.X_train, &data.y_train)?;
    let evaluations = evaluate_models(&models, &data.X_test, &data.y_test)?;
    let scores: Vec<ModelScore> = evaluations.iter().map(|e| e.score).collect();

    let mut plots = Vec::new();
    if config.plots {
        fs::create_dir_all(&config.output_dir)
            .map_err(|e| PipelineError::io(&config.output_dir, e))?;

        let bar_path = config.output_dir.join("model_rmse.svg");
        plot_model_performance(&scores, &bar_path)?;
        plots.push(bar_path);

        let panels: Vec<ScatterPanel<'_>> = evaluations
            .iter()
            .map(|e| ScatterPanel {
                title: e.score.kind.name().to_string(),
                y_true: &data.y_test,
                y_pred: &e.predictions,
            })
            .collect();
        let scatter_path = config.output_dir.join("predicted_vs_true.svg");
        plot_predictions(&panels, "Predicted vs True Values", &scatter_path)?;
        plots.push(scatter_path);
    }

    let best = select_best(&scores).ok_or(PipelineError::EmptyDataset)?;
    let rmse = scores
        .iter()
        .find(|s| s.kind == best)
        .map_or(f64::NAN, |s| s.rmse);
    info!(model = %best, rmse, "Best model selected");

    let model = models
        .into_iter()
        .find(|m| m.kind() == best)
        .ok_or(PipelineError::NotFitted("best model"))?;
    let artifact = ModelArtifact {
        kind: best,
        rmse,
        model,
        feature_scaler: data.feature_scaler,
        target_scaler: data.target_scaler,
    };
    save_artifact(&config.model_path, &artifact)?;

    let loaded = load_artifact(&config.model_path)?;
    let prediction = predict_new_data(&loaded, &config.inference_row)?;
    info!(prediction, "Inference on the configured row complete");

    Ok(PipelineReport {
        scores,
        best,
        model_path: config.model_path.clone(),
        prediction,
        plots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(kind: ModelKind, rmse: f64) -> ModelScore {
        ModelScore { kind, rmse }
    }

    #[test]
    fn strict_minimum_wins() {
        let scores = [
            score(ModelKind::LinearRegression, 0.3),
            score(ModelKind::SupportVectorMachine, 0.1),
            score(ModelKind::RandomForest, 0.2),
        ];
        assert_eq!(select_best(&scores), Some(ModelKind::SupportVectorMachine));
    }

    #[test]
    fn tie_goes_to_first_in_order() {
        let scores = [
            score(ModelKind::LinearRegression, 0.5),
            score(ModelKind::RandomForest, 0.1),
            score(ModelKind::GradientBoostingRegressor, 0.1),
            score(ModelKind::XgbRegressor, 0.1),
        ];
        assert_eq!(select_best(&scores), Some(ModelKind::RandomForest));
    }

    #[test]
    fn nan_never_wins() {
        let scores = [
            score(ModelKind::LinearRegression, f64::NAN),
            score(ModelKind::XgbRegressor, 0.7),
        ];
        assert_eq!(select_best(&scores), Some(ModelKind::XgbRegressor));
        assert_eq!(select_best(&[]), None);
    }
}
