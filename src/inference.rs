//! Предсказание суммы покупки для одной строки

use ndarray::Array2;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::Estimator;
use crate::persistence::ModelArtifact;
use crate::preprocessing::as_column;

/// Масштабирует строку скейлером артефакта, предсказывает и возвращает сумму в долларах
pub fn predict_new_data(artifact: &ModelArtifact, row: &[f64]) -> Result<f64> {
    let expected = artifact
        .feature_scaler
        .n_features()
        .ok_or(PipelineError::NotFitted("Scaler"))?;
    if row.len() != expected {
        return Err(PipelineError::ShapeMismatch {
            expected,
            actual: row.len(),
        });
    }

    let input = Array2::from_shape_vec((1, row.len()), row.to_vec())
        .map_err(|e| PipelineError::Fit(e.to_string()))?;
    let scaled = artifact.feature_scaler.transform(&input)?;

    let prediction = artifact.model.predict(&scaled)?;
    debug!(scaled_prediction = prediction[0], "Raw model output");

    // Предсказание всегда приводится к колонке n x 1 перед обратным масштабированием
    let restored = artifact.target_scaler.inverse_transform(&as_column(&prediction))?;
    Ok(restored[[0, 0]])
}
