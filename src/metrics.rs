use ndarray::Array1;

use crate::error::{PipelineError, Result};

pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::ShapeMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    (y_true - y_pred)
        .mapv(|e| e * e)
        .mean()
        .ok_or(PipelineError::EmptyDataset)
}

pub fn root_mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    Ok(mean_squared_error(y_true, y_pred)?.sqrt())
}
