//! Сохранение и загрузка обученной модели вместе со скейлерами

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::models::{Model, ModelKind};
use crate::preprocessing::MinMaxScaler;

/// Всё, что нужно для инференса в отдельном процессе
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub kind: ModelKind,
    pub rmse: f64,
    pub model: Model,
    pub feature_scaler: MinMaxScaler,
    pub target_scaler: MinMaxScaler,
}

/// Перезаписывает файл без предупреждения
pub fn save_artifact<P: AsRef<Path>>(path: P, artifact: &ModelArtifact) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, artifact)?;
    writer.flush().map_err(|e| PipelineError::io(path, e))?;

    info!(model = %artifact.kind, path = %path.display(), "Best model saved");
    Ok(())
}

pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<ModelArtifact> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))?;
    Ok(artifact)
}
