//! Конфигурация пайплайна (TOML)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    pub output_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
    /// Масштабировать до разбиения (как в исходных скриптах, с утечкой статистики теста)
    pub scale_before_split: bool,
    pub plots: bool,
    pub run_comparison: bool,
    pub summary_rows: usize,
    pub inference_row: Vec<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("Car_Purchasing_Data.xlsx"),
            model_path: PathBuf::from("car_model.json"),
            output_dir: PathBuf::from("plots"),
            test_size: 0.2,
            seed: 42,
            scale_before_split: false,
            plots: true,
            run_comparison: true,
            summary_rows: 5,
            inference_row: vec![0.0, 42.0, 62812.09301, 11609.38091, 238961.2505],
        }
    }
}

impl PipelineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        Ok(config)
    }
}
