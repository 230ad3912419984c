//! Car purchase ML - сравнение регрессоров, выбор лучшего и инференс

pub mod comparison;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod inference;
pub mod metrics;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod plotting;
pub mod preprocessing;
pub mod summary;
pub mod types;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use types::*;

// Re-export для удобства
pub use models::{Estimator, Model, ModelFactory, ModelKind};
pub use persistence::{load_artifact, save_artifact, ModelArtifact};
pub use pipeline::{run_pipeline, select_best, ModelScore, PipelineReport};
pub use preprocessing::{FeatureEngineer, MinMaxScaler};
