/// Модуль предобработки данных

pub mod feature_engineering;
pub mod normalization;
pub mod split;

pub use feature_engineering::{as_column, FeatureEngineer, Preprocessed};
pub use normalization::MinMaxScaler;
pub use split::{train_test_split, SplitIndices};
