/// Модуль предобработки данных

pub mod encoding;
pub mod feature_engineering;
pub mod imputation;
pub mod normalization;
pub mod preprocessor;
pub mod spec;
pub mod split;

pub use encoding::one_hot_expand;
pub use feature_engineering::FeatureEngineer;
pub use imputation::{impute_median, impute_mode, ImputationPlan};
pub use normalization::standardize;
pub use preprocessor::{FeatureMatrix, FeaturePreprocessor, FeatureVector};
pub use spec::PreprocessingSpec;
pub use split::train_validation_split;
