//! Tabular ML - предобработка табличных данных и скоринг

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod models;
pub mod preprocessing;
pub mod session;
pub mod types;

pub use data::Dataset;
pub use error::{PrepError, Result};
pub use preprocessing::{
    FeatureEngineer, FeatureMatrix, FeaturePreprocessor, FeatureVector, ImputationPlan,
    PreprocessingSpec,
};
pub use session::Session;
pub use types::*;
