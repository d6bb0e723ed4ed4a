/// Модели и аналитика поверх матрицы признаков

pub mod aggregates;
pub mod classifier;
pub mod pricing;

pub use classifier::{LogisticModel, ProbabilisticClassifier};
pub use aggregates::DatasetSummary;
pub use pricing::{DemandLevel, PricingOptimizer};
