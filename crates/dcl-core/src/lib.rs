pub mod aggregate;
pub mod cache;
pub mod compliance;
pub mod config;
pub mod engine;
pub mod error;
pub mod governance;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use aggregate::{DivisionSummary, OrganizationCostReport};
pub use cache::DivisionCache;
pub use config::Config;
pub use engine::{CostCalculationResult, CostEngine};
pub use error::CostError;
pub use normalize::NormalizedMetrics;
pub use pipeline::{BatchOptions, BatchOutcome, CostPipeline, RepositoryRecord};
pub use types::*;
