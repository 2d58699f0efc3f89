pub mod aggregator;
pub mod config;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod sources;

pub use aggregator::{rank_jobs, Aggregator};
pub use config::Config;
pub use providers::{JobProvider, ProviderKind, ProviderRegistry};
