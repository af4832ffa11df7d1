pub mod analytics;
pub mod metrics;
