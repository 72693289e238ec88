mod aggregator;


pub use aggregator::{MetricsSnapshot, RunMetrics};
