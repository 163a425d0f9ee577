pub mod noop;
pub mod prometheus;

// Factory functions, selected at startup via AUTHGATE_METRICS_TYPE
pub use noop::create as create_noop_metrics;
pub use prometheus::create as create_prom_metrics;
