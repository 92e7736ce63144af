//! Host metric adapters.

mod sysinfo_metrics;

pub use sysinfo_metrics::SysinfoHostMetrics;
