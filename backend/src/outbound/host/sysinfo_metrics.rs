//! `HostMetrics` backed by the `sysinfo` crate.
//!
//! `sysinfo` reads procfs and friends synchronously, so every reading runs
//! on the blocking pool. CPU load needs two samples separated by
//! [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`]; that pause happens on the
//! blocking thread as well.

use async_trait::async_trait;
use sysinfo::{Disks, MINIMUM_CPU_UPDATE_INTERVAL, System};

use crate::domain::ports::{DiskReading, HostMetrics, MemoryReading, ProbeError};

async fn blocking<T, F>(read: F) -> Result<T, ProbeError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(read)
        .await
        .map_err(|err| ProbeError::unavailable(format!("host metrics task failed: {err}")))
}

/// Reads the local host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoHostMetrics;

#[async_trait]
impl HostMetrics for SysinfoHostMetrics {
    async fn cpu_load(&self) -> Result<f64, ProbeError> {
        blocking(|| {
            let mut system = System::new();
            system.refresh_cpu_usage();
            std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
            system.refresh_cpu_usage();
            f64::from(system.global_cpu_usage())
        })
        .await
    }

    async fn cpu_cores(&self) -> Result<usize, ProbeError> {
        blocking(|| {
            let mut system = System::new();
            system.refresh_cpu_all();
            system.cpus().len()
        })
        .await
    }

    async fn memory(&self) -> Result<MemoryReading, ProbeError> {
        blocking(|| {
            let mut system = System::new();
            system.refresh_memory();
            MemoryReading {
                total: system.total_memory(),
                available: system.available_memory(),
                used: system.used_memory(),
            }
        })
        .await
    }

    async fn disks(&self) -> Result<Vec<DiskReading>, ProbeError> {
        blocking(|| {
            Disks::new_with_refreshed_list()
                .list()
                .iter()
                .map(|disk| {
                    let total = disk.total_space();
                    let available = disk.available_space();
                    DiskReading {
                        total,
                        available,
                        used: total.saturating_sub(available),
                    }
                })
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Smoke tests against the machine running the suite.
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn readings_are_internally_consistent() {
        let metrics = SysinfoHostMetrics;

        let load = metrics.cpu_load().await.expect("cpu load");
        assert!((0.0..=100.0).contains(&load) || load.is_nan());

        let memory = metrics.memory().await.expect("memory");
        assert!(memory.available <= memory.total);

        for disk in metrics.disks().await.expect("disks") {
            assert_eq!(disk.used, disk.total.saturating_sub(disk.available));
        }
    }
}
