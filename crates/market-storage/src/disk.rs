//! Disk capacity of the filesystem backing a directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use sysinfo::Disks;

/// Space on the filesystem that holds `directory`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskUsage {
    pub directory: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    pub usage_percent: f64,
}

impl DiskUsage {
    pub fn from_space(directory: &Path, total_bytes: u64, free_bytes: u64) -> Self {
        let free_bytes = free_bytes.min(total_bytes);
        let used_bytes = total_bytes - free_bytes;
        let usage_percent = if total_bytes == 0 {
            0.0
        } else {
            used_bytes as f64 * 100.0 / total_bytes as f64
        };

        Self {
            directory: directory.display().to_string(),
            total_bytes,
            free_bytes,
            used_bytes,
            usage_percent,
        }
    }

    /// Usage strictly above `threshold_percent`
    pub fn exceeds(&self, threshold_percent: f64) -> bool {
        self.usage_percent > threshold_percent
    }
}

/// Look up the disk whose mount point is the longest prefix of `directory`.
///
/// Returns `None` when the directory cannot be resolved or no mounted disk
/// contains it. Blocking: call from `spawn_blocking` in async code.
pub fn disk_usage(directory: &Path) -> Option<DiskUsage> {
    let resolved = directory.canonicalize().ok()?;
    let disks = Disks::new_with_refreshed_list();

    disks
        .iter()
        .filter(|disk| resolved.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().components().count())
        .map(|disk| DiskUsage::from_space(directory, disk.total_space(), disk.available_space()))
}

/// Async wrapper around [`disk_usage`]
pub async fn disk_usage_async(directory: PathBuf) -> Option<DiskUsage> {
    match tokio::task::spawn_blocking(move || disk_usage(&directory)).await {
        Ok(usage) => usage,
        Err(e) => {
            tracing::warn!(error = %e, "Disk usage lookup task failed");
            None
        }
    }
}
