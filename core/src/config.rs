//! Immutable run configuration, spec §3/§6.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i32 = 1_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bucket: String,
    pub prefix: String,
    pub destination: std::path::PathBuf,

    pub region: Option<String>,
    pub https: bool,
    pub throughput_target_gbps: u32,
    pub part_size: u64,
    pub concurrent_downloads: usize,
    pub interfaces: Vec<String>,
    pub benchmark: bool,

    #[serde(default = "default_output_every")]
    pub output_every_secs: u64,
}

fn default_output_every() -> u64 {
    1
}

impl Config {
    /// Number of worker pipelines to spawn: one per configured interface, or
    /// exactly one if none are configured (spec §4.4).
    pub fn worker_count(&self) -> usize {
        std::cmp::max(1, self.interfaces.len())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            prefix: String::new(),
            destination: std::path::PathBuf::from("."),
            region: None,
            https: true,
            throughput_target_gbps: 5,
            part_size: 8 * 1024 * 1024,
            concurrent_downloads: 10,
            interfaces: Vec::new(),
            benchmark: false,
            output_every_secs: 1,
        }
    }
}
