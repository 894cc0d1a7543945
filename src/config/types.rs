use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WalkpoolConfig {
    /// Worker pool sizing
    #[serde(default)]
    pub pool: PoolConfig,

    /// Directory walk behaviour
    #[serde(default)]
    pub walk: WalkConfig,
}

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    /// Maximum number of worker threads (0 = no limit)
    #[serde(default)]
    pub max_threads: usize,

    /// Percentage of CPU cores to use (1-100)
    #[serde(default = "default_thread_percentage")]
    pub thread_percentage: u8,

    /// Jobs buffered before submit blocks
    #[serde(default = "default_job_queue_capacity")]
    pub job_queue_capacity: usize,
}

fn default_thread_percentage() -> u8 {
    100
}

fn default_job_queue_capacity() -> usize {
    crate::parallel::DEFAULT_JOB_QUEUE_CAPACITY
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: default_thread_percentage(),
            job_queue_capacity: default_job_queue_capacity(),
        }
    }
}

/// Directory walk configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WalkConfig {
    /// Re-queue symlinks that resolve to directories
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Skip directories whose canonical path was already queued
    #[serde(default)]
    pub detect_cycles: bool,

    /// File paths buffered before the walker blocks (0 is raised to 1)
    #[serde(default)]
    pub file_queue_capacity: usize,

    /// Pending directories (0 = unbounded)
    #[serde(default)]
    pub directory_queue_capacity: usize,

    /// Failure handling for unreadable directories and broken links
    #[serde(default)]
    pub on_error: ErrorPolicy,
}

/// What a walk does when the filesystem fails it
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the error and terminate the process
    #[default]
    Abort,
    /// Log the error and carry on with the next entry
    Skip,
}
