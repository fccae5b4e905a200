/*!
 * On-disk status reporting.
 *
 * The node periodically writes a small JSON snapshot of its health so
 * external supervisors can watch queue pressure without talking to the
 * scheduler. The writer is outside the scheduling logic entirely.
 */

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::NodeError;

/// Coarse node lifecycle state
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Running,
    Stopped,
}

/// Snapshot of node health written to the status file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NodeStatus {
    /// Engine name this node serves
    pub engine: String,

    /// Lifecycle state
    pub state: NodeState,

    /// Jobs currently awaiting a worker
    pub queue_depth: usize,

    /// Splits across all queued jobs
    pub pending_splits: usize,

    /// Number of decoder workers
    pub workers: usize,

    /// RFC 3339 timestamp of this snapshot
    pub updated_at: String,
}

impl NodeStatus {
    /// Timestamp helper for snapshot construction
    pub fn now() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Writes status snapshots as pretty-printed JSON.
///
/// Writes go through a temp file and a rename so readers never observe a
/// half-written snapshot.
#[derive(Debug, Clone)]
pub struct StatusWriter {
    path: PathBuf,
}

impl StatusWriter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the status file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one snapshot
    pub fn write(&self, status: &NodeStatus) -> Result<(), NodeError> {
        let json = serde_json::to_string_pretty(status)
            .map_err(|e| NodeError::File(format!("Failed to serialize status: {e}")))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
