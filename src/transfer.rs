use std::path::{Path, PathBuf};
use std::time::Duration;

/// Which way a single-file transfer goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Upload,
    Download,
}

impl TransferDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TransferDirection::Upload => "upload",
            TransferDirection::Download => "download",
        }
    }
}

/// Specification for a single file transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub direction: TransferDirection,
    pub local_path: PathBuf,
    pub remote_path: String,
}

impl TransferRequest {
    pub fn upload<P: AsRef<Path>>(local_path: P, remote_path: impl Into<String>) -> Self {
        Self {
            direction: TransferDirection::Upload,
            local_path: local_path.as_ref().to_path_buf(),
            remote_path: remote_path.into(),
        }
    }

    pub fn download<P: AsRef<Path>>(remote_path: impl Into<String>, local_path: P) -> Self {
        Self {
            direction: TransferDirection::Download,
            local_path: local_path.as_ref().to_path_buf(),
            remote_path: remote_path.into(),
        }
    }
}

/// Outcome of a completed transfer
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    pub request: TransferRequest,
    pub bytes: u64,
    pub elapsed: Duration,
}

impl TransferOutcome {
    pub fn message(&self) -> String {
        let verb = match self.request.direction {
            TransferDirection::Upload => "uploaded",
            TransferDirection::Download => "downloaded",
        };
        format!(
            "File {} successfully ({} bytes in {:.1}s)",
            verb,
            self.bytes,
            self.elapsed.as_secs_f64()
        )
    }
}
