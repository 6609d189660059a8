// src/types.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Image used when a job does not name its own runtime environment.
pub const DEFAULT_DOCKER_IMAGE: &str = "buildpack-deps:bullseye";

/// Description of the runtime environment a job must run under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobEnv {
    /// The `name:version` specifier of the Docker image required by the job.
    pub docker_image: String,
}

impl JobEnv {
    pub fn new(docker_image: impl Into<String>) -> Self {
        Self {
            docker_image: docker_image.into(),
        }
    }
}

impl Default for JobEnv {
    fn default() -> Self {
        JobEnv::new(DEFAULT_DOCKER_IMAGE)
    }
}

/// Which output stream of a remote process a chunk of data belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Result of running one job on a daemon.
///
/// `status` is the exit status of the remote build: `0` means success, any
/// other value is a job-level failure. Transport failures never produce a
/// `JobResult`; they surface as errors from `Connection::run` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobResult {
    pub status: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl JobResult {
    /// A result with the given status and no captured output.
    pub fn with_status(status: i32) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 0
    }

    /// Append a chunk of output to the matching buffer.
    pub fn push_output(&mut self, stream: OutputStream, data: &[u8]) {
        match stream {
            OutputStream::Stdout => self.stdout.extend_from_slice(data),
            OutputStream::Stderr => self.stderr.extend_from_slice(data),
        }
    }
}
