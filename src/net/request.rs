// src/net/request.rs

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::job::Job;

/// A request for the daemon to run one job.
///
/// The request names the target only; the recipe itself is staged on the
/// daemon separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// The Docker image the job should run on.
    pub image: String,
    /// The build target corresponding to the job.
    pub target: String,
}

impl From<&Job> for JobRequest {
    fn from(job: &Job) -> Self {
        Self {
            image: job.environment().docker_image.clone(),
            target: job.target().to_string(),
        }
    }
}

/// A request for the daemon to send build artifacts after a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetArtifacts {
    /// File names of the requested artifacts, sent back as an archive stream.
    pub files: Vec<String>,
}

/// Announces an archive stream of input files to stage before a job runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushInputs {}

/// Any request from a client to a daemon, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    Job(JobRequest),
    Get(GetArtifacts),
    Put(PushInputs),
}

impl Request {
    /// Serialize as a single JSON line, including the trailing newline.
    pub fn to_line(&self) -> Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl From<&Job> for Request {
    fn from(job: &Job) -> Self {
        Request::Job(JobRequest::from(job))
    }
}

/// Parse a request from its JSON serialization.
///
/// Returns `None` if the input is not JSON or does not have the shape of any
/// request. Unknown extra fields are ignored.
pub fn parse_request(input: &str) -> Option<Request> {
    serde_json::from_str(input).ok()
}
