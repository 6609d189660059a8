// src/job/model.rs

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::types::JobEnv;

/// Everything needed to construct a [`Job`].
///
/// The job takes its own copies of these collections, deduplicating
/// prerequisite jobs by identity and files by name.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    /// The target the job produces. Must be unique within one job graph.
    pub target: String,
    /// Build steps, run in order.
    pub commands: Vec<String>,
    /// Jobs that must complete before this one may run.
    pub prerequisite_jobs: Vec<Job>,
    /// Input files (not jobs) the job reads.
    pub prerequisite_files: Vec<String>,
    /// Runtime environment; the default image is used when `None`.
    pub environment: Option<JobEnv>,
}

#[derive(Debug)]
struct JobData {
    target: String,
    commands: Vec<String>,
    prerequisite_jobs: Vec<Job>,
    prerequisite_files: BTreeSet<String>,
    environment: JobEnv,
}

/// A node of the job DAG.
///
/// `Job` is a cheap, shareable handle. Equality and hashing use the identity
/// of the underlying node, not its target: two separately constructed jobs
/// are distinct even if they build the same target. Nothing about a job can
/// change after construction.
#[derive(Clone)]
pub struct Job {
    inner: Arc<JobData>,
}

impl Job {
    pub fn new(options: JobOptions) -> Self {
        let JobOptions {
            target,
            commands,
            prerequisite_jobs,
            prerequisite_files,
            environment,
        } = options;

        let mut seen = HashSet::new();
        let prerequisite_jobs = prerequisite_jobs
            .into_iter()
            .filter(|job| seen.insert(job.clone()))
            .collect();

        Self {
            inner: Arc::new(JobData {
                target,
                commands,
                prerequisite_jobs,
                prerequisite_files: prerequisite_files.into_iter().collect(),
                environment: environment.unwrap_or_default(),
            }),
        }
    }

    /// A job with no prerequisites and no commands.
    pub fn source(target: impl Into<String>) -> Self {
        Self::new(JobOptions {
            target: target.into(),
            ..JobOptions::default()
        })
    }

    pub fn target(&self) -> &str {
        &self.inner.target
    }

    pub fn prerequisite_jobs(&self) -> impl Iterator<Item = &Job> {
        self.inner.prerequisite_jobs.iter()
    }

    pub fn prerequisite_files(&self) -> impl Iterator<Item = &str> {
        self.inner.prerequisite_files.iter().map(String::as_str)
    }

    pub fn num_prerequisite_jobs(&self) -> usize {
        self.inner.prerequisite_jobs.len()
    }

    /// Whether the job can run without waiting on any other job.
    pub fn is_source(&self) -> bool {
        self.inner.prerequisite_jobs.is_empty()
    }

    pub fn commands(&self) -> &[String] {
        &self.inner.commands
    }

    pub fn environment(&self) -> &JobEnv {
        &self.inner.environment
    }

    /// Every transitive prerequisite job.
    ///
    /// For each direct prerequisite, its own deep prerequisites come first,
    /// followed by the prerequisite itself. Jobs shared by several branches
    /// appear once per path; the result is not deduplicated.
    pub fn deep_prerequisites(&self) -> Vec<Job> {
        let mut out = Vec::new();
        for prerequisite in self.prerequisite_jobs() {
            out.extend(prerequisite.deep_prerequisites());
            out.push(prerequisite.clone());
        }
        out
    }

    /// Whether `self` and `other` are the same node.
    pub fn same_job(&self, other: &Job) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Job {
    fn eq(&self, other: &Self) -> bool {
        self.same_job(other)
    }
}

impl Eq for Job {}

impl Hash for Job {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.inner), state);
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prerequisites: Vec<&str> = self.prerequisite_jobs().map(Job::target).collect();
        f.debug_struct("Job")
            .field("target", &self.inner.target)
            .field("prerequisites", &prerequisites)
            .field("files", &self.inner.prerequisite_files)
            .field("image", &self.inner.environment.docker_image)
            .finish()
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_source() {
            return write!(f, "Source job {}.", self.target());
        }

        let prerequisites: Vec<&str> = self.prerequisite_jobs().map(Job::target).collect();
        write!(
            f,
            "Job \"{}\" depending on {}.",
            self.target(),
            prerequisites.join(", ")
        )
    }
}
