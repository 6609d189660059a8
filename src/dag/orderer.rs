// src/dag/orderer.rs

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::dag::graph::DependencyGraph;
use crate::dag::job_state::{JobState, OrdererCounts};
use crate::dag::ready_queue::ReadyQueue;
use crate::errors::{JunknetError, Result};
use crate::job::Job;

/// Hands out jobs in a valid topological order, one at a time.
///
/// Implementations do no IO. Callers that share an orderer between several
/// workers must serialize access to it (see [`crate::engine::JobSequence`]).
pub trait JobOrderer: Send {
    /// Get the next job that can be run and mark it in flight.
    ///
    /// `None` only means nothing is runnable *right now*: remaining jobs may
    /// be blocked or in flight. Use [`JobOrderer::is_done`] to detect the end.
    fn pop_next_job(&mut self) -> Option<Job>;

    /// Mark an in-flight job as completed, possibly unblocking dependents.
    fn report_completed_job(&mut self, job: &Job) -> Result<()>;

    /// Put an in-flight job back up for execution.
    ///
    /// Only for failures of the execution environment. A job that ran and
    /// exited with a nonzero status must not be reported here.
    fn report_failed_job(&mut self, job: &Job) -> Result<()>;

    /// Whether every job has been completed.
    fn is_done(&self) -> bool;
}

/// [`JobOrderer`] that prefers the ready job with the most direct dependents.
///
/// Running a job that unblocks more work first is a greedy heuristic to keep
/// as many jobs runnable as possible; it is not a global optimum.
///
/// Every discovered job is in exactly one of `ready`, `blocked` or
/// `in_flight` until it is reported completed, after which the orderer
/// forgets it.
#[derive(Debug)]
pub struct HeapJobOrderer {
    graph: DependencyGraph,
    /// Per tracked job: how many of its prerequisites have completed.
    completed_prerequisites: HashMap<Job, usize>,
    ready: ReadyQueue,
    blocked: HashSet<Job>,
    in_flight: HashSet<Job>,
}

impl HeapJobOrderer {
    /// Build an orderer over every job reachable from `roots`.
    ///
    /// Discovery finishes before any job enters the ready queue, so the
    /// dependent counts used as priorities are final when they are read.
    pub fn new<'a, I>(roots: I) -> Self
    where
        I: IntoIterator<Item = &'a Job>,
    {
        let graph = DependencyGraph::discover(roots);

        let mut completed_prerequisites = HashMap::with_capacity(graph.len());
        let mut ready = ReadyQueue::new();
        let mut blocked = HashSet::new();

        for job in graph.jobs() {
            completed_prerequisites.insert(job.clone(), 0);
            if job.is_source() {
                ready.push(job.clone(), graph.num_dependents(job));
            } else {
                blocked.insert(job.clone());
            }
        }

        debug!(
            jobs = graph.len(),
            ready = ready.len(),
            blocked = blocked.len(),
            "job orderer initialised"
        );

        Self {
            graph,
            completed_prerequisites,
            ready,
            blocked,
            in_flight: HashSet::new(),
        }
    }

    /// Read-only view of where `job` currently sits.
    pub fn state_of(&self, job: &Job) -> JobState {
        if !self.completed_prerequisites.contains_key(job) {
            JobState::Untracked
        } else if self.in_flight.contains(job) {
            JobState::InFlight
        } else if self.blocked.contains(job) {
            JobState::Blocked
        } else {
            JobState::Ready
        }
    }

    pub fn counts(&self) -> OrdererCounts {
        OrdererCounts {
            ready: self.ready.len(),
            blocked: self.blocked.len(),
            in_flight: self.in_flight.len(),
        }
    }

    /// Number of direct dependents of a discovered job.
    pub fn num_dependents(&self, job: &Job) -> usize {
        self.graph.num_dependents(job)
    }

    /// The discovered job graph.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    fn not_in_flight(&self, job: &Job, verb: &str) -> JunknetError {
        if self.graph.contains(job) {
            JunknetError::UnknownJob(format!(
                "job '{}' reported {verb} but it is not in flight",
                job.target()
            ))
        } else {
            JunknetError::UnknownJob(format!(
                "job '{}' reported {verb} but it is not part of this job graph",
                job.target()
            ))
        }
    }
}

impl JobOrderer for HeapJobOrderer {
    fn pop_next_job(&mut self) -> Option<Job> {
        let job = self.ready.pop()?;
        trace!(job = %job.target(), "job popped; marking in flight");
        self.in_flight.insert(job.clone());
        Some(job)
    }

    fn report_completed_job(&mut self, job: &Job) -> Result<()> {
        if !self.in_flight.remove(job) {
            return Err(self.not_in_flight(job, "completed"));
        }

        for dependent in self.graph.dependents_of(job) {
            let Some(completed) = self.completed_prerequisites.get_mut(dependent) else {
                continue;
            };
            *completed += 1;

            if *completed == dependent.num_prerequisite_jobs() {
                debug!(
                    job = %dependent.target(),
                    unblocked_by = %job.target(),
                    "all prerequisites completed; job is ready"
                );
                self.blocked.remove(dependent);
                self.ready
                    .push(dependent.clone(), self.graph.num_dependents(dependent));
            }
        }

        self.completed_prerequisites.remove(job);
        debug!(job = %job.target(), remaining = self.counts().remaining(), "job completed");
        Ok(())
    }

    fn report_failed_job(&mut self, job: &Job) -> Result<()> {
        if !self.in_flight.remove(job) {
            return Err(self.not_in_flight(job, "failed"));
        }

        debug_assert_eq!(
            self.completed_prerequisites.get(job).copied(),
            Some(job.num_prerequisite_jobs()),
            "in-flight job must have all prerequisites completed"
        );

        debug!(job = %job.target(), "job failed; re-queueing");
        self.ready.push(job.clone(), self.graph.num_dependents(job));
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.ready.is_empty() && self.blocked.is_empty() && self.in_flight.is_empty()
    }
}
