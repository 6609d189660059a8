// src/dag/job_state.rs

//! Read-only views of orderer state.

/// Where a job currently sits inside an orderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// The orderer does not track this job: it was never discovered, or it
    /// has already been reported completed.
    Untracked,
    /// Waiting on at least one prerequisite.
    Blocked,
    /// All prerequisites completed; waiting to be popped.
    Ready,
    /// Handed out by `pop_next_job`, not yet reported.
    InFlight,
}

/// Sizes of the ready, blocked and in-flight partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrdererCounts {
    pub ready: usize,
    pub blocked: usize,
    pub in_flight: usize,
}

impl OrdererCounts {
    /// Number of jobs that still have to be completed.
    pub fn remaining(&self) -> usize {
        self.ready + self.blocked + self.in_flight
    }
}
