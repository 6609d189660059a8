// src/engine/mod.rs

//! Distribution engine.
//!
//! This module ties together:
//! - the job sequence that lets any number of workers wait on one orderer
//! - the client that turns each daemon connection into a worker
//! - the per-connection worker loop that runs jobs and reports results
//!
//! [`sequence`] is usable on its own; [`client`] and [`worker`] build on it.

use crate::errors::JunknetError;
use crate::job::Job;
use crate::types::JobResult;

/// Events emitted by a [`Client`].
#[derive(Debug)]
pub enum ClientEvent {
    /// A job ran to completion on some daemon.
    Progress { job: Job, result: JobResult },
    /// `introduce` could not connect. Other workers are unaffected.
    ConnectFailed { address: String, error: JunknetError },
    /// A worker hit an invariant violation and stopped the whole client.
    WorkerFailed { address: String, error: JunknetError },
    /// A connection broke for good. Its job was re-queued for other workers.
    Disconnected { address: String },
    /// The overall operation finished. Emitted exactly once.
    Done { success: bool },
}

/// Why a worker left its pull loop without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Every job has been completed.
    Drained,
    /// The client was told to stop.
    Cancelled,
    /// The connection can no longer run jobs.
    Disconnected,
}

pub mod client;
pub mod sequence;
pub mod worker;

pub use client::Client;
pub use sequence::{JobSequence, NextJob};
