// src/dag/mod.rs

//! Job DAG bookkeeping.
//!
//! - [`graph`] discovers every job reachable from the roots and indexes the
//!   reverse (dependent) edges.
//! - [`ready_queue`] is the priority queue of runnable jobs.
//! - [`orderer`] defines the [`JobOrderer`] contract and the heap-backed
//!   implementation that hands out jobs in dependency order.
//! - [`job_state`] provides read-only views of per-job state for tests and
//!   diagnostics.

pub mod graph;
pub mod job_state;
pub mod orderer;
pub mod ready_queue;

pub use graph::DependencyGraph;
pub use job_state::{JobState, OrdererCounts};
pub use orderer::{HeapJobOrderer, JobOrderer};
pub use ready_queue::ReadyQueue;
