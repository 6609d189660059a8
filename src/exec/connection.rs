// src/exec/connection.rs

//! Pluggable connection abstraction.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::job::Job;
use crate::types::JobResult;

/// Boxed, sendable future returned by the connection traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A handle to one remote daemon, able to run one job at a time.
///
/// A connection is owned by exactly one worker for its whole life.
pub trait Connection: Send {
    /// Run `job` on the daemon.
    ///
    /// - `Ok(result)` means the job ran; `result.status` says whether the
    ///   build itself succeeded.
    /// - `Err(_)` means the daemon could not be reached or the stream broke.
    ///   The job may be retried elsewhere.
    fn run<'a>(&'a mut self, job: &'a Job) -> BoxFuture<'a, Result<JobResult>>;

    /// Release the connection. Called exactly once, when the worker exits.
    fn end(&mut self) -> BoxFuture<'_, Result<()>>;

    /// Whether `run` can still be called.
    ///
    /// A connection that returns `false` is retired by its worker after the
    /// failed job has been re-queued.
    fn is_open(&self) -> bool {
        true
    }
}

/// Opens connections to daemons.
pub trait ConnectionFactory: Send + Sync + 'static {
    fn connect<'a>(&'a self, host: &'a str, port: u16)
    -> BoxFuture<'a, Result<Box<dyn Connection>>>;
}
