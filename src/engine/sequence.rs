// src/engine/sequence.rs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::dag::JobOrderer;
use crate::errors::Result;
use crate::job::Job;

/// Outcome of asking a [`JobSequence`] for the next job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextJob {
    /// A job that is now in flight for the caller.
    Job(Job),
    /// Every job has been completed.
    EndOfSequence,
    /// The sequence was cancelled; no more jobs will be handed out.
    Cancelled,
}

/// Waitable view of a [`JobOrderer`] shared by any number of workers.
///
/// Each call to [`JobSequence::next`] yields a job as soon as one is runnable,
/// suspending without polling while everything is blocked or in flight. Any
/// report or cancellation wakes every suspended caller, which then retries.
///
/// The orderer sits behind a mutex that is only held for the duration of a
/// single orderer call, never across an `.await`.
#[derive(Debug)]
pub struct JobSequence<O> {
    orderer: Mutex<O>,
    changed: Notify,
    cancelled: AtomicBool,
}

impl<O: JobOrderer> JobSequence<O> {
    pub fn new(orderer: O) -> Self {
        Self {
            orderer: Mutex::new(orderer),
            changed: Notify::new(),
            cancelled: AtomicBool::new(false),
        }
    }

    /// Wait for the next runnable job.
    pub async fn next(&self) -> NextJob {
        loop {
            // Register interest before looking at the orderer so a report
            // landing between the check and the await is not missed.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_cancelled() {
                return NextJob::Cancelled;
            }

            {
                let mut orderer = self.lock();
                if orderer.is_done() {
                    return NextJob::EndOfSequence;
                }
                if let Some(job) = orderer.pop_next_job() {
                    return NextJob::Job(job);
                }
            }

            trace!("no runnable job; waiting for a report");
            notified.await;
        }
    }

    /// Forward a completion to the orderer and wake waiting consumers.
    pub fn report_completed(&self, job: &Job) -> Result<()> {
        let result = self.lock().report_completed_job(job);
        self.changed.notify_waiters();
        result
    }

    /// Forward a failure to the orderer and wake waiting consumers.
    pub fn report_failed(&self, job: &Job) -> Result<()> {
        let result = self.lock().report_failed_job(job);
        self.changed.notify_waiters();
        result
    }

    /// Stop handing out jobs, now and for every future call to `next`.
    ///
    /// The orderer's own state is left untouched.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("job sequence cancelled");
        }
        self.changed.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the underlying orderer reports that every job is complete.
    pub fn is_done(&self) -> bool {
        self.lock().is_done()
    }

    /// Run `f` with exclusive access to the orderer.
    pub fn with_orderer<R>(&self, f: impl FnOnce(&O) -> R) -> R {
        f(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, O> {
        self.orderer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
