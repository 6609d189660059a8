// src/engine/worker.rs

//! Per-connection worker loop.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::dag::JobOrderer;
use crate::engine::client::ClientShared;
use crate::engine::sequence::NextJob;
use crate::engine::{ClientEvent, WorkerExit};
use crate::errors::Result;
use crate::exec::Connection;
use crate::job::Job;

/// Pull jobs and run them on `connection` until the sequence ends or is
/// cancelled.
///
/// The connection is released on every way out of the loop before any
/// terminal event is emitted.
pub(crate) async fn run_worker<F, O: JobOrderer>(
    shared: Arc<ClientShared<F, O>>,
    mut connection: Box<dyn Connection>,
    address: String,
) {
    info!(%address, "worker started");

    let exit = pull_loop(&shared, connection.as_mut(), &address).await;

    if let Err(error) = connection.end().await {
        warn!(%address, %error, "failed to release daemon connection");
    }

    match exit {
        Ok(WorkerExit::Drained) => {
            info!(%address, "all jobs complete; worker exiting");
            shared.finish(true);
        }
        Ok(WorkerExit::Cancelled) => {
            debug!(%address, "worker cancelled");
        }
        Ok(WorkerExit::Disconnected) => {
            warn!(%address, "daemon connection lost; worker exiting");
            shared.emit(ClientEvent::Disconnected { address });
        }
        Err(error) => {
            error!(%address, %error, "worker stopped on an unrecoverable error");
            shared.emit(ClientEvent::WorkerFailed { address, error });
            shared.quit();
        }
    }
}

async fn pull_loop<F, O: JobOrderer>(
    shared: &ClientShared<F, O>,
    connection: &mut dyn Connection,
    address: &str,
) -> Result<WorkerExit> {
    loop {
        let job = match shared.jobs.next().await {
            NextJob::Job(job) => job,
            NextJob::EndOfSequence => return Ok(WorkerExit::Drained),
            NextJob::Cancelled => return Ok(WorkerExit::Cancelled),
        };

        dispatch(shared, connection, &job, address).await?;

        if !connection.is_open() {
            return Ok(WorkerExit::Disconnected);
        }
    }
}

/// Run one job and feed the outcome back into the sequence.
///
/// - transport error: the job is re-queued and the worker keeps pulling,
///   unless the connection reports itself closed
/// - nonzero status: the job counts as completed, but the whole client quits
///
/// `Progress` is sent before the completion is reported: the report may let
/// another worker emit the terminal event.
async fn dispatch<F, O: JobOrderer>(
    shared: &ClientShared<F, O>,
    connection: &mut dyn Connection,
    job: &Job,
    address: &str,
) -> Result<()> {
    debug!(%address, job = %job.target(), "dispatching job");

    let result = match connection.run(job).await {
        Ok(result) => result,
        Err(error) => {
            warn!(
                %address,
                job = %job.target(),
                %error,
                "job did not run to completion; re-queueing"
            );
            shared.jobs.report_failed(job)?;
            return Ok(());
        }
    };

    // Cancel before reporting so no other worker can see the sequence end
    // and claim success first.
    let fatal = !result.is_success();
    if fatal {
        shared.jobs.cancel();
    }

    info!(
        %address,
        job = %job.target(),
        status = result.status,
        "job finished"
    );
    shared.emit(ClientEvent::Progress {
        job: job.clone(),
        result,
    });
    shared.jobs.report_completed(job)?;

    if fatal {
        warn!(job = %job.target(), "job exited with nonzero status; stopping all workers");
        shared.quit();
    }

    Ok(())
}
