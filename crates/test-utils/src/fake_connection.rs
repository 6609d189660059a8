use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use junknet::errors::{JunknetError, Result};
use junknet::exec::{BoxFuture, Connection, ConnectionFactory};
use junknet::job::Job;
use junknet::types::JobResult;

/// What a `ScriptedConnection` does for one `run` call.
#[derive(Debug, Clone)]
pub enum Step {
    /// The job ran and exited with this status.
    Status(i32),
    /// The job ran and produced this result.
    Result(JobResult),
    /// The transport broke before the job finished.
    TransportError,
    /// The transport broke and the connection is closed for good.
    Disconnect,
}

impl Step {
    fn into_result(self, job: &Job) -> Result<JobResult> {
        match self {
            Step::Status(status) => Ok(JobResult::with_status(status)),
            Step::Result(result) => Ok(result),
            Step::TransportError | Step::Disconnect => Err(JunknetError::Transport(format!(
                "scripted transport failure for job '{}'",
                job.target()
            ))),
        }
    }
}

/// Shared record of what happened on a `ScriptedConnection`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionLog {
    runs: Arc<Mutex<Vec<Job>>>,
    ends: Arc<AtomicUsize>,
}

impl ConnectionLog {
    /// Jobs passed to `run`, in call order.
    pub fn runs(&self) -> Vec<Job> {
        self.runs.lock().unwrap().clone()
    }

    /// Targets passed to `run`, in call order.
    pub fn targets(&self) -> Vec<String> {
        self.runs().iter().map(|j| j.target().to_string()).collect()
    }

    pub fn run_count(&self) -> usize {
        self.runs.lock().unwrap().len()
    }

    pub fn end_count(&self) -> usize {
        self.ends.load(Ordering::SeqCst)
    }
}

/// A fake daemon connection that:
/// - records every job it is asked to run
/// - answers from a script, then with the fallback step once the script is
///   exhausted
/// - optionally sleeps before answering, to keep jobs in flight
pub struct ScriptedConnection {
    script: VecDeque<Step>,
    fallback: Step,
    delay: Option<Duration>,
    open: bool,
    log: ConnectionLog,
}

impl ScriptedConnection {
    /// A connection on which every job succeeds.
    pub fn succeeding() -> Self {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<Step>) -> Self {
        Self {
            script: script.into(),
            fallback: Step::Status(0),
            delay: None,
            open: true,
            log: ConnectionLog::default(),
        }
    }

    pub fn fallback(mut self, step: Step) -> Self {
        self.fallback = step;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn log(&self) -> ConnectionLog {
        self.log.clone()
    }
}

impl Connection for ScriptedConnection {
    fn run<'a>(&'a mut self, job: &'a Job) -> BoxFuture<'a, Result<JobResult>> {
        Box::pin(async move {
            self.log.runs.lock().unwrap().push(job.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let step = self.script.pop_front().unwrap_or_else(|| self.fallback.clone());
            if matches!(step, Step::Disconnect) {
                self.open = false;
            }
            step.into_result(job)
        })
    }

    fn end(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.log.ends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

/// Hands out queued connections in order; fails once the queue is empty.
#[derive(Clone, Default)]
pub struct FakeConnectionFactory {
    connections: Arc<Mutex<VecDeque<Box<dyn Connection>>>>,
    connects: Arc<Mutex<Vec<(String, u16)>>>,
}

impl FakeConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a connection and return its log.
    pub fn push(&self, connection: ScriptedConnection) -> ConnectionLog {
        let log = connection.log();
        self.connections
            .lock()
            .unwrap()
            .push_back(Box::new(connection));
        log
    }

    /// Every `(host, port)` passed to `connect`.
    pub fn connects(&self) -> Vec<(String, u16)> {
        self.connects.lock().unwrap().clone()
    }
}

impl ConnectionFactory for FakeConnectionFactory {
    fn connect<'a>(
        &'a self,
        host: &'a str,
        port: u16,
    ) -> BoxFuture<'a, Result<Box<dyn Connection>>> {
        Box::pin(async move {
            self.connects
                .lock()
                .unwrap()
                .push((host.to_string(), port));
            self.connections
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| {
                    JunknetError::Transport(format!("no fake daemon listening on {host}:{port}"))
                })
        })
    }
}
