mod common;
use crate::common::fake_connection::{FakeConnectionFactory, ScriptedConnection, Step};
use crate::common::{init_tracing, job_after, with_timeout};

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use junknet::dag::{HeapJobOrderer, JobOrderer};
use junknet::engine::{Client, ClientEvent};
use junknet::errors::{JunknetError, Result};
use junknet::job::Job;
use junknet::types::JobResult;

/// Receive events up to and including the terminal one.
async fn until_done(events: &mut UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        let done = matches!(event, ClientEvent::Done { .. });
        seen.push(event);
        if done {
            break;
        }
    }
    seen
}

fn terminal(events: &[ClientEvent]) -> Option<bool> {
    events.iter().find_map(|e| match e {
        ClientEvent::Done { success } => Some(*success),
        _ => None,
    })
}

fn progress_targets(events: &[ClientEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Progress { job, .. } => Some(job.target().to_string()),
            _ => None,
        })
        .collect()
}

fn independent(targets: &[&str]) -> Vec<Job> {
    targets.iter().map(|t| Job::source(*t)).collect()
}

#[tokio::test]
async fn single_connection_runs_every_independent_job_once() {
    init_tracing();
    let jobs = independent(&["X", "Y", "Z"]);
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::succeeding());

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new(&jobs));
    let worker = client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    with_timeout(worker).await.unwrap();

    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(log.run_count(), 3);
    let mut ran = log.targets();
    ran.sort();
    assert_eq!(ran, vec!["X", "Y", "Z"]);
    assert_eq!(progress_targets(&seen).len(), 3);
}

#[tokio::test]
async fn progress_event_carries_the_job_result() {
    init_tracing();
    let job = Job::source("hello");
    let factory = FakeConnectionFactory::new();
    factory.push(ScriptedConnection::with_script(vec![Step::Result(JobResult {
        status: 0,
        stdout: b"hi\n".to_vec(),
        stderr: Vec::new(),
    })]));

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new([&job]));
    client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    match &seen[0] {
        ClientEvent::Progress { job: ran, result } => {
            assert!(ran.same_job(&job));
            assert_eq!(result.stdout, b"hi\n");
            assert!(result.is_success());
        }
        other => panic!("expected progress first, got {other:?}"),
    }
    assert_eq!(terminal(&seen), Some(true));
}

#[tokio::test]
async fn dependent_jobs_run_after_their_prerequisites() {
    init_tracing();
    let a = Job::source("a");
    let b = job_after("b", &[&a]);
    let c = job_after("c", &[&b]);
    let factory = FakeConnectionFactory::new();
    let first = factory.push(ScriptedConnection::succeeding().delay(Duration::from_millis(10)));
    let second = factory.push(ScriptedConnection::succeeding().delay(Duration::from_millis(10)));

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new([&c]));
    client.introduce("d1", 1);
    client.introduce("d2", 2);

    let seen = with_timeout(until_done(&mut events)).await;
    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(progress_targets(&seen), vec!["a", "b", "c"]);
    assert_eq!(first.run_count() + second.run_count(), 3);
}

#[tokio::test]
async fn transport_failures_are_retried_until_the_job_runs() {
    init_tracing();
    let job = Job::source("flaky");
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::with_script(vec![
        Step::TransportError,
        Step::TransportError,
        Step::TransportError,
    ]));

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new([&job]));
    client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(log.run_count(), 4);
    assert_eq!(progress_targets(&seen), vec!["flaky"]);
}

#[tokio::test]
async fn nonzero_status_stops_the_whole_distribution() {
    init_tracing();
    let jobs = independent(&["X", "Y", "Z"]);
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::with_script(vec![Step::Status(1)]));

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new(&jobs));
    let worker = client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    with_timeout(worker).await.unwrap();

    assert_eq!(terminal(&seen), Some(false));
    assert_eq!(log.run_count(), 1);
    assert_eq!(log.end_count(), 1);
    assert!(client.is_finished());
    assert!(client.jobs().is_cancelled());

    // The failing job itself was reported, and carried its status.
    match &seen[0] {
        ClientEvent::Progress { result, .. } => assert_eq!(result.status, 1),
        other => panic!("expected progress first, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_is_released_when_the_worker_drains() {
    init_tracing();
    let job = Job::source("only");
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::succeeding());

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new([&job]));
    let worker = client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    with_timeout(worker).await.unwrap();

    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(log.end_count(), 1);
    assert!(client.jobs().is_done());
}

#[tokio::test]
async fn each_connection_gets_one_of_as_many_jobs() {
    init_tracing();
    const WORKER_COUNT: usize = 4;

    let targets: Vec<String> = (0..WORKER_COUNT).map(|i| format!("job_{i}")).collect();
    let jobs: Vec<Job> = targets.iter().map(Job::source).collect();
    let factory = FakeConnectionFactory::new();
    let logs: Vec<_> = (0..WORKER_COUNT)
        .map(|_| {
            factory.push(ScriptedConnection::succeeding().delay(Duration::from_millis(200)))
        })
        .collect();

    let (client, mut events) = Client::new(factory.clone(), HeapJobOrderer::new(&jobs));
    let workers: Vec<_> = (0..WORKER_COUNT)
        .map(|i| client.introduce("localhost", 7000 + i as u16))
        .collect();

    let seen = with_timeout(until_done(&mut events)).await;
    for worker in workers {
        with_timeout(worker).await.unwrap();
    }

    assert_eq!(terminal(&seen), Some(true));
    for log in &logs {
        assert_eq!(log.run_count(), 1);
        assert_eq!(log.end_count(), 1);
    }
    let mut ran: Vec<String> = logs.iter().flat_map(|l| l.targets()).collect();
    ran.sort();
    assert_eq!(ran, targets);
    assert_eq!(factory.connects().len(), WORKER_COUNT);
}

#[tokio::test]
async fn closed_connection_retires_its_worker_and_the_job_moves_on() {
    init_tracing();
    let job = Job::source("a");
    let factory = FakeConnectionFactory::new();
    let broken = factory.push(ScriptedConnection::with_script(vec![Step::Disconnect]));

    let (client, mut events) = Client::new(factory.clone(), HeapJobOrderer::new([&job]));
    with_timeout(client.introduce("d1", 1)).await.unwrap();

    match with_timeout(events.recv()).await {
        Some(ClientEvent::Disconnected { address }) => assert_eq!(address, "d1:1"),
        other => panic!("expected disconnect, got {other:?}"),
    }
    assert_eq!(broken.run_count(), 1);
    assert_eq!(broken.end_count(), 1);
    assert!(!client.is_finished());

    let healthy = factory.push(ScriptedConnection::succeeding());
    client.introduce("d2", 2);
    let seen = with_timeout(until_done(&mut events)).await;

    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(progress_targets(&seen), vec!["a"]);
    assert_eq!(broken.run_count(), 1, "a closed connection gets no more jobs");
    assert_eq!(healthy.run_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_progress_event_arrives_before_the_terminal_event() {
    init_tracing();
    const JOBS: usize = 16;
    const CONNECTIONS: usize = 4;

    for _ in 0..20 {
        let jobs: Vec<Job> = (0..JOBS).map(|i| Job::source(format!("job_{i}"))).collect();
        let factory = FakeConnectionFactory::new();
        for _ in 0..CONNECTIONS {
            factory.push(ScriptedConnection::succeeding());
        }

        let (client, mut events) = Client::new(factory, HeapJobOrderer::new(&jobs));
        for i in 0..CONNECTIONS {
            client.introduce("localhost", 7000 + i as u16);
        }

        let seen = with_timeout(until_done(&mut events)).await;
        assert_eq!(terminal(&seen), Some(true));
        assert_eq!(progress_targets(&seen).len(), JOBS);
    }
}

#[tokio::test]
async fn failed_connect_is_reported_without_ending_the_run() {
    init_tracing();
    let job = Job::source("a");
    let factory = FakeConnectionFactory::new();

    let (client, mut events) = Client::new(factory.clone(), HeapJobOrderer::new([&job]));
    with_timeout(client.introduce("::1", 9)).await.unwrap();

    match with_timeout(events.recv()).await {
        Some(ClientEvent::ConnectFailed { address, error }) => {
            assert_eq!(address, "[::1]:9");
            assert!(matches!(error, JunknetError::Transport(_)));
        }
        other => panic!("expected connect failure, got {other:?}"),
    }
    assert!(!client.is_finished());

    // A daemon that shows up later still gets the work.
    let log = factory.push(ScriptedConnection::succeeding());
    client.introduce("localhost", 7777);
    let seen = with_timeout(until_done(&mut events)).await;
    assert_eq!(terminal(&seen), Some(true));
    assert_eq!(log.run_count(), 1);
}

#[tokio::test]
async fn quit_reports_failure_exactly_once() {
    init_tracing();
    let jobs = independent(&["a", "b", "c"]);
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::succeeding().delay(Duration::from_millis(100)));

    let (client, mut events) = Client::new(factory, HeapJobOrderer::new(&jobs));
    let worker = client.introduce("localhost", 7777);

    // Let the worker pick up its first job, then stop everything.
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.quit();
    client.quit();

    with_timeout(worker).await.unwrap();
    drop(client);

    let mut seen = Vec::new();
    while let Some(event) = with_timeout(events.recv()).await {
        seen.push(event);
    }

    let terminals: Vec<bool> = seen
        .iter()
        .filter_map(|e| match e {
            ClientEvent::Done { success } => Some(*success),
            _ => None,
        })
        .collect();
    assert_eq!(terminals, vec![false]);

    // The job already running was allowed to finish; nothing else started.
    assert_eq!(log.run_count(), 1);
    assert_eq!(progress_targets(&seen).len(), 1);
    assert_eq!(log.end_count(), 1);
}

/// Orderer that hands out one job and then rejects its completion.
struct RejectingOrderer {
    job: Option<Job>,
}

impl JobOrderer for RejectingOrderer {
    fn pop_next_job(&mut self) -> Option<Job> {
        self.job.take()
    }

    fn report_completed_job(&mut self, job: &Job) -> Result<()> {
        Err(JunknetError::UnknownJob(job.target().to_string()))
    }

    fn report_failed_job(&mut self, job: &Job) -> Result<()> {
        Err(JunknetError::UnknownJob(job.target().to_string()))
    }

    fn is_done(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn orderer_invariant_violation_fails_the_worker_and_the_run() {
    init_tracing();
    let factory = FakeConnectionFactory::new();
    let log = factory.push(ScriptedConnection::succeeding());

    let (client, mut events) = Client::new(
        factory,
        RejectingOrderer {
            job: Some(Job::source("ghost")),
        },
    );
    let worker = client.introduce("localhost", 7777);

    let seen = with_timeout(until_done(&mut events)).await;
    with_timeout(worker).await.unwrap();

    assert!(seen.iter().any(|e| matches!(
        e,
        ClientEvent::WorkerFailed { error, .. } if error.is_unknown_job()
    )));
    assert_eq!(terminal(&seen), Some(false));
    assert_eq!(log.end_count(), 1);
}
