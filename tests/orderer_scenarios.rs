mod common;
use crate::common::{diamond, init_tracing, job_after};

use std::collections::HashSet;

use junknet::dag::{HeapJobOrderer, JobOrderer, JobState, OrdererCounts};
use junknet::errors::JunknetError;
use junknet::job::Job;

fn pop_target(orderer: &mut HeapJobOrderer) -> Option<String> {
    orderer.pop_next_job().map(|j| j.target().to_string())
}

#[test]
fn diamond_graph_releases_jobs_in_dependency_order() {
    init_tracing();
    let [a, b, c, d, e] = diamond();
    let mut orderer = HeapJobOrderer::new([&c, &e]);

    assert_eq!(pop_target(&mut orderer).as_deref(), Some("A"));
    assert_eq!(pop_target(&mut orderer), None, "nothing else is ready yet");
    assert!(!orderer.is_done());

    orderer.report_completed_job(&a).unwrap();
    let next_two: HashSet<String> = [
        pop_target(&mut orderer).unwrap(),
        pop_target(&mut orderer).unwrap(),
    ]
    .into_iter()
    .collect();
    assert_eq!(
        next_two,
        ["B".to_string(), "C".to_string()].into_iter().collect()
    );

    orderer.report_completed_job(&b).unwrap();
    assert_eq!(pop_target(&mut orderer).as_deref(), Some("D"));

    orderer.report_completed_job(&c).unwrap();
    assert_eq!(pop_target(&mut orderer), None, "E still waits on D");

    orderer.report_completed_job(&d).unwrap();
    assert_eq!(pop_target(&mut orderer).as_deref(), Some("E"));
    assert!(!orderer.is_done());

    orderer.report_completed_job(&e).unwrap();
    assert!(orderer.is_done());
    assert_eq!(pop_target(&mut orderer), None);
}

#[test]
fn discovery_reaches_jobs_that_are_not_roots() {
    let [a, b, c, d, e] = diamond();
    let orderer = HeapJobOrderer::new([&c, &e]);

    assert_eq!(orderer.graph().len(), 5);
    assert_eq!(orderer.num_dependents(&a), 3);
    assert_eq!(orderer.num_dependents(&b), 1);
    assert_eq!(orderer.num_dependents(&c), 0);
    assert_eq!(orderer.num_dependents(&d), 1);
    assert_eq!(orderer.num_dependents(&e), 0);
    assert_eq!(
        orderer.counts(),
        OrdererCounts {
            ready: 1,
            blocked: 4,
            in_flight: 0
        }
    );
}

#[test]
fn ready_jobs_with_more_dependents_go_first() {
    let busy = Job::source("busy");
    let idle = Job::source("idle");
    let middling = Job::source("middling");
    let x = job_after("x", &[&busy]);
    let y = job_after("y", &[&busy, &middling]);
    let z = job_after("z", &[&busy]);

    let mut orderer = HeapJobOrderer::new([&idle, &x, &y, &z]);

    assert_eq!(pop_target(&mut orderer).as_deref(), Some("busy"));
    assert_eq!(pop_target(&mut orderer).as_deref(), Some("middling"));
    assert_eq!(pop_target(&mut orderer).as_deref(), Some("idle"));
    assert_eq!(pop_target(&mut orderer), None);
}

#[test]
fn failed_job_is_offered_again() {
    let a = Job::source("a");
    let mut orderer = HeapJobOrderer::new([&a]);

    let popped = orderer.pop_next_job().unwrap();
    orderer.report_failed_job(&popped).unwrap();
    assert_eq!(orderer.state_of(&a), JobState::Ready);

    let again = orderer.pop_next_job().unwrap();
    assert!(again.same_job(&a));
    orderer.report_completed_job(&again).unwrap();
    assert!(orderer.is_done());
}

#[test]
fn untracked_job_is_rejected_on_both_report_paths() {
    let a = Job::source("a");
    let stranger = Job::source("a");
    let mut orderer = HeapJobOrderer::new([&a]);
    orderer.pop_next_job().unwrap();

    let completed = orderer.report_completed_job(&stranger).unwrap_err();
    assert!(matches!(completed, JunknetError::UnknownJob(_)));
    assert!(completed.to_string().contains("not part of this job graph"));

    let failed = orderer.report_failed_job(&stranger).unwrap_err();
    assert!(failed.is_unknown_job());

    // The real job is unaffected.
    assert_eq!(orderer.state_of(&a), JobState::InFlight);
}

#[test]
fn failing_a_job_that_is_not_in_flight_is_rejected() {
    let a = Job::source("a");
    let b = job_after("b", &[&a]);
    let mut orderer = HeapJobOrderer::new([&b]);

    let ready_not_popped = orderer.report_failed_job(&a).unwrap_err();
    assert!(ready_not_popped.is_unknown_job());
    assert!(ready_not_popped.to_string().contains("not in flight"));

    let blocked = orderer.report_failed_job(&b).unwrap_err();
    assert!(blocked.is_unknown_job());
    assert_eq!(orderer.state_of(&b), JobState::Blocked);
}

#[test]
fn completing_a_job_twice_is_rejected() {
    let a = Job::source("a");
    let b = job_after("b", &[&a]);
    let mut orderer = HeapJobOrderer::new([&b]);

    let popped = orderer.pop_next_job().unwrap();
    orderer.report_completed_job(&popped).unwrap();

    let err = orderer.report_completed_job(&popped).unwrap_err();
    assert!(err.is_unknown_job());

    // The second report must not count towards b twice.
    assert_eq!(orderer.counts().ready, 1);
    assert_eq!(orderer.state_of(&a), JobState::Untracked);
}

#[test]
fn every_tracked_job_is_in_exactly_one_state() {
    let [a, b, c, d, e] = diamond();
    let all = [&a, &b, &c, &d, &e];
    let mut orderer = HeapJobOrderer::new([&c, &e]);

    let check = |orderer: &HeapJobOrderer| {
        let counts = orderer.counts();
        let tracked = all
            .iter()
            .filter(|j| orderer.state_of(j) != JobState::Untracked)
            .count();
        assert_eq!(counts.remaining(), tracked);
    };

    check(&orderer);
    while !orderer.is_done() {
        let job = orderer.pop_next_job().unwrap();
        assert_eq!(orderer.state_of(&job), JobState::InFlight);
        check(&orderer);
        orderer.report_completed_job(&job).unwrap();
        check(&orderer);
    }
    assert_eq!(orderer.counts().remaining(), 0);
}

#[test]
fn empty_root_set_is_immediately_done() {
    let orderer = HeapJobOrderer::new(std::iter::empty::<&Job>());
    assert!(orderer.is_done());
    assert!(orderer.graph().is_empty());
}

#[test]
fn ready_queue_breaks_ties_in_push_order() {
    use junknet::dag::ReadyQueue;

    let mut queue = ReadyQueue::new();
    queue.push(Job::source("first"), 1);
    queue.push(Job::source("second"), 1);
    queue.push(Job::source("urgent"), 4);

    assert_eq!(queue.peek_priority(), Some(4));
    let order: Vec<String> = std::iter::from_fn(|| queue.pop())
        .map(|j| j.target().to_string())
        .collect();
    assert_eq!(order, vec!["urgent", "first", "second"]);
    assert!(queue.is_empty());
}
