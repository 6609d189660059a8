#![allow(dead_code, unused_imports)]

pub use junknet_test_utils::builders;
pub use junknet_test_utils::fake_connection;
pub use junknet_test_utils::{init_tracing, with_timeout};

use junknet::job::{Job, JobBuilder};

/// A job with no commands that runs after `prerequisites`.
pub fn job_after(target: &str, prerequisites: &[&Job]) -> Job {
    prerequisites
        .iter()
        .fold(JobBuilder::new(target), |b, p| b.after(p))
        .build()
}

/// The five-job graph used across scenarios:
///
/// ```text
/// A <- B
/// A <- C
/// A, B <- D
/// D <- E
/// ```
///
/// Returned as `[a, b, c, d, e]`.
pub fn diamond() -> [Job; 5] {
    let a = Job::source("A");
    let b = job_after("B", &[&a]);
    let c = job_after("C", &[&a]);
    let d = job_after("D", &[&a, &b]);
    let e = job_after("E", &[&d]);
    [a, b, c, d, e]
}
