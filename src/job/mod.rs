// src/job/mod.rs

//! Immutable build jobs.
//!
//! - [`model`] holds the [`Job`] handle itself: a node in the job DAG with its
//!   prerequisite jobs, prerequisite files, commands and runtime environment.
//! - [`builder`] is a fluent constructor used by the build-file loader and by
//!   tests.

pub mod builder;
pub mod model;

pub use builder::JobBuilder;
pub use model::{Job, JobOptions};
pub use crate::types::JobEnv;
