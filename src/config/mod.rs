// src/config/mod.rs

//! Build description loading and validation for junknet.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a build description from disk (`loader.rs`).
//! - Validate basic invariants like graph correctness (`validate.rs`).
//! - Turn a validated description into immutable jobs (`builder.rs`).

pub mod builder;
pub mod loader;
pub mod model;
pub mod validate;

pub use builder::{JobSet, build_jobs};
pub use loader::{load_and_validate, load_from_path};
pub use model::{BuildFile, ClientSection, DefaultSection, JobConfig, RawBuildFile};
