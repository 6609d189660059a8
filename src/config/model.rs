// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{DEFAULT_DOCKER_IMAGE, JobEnv};

/// Build description as read from a TOML file, before validation.
///
/// ```toml
/// [client]
/// daemons = ["127.0.0.1:7777"]
///
/// [default]
/// image = "buildpack-deps:bullseye"
///
/// [job.app]
/// commands = ["cc -o app main.o"]
/// after = ["main.o"]
///
/// [job."main.o"]
/// commands = ["cc -c main.c"]
/// inputs = ["main.c"]
/// ```
///
/// All sections are optional at parse time; validation requires at least one
/// job.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuildFile {
    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub default: DefaultSection,

    /// All jobs from `[job.<target>]`, keyed by target.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// Validated build description.
///
/// Only constructed through `TryFrom<RawBuildFile>`, so holders can rely on
/// every `after` reference resolving and the graph being acyclic.
#[derive(Debug, Clone)]
pub struct BuildFile {
    pub client: ClientSection,
    pub default: DefaultSection,
    pub job: BTreeMap<String, JobConfig>,
}

impl BuildFile {
    pub(crate) fn new_unchecked(
        client: ClientSection,
        default: DefaultSection,
        job: BTreeMap<String, JobConfig>,
    ) -> Self {
        Self {
            client,
            default,
            job,
        }
    }
}

/// `[client]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientSection {
    /// Daemons to distribute jobs to, as `host:port`.
    #[serde(default)]
    pub daemons: Vec<String>,
}

/// `[default]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultSection {
    /// Docker image for jobs that don't set their own.
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_image() -> String {
    DEFAULT_DOCKER_IMAGE.to_string()
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            image: default_image(),
        }
    }
}

/// `[job.<target>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    /// Build steps, run in order.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Targets of prerequisite jobs.
    #[serde(default)]
    pub after: Vec<String>,

    /// Prerequisite input files.
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Per-job image; falls back to `[default].image`.
    #[serde(default)]
    pub image: Option<String>,
}

impl JobConfig {
    /// Effective runtime environment given the `[default]` section.
    pub fn effective_env(&self, default: &DefaultSection) -> JobEnv {
        JobEnv::new(self.image.as_deref().unwrap_or(&default.image))
    }
}
