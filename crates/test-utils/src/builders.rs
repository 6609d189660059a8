#![allow(dead_code)]

use std::collections::BTreeMap;
use junknet::config::{BuildFile, ClientSection, DefaultSection, JobConfig, RawBuildFile};

/// Builder for `BuildFile` to simplify test setup.
pub struct BuildFileBuilder {
    raw: RawBuildFile,
}

impl BuildFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawBuildFile {
                client: ClientSection::default(),
                default: DefaultSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, target: &str, job: JobConfig) -> Self {
        self.raw.job.insert(target.to_string(), job);
        self
    }

    pub fn with_daemon(mut self, address: &str) -> Self {
        self.raw.client.daemons.push(address.to_string());
        self
    }

    pub fn with_default_image(mut self, image: &str) -> Self {
        self.raw.default.image = image.to_string();
        self
    }

    /// The unvalidated description, for exercising validation errors.
    pub fn build_raw(self) -> RawBuildFile {
        self.raw
    }

    pub fn build(self) -> BuildFile {
        BuildFile::try_from(self.raw).expect("Failed to build valid build file from builder")
    }
}

impl Default for BuildFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(cmd: &str) -> Self {
        Self {
            job: JobConfig {
                commands: vec![cmd.to_string()],
                after: vec![],
                inputs: vec![],
                image: None,
            },
        }
    }

    pub fn command(mut self, cmd: &str) -> Self {
        self.job.commands.push(cmd.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn input(mut self, file: &str) -> Self {
        self.job.inputs.push(file.to_string());
        self
    }

    pub fn image(mut self, image: &str) -> Self {
        self.job.image = Some(image.to_string());
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
