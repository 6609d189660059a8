// src/job/builder.rs

use crate::job::model::{Job, JobOptions};
use crate::types::JobEnv;

/// Fluent constructor for [`Job`].
///
/// ```
/// use junknet::job::JobBuilder;
///
/// let object = JobBuilder::new("main.o").command("cc -c main.c").input("main.c").build();
/// let app = JobBuilder::new("app").command("cc -o app main.o").after(&object).build();
/// assert_eq!(app.num_prerequisite_jobs(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JobBuilder {
    options: JobOptions,
}

impl JobBuilder {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            options: JobOptions {
                target: target.into(),
                ..JobOptions::default()
            },
        }
    }

    pub fn command(mut self, cmd: impl Into<String>) -> Self {
        self.options.commands.push(cmd.into());
        self
    }

    pub fn commands<I, S>(mut self, cmds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.commands.extend(cmds.into_iter().map(Into::into));
        self
    }

    pub fn after(mut self, prerequisite: &Job) -> Self {
        self.options.prerequisite_jobs.push(prerequisite.clone());
        self
    }

    pub fn after_all(mut self, prerequisites: &[Job]) -> Self {
        self.options
            .prerequisite_jobs
            .extend(prerequisites.iter().cloned());
        self
    }

    pub fn input(mut self, file: impl Into<String>) -> Self {
        self.options.prerequisite_files.push(file.into());
        self
    }

    pub fn inputs<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options
            .prerequisite_files
            .extend(files.into_iter().map(Into::into));
        self
    }

    pub fn environment(mut self, env: &JobEnv) -> Self {
        self.options.environment = Some(env.clone());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.options.environment = Some(JobEnv::new(image));
        self
    }

    pub fn build(self) -> Job {
        Job::new(self.options)
    }
}
