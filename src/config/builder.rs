// src/config/builder.rs

use std::collections::BTreeMap;

use petgraph::Direction;
use petgraph::algo::toposort;
use tracing::debug;

use crate::config::model::BuildFile;
use crate::config::validate::dependency_graph;
use crate::errors::{JunknetError, Result};
use crate::job::{Job, JobBuilder};

/// Every job of a build description, plus the roots to hand to an orderer.
#[derive(Debug, Clone)]
pub struct JobSet {
    jobs: BTreeMap<String, Job>,
    roots: Vec<Job>,
}

impl JobSet {
    pub fn get(&self, target: &str) -> Option<&Job> {
        self.jobs.get(target)
    }

    /// All jobs, ordered by target.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs that no other job depends on.
    pub fn roots(&self) -> &[Job] {
        &self.roots
    }

    /// Roots for building `target` only, or every root when `None`.
    pub fn roots_for(&self, target: Option<&str>) -> Result<Vec<Job>> {
        match target {
            None => Ok(self.roots.clone()),
            Some(name) => self
                .jobs
                .get(name)
                .map(|job| vec![job.clone()])
                .ok_or_else(|| JunknetError::JobNotFound(name.to_string())),
        }
    }
}

/// Turn a validated build description into immutable jobs.
///
/// Jobs are created in topological order so every prerequisite exists before
/// the jobs that depend on it.
pub fn build_jobs(cfg: &BuildFile) -> Result<JobSet> {
    let graph = dependency_graph(&cfg.job);
    let order = toposort(&graph, None).map_err(|cycle| {
        JunknetError::DagCycle(format!(
            "cycle detected in job graph involving job '{}'",
            cycle.node_id()
        ))
    })?;

    let mut jobs: BTreeMap<String, Job> = BTreeMap::new();
    let mut roots = Vec::new();

    for name in order {
        let job_cfg = cfg
            .job
            .get(name)
            .ok_or_else(|| JunknetError::JobNotFound(name.to_string()))?;

        let mut builder = JobBuilder::new(name)
            .commands(job_cfg.commands.iter().cloned())
            .inputs(job_cfg.inputs.iter().cloned())
            .environment(&job_cfg.effective_env(&cfg.default));

        for dep in job_cfg.after.iter() {
            let prerequisite = jobs
                .get(dep)
                .ok_or_else(|| JunknetError::JobNotFound(dep.clone()))?;
            builder = builder.after(prerequisite);
        }

        let job = builder.build();
        if graph
            .neighbors_directed(name, Direction::Outgoing)
            .next()
            .is_none()
        {
            roots.push(job.clone());
        }
        jobs.insert(name.to_string(), job);
    }

    debug!(jobs = jobs.len(), roots = roots.len(), "built job graph");
    Ok(JobSet { jobs, roots })
}
