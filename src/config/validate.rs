// src/config/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{BuildFile, JobConfig, RawBuildFile};
use crate::errors::{JunknetError, Result};
use crate::net::parse_address;

impl TryFrom<RawBuildFile> for BuildFile {
    type Error = JunknetError;

    fn try_from(raw: RawBuildFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_build_file(&raw)?;
        Ok(BuildFile::new_unchecked(raw.client, raw.default, raw.job))
    }
}

fn validate_raw_build_file(cfg: &RawBuildFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_daemons(cfg)?;
    validate_job_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawBuildFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(JunknetError::ConfigError(
            "build file must contain at least one [job.<target>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_daemons(cfg: &RawBuildFile) -> Result<()> {
    for address in cfg.client.daemons.iter() {
        parse_address(address)?;
    }
    Ok(())
}

fn validate_job_dependencies(cfg: &RawBuildFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            if dep == name {
                return Err(JunknetError::ConfigError(format!(
                    "job '{}' cannot depend on itself in `after`",
                    name
                )));
            }
            if !cfg.job.contains_key(dep) {
                return Err(JunknetError::ConfigError(format!(
                    "job '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}

/// Edge direction: prerequisite -> dependent.
pub(crate) fn dependency_graph(jobs: &BTreeMap<String, JobConfig>) -> DiGraphMap<&str, ()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in jobs.keys() {
        graph.add_node(name.as_str());
    }

    for (name, job) in jobs.iter() {
        for dep in job.after.iter() {
            graph.add_edge(dep.as_str(), name.as_str(), ());
        }
    }

    graph
}

fn validate_dag(cfg: &RawBuildFile) -> Result<()> {
    let graph = dependency_graph(&cfg.job);

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(JunknetError::DagCycle(format!(
            "cycle detected in job graph involving job '{}'",
            cycle.node_id()
        ))),
    }
}
