// src/dag/graph.rs

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::job::Job;

/// Internal node structure: stores immediate dependents.
///
/// Prerequisites are already held by the [`Job`] itself.
#[derive(Debug, Clone, Default)]
struct DagNode {
    dependents: Vec<Job>,
}

/// Reverse-edge index over every job reachable from a set of roots.
///
/// Job B is a dependent of job A iff A is one of B's prerequisites. The index
/// is built by a single traversal and never changes afterwards, so the number
/// of dependents of a job is final as soon as construction returns.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: HashMap<Job, DagNode>,
}

impl DependencyGraph {
    /// Walk the prerequisite graph from `roots`, visiting each job once.
    pub fn discover<'a, I>(roots: I) -> Self
    where
        I: IntoIterator<Item = &'a Job>,
    {
        let mut nodes: HashMap<Job, DagNode> = HashMap::new();
        let mut visited: HashSet<Job> = HashSet::new();
        let mut stack: Vec<Job> = roots.into_iter().cloned().collect();

        while let Some(job) = stack.pop() {
            if !visited.insert(job.clone()) {
                continue;
            }

            nodes.entry(job.clone()).or_default();

            for prerequisite in job.prerequisite_jobs() {
                nodes
                    .entry(prerequisite.clone())
                    .or_default()
                    .dependents
                    .push(job.clone());
                stack.push(prerequisite.clone());
            }

            trace!(job = %job.target(), "discovered job");
        }

        Self { nodes }
    }

    /// All discovered jobs, in no particular order.
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.nodes.keys()
    }

    pub fn contains(&self, job: &Job) -> bool {
        self.nodes.contains_key(job)
    }

    /// Immediate dependents of a job (jobs that list it as a prerequisite).
    pub fn dependents_of(&self, job: &Job) -> &[Job] {
        self.nodes
            .get(job)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_dependents(&self, job: &Job) -> usize {
        self.dependents_of(job).len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
