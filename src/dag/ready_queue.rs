// src/dag/ready_queue.rs

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::job::Job;

/// Heap entry wrapper.
///
/// The priority is captured when the job is pushed and never re-read, so the
/// heap order cannot drift if the caller's notion of priority changes later.
#[derive(Debug, Clone)]
struct ReadyEntry {
    priority: usize,
    sequence: u64, // For FIFO order among equal priorities
    job: Job,
}

impl PartialEq for ReadyEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for ReadyEntry {}

impl PartialOrd for ReadyEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ReadyEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first, then earlier sequence
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            ordering => ordering,
        }
    }
}

/// Max-priority queue of runnable jobs.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    heap: BinaryHeap<ReadyEntry>,
    next_sequence: u64,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job, priority: usize) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(ReadyEntry {
            priority,
            sequence,
            job,
        });
    }

    /// Remove and return the job with the highest priority.
    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|entry| entry.job)
    }

    /// Priority of the job that `pop` would return next.
    pub fn peek_priority(&self) -> Option<usize> {
        self.heap.peek().map(|entry| entry.priority)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
