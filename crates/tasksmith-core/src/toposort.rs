//! Generic topological sort shared by the task-level scheduler and the
//! per-task stage executor.
//!
//! Operates on a map of `from -> [to, ...]` edges. Both the task graph
//! (dependency -> dependent) and the stage graph within a workflow
//! (required-stage -> requiring-stage) are instances of this same shape, so
//! one implementation serves both.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::Error;

/// Linearize `graph` such that for every edge `u -> v`, `u` appears before
/// `v` in the result. Every key of `graph` appears exactly once in the
/// output, regardless of whether it has any outgoing edges.
///
/// Tie-breaking among simultaneously-ready nodes is unspecified; callers
/// must not depend on any particular ordering beyond the dependency
/// constraint itself.
pub fn topological_sort<K>(graph: &HashMap<K, Vec<K>>) -> Result<Vec<K>, Error>
where
    K: Eq + Hash + Clone,
{
    let mut in_degree: HashMap<K, usize> = graph.keys().cloned().map(|k| (k, 0)).collect();
    for adjacent in graph.values() {
        for v in adjacent {
            *in_degree.entry(v.clone()).or_insert(0) += 1;
        }
    }

    let mut ready: VecDeque<K> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(k, _)| k.clone())
        .collect();

    let mut result = Vec::with_capacity(graph.len());
    while let Some(u) = ready.pop_front() {
        result.push(u.clone());
        if let Some(adjacent) = graph.get(&u) {
            for v in adjacent {
                let deg = in_degree.get_mut(v).expect("successor missing from in-degree table");
                *deg -= 1;
                if *deg == 0 {
                    ready.push_back(v.clone());
                }
            }
        }
    }

    if result.len() < graph.len() {
        return Err(Error::CycleDetected);
    }

    Ok(result)
}
