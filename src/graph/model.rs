use super::cycle;
use super::step::Step;
use crate::error::GraphError;
use ahash::{AHashMap, AHashSet};
use uuid::Uuid;

/// The in-memory pipeline graph: steps keyed by UUID, with every edge stored
/// on its target side as an incoming connection.
///
/// The graph stays acyclic after every accepted edit; candidate edges are
/// probed with [`cycle::would_create_cycle`] before they are committed, and
/// rejected edges never enter the model.
#[derive(Debug, Clone, Default)]
pub struct PipelineGraph {
    steps: AHashMap<Uuid, Step>,
}

impl PipelineGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_steps(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().map(|s| (s.uuid, s)).collect(),
        }
    }

    pub fn get(&self, uuid: Uuid) -> Option<&Step> {
        self.steps.get(&uuid)
    }

    pub fn get_mut(&mut self, uuid: Uuid) -> Option<&mut Step> {
        self.steps.get_mut(&uuid)
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.steps.contains_key(&uuid)
    }

    pub fn insert(&mut self, step: Step) {
        self.steps.insert(step.uuid, step);
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.steps.keys().copied()
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    /// Removes a step together with every edge that references it, then
    /// returns the removed step. Remaining incoming and outgoing lists are
    /// scrubbed so no dangling reference survives.
    pub fn remove_step(&mut self, uuid: Uuid) -> Option<Step> {
        let removed = self.steps.remove(&uuid)?;
        for step in self.steps.values_mut() {
            step.incoming_connections.retain(|id| *id != uuid);
            step.outgoing_connections.retain(|id| *id != uuid);
        }
        Some(removed)
    }

    /// Commits the edge `source -> target` after duplicate and acyclicity
    /// checks. A failed check leaves the graph untouched.
    pub fn connect(&mut self, source: Uuid, target: Uuid) -> Result<(), GraphError> {
        if !self.contains(source) {
            return Err(GraphError::StepNotFound(source));
        }
        if !self.contains(target) {
            return Err(GraphError::StepNotFound(target));
        }
        if self.has_edge(source, target) {
            return Err(GraphError::DuplicateEdge { source, target });
        }
        if cycle::would_create_cycle(self, source, target) {
            return Err(GraphError::CycleRejected { source, target });
        }

        self.steps
            .get_mut(&target)
            .expect("target existence checked above")
            .incoming_connections
            .push(source);
        Ok(())
    }

    /// Removes the edge `source -> target`. Returns whether an edge existed.
    pub fn disconnect(&mut self, source: Uuid, target: Uuid) -> bool {
        let Some(step) = self.steps.get_mut(&target) else {
            return false;
        };
        let before = step.incoming_connections.len();
        step.incoming_connections.retain(|id| *id != source);
        step.incoming_connections.len() != before
    }

    pub fn has_edge(&self, source: Uuid, target: Uuid) -> bool {
        self.steps
            .get(&target)
            .is_some_and(|step| step.incoming_connections.contains(&source))
    }

    pub fn edge_count(&self) -> usize {
        self.steps
            .values()
            .map(|step| step.incoming_connections.len())
            .sum()
    }

    /// All edges as `(source, target)` pairs.
    pub fn edges(&self) -> Vec<(Uuid, Uuid)> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for step in self.steps.values() {
            for &source in &step.incoming_connections {
                edges.push((source, step.uuid));
            }
        }
        edges
    }

    /// Rebuilds every step's derived outgoing list from the authoritative
    /// incoming lists. O(V+E); must run before any traversal that reads
    /// outgoing edges, since ad hoc edits do not keep them consistent.
    pub fn rebuild_outgoing(&mut self) {
        for step in self.steps.values_mut() {
            step.outgoing_connections.clear();
        }

        let edges = self.edges();
        for (source, target) in edges {
            if let Some(step) = self.steps.get_mut(&source) {
                step.outgoing_connections.push(target);
            }
        }
    }

    /// The transitive incoming closure (all ancestors) of `roots`, excluding
    /// the roots themselves.
    pub fn incoming_closure(&self, roots: &[Uuid]) -> AHashSet<Uuid> {
        let mut closure = AHashSet::new();
        let mut frontier: Vec<Uuid> = roots.to_vec();

        while let Some(uuid) = frontier.pop() {
            let Some(step) = self.steps.get(&uuid) else {
                continue;
            };
            for &parent in &step.incoming_connections {
                if closure.insert(parent) {
                    frontier.push(parent);
                }
            }
        }

        for root in roots {
            closure.remove(root);
        }
        closure
    }
}
