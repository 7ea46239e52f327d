//! Panel topology: edge validation and layered scheduling
//!
//! Agents are addressed by their declaration index (arena style); keys only
//! appear at the boundary, in edges and error messages. Declaration order is
//! the universal tie-break, which keeps every derived ordering reproducible.

use thiserror::Error;

use crate::agent::entities::AgentKey;

/// A directed edge between two agents, by key
///
/// Information flows from `from` to `to`: the `to` agent sees the `from`
/// agent's output in its rendered input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: AgentKey,
    pub to: AgentKey,
}

impl Edge {
    pub fn new(from: impl Into<AgentKey>, to: impl Into<AgentKey>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl<F: Into<AgentKey>, T: Into<AgentKey>> From<(F, T)> for Edge {
    fn from((from, to): (F, T)) -> Self {
        Edge::new(from, to)
    }
}

fn cycle_path(path: &[AgentKey]) -> String {
    path.iter()
        .map(AgentKey::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors detected while validating a declared topology
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Edge ({from} -> {to}) references undeclared agent '{unknown}'")]
    UnknownAgent {
        from: AgentKey,
        to: AgentKey,
        unknown: AgentKey,
    },

    #[error("Topology contains a cycle: {}", cycle_path(.0))]
    Cycle(Vec<AgentKey>),

    #[error("Agent key '{0}' is declared more than once")]
    DuplicateAgent(AgentKey),

    #[error("A panel needs at least one agent")]
    Empty,
}

/// Validated adjacency over agent indices
///
/// A `Topology` in hand is acyclic with every edge endpoint resolved; the
/// fallible work happens once in [`Topology::build`].
#[derive(Debug, Clone)]
pub struct Topology {
    node_count: usize,
    predecessors: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
}

impl Topology {
    /// Validate `edges` against the declared `keys` and build the adjacency
    ///
    /// Fails with [`TopologyError::UnknownAgent`] when an edge endpoint is
    /// not in `keys`, and with [`TopologyError::Cycle`] when the edges do not
    /// form a DAG. Duplicate declarations of the same edge collapse to one.
    pub fn build(keys: &[AgentKey], edges: &[Edge]) -> Result<Self, TopologyError> {
        let node_count = keys.len();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];

        let index_of = |key: &AgentKey| keys.iter().position(|k| k == key);

        for edge in edges {
            let from = index_of(&edge.from).ok_or_else(|| TopologyError::UnknownAgent {
                from: edge.from.clone(),
                to: edge.to.clone(),
                unknown: edge.from.clone(),
            })?;
            let to = index_of(&edge.to).ok_or_else(|| TopologyError::UnknownAgent {
                from: edge.from.clone(),
                to: edge.to.clone(),
                unknown: edge.to.clone(),
            })?;
            if !successors[from].contains(&to) {
                successors[from].push(to);
                predecessors[to].push(from);
            }
        }

        let topology = Self {
            node_count,
            predecessors,
            successors,
        };

        if let Some(path) = topology.find_cycle() {
            let path_keys = path.into_iter().map(|i| keys[i].clone()).collect();
            return Err(TopologyError::Cycle(path_keys));
        }

        Ok(topology)
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Direct predecessors of `node`, in edge-declaration order
    pub fn predecessors(&self, node: usize) -> &[usize] {
        &self.predecessors[node]
    }

    /// Direct successors of `node`, in edge-declaration order
    pub fn successors(&self, node: usize) -> &[usize] {
        &self.successors[node]
    }

    /// Kahn-style topological layering
    ///
    /// Each layer holds mutually independent nodes whose predecessors have
    /// all appeared in earlier layers. Within a layer, nodes are ordered by
    /// declaration index.
    pub fn layers(&self) -> Vec<Vec<usize>> {
        let mut in_degree: Vec<usize> = (0..self.node_count)
            .map(|i| self.predecessors[i].len())
            .collect();

        let mut ready: Vec<usize> = (0..self.node_count)
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut layers = Vec::new();
        while !ready.is_empty() {
            let mut next = Vec::new();
            for &node in &ready {
                for &succ in &self.successors[node] {
                    in_degree[succ] -= 1;
                    if in_degree[succ] == 0 {
                        next.push(succ);
                    }
                }
            }
            next.sort_unstable();
            layers.push(ready);
            ready = next;
        }
        layers
    }

    /// Nodes with no outgoing edges, in declaration order
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.node_count)
            .filter(|&i| self.successors[i].is_empty())
            .collect()
    }

    /// Depth-first search for a back-edge; returns a closed cycle path
    fn find_cycle(&self) -> Option<Vec<usize>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unvisited,
            Visiting,
            Done,
        }

        fn visit(
            node: usize,
            successors: &[Vec<usize>],
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
        ) -> Option<Vec<usize>> {
            marks[node] = Mark::Visiting;
            stack.push(node);
            for &next in &successors[node] {
                match marks[next] {
                    Mark::Visiting => {
                        let from = stack.iter().position(|&n| n == next).unwrap_or(0);
                        let mut path = stack[from..].to_vec();
                        path.push(next);
                        return Some(path);
                    }
                    Mark::Unvisited => {
                        if let Some(path) = visit(next, successors, marks, stack) {
                            return Some(path);
                        }
                    }
                    Mark::Done => {}
                }
            }
            stack.pop();
            marks[node] = Mark::Done;
            None
        }

        let mut marks = vec![Mark::Unvisited; self.node_count];
        let mut stack = Vec::new();
        for start in 0..self.node_count {
            if marks[start] == Mark::Unvisited
                && let Some(path) = visit(start, &self.successors, &mut marks, &mut stack)
            {
                return Some(path);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<AgentKey> {
        names.iter().map(|&n| AgentKey::new(n)).collect()
    }

    #[test]
    fn test_linear_layers() {
        let topology = Topology::build(
            &keys(&["a", "b", "c"]),
            &[Edge::new("a", "b"), Edge::new("b", "c")],
        )
        .unwrap();
        assert_eq!(topology.layers(), vec![vec![0], vec![1], vec![2]]);
        assert_eq!(topology.sinks(), vec![2]);
    }

    #[test]
    fn test_diamond_layers() {
        let topology = Topology::build(
            &keys(&["src", "left", "right", "join"]),
            &[
                Edge::new("src", "left"),
                Edge::new("src", "right"),
                Edge::new("left", "join"),
                Edge::new("right", "join"),
            ],
        )
        .unwrap();
        assert_eq!(topology.layers(), vec![vec![0], vec![1, 2], vec![3]]);
        assert_eq!(topology.predecessors(3), &[1, 2]);
        assert_eq!(topology.sinks(), vec![3]);
    }

    #[test]
    fn test_no_edges_is_single_layer() {
        let topology = Topology::build(&keys(&["a", "b", "c"]), &[]).unwrap();
        assert_eq!(topology.layers(), vec![vec![0, 1, 2]]);
        assert_eq!(topology.sinks(), vec![0, 1, 2]);
    }

    #[test]
    fn test_layer_ties_broken_by_declaration_order() {
        // `late` is declared last but becomes ready in the first layer
        let topology = Topology::build(
            &keys(&["a", "b", "late"]),
            &[Edge::new("a", "b"), Edge::new("late", "b")],
        )
        .unwrap();
        assert_eq!(topology.layers(), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_cycle_detected_with_path() {
        let err = Topology::build(
            &keys(&["a", "b", "c"]),
            &[
                Edge::new("a", "b"),
                Edge::new("b", "c"),
                Edge::new("c", "b"),
            ],
        )
        .unwrap_err();
        match &err {
            TopologyError::Cycle(path) => {
                assert_eq!(path.first(), path.last());
                assert!(path.len() >= 3);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(err.to_string().contains("b -> c -> b"));
    }

    #[test]
    fn test_self_edge_is_a_cycle() {
        let err =
            Topology::build(&keys(&["a"]), &[Edge::new("a", "a")]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::Cycle(vec![AgentKey::new("a"), AgentKey::new("a")])
        );
    }

    #[test]
    fn test_unknown_agent_in_edge() {
        let err = Topology::build(&keys(&["a"]), &[Edge::new("a", "ghost")]).unwrap_err();
        assert_eq!(
            err,
            TopologyError::UnknownAgent {
                from: AgentKey::new("a"),
                to: AgentKey::new("ghost"),
                unknown: AgentKey::new("ghost"),
            }
        );
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let topology = Topology::build(
            &keys(&["a", "b"]),
            &[Edge::new("a", "b"), Edge::new("a", "b")],
        )
        .unwrap();
        assert_eq!(topology.predecessors(1), &[0]);
        assert_eq!(topology.layers(), vec![vec![0], vec![1]]);
    }

    #[test]
    fn test_edge_from_tuple() {
        let edge: Edge = ("a", "b").into();
        assert_eq!(edge, Edge::new("a", "b"));
    }
}
