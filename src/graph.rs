//! Read-only graph view consumed by the detection engine.
//!
//! Nodes are identified by their index in `0..node_count()`. The index doubles
//! as the node's initial label, so adapters must keep it stable for the whole run.

use crate::error::{Error, Result};
use std::collections::BTreeSet;

/// Capability flags a graph may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphType {
    /// Edges carry weights.
    Weighted,
    /// Edges have a direction.
    Directed,
}

/// Read-only view of a graph with stable `0..n` node indices.
pub trait GraphModel {
    /// Number of nodes.
    fn node_count(&self) -> usize;

    /// Outgoing-edge targets of `node`.
    ///
    /// For undirected graphs every neighbor is a successor.
    fn successors(&self, node: usize) -> Vec<usize>;

    /// Whether edges have a direction.
    fn is_directed(&self) -> bool;

    /// Whether edges carry weights.
    fn is_weighted(&self) -> bool;

    /// Node indices in index order.
    fn nodes(&self) -> std::ops::Range<usize> {
        0..self.node_count()
    }

    /// The capability flags this graph carries.
    fn graph_types(&self) -> BTreeSet<GraphType> {
        let mut types = BTreeSet::new();
        if self.is_directed() {
            types.insert(GraphType::Directed);
        }
        if self.is_weighted() {
            types.insert(GraphType::Weighted);
        }
        types
    }
}

impl<G: GraphModel + ?Sized> GraphModel for &G {
    fn node_count(&self) -> usize {
        (**self).node_count()
    }

    fn successors(&self, node: usize) -> Vec<usize> {
        (**self).successors(node)
    }

    fn is_directed(&self) -> bool {
        (**self).is_directed()
    }

    fn is_weighted(&self) -> bool {
        (**self).is_weighted()
    }
}

/// Directed graph stored as plain out-adjacency lists.
///
/// `AdjacencyList::new(vec![vec![1], vec![2], vec![0]])?` is the ring 0→1→2→0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyList {
    out: Vec<Vec<usize>>,
    weighted: bool,
}

impl AdjacencyList {
    /// Build from out-lists; `out[i]` holds the successors of node `i`.
    ///
    /// Fails if a successor index is not a node of the graph.
    pub fn new(out: Vec<Vec<usize>>) -> Result<Self> {
        let n = out.len();
        if let Some((node, &target)) = out
            .iter()
            .enumerate()
            .find_map(|(node, targets)| targets.iter().find(|&&t| t >= n).map(|t| (node, t)))
        {
            return Err(Error::invalid(
                "successors",
                format!("node {node} points at {target}, graph has {n} nodes"),
            ));
        }
        Ok(Self {
            out,
            weighted: false,
        })
    }

    /// Build from a directed edge list over `n` nodes.
    ///
    /// Fails if an edge endpoint is `>= n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut out = vec![Vec::new(); n];
        for &(source, target) in edges {
            if source >= n || target >= n {
                return Err(Error::invalid(
                    "edges",
                    format!("edge ({source}, {target}) out of range for {n} nodes"),
                ));
            }
            out[source].push(target);
        }
        Self::new(out)
    }

    /// Flag the graph as weighted.
    pub fn with_weighted(mut self, weighted: bool) -> Self {
        self.weighted = weighted;
        self
    }
}

impl GraphModel for AdjacencyList {
    fn node_count(&self) -> usize {
        self.out.len()
    }

    fn successors(&self, node: usize) -> Vec<usize> {
        self.out[node].clone()
    }

    fn is_directed(&self) -> bool {
        true
    }

    fn is_weighted(&self) -> bool {
        self.weighted
    }
}

#[cfg(feature = "petgraph")]
impl<N, E, Ty, Ix> GraphModel for petgraph::graph::Graph<N, E, Ty, Ix>
where
    Ty: petgraph::EdgeType,
    Ix: petgraph::graph::IndexType,
{
    fn node_count(&self) -> usize {
        petgraph::graph::Graph::node_count(self)
    }

    fn successors(&self, node: usize) -> Vec<usize> {
        // `neighbors` yields out-neighbors for directed graphs, all neighbors otherwise.
        self.neighbors(petgraph::graph::NodeIndex::new(node))
            .map(|n| n.index())
            .collect()
    }

    fn is_directed(&self) -> bool {
        Ty::is_directed()
    }

    // Zero-sized edge payloads (`()`) carry no weight.
    fn is_weighted(&self) -> bool {
        std::mem::size_of::<E>() != 0
    }
}
