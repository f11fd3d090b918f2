//! Cover extraction: from node memories to a fuzzy membership matrix.
//!
//! Each node's memory is summarized as a label histogram. Labels whose
//! relative frequency falls below the probability threshold are dropped,
//! except the node's most frequent label(s), so every node keeps at least one
//! community. The surviving counts are renormalized by the retained mass:
//!
//! ```text
//! degree(node, label) = count(label) / (memory_size - Σ removed counts)
//! ```
//!
//! Labels become matrix columns in first-seen order: nodes are scanned by
//! index and, within a node, labels in ascending order. A column index never
//! changes once assigned.

use super::slpa::{check_memory_size, check_probability_threshold, Memories};
use super::traits::AlgorithmType;
use crate::error::{Error, Result};
use crate::graph::{GraphModel, GraphType};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Label → occurrence count over one node's memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Histogram {
    counts: BTreeMap<usize, usize>,
    max_count: usize,
}

/// Build the histogram of a memory.
pub fn label_histogram(memory: &[usize]) -> Histogram {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    let mut max_count = 0;
    for &label in memory {
        let count = counts.entry(label).or_insert(0);
        *count += 1;
        max_count = max_count.max(*count);
    }
    Histogram { counts, max_count }
}

impl Histogram {
    /// Occurrences of `label` (0 if absent).
    pub fn count(&self, label: usize) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Highest count of any label.
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    /// Sum of all counts, i.e. the memory length.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Number of distinct labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the histogram is empty.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(label, count)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    /// Drop labels with `count / memory_size < threshold`, keeping every label
    /// that reaches the maximum count.
    pub fn filter(mut self, memory_size: usize, threshold: f64) -> FilteredHistogram {
        let max_count = self.max_count;
        let mut retained_mass = memory_size;
        self.counts.retain(|_, &mut count| {
            let keep = count == max_count || count as f64 / memory_size as f64 >= threshold;
            if !keep {
                retained_mass = retained_mass.saturating_sub(count);
            }
            keep
        });
        FilteredHistogram {
            entries: self.counts,
            retained_mass,
        }
    }
}

/// Histogram after threshold filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredHistogram {
    /// Retained `label → count` entries.
    pub entries: BTreeMap<usize, usize>,
    /// `memory_size` minus the counts of removed labels.
    pub retained_mass: usize,
}

impl FilteredHistogram {
    /// Membership degree of each retained label, in ascending label order.
    pub fn degrees(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        let mass = self.retained_mass as f64;
        self.entries
            .iter()
            .map(move |(&label, &count)| (label, count as f64 / mass))
    }
}

/// Ordered registry of discovered labels; a label's position is its column.
#[derive(Debug, Clone, Default)]
pub struct CommunityRegistry {
    labels: Vec<usize>,
    columns: HashMap<usize, usize>,
}

impl CommunityRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Column of `label`, assigning the next free one on first sight.
    pub fn register(&mut self, label: usize) -> usize {
        let next = self.labels.len();
        let column = *self.columns.entry(label).or_insert(next);
        if column == next {
            self.labels.push(label);
        }
        column
    }

    /// Column of `label`, if registered.
    pub fn column_of(&self, label: usize) -> Option<usize> {
        self.columns.get(&label).copied()
    }

    /// Registered labels in column order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn into_labels(self) -> Vec<usize> {
        self.labels
    }
}

/// How a cover was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverOrigin {
    /// Producing algorithm.
    pub algorithm: AlgorithmType,
    /// Parameter view of the producing configuration.
    pub parameters: BTreeMap<String, String>,
    /// Graph types the algorithm declares support for.
    pub compatible_graph_types: BTreeSet<GraphType>,
}

impl Default for CoverOrigin {
    fn default() -> Self {
        Self {
            algorithm: AlgorithmType::Undefined,
            parameters: BTreeMap::new(),
            compatible_graph_types: BTreeSet::new(),
        }
    }
}

/// Fuzzy community assignment: a `nodes × communities` matrix of membership
/// degrees in `[0, 1]`, plus the graph it describes.
///
/// Every row sums to 1.
#[derive(Debug)]
pub struct Cover<'g, G: ?Sized> {
    graph: &'g G,
    memberships: Array2<f64>,
    labels: Vec<usize>,
    origin: CoverOrigin,
}

impl<G: ?Sized> Clone for Cover<'_, G> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            memberships: self.memberships.clone(),
            labels: self.labels.clone(),
            origin: self.origin.clone(),
        }
    }
}

impl<'g, G: GraphModel + ?Sized> Cover<'g, G> {
    /// The graph this cover describes.
    pub fn graph(&self) -> &'g G {
        self.graph
    }

    /// Membership matrix; entry `[i, c]` is node `i`'s degree in community `c`.
    pub fn memberships(&self) -> &Array2<f64> {
        &self.memberships
    }

    /// Take the membership matrix.
    pub fn into_memberships(self) -> Array2<f64> {
        self.memberships
    }

    /// Number of rows.
    pub fn node_count(&self) -> usize {
        self.memberships.nrows()
    }

    /// Number of communities (columns).
    pub fn community_count(&self) -> usize {
        self.memberships.ncols()
    }

    /// Propagated label behind each column.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Propagated label behind `community`.
    pub fn label_of(&self, community: usize) -> Option<usize> {
        self.labels.get(community).copied()
    }

    /// Degree of `node` in `community` (0 when out of range).
    pub fn membership(&self, node: usize, community: usize) -> f64 {
        self.memberships
            .get((node, community))
            .copied()
            .unwrap_or(0.0)
    }

    /// Communities `node` belongs to, with degrees, in column order.
    pub fn communities_of(&self, node: usize) -> Vec<(usize, f64)> {
        if node >= self.node_count() {
            return Vec::new();
        }
        self.memberships
            .row(node)
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree > 0.0)
            .map(|(c, &degree)| (c, degree))
            .collect()
    }

    /// Nodes with a nonzero degree in `community`.
    pub fn members_of(&self, community: usize) -> Vec<usize> {
        if community >= self.community_count() {
            return Vec::new();
        }
        self.memberships
            .column(community)
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree > 0.0)
            .map(|(node, _)| node)
            .collect()
    }

    /// Sum of membership degrees in `community`.
    pub fn community_size(&self, community: usize) -> f64 {
        if community >= self.community_count() {
            return 0.0;
        }
        self.memberships.column(community).sum()
    }

    /// Hard assignment: each node's highest-degree community (lowest column on ties).
    pub fn dominant_communities(&self) -> Vec<usize> {
        self.memberships
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (c, &degree) in row.iter().enumerate() {
                    if degree > row[best] {
                        best = c;
                    }
                }
                best
            })
            .collect()
    }

    /// How this cover was produced.
    pub fn origin(&self) -> &CoverOrigin {
        &self.origin
    }

    pub(crate) fn with_origin(mut self, origin: CoverOrigin) -> Self {
        self.origin = origin;
        self
    }
}

/// Turn final node memories into a cover.
///
/// Requires one memory per graph node, each holding exactly `memory_size >= 1`
/// labels, and a threshold in `[0, 1]`.
pub fn extract_cover<'g, G: GraphModel + ?Sized>(
    graph: &'g G,
    memories: Memories,
    memory_size: usize,
    probability_threshold: f64,
) -> Result<Cover<'g, G>> {
    check_memory_size(memory_size)?;
    check_probability_threshold(probability_threshold)?;

    let n = memories.len();
    if n != graph.node_count() {
        return Err(Error::invalid(
            "memories",
            format!("{n} memories for {} nodes", graph.node_count()),
        ));
    }
    if let Some((node, memory)) = memories
        .iter()
        .enumerate()
        .find(|(_, memory)| memory.len() != memory_size)
    {
        return Err(Error::invalid(
            "memories",
            format!(
                "memory of node {node} holds {} labels, expected {memory_size}",
                memory.len()
            ),
        ));
    }
    let mut registry = CommunityRegistry::new();
    let mut rows: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);

    for memory in memories.iter() {
        let filtered = label_histogram(memory).filter(memory_size, probability_threshold);
        let row = filtered
            .degrees()
            .map(|(label, degree)| (registry.register(label), degree))
            .collect();
        rows.push(row);
    }

    // Column count is only known once every node has been scanned.
    let mut memberships = Array2::<f64>::zeros((n, registry.len()));
    for (node, row) in rows.into_iter().enumerate() {
        for (column, degree) in row {
            memberships[(node, column)] = degree;
        }
    }

    Ok(Cover {
        graph,
        memberships,
        labels: registry.into_labels(),
        origin: CoverOrigin::default(),
    })
}
