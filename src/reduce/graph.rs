use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

/// A simple undirected graph. Nodes keep their insertion order and are addressed by index.
#[derive(Clone, Debug)]
pub struct Graph<T> {
    nodes: Vec<T>,
    index: HashMap<T, usize>,
    /// Each edge once, as `(smaller index, larger index)`.
    edges: BTreeSet<(usize, usize)>,
}

impl<T: Clone + Eq + Hash> Graph<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![],
            index: HashMap::new(),
            edges: BTreeSet::new(),
        }
    }

    /// Builds a graph from an edge list; nodes appear in order of first mention.
    pub fn from_edges(edges: impl IntoIterator<Item = (T, T)>) -> Self {
        let mut graph = Self::new();
        for (a, b) in edges {
            graph.add_edge(a, b);
        }
        graph
    }

    /// Returns the node's index, adding it if it is new.
    pub fn add_node(&mut self, node: T) -> usize {
        if let Some(&i) = self.index.get(&node) {
            return i;
        }
        let i = self.nodes.len();
        self.index.insert(node.clone(), i);
        self.nodes.push(node);
        i
    }

    pub fn add_edge(&mut self, a: T, b: T) {
        let i = self.add_node(a);
        let j = self.add_node(b);
        self.edges.insert((i.min(j), i.max(j)));
    }

    pub fn nodes(&self) -> &[T] {
        &self.nodes
    }

    pub fn index_of(&self, node: &T) -> Option<usize> {
        self.index.get(node).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    pub fn are_adjacent(&self, i: usize, j: usize) -> bool {
        self.edges.contains(&(i.min(j), i.max(j)))
    }
}

impl<T: Clone + Eq + Hash> Default for Graph<T> {
    fn default() -> Self {
        Self::new()
    }
}
