use super::{conjunction, exactly_one, exclude, Graph, Reduction};
use crate::{Formula, Model};
use std::hash::Hash;

/// Find `size` pairwise adjacent nodes of `graph`.
///
/// Variable `V{i},{r}` means node `i` is the `r`th member of the clique. Every position holds
/// exactly one node, no node holds two positions, and nodes in different positions must be
/// adjacent.
pub struct Clique<T> {
    pub size: usize,
    pub graph: Graph<T>,
}

impl<T> Clique<T> {
    pub fn new(size: usize, graph: Graph<T>) -> Self {
        Self { size, graph }
    }
}

fn member(node: usize, position: usize) -> String {
    format!("V{},{}", node, position)
}

impl<T: Clone + Eq + Hash> Reduction for Clique<T> {
    /// The clique's members, in node order.
    type Solution = Vec<T>;

    fn reduce(&self) -> Formula {
        let nodes = self.graph.nodes().len();
        let mut clauses = vec![];

        for r in 0..self.size {
            let candidates: Vec<String> = (0..nodes).map(|i| member(i, r)).collect();
            exactly_one(&candidates, &mut clauses);
        }

        for i in 0..nodes {
            for s in 0..self.size {
                for r in 0..s {
                    clauses.push(exclude(&member(i, r), &member(i, s)));
                }
            }
        }

        for r in 0..self.size {
            for s in 0..self.size {
                if r == s {
                    continue;
                }
                for i in 0..nodes {
                    for j in 0..nodes {
                        if i != j && !self.graph.are_adjacent(i, j) {
                            clauses.push(exclude(&member(i, r), &member(j, s)));
                        }
                    }
                }
            }
        }

        conjunction(clauses)
    }

    fn decode(&self, model: &Model) -> Vec<T> {
        self.graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(i, _)| (0..self.size).any(|r| model.get(&member(*i, r)) == Some(&true)))
            .map(|(_, node)| node.clone())
            .collect()
    }
}
