use super::{conjunction, exactly_one, exclude, Graph, Reduction};
use crate::{Formula, Model};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

    fn letter(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Color the nodes of a graph with four colors so that adjacent nodes differ.
///
/// Variable `N{i}-{C}` means node `i` has color `C`.
pub struct FourColoring<T> {
    pub graph: Graph<T>,
}

impl<T> FourColoring<T> {
    pub fn new(graph: Graph<T>) -> Self {
        Self { graph }
    }
}

fn colored(node: usize, color: Color) -> String {
    format!("N{}-{}", node, color)
}

impl<T: Clone + Eq + Hash> Reduction for FourColoring<T> {
    type Solution = HashMap<T, Color>;

    fn reduce(&self) -> Formula {
        let mut clauses = vec![];

        for i in 0..self.graph.nodes().len() {
            let choices: Vec<String> = Color::ALL.iter().map(|&c| colored(i, c)).collect();
            exactly_one(&choices, &mut clauses);
        }

        for (i, j) in self.graph.edges() {
            for &c in &Color::ALL {
                clauses.push(exclude(&colored(i, c), &colored(j, c)));
            }
        }

        conjunction(clauses)
    }

    fn decode(&self, model: &Model) -> HashMap<T, Color> {
        let mut coloring = HashMap::new();
        for (i, node) in self.graph.nodes().iter().enumerate() {
            let color = Color::ALL
                .iter()
                .copied()
                .find(|&c| model.get(&colored(i, c)) == Some(&true));
            if let Some(color) = color {
                coloring.insert(node.clone(), color);
            }
        }
        coloring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_env_log::test;

    fn complete_graph(n: usize) -> Graph<usize> {
        let mut graph = Graph::new();
        for i in 0..n {
            for j in i + 1..n {
                graph.add_edge(i, j);
            }
        }
        graph
    }

    fn assert_proper(coloring: &HashMap<&'static str, Color>, graph: &Graph<&'static str>) {
        assert_eq!(coloring.len(), graph.nodes().len());
        for (i, j) in graph.edges() {
            let (u, v) = (graph.nodes()[i], graph.nodes()[j]);
            assert_ne!(coloring[u], coloring[v], "{} and {} share a color", u, v);
        }
    }

    fn australia() -> Graph<&'static str> {
        Graph::from_edges(vec![
            ("WA", "NT"),
            ("WA", "SA"),
            ("NT", "SA"),
            ("NT", "QLD"),
            ("SA", "QLD"),
            ("SA", "NSW"),
            ("SA", "VIC"),
            ("QLD", "NSW"),
            ("NSW", "VIC"),
            ("NSW", "ACT"),
            ("TAS", "VIC"),
        ])
    }

    #[test]
    fn solve_complete_3_node_graph() {
        let solutions = FourColoring::new(complete_graph(3)).solve_all().unwrap().unwrap();
        assert_eq!(solutions.len(), 24);

        let distinct: HashSet<Vec<Color>> = solutions
            .iter()
            .map(|coloring| (0..3).map(|i| coloring[&i]).collect())
            .collect();
        assert_eq!(distinct.len(), 24);
    }

    #[test]
    fn solve_complete_4_node_graph() {
        let solutions = FourColoring::new(complete_graph(4)).solve_all().unwrap().unwrap();
        assert_eq!(solutions.len(), 24);
    }

    #[test]
    fn complete_5_node_graph_has_no_coloring() {
        assert_eq!(FourColoring::new(complete_graph(5)).solve().unwrap(), None);
    }

    #[test]
    fn solve_map_of_australia() {
        let problem = FourColoring::new(australia());
        let coloring = problem.solve().unwrap().expect("planar maps are 4-colorable");
        assert_proper(&coloring, &problem.graph);
    }

    #[test]
    fn formula_shape() {
        let f = FourColoring::new(Graph::from_edges(vec![("a", "b")])).reduce();
        assert!(f.is_cnf());
        assert!(f.to_string().contains("(or (not N0-R) (not N1-R))"));
    }
}
