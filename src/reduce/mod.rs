//! Combinatorial problems encoded as satisfiability queries.
//!
//! Every reduction builds its formula directly in CNF and reads its answer back out of a
//! [`Model`] by variable name.

mod clique;
mod four_color;
mod graph;
mod sudoku;

pub use clique::Clique;
pub use four_color::{Color, FourColoring};
pub use graph::Graph;
pub use sudoku::{Sudoku, SudokuError};

use crate::{EncodingError, Formula, Model, Solver};

/// A problem that can be solved by finding models of a formula.
pub trait Reduction {
    type Solution;

    /// The problem as a CNF formula.
    fn reduce(&self) -> Formula;

    /// Reads a solution out of a model of [`Reduction::reduce`]'s formula.
    fn decode(&self, model: &Model) -> Self::Solution;

    fn solve(&self) -> Result<Option<Self::Solution>, EncodingError> {
        let mut solver = Solver::new(&self.reduce())?;
        Ok(solver.solve().map(|model| self.decode(&model)))
    }

    fn solve_all(&self) -> Result<Option<Vec<Self::Solution>>, EncodingError> {
        let mut solver = Solver::new(&self.reduce())?;
        Ok(solver
            .solve_all()
            .map(|models| models.iter().map(|model| self.decode(model)).collect()))
    }
}

/// Variable reserved for the degenerate encodings below.
const CONSTANT: &str = "$";

/// `(or a b ...)`, or a formula without models when `names` is empty.
fn at_least_one(names: &[String]) -> Formula {
    Formula::or_all(names.iter().map(Formula::var)).unwrap_or_else(|| {
        Formula::and(Formula::var(CONSTANT), Formula::not(Formula::var(CONSTANT)))
    })
}

/// Pairwise exclusion: no two of `names` are true together.
fn at_most_one(names: &[String], clauses: &mut Vec<Formula>) {
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            clauses.push(exclude(a, b));
        }
    }
}

fn exactly_one(names: &[String], clauses: &mut Vec<Formula>) {
    clauses.push(at_least_one(names));
    at_most_one(names, clauses);
}

/// `(or (not a) (not b))`
fn exclude(a: &str, b: &str) -> Formula {
    Formula::or(Formula::not(Formula::var(a)), Formula::not(Formula::var(b)))
}

/// The conjunction of `clauses`, or a tautology when there are none.
fn conjunction(clauses: Vec<Formula>) -> Formula {
    Formula::and_all(clauses).unwrap_or_else(|| {
        Formula::or(Formula::var(CONSTANT), Formula::not(Formula::var(CONSTANT)))
    })
}
