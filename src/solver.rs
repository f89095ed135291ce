use crate::clauses::{clausify, EncodingError, VariableTable};
use crate::formula::Formula;
use crate::search::Assignments;
use crate::Model;
use log::debug;

/// Finds the models of a CNF formula, keyed by variable name.
///
/// Models are enumerated lazily in a fixed order and kept once found, so `solve` always
/// answers with the first model and `solve_all` with every model, however the two are
/// interleaved.
pub struct Solver {
    variables: VariableTable,
    assignments: Assignments,
    models: Vec<Model>,
}

impl Solver {
    /// Builds a solver for a formula that is already in CNF.
    pub fn new(formula: &Formula) -> Result<Self, EncodingError> {
        let (variables, clauses) = clausify(formula)?;
        let assignments = Assignments::new(variables.len(), clauses);
        Ok(Self {
            variables,
            assignments,
            models: vec![],
        })
    }

    /// Converts `formula` to CNF first, so any formula is accepted.
    pub fn from_formula(formula: &Formula) -> Result<Self, EncodingError> {
        Self::new(&formula.to_cnf())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.assignments.num_clauses()
    }

    /// The first satisfying assignment, or `None` if the formula is unsatisfiable.
    pub fn solve(&mut self) -> Option<Model> {
        if self.models.is_empty() {
            let assignment = self.assignments.next()?;
            self.models.push(decode(&self.variables, &assignment));
        }
        self.models.first().cloned()
    }

    /// Every satisfying assignment, or `None` if the formula is unsatisfiable.
    pub fn solve_all(&mut self) -> Option<Vec<Model>> {
        let variables = &self.variables;
        self.models.extend(
            self.assignments
                .by_ref()
                .map(|assignment| decode(variables, &assignment)),
        );
        debug!("found {} models", self.models.len());

        if self.models.is_empty() {
            None
        } else {
            Some(self.models.clone())
        }
    }
}

fn decode(variables: &VariableTable, assignment: &[bool]) -> Model {
    variables
        .names()
        .zip(assignment)
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}
