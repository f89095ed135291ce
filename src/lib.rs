pub mod clauses;
pub mod formula;
pub mod reduce;
pub mod search;
mod solver;

#[cfg(test)]
mod brute_force;

use std::collections::BTreeMap;
use std::fmt;

/// A satisfying assignment, keyed by variable name.
pub type Model = BTreeMap<String, bool>;

pub use clauses::{clausify, Clause, EncodingError, Literal, Variable, VariableTable};
pub use formula::rewrite::to_cnf;
pub use formula::sexp::{compile, parse, ParseError};
pub use formula::Formula;
pub use search::Assignments;
pub use solver::Solver;

/// Anything that keeps a formula from reaching the search.
#[derive(Debug)]
pub enum Error {
    Parse(ParseError),
    Encoding(EncodingError),
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<EncodingError> for Error {
    fn from(e: EncodingError) -> Self {
        Self::Encoding(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{}", e),
            Error::Encoding(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(e) => Some(e),
            Error::Encoding(e) => Some(e),
        }
    }
}
