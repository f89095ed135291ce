use crate::clauses::{Clause, Literal, Variable};
use log::{debug, trace};
use std::collections::VecDeque;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Assignment {
    True,
    False,
    Undecided,
}

impl From<bool> for Assignment {
    fn from(value: bool) -> Self {
        if value {
            Assignment::True
        } else {
            Assignment::False
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClauseIdx(usize);

/// Exhaustive backtracking enumeration of the total assignments that satisfy a clause set.
///
/// Variables are decided in index order, `false` before `true`. Every clause watches one of
/// its literals; the watch only moves when that literal is falsified, and the search
/// backtracks as soon as some clause has no literal left that is not false. Backtracking
/// never moves watches back: whether a literal is false is always read off the current
/// assignment.
///
/// Panics in `new` if a clause mentions a variable `>= num_variables`.
///
/// Each call to `next` resumes where the previous one stopped. Iteration ends with `None`
/// once the whole tree has been explored; a fresh session is needed to enumerate again.
pub struct Assignments {
    clauses: Vec<Clause>,
    /// Clauses watching each literal, indexed by [`Literal::idx`].
    watches: Vec<VecDeque<ClauseIdx>>,
    assignment: Vec<Assignment>,
    /// Per variable: bit 0 set once `false` was tried, bit 1 once `true` was tried.
    tried: Vec<u8>,
    current: usize,
    exhausted: bool,
}

impl Assignments {
    pub fn new(num_variables: usize, clauses: Vec<Clause>) -> Self {
        let mut watches = vec![VecDeque::new(); 2 * num_variables];
        let mut exhausted = false;
        for (idx, clause) in clauses.iter().enumerate() {
            assert!(
                clause.literals().all(|l| l.variable().0 < num_variables),
                "clause {} mentions a variable beyond {}",
                clause,
                num_variables
            );
            if clause.is_empty() {
                debug!("clause {} is empty, nothing to enumerate", idx);
                exhausted = true;
                continue;
            }
            let first = clause.literals().next().expect("clause is not empty");
            watches[first.idx()].push_back(ClauseIdx(idx));
        }

        debug!("search over {} variables, {} clauses", num_variables, clauses.len());
        Self {
            clauses,
            watches,
            assignment: vec![Assignment::Undecided; num_variables],
            tried: vec![0; num_variables],
            current: 0,
            exhausted,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.assignment.len()
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    fn is_false(&self, literal: &Literal) -> bool {
        match self.assignment[literal.variable().0] {
            Assignment::Undecided => false,
            Assignment::True => literal.is_negative(),
            Assignment::False => !literal.is_negative(),
        }
    }

    /// Moves every clause watching the just-falsified `literal` to another literal that is not
    /// false. Returns `false`, leaving the violated clause in place, if some clause has none.
    fn rebind(&mut self, literal: Literal) -> bool {
        while let Some(&idx) = self.watches[literal.idx()].front() {
            let alternative = self.clauses[idx.0].literals().find(|l| !self.is_false(l)).copied();
            match alternative {
                Some(alternative) => {
                    trace!("clause {} watches {} instead of {}", idx.0, alternative, literal);
                    self.watches[literal.idx()].pop_front();
                    self.watches[alternative.idx()].push_back(idx);
                }
                None => {
                    trace!("clause {} {} is violated", idx.0, self.clauses[idx.0]);
                    return false;
                }
            }
        }
        true
    }

    /// Assigns the first untried value to the current variable whose watches can be rebound,
    /// and moves one variable deeper. Returns `false` once both values have failed.
    fn try_extend(&mut self) -> bool {
        let v = self.current;
        for &value in &[false, true] {
            let bit = 1 << value as u8;
            if self.tried[v] & bit != 0 {
                continue;
            }
            self.tried[v] |= bit;
            self.assignment[v] = Assignment::from(value);
            trace!("try {} = {}", v, value);

            if self.rebind(Literal::falsified_by(Variable(v), value)) {
                self.current += 1;
                return true;
            }
            self.assignment[v] = Assignment::Undecided;
        }
        false
    }

    fn model(&self) -> Vec<bool> {
        self.assignment.iter().map(|a| *a == Assignment::True).collect()
    }
}

impl Iterator for Assignments {
    type Item = Vec<bool>;

    fn next(&mut self) -> Option<Vec<bool>> {
        if self.exhausted {
            return None;
        }

        loop {
            if self.current == self.num_variables() {
                let model = self.model();
                // step back so the next call tries the last variable's other value
                match self.current.checked_sub(1) {
                    Some(previous) => self.current = previous,
                    None => self.exhausted = true,
                }
                return Some(model);
            }

            if !self.try_extend() {
                if self.current == 0 {
                    debug!("search space exhausted");
                    self.exhausted = true;
                    return None;
                }
                trace!("backtrack from {}", self.current);
                self.tried[self.current] = 0;
                self.assignment[self.current] = Assignment::Undecided;
                self.current -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_env_log::test;

    fn p(x: usize) -> Literal {
        Literal::positive(Variable(x))
    }
    fn n(x: usize) -> Literal {
        Literal::negative(Variable(x))
    }

    fn all(num_variables: usize, clauses: Vec<Clause>) -> Vec<Vec<bool>> {
        Assignments::new(num_variables, clauses).collect()
    }

    #[test]
    fn enumerates_in_order() {
        // (0 | 1) has three models; false is tried before true
        let models = all(2, vec![Clause::new(vec![p(0), p(1)])]);
        assert_eq!(models, vec![vec![false, true], vec![true, false], vec![true, true]]);
    }

    #[test]
    fn unconstrained_variables() {
        let models = all(3, vec![Clause::new(vec![p(1), n(1)])]);
        assert_eq!(models.len(), 8);
        assert_eq!(models.iter().collect::<HashSet<_>>().len(), 8);
    }

    #[test]
    fn unit_clauses() {
        let models = all(3, vec![Clause::new(vec![p(0)]), Clause::new(vec![n(2)]), Clause::new(vec![p(1)])]);
        assert_eq!(models, vec![vec![true, true, false]]);
    }

    #[test]
    fn conflict_unsat() {
        let c1 = Clause::new(vec![p(0), p(1)]);
        let c2 = Clause::new(vec![n(0)]);
        let c3 = Clause::new(vec![n(1)]);
        assert!(all(2, vec![c1, c2, c3]).is_empty());
    }

    #[test]
    fn conflict_sat() {
        let c1 = Clause::new(vec![p(0), p(1), p(2)]);
        let c2 = Clause::new(vec![n(0), n(1), p(2)]);
        let c3 = Clause::new(vec![n(1), n(2)]);
        let models = all(3, vec![c1, c2, c3]);
        assert_eq!(
            models,
            vec![
                vec![false, false, true],
                vec![false, true, false],
                vec![true, false, false],
                vec![true, false, true],
            ]
        );
    }

    #[test]
    fn no_variables() {
        assert_eq!(all(0, vec![]), vec![Vec::<bool>::new()]);
    }

    #[test]
    fn empty_clause_is_unsat() {
        assert!(all(2, vec![Clause::new(vec![p(0)]), Clause::new(vec![])]).is_empty());
    }

    #[test]
    fn stays_exhausted() {
        let mut session = Assignments::new(1, vec![Clause::new(vec![p(0)])]);
        assert_eq!(session.next(), Some(vec![true]));
        assert_eq!(session.next(), None);
        assert_eq!(session.next(), None);
    }

    #[test]
    fn resumes_between_calls() {
        let clauses = vec![Clause::new(vec![n(0), n(1)]), Clause::new(vec![p(1), p(2)])];
        let mut session = Assignments::new(3, clauses.clone());
        let first = session.next().unwrap();
        let rest: Vec<_> = session.collect();

        let mut expected = all(3, clauses);
        assert_eq!(expected.remove(0), first);
        assert_eq!(rest, expected);
    }
}
