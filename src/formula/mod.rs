pub mod rewrite;
pub mod sexp;

use crate::Model;
use std::collections::HashSet;
use std::fmt::{self, Debug, Display, Formatter};
use std::mem;

/// A propositional formula over named variables.
///
/// Formulas are plain trees: every rewrite builds a fresh tree rather than sharing subtrees.
/// Every traversal (including `Clone`, `PartialEq` and `Drop`) runs on an explicit work stack,
/// so very deep formulas such as long left-folded conjunctions never exhaust the call stack.
pub enum Formula {
    Var(String),
    Not(Box<Formula>),
    And(Box<Formula>, Box<Formula>),
    Or(Box<Formula>, Box<Formula>),
    Implies(Box<Formula>, Box<Formula>),
    Iff(Box<Formula>, Box<Formula>),
}

/// One formula node with its operands already folded into `T`.
pub(crate) enum Node<'a, T> {
    Var(&'a str),
    Not(T),
    And(T, T),
    Or(T, T),
    Implies(T, T),
    Iff(T, T),
}

impl<'a> Node<'a, Formula> {
    /// Reassembles the node unchanged around its (already rebuilt) operands.
    pub(crate) fn rebuild(self) -> Formula {
        match self {
            Node::Var(name) => Formula::var(name),
            Node::Not(arg) => Formula::not(arg),
            Node::And(l, r) => Formula::and(l, r),
            Node::Or(l, r) => Formula::or(l, r),
            Node::Implies(l, r) => Formula::implies(l, r),
            Node::Iff(l, r) => Formula::iff(l, r),
        }
    }
}

enum Frame<'a> {
    Enter(&'a Formula),
    Exit(&'a Formula),
}

impl Formula {
    pub fn var(name: impl Into<String>) -> Self {
        Formula::Var(name.into())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(arg: Formula) -> Self {
        Formula::Not(Box::new(arg))
    }

    pub fn and(left: Formula, right: Formula) -> Self {
        Formula::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Formula, right: Formula) -> Self {
        Formula::Or(Box::new(left), Box::new(right))
    }

    pub fn implies(left: Formula, right: Formula) -> Self {
        Formula::Implies(Box::new(left), Box::new(right))
    }

    pub fn iff(left: Formula, right: Formula) -> Self {
        Formula::Iff(Box::new(left), Box::new(right))
    }

    /// Left-folds the conjuncts into nested binary `And`s: `a, b, c` becomes `(and (and a b) c)`.
    /// Returns `None` for an empty sequence.
    pub fn and_all(conjuncts: impl IntoIterator<Item = Formula>) -> Option<Self> {
        let mut conjuncts = conjuncts.into_iter();
        let first = conjuncts.next()?;
        Some(conjuncts.fold(first, Formula::and))
    }

    /// Left-folds the disjuncts into nested binary `Or`s. Returns `None` for an empty sequence.
    pub fn or_all(disjuncts: impl IntoIterator<Item = Formula>) -> Option<Self> {
        let mut disjuncts = disjuncts.into_iter();
        let first = disjuncts.next()?;
        Some(disjuncts.fold(first, Formula::or))
    }

    /// Bottom-up traversal: `combine` sees every node exactly once, after its operands,
    /// with the operands replaced by the values `combine` returned for them.
    /// Operands are visited left to right.
    pub(crate) fn fold<'a, T>(&'a self, mut combine: impl FnMut(Node<'a, T>) -> T) -> T {
        let mut work = vec![Frame::Enter(self)];
        let mut done: Vec<T> = vec![];

        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(formula) => {
                    work.push(Frame::Exit(formula));
                    match formula {
                        Formula::Var(_) => {}
                        Formula::Not(arg) => work.push(Frame::Enter(&**arg)),
                        Formula::And(l, r)
                        | Formula::Or(l, r)
                        | Formula::Implies(l, r)
                        | Formula::Iff(l, r) => {
                            work.push(Frame::Enter(&**r));
                            work.push(Frame::Enter(&**l));
                        }
                    }
                }
                Frame::Exit(formula) => {
                    let node = match formula {
                        Formula::Var(name) => Node::Var(name.as_str()),
                        Formula::Not(_) => Node::Not(pop_operand(&mut done)),
                        Formula::And(..) => {
                            let (l, r) = pop_operands(&mut done);
                            Node::And(l, r)
                        }
                        Formula::Or(..) => {
                            let (l, r) = pop_operands(&mut done);
                            Node::Or(l, r)
                        }
                        Formula::Implies(..) => {
                            let (l, r) = pop_operands(&mut done);
                            Node::Implies(l, r)
                        }
                        Formula::Iff(..) => {
                            let (l, r) = pop_operands(&mut done);
                            Node::Iff(l, r)
                        }
                    };
                    done.push(combine(node));
                }
            }
        }

        pop_operand(&mut done)
    }

    /// Evaluates the formula under `model`. Returns `None` if some variable of the formula
    /// has no value in `model`.
    pub fn eval(&self, model: &Model) -> Option<bool> {
        self.fold(|node: Node<Option<bool>>| match node {
            Node::Var(name) => model.get(name).copied(),
            Node::Not(arg) => arg.map(|a| !a),
            Node::And(l, r) => Some(l? && r?),
            Node::Or(l, r) => Some(l? || r?),
            Node::Implies(l, r) => Some(!l? || r?),
            Node::Iff(l, r) => Some(l? == r?),
        })
    }

    /// The distinct variable names of the formula, in left-to-right first occurrence order.
    pub fn variables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut names = vec![];
        self.fold(|node| {
            if let Node::Var(name) = node {
                if seen.insert(name) {
                    names.push(name);
                }
            }
        });
        names
    }

    /// Whether the formula is a conjunction of clauses, each clause a disjunction of
    /// variables or negated variables. `Implies` and `Iff` never occur in CNF.
    pub fn is_cnf(&self) -> bool {
        self.fold(|node: Node<Shape>| match node {
            Node::Var(_) => Shape::Atom,
            Node::Not(Shape::Atom) => Shape::Literal,
            Node::Not(_) => Shape::Invalid,
            Node::Or(l, r) if l.is_clause() && r.is_clause() => Shape::Clause,
            Node::Or(..) => Shape::Invalid,
            Node::And(Shape::Invalid, _) | Node::And(_, Shape::Invalid) => Shape::Invalid,
            Node::And(..) => Shape::Conjunction,
            Node::Implies(..) | Node::Iff(..) => Shape::Invalid,
        }) != Shape::Invalid
    }

    /// Moves the operands out of this node, leaving empty variables in their place.
    fn detach_operands(&mut self, into: &mut Vec<Formula>) {
        fn detach(operand: &mut Formula) -> Formula {
            mem::replace(operand, Formula::Var(String::new()))
        }

        match self {
            Formula::Var(_) => {}
            Formula::Not(arg) => into.push(detach(arg)),
            Formula::And(l, r) | Formula::Or(l, r) | Formula::Implies(l, r) | Formula::Iff(l, r) => {
                into.push(detach(l));
                into.push(detach(r));
            }
        }
    }
}

fn pop_operand<T>(done: &mut Vec<T>) -> T {
    done.pop().expect("operands are folded before their connective")
}

fn pop_operands<T>(done: &mut Vec<T>) -> (T, T) {
    let right = pop_operand(done);
    let left = pop_operand(done);
    (left, right)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Shape {
    Atom,
    Literal,
    Clause,
    Conjunction,
    Invalid,
}

impl Shape {
    fn is_clause(self) -> bool {
        matches!(self, Shape::Atom | Shape::Literal | Shape::Clause)
    }
}

impl Clone for Formula {
    fn clone(&self) -> Self {
        self.fold(Node::rebuild)
    }
}

impl PartialEq for Formula {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            match pair {
                (Formula::Var(a), Formula::Var(b)) => {
                    if a != b {
                        return false;
                    }
                }
                (Formula::Not(a), Formula::Not(b)) => pending.push((&**a, &**b)),
                (Formula::And(l1, r1), Formula::And(l2, r2))
                | (Formula::Or(l1, r1), Formula::Or(l2, r2))
                | (Formula::Implies(l1, r1), Formula::Implies(l2, r2))
                | (Formula::Iff(l1, r1), Formula::Iff(l2, r2)) => {
                    pending.push((&**r1, &**r2));
                    pending.push((&**l1, &**l2));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Formula {}

impl Drop for Formula {
    fn drop(&mut self) {
        let mut pending = vec![];
        self.detach_operands(&mut pending);
        while let Some(mut operand) = pending.pop() {
            operand.detach_operands(&mut pending);
        }
    }
}

enum Token<'a> {
    Formula(&'a Formula),
    Text(&'static str),
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        let mut pending = vec![Token::Formula(self)];
        while let Some(token) = pending.pop() {
            let (head, l, r) = match token {
                Token::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Token::Formula(Formula::Var(name)) => {
                    f.write_str(name)?;
                    continue;
                }
                Token::Formula(Formula::Not(arg)) => {
                    f.write_str("(not ")?;
                    pending.push(Token::Text(")"));
                    pending.push(Token::Formula(&**arg));
                    continue;
                }
                Token::Formula(Formula::And(l, r)) => ("(and ", &**l, &**r),
                Token::Formula(Formula::Or(l, r)) => ("(or ", &**l, &**r),
                Token::Formula(Formula::Implies(l, r)) => ("(if ", &**l, &**r),
                Token::Formula(Formula::Iff(l, r)) => ("(iff ", &**l, &**r),
            };
            f.write_str(head)?;
            pending.push(Token::Text(")"));
            pending.push(Token::Formula(r));
            pending.push(Token::Text(" "));
            pending.push(Token::Formula(l));
        }
        Ok(())
    }
}

impl Debug for Formula {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        Display::fmt(self, f)
    }
}

/// Arbitrary formulas over `x0 .. x{num_variables - 1}` using all six connectives.
#[cfg(test)]
pub(crate) fn formula_strategy(num_variables: usize) -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::prelude::*;

    let leaf = (0..num_variables).prop_map(|i| Formula::var(format!("x{}", i)));
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Formula::not),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::or(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Formula::implies(l, r)),
            (inner.clone(), inner).prop_map(|(l, r)| Formula::iff(l, r)),
        ]
    })
}

/// Formulas already in CNF: up to `max_clauses` clauses of one to three literals.
#[cfg(test)]
pub(crate) fn cnf_strategy(
    num_variables: usize,
    max_clauses: usize,
) -> impl proptest::strategy::Strategy<Value = Formula> {
    use proptest::collection::vec;
    use proptest::prelude::*;

    let literal = (0..num_variables, any::<bool>()).prop_map(|(i, negated)| {
        let var = Formula::var(format!("x{}", i));
        if negated {
            Formula::not(var)
        } else {
            var
        }
    });
    let clause = vec(literal, 1..4).prop_map(|literals| Formula::or_all(literals).unwrap());
    vec(clause, 1..max_clauses + 1).prop_map(|clauses| Formula::and_all(clauses).unwrap())
}
