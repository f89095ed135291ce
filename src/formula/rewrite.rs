//! Equivalence-preserving rewrites that bring a formula into conjunctive normal form.
//!
//! [`to_cnf`] runs the four passes in order: biconditional elimination, implication
//! elimination, negation propagation and distribution of `or` over `and`. Each pass builds a
//! new tree and none introduces auxiliary variables.

use super::{pop_operands, Formula, Node};
use log::debug;
use std::mem;

impl Formula {
    /// See [`to_cnf`].
    pub fn to_cnf(&self) -> Formula {
        to_cnf(self)
    }
}

/// Rewrites `formula` into an equivalent formula for which [`Formula::is_cnf`] holds.
pub fn to_cnf(formula: &Formula) -> Formula {
    let formula = eliminate_biconditionals(formula);
    let formula = eliminate_implications(&formula);
    let formula = push_negations(&formula);
    let formula = distribute_disjunctions(&formula);
    debug!("converted to cnf: {} variables", formula.variables().len());
    formula
}

/// `(iff a b)` becomes `(and (or a (not b)) (or (not a) b))`.
pub fn eliminate_biconditionals(formula: &Formula) -> Formula {
    formula.fold(|node: Node<Formula>| match node {
        Node::Iff(l, r) => Formula::and(
            Formula::or(l.clone(), Formula::not(r.clone())),
            Formula::or(Formula::not(l), r),
        ),
        node => node.rebuild(),
    })
}

/// `(if a b)` becomes `(or (not a) b)`.
pub fn eliminate_implications(formula: &Formula) -> Formula {
    formula.fold(|node: Node<Formula>| match node {
        Node::Implies(l, r) => Formula::or(Formula::not(l), r),
        node => node.rebuild(),
    })
}

enum Step<'a> {
    Visit(&'a Formula, bool),
    Join(Join),
}

#[derive(Clone, Copy)]
enum Join {
    And,
    Or,
    Implies,
    Iff,
}

impl Join {
    fn apply(self, left: Formula, right: Formula) -> Formula {
        match self {
            Join::And => Formula::and(left, right),
            Join::Or => Formula::or(left, right),
            Join::Implies => Formula::implies(left, right),
            Join::Iff => Formula::iff(left, right),
        }
    }
}

/// Pushes every `not` down to the variables (De Morgan), cancelling double negations.
///
/// The traversal carries a `negated` flag downwards instead of building intermediate `not`
/// nodes. Connectives that reach this pass unexpectedly are still negated correctly:
/// `(not (if a b))` becomes `(and a (not b))` and `(not (iff a b))` becomes `(iff a (not b))`.
pub fn push_negations(formula: &Formula) -> Formula {
    let mut work = vec![Step::Visit(formula, false)];
    let mut done: Vec<Formula> = vec![];

    while let Some(step) = work.pop() {
        match step {
            Step::Visit(Formula::Var(name), negated) => {
                let var = Formula::var(name.as_str());
                done.push(if negated { Formula::not(var) } else { var });
            }
            Step::Visit(Formula::Not(arg), negated) => work.push(Step::Visit(&**arg, !negated)),
            Step::Visit(Formula::And(l, r), negated) => {
                work.push(Step::Join(if negated { Join::Or } else { Join::And }));
                work.push(Step::Visit(&**r, negated));
                work.push(Step::Visit(&**l, negated));
            }
            Step::Visit(Formula::Or(l, r), negated) => {
                work.push(Step::Join(if negated { Join::And } else { Join::Or }));
                work.push(Step::Visit(&**r, negated));
                work.push(Step::Visit(&**l, negated));
            }
            Step::Visit(Formula::Implies(l, r), negated) => {
                work.push(Step::Join(if negated { Join::And } else { Join::Implies }));
                work.push(Step::Visit(&**r, negated));
                work.push(Step::Visit(&**l, false));
            }
            Step::Visit(Formula::Iff(l, r), negated) => {
                work.push(Step::Join(Join::Iff));
                work.push(Step::Visit(&**r, negated));
                work.push(Step::Visit(&**l, false));
            }
            Step::Join(join) => {
                let (l, r) = pop_operands(&mut done);
                done.push(join.apply(l, r));
            }
        }
    }

    done.pop().expect("every visit leaves exactly one formula")
}

/// Distributes `or` over `and` until no `or` has an `and` beneath it.
///
/// Operands are rewritten first, so both sides of an `or` are already conjunctions of
/// clauses; the `or` is then replaced by the conjunction of the pairwise disjunctions of
/// their conjuncts. One pass is therefore enough for any input without `if`/`iff` and with
/// negations only over variables.
pub fn distribute_disjunctions(formula: &Formula) -> Formula {
    formula.fold(|node: Node<Formula>| match node {
        Node::Or(l, r) => {
            if matches!(l, Formula::And(..)) || matches!(r, Formula::And(..)) {
                distribute(&l, &r)
            } else {
                Formula::or(l, r)
            }
        }
        node => node.rebuild(),
    })
}

fn distribute(left: &Formula, right: &Formula) -> Formula {
    let mut lefts = conjuncts(left);
    let mut rights = conjuncts(right);
    // a lone clause goes first: (or (and b c) a) => (and (or a b) (or a c))
    if lefts.len() > 1 && rights.len() == 1 {
        mem::swap(&mut lefts, &mut rights);
    }

    let clauses = lefts
        .iter()
        .flat_map(|&l| rights.iter().map(move |&r| Formula::or(l.clone(), r.clone())));
    Formula::and_all(clauses).expect("every formula has at least one conjunct")
}

/// The operands of the top-level `and` spine, left to right.
fn conjuncts(formula: &Formula) -> Vec<&Formula> {
    let mut pending = vec![formula];
    let mut found = vec![];
    while let Some(f) = pending.pop() {
        match f {
            Formula::And(l, r) => {
                pending.push(&**r);
                pending.push(&**l);
            }
            clause => found.push(clause),
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::sexp::compile;
    use crate::formula::{cnf_strategy, formula_strategy};
    use crate::Model;
    use proptest::prelude::*;
    use test_env_log::test;

    fn cnf_text(program: &str) -> String {
        to_cnf(&compile(program).unwrap()).to_string()
    }

    fn all_models(num_variables: usize) -> impl Iterator<Item = Model> {
        (0..1u32 << num_variables).map(move |bits| {
            (0..num_variables)
                .map(|i| (format!("x{}", i), bits & (1 << i) != 0))
                .collect()
        })
    }

    #[test]
    fn convert_iff() {
        assert_eq!(cnf_text("(iff a b)"), "(and (or a (not b)) (or (not a) b))");
    }

    #[test]
    fn convert_if() {
        assert_eq!(cnf_text("(if a b)"), "(or (not a) b)");
    }

    #[test]
    fn convert_double_negations() {
        assert_eq!(cnf_text("(not (not a))"), "a");
        assert_eq!(cnf_text("(not (not (not a)))"), "(not a)");
        assert_eq!(cnf_text("(not (not (not (not a))))"), "a");
    }

    #[test]
    fn convert_de_morgan() {
        assert_eq!(cnf_text("(not (and a b))"), "(or (not a) (not b))");
        assert_eq!(cnf_text("(not (or a b))"), "(and (not a) (not b))");
        assert_eq!(cnf_text("(and c (not (or a b)))"), "(and c (and (not a) (not b)))");
    }

    #[test]
    fn convert_distribute_or_over_and() {
        assert_eq!(cnf_text("(or a (and b c))"), "(and (or a b) (or a c))");
        assert_eq!(cnf_text("(or (and b c) a)"), "(and (or a b) (or a c))");
        assert_eq!(
            cnf_text("(or (and a b) (and c d))"),
            "(and (and (and (or a c) (or a d)) (or b c)) (or b d))"
        );
    }

    #[test]
    fn convert_nested_mixture() {
        let f = to_cnf(&compile("(or a (and b (if a c)))").unwrap());
        assert!(f.is_cnf());
        let f = to_cnf(&compile("(or (or a (and b c)) (and d (or e (and f g))))").unwrap());
        assert!(f.is_cnf());
    }

    #[test]
    fn push_negations_through_implications() {
        let f = push_negations(&compile("(not (if a b))").unwrap());
        assert_eq!(f.to_string(), "(and a (not b))");
        let f = push_negations(&compile("(not (iff a (not b)))").unwrap());
        assert_eq!(f.to_string(), "(iff a b)");
    }

    #[test]
    fn passes_remove_their_connective() {
        let f = compile("(iff (if a b) (not (iff c (and a d))))").unwrap();
        let f = eliminate_biconditionals(&f);
        assert!(!f.to_string().contains("(iff "));
        let f = eliminate_implications(&f);
        assert!(!f.to_string().contains("(if "));
        let f = push_negations(&f);
        assert!(!f.to_string().contains("(not ("));
    }

    proptest! {
        #[test]
        fn proptest_rewrite_preserves_truth(f in formula_strategy(4)) {
            let cnf = to_cnf(&f);
            for model in all_models(4) {
                prop_assert_eq!(f.eval(&model), cnf.eval(&model));
            }
        }

        #[test]
        fn proptest_rewrite_reaches_cnf(f in formula_strategy(5)) {
            let cnf = to_cnf(&f);
            prop_assert!(cnf.is_cnf(), "not in cnf: {}", cnf);
        }

        #[test]
        fn proptest_cnf_is_fixed_point(f in cnf_strategy(6, 8)) {
            prop_assert_eq!(to_cnf(&f), f);
        }
    }
}
