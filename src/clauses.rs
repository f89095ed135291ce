use crate::formula::Formula;
use log::debug;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Variable(pub usize);

/// A variable or its negation, packed as `2 * variable + polarity`.
///
/// Polarity `0` is the plain occurrence (true when the variable is true), polarity `1` the
/// negated one. The packed value doubles as the literal's watch slot, so `n` variables have
/// exactly `2n` literals.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, Debug)]
pub struct Literal(usize);

impl Literal {
    pub fn positive(v: Variable) -> Self {
        Literal(v.0 << 1)
    }

    pub fn negative(v: Variable) -> Self {
        Literal(v.0 << 1 | 1)
    }

    /// The literal made false by assigning `value` to `v`.
    pub fn falsified_by(v: Variable, value: bool) -> Self {
        if value {
            Literal::negative(v)
        } else {
            Literal::positive(v)
        }
    }

    pub fn variable(&self) -> Variable {
        Variable(self.0 >> 1)
    }

    pub fn is_negative(&self) -> bool {
        self.0 & 1 == 1
    }

    pub fn idx(&self) -> usize {
        self.0
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        if self.is_negative() {
            write!(f, "!{}", self.variable().0)
        } else {
            write!(f, "{}", self.variable().0)
        }
    }
}

/// A disjunction of literals. Duplicate literals collapse; literals are kept sorted.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Clause {
    literals: Vec<Literal>,
}

impl Clause {
    pub fn new(disjuncts: impl IntoIterator<Item = Literal>) -> Self {
        let literals: BTreeSet<Literal> = disjuncts.into_iter().collect();
        Self {
            literals: literals.into_iter().collect(),
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Display for Clause {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str("(")?;
        for (i, literal) in self.literals.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", literal)?;
        }
        f.write_str(")")
    }
}

/// Dense numbering of variable names, in first-seen order.
#[derive(Clone, Default, Debug)]
pub struct VariableTable {
    names: Vec<String>,
    ids: HashMap<String, Variable>,
}

impl VariableTable {
    /// The id of `name`, assigning the next free one if the name is new.
    pub fn intern(&mut self, name: &str) -> Variable {
        if let Some(v) = self.ids.get(name) {
            return *v;
        }
        let v = Variable(self.names.len());
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), v);
        v
    }

    pub fn get(&self, name: &str) -> Option<Variable> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, v: Variable) -> &str {
        &self.names[v.0]
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// A formula handed to [`clausify`] that is not in conjunctive normal form.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EncodingError {
    /// The offending sub-formula, rendered as text.
    pub formula: String,
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        write!(f, "formula not in conjunctive normal form: {}", self.formula)
    }
}

impl std::error::Error for EncodingError {}

impl EncodingError {
    fn new(formula: &Formula) -> Self {
        Self {
            formula: formula.to_string(),
        }
    }
}

/// Compiles a CNF formula into numbered variables and one clause per top-level conjunct.
///
/// Fails without encoding anything if an `if`/`iff` occurs, a `not` is applied to something
/// other than a variable, or an `and` appears below an `or`.
pub fn clausify(formula: &Formula) -> Result<(VariableTable, Vec<Clause>), EncodingError> {
    let mut variables = VariableTable::default();
    let mut clauses = vec![];

    let mut conjuncts = vec![formula];
    while let Some(conjunct) = conjuncts.pop() {
        match conjunct {
            Formula::And(l, r) => {
                conjuncts.push(&**r);
                conjuncts.push(&**l);
            }
            clause => clauses.push(clausify_disjunction(clause, &mut variables)?),
        }
    }

    debug!("clausified {} variables, {} clauses", variables.len(), clauses.len());
    Ok((variables, clauses))
}

fn clausify_disjunction(formula: &Formula, variables: &mut VariableTable) -> Result<Clause, EncodingError> {
    let mut literals = vec![];

    let mut disjuncts = vec![formula];
    while let Some(disjunct) = disjuncts.pop() {
        match disjunct {
            Formula::Or(l, r) => {
                disjuncts.push(&**r);
                disjuncts.push(&**l);
            }
            Formula::Var(name) => literals.push(Literal::positive(variables.intern(name))),
            Formula::Not(arg) => match &**arg {
                Formula::Var(name) => literals.push(Literal::negative(variables.intern(name))),
                _ => return Err(EncodingError::new(disjunct)),
            },
            _ => return Err(EncodingError::new(disjunct)),
        }
    }

    Ok(Clause::new(literals))
}
