use crate::{Formula, Model};

// Simple brute-force model enumeration for use in property tests
pub(crate) fn models_brute_force(f: &Formula) -> Vec<Model> {
    let names = f.variables();
    assert!(names.len() <= 16); // just for safety

    let mut models = vec![];
    for bits in 0..1u32 << names.len() {
        let model: Model = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), bits & (1 << i) != 0))
            .collect();
        if f.eval(&model) == Some(true) {
            models.push(model);
        }
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::sexp::compile;

    #[test]
    fn count_and() {
        assert_eq!(models_brute_force(&compile("(and a b)").unwrap()).len(), 1);
    }

    #[test]
    fn count_or() {
        assert_eq!(models_brute_force(&compile("(or a (or b c))").unwrap()).len(), 7);
    }

    #[test]
    fn count_unsat() {
        let f = compile("(and (iff A B) A (not B))").unwrap();
        assert!(models_brute_force(&f).is_empty());
    }

    #[test]
    fn models_satisfy() {
        let f = compile("(iff a (not b))").unwrap();
        let models = models_brute_force(&f);
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|m| m["a"] != m["b"]));
    }
}
