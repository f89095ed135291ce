use crate::formula::Formula;
use std::fmt;
use std::io::{BufRead, BufReader, Read};

/// Reads a formula written in prefix s-expression syntax.
///
/// `(not X)`, `(and X Y ...)`, `(or X Y ...)`, `(if X Y)` and `(iff X Y)`; any other token is a
/// variable. `and`/`or` with more than two operands fold to the left. A `;` comments out the
/// rest of its line.
pub fn parse<R: Read>(reader: R) -> Result<Formula, ParseError> {
    let reader = BufReader::new(reader);
    let mut parser = Parser::default();

    for line in reader.lines() {
        let line = line?;
        let code = line.split(';').next().unwrap_or("");
        let spaced = code.replace('(', " ( ").replace(')', " ) ");
        for token in spaced.split_whitespace() {
            parser.push(token)?;
        }
    }

    parser.finish()
}

pub fn compile(program: &str) -> Result<Formula, ParseError> {
    parse(program.as_bytes())
}

#[derive(Debug)]
pub enum ParseError {
    Io(std::io::Error),
    Format(String),
}

impl ParseError {
    fn format(message: impl Into<String>) -> Self {
        ParseError::Format(message.into())
    }
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Io(e) => write!(f, "{}", e),
            ParseError::Format(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(e) => Some(e),
            ParseError::Format(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Operator {
    Not,
    And,
    Or,
    If,
    Iff,
}

impl Operator {
    fn from_name(name: &str) -> Result<Self, ParseError> {
        match name {
            "not" => Ok(Operator::Not),
            "and" => Ok(Operator::And),
            "or" => Ok(Operator::Or),
            "if" => Ok(Operator::If),
            "iff" => Ok(Operator::Iff),
            _ => Err(ParseError::format(format!("invalid function: {}", name))),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Operator::Not => "not",
            Operator::And => "and",
            Operator::Or => "or",
            Operator::If => "if",
            Operator::Iff => "iff",
        }
    }
}

/// A list whose closing paren has not been read yet.
#[derive(Default)]
struct OpenList {
    operator: Option<Operator>,
    operands: Vec<Formula>,
}

impl OpenList {
    fn close(self) -> Result<Formula, ParseError> {
        let operator = self.operator.ok_or_else(|| ParseError::format("empty list"))?;
        let count = self.operands.len();
        let arity_error = |expected: &str| {
            ParseError::format(format!(
                "`{}' takes {} operands, found {}",
                operator.name(),
                expected,
                count
            ))
        };

        let mut operands = self.operands.into_iter();
        match operator {
            Operator::Not => match (operands.next(), operands.next()) {
                (Some(arg), None) => Ok(Formula::not(arg)),
                _ => Err(arity_error("exactly 1")),
            },
            Operator::And | Operator::Or if count < 2 => Err(arity_error("at least 2")),
            Operator::And => Ok(Formula::and_all(operands).expect("checked operand count")),
            Operator::Or => Ok(Formula::or_all(operands).expect("checked operand count")),
            Operator::If | Operator::Iff => match (operands.next(), operands.next(), operands.next()) {
                (Some(l), Some(r), None) => Ok(match operator {
                    Operator::If => Formula::implies(l, r),
                    _ => Formula::iff(l, r),
                }),
                _ => Err(arity_error("exactly 2")),
            },
        }
    }
}

/// Builds the formula token by token; nesting lives on `open`, not on the call stack.
#[derive(Default)]
struct Parser {
    open: Vec<OpenList>,
    result: Option<Formula>,
}

impl Parser {
    fn push(&mut self, token: &str) -> Result<(), ParseError> {
        match token {
            "(" => {
                match self.open.last() {
                    Some(list) if list.operator.is_none() => {
                        return Err(ParseError::format("expected function name, found list"))
                    }
                    None if self.result.is_some() => return Err(trailing_tokens()),
                    _ => {}
                }
                self.open.push(OpenList::default());
                Ok(())
            }
            ")" => {
                let list = self.open.pop().ok_or_else(|| ParseError::format("unexpected ')'"))?;
                let formula = list.close()?;
                self.emit(formula)
            }
            atom => match self.open.last_mut() {
                Some(list) if list.operator.is_none() => {
                    list.operator = Some(Operator::from_name(atom)?);
                    Ok(())
                }
                _ => self.emit(Formula::var(atom)),
            },
        }
    }

    fn emit(&mut self, formula: Formula) -> Result<(), ParseError> {
        match self.open.last_mut() {
            Some(list) => {
                list.operands.push(formula);
                Ok(())
            }
            None if self.result.is_none() => {
                self.result = Some(formula);
                Ok(())
            }
            None => Err(trailing_tokens()),
        }
    }

    fn finish(self) -> Result<Formula, ParseError> {
        if !self.open.is_empty() {
            return Err(ParseError::format("unexpected end of input"));
        }
        self.result.ok_or_else(|| ParseError::format("empty input"))
    }
}

fn trailing_tokens() -> ParseError {
    ParseError::format("unexpected tokens after expression")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use test_env_log::test;

    fn round_trip(program: &str) -> String {
        compile(program).expect("failed to parse").to_string()
    }

    fn format_error(program: &str) -> String {
        match compile(program) {
            Err(ParseError::Format(message)) => message,
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn parse_binary_connective() {
        assert_eq!(round_trip("(and a b)"), "(and a b)");
        assert_eq!(round_trip("(if a b)"), "(if a b)");
        assert_eq!(round_trip("(iff a b)"), "(iff a b)");
    }

    #[test]
    fn parse_multiple_args_fold_left() {
        assert_eq!(round_trip("(and a b c)"), "(and (and a b) c)");
        assert_eq!(round_trip("(or a b c d)"), "(or (or (or a b) c) d)");
    }

    #[test]
    fn parse_nested() {
        assert_eq!(
            round_trip("(and (not a) b (or c (not a)))"),
            "(and (and (not a) b) (or c (not a)))"
        );
    }

    #[test]
    fn parse_single_atom() {
        assert_eq!(compile("test").unwrap(), Formula::var("test"));
    }

    #[test]
    fn parse_comments_and_layout() {
        let program = "; leading comment
(and
  ; one clause per line
  (or A B (not C)) ; trailing comment
  (or B C))";
        assert_eq!(round_trip(program), "(and (or (or A B) (not C)) (or B C))");
    }

    #[test]
    fn parse_arity_errors() {
        assert!(format_error("(and a)").contains("at least 2"));
        assert!(format_error("(not a b)").contains("exactly 1"));
        assert!(format_error("(if a b a)").contains("exactly 2"));
        assert!(format_error("(iff a)").contains("exactly 2"));
    }

    #[test]
    fn parse_structure_errors() {
        assert_eq!(format_error("(invalid a b)"), "invalid function: invalid");
        assert_eq!(format_error("((and a b) c)"), "expected function name, found list");
        assert_eq!(format_error("()"), "empty list");
        assert_eq!(format_error("(and a b"), "unexpected end of input");
        assert_eq!(format_error("a)"), "unexpected ')'");
        assert_eq!(format_error("(and a b) c"), "unexpected tokens after expression");
        assert_eq!(format_error("a (not b)"), "unexpected tokens after expression");
        assert_eq!(format_error("  ; nothing here\n"), "empty input");
    }

    #[test]
    fn parse_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "(and").unwrap();
        writeln!(file, " (iff A B)").unwrap();
        writeln!(file, " A").unwrap();
        writeln!(file, " (not B))").unwrap();

        let f = parse(std::fs::File::open(file.path()).unwrap()).expect("failed to parse");
        assert_eq!(f.to_string(), "(and (and (iff A B) A) (not B))");
    }

    #[test]
    fn parse_deeply_nested() {
        const DEPTH: usize = 50_000;
        let program = format!("{}a{}", "(not ".repeat(DEPTH), ")".repeat(DEPTH));
        let f = compile(&program).unwrap();
        assert_eq!(f.to_cnf(), Formula::var("a"));
    }
}
