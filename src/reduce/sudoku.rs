use super::{conjunction, exactly_one, Reduction};
use crate::{Formula, Model};
use std::fmt;

/// A partially filled `n × n` Sudoku, `n` a perfect square; `0` marks an empty cell.
///
/// Variable `X{i},{j}={v}` (1-based) means cell `(i, j)` holds `v`. Every cell holds exactly
/// one value, every value appears exactly once per row, column and box, and the given cells
/// keep their values.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Sudoku {
    cells: Vec<Vec<u32>>,
    box_size: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SudokuError {
    Empty,
    NotSquare { row: usize, len: usize },
    SideNotPerfectSquare(usize),
    ValueOutOfRange { row: usize, col: usize, value: u32 },
}

impl fmt::Display for SudokuError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SudokuError::Empty => write!(f, "sudoku has no cells"),
            SudokuError::NotSquare { row, len } => write!(f, "row {} has {} cells", row + 1, len),
            SudokuError::SideNotPerfectSquare(side) => {
                write!(f, "side {} is not a perfect square", side)
            }
            SudokuError::ValueOutOfRange { row, col, value } => {
                write!(f, "cell ({}, {}) holds {}", row + 1, col + 1, value)
            }
        }
    }
}

impl std::error::Error for SudokuError {}

impl Sudoku {
    pub fn new(cells: Vec<Vec<u32>>) -> Result<Self, SudokuError> {
        let side = cells.len();
        if side == 0 {
            return Err(SudokuError::Empty);
        }
        for (row, values) in cells.iter().enumerate() {
            if values.len() != side {
                return Err(SudokuError::NotSquare { row, len: values.len() });
            }
            for (col, &value) in values.iter().enumerate() {
                if value as usize > side {
                    return Err(SudokuError::ValueOutOfRange { row, col, value });
                }
            }
        }
        let box_size = (1..=side).find(|b| b * b >= side).unwrap_or(side);
        if box_size * box_size != side {
            return Err(SudokuError::SideNotPerfectSquare(side));
        }
        Ok(Self { cells, box_size })
    }

    pub fn side(&self) -> usize {
        self.cells.len()
    }

    /// Whether every cell is filled and no row, column or box repeats a value.
    pub fn is_solved(&self) -> bool {
        let n = self.side();
        let b = self.box_size;
        let complete = |values: Vec<u32>| {
            let mut seen = vec![false; n + 1];
            values.into_iter().all(|v| v != 0 && !std::mem::replace(&mut seen[v as usize], true))
        };

        (0..n).all(|i| complete((0..n).map(|j| self.cells[i][j]).collect()))
            && (0..n).all(|j| complete((0..n).map(|i| self.cells[i][j]).collect()))
            && (0..n).all(|k| {
                let (top, left) = (k / b * b, k % b * b);
                complete((0..n).map(|c| self.cells[top + c / b][left + c % b]).collect())
            })
    }

    /// Whether `other` agrees with every given cell of this puzzle.
    pub fn is_completed_by(&self, other: &Sudoku) -> bool {
        self.side() == other.side()
            && self
                .cells
                .iter()
                .flatten()
                .zip(other.cells.iter().flatten())
                .all(|(&given, &value)| given == 0 || given == value)
    }
}

fn holds(i: usize, j: usize, value: usize) -> String {
    format!("X{},{}={}", i, j, value)
}

impl Reduction for Sudoku {
    type Solution = Sudoku;

    fn reduce(&self) -> Formula {
        let n = self.side();
        let b = self.box_size;
        let mut clauses = vec![];

        for i in 1..=n {
            for j in 1..=n {
                let values: Vec<String> = (1..=n).map(|v| holds(i, j, v)).collect();
                exactly_one(&values, &mut clauses);
            }
        }
        for i in 1..=n {
            for v in 1..=n {
                let cols: Vec<String> = (1..=n).map(|j| holds(i, j, v)).collect();
                exactly_one(&cols, &mut clauses);
            }
        }
        for j in 1..=n {
            for v in 1..=n {
                let rows: Vec<String> = (1..=n).map(|i| holds(i, j, v)).collect();
                exactly_one(&rows, &mut clauses);
            }
        }
        for top in (1..=n).step_by(b) {
            for left in (1..=n).step_by(b) {
                for v in 1..=n {
                    let cells: Vec<String> = (0..n).map(|c| holds(top + c / b, left + c % b, v)).collect();
                    exactly_one(&cells, &mut clauses);
                }
            }
        }

        for (i, row) in self.cells.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                if value != 0 {
                    clauses.push(Formula::var(holds(i + 1, j + 1, value as usize)));
                }
            }
        }

        conjunction(clauses)
    }

    fn decode(&self, model: &Model) -> Sudoku {
        let n = self.side();
        let cells = (1..=n)
            .map(|i| {
                (1..=n)
                    .map(|j| {
                        (1..=n)
                            .find(|&v| model.get(&holds(i, j, v)) == Some(&true))
                            .map_or(0, |v| v as u32)
                    })
                    .collect()
            })
            .collect();
        Sudoku {
            cells,
            box_size: self.box_size,
        }
    }
}
