// ── Coordinate switching matrix ──
//
// Maps an E (row) × D (column) coordinate pair on the analog switch to an
// apartment number. Each of the four switches keeps its own grid.

use tracing::info;

use crate::error::CoreError;

pub const GRID: usize = 10;
pub const SWITCH_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    cells: [[String; GRID]; GRID],
}

impl Default for Matrix {
    fn default() -> Self {
        let cells = std::array::from_fn(|row| {
            std::array::from_fn(|col| match (row, col) {
                (0, 0) => "100".to_owned(),
                (0, c) => (c * 10).to_string(),
                (r, c) => (r + c * 10).to_string(),
            })
        });
        Self { cells }
    }
}

impl Matrix {
    pub fn row_label(row: usize) -> String {
        format!("E{row}")
    }

    pub fn col_label(col: usize) -> String {
        format!("D{col}")
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row)?.get(col).map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String; GRID]> {
        self.cells.iter()
    }

    fn set(&mut self, row: usize, col: usize, value: String) -> Result<(), CoreError> {
        let slot = self
            .cells
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or_else(|| CoreError::not_found("Cell", format!("E{row}/D{col}")))?;
        *slot = value;
        Ok(())
    }
}

/// Start/end apartment numbers for analog handset operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApartmentRange {
    pub first: u32,
    pub last: u32,
}

impl ApartmentRange {
    pub fn parse(first: &str, last: &str) -> Result<Self, CoreError> {
        if first.trim().is_empty() || last.trim().is_empty() {
            return Err(CoreError::validation("Fill in the apartment numbers"));
        }
        let parse = |raw: &str| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| CoreError::validation("Apartment numbers must be numeric"))
        };
        let (first, last) = (parse(first)?, parse(last)?);
        if first > last {
            return Err(CoreError::validation(
                "The first apartment must not exceed the last",
            ));
        }
        Ok(Self { first, last })
    }
}

impl std::fmt::Display for ApartmentRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Matrices for all switches plus the edit-mode guard.
#[derive(Debug, Clone)]
pub struct MatrixBoard {
    matrices: Vec<Matrix>,
    selected: usize,
    pub edit_mode: bool,
}

impl Default for MatrixBoard {
    fn default() -> Self {
        Self {
            matrices: vec![Matrix::default(); SWITCH_COUNT],
            selected: 0,
            edit_mode: false,
        }
    }
}

impl MatrixBoard {
    /// 1-based switch number.
    pub fn selected_switch(&self) -> usize {
        self.selected + 1
    }

    pub fn select_switch(&mut self, number: usize) {
        if (1..=SWITCH_COUNT).contains(&number) {
            self.selected = number - 1;
        }
    }

    pub fn current(&self) -> &Matrix {
        // `selected` is always < SWITCH_COUNT.
        &self.matrices[self.selected]
    }

    pub fn edit_cell(&mut self, row: usize, col: usize, value: &str) -> Result<(), CoreError> {
        if !self.edit_mode {
            return Err(CoreError::validation("Enable edit mode to change cells"));
        }
        let value = value.trim();
        if !value.chars().all(|c| c.is_ascii_digit()) {
            return Err(CoreError::validation("Apartment number must be numeric"));
        }
        let switch = self.selected_switch();
        self.matrices[self.selected].set(row, col, value.to_owned())?;
        info!(switch, row, col, value, "matrix cell updated");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn initial_layout() {
        let m = Matrix::default();
        let first: Vec<&str> = (0..GRID).map(|c| m.cell(0, c).unwrap()).collect();
        assert_eq!(first, vec!["100", "10", "20", "30", "40", "50", "60", "70", "80", "90"]);
        assert_eq!(m.cell(1, 0), Some("1"));
        assert_eq!(m.cell(3, 4), Some("43"));
        assert_eq!(m.cell(9, 9), Some("99"));
        assert_eq!(m.cell(10, 0), None);
        assert_eq!(Matrix::row_label(2), "E2");
        assert_eq!(Matrix::col_label(7), "D7");
    }

    #[test]
    fn edits_need_edit_mode() {
        let mut board = MatrixBoard::default();
        assert!(board.edit_cell(1, 1, "5").is_err());
        board.edit_mode = true;
        board.edit_cell(1, 1, "5").unwrap();
        assert_eq!(board.current().cell(1, 1), Some("5"));
        assert!(board.edit_cell(1, 1, "x").is_err());
    }

    #[test]
    fn switches_are_independent() {
        let mut board = MatrixBoard::default();
        board.edit_mode = true;
        board.select_switch(2);
        board.edit_cell(0, 0, "7").unwrap();
        board.select_switch(1);
        assert_eq!(board.current().cell(0, 0), Some("100"));
        board.select_switch(9);
        assert_eq!(board.selected_switch(), 1);
    }

    #[test]
    fn range_validation() {
        assert!(ApartmentRange::parse("", "5").is_err());
        assert!(ApartmentRange::parse("a", "5").is_err());
        assert!(ApartmentRange::parse("9", "5").is_err());
        let range = ApartmentRange::parse("1", "40").unwrap();
        assert_eq!(range.to_string(), "1-40");
    }
}
