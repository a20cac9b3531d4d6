//! Buzzer board for the final
//!
//! Each finalist has a grid of cells. A cell is empty until the operator
//! marks it green for a correct buzz or red for an incorrect one; the tally
//! rewards greens and penalises reds. Each row can be attributed to the
//! team member who answered it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::finale::{BUZZER_COLUMNS, BUZZER_ROWS, GREEN_VALUE, RED_PENALTY},
    error::Error,
};

/// State of one buzzer cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Not yet played
    #[default]
    Empty,
    /// Correct buzz
    Green,
    /// Incorrect buzz
    Red,
}

/// One finalist's buzzer grid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuzzerBoard {
    cells: [[Cell; BUZZER_COLUMNS]; BUZZER_ROWS],
    answered_by: [Option<String>; BUZZER_ROWS],
}

impl BuzzerBoard {
    fn cell_mut(&mut self, row: usize, column: usize) -> Result<&mut Cell, Error> {
        self.cells
            .get_mut(row)
            .and_then(|r| r.get_mut(column))
            .ok_or(Error::CellOutOfRange { row, column })
    }

    /// Toggles a cell between green and empty
    ///
    /// A red cell becomes green. Returns the new cell state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfRange`] for cells outside the grid.
    pub fn toggle(&mut self, row: usize, column: usize) -> Result<Cell, Error> {
        let cell = self.cell_mut(row, column)?;
        *cell = match *cell {
            Cell::Green => Cell::Empty,
            Cell::Empty | Cell::Red => Cell::Green,
        };
        debug!(row, column, cell = ?*cell, "buzzer cell toggled");
        Ok(*cell)
    }

    /// Marks a cell as an incorrect buzz
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfRange`] for cells outside the grid.
    pub fn mark_wrong(&mut self, row: usize, column: usize) -> Result<(), Error> {
        *self.cell_mut(row, column)? = Cell::Red;
        debug!(row, column, "buzzer cell marked wrong");
        Ok(())
    }

    /// Returns the state of a cell, `None` outside the grid
    pub fn cell(&self, row: usize, column: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(column)).copied()
    }

    /// Attributes a row to a team member, or clears the attribution
    ///
    /// # Errors
    ///
    /// Returns [`Error::CellOutOfRange`] for rows outside the grid.
    pub fn set_answered_by(&mut self, row: usize, member: Option<String>) -> Result<(), Error> {
        let slot = self
            .answered_by
            .get_mut(row)
            .ok_or(Error::CellOutOfRange { row, column: 0 })?;
        *slot = member;
        Ok(())
    }

    /// The member a row is attributed to
    pub fn answered_by(&self, row: usize) -> Option<&str> {
        self.answered_by.get(row).and_then(|m| m.as_deref())
    }

    fn count(&self, wanted: Cell) -> i64 {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell == wanted)
            .count() as i64
    }

    /// Number of green cells
    pub fn greens(&self) -> i64 {
        self.count(Cell::Green)
    }

    /// Number of red cells
    pub fn reds(&self) -> i64 {
        self.count(Cell::Red)
    }

    /// The buzzer tally: `greens × 2 − reds`
    pub fn tally(&self) -> i64 {
        tally(self.greens(), self.reds())
    }
}

/// Computes a buzzer tally from mark counts
pub fn tally(greens: i64, reds: i64) -> i64 {
    greens * GREEN_VALUE - reds * RED_PENALTY
}
