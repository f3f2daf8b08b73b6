//! Logical cursor of a 16x2 display.
//!
//! Positions 0..=15 are row 1, 16..=31 row 2. Position 32 means text ran past the end of row 2;
//! the display is cleared before the next character is written.

use crate::config::{COLUMNS, ROWS};

/// Positions on screen, both rows.
const CELLS: u8 = ROWS * COLUMNS;

/// The "wrapped past the end of row 2" position.
pub const SENTINEL: u8 = CELLS;

// DDRAM address of the first character of row 2
const ROW2_ADDRESS: u8 = 0x40;

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor(u8);

impl Cursor {
    pub const fn new() -> Self {
        Cursor(0)
    }

    /// Raw position, 0..=32.
    pub fn position(&self) -> u8 {
        self.0
    }

    /// `true` when the cursor sits on the sentinel and the next write clears the display.
    pub fn is_wrapped(&self) -> bool {
        self.0 == SENTINEL
    }

    /// 1-based row and column, or `None` on the sentinel.
    pub fn row_col(&self) -> Option<(u8, u8)> {
        if self.is_wrapped() {
            None
        } else {
            Some((self.0 / COLUMNS + 1, self.0 % COLUMNS + 1))
        }
    }

    /// DDRAM address of the position. The sentinel maps to address 0.
    pub fn address(&self) -> u8 {
        match self.0 {
            p if p < COLUMNS => p,
            p if p < CELLS => ROW2_ADDRESS | (p & 0x0F),
            _ => 0,
        }
    }

    pub fn line1(&mut self) {
        self.0 = 0;
    }

    pub fn line2(&mut self) {
        self.0 = COLUMNS;
    }

    /// Jumps to a 1-based row and column. Out of range values are clamped.
    pub fn goto(&mut self, row: u8, column: u8) {
        let row = row.clamp(1, ROWS);
        let column = column.clamp(1, COLUMNS);
        self.0 = (row - 1) * COLUMNS + (column - 1);
    }

    /// Moves relative to the current position. Rows and columns wrap around independently.
    pub fn move_by(&mut self, rows: i8, columns: i8) {
        let current = self.on_screen();
        let row = (i16::from(current / COLUMNS) + i16::from(rows)).rem_euclid(ROWS.into());
        let column = (i16::from(current % COLUMNS) + i16::from(columns)).rem_euclid(COLUMNS.into());
        // both values are in range after rem_euclid
        self.0 = (row as u8) * COLUMNS + column as u8;
    }

    /// One position back, wrapping from the start of row 1 to the end of row 2.
    pub fn back(&mut self) {
        self.0 = if self.is_wrapped() {
            CELLS - 1
        } else {
            (self.0 + CELLS - 1) % CELLS
        };
    }

    /// One position forward, wrapping from the end of row 2 to the start of row 1.
    pub fn forward(&mut self) {
        self.0 = (self.on_screen() + 1) % CELLS;
    }

    /// First column of the current row.
    pub fn home(&mut self) {
        self.0 = self.on_screen() & COLUMNS;
    }

    /// Where a line feed goes: row 2 from row 1, the sentinel from anywhere else.
    pub(crate) fn newline(&mut self) {
        self.0 = if self.0 < COLUMNS { COLUMNS } else { SENTINEL };
    }

    /// Follows the controller's address counter after a character write.
    pub(crate) fn advance(&mut self) {
        if self.0 < SENTINEL {
            self.0 += 1;
        }
    }

    fn on_screen(&self) -> u8 {
        if self.is_wrapped() {
            0
        } else {
            self.0
        }
    }
}
