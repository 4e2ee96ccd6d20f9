//! This module defines the sparse `Tape`: an unbounded, two-way infinite sequence of cells
//! addressed by signed positions, with a single read/write head.

use crate::types::Direction;
use std::collections::HashMap;

/// A sparse tape.
///
/// Only cells that were explicitly written (including the initial input) are stored. Every
/// other position reads as the blank symbol. Reads and writes never fail, and the head moves
/// by exactly one cell at a time in either direction without bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: HashMap<i64, char>,
    head: i64,
    blank: char,
}

impl Tape {
    /// Creates a tape holding `input` at positions `0..input.len()`, with the head at 0.
    pub fn new(input: &str, blank: char) -> Self {
        Self {
            cells: (0..).zip(input.chars()).collect(),
            head: 0,
            blank,
        }
    }

    /// Returns the symbol under the head, or the blank symbol if the cell was never written.
    pub fn read(&self) -> char {
        self.symbol_at(self.head)
    }

    /// Stores `symbol` under the head. Writing the blank symbol still stores the cell.
    pub fn write(&mut self, symbol: char) {
        self.cells.insert(self.head, symbol);
    }

    pub fn move_left(&mut self) {
        self.head -= 1;
    }

    pub fn move_right(&mut self) {
        self.head += 1;
    }

    /// Moves the head one cell in `direction`.
    pub fn shift(&mut self, direction: Direction) {
        match direction {
            Direction::Left => self.move_left(),
            Direction::Right => self.move_right(),
        }
    }

    /// Returns the current head position.
    pub fn head_position(&self) -> i64 {
        self.head
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the `2 * radius + 1` symbols from `head - radius` to `head + radius`,
    /// left to right. Positions past the ends of `i64` are clamped.
    pub fn window(&self, radius: usize) -> Vec<char> {
        let radius = i64::try_from(radius).unwrap_or(i64::MAX);
        (self.head.saturating_sub(radius)..=self.head.saturating_add(radius))
            .map(|position| self.symbol_at(position))
            .collect()
    }

    /// Sums the numeric value of every stored digit symbol.
    ///
    /// Never-written cells and stored non-digit symbols contribute nothing.
    pub fn sum_of_digit_symbols(&self) -> u64 {
        self.cells
            .values()
            .filter_map(|symbol| symbol.to_digit(10))
            .map(u64::from)
            .sum()
    }

    /// Returns the number of cells that were ever stored, whatever their value.
    ///
    /// A cell that was explicitly written with the blank symbol is counted.
    pub fn stored_cell_count(&self) -> usize {
        self.cells.len()
    }

    fn symbol_at(&self, position: i64) -> char {
        self.cells.get(&position).copied().unwrap_or(self.blank)
    }
}
