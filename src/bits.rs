use crate::game::{MAX_SIZE, Position};

/// A set of small indexes (0..64) packed into a single word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitvector {
    bits: u64,
}

impl Bitvector {
    pub fn new() -> Self {
        Self { bits: 0 }
    }

    pub fn contains(&self, index: u8) -> bool {
        assert!(index < 64, "index out of bounds");
        (self.bits & (1u64 << index)) != 0
    }

    pub fn add(&mut self, index: u8) {
        assert!(index < 64, "index out of bounds");
        self.bits |= 1u64 << index;
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(&self) -> BitvectorIter {
        BitvectorIter { bits: self.bits }
    }
}

pub struct BitvectorIter {
    bits: u64,
}

impl Iterator for BitvectorIter {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            None
        } else {
            let index = self.bits.trailing_zeros() as u8;
            self.bits &= self.bits - 1; // Clear the lowest set bit
            Some(index)
        }
    }
}

/// One bit per grid cell, a `u64` mask per row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bitboard {
    rows: [u64; MAX_SIZE],
}

impl Bitboard {
    pub fn new() -> Self {
        Self {
            rows: [0; MAX_SIZE],
        }
    }

    pub fn get(&self, (row, col): Position) -> bool {
        assert!(
            (row as usize) < MAX_SIZE && (col as usize) < MAX_SIZE,
            "position out of bounds"
        );
        (self.rows[row as usize] & (1u64 << col)) != 0
    }

    pub fn set(&mut self, (row, col): Position) {
        assert!(
            (row as usize) < MAX_SIZE && (col as usize) < MAX_SIZE,
            "position out of bounds"
        );
        self.rows[row as usize] |= 1u64 << col;
    }

    pub fn len(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones() as usize).sum()
    }
}

impl Default for Bitboard {
    fn default() -> Self {
        Self::new()
    }
}
