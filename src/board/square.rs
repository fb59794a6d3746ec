/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};

/// Represents a single square on an `8x8` checkers board.
///
/// Internally encoded as `row * 8 + col`, so the indices of each square on
/// the board are given as follows:
/// ```text
/// 8| 56 57 58 59 60 61 62 63
/// 7| 48 49 50 51 52 53 54 55
/// 6| 40 41 42 43 44 45 46 47
/// 5| 32 33 34 35 36 37 38 39
/// 4| 24 25 26 27 28 29 30 31
/// 3| 16 17 18 19 20 21 22 23
/// 2|  8  9 10 11 12 13 14 15
/// 1|  0  1  2  3  4  5  6  7
///  +------------------------
///    a  b  c  d  e  f  g  h
/// ```
///
/// Only the dark squares (those where `row + col` is odd) are ever occupied
/// during play; see [`Square::is_playable`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Square(pub(crate) u8);

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Number of rows (and columns) on the board.
    pub const SIZE: u8 = 8;

    /// Creates a new [`Square`] from the provided row and column.
    ///
    /// # Panics
    /// If `row` or `col` is out of bounds and debug assertions are enabled.
    ///
    /// # Example
    /// ```
    /// # use kinglet::Square;
    /// let sq = Square::new(2, 1);
    /// assert_eq!(sq.to_string(), "b3");
    /// ```
    #[inline(always)]
    pub const fn new(row: u8, col: u8) -> Self {
        debug_assert!(row < Self::SIZE && col < Self::SIZE);
        Self(row * Self::SIZE + col)
    }

    /// Creates a new [`Square`] from an index in `0..64`.
    #[inline(always)]
    pub fn from_index(index: usize) -> Result<Self> {
        if index < Self::COUNT {
            Ok(Self(index as u8))
        } else {
            bail!("Invalid index for Square: must be in [0,63]. Got {index}.")
        }
    }

    /// Creates a new [`Square`] from an index in `0..64`, ignoring safety checks.
    #[inline(always)]
    pub(crate) const fn from_index_unchecked(index: usize) -> Self {
        debug_assert!(index < Self::COUNT);
        Self(index as u8)
    }

    /// Row of this square, in `0..8`. Row `0` is printed as rank `1`.
    #[inline(always)]
    pub const fn row(&self) -> u8 {
        self.0 / Self::SIZE
    }

    /// Column of this square, in `0..8`. Column `0` is printed as file `a`.
    #[inline(always)]
    pub const fn col(&self) -> u8 {
        self.0 % Self::SIZE
    }

    /// Returns this [`Square`] as a `usize`, useful for indexing into lists.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this square can ever hold a piece.
    ///
    /// Pieces live on the dark squares only, which are those where
    /// `row + col` is odd.
    ///
    /// # Example
    /// ```
    /// # use kinglet::Square;
    /// assert!("b1".parse::<Square>().unwrap().is_playable());
    /// assert!(!"a1".parse::<Square>().unwrap().is_playable());
    /// ```
    #[inline(always)]
    pub const fn is_playable(&self) -> bool {
        (self.row() + self.col()) % 2 == 1
    }

    /// Returns the square displaced diagonally by `dr` rows and `dc` columns,
    /// or `None` if that would leave the board.
    ///
    /// # Example
    /// ```
    /// # use kinglet::Square;
    /// let sq = Square::new(2, 1);
    /// assert_eq!(sq.offset(1, 1), Some(Square::new(3, 2)));
    /// assert_eq!(sq.offset(-1, -2), None);
    /// ```
    #[inline(always)]
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = self.row() as i8 + dr;
        let col = self.col() as i8 + dc;

        if (0..Self::SIZE as i8).contains(&row) && (0..Self::SIZE as i8).contains(&col) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Returns an iterator over all 64 squares, in index order.
    #[inline(always)]
    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(Self::from_index_unchecked)
    }

    /// The file character of this square, `a` through `h`.
    #[inline(always)]
    pub const fn file_char(&self) -> char {
        (b'a' + self.col()) as char
    }

    /// The rank character of this square, `1` through `8`.
    #[inline(always)]
    pub const fn rank_char(&self) -> char {
        (b'1' + self.row()) as char
    }
}

impl FromStr for Square {
    type Err = anyhow::Error;

    /// Parses a [`Square`] from algebraic notation like `b6`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();

        let file = chars
            .next()
            .context("Square string cannot be empty")?
            .to_ascii_lowercase();
        let rank = chars.next().context("Square must have a rank, like 'b6'")?;

        if chars.next().is_some() {
            bail!("Invalid Square {s:?}: must be exactly a file and a rank, like 'b6'");
        }

        if !('a'..='h').contains(&file) {
            bail!("Invalid file {file:?}: must be within [a,h]");
        }

        if !('1'..='8').contains(&rank) {
            bail!("Invalid rank {rank:?}: must be within [1,8]");
        }

        Ok(Self::new(rank as u8 - b'1', file as u8 - b'a'))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self} ({})", self.0)
    }
}
