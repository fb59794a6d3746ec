/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

/// Represents one of the two players of a checkers game.
///
/// A [`Side`] is a purely logical identity. The colors a front-end paints
/// the pieces with are its own business; the engine only ever maps a side
/// to a notation letter (`w`/`b`) when formatting.
///
/// Dark traditionally moves first, and therefore [`Side`] defaults to
/// [`Side::Dark`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug)]
#[repr(u8)]
pub enum Side {
    Light,
    #[default]
    Dark,
}

impl Side {
    /// Number of side variants.
    pub const COUNT: usize = 2;

    /// An array of both sides, starting with Light.
    #[inline(always)]
    pub const fn all() -> [Self; Self::COUNT] {
        [Self::Light, Self::Dark]
    }

    /// Returns this [`Side`]'s opponent.
    ///
    /// # Example
    /// ```
    /// # use kinglet::Side;
    /// assert_eq!(Side::Light.opponent(), Side::Dark);
    /// assert_eq!(Side::Dark.opponent(), Side::Light);
    /// ```
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Returns this [`Side`] as a `usize`, useful for indexing into lists.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// The row direction this side's Men advance in.
    ///
    /// Light starts on rows `0..3` and advances up the board; Dark starts on
    /// rows `5..8` and advances down.
    #[inline(always)]
    pub const fn forward(&self) -> i8 {
        match self {
            Self::Light => 1,
            Self::Dark => -1,
        }
    }

    /// The farthest row for this side; a Man ending a move here becomes a King.
    #[inline(always)]
    pub const fn promotion_row(&self) -> u8 {
        match self {
            Self::Light => 7,
            Self::Dark => 0,
        }
    }

    /// Fetches a human-readable name for this [`Side`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Converts this [`Side`] to its notation letter, `w` for Light and `b` for Dark.
    #[inline(always)]
    pub const fn to_char(&self) -> char {
        match self {
            Self::Light => 'w',
            Self::Dark => 'b',
        }
    }

    /// Creates a [`Side`] from a notation letter (case-insensitive).
    #[inline(always)]
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'w' | 'W' => Ok(Self::Light),
            'b' | 'B' => Ok(Self::Dark),
            _ => bail!("Side must be either 'w' or 'b' (case-insensitive). Found {c:?}"),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Represents the kind (or "rank") a checkers piece can be.
///
/// A Man moves and captures only toward the opponent's home row; a King may
/// do either in both directions. Man becomes King exactly once, when a move
/// ends on the farthest row for its side, and never changes back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum PieceKind {
    Man,
    King,
}

impl PieceKind {
    /// Fetches a human-readable name for this [`PieceKind`].
    #[inline(always)]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Man => "man",
            Self::King => "king",
        }
    }
}

/// Represents a checkers piece: a [`Side`] paired with a [`PieceKind`].
///
/// A piece does not know where it stands; the board's occupancy is the
/// single source of truth for placement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Piece {
    side: Side,
    kind: PieceKind,
}

impl Piece {
    /// Creates a new [`Piece`] from the provided [`Side`] and [`PieceKind`].
    #[inline(always)]
    pub const fn new(side: Side, kind: PieceKind) -> Self {
        Self { side, kind }
    }

    /// Creates a new Man of the provided [`Side`].
    #[inline(always)]
    pub const fn man(side: Side) -> Self {
        Self::new(side, PieceKind::Man)
    }

    /// Creates a new King of the provided [`Side`].
    #[inline(always)]
    pub const fn king(side: Side) -> Self {
        Self::new(side, PieceKind::King)
    }

    /// Fetches the [`Side`] of this piece.
    #[inline(always)]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Fetches the [`PieceKind`] of this piece.
    #[inline(always)]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Returns `true` if this piece is a King.
    #[inline(always)]
    pub const fn is_king(&self) -> bool {
        matches!(self.kind, PieceKind::King)
    }

    /// Returns this piece, promoted to King.
    #[inline(always)]
    pub const fn promoted(self) -> Self {
        Self::king(self.side)
    }

    /// Converts this [`Piece`] to a char: `w`/`b` for Men, `W`/`B` for Kings.
    ///
    /// # Example
    /// ```
    /// # use kinglet::{Piece, Side};
    /// assert_eq!(Piece::man(Side::Light).char(), 'w');
    /// assert_eq!(Piece::king(Side::Dark).char(), 'B');
    /// ```
    #[inline(always)]
    pub const fn char(&self) -> char {
        match (self.side, self.kind) {
            (Side::Light, PieceKind::Man) => 'w',
            (Side::Light, PieceKind::King) => 'W',
            (Side::Dark, PieceKind::Man) => 'b',
            (Side::Dark, PieceKind::King) => 'B',
        }
    }

    /// Creates a [`Piece`] from a char, with uppercase meaning King.
    #[inline(always)]
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'w' => Ok(Self::man(Side::Light)),
            'W' => Ok(Self::king(Side::Light)),
            'b' => Ok(Self::man(Side::Dark)),
            'B' => Ok(Self::king(Side::Dark)),
            _ => bail!("Piece must be one of [w, W, b, B]. Found {c:?}"),
        }
    }
}

impl FromStr for Piece {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.chars().count() != 1 {
            bail!("Piece must be a single char, one of [w, W, b, B]. Found {s:?}");
        }

        Self::from_char(s.chars().next().unwrap())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.char())
    }
}

impl fmt::Debug for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.side.name(), self.kind.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_basics() {
        assert_eq!(Side::default(), Side::Dark);
        assert_eq!(Side::Light.forward(), 1);
        assert_eq!(Side::Dark.forward(), -1);
        assert_eq!(Side::Light.promotion_row(), 7);
        assert_eq!(Side::Dark.promotion_row(), 0);
    }

    #[test]
    fn test_piece_chars() {
        for side in Side::all() {
            for piece in [Piece::man(side), Piece::king(side)] {
                assert_eq!(Piece::from_char(piece.char()).unwrap(), piece);
            }
        }

        assert!(Piece::from_char('x').is_err());
        assert!("wk".parse::<Piece>().is_err());
    }

    #[test]
    fn test_promotion_is_idempotent() {
        let piece = Piece::man(Side::Dark);
        let king = piece.promoted();
        assert!(king.is_king());
        assert_eq!(king.promoted(), king);
        assert_eq!(king.side(), Side::Dark);
    }
}
