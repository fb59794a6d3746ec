/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::{self, Write};

use super::{Piece, PieceKind, Side, Square};

/// Notation string for the standard starting setup: three rows of Men per
/// side on the dark squares, Dark to move.
pub const FEN_STARTPOS: &str =
    "B:Wb1,d1,f1,h1,a2,c2,e2,g2,b3,d3,f3,h3:Ba6,c6,e6,g6,b7,d7,f7,h7,a8,c8,e8,g8";

/// Number of pieces each side starts the game with.
pub const NUM_PIECES: u8 = 12;

/// Placement of every piece on the board, plus per-side piece and King
/// counters that are kept consistent with occupancy on every mutation.
///
/// A [`Position`](crate::Position) is pure board data: it does not know whose
/// turn it is. See [`Game`](crate::Game) for turn state.
///
/// This type is plain value data and is cheap to copy, which is what keeps
/// search branches isolated from one another: simulating a move on a copy can
/// never corrupt the position a sibling branch is exploring.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// What stands on each square, indexed by [`Square::index`].
    board: [Option<Piece>; Square::COUNT],

    /// Live piece count per side, Kings included.
    pieces: [u8; Side::COUNT],

    /// Live King count per side.
    kings: [u8; Side::COUNT],
}

impl Position {
    /// Creates a new, empty [`Position`].
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            board: [None; Square::COUNT],
            pieces: [0; Side::COUNT],
            kings: [0; Side::COUNT],
        }
    }

    /// Creates a [`Position`] with the standard starting setup: twelve Men
    /// per side on the dark squares of the three rows nearest each player.
    pub fn standard() -> Self {
        let mut pos = Self::new();

        for square in Square::iter().filter(Square::is_playable) {
            if square.row() < 3 {
                pos.place(square, Piece::man(Side::Light));
            } else if square.row() > 4 {
                pos.place(square, Piece::man(Side::Dark));
            }
        }

        pos
    }

    /// Fetches the piece standing on `square`, if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board[square.index()]
    }

    /// Places `piece` on `square`, updating the counters.
    ///
    /// The square must be playable and empty; this is debug-asserted, not
    /// checked at runtime.
    #[inline(always)]
    pub fn place(&mut self, square: Square, piece: Piece) {
        debug_assert!(square.is_playable(), "{square} is not a playable square");
        debug_assert!(self.board[square.index()].is_none(), "{square} is occupied");

        self.board[square.index()] = Some(piece);
        self.pieces[piece.side().index()] += 1;
        if piece.is_king() {
            self.kings[piece.side().index()] += 1;
        }
    }

    /// Removes and returns the piece on `square`, if any, updating the counters.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        let piece = self.board[square.index()].take()?;

        self.pieces[piece.side().index()] -= 1;
        if piece.is_king() {
            self.kings[piece.side().index()] -= 1;
        }

        Some(piece)
    }

    /// Commits a move: relocates the piece on `from` to `to`, promotes a Man
    /// ending on its side's farthest row, and removes every square in
    /// `captured` from the board with the matching counter decrements.
    ///
    /// `to` and `captured` must be a destination/chain pair produced by
    /// [`Position::moves_from`](crate::Position::moves_from) for the piece on
    /// `from` in this exact position; anything else is undefined. This is the
    /// only place counters change during play.
    pub fn apply(&mut self, from: Square, to: Square, captured: &[Square]) {
        let Some(mut piece) = self.board[from.index()].take() else {
            debug_assert!(false, "apply called on empty square {from}");
            return;
        };

        // Promotion happens exactly once, on the move that reaches the row
        if piece.kind() == PieceKind::Man && to.row() == piece.side().promotion_row() {
            piece = piece.promoted();
            self.kings[piece.side().index()] += 1;
        }

        debug_assert!(self.board[to.index()].is_none(), "{to} is occupied");
        self.board[to.index()] = Some(piece);

        for &square in captured {
            let victim = self.take(square);
            debug_assert!(
                victim.is_some_and(|v| v.side() == piece.side().opponent()),
                "captured square {square} did not hold an enemy piece"
            );
        }
    }

    /// Live piece count for `side`, Kings included.
    #[inline(always)]
    pub const fn pieces(&self, side: Side) -> u8 {
        self.pieces[side.index()]
    }

    /// Live King count for `side`.
    #[inline(always)]
    pub const fn kings(&self, side: Side) -> u8 {
        self.kings[side.index()]
    }

    /// Live Man count for `side`.
    #[inline(always)]
    pub const fn men(&self, side: Side) -> u8 {
        self.pieces[side.index()] - self.kings[side.index()]
    }

    /// Recomputes the piece and King counters from occupancy.
    ///
    /// Returns `(pieces, kings)` indexed by [`Side::index`]. The stored
    /// counters must always equal this recount; test harnesses assert it
    /// after every committed move.
    pub fn recount(&self) -> ([u8; Side::COUNT], [u8; Side::COUNT]) {
        let mut pieces = [0; Side::COUNT];
        let mut kings = [0; Side::COUNT];

        for piece in self.board.iter().flatten() {
            pieces[piece.side().index()] += 1;
            if piece.is_king() {
                kings[piece.side().index()] += 1;
            }
        }

        (pieces, kings)
    }

    /// Returns an iterator over all of `side`'s pieces, in square order.
    #[inline(always)]
    pub fn pieces_of(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(move |square| {
            self.piece_at(square)
                .filter(|piece| piece.side() == side)
                .map(|piece| (square, piece))
        })
    }

    /// Determines the winner of this position, if there is one.
    ///
    /// A side loses when it has no pieces left, or when none of its pieces
    /// has a legal destination. Mobility is checked on the raw move mapping,
    /// independent of any capture policy.
    pub fn winner(&self) -> Option<Side> {
        for side in Side::all() {
            if self.pieces(side) == 0 || !self.side_has_moves(side) {
                return Some(side.opponent());
            }
        }

        None
    }

    /// Renders this position as a text grid, marking each square in
    /// `highlights` that is not occupied with a `*`.
    ///
    /// Rank 8 (Dark's home) is printed at the top.
    pub fn diagram(&self, highlights: &[Square]) -> String {
        let mut out = String::with_capacity(256);

        for row in (0..Square::SIZE).rev() {
            let _ = write!(out, "{}|", row + 1);
            for col in 0..Square::SIZE {
                let square = Square::new(row, col);
                let glyph = match self.piece_at(square) {
                    Some(piece) => piece.char(),
                    None if highlights.contains(&square) => '*',
                    None => '.',
                };
                let _ = write!(out, " {glyph} ");
            }
            out.push('\n');
        }

        out.push_str(" +------------------------\n");
        out.push_str("   a  b  c  d  e  f  g  h");

        out
    }
}

impl Default for Position {
    /// A default [`Position`] is the standard starting setup.
    #[inline(always)]
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagram(&[]))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.diagram(&[]))?;
        write!(
            f,
            "light: {} ({}K), dark: {} ({}K)",
            self.pieces(Side::Light),
            self.kings(Side::Light),
            self.pieces(Side::Dark),
            self.kings(Side::Dark),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn assert_counters_consistent(pos: &Position) {
        let (pieces, kings) = pos.recount();
        for side in Side::all() {
            assert_eq!(pos.pieces(side), pieces[side.index()]);
            assert_eq!(pos.kings(side), kings[side.index()]);
        }
    }

    #[test]
    fn test_standard_setup() {
        let pos = Position::standard();

        for side in Side::all() {
            assert_eq!(pos.pieces(side), NUM_PIECES);
            assert_eq!(pos.kings(side), 0);
        }
        assert_counters_consistent(&pos);

        // Every occupied square is playable
        for square in Square::iter() {
            if pos.piece_at(square).is_some() {
                assert!(square.is_playable());
            }
        }
    }

    #[test]
    fn test_apply_step() {
        let mut pos = Position::standard();
        pos.apply(sq("b3"), sq("a4"), &[]);

        assert!(pos.piece_at(sq("b3")).is_none());
        assert_eq!(pos.piece_at(sq("a4")), Some(Piece::man(Side::Light)));
        assert_counters_consistent(&pos);
    }

    #[test]
    fn test_apply_capture_updates_counters() {
        let mut pos = Position::new();
        pos.place(sq("b3"), Piece::man(Side::Light));
        pos.place(sq("c4"), Piece::man(Side::Dark));
        pos.place(sq("g8"), Piece::king(Side::Dark));

        pos.apply(sq("b3"), sq("d5"), &[sq("c4")]);

        assert_eq!(pos.piece_at(sq("d5")), Some(Piece::man(Side::Light)));
        assert!(pos.piece_at(sq("c4")).is_none());
        assert_eq!(pos.pieces(Side::Dark), 1);
        assert_eq!(pos.kings(Side::Dark), 1);
        assert_counters_consistent(&pos);
    }

    #[test]
    fn test_promotion_happens_exactly_once() {
        let mut pos = Position::new();
        pos.place(sq("b7"), Piece::man(Side::Light));
        pos.place(sq("a6"), Piece::man(Side::Dark));

        // Not yet: the move ends short of the farthest row
        assert!(!pos.piece_at(sq("b7")).unwrap().is_king());

        pos.apply(sq("b7"), sq("c8"), &[]);
        assert_eq!(pos.piece_at(sq("c8")), Some(Piece::king(Side::Light)));
        assert_eq!(pos.kings(Side::Light), 1);

        // A King returning to the farthest row must not bump the counter again
        pos.apply(sq("c8"), sq("d7"), &[]);
        pos.apply(sq("d7"), sq("e8"), &[]);
        assert_eq!(pos.kings(Side::Light), 1);
        assert_counters_consistent(&pos);
    }

    #[test]
    fn test_winner_on_no_pieces() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::man(Side::Light));

        assert_eq!(pos.winner(), Some(Side::Light));
    }

    #[test]
    fn test_winner_on_no_mobility() {
        // The Dark man's only forward diagonal is blocked by a Light man
        // whose own landing square would be off the board
        let mut pos = Position::new();
        pos.place(sq("a2"), Piece::man(Side::Dark));
        pos.place(sq("b1"), Piece::man(Side::Light));

        assert_eq!(pos.winner(), Some(Side::Light));
    }

    #[test]
    fn test_no_winner_at_start() {
        assert_eq!(Position::standard().winner(), None);
    }
}
