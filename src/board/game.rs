/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use anyhow::{bail, Context, Result};

use super::{CapturePolicy, Move, Moves, Piece, PieceKind, Position, Side, Square};

/// A game of checkers.
///
/// This type pairs a [`Position`] with the side to move and the active
/// [`CapturePolicy`], and is the primary type for playing: the basic methods
/// you're probably looking for are [`Game::from_fen`], [`Game::legal_moves`],
/// [`Game::make_move`], and [`Game::winner`].
///
/// Like [`Position`], a [`Game`] is cheap to copy; simulated lines of play
/// run on copies via [`Game::with_move_made`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Game {
    /// Piece placement and counters.
    position: Position,

    /// The side whose turn it is.
    side_to_move: Side,

    /// Whether capturing is compulsory. Not part of position identity.
    policy: CapturePolicy,
}

impl Game {
    /// Creates a new [`Game`] from the provided [`Position`] and side to move.
    #[inline(always)]
    pub const fn new(position: Position, side_to_move: Side) -> Self {
        Self {
            position,
            side_to_move,
            policy: CapturePolicy::Optional,
        }
    }

    /// Creates a new [`Game`] from a notation string.
    ///
    /// The format is `<stm>:W<squares>:B<squares>`, where `<stm>` is `W` or
    /// `B`, `W` lists Light's pieces and `B` Dark's, squares are algebraic,
    /// and Kings carry a `K` prefix:
    ///
    /// ```
    /// # use kinglet::Game;
    /// let game = Game::from_fen("B:Wb1,d1,Kb3:BKf6,a8").unwrap();
    /// assert_eq!(game.to_fen(), "B:Wb1,d1,Kb3:BKf6,a8");
    /// ```
    ///
    /// `to_fen` lists each side's pieces in board order, from `a1` upward.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut parts = fen.trim().split(':');

        let stm = parts.next().context("Notation cannot be empty")?.trim();
        let stm = match stm.chars().next() {
            Some(c) if stm.chars().count() == 1 => Side::from_char(c)?,
            _ => bail!("Notation must start with the side to move, 'W' or 'B'. Got {stm:?}"),
        };

        let mut position = Position::new();
        for _ in 0..2 {
            let group = parts
                .next()
                .context("Notation must have a 'W' group and a 'B' group")?
                .trim();

            let mut chars = group.chars();
            let side = match chars.next() {
                Some(c) => Side::from_char(c)?,
                None => bail!("Piece group cannot be empty; expected 'W...' or 'B...'"),
            };

            let squares = chars.as_str();
            for token in squares.split(',').filter(|t| !t.trim().is_empty()) {
                let token = token.trim();
                let (kind, square) = match token.strip_prefix(['K', 'k']) {
                    Some(rest) => (PieceKind::King, rest),
                    None => (PieceKind::Man, token),
                };

                let square = Square::from_str(square)
                    .with_context(|| format!("Invalid square in piece group: {token:?}"))?;

                if !square.is_playable() {
                    bail!("{square} is a light square and cannot hold a piece");
                }

                if position.piece_at(square).is_some() {
                    bail!("{square} is listed twice");
                }

                position.place(square, Piece::new(side, kind));
            }
        }

        if parts.next().is_some() {
            bail!("Notation has trailing fields; expected exactly '<stm>:W...:B...'");
        }

        Ok(Self::new(position, stm))
    }

    /// Generates the notation string for the current state.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(96);
        let _ = write!(fen, "{}", self.side_to_move.to_char().to_ascii_uppercase());

        for side in Side::all() {
            let _ = write!(fen, ":{}", side.to_char().to_ascii_uppercase());
            for (i, (square, piece)) in self.position.pieces_of(side).enumerate() {
                if i > 0 {
                    fen.push(',');
                }
                if piece.is_king() {
                    fen.push('K');
                }
                let _ = write!(fen, "{square}");
            }
        }

        fen
    }

    /// Fetch the internal [`Position`] of this [`Game`].
    #[inline(always)]
    pub const fn position(&self) -> &Position {
        &self.position
    }

    /// Fetch the side whose turn it is.
    #[inline(always)]
    pub const fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    /// Toggles the side to move. This is equivalent to playing a nullmove.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Fetch the active [`CapturePolicy`].
    #[inline(always)]
    pub const fn capture_policy(&self) -> CapturePolicy {
        self.policy
    }

    /// Sets the [`CapturePolicy`] for this game.
    #[inline(always)]
    pub fn set_capture_policy(&mut self, policy: CapturePolicy) {
        self.policy = policy;
    }

    /// Determines the winner, if there is one. See [`Position::winner`].
    #[inline(always)]
    pub fn winner(&self) -> Option<Side> {
        self.position.winner()
    }

    /// Computes the legal destinations of the piece on `square`, with the
    /// capture policy applied for that piece's side.
    ///
    /// Under [`CapturePolicy::Mandatory`], if any of the side's pieces can
    /// capture, non-capturing destinations are dropped, possibly leaving
    /// this piece with none.
    pub fn legal_moves_from(&self, square: Square) -> Moves {
        let mut moves = self.position.moves_from(square);

        if self.policy == CapturePolicy::Mandatory {
            if let Some(piece) = self.position.piece_at(square) {
                if self.position.side_has_capture(piece.side()) {
                    moves.retain_captures();
                }
            }
        }

        moves
    }

    /// Computes every legal move for the side to move, ordered by origin
    /// square and then by destination.
    ///
    /// An empty list means the side to move has lost; see [`Game::winner`].
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut all = Vec::new();

        for (square, _) in self.position.pieces_of(self.side_to_move) {
            let moves = self.legal_moves_from(square);
            all.extend(moves.destinations().filter_map(|dest| moves.to_move(dest)));
        }

        all
    }

    /// Applies the provided [`Move`]: commits the relocation, captures, and
    /// any promotion to the board, then passes the turn to the opponent.
    ///
    /// The move must have been produced by [`Game::legal_moves`] (or
    /// [`Game::legal_moves_from`]) on this exact state; no legality check is
    /// performed here.
    #[inline(always)]
    pub fn make_move(&mut self, mv: &Move) {
        debug_assert!(self
            .position
            .piece_at(mv.from)
            .is_some_and(|p| p.side() == self.side_to_move));

        self.position.apply(mv.from, mv.to, &mv.captured);
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Copies `self` and returns the [`Game`] after the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: &Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Places `piece` on `square`, if the square is playable and empty.
    ///
    /// This edits the board directly, outside of normal play.
    pub fn place(&mut self, square: Square, piece: Piece) -> Result<()> {
        if !square.is_playable() {
            bail!("{square} is a light square and cannot hold a piece");
        }
        if let Some(occupant) = self.position.piece_at(square) {
            bail!("{square} is already occupied by a {occupant:?}");
        }

        self.position.place(square, piece);
        Ok(())
    }

    /// Removes and returns the piece on `square`, if any.
    ///
    /// This edits the board directly, outside of normal play.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.position.take(square)
    }

    /// Recursively plays all legal moves until the supplied depth is reached,
    /// returning the total number of move paths.
    ///
    /// Respects the active capture policy. A side with no moves contributes
    /// zero paths, so decided positions count nothing below them.
    pub fn perft(&self, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }

        self.legal_moves()
            .iter()
            .map(|mv| self.with_move_made(mv).perft(depth - 1))
            .sum()
    }

    /// Renders the board as a text grid, marking empty squares in
    /// `highlights` with a `*`. See [`Position::diagram`].
    #[inline(always)]
    pub fn diagram(&self, highlights: &[Square]) -> String {
        self.position.diagram(highlights)
    }
}

impl Default for Game {
    /// A default [`Game`] is the standard starting setup, Dark to move,
    /// captures optional.
    #[inline(always)]
    fn default() -> Self {
        Self::new(Position::standard(), Side::default())
    }
}

impl FromStr for Game {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_fen(s)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.position)?;
        writeln!(f)?;
        writeln!(f, "Side to move: {}", self.side_to_move)?;
        write!(f, "Notation: {}", self.to_fen())
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{:?}]", self.to_fen(), self.policy)
    }
}
