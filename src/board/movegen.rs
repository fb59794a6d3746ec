/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    collections::{btree_map, BTreeMap},
    fmt,
};

use super::{Position, Side, Square};

/// Governs whether capturing is compulsory.
///
/// Move *generation* always produces both steps and captures; the policy is
/// applied above it, when a [`Game`](crate::Game) answers what is legal for
/// the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CapturePolicy {
    /// Steps remain legal even when a capture is available.
    #[default]
    Optional,

    /// If any of the moving side's pieces can capture, only capturing moves
    /// are legal. Stopping partway through a chain is still allowed.
    Mandatory,
}

impl fmt::Display for CapturePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional => write!(f, "optional"),
            Self::Mandatory => write!(f, "mandatory"),
        }
    }
}

/// A committed move: origin, destination, and the enemy squares captured
/// along the way, in jump order. `captured` is empty for a simple step.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Vec<Square>,
}

impl Move {
    /// Creates a new [`Move`].
    #[inline(always)]
    pub fn new(from: Square, to: Square, captured: Vec<Square>) -> Self {
        Self { from, to, captured }
    }

    /// Returns `true` if this move captures at least one piece.
    #[inline(always)]
    pub fn is_capture(&self) -> bool {
        !self.captured.is_empty()
    }

    /// The squares this move lands on, one per jump.
    ///
    /// Each landing mirrors the current square through the captured one, so
    /// the sequence can be rebuilt from `from` and `captured` alone. The
    /// final landing is `to`.
    pub fn landings(&self) -> Vec<Square> {
        let mut landings = Vec::with_capacity(self.captured.len());
        let mut current = self.from;

        for &captured in &self.captured {
            let row = 2 * captured.row() as i8 - current.row() as i8;
            let col = 2 * captured.col() as i8 - current.col() as i8;
            current = Square::new(row as u8, col as u8);
            landings.push(current);
        }

        debug_assert!(landings.last().copied().unwrap_or(self.to) == self.to);
        landings
    }
}

impl fmt::Display for Move {
    /// Steps print as `b3-a4`; captures as `b3xd5` or `b3xd5xf7` for chains.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_capture() {
            write!(f, "{}", self.from)?;
            for landing in self.landings() {
                write!(f, "x{landing}")?;
            }
            Ok(())
        } else {
            write!(f, "{}-{}", self.from, self.to)
        }
    }
}

/// The legal destinations of a single piece: an ordered mapping from
/// destination [`Square`] to the enemy squares captured to reach it.
///
/// Simple steps map to an empty chain. Destinations are unique; when two
/// distinct chains reach the same square, the one capturing more pieces is
/// kept, and ties keep the first one discovered.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Moves {
    from: Square,
    map: BTreeMap<Square, Vec<Square>>,
}

impl Moves {
    /// Creates an empty [`Moves`] for the piece on `from`.
    #[inline(always)]
    pub fn new(from: Square) -> Self {
        Self {
            from,
            map: BTreeMap::new(),
        }
    }

    /// The square these moves originate from.
    #[inline(always)]
    pub const fn origin(&self) -> Square {
        self.from
    }

    /// Number of distinct destinations.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if there are no destinations.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if `destination` is reachable.
    #[inline(always)]
    pub fn contains(&self, destination: Square) -> bool {
        self.map.contains_key(&destination)
    }

    /// The capture chain for `destination`, if it is reachable.
    #[inline(always)]
    pub fn captures_for(&self, destination: Square) -> Option<&[Square]> {
        self.map.get(&destination).map(Vec::as_slice)
    }

    /// Returns `true` if any destination captures at least one piece.
    #[inline(always)]
    pub fn has_capture(&self) -> bool {
        self.map.values().any(|chain| !chain.is_empty())
    }

    /// Iterates over `(destination, captured)` pairs in square order.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (Square, &[Square])> + '_ {
        self.map.iter().map(|(sq, chain)| (*sq, chain.as_slice()))
    }

    /// Iterates over the destination squares in square order.
    #[inline(always)]
    pub fn destinations(&self) -> impl Iterator<Item = Square> + '_ {
        self.map.keys().copied()
    }

    /// Builds the committed-move record for `destination`, if reachable.
    #[inline(always)]
    pub fn to_move(&self, destination: Square) -> Option<Move> {
        self.map
            .get(&destination)
            .map(|chain| Move::new(self.from, destination, chain.clone()))
    }

    /// Drops every destination that does not capture.
    #[inline(always)]
    pub fn retain_captures(&mut self) {
        self.map.retain(|_, chain| !chain.is_empty());
    }

    /// Records `destination`, keeping the existing entry if it already
    /// captures at least as many pieces.
    fn insert(&mut self, destination: Square, captured: Vec<Square>) {
        match self.map.entry(destination) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(captured);
            }
            btree_map::Entry::Occupied(mut entry) => {
                if captured.len() > entry.get().len() {
                    entry.insert(captured);
                }
            }
        }
    }
}

impl Position {
    /// Computes every destination the piece on `square` can move to, with the
    /// enemy squares captured on the way there.
    ///
    /// A Man considers only its side's forward row direction; a King
    /// considers both. In each direction, an adjacent empty square is a step,
    /// and an adjacent enemy with an empty square beyond it is a jump. After
    /// a jump lands, further jumps are probed from the landing square in both
    /// lateral directions, keeping the chain's row direction; every landing
    /// along the way is itself a destination, carrying the captures
    /// accumulated so far. Nothing is removed from the board during
    /// generation, and a square already jumped in a chain cannot be jumped
    /// again.
    ///
    /// An empty square (or an empty result) is not an error; an immobile
    /// piece simply has no destinations.
    pub fn moves_from(&self, square: Square) -> Moves {
        let mut moves = Moves::new(square);
        let Some(piece) = self.piece_at(square) else {
            return moves;
        };

        let side = piece.side();
        let king_rows = [1, -1];
        let man_row = [side.forward()];
        let verticals: &[i8] = if piece.is_king() {
            &king_rows
        } else {
            &man_row
        };

        for &dr in verticals {
            for dc in [-1, 1] {
                let Some(step) = square.offset(dr, dc) else {
                    continue;
                };

                match self.piece_at(step) {
                    // Adjacent empty square: a simple step
                    None => moves.insert(step, Vec::new()),

                    // Adjacent enemy: a jump, if the landing square is free
                    Some(other) if other.side() != side => {
                        let Some(landing) = square.offset(2 * dr, 2 * dc) else {
                            continue;
                        };

                        if self.piece_at(landing).is_none() {
                            let chain = vec![step];
                            moves.insert(landing, chain.clone());
                            self.extend_jumps(side, landing, dr, chain, &mut moves);
                        }
                    }

                    // Adjacent friend: blocked
                    Some(_) => {}
                }
            }
        }

        moves
    }

    /// Probes for further jumps from `from`, continuing a capture chain that
    /// travels in row direction `dr` and has already captured `chain`.
    fn extend_jumps(&self, side: Side, from: Square, dr: i8, chain: Vec<Square>, moves: &mut Moves) {
        for dc in [-1, 1] {
            let Some(mid) = from.offset(dr, dc) else {
                continue;
            };
            let Some(landing) = from.offset(2 * dr, 2 * dc) else {
                continue;
            };

            let capturable = self
                .piece_at(mid)
                .is_some_and(|victim| victim.side() != side)
                && !chain.contains(&mid);

            if capturable && self.piece_at(landing).is_none() {
                let mut extended = chain.clone();
                extended.push(mid);
                moves.insert(landing, extended.clone());
                self.extend_jumps(side, landing, dr, extended, moves);
            }
        }
    }

    /// Returns `true` if any of `side`'s pieces has at least one destination.
    #[inline(always)]
    pub fn side_has_moves(&self, side: Side) -> bool {
        self.pieces_of(side)
            .any(|(square, _)| !self.moves_from(square).is_empty())
    }

    /// Returns `true` if any of `side`'s pieces can capture.
    #[inline(always)]
    pub fn side_has_capture(&self, side: Side) -> bool {
        self.pieces_of(side)
            .any(|(square, _)| self.moves_from(square).has_capture())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, PieceKind};

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_man_steps_forward_only() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::man(Side::Light));

        let moves = pos.moves_from(sq("d5"));
        let dests: Vec<_> = moves.destinations().collect();
        assert_eq!(dests, vec![sq("c6"), sq("e6")]);
        assert!(!moves.has_capture());
    }

    #[test]
    fn test_king_steps_all_four_diagonals() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::king(Side::Light));

        let moves = pos.moves_from(sq("d5"));
        for dest in ["c4", "e4", "c6", "e6"] {
            assert!(moves.contains(sq(dest)), "king should reach {dest}");
        }
        assert_eq!(moves.len(), 4);
    }

    #[test]
    fn test_friendly_piece_blocks() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::man(Side::Light));
        pos.place(sq("c6"), Piece::man(Side::Light));

        let moves = pos.moves_from(sq("d5"));
        assert_eq!(moves.destinations().collect::<Vec<_>>(), vec![sq("e6")]);
    }

    #[test]
    fn test_single_jump() {
        let mut pos = Position::new();
        pos.place(sq("b3"), Piece::man(Side::Light));
        pos.place(sq("c4"), Piece::man(Side::Dark));

        let moves = pos.moves_from(sq("b3"));
        assert_eq!(moves.captures_for(sq("d5")), Some([sq("c4")].as_slice()));

        // The step to the other side is still offered
        assert!(moves.contains(sq("a4")));
    }

    #[test]
    fn test_two_jump_chain_lists_captures_in_order() {
        // Dark man at c6; Light men at d5 and f3, with both landing
        // squares free: c6 x e4 x g2
        let mut pos = Position::new();
        pos.place(sq("c6"), Piece::man(Side::Dark));
        pos.place(sq("d5"), Piece::man(Side::Light));
        pos.place(sq("f3"), Piece::man(Side::Light));

        let moves = pos.moves_from(sq("c6"));

        // The intermediate landing is a destination of its own...
        assert_eq!(moves.captures_for(sq("e4")), Some([sq("d5")].as_slice()));

        // ...and so is the square past both victims, captures in jump order
        assert_eq!(
            moves.captures_for(sq("g2")),
            Some([sq("d5"), sq("f3")].as_slice())
        );
    }

    #[test]
    fn test_chain_branches_laterally() {
        // After jumping d5, the Dark man on c6 can continue over d3 or f3
        let mut pos = Position::new();
        pos.place(sq("c6"), Piece::man(Side::Dark));
        pos.place(sq("d5"), Piece::man(Side::Light));
        pos.place(sq("d3"), Piece::man(Side::Light));
        pos.place(sq("f3"), Piece::man(Side::Light));

        let moves = pos.moves_from(sq("c6"));
        assert_eq!(
            moves.captures_for(sq("c2")),
            Some([sq("d5"), sq("d3")].as_slice())
        );
        assert_eq!(
            moves.captures_for(sq("g2")),
            Some([sq("d5"), sq("f3")].as_slice())
        );
    }

    #[test]
    fn test_longer_chain_wins_shared_destination() {
        let mut moves = Moves::new(sq("c6"));
        moves.insert(sq("g2"), vec![sq("f3")]);
        moves.insert(sq("g2"), vec![sq("d5"), sq("f3")]);
        assert_eq!(
            moves.captures_for(sq("g2")),
            Some([sq("d5"), sq("f3")].as_slice())
        );

        // Equal length keeps the first chain discovered
        moves.insert(sq("g2"), vec![sq("d5"), sq("d3")]);
        assert_eq!(
            moves.captures_for(sq("g2")),
            Some([sq("d5"), sq("f3")].as_slice())
        );
    }

    #[test]
    fn test_king_captures_backward() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::king(Side::Light));
        pos.place(sq("c4"), Piece::man(Side::Dark));

        let moves = pos.moves_from(sq("d5"));
        assert_eq!(moves.captures_for(sq("b3")), Some([sq("c4")].as_slice()));
    }

    #[test]
    fn test_man_does_not_capture_backward() {
        let mut pos = Position::new();
        pos.place(sq("d5"), Piece::man(Side::Light));
        pos.place(sq("c4"), Piece::man(Side::Dark));

        let moves = pos.moves_from(sq("d5"));
        assert!(!moves.contains(sq("b3")));
    }

    #[test]
    fn test_move_display() {
        let step = Move::new(sq("b3"), sq("a4"), vec![]);
        assert_eq!(step.to_string(), "b3-a4");

        let chain = Move::new(sq("c6"), sq("g2"), vec![sq("d5"), sq("f3")]);
        assert_eq!(chain.to_string(), "c6xe4xg2");
        assert_eq!(chain.landings(), vec![sq("e4"), sq("g2")]);
    }

    #[test]
    fn test_promotion_row_ends_a_man_chain() {
        // The jump lands on rank 1, Dark's farthest row; there is no row
        // beyond it, so the chain stops there
        let mut pos = Position::new();
        pos.place(sq("d3"), Piece::man(Side::Dark));
        pos.place(sq("c2"), Piece::man(Side::Light));
        pos.place(sq("a2"), Piece::man(Side::Light));

        let moves = pos.moves_from(sq("d3"));
        assert_eq!(moves.captures_for(sq("b1")), Some([sq("c2")].as_slice()));

        // Generation never mutates the board
        assert_eq!(pos.piece_at(sq("d3")).map(|p| p.kind()), Some(PieceKind::Man));
    }
}
