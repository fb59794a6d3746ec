/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{Game, PieceKind, Position, Side};

/// The value of a position, in units of one Man.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub(crate) i32);

impl Score {
    /// Largest possible score ever achievable.
    ///
    /// Used to initialize alpha/beta bounds; no evaluation reaches it.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of an equal position.
    pub const DRAW: Self = Self(0);
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);

impl std::ops::Neg for Score {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Returns the material value of the provided [`PieceKind`].
///
/// A King is worth two Men: it covers twice the directions.
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Man => 1,
        PieceKind::King => 2,
    }
}

/// Encapsulates the logic of scoring a checkers position.
///
/// The score is pure material: `(men + 2*kings)` for one side minus the
/// same for the other. A pure function of the position: evaluating the
/// same position twice always yields the same score.
#[derive(Debug, Clone)]
pub struct Evaluator<'a> {
    /// The game whose position to evaluate.
    game: &'a Game,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] for the provided game.
    #[inline(always)]
    pub const fn new(game: &'a Game) -> Self {
        Self { game }
    }

    /// Evaluate this position from the side-to-move's perspective.
    ///
    /// A positive number is good for the side to move; zero is equal.
    #[inline(always)]
    pub fn eval(self) -> Score {
        self.eval_for(self.game.side_to_move())
    }

    /// Evaluate this position from `side`'s perspective.
    ///
    /// A positive number is good for `side`, a negative one for its
    /// opponent.
    #[inline(always)]
    pub fn eval_for(&self, side: Side) -> Score {
        let position = self.game.position();
        Score(material(position, side) - material(position, side.opponent()))
    }
}

/// Counts the material value of `side`'s pieces on the board.
#[inline(always)]
fn material(position: &Position, side: Side) -> i32 {
    position.men(side) as i32 * value_of(PieceKind::Man)
        + position.kings(side) as i32 * value_of(PieceKind::King)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startpos_is_equal() {
        let game = Game::default();
        assert_eq!(Evaluator::new(&game).eval_for(Side::Light), Score::DRAW);
        assert_eq!(Evaluator::new(&game).eval_for(Side::Dark), Score::DRAW);
    }

    #[test]
    fn test_kings_count_double() {
        let game = Game::from_fen("W:Wb1,Kd1:Bb7").unwrap();
        let evaluator = Evaluator::new(&game);

        assert_eq!(evaluator.eval_for(Side::Light), Score(2));
        assert_eq!(evaluator.eval_for(Side::Dark), Score(-2));
    }

    #[test]
    fn test_eval_is_pure() {
        let game = Game::from_fen("B:Wb1,Kd1,f3:BKb7,a6").unwrap();
        let evaluator = Evaluator::new(&game);

        let first = evaluator.eval_for(Side::Dark);
        let second = evaluator.eval_for(Side::Dark);
        assert_eq!(first, second);
    }

    #[test]
    fn test_perspectives_are_symmetric() {
        let game = Game::from_fen("W:Wb1,d1:BKb7").unwrap();
        let evaluator = Evaluator::new(&game);

        assert_eq!(
            evaluator.eval_for(Side::Light),
            -evaluator.eval_for(Side::Dark)
        );
    }
}
