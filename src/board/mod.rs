/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// A playable game: position, side to move, capture policy.
mod game;

/// Legal move generation, capture chains, and the capture policy.
mod movegen;

/// Sides, piece kinds, and pieces.
mod piece;

/// Piece placement, counters, and the apply/capture primitive.
mod position;

/// Squares of the board.
mod square;

pub use game::*;
pub use movegen::*;
pub use piece::*;
pub use position::*;
pub use square::*;
