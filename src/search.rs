/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{Evaluator, Game, Move, Score, Side};

/// Default number of plies to search when none is requested.
pub const DEFAULT_DEPTH: usize = 5;

/// The result of a search: the best move found, the position it leads to,
/// its score, and the total nodes visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Number of nodes visited.
    pub nodes: u64,

    /// Best move found during the search, if the root had any.
    pub bestmove: Option<Move>,

    /// The position after `bestmove` is made.
    pub best: Option<Game>,

    /// Evaluation of the line starting with `bestmove`.
    pub score: Score,
}

impl Default for SearchResult {
    /// A default search result should initialize to a *very bad* value,
    /// since there isn't a move to play.
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            best: None,
            score: -Score::INF,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Number of plies to search.
    pub depth: usize,

    /// Whether to cut off siblings once `alpha >= beta`.
    ///
    /// Pruning never changes the score or the move chosen; it only reduces
    /// the number of nodes visited. Disabling it exists for exactly that
    /// comparison.
    pub pruning: bool,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            pruning: true,
        }
    }
}

/// Executes a minimax search with alpha-beta pruning on the provided game.
///
/// The side to move at the root is the maximizing side; every position is
/// scored from its perspective. The search is synchronous, single-threaded,
/// and always runs to its full depth; there is no cancellation.
///
/// Every candidate move is explored on an independent copy of the game, so
/// no branch can ever corrupt the position a sibling is exploring.
pub struct Search<'a> {
    /// The game to search on. Never mutated; lines of play are simulated
    /// on copies.
    game: &'a Game,

    /// The side the search is choosing a move for.
    side: Side,

    /// Nodes visited so far.
    nodes: u64,

    /// Move chosen at the root so far.
    bestmove: Option<Move>,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute on the provided
    /// [`Game`], choosing a move for its side to move.
    #[inline(always)]
    pub fn new(game: &'a Game, config: SearchConfig) -> Self {
        Self {
            game,
            side: game.side_to_move(),
            nodes: 0,
            bestmove: None,
            config,
        }
    }

    /// Start the search, returning its result once the full depth has been
    /// explored.
    ///
    /// If the root has no legal moves (the side to move has already lost),
    /// the result carries no move and no position; callers should check
    /// [`Game::winner`] before searching and must treat an empty result as
    /// "no move available".
    pub fn start(mut self) -> SearchResult {
        let (score, best) = self.minimax(*self.game, self.config.depth, -Score::INF, Score::INF);

        SearchResult {
            nodes: self.nodes,
            bestmove: self.bestmove.take(),
            best,
            score,
        }
    }

    /// Recursively evaluates `game` to `depth` plies, returning the value of
    /// the node and the position reached by the move that attains it.
    ///
    /// The maximizing player is [`Search::side`]; the node maximizes when it
    /// is that side's turn and minimizes otherwise. The first move to
    /// strictly improve on the running value is kept, so ties resolve to the
    /// earliest candidate in generation order.
    fn minimax(
        &mut self,
        game: Game,
        depth: usize,
        mut alpha: Score,
        mut beta: Score,
    ) -> (Score, Option<Game>) {
        self.nodes += 1;

        // Leaf: out of depth, or the game is already decided
        if depth == 0 || game.winner().is_some() {
            return (Evaluator::new(&game).eval_for(self.side), None);
        }

        let maximizing = game.side_to_move() == self.side;
        let mut value = if maximizing { -Score::INF } else { Score::INF };
        let mut best = None;

        for mv in game.legal_moves() {
            // Simulate on a copy; `game` itself stays untouched for the
            // remaining siblings
            let child = game.with_move_made(&mv);
            let (reply, _) = self.minimax(child, depth - 1, alpha, beta);

            if maximizing {
                if reply > value {
                    value = reply;
                    best = Some(child);
                    if depth == self.config.depth {
                        self.bestmove = Some(mv);
                    }
                }
                alpha = alpha.max(value);
            } else {
                if reply < value {
                    value = reply;
                    best = Some(child);
                }
                beta = beta.min(value);
            }

            if self.config.pruning && alpha >= beta {
                break;
            }
        }

        (value, best)
    }
}
