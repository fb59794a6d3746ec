/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::str::FromStr;

use clap::{builder::PossibleValue, Parser, ValueEnum};

use crate::{CapturePolicy, Piece, Square};

/// A command to be sent to the engine.
#[derive(Debug, Clone, Parser)]
#[command(multicall = true, about, rename_all = "lower")]
pub enum EngineCommand {
    /// Run a benchmark search over a suite of built-in positions.
    Bench {
        /// If set, the benchmarking results will be printed in a well-formatted table.
        #[arg(short, long, default_value = "false")]
        pretty: bool,

        /// Override the default benchmark depth.
        #[arg(short, long, required = false)]
        depth: Option<usize>,
    },

    /// Print a visual representation of the current board state.
    ///
    /// If a piece is selected, its legal destinations are marked with `*`.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position, from the side-to-move's
    /// perspective.
    Eval {
        /// If set, a per-side material breakdown is printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Print the notation string for the current position.
    Fen,

    /// Flips the side-to-move. Equivalent to playing a nullmove.
    Flip,

    /// Search the current position and play the best move found.
    Go {
        /// Number of plies to search.
        depth: Option<usize>,
    },

    /// Shows all legal moves in the current position, or for a specific piece.
    Moves { square: Option<Square> },

    /// Start a new game from the standard setup.
    #[command(alias = "newgame")]
    New,

    /// Count all move paths from the current position at the supplied depth.
    Perft { depth: usize },

    /// Place a piece on the provided square.
    Place { piece: Piece, square: Square },

    /// Display or change whether capturing is compulsory.
    #[command(alias = "policy")]
    Rules {
        /// The capture policy to switch to.
        policy: Option<CapturePolicy>,
    },

    /// Select a piece of the side to move, or move the selected piece.
    ///
    /// Selecting a piece shows its legal destinations; naming one of those
    /// destinations afterwards commits the move. Anything else clears the
    /// selection.
    #[command(alias = "s")]
    Select { square: Square },

    /// Replace the current game with the position described by the provided
    /// notation string, like 'B:Wb1,d1,Kb3:BKf6,a8'.
    #[command(alias = "pos")]
    Setup { fen: String },

    /// Like perft, but also prints the node count below each root move.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Remove the piece at the provided square.
    Take { square: Square },
}

impl FromStr for EngineCommand {
    type Err = clap::Error;

    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

impl ValueEnum for CapturePolicy {
    fn value_variants<'a>() -> &'a [Self] {
        &[CapturePolicy::Optional, CapturePolicy::Mandatory]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        // By default, possible values are the variant's name (case-insensitive)
        let name = format!("{self}");
        let mut value = PossibleValue::new(name);

        // Some variants have additional aliases
        match self {
            CapturePolicy::Optional => value = value.alias("free"),
            CapturePolicy::Mandatory => value = value.aliases(["forced", "strict"]),
        }

        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            "select b3".parse::<EngineCommand>(),
            Ok(EngineCommand::Select { .. })
        ));
        assert!(matches!(
            "go 3".parse::<EngineCommand>(),
            Ok(EngineCommand::Go { depth: Some(3) })
        ));
        assert!(matches!(
            "d".parse::<EngineCommand>(),
            Ok(EngineCommand::Display)
        ));
        assert!(matches!(
            "rules forced".parse::<EngineCommand>(),
            Ok(EngineCommand::Rules {
                policy: Some(CapturePolicy::Mandatory)
            })
        ));

        assert!("select z9".parse::<EngineCommand>().is_err());
        assert!("definitely-not-a-command".parse::<EngineCommand>().is_err());
    }
}
