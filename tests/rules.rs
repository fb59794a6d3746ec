/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use kinglet::{
    CapturePolicy, Game, Move, Search, SearchConfig, Side, Square, FEN_STARTPOS, NUM_PIECES,
};

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

/// Picks the move of the piece on `from` that lands on `to`, which must be legal.
fn pick(game: &Game, from: &str, to: &str) -> Move {
    game.legal_moves_from(sq(from))
        .to_move(sq(to))
        .unwrap_or_else(|| panic!("{from} -> {to} should be legal in {}", game.to_fen()))
}

/// Asserts that the stored counters match a live recount of the board.
fn assert_counters_consistent(game: &Game) {
    let (pieces, kings) = game.position().recount();
    for side in Side::all() {
        assert_eq!(
            game.position().pieces(side),
            pieces[side.index()],
            "piece counter drifted for {side} in {}",
            game.to_fen()
        );
        assert_eq!(
            game.position().kings(side),
            kings[side.index()],
            "king counter drifted for {side} in {}",
            game.to_fen()
        );
    }
}

#[test]
fn test_counters_track_a_played_line() {
    let mut game = Game::default();
    assert_counters_consistent(&game);

    // A short opening in which both sides trade one man
    for (from, to) in [("c6", "b5"), ("d3", "c4"), ("b5", "d3"), ("c2", "e4")] {
        let mv = pick(&game, from, to);
        game.make_move(&mv);
        assert_counters_consistent(&game);
    }

    assert_eq!(game.position().pieces(Side::Light), NUM_PIECES - 1);
    assert_eq!(game.position().pieces(Side::Dark), NUM_PIECES - 1);
    assert_eq!(game.position().piece_at(sq("e4")).unwrap().side(), Side::Light);
    assert!(game.position().piece_at(sq("d3")).is_none());
    assert_eq!(game.side_to_move(), Side::Dark);
    assert_eq!(game.winner(), None);
}

#[test]
fn test_promotion_lands_with_the_move_that_reaches_the_row() {
    let mut game = Game::from_fen("W:Wb7:Ba6,g6").unwrap();

    assert!(!game.position().piece_at(sq("b7")).unwrap().is_king());

    let mv = pick(&game, "b7", "c8");
    game.make_move(&mv);

    assert!(game.position().piece_at(sq("c8")).unwrap().is_king());
    assert_eq!(game.position().kings(Side::Light), 1);
    assert_counters_consistent(&game);
}

#[test]
fn test_man_and_king_direction_coverage() {
    // A lone Man in the middle of the board covers the two forward
    // diagonals; a King in the same spot covers all four
    let man = Game::from_fen("W:Wd5:Bg8").unwrap();
    assert_eq!(man.legal_moves_from(sq("d5")).len(), 2);

    let king = Game::from_fen("W:WKd5:Bg8").unwrap();
    assert_eq!(king.legal_moves_from(sq("d5")).len(), 4);
}

#[test]
fn test_double_jump_chain_reaches_past_both_victims() {
    // Dark man on c6, Light men on d5 and f3, both landing squares free:
    // the chain c6xe4xg2 must be offered with the victims in jump order
    let game = Game::from_fen("B:Wd5,f3:Bc6").unwrap();
    let moves = game.legal_moves_from(sq("c6"));

    assert_eq!(
        moves.captures_for(sq("g2")),
        Some([sq("d5"), sq("f3")].as_slice())
    );

    // The committed move prints the landing squares of each hop
    let mv = moves.to_move(sq("g2")).unwrap();
    assert_eq!(mv.to_string(), "c6xe4xg2");

    // Committing it removes both victims at once
    let after = game.with_move_made(&mv);
    assert!(after.position().piece_at(sq("d5")).is_none());
    assert!(after.position().piece_at(sq("f3")).is_none());
    assert_eq!(after.position().pieces(Side::Light), 0);
    assert_counters_consistent(&after);
}

#[test]
fn test_winner_when_a_side_runs_out_of_pieces() {
    let game = Game::from_fen("B:Wd5,f3:Bc6").unwrap();
    let mv = pick(&game, "c6", "g2");

    assert_eq!(game.winner(), None);
    assert_eq!(game.with_move_made(&mv).winner(), Some(Side::Dark));
}

#[test]
fn test_winner_when_a_side_cannot_move() {
    // Dark's only man sits on a2 with its single forward diagonal blocked
    // and no landing square on the board; Dark still has a piece, but no move
    let game = Game::from_fen("B:Wb1:Ba2").unwrap();
    assert_eq!(game.winner(), Some(Side::Light));
}

#[test]
fn test_pruning_equivalence_under_both_policies() {
    let fen = "W:Wd1,f1,c2,e2,d3,h3,c4,e4:Ba6,e6,g6,b7,f7,d5,h5,a8";

    for policy in [CapturePolicy::Optional, CapturePolicy::Mandatory] {
        let mut game = Game::from_fen(fen).unwrap();
        game.set_capture_policy(policy);

        let pruned = Search::new(&game, SearchConfig { depth: 3, pruning: true }).start();
        let full = Search::new(&game, SearchConfig { depth: 3, pruning: false }).start();

        assert_eq!(pruned.score, full.score, "score diverged under {policy}");
        assert_eq!(pruned.bestmove, full.bestmove, "move diverged under {policy}");
        assert_eq!(pruned.best, full.best, "position diverged under {policy}");
        assert!(pruned.nodes <= full.nodes);
    }
}

#[test]
fn test_depth_one_best_move_is_exactly_one_move_away() {
    let game = Game::default();
    let result = Search::new(&game, SearchConfig { depth: 1, pruning: true }).start();

    let best = result.best.expect("the starting position has moves");
    let mv = result.bestmove.expect("the starting position has moves");

    // The returned position is the reported move applied to the root
    assert_eq!(best, game.with_move_made(&mv));
    assert!(game
        .legal_moves()
        .iter()
        .any(|candidate| game.with_move_made(candidate) == best));

    // No capture is possible on the first move, so exactly one man moved
    // by one step and nothing else changed
    assert!(!mv.is_capture());
    let changed = Square::iter()
        .filter(|&square| game.position().piece_at(square) != best.position().piece_at(square))
        .count();
    assert_eq!(changed, 2);

    for side in Side::all() {
        assert_eq!(best.position().pieces(side), NUM_PIECES);
        assert_eq!(best.position().kings(side), 0);
    }
}

#[test]
fn test_startpos_notation_roundtrip() {
    let game = Game::default();
    assert_eq!(game.to_fen(), FEN_STARTPOS);

    let reparsed = Game::from_fen(&game.to_fen()).unwrap();
    assert_eq!(reparsed, game);
}

#[test]
fn test_midgame_notation_roundtrip() {
    // `to_fen` lists pieces in square order, so the input strings need not
    // match byte-for-byte; reparsing must reproduce the same game exactly
    for fen in [
        "W:Wd1,f1,c2,e2,d3,h3,c4,e4:Ba6,e6,g6,b7,f7,d5,h5,a8",
        "B:WKd5,b3,f1:BKa6,Kd3,h5",
        "W:WKb5,Kc4:Bd7,b7",
    ] {
        let game = Game::from_fen(fen).unwrap();
        let reparsed = Game::from_fen(&game.to_fen()).unwrap();
        assert_eq!(reparsed, game, "notation did not round-trip for {fen}");
    }
}

#[test]
fn test_mandatory_rules_change_perft() {
    // In this position Light has one capture and several quiet moves, so
    // the two policies must disagree at depth 1
    let fen = "W:Wb3,f1:Bc4,g8";
    let optional = Game::from_fen(fen).unwrap();

    let mut mandatory = optional;
    mandatory.set_capture_policy(CapturePolicy::Mandatory);

    assert_eq!(mandatory.perft(1), 1);
    assert!(optional.perft(1) > 1);
}
