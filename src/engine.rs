/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    io,
    sync::mpsc::{channel, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::{bail, Context, Result};
use clap::Parser;

use crate::{
    EngineCommand, Evaluator, Game, Move, Moves, Search, SearchConfig, Side, Square,
    DEFAULT_DEPTH, FEN_STARTPOS,
};

/// Default depth at which to run the benchmark searches.
const BENCH_DEPTH: usize = 7;

/// Positions searched by the `bench` command.
const BENCHMARK_FENS: [&str; 5] = [
    FEN_STARTPOS,
    "W:Wd1,f1,c2,e2,d3,h3,c4,e4:Ba6,e6,g6,b7,f7,d5,h5,a8",
    "B:WKd5,b3,f1:BKa6,Kd3,h5",
    "W:WKb5,Kc4:Bd7,b7",
    "B:Wb3,d3,f3,c4,e4,g4:Bb5,d5,f5,c6,e6,a6",
];

/// A selected piece and its cached legal destinations.
///
/// A move is only ever committed against this cached mapping; a destination
/// that is not in it is rejected without touching the game.
struct Selection {
    square: Square,
    moves: Moves,
}

/// What came of pointing at a square.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SelectOutcome {
    /// The square held a piece of the side to move; it is now selected.
    Selected { destinations: usize },

    /// The square was a legal destination of the selected piece; the move
    /// has been committed.
    Moved(Move),

    /// Nothing useful to do: any previous selection has been cleared.
    Rejected,
}

/// The kinglet checkers engine.
///
/// Holds the one authoritative [`Game`], which changes only when a whole
/// move is committed: by `select`, or by `go` playing the search's choice.
/// After every committed move the engine checks for a winner, announces it,
/// and starts a fresh game.
pub struct Engine {
    /// The current state of the game, as known to the engine.
    game: Game,

    /// The currently selected piece, if any, with its legal destinations.
    selected: Option<Selection>,

    /// One half of a channel, responsible for sending commands to the engine to execute.
    sender: Sender<EngineCommand>,

    /// One half of a channel, responsible for receiving commands for the engine to execute.
    receiver: Receiver<EngineCommand>,
}

impl Engine {
    /// Constructs a new [`Engine`] instance to be executed with [`Engine::run`].
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            game: Game::default(),
            selected: None,
            sender,
            receiver,
        }
    }

    /// Sends an [`EngineCommand`] to the engine to be executed.
    pub fn send_command(&self, command: EngineCommand) {
        // Safe unwrap: `send` can only fail if its corresponding receiver doesn't exist,
        //  and the only way our engine's `Receiver` can no longer exist is when our engine
        //  doesn't exist either, so this is always safe.
        self.sender.send(command).unwrap();
    }

    /// Execute the main event loop for the engine.
    ///
    /// This function spawns a thread to handle input from `stdin` and waits
    /// on received commands, executing each one synchronously.
    pub fn run(&mut self) -> Result<()> {
        // Spawn a separate thread for handling user input
        let sender = self.sender.clone();
        thread::spawn(|| {
            if let Err(err) = input_handler(sender) {
                eprintln!("Input handler thread stopping after fatal error: {err}");
            }
        });

        // Loop on user input
        while let Ok(cmd) = self.receiver.recv() {
            match cmd {
                EngineCommand::Bench { depth, pretty } => self.bench(depth, pretty),

                EngineCommand::Display => self.display(),

                EngineCommand::Eval { pretty } => self.eval(pretty),

                EngineCommand::Exit => break,

                EngineCommand::Fen => println!("{}", self.game.to_fen()),

                EngineCommand::Flip => {
                    self.clear_selection();
                    self.game.toggle_side_to_move();
                }

                EngineCommand::Go { depth } => self.go(depth),

                EngineCommand::Moves { square } => self.moves(square),

                EngineCommand::New => self.new_game(),

                EngineCommand::Perft { depth } => self.perft(depth, false),

                EngineCommand::Place { piece, square } => {
                    self.clear_selection();
                    if let Err(e) = self.game.place(square, piece) {
                        eprintln!("Error: {e}");
                    }
                }

                EngineCommand::Rules { policy } => match policy {
                    Some(policy) => {
                        self.clear_selection();
                        self.game.set_capture_policy(policy);
                        println!("Captures are now {policy}");
                    }
                    None => println!("Captures are {}", self.game.capture_policy()),
                },

                EngineCommand::Select { square } => self.select(square),

                EngineCommand::Setup { fen } => match Game::from_fen(&fen) {
                    Ok(game) => {
                        let policy = self.game.capture_policy();
                        self.game = game;
                        self.game.set_capture_policy(policy);
                        self.clear_selection();
                    }
                    Err(e) => eprintln!("Error: {e}"),
                },

                EngineCommand::Splitperft { depth } => self.perft(depth, true),

                EngineCommand::Take { square } => {
                    self.clear_selection();
                    match self.game.take(square) {
                        Some(piece) => println!("Removed the {piece:?} from {square}"),
                        None => println!("{square} is empty"),
                    }
                }
            };
        }

        Ok(())
    }

    /// Selects a piece of the current side, or commits a move of the
    /// already-selected piece.
    ///
    /// Pointing at a piece of the side to move selects it and caches its
    /// legal destinations. Pointing at one of those cached destinations
    /// commits the move, capture chain, promotion, and turn switch included.
    /// Pointing anywhere else clears the selection without touching the game.
    fn select_or_move(&mut self, square: Square) -> SelectOutcome {
        if let Some(selection) = self.selected.take() {
            if let Some(mv) = selection.moves.to_move(square) {
                self.game.make_move(&mv);
                return SelectOutcome::Moved(mv);
            }
            // Not a destination: the selection is dropped, and the square
            // gets a chance to become the new selection below
        }

        match self.game.position().piece_at(square) {
            Some(piece) if piece.side() == self.game.side_to_move() => {
                let moves = self.game.legal_moves_from(square);
                let destinations = moves.len();
                self.selected = Some(Selection { square, moves });
                SelectOutcome::Selected { destinations }
            }
            _ => SelectOutcome::Rejected,
        }
    }

    /// Executes the `select` command and reports what happened.
    fn select(&mut self, square: Square) {
        match self.select_or_move(square) {
            SelectOutcome::Selected { destinations: 0 } => {
                println!("{square} has no legal moves");
            }
            SelectOutcome::Selected { .. } => self.display(),
            SelectOutcome::Moved(mv) => {
                println!("Played {mv}");
                self.conclude_turn();
            }
            SelectOutcome::Rejected => println!("Nothing to select on {square}"),
        }
    }

    /// Executes the `go` command: searches the current position and plays
    /// the move the search chose.
    fn go(&mut self, depth: Option<usize>) {
        self.clear_selection();

        if let Some(winner) = self.game.winner() {
            println!("The game is already over: {winner} has won. Use 'new' to start another.");
            return;
        }

        let config = SearchConfig {
            depth: depth.unwrap_or(DEFAULT_DEPTH),
            ..Default::default()
        };

        let start = Instant::now();
        let result = Search::new(&self.game, config).start();
        let ms = start.elapsed().as_millis();

        match (result.bestmove, result.best) {
            (Some(mv), Some(next)) => {
                self.game = next;
                println!(
                    "bestmove {mv} (score {}, {} nodes, {ms} ms)",
                    result.score, result.nodes
                );
                self.conclude_turn();
            }

            // Unreachable after the winner check above, but the contract is
            // the caller's to uphold
            _ => println!("No move available"),
        }
    }

    /// After a committed move: announce a decided game and reset for the next one.
    fn conclude_turn(&mut self) {
        if let Some(winner) = self.game.winner() {
            println!("{}", self.game.position());
            println!("\nGame over: {winner} wins. Starting a new game.");
            self.new_game();
        }
    }

    /// Executes the `moves` command, listing legal moves for one square or
    /// for the whole side to move.
    fn moves(&self, square: Option<Square>) {
        let moves = if let Some(square) = square {
            let moves = self.game.legal_moves_from(square);
            moves
                .destinations()
                .filter_map(|dest| moves.to_move(dest))
                .collect()
        } else {
            self.game.legal_moves()
        };

        // If there are none, print "(none)"
        let moves_string = if moves.is_empty() {
            String::from("(none)")
        } else {
            // Otherwise, join them by comma-space
            moves
                .into_iter()
                .map(|mv| mv.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("{moves_string}");
    }

    /// Executes the `display` command, printing the current position with
    /// the selected piece's destinations highlighted.
    fn display(&self) {
        let highlights: Vec<Square> = self
            .selected
            .as_ref()
            .map(|selection| selection.moves.destinations().collect())
            .unwrap_or_default();

        println!("{}", self.game.diagram(&highlights));
        println!();
        if let Some(selection) = &self.selected {
            println!("Selected: {}", selection.square);
        }
        println!("Side to move: {}", self.game.side_to_move());
        println!("Notation: {}", self.game.to_fen());
    }

    /// Executes the `eval` command, printing an evaluation of the current position.
    fn eval(&self, pretty: bool) {
        let evaluator = Evaluator::new(&self.game);

        if pretty {
            let position = self.game.position();
            for side in Side::all() {
                println!(
                    "{side}: {} men, {} kings",
                    position.men(side),
                    position.kings(side)
                );
            }
            print!("Score for {}: ", self.game.side_to_move());
        }

        println!("{}", evaluator.eval());
    }

    /// Executes the `bench` command, running a fixed-depth search on a suite
    /// of positions and displaying the results.
    fn bench(&self, depth: Option<usize>, pretty: bool) {
        let depth = depth.unwrap_or(BENCH_DEPTH);
        let num_tests = BENCHMARK_FENS.len();
        let mut nodes = 0;
        let start = Instant::now();

        // Run a fixed search on each position
        for (i, fen) in BENCHMARK_FENS.into_iter().enumerate() {
            println!("Benchmark position {}/{num_tests}: {fen}", i + 1);

            // The suite is built in, so a parse failure is a bug here, not in the user's input
            let game = Game::from_fen(fen).expect("benchmark position must parse");
            let result = Search::new(&game, SearchConfig { depth, pruning: true }).start();
            nodes += result.nodes;
        }

        // Compute results
        let elapsed = start.elapsed();
        let nps = (nodes as f32 / elapsed.as_secs_f32()) as u64;
        let m_nps = nodes as f32 / elapsed.as_secs_f32() / 1_000_000.0;
        let ms = elapsed.as_millis();

        if pretty {
            // Display the results in a nice table
            println!();
            println!("+--- Benchmark Complete ---+");
            println!("| time (ms)  : {ms:<12}|");
            println!("| nodes      : {nodes:<12}|");
            println!("| nps        : {nps:<12}|");
            println!("| Mnps       : {m_nps:<12.2}|");
            println!("+--------------------------+");
        } else {
            println!("{nodes} nodes {nps} nps");
        }
    }

    /// Executes the `perft`/`splitperft` commands on the current position.
    fn perft(&self, depth: usize, split: bool) {
        let start = Instant::now();
        let total = if split && depth > 0 {
            let mut total = 0;
            for mv in self.game.legal_moves() {
                let nodes = self.game.with_move_made(&mv).perft(depth - 1);
                println!("{mv}: {nodes}");
                total += nodes;
            }
            println!();
            total
        } else {
            self.game.perft(depth)
        };

        let ms = start.elapsed().as_millis();
        println!("Perft({depth}): {total} nodes in {ms} ms");
    }

    /// Resets the engine's internal game state, preserving the capture policy.
    fn new_game(&mut self) {
        let policy = self.game.capture_policy();
        self.game = Game::default();
        self.game.set_capture_policy(policy);
        self.clear_selection();
    }

    /// Drops the cached selection, if any.
    fn clear_selection(&mut self) {
        self.selected = None;
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Loops endlessly to await input via `stdin`, sending all successfully-parsed
/// commands through the supplied `sender`.
fn input_handler(sender: Sender<EngineCommand>) -> Result<()> {
    let mut buffer = String::with_capacity(2048); // Seems like a good amount of space to pre-allocate

    loop {
        // Clear the buffer, read input, and trim the trailing newline
        buffer.clear();
        let bytes = io::stdin()
            .read_line(&mut buffer)
            .context("Failed to read line when parsing commands")?;

        // For ctrl + d
        if 0 == bytes {
            // Send the Exit command and stop this thread
            sender
                .send(EngineCommand::Exit)
                .context("Failed to send 'exit' command after receiving empty input")?;

            bail!("Engine received input of 0 bytes and is quitting");
        }

        // Trim any leading/trailing whitespace
        let buf = buffer.trim();

        // Ignore empty lines
        if buf.is_empty() {
            continue;
        }

        match EngineCommand::try_parse_from(buf.split_ascii_whitespace()) {
            // If successful, send the command to the engine
            Ok(cmd) => sender
                .send(cmd)
                .context("Failed to send command to engine")?,

            // If an invalid command was received, just print the error and continue running
            Err(err) => eprintln!("{err}"),
        }
    }
}
