//! # Match-3 Engine Library
//!
//! This library provides the match-resolution core of a match-3 puzzle game:
//! the board model, match detection, cascading bonus destruction, gravity and
//! bonus-item spawning. It is deterministic given its random source and emits
//! every turn's outcome as a list of [`Action`]s for a renderer to animate.
//!
//! It is used by two binaries:
//! - `match3_player`: Plays the game interactively on the command line.
//! - `autoplay`: Plays many seeded games with a move-choice strategy and
//!   reports the scores.
//!
//! ## Modules
//! - `item`: Cell values (`Item`, `ItemShape`) and coordinates (`Position`, `ItemPos`).
//! - `board`: The grid (`Board`), match scanning (`MatchResult`), gravity and spawning.
//! - `action`: The per-turn output records (`Action`).
//! - `game`: Turn orchestration (`Game`): swaps, cascades, bonus rules, chain reactions.
//! - `hints`: Searching a board for swaps that produce matches.
//! - `utils`: Parsing boards from text layouts.
//!
//! ## Example
//! ```
//! use match3_engine::{Board, Game, Position};
//!
//! let mut game = Game::new(Board::with_seed(8, 8, 7));
//! game.reset();
//!
//! let (src, dest) = (Position::new(0, 0), Position::new(1, 0));
//! if game.can_swap(src, dest) {
//!     let actions = game.swap(src, dest).unwrap();
//!     assert!(actions[0].is_swap());
//! }
//! assert!(game.board().is_full());
//! ```

pub mod action;
pub mod board;
pub mod game;
pub mod hints;
pub mod item;
pub mod utils;

pub use self::{
    action::{Action, DestroyAction, FallDownAction, SpawnAction, SwapAction},
    board::{Board, FallDownPos, MatchCross, MatchLine, MatchResult, Orientation},
    game::Game,
    item::{Item, ItemPos, ItemShape, Position},
};

/// Rejected swap request. The board is left untouched.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SwapError {
    #[display("position {pos} is outside the board")]
    OutOfBounds { pos: Position },
    #[display("positions {src} and {dest} are not adjacent")]
    NotAdjacent { src: Position, dest: Position },
}

/// A debug bonus could not be placed.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CheatError {
    #[display("a {width}x{height} board cannot fit a run of 3")]
    BoardTooSmall { width: usize, height: usize },
}

/// Invalid board construction parameters.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    #[display("board size {width}x{height} has no cells")]
    ZeroSize { width: usize, height: usize },
    #[display("expected {} cells for a {width}x{height} board, found {found}", width * height)]
    CellCount {
        width: usize,
        height: usize,
        found: usize,
    },
}
