//! Turn orchestration for the match-3 engine.
//!
//! `Game` wraps a [`Board`] and resolves one player swap at a time:
//!
//! 1. The swap is validated and applied.
//! 2. If the board has no match, the swap is reverted and two `Swap` actions are returned.
//! 3. Otherwise each cascade step destroys the matched cells, spawns bonus items,
//!    fires bonus items caught in the destruction (chain reactions), applies
//!    gravity and refills the board, until no match remains.
//!
//! Every step is reported as an [`Action`] so a renderer can replay the turn.
use crate::action::{Action, DestroyAction, FallDownAction, SpawnAction, SwapAction};
use crate::board::{Board, MatchCross, MatchLine, MatchResult, Orientation};
use crate::item::{Item, ItemPos, ItemShape, Position};
use crate::{CheatError, SwapError};
use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Length of a game in seconds.
pub const GAME_DURATION_SEC: i32 = 60;

/// Offsets of a bomb's blast area, row by row.
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A game session: the board, the score and the countdown.
///
/// All operations are synchronous and run to completion. Nothing but the board
/// contents, the score and the timer survives between turns.
///
/// # Examples
/// ```
/// use match3_engine::{Action, Board, Game, Position};
///
/// let mut game = Game::new(Board::with_seed(8, 8, 3));
/// game.reset();
/// assert_eq!(game.score(), 0);
///
/// let actions = game.swap(Position::new(3, 3), Position::new(3, 4)).unwrap();
/// for action in &actions {
///     match action {
///         Action::Swap(swap) => println!("swap {} <-> {}", swap.src.pos, swap.dest.pos),
///         Action::Destroy(destroy) => println!("destroyed {}", destroy.all_destroyed().count()),
///         Action::FallDown(fall) => println!("{} items fell", fall.positions.len()),
///         Action::Spawn(spawn) => println!("{} items spawned", spawn.positions.len()),
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Game<R = SmallRng> {
    board: Board<R>,
    score: u32,
    time_left_sec: i32,
}

impl<R: Rng> Game<R> {
    /// Creates a game around `board`.
    ///
    /// Items already on the board are kept, matches included. Empty cells are
    /// filled with random items so every cell holds an item before the first
    /// turn. Call [`Game::reset`] to start from a fresh random state instead.
    pub fn new(mut board: Board<R>) -> Self {
        let filled = board.spawn_items();
        if !filled.is_empty() {
            log::debug!("filled {} empty cells of the starting board", filled.len());
        }
        Game {
            board,
            score: 0,
            time_left_sec: GAME_DURATION_SEC,
        }
    }

    /// Zeroes the score, restarts the countdown and refills the board with a
    /// match-free random layout.
    pub fn reset(&mut self) {
        self.score = 0;
        self.time_left_sec = GAME_DURATION_SEC;
        self.board.reset();
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) {
        self.time_left_sec -= 1;
    }

    pub fn time_left_sec(&self) -> i32 {
        self.time_left_sec
    }

    /// The game ends on the first tick that takes the countdown below zero.
    pub fn is_over(&self) -> bool {
        self.time_left_sec < 0
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn board(&self) -> &Board<R> {
        &self.board
    }

    /// Read-only row-major view of the grid.
    pub fn items(&self) -> &[Option<Item>] {
        self.board.cells()
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    /// Returns `true` if both positions are on the board and are horizontal
    /// or vertical neighbours.
    pub fn can_swap(&self, src: Position, dest: Position) -> bool {
        self.validate_swap(src, dest).is_ok()
    }

    fn validate_swap(&self, src: Position, dest: Position) -> Result<(), SwapError> {
        for pos in [src, dest] {
            if !self.board.contains(pos) {
                return Err(SwapError::OutOfBounds { pos });
            }
        }
        if !src.is_adjacent(&dest) {
            return Err(SwapError::NotAdjacent { src, dest });
        }
        Ok(())
    }

    fn swap_action(&self, src: Position, dest: Position) -> Action {
        Action::Swap(SwapAction {
            src: ItemPos::new(src, self.board.expect_item(src)),
            dest: ItemPos::new(dest, self.board.expect_item(dest)),
        })
    }

    /// Swaps two neighbouring cells and resolves the turn.
    ///
    /// If the swap creates no match it is undone and exactly two `Swap`
    /// actions are returned (forward, then back). Otherwise the first `Swap`
    /// is followed by one `Destroy`, `FallDown`, `Spawn` triple per cascade
    /// step, and the board is left full and match-free.
    ///
    /// # Errors
    /// Returns a [`SwapError`] without touching the board if either position
    /// is outside the board or the positions are not adjacent.
    pub fn swap(&mut self, src: Position, dest: Position) -> Result<Vec<Action>, SwapError> {
        self.validate_swap(src, dest)?;

        let mut actions = vec![self.swap_action(src, dest)];
        self.board.swap(src, dest);

        let mut matches = self.board.calc_matches();
        if matches.is_empty() {
            log::debug!("swap {src} <-> {dest} makes no match, reverting");
            actions.push(self.swap_action(src, dest));
            self.board.swap(src, dest);
            return Ok(actions);
        }

        let score_before = self.score;
        let mut cascades = 0usize;
        while !matches.is_empty() {
            actions.extend(self.process_match(src, dest, &matches));
            matches = self.board.calc_matches();
            cascades += 1;
        }
        log::debug!(
            "swap {src} <-> {dest} resolved in {cascades} cascade steps, +{} points",
            self.score - score_before
        );
        Ok(actions)
    }

    /// Resolves one cascade step and returns its `Destroy`, `FallDown` and
    /// `Spawn` actions.
    fn process_match(
        &mut self,
        src: Position,
        dest: Position,
        matches: &MatchResult,
    ) -> Vec<Action> {
        let regular_destroy = matches.positions();
        let match_destroyed: Vec<ItemPos> = regular_destroy
            .iter()
            .map(|&pos| ItemPos::new(pos, self.board.expect_item(pos)))
            .collect();

        let mut spawn_bonuses: Vec<ItemPos> = Vec::new();
        let line_bonuses = matches
            .lines
            .iter()
            .filter_map(|line| self.line_bonus(src, dest, line));
        let cross_bonuses = matches
            .crosses
            .iter()
            .map(|cross| self.cross_bonus(src, dest, cross));
        for bonus in line_bonuses.chain(cross_bonuses) {
            if spawn_bonuses.iter().all(|b| b.pos != bonus.pos) {
                spawn_bonuses.push(bonus);
            }
        }

        let mut claimed: HashSet<Position> = regular_destroy.iter().copied().collect();
        let triggers = match_destroyed
            .iter()
            .filter(|ip| ip.item.is_bonus())
            .copied()
            .collect();
        let destroyed_by = self.collect_bonus_destroy(triggers, &mut claimed);

        log::trace!(
            "cascade step: {} lines, {} crosses, {} bonuses spawned, {} bonuses fired",
            matches.lines.len(),
            matches.crosses.len(),
            spawn_bonuses.len(),
            destroyed_by.len()
        );

        let destroy = DestroyAction {
            match_destroyed,
            spawn_bonuses,
            destroyed_by,
        };
        self.apply_destroy(&destroy);

        let fallen = self.board.calc_fall_down_positions();
        let spawned = self.board.spawn_items();

        vec![
            Action::Destroy(destroy),
            Action::FallDown(FallDownAction { positions: fallen }),
            Action::Spawn(SpawnAction { positions: spawned }),
        ]
    }

    /// Picks where a bonus lands: the swap source if it lies on the match,
    /// else the swap destination, else `fallback`.
    fn bonus_target(
        src: Position,
        dest: Position,
        on_match: impl Fn(Position) -> bool,
        fallback: Position,
    ) -> Position {
        [src, dest]
            .into_iter()
            .find(|&pos| on_match(pos))
            .unwrap_or(fallback)
    }

    /// A 5-run spawns a bomb; a 4-run spawns a line bonus across the run
    /// (a horizontal run yields a `VLine`, a vertical run an `HLine`).
    fn line_bonus(&self, src: Position, dest: Position, line: &MatchLine) -> Option<ItemPos> {
        let shape = match line.len() {
            5 => ItemShape::Bomb,
            4 => match line.orientation() {
                Orientation::Horizontal => ItemShape::VLine,
                Orientation::Vertical => ItemShape::HLine,
            },
            _ => return None,
        };
        let target = Self::bonus_target(src, dest, |pos| line.contains(pos), line.middle());
        let color = self.board.expect_item(target).color();
        Some(ItemPos::new(target, Item::new(color, shape)))
    }

    /// A cross always spawns a bomb.
    fn cross_bonus(&self, src: Position, dest: Position, cross: &MatchCross) -> ItemPos {
        let target = Self::bonus_target(src, dest, |pos| cross.contains(pos), cross.intersection());
        let color = self.board.expect_item(target).color();
        ItemPos::new(target, Item::new(color, ItemShape::Bomb))
    }

    /// Cells a bonus item destroys when it fires, clipped to the board.
    fn blast_area(&self, trigger: &ItemPos) -> Vec<Position> {
        let Position { x, y } = trigger.pos;
        match trigger.item.shape() {
            ItemShape::Bomb => NEIGHBOUR_OFFSETS
                .iter()
                .filter_map(|&(dx, dy)| {
                    let pos = Position::new(x.checked_add_signed(dx)?, y.checked_add_signed(dy)?);
                    self.board.contains(pos).then_some(pos)
                })
                .collect(),
            ItemShape::HLine => (0..self.width()).map(|x| Position::new(x, y)).collect(),
            ItemShape::VLine => (0..self.height()).map(|y| Position::new(x, y)).collect(),
            _ => Vec::new(),
        }
    }

    /// Fires every bonus in `triggers` and, depth-first, every bonus their
    /// blasts uncover.
    ///
    /// `claimed` holds every cell already scheduled for destruction. A trigger
    /// claims its whole area before any bonus inside it fires, and claimed cells
    /// are never destroyed twice, so the loop ends once no new cell is claimed.
    fn collect_bonus_destroy(
        &self,
        triggers: Vec<ItemPos>,
        claimed: &mut HashSet<Position>,
    ) -> BTreeMap<ItemPos, Vec<ItemPos>> {
        let mut destroyed_by = BTreeMap::new();
        let mut pending: Vec<ItemPos> = triggers.into_iter().rev().collect();

        while let Some(trigger) = pending.pop() {
            let destroyed: Vec<ItemPos> = self
                .blast_area(&trigger)
                .into_iter()
                .filter(|&pos| claimed.insert(pos))
                .map(|pos| ItemPos::new(pos, self.board.expect_item(pos)))
                .collect();

            pending.extend(destroyed.iter().rev().filter(|ip| ip.item.is_bonus()));
            log::trace!("{trigger} destroyed {} cells", destroyed.len());
            destroyed_by.insert(trigger, destroyed);
        }
        destroyed_by
    }

    /// Clears every destroyed cell, adds its score and writes the spawned bonuses.
    ///
    /// Bonuses are written last so a bonus is never removed by the match that
    /// created it.
    fn apply_destroy(&mut self, destroy: &DestroyAction) {
        for ip in destroy.all_destroyed() {
            self.board.clear_item(ip.pos);
        }
        self.score += destroy.score();
        for bonus in &destroy.spawn_bonuses {
            self.board.set_item(bonus.pos, bonus.item);
        }
    }

    /// Places a random 3-run with a bomb in the middle.
    pub fn cheat_bomb(&mut self) -> Result<Vec<Action>, CheatError> {
        self.cheat_bonus(ItemShape::Bomb)
    }

    /// Places a random 3-run with a horizontal line bonus in the middle.
    pub fn cheat_hline(&mut self) -> Result<Vec<Action>, CheatError> {
        self.cheat_bonus(ItemShape::HLine)
    }

    /// Places a random 3-run with a vertical line bonus in the middle.
    pub fn cheat_vline(&mut self) -> Result<Vec<Action>, CheatError> {
        self.cheat_bonus(ItemShape::VLine)
    }

    /// Overwrites a random run of three cells with `regular, bonus, regular`
    /// of one color and reports it as a `Destroy` of the old cells followed by
    /// a `Spawn` of the new ones. Bonus items overwritten this way do not fire.
    /// The score is unchanged.
    fn cheat_bonus(&mut self, bonus: ItemShape) -> Result<Vec<Action>, CheatError> {
        let (width, height) = (self.width(), self.height());
        let fits_horizontal = width >= 3;
        let fits_vertical = height >= 3;
        if !fits_horizontal && !fits_vertical {
            return Err(CheatError::BoardTooSmall { width, height });
        }

        let rng = self.board.rng_mut();
        let vertical = if fits_horizontal && fits_vertical {
            rng.gen_bool(0.5)
        } else {
            fits_vertical
        };
        let shape = if rng.gen_bool(0.5) {
            ItemShape::Ball
        } else {
            ItemShape::Cube
        };
        let max_color = if shape == ItemShape::Ball { 3 } else { 2 };
        let color = rng.gen_range(1..=max_color);
        let (orientation, origin) = if vertical {
            (
                Orientation::Vertical,
                Position::new(rng.gen_range(0..width), rng.gen_range(0..=height - 3)),
            )
        } else {
            (
                Orientation::Horizontal,
                Position::new(rng.gen_range(0..=width - 3), rng.gen_range(0..height)),
            )
        };
        let run = MatchLine::new(origin, orientation, 3);

        let match_destroyed: Vec<ItemPos> = run
            .cells()
            .iter()
            .map(|&pos| ItemPos::new(pos, self.board.expect_item(pos)))
            .collect();
        let destroyed_by = match_destroyed
            .iter()
            .filter(|ip| ip.item.is_bonus())
            .map(|ip| (*ip, Vec::new()))
            .collect();
        let destroy = DestroyAction {
            match_destroyed,
            spawn_bonuses: Vec::new(),
            destroyed_by,
        };

        let regular = Item::new(color, shape);
        let placed = [regular, Item::new(color, bonus), regular];
        let spawned: Vec<ItemPos> = run
            .cells()
            .iter()
            .zip(placed)
            .map(|(&pos, item)| ItemPos::new(pos, item))
            .collect();
        for ip in &spawned {
            self.board.set_item(ip.pos, ip.item);
        }
        log::debug!("cheat placed {} at {}", placed[1], run.middle());

        Ok(vec![
            Action::Destroy(destroy),
            Action::Spawn(SpawnAction { positions: spawned }),
        ])
    }
}

impl<R> fmt::Display for Game<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Score: {}", self.score)?;
        writeln!(f, "Board:")?;
        write!(f, "{}", self.board)
    }
}
