//! Board model for the match-3 engine.
//!
//! This module defines:
//! - `Board`: the grid of items together with its random source. It provides
//!   random item generation, the swap primitive, match detection and gravity.
//! - `MatchLine`, `MatchCross`, `MatchResult`: the output of one match scan.
//! - `FallDownPos`: a single displacement recorded while applying gravity.
use crate::item::{Item, ItemPos, ItemShape, Position};
use crate::BoardError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Default number of columns.
pub const DEFAULT_WIDTH: usize = 8;
/// Default number of rows.
pub const DEFAULT_HEIGHT: usize = 8;

/// Match lengths in priority order. Longer runs are claimed first.
const MATCH_LENGTHS: [usize; 3] = [5, 4, 3];

// Three colors of balls but only two of cubes, so the two shapes match with
// slightly different probabilities.
const ITEM_TEMPLATES: [Item; 5] = [
    Item::new(1, ItemShape::Ball),
    Item::new(2, ItemShape::Ball),
    Item::new(3, ItemShape::Ball),
    Item::new(1, ItemShape::Cube),
    Item::new(2, ItemShape::Cube),
];

/// Draws one of the regular item templates uniformly.
fn generate_random_item(rng: &mut impl Rng) -> Item {
    ITEM_TEMPLATES[rng.gen_range(0..ITEM_TEMPLATES.len())]
}

/// Axis along which a match line runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A contiguous run of 3 to 5 matching cells along one axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchLine {
    orientation: Orientation,
    cells: Vec<Position>,
}

impl MatchLine {
    /// Builds the run of `len` cells starting at `origin` and extending right
    /// (horizontal) or down (vertical).
    pub fn new(origin: Position, orientation: Orientation, len: usize) -> Self {
        let cells = (0..len)
            .map(|i| match orientation {
                Orientation::Horizontal => Position::new(origin.x + i, origin.y),
                Orientation::Vertical => Position::new(origin.x, origin.y + i),
            })
            .collect();
        MatchLine { orientation, cells }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    /// The cell a bonus falls back to when neither swapped cell lies on the line.
    ///
    /// # Panics
    /// Panics if the line is shorter than 3 cells.
    pub fn middle(&self) -> Position {
        self.cells[2]
    }

    /// Counts the cells this line shares with `other`.
    pub fn shared_cells(&self, other: &MatchLine) -> usize {
        self.cells.iter().filter(|p| other.contains(**p)).count()
    }
}

/// Two match lines crossing at exactly one cell, resolved as a single match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MatchCross {
    first: MatchLine,
    second: MatchLine,
}

impl MatchCross {
    pub fn new(first: MatchLine, second: MatchLine) -> Self {
        MatchCross { first, second }
    }

    pub fn first(&self) -> &MatchLine {
        &self.first
    }

    pub fn second(&self) -> &MatchLine {
        &self.second
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.first.contains(pos) || self.second.contains(pos)
    }

    /// The single cell shared by both lines.
    ///
    /// # Panics
    /// Panics if the lines do not intersect, which `Board::calc_matches` never produces.
    pub fn intersection(&self) -> Position {
        *self
            .first
            .cells()
            .iter()
            .find(|p| self.second.contains(**p))
            .expect("cross lines must share a cell")
    }

    /// Iterates over the cells of both lines (the intersection appears twice).
    pub fn cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.first.cells().iter().chain(self.second.cells()).copied()
    }
}

/// The result of one match scan over the board.
///
/// A line that takes part in a cross appears only inside `crosses`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub lines: Vec<MatchLine>,
    pub crosses: Vec<MatchCross>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.crosses.is_empty()
    }

    /// Returns every cell touched by any line or cross, without duplicates.
    pub fn positions(&self) -> BTreeSet<Position> {
        let mut positions: BTreeSet<Position> = self
            .lines
            .iter()
            .flat_map(|l| l.cells().iter().copied())
            .collect();
        positions.extend(self.crosses.iter().flat_map(|c| c.cells()));
        positions
    }
}

/// One item displacement produced by gravity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FallDownPos {
    pub src: Position,
    pub dest: Position,
}

impl FallDownPos {
    pub const fn new(src: Position, dest: Position) -> Self {
        FallDownPos { src, dest }
    }
}

/// The game grid: `width × height` cells, each holding an optional `Item`.
///
/// Cells are stored row-major in a flat vector (`y * width + x`). A cell is
/// only empty transiently while a turn is being resolved; after `reset` and
/// after every completed turn every cell holds an item.
///
/// The board owns the random source `R` used to generate new items. It is the
/// only source of non-determinism in the engine, so a seeded or mock RNG makes
/// every turn reproducible.
///
/// # Examples
/// ```
/// use match3_engine::board::Board;
/// let mut board = Board::with_seed(8, 8, 42);
/// board.reset();
/// assert!(board.is_full());
/// assert!(board.calc_matches().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Board<R = SmallRng> {
    width: usize,
    height: usize,
    cells: Vec<Option<Item>>,
    rng: R,
}

impl Board<SmallRng> {
    /// Creates an empty board whose RNG is seeded from the OS entropy source.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_rng(width, height, SmallRng::from_entropy())
    }

    /// Creates an empty board with a deterministic RNG.
    ///
    /// The same seed always produces the same sequence of generated items.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn with_seed(width: usize, height: usize, seed: u64) -> Self {
        Self::with_rng(width, height, SmallRng::seed_from_u64(seed))
    }
}

impl Default for Board<SmallRng> {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl<R: Rng> Board<R> {
    /// Creates an empty board using the given random source.
    ///
    /// Call [`Board::reset`] to fill it.
    ///
    /// # Panics
    /// Panics if `width` or `height` is zero.
    pub fn with_rng(width: usize, height: usize, rng: R) -> Self {
        assert!(width > 0 && height > 0, "board must have at least one cell");
        Board {
            width,
            height,
            cells: vec![None; width * height],
            rng,
        }
    }

    /// Creates a board from explicit row-major cell contents.
    ///
    /// # Errors
    /// Returns `BoardError::ZeroSize` for an empty board and
    /// `BoardError::CellCount` if `cells.len() != width * height`.
    pub fn from_cells(
        width: usize,
        height: usize,
        cells: Vec<Option<Item>>,
        rng: R,
    ) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroSize { width, height });
        }
        if cells.len() != width * height {
            return Err(BoardError::CellCount {
                width,
                height,
                found: cells.len(),
            });
        }
        Ok(Board {
            width,
            height,
            cells,
            rng,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only row-major view of the grid.
    pub fn cells(&self) -> &[Option<Item>] {
        &self.cells
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    fn index(&self, pos: Position) -> usize {
        assert!(self.contains(pos), "position {pos} is outside the board");
        pos.y * self.width + pos.x
    }

    /// Returns the item at `pos`, or `None` if the cell is empty.
    ///
    /// # Panics
    /// Panics if `pos` is outside the board.
    pub fn item(&self, pos: Position) -> Option<Item> {
        self.cells[self.index(pos)]
    }

    /// Returns the item at a cell that must be occupied.
    ///
    /// # Panics
    /// Panics if the cell is empty: gravity and spawning guarantee that cells
    /// read during resolution are filled, so an empty one is an engine bug.
    pub(crate) fn expect_item(&self, pos: Position) -> Item {
        self.item(pos)
            .unwrap_or_else(|| panic!("invariant violated: cell {pos} is empty"))
    }

    pub fn set_item(&mut self, pos: Position, item: Item) {
        let idx = self.index(pos);
        self.cells[idx] = Some(item);
    }

    pub fn clear_item(&mut self, pos: Position) {
        let idx = self.index(pos);
        self.cells[idx] = None;
    }

    /// Returns `true` when no cell is empty.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Iterates over all positions, top-to-bottom, left-to-right.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Fills the board with random regular items and re-rolls until no match remains.
    ///
    /// The resulting board is full and match-free. No score or actions are produced.
    pub fn reset(&mut self) {
        self.cells.fill(None);
        self.spawn_items();

        let mut passes = 0usize;
        loop {
            let matches = self.calc_matches();
            if matches.is_empty() {
                break;
            }
            for pos in matches.positions() {
                self.clear_item(pos);
            }
            self.spawn_items();
            passes += 1;
        }
        log::debug!(
            "board {}x{} reset after {} re-roll passes",
            self.width,
            self.height,
            passes
        );
    }

    /// Exchanges the contents of two cells. No adjacency check is made.
    ///
    /// # Panics
    /// Panics if either position is outside the board.
    pub fn swap(&mut self, a: Position, b: Position) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.cells.swap(ia, ib);
    }

    /// Tests whether every cell of `line` takes part in the same match.
    ///
    /// A run matches when all cells are occupied, share one color, contain no
    /// line bonus perpendicular to the scan axis, and all regular cells share
    /// the shape of the first regular cell in the run.
    fn test_match_line(&self, line: &MatchLine) -> bool {
        let mut items = Vec::with_capacity(line.len());
        for &pos in line.cells() {
            match self.item(pos) {
                Some(item) => items.push(item),
                None => return false,
            }
        }

        let blocking = match line.orientation() {
            Orientation::Horizontal => ItemShape::VLine,
            Orientation::Vertical => ItemShape::HLine,
        };
        let color = items[0].color();
        if items
            .iter()
            .any(|it| it.color() != color || it.shape() == blocking)
        {
            return false;
        }

        let mut regular = items.iter().filter(|it| it.is_regular());
        match regular.next() {
            Some(first) => regular.all(|it| it.same_kind(first)),
            None => true,
        }
    }

    /// Collects every horizontal and vertical run of exactly `len` cells that matches.
    fn find_match_lines(&self, len: usize) -> Vec<MatchLine> {
        let mut lines = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let origin = Position::new(x, y);
                if x + len <= self.width {
                    let line = MatchLine::new(origin, Orientation::Horizontal, len);
                    if self.test_match_line(&line) {
                        lines.push(line);
                    }
                }
                if y + len <= self.height {
                    let line = MatchLine::new(origin, Orientation::Vertical, len);
                    if self.test_match_line(&line) {
                        lines.push(line);
                    }
                }
            }
        }
        lines
    }

    /// Scans the board for matches.
    ///
    /// Runs of length 5 are claimed first, then 4, then 3. A shorter run is
    /// discarded if it shares more than one cell with any run claimed before it.
    /// Any two claimed runs sharing exactly one cell are reported as a cross and
    /// removed from the plain line list.
    pub fn calc_matches(&self) -> MatchResult {
        let mut lines: Vec<MatchLine> = Vec::new();
        for len in MATCH_LENGTHS {
            let found = self.find_match_lines(len);
            if len == MATCH_LENGTHS[0] {
                lines.extend(found);
                continue;
            }
            for candidate in found {
                if lines.iter().all(|claimed| claimed.shared_cells(&candidate) <= 1) {
                    lines.push(candidate);
                }
            }
        }

        let mut crosses = Vec::new();
        let mut in_cross = vec![false; lines.len()];
        for i in 0..lines.len() {
            for j in (i + 1)..lines.len() {
                if lines[i].shared_cells(&lines[j]) == 1 {
                    crosses.push(MatchCross::new(lines[i].clone(), lines[j].clone()));
                    in_cross[i] = true;
                    in_cross[j] = true;
                }
            }
        }

        let lines = lines
            .into_iter()
            .zip(in_cross)
            .filter_map(|(line, crossed)| (!crossed).then_some(line))
            .collect();

        MatchResult { lines, crosses }
    }

    /// Finds the nearest occupied cell above `(x, y)` in the same column.
    fn find_upper_first(&self, x: usize, y: usize) -> Option<Position> {
        (0..y)
            .rev()
            .map(|test_y| Position::new(x, test_y))
            .find(|&pos| self.item(pos).is_some())
    }

    /// Applies gravity and returns every displacement made.
    ///
    /// Rows are scanned bottom-up. Each empty cell pulls down the nearest item
    /// above it in the same column, so all gaps in a column collapse in one call.
    /// Empty cells left at the top of a column are filled by [`Board::spawn_items`].
    pub fn calc_fall_down_positions(&mut self) -> Vec<FallDownPos> {
        let mut positions = Vec::new();
        for y in (1..self.height).rev() {
            for x in 0..self.width {
                let empty_pos = Position::new(x, y);
                if self.item(empty_pos).is_some() {
                    continue;
                }
                if let Some(upper_pos) = self.find_upper_first(x, y) {
                    self.swap(upper_pos, empty_pos);
                    positions.push(FallDownPos::new(upper_pos, empty_pos));
                }
            }
        }
        positions
    }

    /// Fills every empty cell with a new random regular item.
    ///
    /// Cells are visited top-to-bottom, left-to-right, and the spawned items
    /// are returned in that order.
    pub fn spawn_items(&mut self) -> Vec<ItemPos> {
        let mut spawned = Vec::new();
        for idx in 0..self.cells.len() {
            if self.cells[idx].is_none() {
                let item = generate_random_item(&mut self.rng);
                self.cells[idx] = Some(item);
                spawned.push(ItemPos::new(
                    Position::new(idx % self.width, idx / self.width),
                    item,
                ));
            }
        }
        spawned
    }
}

impl<R> fmt::Display for Board<R> {
    /// Formats one row per line using the item tokens; empty cells show as `...`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            for (x, cell) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                match cell {
                    Some(item) => write!(f, "{item}")?,
                    None => write!(f, "...")?,
                }
            }
        }
        Ok(())
    }
}
