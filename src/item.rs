//! Cell contents and coordinates.
//!
//! - `ItemShape`: the visual/gameplay kind of an item (regular or bonus).
//! - `Item`: an immutable value held by one board cell.
//! - `Position`: a grid coordinate.
//! - `ItemPos`: a snapshot pairing a position with the item found there.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score awarded for destroying an item unless stated otherwise.
pub const DEFAULT_ITEM_SCORE: u32 = 20;

/// Represents the shape of an item.
///
/// `Ball` and `Cube` are the regular shapes produced by the random generator.
/// `HLine`, `VLine` and `Bomb` are bonus shapes spawned by long or crossed matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemShape {
    /// Placeholder shape; never produced by the engine.
    None,
    Ball,
    Cube,
    /// Clears its whole row when destroyed.
    HLine,
    /// Clears its whole column when destroyed.
    VLine,
    /// Clears its 8-neighbourhood when destroyed.
    Bomb,
}

impl ItemShape {
    /// Returns `true` for `Ball` and `Cube`.
    pub fn is_regular(self) -> bool {
        matches!(self, ItemShape::Ball | ItemShape::Cube)
    }

    pub fn is_bomb(self) -> bool {
        self == ItemShape::Bomb
    }

    pub fn is_line(self) -> bool {
        matches!(self, ItemShape::HLine | ItemShape::VLine)
    }

    /// Returns `true` for shapes that trigger area destruction.
    pub fn is_bonus(self) -> bool {
        self.is_bomb() || self.is_line()
    }
}

/// An immutable board cell value.
///
/// Items are never mutated in place: destroying or transforming a cell
/// replaces its item with a new value.
///
/// # Examples
/// ```
/// use match3_engine::item::{Item, ItemShape};
/// let ball = Item::new(1, ItemShape::Ball);
/// assert!(ball.is_regular());
/// assert_eq!(ball.score(), 20);
/// assert_eq!(ball.to_string(), "(1)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Item {
    color: u8,
    shape: ItemShape,
    score: u32,
}

impl Item {
    /// Creates an item worth [`DEFAULT_ITEM_SCORE`].
    pub const fn new(color: u8, shape: ItemShape) -> Self {
        Self::with_score(color, shape, DEFAULT_ITEM_SCORE)
    }

    pub const fn with_score(color: u8, shape: ItemShape, score: u32) -> Self {
        Item {
            color,
            shape,
            score,
        }
    }

    pub fn color(&self) -> u8 {
        self.color
    }

    pub fn shape(&self) -> ItemShape {
        self.shape
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_regular(&self) -> bool {
        self.shape.is_regular()
    }

    pub fn is_bomb(&self) -> bool {
        self.shape.is_bomb()
    }

    pub fn is_line(&self) -> bool {
        self.shape.is_line()
    }

    pub fn is_bonus(&self) -> bool {
        self.shape.is_bonus()
    }

    /// Two regular items are the same kind iff both shape and color match.
    /// Bonus items are never the same kind as anything.
    pub fn same_kind(&self, other: &Item) -> bool {
        self.is_regular()
            && other.is_regular()
            && self.shape == other.shape
            && self.color == other.color
    }
}

impl fmt::Display for Item {
    /// Formats the item as a three-character token, e.g. `(2)` or `B1B`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape {
            ItemShape::Ball => write!(f, "({})", self.color),
            ItemShape::Cube => write!(f, "[{}]", self.color),
            ItemShape::Bomb => write!(f, "B{}B", self.color),
            ItemShape::HLine => write!(f, "-{}-", self.color),
            ItemShape::VLine => write!(f, "|{}|", self.color),
            ItemShape::None => write!(f, "nil"),
        }
    }
}

/// A grid coordinate. `x` grows to the right, `y` grows downward (row 0 is the top).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Position { x, y }
    }

    /// Returns `true` when `other` is a horizontal or vertical neighbour.
    pub fn is_adjacent(&self, other: &Position) -> bool {
        (self.x.abs_diff(other.x) == 1 && self.y == other.y)
            || (self.y.abs_diff(other.y) == 1 && self.x == other.x)
    }
}

impl From<(usize, usize)> for Position {
    fn from((x, y): (usize, usize)) -> Self {
        Position { x, y }
    }
}

/// A position paired with the item that occupied it when the snapshot was taken.
///
/// Equality is by value; holding an `ItemPos` says nothing about the board's
/// current contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemPos {
    pub pos: Position,
    pub item: Item,
}

impl ItemPos {
    pub const fn new(pos: Position, item: Item) -> Self {
        ItemPos { pos, item }
    }
}

impl fmt::Display for ItemPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.item, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_predicates() {
        assert!(ItemShape::Ball.is_regular());
        assert!(ItemShape::Cube.is_regular());
        assert!(!ItemShape::Bomb.is_regular());
        assert!(ItemShape::Bomb.is_bomb());
        assert!(ItemShape::HLine.is_line());
        assert!(ItemShape::VLine.is_line());
        assert!(!ItemShape::Bomb.is_line());
        assert!(!ItemShape::None.is_bonus());
        assert!(!ItemShape::None.is_regular());
    }

    #[test]
    fn test_same_kind() {
        let ball1 = Item::new(1, ItemShape::Ball);
        assert!(ball1.same_kind(&Item::new(1, ItemShape::Ball)));
        assert!(!ball1.same_kind(&Item::new(2, ItemShape::Ball)));
        assert!(!ball1.same_kind(&Item::new(1, ItemShape::Cube)));
        // Bonus items never compare as the same kind, not even with themselves.
        let bomb = Item::new(1, ItemShape::Bomb);
        assert!(!bomb.same_kind(&bomb));
        assert!(!ball1.same_kind(&bomb));
    }

    #[test]
    fn test_item_display_tokens() {
        assert_eq!(Item::new(1, ItemShape::Ball).to_string(), "(1)");
        assert_eq!(Item::new(2, ItemShape::Cube).to_string(), "[2]");
        assert_eq!(Item::new(3, ItemShape::Bomb).to_string(), "B3B");
        assert_eq!(Item::new(1, ItemShape::HLine).to_string(), "-1-");
        assert_eq!(Item::new(2, ItemShape::VLine).to_string(), "|2|");
    }

    #[test]
    fn test_item_equality_includes_score() {
        let a = Item::new(1, ItemShape::Ball);
        let b = Item::with_score(1, ItemShape::Ball, 50);
        assert_ne!(a, b);
        assert_eq!(b.score(), 50);
    }

    #[test]
    fn test_position_adjacency() {
        let p = Position::new(2, 2);
        assert!(p.is_adjacent(&Position::new(1, 2)));
        assert!(p.is_adjacent(&Position::new(3, 2)));
        assert!(p.is_adjacent(&Position::new(2, 1)));
        assert!(p.is_adjacent(&Position::new(2, 3)));
        assert!(!p.is_adjacent(&Position::new(3, 3)));
        assert!(!p.is_adjacent(&Position::new(2, 2)));
        assert!(!p.is_adjacent(&Position::new(4, 2)));
        assert_eq!(Position::from((3, 4)), Position::new(3, 4));
        assert_eq!(Position::new(3, 4).to_string(), "(3, 4)");
    }
}
