use crate::board::Board;
use crate::item::{Item, ItemShape};
use crate::BoardError;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Error returned when a text layout cannot be turned into a board.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("layout has no rows")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("unrecognized token '{token}' in row {row} col {col}")]
    UnknownToken {
        row: usize,
        col: usize,
        token: String,
    },
    #[display("{_0}")]
    Board(BoardError),
}

impl From<BoardError> for ParseBoardError {
    fn from(err: BoardError) -> Self {
        ParseBoardError::Board(err)
    }
}

/// Parses one cell token.
///
/// Tokens are the item display forms: `(c)` ball, `[c]` cube, `BcB` bomb,
/// `-c-` horizontal line and `|c|` vertical line, where `c` is a decimal
/// color. `.` and `...` stand for an empty cell.
///
/// # Returns
/// * `Some(Some(item))` for an item token.
/// * `Some(None)` for an empty cell.
/// * `None` if the token is not recognized.
///
/// # Examples
/// ```
/// use match3_engine::utils::parse_item;
/// use match3_engine::{Item, ItemShape};
///
/// assert_eq!(parse_item("(2)"), Some(Some(Item::new(2, ItemShape::Ball))));
/// assert_eq!(parse_item("[12]"), Some(Some(Item::new(12, ItemShape::Cube))));
/// assert_eq!(parse_item("..."), Some(None));
/// assert_eq!(parse_item("<1>"), None);
/// ```
pub fn parse_item(token: &str) -> Option<Option<Item>> {
    if token == "." || token == "..." {
        return Some(None);
    }
    let mut chars = token.chars();
    let (open, close) = (chars.next()?, chars.next_back()?);
    let shape = match (open, close) {
        ('(', ')') => ItemShape::Ball,
        ('[', ']') => ItemShape::Cube,
        ('B', 'B') => ItemShape::Bomb,
        ('-', '-') => ItemShape::HLine,
        ('|', '|') => ItemShape::VLine,
        _ => return None,
    };
    let color = chars.as_str();
    if color.is_empty() || !color.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let color = color.parse().ok()?;
    Some(Some(Item::new(color, shape)))
}

/// Parses a text layout into the row-major cells of a board.
///
/// Each string slice is one row, starting from the top (row 0). Cells are
/// separated by whitespace, and every row must have the same number of cells.
///
/// # Returns
/// The board width, its height and the cells.
pub fn parse_layout(s: &[&str]) -> Result<(usize, usize, Vec<Option<Item>>), ParseBoardError> {
    let width = match s.first() {
        Some(first) => first.split_whitespace().count(),
        None => return Err(ParseBoardError::Empty),
    };

    let mut cells = Vec::with_capacity(width * s.len());
    for (row, row_str) in s.iter().enumerate() {
        let tokens: Vec<&str> = row_str.split_whitespace().collect();
        if tokens.len() != width {
            return Err(ParseBoardError::RaggedRow {
                row,
                expected: width,
                found: tokens.len(),
            });
        }
        for (col, token) in tokens.into_iter().enumerate() {
            let cell = parse_item(token).ok_or_else(|| ParseBoardError::UnknownToken {
                row,
                col,
                token: token.to_string(),
            })?;
            cells.push(cell);
        }
    }
    Ok((width, s.len(), cells))
}

/// Builds a board from a text layout, using `rng` for items spawned later.
pub fn board_from_str_array_with_rng<R: Rng>(
    s: &[&str],
    rng: R,
) -> Result<Board<R>, ParseBoardError> {
    let (width, height, cells) = parse_layout(s)?;
    Ok(Board::from_cells(width, height, cells, rng)?)
}

/// Builds a board from a text layout with a seeded RNG.
///
/// The layout format is described in [`parse_layout`] and [`parse_item`].
/// The board is used as given: it may be partially empty or contain matches.
///
/// # Examples
/// ```
/// use match3_engine::utils::board_from_str_array;
/// use match3_engine::{Item, ItemShape, Position};
///
/// let board = board_from_str_array(&["(1) [2] B3B", "-1- ... |2|"], 0).unwrap();
/// assert_eq!(board.width(), 3);
/// assert_eq!(board.height(), 2);
/// assert_eq!(board.item(Position::new(2, 0)), Some(Item::new(3, ItemShape::Bomb)));
/// assert_eq!(board.item(Position::new(1, 1)), None);
///
/// assert!(board_from_str_array(&["(1) <2>"], 0).is_err());
/// assert!(board_from_str_array(&["(1) (2)", "(3)"], 0).is_err());
/// ```
pub fn board_from_str_array(s: &[&str], seed: u64) -> Result<Board, ParseBoardError> {
    board_from_str_array_with_rng(s, SmallRng::seed_from_u64(seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Position;

    #[test]
    fn test_board_from_str_array_valid() {
        let board = board_from_str_array(
            &[
                "(1) (2) (3) [1] [2]",
                "B1B -2- |3| . ...",
                "[10] (21) [3] (1) (1)",
            ],
            0,
        )
        .unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 3);
        assert_eq!(board.item(Position::new(0, 0)), Some(Item::new(1, ItemShape::Ball)));
        assert_eq!(board.item(Position::new(4, 0)), Some(Item::new(2, ItemShape::Cube)));
        assert_eq!(board.item(Position::new(0, 1)), Some(Item::new(1, ItemShape::Bomb)));
        assert_eq!(board.item(Position::new(1, 1)), Some(Item::new(2, ItemShape::HLine)));
        assert_eq!(board.item(Position::new(2, 1)), Some(Item::new(3, ItemShape::VLine)));
        assert_eq!(board.item(Position::new(3, 1)), None);
        assert_eq!(board.item(Position::new(4, 1)), None);
        assert_eq!(board.item(Position::new(0, 2)), Some(Item::new(10, ItemShape::Cube)));
        assert_eq!(board.item(Position::new(1, 2)), Some(Item::new(21, ItemShape::Ball)));
    }

    #[test]
    fn test_board_from_str_array_extra_whitespace() {
        let board = board_from_str_array(&["  (1)   [2] ", "(3)\t[1]"], 0).unwrap();
        assert_eq!(board.width(), 2);
        assert_eq!(board.item(Position::new(1, 1)), Some(Item::new(1, ItemShape::Cube)));
    }

    #[test]
    fn test_board_from_str_array_unknown_token() {
        let err = board_from_str_array(&["(1) [2]", "(1) <2>"], 0).unwrap_err();
        assert_eq!(
            err,
            ParseBoardError::UnknownToken {
                row: 1,
                col: 1,
                token: "<2>".to_string()
            }
        );
        assert!(err.to_string().contains("'<2>'"));
    }

    #[test]
    fn test_parse_item_rejects_malformed_tokens() {
        for token in ["()", "(a)", "(1]", "B1", "-", "....", "(1 )", "(256)"] {
            assert_eq!(parse_item(token), None, "token {token:?} should be rejected");
        }
    }

    #[test]
    fn test_board_from_str_array_ragged_rows() {
        let err = board_from_str_array(&["(1) (2) (3)", "(1) (2)"], 0).unwrap_err();
        assert_eq!(
            err,
            ParseBoardError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let rows: [&str; 0] = [];
        assert_eq!(board_from_str_array(&rows, 0).unwrap_err(), ParseBoardError::Empty);
        assert_eq!(
            board_from_str_array(&[""], 0).unwrap_err(),
            ParseBoardError::Board(BoardError::ZeroSize { width: 0, height: 1 })
        );
    }

    #[test]
    fn test_display_round_trip() {
        let rows = ["(1) [2] ...", "B3B -1- |2|"];
        let board = board_from_str_array(&rows, 0).unwrap();
        assert_eq!(board.to_string(), rows.join("\n"));
    }
}
