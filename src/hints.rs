use crate::board::Board;
use crate::item::Position;
use rand::Rng;

/// A swap that produces at least one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapCandidate {
    pub src: Position,
    pub dest: Position,
    /// Cells matched right after the swap, before any cascade.
    pub matched_cells: usize,
}

/// How an automated player picks among the available swaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, clap::ValueEnum, derive_more::Display)]
pub enum Strategy {
    /// The first swap in scan order.
    #[display("first")]
    First,
    /// The swap matching the most cells.
    #[display("greedy")]
    Greedy,
    /// A uniformly random swap.
    #[display("random")]
    Random,
}

/// Lists every swap of horizontally or vertically neighbouring cells that
/// produces a match.
///
/// Cells are scanned top-to-bottom, left-to-right; for each cell the swap with
/// its right neighbour is tried before the swap with the cell below.
///
/// # Arguments
/// * `board`: The board to search. It is left unchanged.
///
/// # Returns
/// The matching swaps in scan order. An empty vector means the board has no
/// valid move.
///
/// # Examples
/// ```
/// use match3_engine::hints::matching_swaps;
/// use match3_engine::utils::board_from_str_array;
/// use match3_engine::Position;
///
/// let board = board_from_str_array(&["(1) (2) (1) (1)", "[3] [4] [5] [6]"], 0).unwrap();
/// let swaps = matching_swaps(&board);
/// assert_eq!(swaps.len(), 1);
/// assert_eq!((swaps[0].src, swaps[0].dest), (Position::new(0, 0), Position::new(1, 0)));
/// assert_eq!(swaps[0].matched_cells, 3);
/// ```
pub fn matching_swaps<R: Rng + Clone>(board: &Board<R>) -> Vec<SwapCandidate> {
    // Swaps are tried and undone on a scratch copy.
    let mut scratch = board.clone();
    let mut candidates = Vec::new();

    for src in board.positions() {
        let neighbours = [
            Position::new(src.x + 1, src.y),
            Position::new(src.x, src.y + 1),
        ];
        for dest in neighbours {
            if !board.contains(dest) {
                continue;
            }
            scratch.swap(src, dest);
            let matched_cells = scratch.calc_matches().positions().len();
            scratch.swap(src, dest);
            if matched_cells > 0 {
                candidates.push(SwapCandidate {
                    src,
                    dest,
                    matched_cells,
                });
            }
        }
    }
    candidates
}

/// Picks a swap according to `strategy`.
///
/// # Arguments
/// * `strategy`: The selection rule.
/// * `board`: The board to search.
/// * `rng`: Random source, only consumed by [`Strategy::Random`].
///
/// # Returns
/// `None` if the board has no matching swap. With [`Strategy::Greedy`], ties
/// go to the swap found first.
pub fn choose_swap<R: Rng + Clone>(
    strategy: Strategy,
    board: &Board<R>,
    rng: &mut impl Rng,
) -> Option<SwapCandidate> {
    let candidates = matching_swaps(board);
    match strategy {
        Strategy::First => candidates.first().copied(),
        Strategy::Greedy => {
            let mut best: Option<SwapCandidate> = None;
            for candidate in candidates {
                if best.map_or(true, |b| candidate.matched_cells > b.matched_cells) {
                    best = Some(candidate);
                }
            }
            best
        }
        Strategy::Random => {
            if candidates.is_empty() {
                None
            } else {
                Some(candidates[rng.gen_range(0..candidates.len())])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_matching_swaps_leaves_board_unchanged() {
        let mut board = Board::with_seed(8, 8, 5);
        board.reset();
        let before = board.cells().to_vec();
        let swaps = matching_swaps(&board);
        assert_eq!(board.cells(), &before[..]);
        for swap in &swaps {
            assert!(swap.src.is_adjacent(&swap.dest));
            assert!(swap.matched_cells >= 3);
        }
    }

    #[test]
    fn test_matching_swaps_none_available() {
        let board = board_from_str_array(
            &[
                "(1) [2] (3)", //
                "[1] (2) [2]",
                "(3) [1] (1)",
            ],
            0,
        )
        .unwrap();
        assert!(matching_swaps(&board).is_empty());
        let mut rng = SmallRng::seed_from_u64(0);
        for strategy in [Strategy::First, Strategy::Greedy, Strategy::Random] {
            assert_eq!(choose_swap(strategy, &board, &mut rng), None);
        }
    }

    #[test]
    fn test_choose_swap_strategies() {
        // (1,1)<->(1,2) completes a 4-run in row 2; the other two swaps match 3.
        let board = board_from_str_array(
            &[
                "(1) (2) (1) (1) [3]",
                "[4] (3) [5] [6] [7]",
                "(3) [8] (3) (3) [9]",
            ],
            0,
        )
        .unwrap();
        let swaps = matching_swaps(&board);
        assert_eq!(
            swaps,
            vec![
                SwapCandidate {
                    src: pos(0, 0),
                    dest: pos(1, 0),
                    matched_cells: 3
                },
                SwapCandidate {
                    src: pos(1, 1),
                    dest: pos(1, 2),
                    matched_cells: 4
                },
                SwapCandidate {
                    src: pos(0, 2),
                    dest: pos(1, 2),
                    matched_cells: 3
                },
            ]
        );

        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(choose_swap(Strategy::First, &board, &mut rng), Some(swaps[0]));
        assert_eq!(choose_swap(Strategy::Greedy, &board, &mut rng), Some(swaps[1]));
        let random = choose_swap(Strategy::Random, &board, &mut rng).unwrap();
        assert!(swaps.contains(&random));
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(Strategy::Greedy.to_string(), "greedy");
    }
}
