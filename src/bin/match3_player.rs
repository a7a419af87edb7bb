use clap::Parser;
use match3_engine::board::{Board, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use match3_engine::hints::matching_swaps;
use match3_engine::utils::board_from_str_array;
use match3_engine::{Action, CheatError, Game, Position};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play match-3 on the command line", long_about = None)]
struct Args {
    /// Seed for the item generator (random if omitted)
    #[clap(short, long)]
    seed: Option<u64>,

    /// Board width
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,

    /// Start from a board layout file instead of a random board
    #[clap(short, long)]
    board: Option<PathBuf>,

    /// Print each turn's actions as JSON
    #[clap(long)]
    json: bool,
}

fn read_board_file(path: &PathBuf, seed: u64) -> Result<Board, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    board_from_str_array(&lines, seed).map_err(|e| format!("Invalid board format: {}", e))
}

fn print_actions(actions: &[Action], json: bool) {
    if json {
        match serde_json::to_string(actions) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to serialize actions: {}", e),
        }
        return;
    }
    for action in actions {
        match action {
            Action::Swap(swap) => println!("  swap {} <-> {}", swap.src, swap.dest),
            Action::Destroy(destroy) => {
                println!(
                    "  destroy {} matched, {} by bonuses, +{} points",
                    destroy.match_destroyed.len(),
                    destroy.all_destroyed().count() - destroy.match_destroyed.len(),
                    destroy.score()
                );
                for bonus in &destroy.spawn_bonuses {
                    println!("  new bonus {}", bonus);
                }
            }
            Action::FallDown(fall) => println!("  {} items fell", fall.positions.len()),
            Action::Spawn(spawn) => println!("  {} items spawned", spawn.positions.len()),
        }
    }
}

fn print_cheat(result: Result<Vec<Action>, CheatError>, json: bool) {
    match result {
        Ok(actions) => print_actions(&actions, json),
        Err(e) => println!("Cannot place bonus: {}", e),
    }
}

fn parse_swap(parts: &[&str]) -> Option<(Position, Position)> {
    let coords: Vec<usize> = parts.iter().map(|p| p.parse().ok()).collect::<Option<_>>()?;
    match coords[..] {
        [x1, y1, x2, y2] => Some((Position::new(x1, y1), Position::new(x2, y2))),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("using seed {}", seed);

    let mut game = match &args.board {
        Some(path) => match read_board_file(path, seed) {
            Ok(board) => Game::new(board),
            Err(e) => {
                eprintln!("Failed to read board from file {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            if args.width == 0 || args.height == 0 {
                eprintln!("Board size must be at least 1x1.");
                std::process::exit(1);
            }
            let mut game = Game::new(Board::with_seed(args.width, args.height, seed));
            game.reset();
            game
        }
    };
    println!("Welcome to Match-3!");

    let started = Instant::now();
    let mut ticks = 0u64;
    loop {
        // One tick per elapsed wall-clock second.
        let elapsed = started.elapsed().as_secs();
        while ticks < elapsed && !game.is_over() {
            game.tick();
            ticks += 1;
        }

        println!("---------------------");
        println!("Time left: {}s", game.time_left_sec().max(0));
        println!("{}", game);

        if game.is_over() {
            println!();
            println!("---------------------");
            println!("GAME OVER!");
            println!("Final Score: {}", game.score());
            println!("---------------------");
            break;
        }

        print!("Enter a swap (x1 y1 x2 y2), 'h' for a hint, 'b'/'hl'/'vl' to place a bonus, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match parts[..] {
            ["q"] => {
                println!("Thanks for playing!");
                break;
            }
            ["h"] => match matching_swaps(game.board()).first() {
                Some(hint) => println!("Try swapping {} and {}.", hint.src, hint.dest),
                None => println!("No swap makes a match."),
            },
            ["b"] => print_cheat(game.cheat_bomb(), args.json),
            ["hl"] => print_cheat(game.cheat_hline(), args.json),
            ["vl"] => print_cheat(game.cheat_vline(), args.json),
            _ => match parse_swap(&parts) {
                Some((src, dest)) => match game.swap(src, dest) {
                    Ok(actions) => {
                        if actions.len() == 2 && actions[1].is_swap() && !args.json {
                            println!("No match, swap reverted.");
                        } else {
                            print_actions(&actions, args.json);
                        }
                    }
                    Err(e) => println!("Invalid move: {}.", e),
                },
                None => println!("Invalid input format. Use 'x1 y1 x2 y2', 'h', 'b', 'hl', 'vl' or 'q'."),
            },
        }
    }
}
