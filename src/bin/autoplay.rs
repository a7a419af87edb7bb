use clap::Parser;
use match3_engine::board::{Board, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use match3_engine::game::GAME_DURATION_SEC;
use match3_engine::hints::{choose_swap, Strategy};
use match3_engine::Game;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Evaluate swap strategies on seeded games", long_about = None)]
struct Args {
    /// Number of seeded games per strategy
    #[clap(short, long, default_value_t = 20)]
    games: u64,

    /// Seed of the first game
    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    /// Swaps per game; each swap takes one second of game time
    #[clap(short, long, default_value_t = GAME_DURATION_SEC as u32 + 1)]
    moves: u32,

    /// Evaluate only this strategy
    #[clap(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Board width
    #[clap(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,

    /// Board height
    #[clap(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
}

/// Plays one game to the end and returns its score and the swaps made.
fn play_game(args: &Args, seed: u64, strategy: Strategy) -> (u32, u32) {
    let mut game = Game::new(Board::with_seed(args.width, args.height, seed));
    game.reset();
    let mut rng = SmallRng::seed_from_u64(seed);

    let mut swaps = 0;
    while swaps < args.moves && !game.is_over() {
        let Some(candidate) = choose_swap(strategy, game.board(), &mut rng) else {
            log::warn!("seed {}: no matching swap left after {} swaps", seed, swaps);
            break;
        };
        if let Err(e) = game.swap(candidate.src, candidate.dest) {
            log::error!("seed {}: strategy {} chose an invalid swap: {}", seed, strategy, e);
            break;
        }
        game.tick();
        swaps += 1;
    }
    (game.score(), swaps)
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if args.width == 0 || args.height == 0 {
        eprintln!("Board size must be at least 1x1.");
        std::process::exit(1);
    }

    let strategies: Vec<Strategy> = match args.strategy {
        Some(strategy) => vec![strategy],
        None => vec![Strategy::First, Strategy::Greedy, Strategy::Random],
    };

    let mut all_scores: HashMap<Strategy, Vec<u32>> = HashMap::new();
    println!("Starting strategy evaluation for {} games...", args.games);

    for game_idx in 0..args.games {
        let seed = args.start_seed + game_idx;
        println!("\nGame {} (Seed: {})", game_idx, seed);

        for &strategy in &strategies {
            let (score, swaps) = play_game(&args, seed, strategy);
            println!("  Strategy: {:<10}, Score: {:<6}, Swaps: {}", strategy.to_string(), score, swaps);
            all_scores.entry(strategy).or_default().push(score);
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("\n--- Average Scores ---");

    let mut sorted_avg_scores: Vec<(Strategy, f64)> = all_scores
        .iter()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(&strategy, scores)| {
            let total: u32 = scores.iter().sum();
            (strategy, total as f64 / scores.len() as f64)
        })
        .collect();
    sorted_avg_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (strategy, avg_score) in sorted_avg_scores {
        println!("Strategy {:<10}: Average Score = {:.2}", strategy.to_string(), avg_score);
    }
}
