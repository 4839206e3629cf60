use clap::{Parser, Subcommand};
use kuboble::{
    Board, Generator, GeneratorConfig, Levels, Move, SolveResult, Solver, format_solution, verifier,
};
use std::time::Instant;

fn print_solution(board: &Board, solution: &[Move]) {
    println!("\nStarting position:\n{}", render(board));
    let mut board = board.clone();
    let total = solution.len();
    for (count, mv) in solution.iter().enumerate() {
        board = board.play(*mv);
        println!("{} ({}/{}):\n{}", mv, count + 1, total, render(&board));
    }
}

/// One grid row per line.
fn render(board: &Board) -> String {
    board.to_string().replace(';', "\n")
}

struct LevelStats {
    solved: bool,
    steps: usize,
    states_explored: usize,
    elapsed_ms: u128,
}

fn solve_level(level_num: usize, board: &Board, max_depth: usize, print: bool) -> LevelStats {
    let mut solver = Solver::new(max_depth);
    let start = Instant::now();
    let result = solver.solve(board);
    let elapsed_ms = start.elapsed().as_millis();

    let (solved_char, solution_len, solved) = match &result {
        SolveResult::Solved(solution) => ('Y', solution.len(), true),
        SolveResult::Cutoff => ('N', 0, false),
        SolveResult::Impossible => ('X', 0, false),
    };

    println!(
        "level: {:<3}  solved: {}  steps: {:<5}  states: {:<12}  elapsed: {} ms",
        level_num,
        solved_char,
        solution_len,
        solver.nodes_explored(),
        elapsed_ms
    );

    if let SolveResult::Solved(solution) = &result {
        println!("solution: {}", format_solution(solution));
        if print {
            print_solution(board, solution);
        }
    }

    LevelStats {
        solved,
        steps: solution_len,
        states_explored: solver.nodes_explored(),
        elapsed_ms,
    }
}

#[derive(Parser)]
#[command(name = "kuboble")]
#[command(about = "A Kuboble level generator, solver and verifier", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate random solvable levels
    Generate {
        /// Grid width
        #[arg(short = 'W', long, default_value = "5")]
        width: usize,

        /// Grid height
        #[arg(short = 'H', long, default_value = "5")]
        height: usize,

        /// Number of pieces
        #[arg(short, long, default_value = "3")]
        pieces: usize,

        /// Number of obstacles
        #[arg(short, long, default_value = "5")]
        obstacles: usize,

        /// Candidate levels to try per generated level
        #[arg(short, long, default_value = "100")]
        attempts: usize,

        /// Longest solution to search for
        #[arg(short = 'd', long, default_value = "25")]
        max_depth: usize,

        /// Accept levels that are solved from the start
        #[arg(long, default_value = "false")]
        allow_trivial: bool,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of levels to generate
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Solve levels from a file (one level per line)
    Solve {
        /// Path to the levels file
        #[arg(value_name = "FILE")]
        levels_file: String,

        /// Level number to solve (1-indexed), or start of range
        #[arg(value_name = "LEVEL")]
        level_start: usize,

        /// Optional end of level range (inclusive, 1-indexed)
        #[arg(value_name = "LEVEL_END")]
        level_end: Option<usize>,

        /// Longest solution to search for
        #[arg(short = 'd', long, default_value = "25")]
        max_depth: usize,

        /// Print the solution step-by-step
        #[arg(short, long)]
        print_solution: bool,
    },

    /// Check a solution against a level
    Verify {
        /// Level text, e.g. "A . ;. a"
        level: String,

        /// Solution text, e.g. "A down; A right"
        solution: String,
    },
}

fn run_generate(config: GeneratorConfig, seed: Option<u64>, count: usize) {
    let seed = seed.unwrap_or_else(rand::random);
    let mut generator = Generator::with_seed(config, seed);

    for _ in 0..count {
        match generator.generate() {
            Ok(Some(generated)) => {
                println!("level: {}", generated.level);
                println!("solution ({} moves): {}", generated.moves.len(), generated.solution);
            }
            Ok(None) => {
                let config = generator.config();
                eprintln!(
                    "No solvable {}x{} level with {} pieces found in {} attempts (seed {})",
                    config.width,
                    config.height,
                    config.num_pieces,
                    generator.attempts(),
                    seed
                );
                std::process::exit(2);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run_solve(
    levels_file: &str,
    level_start: usize,
    level_end: Option<usize>,
    max_depth: usize,
    print_solution: bool,
) {
    let levels = match Levels::from_file(levels_file) {
        Ok(levels) => levels,
        Err(e) => {
            eprintln!("Error loading levels: {}", e);
            std::process::exit(1);
        }
    };

    let level_end = level_end.unwrap_or(level_start);

    if level_start == 0 {
        eprintln!("Error: level numbers must be at least 1");
        std::process::exit(1);
    }

    if level_end < level_start {
        eprintln!("Error: level end must be >= level start");
        std::process::exit(1);
    }

    if level_end > levels.len() {
        eprintln!(
            "Error: level {} not found (file contains {} levels)",
            level_end,
            levels.len()
        );
        std::process::exit(1);
    }

    let num_levels = level_end - level_start + 1;
    if print_solution && num_levels > 1 {
        eprintln!("Error: solution printing only supported when solving a single level");
        std::process::exit(1);
    }

    let mut total_solved = 0;
    let mut total_steps = 0;
    let mut total_states = 0;
    let mut total_time_ms = 0;

    for level_num in level_start..=level_end {
        let Some(board) = levels.get(level_num - 1) else {
            continue;
        };
        let stats = solve_level(level_num, board, max_depth, print_solution);

        if stats.solved {
            total_solved += 1;
        }
        total_steps += stats.steps;
        total_states += stats.states_explored;
        total_time_ms += stats.elapsed_ms;
    }

    if num_levels > 1 {
        println!("---");
        println!(
            "solved: {:>3}/{:<3}        steps: {:<5}  states: {:<12}  elapsed: {} ms",
            total_solved, num_levels, total_steps, total_states, total_time_ms
        );
    }
}

fn run_verify(level: &str, solution: &str) {
    match verifier::check(level, solution) {
        Ok(()) => println!("valid"),
        Err(rejection) => {
            println!("invalid ({}): {}", rejection.code(), rejection);
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            width,
            height,
            pieces,
            obstacles,
            attempts,
            max_depth,
            allow_trivial,
            seed,
            count,
        } => {
            let config = GeneratorConfig {
                width,
                height,
                num_pieces: pieces,
                num_obstacles: obstacles,
                max_attempts: attempts,
                max_depth,
                require_non_trivial: !allow_trivial,
            };
            run_generate(config, seed, count);
        }
        Command::Solve {
            levels_file,
            level_start,
            level_end,
            max_depth,
            print_solution,
        } => run_solve(&levels_file, level_start, level_end, max_depth, print_solution),
        Command::Verify { level, solution } => run_verify(&level, &solution),
    }
}
