//! Arena CLI — run bot-vs-bot word-chain experiments from the command line.
//!
//! Usage:
//!   cargo run --release --bin arena -- --matches 100 --p1-difficulty hard --p2-difficulty easy
//!   cargo run --release --bin arena -- --matches 50 --win-condition first-elimination --lexicon words.txt

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use shiritori_engine::engine::arena::{run_arena, sample_lexicon, ArenaSeat};
use shiritori_engine::engine::bot_profiles::{load_default_profiles, load_profiles};
use shiritori_engine::engine::models::{Difficulty, WinCondition};

#[derive(Parser)]
#[command(name = "arena", about = "Run bot-vs-bot shiritori arena experiments")]
struct Cli {
    /// Number of matches to play
    #[arg(long, default_value = "100")]
    matches: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Win condition: "last-standing" or "first-elimination"
    #[arg(long, default_value = "last-standing")]
    win_condition: String,

    /// Alternate seat positions between matches
    #[arg(long, default_value = "true")]
    alternate_seats: bool,

    /// Path to bot_profiles.toml (default: auto-discover)
    #[arg(long, env = "SHIRITORI_BOT_PROFILES")]
    profiles: Option<PathBuf>,

    /// Lexicon file, one word per line (built-in sample when unset)
    #[arg(long, env = "SHIRITORI_LEXICON")]
    lexicon: Option<PathBuf>,

    /// P1 display name
    #[arg(long, default_value = "p1")]
    p1_name: String,

    /// P1 difficulty: "easy", "medium" or "hard"
    #[arg(long, default_value = "hard")]
    p1_difficulty: String,

    /// P2 display name
    #[arg(long, default_value = "p2")]
    p2_name: String,

    /// P2 difficulty: "easy", "medium" or "hard"
    #[arg(long, default_value = "easy")]
    p2_difficulty: String,
}

fn parse_difficulty(value: &str) -> Difficulty {
    match value {
        "easy" => Difficulty::Easy,
        "medium" => Difficulty::Medium,
        "hard" => Difficulty::Hard,
        other => {
            eprintln!("Warning: unknown difficulty '{}', using medium", other);
            Difficulty::Medium
        }
    }
}

fn parse_win_condition(value: &str) -> WinCondition {
    match value {
        "first-elimination" => WinCondition::FirstElimination,
        "last-standing" => WinCondition::LastStanding,
        other => {
            eprintln!(
                "Warning: unknown win condition '{}', using last-standing",
                other
            );
            WinCondition::LastStanding
        }
    }
}

fn load_lexicon(path: Option<&PathBuf>) -> Vec<String> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading lexicon {}: {}", path.display(), e);
                std::process::exit(1);
            });
            let words: Vec<String> = content
                .lines()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect();
            if words.is_empty() {
                eprintln!("Error: lexicon {} contains no words", path.display());
                std::process::exit(1);
            }
            words
        }
        None => sample_lexicon(),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let profiles = match &cli.profiles {
        Some(path) => load_profiles(path).unwrap_or_else(|e| {
            eprintln!("Error loading profiles: {}", e);
            std::process::exit(1);
        }),
        None => load_default_profiles(),
    };

    let lexicon = load_lexicon(cli.lexicon.as_ref());
    let win_condition = parse_win_condition(&cli.win_condition);
    let seats = vec![
        ArenaSeat {
            name: cli.p1_name.clone(),
            difficulty: parse_difficulty(&cli.p1_difficulty),
        },
        ArenaSeat {
            name: cli.p2_name.clone(),
            difficulty: parse_difficulty(&cli.p2_difficulty),
        },
    ];

    eprintln!(
        "Arena: {} matches, seed={}, win_condition={}, alternate_seats={}, lexicon={} words",
        cli.matches,
        cli.seed,
        cli.win_condition,
        cli.alternate_seats,
        lexicon.len(),
    );
    for seat in &seats {
        eprintln!("  {}: difficulty={:?}", seat.name, seat.difficulty);
    }
    eprintln!();

    let total = cli.matches;
    let progress = move |done: usize, _total: usize| {
        eprint!("\r  [{}/{}] matches completed", done, total);
    };

    let result = run_arena(
        &lexicon,
        &seats,
        cli.matches,
        cli.seed,
        win_condition,
        &profiles,
        cli.alternate_seats,
        Some(&progress),
    );

    eprintln!("\r                                    "); // clear progress line
    println!("{}", result.summary());
}
