//! Bot-vs-bot arena: drive full automated matches synchronously and
//! aggregate the results. Matches fan out across cores via rayon.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::engine::bot::{LexiconSource, WordSource};
use crate::engine::bot_profiles::BotProfilesFile;
use crate::engine::game::{GameEngine, SKIP_NO_WORD};
use crate::engine::models::*;

/// Safety valve against a non-terminating match loop.
const MAX_TURNS_PER_MATCH: usize = 10_000;

/// Compact starter lexicon for demos, tests, and the arena CLI. A few
/// entries deliberately end on the forbidden terminal so careless bots
/// can lose to it.
pub const SAMPLE_LEXICON: &[&str] = &[
    "さかな", "なす", "すいか", "かさ", "さくら", "らくだ", "だるま", "まくら", "めだか",
    "かめ", "めがね", "ねこ", "こま", "まど", "どんぐり", "りんご", "ごりら", "らっぱ",
    "ぱんだ", "だちょう", "うさぎ", "ぎんこう", "うま", "まり", "りす", "すずめ", "めろん",
    "みかん", "れもん", "わに", "にわとり", "りゆう", "うちわ", "たぬき", "きつね", "ねずみ",
    "みみず", "ずぼん", "つくえ", "えんぴつ", "つばめ", "けいと", "とけい", "いちご",
    "ごはん", "はさみ", "みそ", "そら", "らいおん", "おに", "にんじん", "しか", "かい",
    "いし", "しまうま", "まつげ", "けむし",
];

pub fn sample_lexicon() -> Vec<String> {
    SAMPLE_LEXICON.iter().map(|w| w.to_string()).collect()
}

/// One seat in an arena match. The name doubles as the participant id.
#[derive(Debug, Clone)]
pub struct ArenaSeat {
    pub name: String,
    pub difficulty: Difficulty,
}

/// Aggregated results from an arena run.
pub struct ArenaResult {
    pub num_matches: usize,
    pub wins: HashMap<String, usize>,
    pub draws: usize,
    pub words_played: Vec<usize>,
    pub elimination_reasons: HashMap<String, usize>,
}

impl ArenaResult {
    pub fn win_rate(&self, name: &str) -> f64 {
        *self.wins.get(name).unwrap_or(&0) as f64 / self.num_matches.max(1) as f64
    }

    pub fn avg_words_played(&self) -> f64 {
        if self.words_played.is_empty() {
            return 0.0;
        }
        self.words_played.iter().sum::<usize>() as f64 / self.words_played.len() as f64
    }

    /// Wilson interval on the win rate.
    pub fn confidence_interval_95(&self, name: &str) -> (f64, f64) {
        let n = self.num_matches;
        if n == 0 {
            return (0.0, 0.0);
        }
        let p = self.win_rate(name);
        let z = 1.96_f64;
        let denom = 1.0 + z * z / n as f64;
        let center = (p + z * z / (2.0 * n as f64)) / denom;
        let margin = z * ((p * (1.0 - p) + z * z / (4.0 * n as f64)) / n as f64).sqrt() / denom;
        ((center - margin).max(0.0), (center + margin).min(1.0))
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![format!("Arena Results ({} matches)", self.num_matches)];
        lines.push("=".repeat(60));
        let mut names: Vec<&String> = self.wins.keys().collect();
        names.sort();
        for name in names {
            let wr = self.win_rate(name);
            let (ci_lo, ci_hi) = self.confidence_interval_95(name);
            lines.push(format!(
                "  {:>12}: {:3} wins ({:5.1}%)  [95% CI: {:.1}%-{:.1}%]",
                name,
                self.wins[name],
                wr * 100.0,
                ci_lo * 100.0,
                ci_hi * 100.0,
            ));
        }
        lines.push(format!("  {:>12}: {}", "Draws", self.draws));
        lines.push(format!("  Avg words per match: {:.1}", self.avg_words_played()));
        if !self.elimination_reasons.is_empty() {
            let mut reasons: Vec<(&String, &usize)> = self.elimination_reasons.iter().collect();
            reasons.sort();
            let parts: Vec<String> = reasons
                .iter()
                .map(|(reason, count)| format!("{}: {}", reason, count))
                .collect();
            lines.push(format!("  Eliminations by reason: {}", parts.join(", ")));
        }
        lines.join("\n")
    }
}

struct MatchOutcome {
    winner: Option<String>,
    words: usize,
    reasons: Vec<String>,
}

/// Run `num_matches` automated matches between the given seats and return
/// aggregated stats. Seeds derive from `base_seed`, so a run is
/// reproducible. The progress callback sees completion counts in
/// whatever order the parallel matches finish.
pub fn run_arena(
    lexicon: &[String],
    seats: &[ArenaSeat],
    num_matches: usize,
    base_seed: u64,
    win_condition: WinCondition,
    profiles: &BotProfilesFile,
    alternate_seats: bool,
    progress_callback: Option<&(dyn Fn(usize, usize) + Sync)>,
) -> ArenaResult {
    assert!(seats.len() >= 2, "arena needs at least two seats");

    let completed = AtomicUsize::new(0);
    let outcomes: Vec<MatchOutcome> = (0..num_matches)
        .into_par_iter()
        .map(|match_idx| {
            let outcome = play_match(
                lexicon,
                seats,
                base_seed + match_idx as u64,
                win_condition,
                profiles,
                if alternate_seats { match_idx } else { 0 },
            );
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = progress_callback {
                callback(done, num_matches);
            }
            outcome
        })
        .collect();

    let mut result = ArenaResult {
        num_matches,
        wins: seats.iter().map(|s| (s.name.clone(), 0)).collect(),
        draws: 0,
        words_played: Vec::with_capacity(num_matches),
        elimination_reasons: HashMap::new(),
    };
    for outcome in outcomes {
        match outcome.winner {
            Some(name) => *result.wins.entry(name).or_insert(0) += 1,
            None => result.draws += 1,
        }
        result.words_played.push(outcome.words);
        for reason in outcome.reasons {
            *result.elimination_reasons.entry(reason).or_insert(0) += 1;
        }
    }
    result
}

fn play_match(
    lexicon: &[String],
    seats: &[ArenaSeat],
    seed: u64,
    win_condition: WinCondition,
    profiles: &BotProfilesFile,
    seat_rotation: usize,
) -> MatchOutcome {
    let participants: Vec<Participant> = (0..seats.len())
        .map(|i| &seats[(i + seat_rotation) % seats.len()])
        .map(|seat| Participant::computer(seat.name.clone(), seat.name.clone(), seat.difficulty))
        .collect();
    let config = MatchConfig {
        turn_order: participants.iter().map(|p| p.id.clone()).collect(),
        participants,
        time_limit_seconds: 0,
        win_condition,
        random_seed: Some(seed),
    };
    let mut engine = GameEngine::new(config);
    let source = LexiconSource::seeded(lexicon.to_vec(), profiles, seed);

    engine.start();
    let mut guard = 0usize;
    while engine.phase() == MatchPhase::Active {
        guard += 1;
        if guard > MAX_TURNS_PER_MATCH {
            tracing::warn!(seed, "match exceeded the turn limit, aborting");
            engine.end_match();
            break;
        }
        let Some(holder) = engine.current_turn_holder().cloned() else {
            break;
        };
        let Some(difficulty) = holder.difficulty() else {
            break;
        };
        match source.suggest(engine.starting_char(), difficulty) {
            Some(word) => {
                let outcome = engine.submit_word(&word, &holder.id);
                if !matches!(
                    outcome,
                    SubmissionOutcome::Accepted | SubmissionOutcome::Eliminated(_)
                ) {
                    engine.skip_turn(SKIP_NO_WORD);
                }
            }
            None => engine.skip_turn(SKIP_NO_WORD),
        }
    }

    MatchOutcome {
        winner: engine.winner().map(|p| p.id.clone()),
        words: engine.used_words().len(),
        reasons: engine
            .elimination_log()
            .iter()
            .map(|r| r.reason.clone())
            .collect(),
    }
}
