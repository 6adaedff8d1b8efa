//! Automated participants: the word-supply trait, a lexicon-backed
//! implementation, and the delayed-move scheduler.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::task::JoinHandle;

use crate::engine::bot_profiles::{BotParams, BotProfilesFile};
use crate::engine::models::Difficulty;
use crate::kana::{normalize, validator};

/// Supplies candidate words for automated turns. `starting_char` is the
/// comparison-form sound the word must open with (`None` at the start of
/// the chain). Returning `None` concedes the turn: the engine eliminates
/// the computer participant with reason "no word found".
pub trait WordSource: Send + Sync {
    fn suggest(&self, starting_char: Option<char>, difficulty: Difficulty) -> Option<String>;
}

/// Word-list-backed source used by the arena, the demo binary, and tests.
/// Difficulty scales the visible share of the lexicon and whether words
/// ending on the forbidden terminal are avoided. Each word is offered at
/// most once, so a source instance belongs to a single match.
pub struct LexiconSource {
    words: Vec<String>,
    params: [BotParams; 3],
    rng: Mutex<StdRng>,
    offered: Mutex<HashSet<String>>,
}

impl LexiconSource {
    pub fn new(words: Vec<String>, profiles: &BotProfilesFile) -> Self {
        Self::with_rng(words, profiles, StdRng::from_entropy())
    }

    pub fn seeded(words: Vec<String>, profiles: &BotProfilesFile, seed: u64) -> Self {
        Self::with_rng(words, profiles, StdRng::seed_from_u64(seed))
    }

    fn with_rng(words: Vec<String>, profiles: &BotProfilesFile, rng: StdRng) -> Self {
        Self {
            words,
            params: [
                profiles.params_for(Difficulty::Easy),
                profiles.params_for(Difficulty::Medium),
                profiles.params_for(Difficulty::Hard),
            ],
            rng: Mutex::new(rng),
            offered: Mutex::new(HashSet::new()),
        }
    }

    fn params(&self, difficulty: Difficulty) -> BotParams {
        match difficulty {
            Difficulty::Easy => self.params[0],
            Difficulty::Medium => self.params[1],
            Difficulty::Hard => self.params[2],
        }
    }
}

impl WordSource for LexiconSource {
    fn suggest(&self, starting_char: Option<char>, difficulty: Difficulty) -> Option<String> {
        let params = self.params(difficulty);
        let visible = ((self.words.len() as f64 * params.vocabulary_share).ceil() as usize)
            .min(self.words.len());

        let offered = self.offered.lock().expect("lexicon offered lock");
        let candidates: Vec<&String> = self.words[..visible]
            .iter()
            .filter(|w| !offered.contains(*w))
            .filter(|w| match starting_char {
                Some(start) => normalize::first_char(w) == Some(start),
                None => true,
            })
            .filter(|w| !params.avoid_terminal || !validator::ends_with_forbidden_terminal(w))
            .collect();
        drop(offered);

        let mut rng = self.rng.lock().expect("lexicon rng lock");
        let pick = candidates.choose(&mut *rng).map(|w| (*w).clone())?;
        self.offered
            .lock()
            .expect("lexicon offered lock")
            .insert(pick.clone());
        Some(pick)
    }
}

/// At most one pending automated move. Scheduling replaces (aborts) any
/// pending task; cancellation is synchronous and idempotent. The guard
/// that drops a stale move (the turn moved on or the match ended during
/// the thinking delay) lives in the closure the session builds.
pub struct MoveScheduler {
    pending: Option<JoinHandle<()>>,
}

impl MoveScheduler {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Fire `apply` after `delay`, replacing any pending move.
    pub fn schedule<F>(&mut self, delay: Duration, apply: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            apply();
        }));
    }

    /// Abort the pending move. Safe when nothing is pending.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Default for MoveScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MoveScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn lexicon(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn source(words: &[&str]) -> LexiconSource {
        LexiconSource::seeded(lexicon(words), &BotProfilesFile::default(), 11)
    }

    #[test]
    fn suggestions_honor_the_starting_char() {
        let source = source(&["さかな", "なす", "すいか"]);
        let word = source.suggest(Some('な'), Difficulty::Hard);
        assert_eq!(word.as_deref(), Some("なす"));
    }

    #[test]
    fn unconstrained_start_draws_from_the_whole_lexicon() {
        let source = source(&["さかな", "なす", "すいか"]);
        assert!(source.suggest(None, Difficulty::Hard).is_some());
    }

    #[test]
    fn each_word_is_offered_once() {
        let source = source(&["なす", "なし", "なわ"]);
        let mut seen = HashSet::new();
        for _ in 0..3 {
            let word = source
                .suggest(Some('な'), Difficulty::Hard)
                .expect("lexicon not yet exhausted");
            assert!(seen.insert(word));
        }
        assert_eq!(source.suggest(Some('な'), Difficulty::Hard), None);
    }

    #[test]
    fn none_when_nothing_connects() {
        let source = source(&["さかな", "すいか"]);
        assert_eq!(source.suggest(Some('り'), Difficulty::Hard), None);
    }

    #[test]
    fn hard_bots_avoid_terminal_words() {
        let source = source(&["みかん", "みそ"]);
        assert_eq!(
            source.suggest(Some('み'), Difficulty::Hard).as_deref(),
            Some("みそ")
        );
        // Easy bots have no such scruples; only the terminal word is left.
        assert_eq!(
            source.suggest(Some('み'), Difficulty::Easy).as_deref(),
            Some("みかん")
        );
    }

    #[test]
    fn seeded_sources_are_deterministic() {
        let words = ["なす", "なし", "なわ", "なべ", "なつ"];
        let run = |seed: u64| {
            let source = LexiconSource::seeded(lexicon(&words), &BotProfilesFile::default(), seed);
            (0..5)
                .map(|_| source.suggest(Some('な'), Difficulty::Hard))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(3), run(3));
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_move_fires_after_the_delay() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = MoveScheduler::new();
        let counter = fired.clone();
        scheduler.schedule(Duration::from_millis(800), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(scheduler.is_pending());

        tokio::time::sleep(Duration::from_millis(900)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_discards_the_pending_move() {
        let fired = Arc::new(AtomicUsize::new(0));
        let mut scheduler = MoveScheduler::new();
        scheduler.cancel(); // idle cancel is fine

        let counter = fired.clone();
        scheduler.schedule(Duration::from_millis(500), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel();
        scheduler.cancel();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_move() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut scheduler = MoveScheduler::new();

        let counter = first.clone();
        scheduler.schedule(Duration::from_millis(500), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = second.clone();
        scheduler.schedule(Duration::from_millis(500), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }
}
