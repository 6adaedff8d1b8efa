//! Match state machine: turn ownership, eliminations, win resolution,
//! and countdown bookkeeping.
//!
//! `GameEngine` is synchronous and single-writer. The async shell
//! (`session`) serializes the clock tick and automated moves onto it;
//! every mutating entry point re-checks the phase so an operation that
//! raced a pause or an end is discarded instead of applied.

use std::collections::BTreeSet;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::engine::models::*;
use crate::kana::normalize;
use crate::kana::validator::{self, ChainViolation, ValidationOutcome};

pub const ELIMINATION_FORBIDDEN_TERMINAL: &str = "forbidden terminal sound";
pub const SKIP_TIME_LIMIT: &str = "time limit exceeded";
pub const SKIP_NO_WORD: &str = "no word found";

/// What a one-second clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Countdown decremented.
    Counted,
    /// Countdown hit zero; the turn-holder was skipped.
    TimedOut,
    /// Not active, or no countdown configured. Nothing changed.
    Ignored,
}

pub struct GameEngine {
    pub(crate) config: MatchConfig,
    pub(crate) turn_counter: u64,
    pub(crate) used_words: Vec<String>,
    pub(crate) attributions: Vec<PlayedWord>,
    pub(crate) eliminated: BTreeSet<ParticipantId>,
    pub(crate) elimination_log: Vec<EliminationRecord>,
    pub(crate) winner: Option<Participant>,
    pub(crate) time_remaining_seconds: u32,
    pub(crate) phase: MatchPhase,
    pub(crate) end_reason: Option<String>,
    rng: StdRng,
    started_at: Option<Instant>,
    turn_observers: Vec<Box<dyn TurnChangeObserver>>,
    end_observers: Vec<Box<dyn MatchEndObserver>>,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("config", &self.config)
            .field("turn_counter", &self.turn_counter)
            .field("used_words", &self.used_words)
            .field("attributions", &self.attributions)
            .field("eliminated", &self.eliminated)
            .field("elimination_log", &self.elimination_log)
            .field("winner", &self.winner)
            .field("time_remaining_seconds", &self.time_remaining_seconds)
            .field("phase", &self.phase)
            .field("end_reason", &self.end_reason)
            .finish_non_exhaustive()
    }
}

impl PartialEq for GameEngine {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
            && self.turn_counter == other.turn_counter
            && self.used_words == other.used_words
            && self.attributions == other.attributions
            && self.eliminated == other.eliminated
            && self.elimination_log == other.elimination_log
            && self.winner == other.winner
            && self.time_remaining_seconds == other.time_remaining_seconds
            && self.phase == other.phase
            && self.end_reason == other.end_reason
    }
}

impl GameEngine {
    pub fn new(config: MatchConfig) -> Self {
        debug_assert!(
            !config.participants.is_empty(),
            "a match needs at least one participant"
        );
        debug_assert!(
            config
                .participants
                .iter()
                .enumerate()
                .all(|(i, p)| config.participants[..i].iter().all(|q| q.id != p.id)),
            "participant ids must be unique"
        );

        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let time_remaining_seconds = config.time_limit_seconds;
        Self {
            config,
            turn_counter: 0,
            used_words: Vec::new(),
            attributions: Vec::new(),
            eliminated: BTreeSet::new(),
            elimination_log: Vec::new(),
            winner: None,
            time_remaining_seconds,
            phase: MatchPhase::Idle,
            end_reason: None,
            rng,
            started_at: None,
            turn_observers: Vec::new(),
            end_observers: Vec::new(),
        }
    }

    // --- Read accessors ---

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    pub fn used_words(&self) -> &[String] {
        &self.used_words
    }

    pub fn attributions(&self) -> &[PlayedWord] {
        &self.attributions
    }

    pub fn eliminated(&self) -> &BTreeSet<ParticipantId> {
        &self.eliminated
    }

    pub fn elimination_log(&self) -> &[EliminationRecord] {
        &self.elimination_log
    }

    pub fn winner(&self) -> Option<&Participant> {
        self.winner.as_ref()
    }

    pub fn time_remaining_seconds(&self) -> u32 {
        self.time_remaining_seconds
    }

    pub fn end_reason(&self) -> Option<&str> {
        self.end_reason.as_deref()
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.config.participants.iter().find(|p| p.id == id)
    }

    /// Sound the next word must pick up on, from the last accepted word.
    /// `None` at the start of the chain.
    pub fn starting_char(&self) -> Option<char> {
        self.used_words.last().and_then(|w| normalize::last_char(w))
    }

    /// Configured order with eliminated and unknown ids removed, then any
    /// active participants missing from the configured order appended.
    pub fn active_turn_order(&self) -> Vec<&Participant> {
        let mut order: Vec<&Participant> = Vec::new();
        for id in &self.config.turn_order {
            if self.eliminated.contains(id) || order.iter().any(|p| &p.id == id) {
                continue;
            }
            if let Some(p) = self.participant(id) {
                order.push(p);
            }
        }
        for p in &self.config.participants {
            if !self.eliminated.contains(&p.id) && !order.iter().any(|q| q.id == p.id) {
                order.push(p);
            }
        }
        order
    }

    /// Participant at `turn_counter mod active order length`, or `None`
    /// when nobody is left.
    pub fn current_turn_holder(&self) -> Option<&Participant> {
        let order = self.active_turn_order();
        if order.is_empty() {
            return None;
        }
        let idx = (self.turn_counter % order.len() as u64) as usize;
        Some(order[idx])
    }

    // --- Observers ---

    pub fn add_turn_observer(&mut self, observer: Box<dyn TurnChangeObserver>) {
        self.turn_observers.push(observer);
    }

    pub fn add_end_observer(&mut self, observer: Box<dyn MatchEndObserver>) {
        self.end_observers.push(observer);
    }

    // --- Phase transitions ---

    /// Idle → Active. Returns false from any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != MatchPhase::Idle {
            return false;
        }
        self.phase = MatchPhase::Active;
        self.started_at = Some(Instant::now());
        self.time_remaining_seconds = self.config.time_limit_seconds;
        tracing::info!(
            participants = self.config.participants.len(),
            win_condition = ?self.config.win_condition,
            time_limit_seconds = self.config.time_limit_seconds,
            "match started"
        );
        self.notify_turn_changed();
        true
    }

    /// Active → Paused. Returns false from any other phase.
    pub fn pause(&mut self) -> bool {
        if self.phase != MatchPhase::Active {
            return false;
        }
        self.phase = MatchPhase::Paused;
        true
    }

    /// Paused → Active. Returns false from any other phase.
    pub fn resume(&mut self) -> bool {
        if self.phase != MatchPhase::Paused {
            return false;
        }
        self.phase = MatchPhase::Active;
        true
    }

    /// Force the match over (user-initiated quit). The winner stays
    /// whatever it already was; calling again is a no-op.
    pub fn end_match(&mut self) {
        if self.phase == MatchPhase::Ended {
            return;
        }
        let winner = self.winner.clone();
        self.end_with(winner, END_REASON_ABORTED);
    }

    // --- Submissions ---

    /// Judge one submitted word. Rejections (`WrongTurn`, `GameNotActive`,
    /// `InvalidWord`, `DuplicateWord`) leave state untouched. An accepted
    /// word joins the chain and advances the turn; a word ending on the
    /// forbidden terminal eliminates the submitter instead.
    ///
    /// Turn advancement notifies `TurnChangeObserver`s, which is how a
    /// presentation layer learns a computer participant is up next.
    pub fn submit_word(&mut self, word: &str, by_participant_id: &str) -> SubmissionOutcome {
        if self.phase != MatchPhase::Active {
            return SubmissionOutcome::GameNotActive;
        }
        let holder = match self.current_turn_holder() {
            Some(h) => h.clone(),
            None => {
                self.resolve_no_active_participants();
                return SubmissionOutcome::GameNotActive;
            }
        };
        if holder.id != by_participant_id {
            return SubmissionOutcome::WrongTurn;
        }
        let trimmed = word.trim();
        if trimmed.is_empty() {
            return SubmissionOutcome::InvalidWord("empty word".into());
        }

        let mut candidate = self.used_words.clone();
        candidate.push(trimmed.to_string());
        match validator::validate_chain(&candidate) {
            ValidationOutcome::Valid => {
                self.used_words.push(trimmed.to_string());
                self.attributions.push(PlayedWord {
                    word: trimmed.to_string(),
                    participant_id: holder.id.clone(),
                });
                tracing::info!(
                    word = %trimmed,
                    participant = %holder.id,
                    chain_len = self.used_words.len(),
                    "word accepted"
                );
                self.advance_turn();
                SubmissionOutcome::Accepted
            }
            ValidationOutcome::Invalid(violation @ ChainViolation::ForbiddenTerminal(_)) => {
                let message = violation.to_string();
                self.eliminate_current(ELIMINATION_FORBIDDEN_TERMINAL);
                SubmissionOutcome::Eliminated(message)
            }
            ValidationOutcome::Invalid(violation @ ChainViolation::DuplicateWord(_)) => {
                SubmissionOutcome::DuplicateWord(violation.to_string())
            }
            ValidationOutcome::Invalid(violation) => {
                SubmissionOutcome::InvalidWord(violation.to_string())
            }
        }
    }

    /// Eliminate the current turn-holder for `reason` (timeout, no word
    /// available), then evaluate the win condition and move on if the
    /// match continues.
    pub fn skip_turn(&mut self, reason: &str) {
        if self.phase != MatchPhase::Active {
            return;
        }
        self.eliminate_current(reason);
    }

    /// One second of countdown. Re-checks the phase so a tick already in
    /// flight when the match pauses or ends is discarded.
    pub fn tick_second(&mut self) -> TickOutcome {
        if self.phase != MatchPhase::Active || self.config.time_limit_seconds == 0 {
            return TickOutcome::Ignored;
        }
        if self.time_remaining_seconds > 1 {
            self.time_remaining_seconds -= 1;
            return TickOutcome::Counted;
        }
        self.time_remaining_seconds = 0;
        self.skip_turn(SKIP_TIME_LIMIT);
        TickOutcome::TimedOut
    }

    pub fn summary(&self) -> MatchSummary {
        MatchSummary {
            winner: self.winner.clone(),
            used_words: self.used_words.clone(),
            elimination_log: self.elimination_log.clone(),
            duration_seconds: self
                .started_at
                .map(|t| t.elapsed().as_secs())
                .unwrap_or(0),
            end_reason: self.end_reason.clone().unwrap_or_default(),
        }
    }

    // --- Internals ---

    fn advance_turn(&mut self) {
        self.turn_counter += 1;
        self.time_remaining_seconds = self.config.time_limit_seconds;
        self.notify_turn_changed();
    }

    fn notify_turn_changed(&self) {
        if let Some(holder) = self.current_turn_holder() {
            for observer in &self.turn_observers {
                observer.on_turn_changed(holder);
            }
        }
    }

    fn eliminate_current(&mut self, reason: &str) {
        let holder = match self.current_turn_holder() {
            Some(h) => h.clone(),
            None => {
                self.resolve_no_active_participants();
                return;
            }
        };
        self.eliminated.insert(holder.id.clone());
        let rank = (self.elimination_log.len() + 1) as u32;
        self.elimination_log.push(EliminationRecord {
            participant_id: holder.id.clone(),
            reason: reason.to_string(),
            rank,
        });
        tracing::info!(participant = %holder.id, reason = %reason, rank, "participant eliminated");
        self.evaluate_win_condition();
        if self.phase == MatchPhase::Active {
            self.advance_turn();
        }
    }

    /// Run after every elimination, never after a mere rejection.
    fn evaluate_win_condition(&mut self) {
        let active: Vec<Participant> = self.active_turn_order().into_iter().cloned().collect();

        if active.len() == 1 {
            let winner = active[0].clone();
            self.end_with(Some(winner), END_REASON_LAST_STANDING);
            return;
        }
        if active.is_empty() {
            self.end_with(None, END_REASON_ALL_ELIMINATED);
            return;
        }
        if self.config.win_condition == WinCondition::FirstElimination
            && !self.elimination_log.is_empty()
        {
            let holder_id = self.current_turn_holder().map(|h| h.id.clone());
            let mut candidates: Vec<&Participant> = active
                .iter()
                .filter(|p| Some(&p.id) != holder_id.as_ref())
                .collect();
            if candidates.is_empty() {
                candidates = active.iter().collect();
            }
            if let Some(winner) = candidates.choose(&mut self.rng) {
                let winner = (*winner).clone();
                self.end_with(Some(winner), END_REASON_FIRST_ELIMINATION);
            }
        }
    }

    /// Degenerate state: a turn-holder was needed but nobody is left.
    fn resolve_no_active_participants(&mut self) {
        tracing::warn!("no active participants remain, resolving as a draw");
        self.end_with(None, END_REASON_ALL_ELIMINATED);
    }

    fn end_with(&mut self, winner: Option<Participant>, reason: &str) {
        if self.phase == MatchPhase::Ended {
            return;
        }
        self.winner = winner;
        self.phase = MatchPhase::Ended;
        self.end_reason = Some(reason.to_string());
        tracing::info!(
            winner = ?self.winner.as_ref().map(|p| p.id.as_str()),
            reason,
            words_played = self.used_words.len(),
            "match ended"
        );
        let summary = self.summary();
        for observer in &self.end_observers {
            observer.on_match_ended(&summary);
        }
    }
}
