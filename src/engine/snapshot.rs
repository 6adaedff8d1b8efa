//! Match-state persistence: capture a serializable snapshot and restore
//! it with full invariant re-validation.
//!
//! Restore refuses an inconsistent snapshot rather than guessing a fix;
//! the caller falls back to a fresh match.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::game::GameEngine;
use crate::engine::models::*;

/// Upper bound on accepted words a snapshot may carry.
pub const MAX_SNAPSHOT_WORDS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub config: MatchConfig,
    pub turn_counter: u64,
    pub used_words: Vec<String>,
    pub attributions: Vec<PlayedWord>,
    pub eliminated: Vec<ParticipantId>,
    pub elimination_log: Vec<EliminationRecord>,
    pub winner_id: Option<ParticipantId>,
    pub time_remaining_seconds: u32,
    pub phase: MatchPhase,
    pub end_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    NoParticipants,
    DuplicateParticipant(ParticipantId),
    UnknownParticipant(ParticipantId),
    WordAttributionMismatch,
    DuplicateUsedWord(String),
    TooManyWords(usize),
    InconsistentEliminationLog,
    WinnerBeforeEnd,
    UnknownWinner(ParticipantId),
    CountdownOutOfRange { remaining: u32, limit: u32 },
    NoTurnHolder,
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::NoParticipants => write!(f, "snapshot has no participants"),
            RestoreError::DuplicateParticipant(id) => {
                write!(f, "participant id '{}' appears twice", id)
            }
            RestoreError::UnknownParticipant(id) => {
                write!(f, "snapshot references unknown participant '{}'", id)
            }
            RestoreError::WordAttributionMismatch => {
                write!(f, "used words and attributions disagree")
            }
            RestoreError::DuplicateUsedWord(word) => {
                write!(f, "used word '{}' appears twice", word)
            }
            RestoreError::TooManyWords(n) => {
                write!(f, "{} used words exceeds the limit of {}", n, MAX_SNAPSHOT_WORDS)
            }
            RestoreError::InconsistentEliminationLog => {
                write!(f, "elimination log does not match the eliminated set")
            }
            RestoreError::WinnerBeforeEnd => {
                write!(f, "snapshot has a winner but the match has not ended")
            }
            RestoreError::UnknownWinner(id) => {
                write!(f, "winner '{}' is not a participant", id)
            }
            RestoreError::CountdownOutOfRange { remaining, limit } => {
                write!(f, "countdown {}s exceeds the {}s limit", remaining, limit)
            }
            RestoreError::NoTurnHolder => {
                write!(f, "a live match needs at least one active participant")
            }
        }
    }
}

impl std::error::Error for RestoreError {}

impl MatchSnapshot {
    pub fn capture(engine: &GameEngine) -> Self {
        Self {
            config: engine.config.clone(),
            turn_counter: engine.turn_counter,
            used_words: engine.used_words.clone(),
            attributions: engine.attributions.clone(),
            eliminated: engine.eliminated.iter().cloned().collect(),
            elimination_log: engine.elimination_log.clone(),
            winner_id: engine.winner.as_ref().map(|p| p.id.clone()),
            time_remaining_seconds: engine.time_remaining_seconds,
            phase: engine.phase,
            end_reason: engine.end_reason.clone(),
        }
    }

    /// Rebuild an engine, refusing any snapshot whose state violates the
    /// match invariants.
    pub fn restore(self) -> Result<GameEngine, RestoreError> {
        self.validate()?;

        let winner = self.winner_id.as_ref().and_then(|id| {
            self.config
                .participants
                .iter()
                .find(|p| &p.id == id)
                .cloned()
        });

        let mut engine = GameEngine::new(self.config.clone());
        engine.turn_counter = self.turn_counter;
        engine.used_words = self.used_words;
        engine.attributions = self.attributions;
        engine.eliminated = self.eliminated.into_iter().collect();
        engine.elimination_log = self.elimination_log;
        engine.winner = winner;
        engine.time_remaining_seconds = self.time_remaining_seconds;
        engine.phase = self.phase;
        engine.end_reason = self.end_reason;
        Ok(engine)
    }

    fn validate(&self) -> Result<(), RestoreError> {
        let participants = &self.config.participants;
        if participants.is_empty() {
            return Err(RestoreError::NoParticipants);
        }
        for (i, p) in participants.iter().enumerate() {
            if participants[..i].iter().any(|q| q.id == p.id) {
                return Err(RestoreError::DuplicateParticipant(p.id.clone()));
            }
        }
        let known = |id: &ParticipantId| participants.iter().any(|p| &p.id == id);

        if let Some(winner_id) = &self.winner_id {
            if self.phase != MatchPhase::Ended {
                return Err(RestoreError::WinnerBeforeEnd);
            }
            if !known(winner_id) {
                return Err(RestoreError::UnknownWinner(winner_id.clone()));
            }
        }

        for id in &self.eliminated {
            if !known(id) {
                return Err(RestoreError::UnknownParticipant(id.clone()));
            }
        }

        if self.used_words.len() > MAX_SNAPSHOT_WORDS {
            return Err(RestoreError::TooManyWords(self.used_words.len()));
        }
        if self.attributions.len() != self.used_words.len() {
            return Err(RestoreError::WordAttributionMismatch);
        }
        for (word, played) in self.used_words.iter().zip(&self.attributions) {
            if word != &played.word {
                return Err(RestoreError::WordAttributionMismatch);
            }
            if !known(&played.participant_id) {
                return Err(RestoreError::UnknownParticipant(played.participant_id.clone()));
            }
        }
        for (i, word) in self.used_words.iter().enumerate() {
            if self.used_words[..i].contains(word) {
                return Err(RestoreError::DuplicateUsedWord(word.clone()));
            }
        }

        let eliminated: BTreeSet<&ParticipantId> = self.eliminated.iter().collect();
        if eliminated.len() != self.eliminated.len()
            || self.elimination_log.len() != eliminated.len()
        {
            return Err(RestoreError::InconsistentEliminationLog);
        }
        for (i, record) in self.elimination_log.iter().enumerate() {
            if record.rank as usize != i + 1 || !eliminated.contains(&record.participant_id) {
                return Err(RestoreError::InconsistentEliminationLog);
            }
        }

        if self.time_remaining_seconds > self.config.time_limit_seconds {
            return Err(RestoreError::CountdownOutOfRange {
                remaining: self.time_remaining_seconds,
                limit: self.config.time_limit_seconds,
            });
        }

        if self.phase != MatchPhase::Ended
            && !participants.iter().any(|p| !eliminated.contains(&p.id))
        {
            return Err(RestoreError::NoTurnHolder);
        }

        Ok(())
    }
}

impl GameEngine {
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::capture(self)
    }

    pub fn restore(snapshot: MatchSnapshot) -> Result<GameEngine, RestoreError> {
        snapshot.restore()
    }
}
