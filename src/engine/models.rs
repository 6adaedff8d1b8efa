//! Core match data types.

use serde::{Deserialize, Serialize};

pub type ParticipantId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Human,
    Computer { difficulty: Difficulty },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub role: ParticipantRole,
}

impl Participant {
    pub fn human(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: ParticipantRole::Human,
        }
    }

    pub fn computer(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: ParticipantRole::Computer { difficulty },
        }
    }

    pub fn is_computer(&self) -> bool {
        matches!(self.role, ParticipantRole::Computer { .. })
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        match self.role {
            ParticipantRole::Computer { difficulty } => Some(difficulty),
            ParticipantRole::Human => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinCondition {
    /// Play until one participant remains.
    LastStanding,
    /// The first elimination ends the match; a survivor is drawn at random.
    FirstElimination,
}

/// Immutable per-match setup. `turn_order` may disagree with
/// `participants`: unknown listed ids are dropped, unlisted active
/// participants are appended at the end of the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub turn_order: Vec<ParticipantId>,
    /// 0 disables the countdown.
    #[serde(default)]
    pub time_limit_seconds: u32,
    pub win_condition: WinCondition,
    /// Seeds the winner draw under `FirstElimination`; entropy when absent.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Idle,
    Active,
    Paused,
    Ended,
}

/// One accepted word and who played it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedWord {
    pub word: String,
    pub participant_id: ParticipantId,
}

/// `rank` is 1 for the first player out, 2 for the second, and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationRecord {
    pub participant_id: ParticipantId,
    pub reason: String,
    pub rank: u32,
}

/// Result of a word submission. Rejections leave match state untouched;
/// `Eliminated` is a completed state transition, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Eliminated(String),
    WrongTurn,
    GameNotActive,
    InvalidWord(String),
    DuplicateWord(String),
}

/// Payload handed to `MatchEndObserver`s when the match ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner: Option<Participant>,
    pub used_words: Vec<String>,
    pub elimination_log: Vec<EliminationRecord>,
    pub duration_seconds: u64,
    pub end_reason: String,
}

pub const END_REASON_LAST_STANDING: &str = "last standing";
pub const END_REASON_ALL_ELIMINATED: &str = "all eliminated";
pub const END_REASON_FIRST_ELIMINATION: &str = "first elimination";
pub const END_REASON_ABORTED: &str = "aborted";

/// Notified with the new turn-holder whenever the turn advances,
/// including at match start.
pub trait TurnChangeObserver: Send {
    fn on_turn_changed(&self, holder: &Participant);
}

/// Notified exactly once, when the match ends.
pub trait MatchEndObserver: Send {
    fn on_match_ended(&self, summary: &MatchSummary);
}
