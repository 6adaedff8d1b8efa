//! Stateless chain rules: single-word acceptability, pairwise connectivity,
//! forbidden-terminal detection, and full-chain validation.
//!
//! `validate_chain` re-checks the entire word list on every call. The
//! recomputation is cheap at match scale and keeps the rules free of
//! incremental state.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalize::{self, FORBIDDEN_TERMINAL, FOREIGN_DIGRAPHS};

/// Why a word list fails to form a legal chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainViolation {
    EmptyInput,
    DuplicateWord(String),
    UnacceptableWord(String),
    ForbiddenTerminal(String),
    BrokenConnection { previous: String, next: String },
}

impl fmt::Display for ChainViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainViolation::EmptyInput => write!(f, "no words were submitted"),
            ChainViolation::DuplicateWord(word) => {
                write!(f, "'{}' has already been used", word)
            }
            ChainViolation::UnacceptableWord(word) => {
                write!(f, "'{}' is not a usable word", word)
            }
            ChainViolation::ForbiddenTerminal(word) => {
                write!(f, "'{}' ends with the forbidden sound '{}'", word, FORBIDDEN_TERMINAL)
            }
            ChainViolation::BrokenConnection { previous, next } => {
                write!(f, "'{}' does not follow from '{}'", next, previous)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(ChainViolation),
}

/// Single-word screen: script range, repetition patterns, and the
/// loanword-digraph dominance heuristic against garbled speech input.
pub fn is_acceptable_word(word: &str) -> bool {
    let chars: Vec<char> = word.trim().chars().collect();
    if chars.is_empty() {
        return false;
    }
    if !chars.iter().copied().all(normalize::is_kana) {
        return false;
    }
    let folded: Vec<char> = chars.iter().map(|&c| normalize::fold_katakana(c)).collect();
    if has_stuck_repetition(&folded) {
        return false;
    }
    if is_digraph_dominated(&folded) {
        return false;
    }
    true
}

/// A single char repeated 4+ times in a row, or a 2- or 3-char block
/// repeated 3+ times in a row.
fn has_stuck_repetition(chars: &[char]) -> bool {
    let mut run = 1usize;
    for pair in chars.windows(2) {
        if pair[0] == pair[1] {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 1;
        }
    }

    for width in 2..=3usize {
        if chars.len() < width * 3 {
            continue;
        }
        for start in 0..=chars.len() - width * 3 {
            let block = &chars[start..start + width];
            if (1..3).all(|k| &chars[start + k * width..start + (k + 1) * width] == block) {
                return true;
            }
        }
    }
    false
}

/// More than half of the word covered by foreign-sound digraphs.
/// Non-overlapping left-to-right scan.
fn is_digraph_dominated(chars: &[char]) -> bool {
    if chars.len() < 2 {
        return false;
    }
    let mut covered = 0usize;
    let mut i = 0usize;
    while i + 1 < chars.len() {
        let pair = [chars[i], chars[i + 1]];
        if FOREIGN_DIGRAPHS.contains(&pair) {
            covered += 2;
            i += 2;
        } else {
            i += 1;
        }
    }
    covered * 2 > chars.len()
}

/// True iff `next` picks up on the sound `previous` ends with, in the
/// folded comparison form. Empty inputs never connect.
pub fn can_follow(previous: &str, next: &str) -> bool {
    match (normalize::last_char(previous), normalize::first_char(next)) {
        (Some(tail), Some(head)) => tail == head,
        _ => false,
    }
}

/// True iff the word's comparison form ends in the forbidden terminal.
pub fn ends_with_forbidden_terminal(word: &str) -> bool {
    normalize::last_char(word) == Some(FORBIDDEN_TERMINAL)
}

/// Judge a full chain: the words already played plus the candidate
/// appended. Checks short-circuit in order: empty input, exact duplicates
/// (raw equality, not the folded form), per-word acceptability and
/// terminal sound, then adjacent connectivity.
pub fn validate_chain(words: &[String]) -> ValidationOutcome {
    if words.is_empty() {
        return ValidationOutcome::Invalid(ChainViolation::EmptyInput);
    }

    for (i, word) in words.iter().enumerate() {
        if words[..i].iter().any(|prior| prior == word) {
            return ValidationOutcome::Invalid(ChainViolation::DuplicateWord(word.clone()));
        }
    }

    for word in words {
        if !is_acceptable_word(word) {
            return ValidationOutcome::Invalid(ChainViolation::UnacceptableWord(word.clone()));
        }
        if ends_with_forbidden_terminal(word) {
            return ValidationOutcome::Invalid(ChainViolation::ForbiddenTerminal(word.clone()));
        }
    }

    for pair in words.windows(2) {
        if !can_follow(&pair[0], &pair[1]) {
            return ValidationOutcome::Invalid(ChainViolation::BrokenConnection {
                previous: pair[0].clone(),
                next: pair[1].clone(),
            });
        }
    }

    ValidationOutcome::Valid
}
