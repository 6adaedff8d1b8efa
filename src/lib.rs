//! Turn-based word-chain (shiritori) match engine.
//!
//! `kana` holds the stateless chain rules; `engine` owns match state,
//! the countdown clock, automated participants, and the arena harness.

pub mod engine;
pub mod kana;
