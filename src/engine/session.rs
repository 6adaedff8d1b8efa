//! Async match driver: one mutex-owned engine, the countdown clock, and
//! automated moves.
//!
//! Every operation (submission, skip, pause, resume, end, clock tick,
//! bot move) locks the same engine, so exactly one mutation applies at a
//! time. Locks are acquired one at a time, engine first, never nested,
//! to keep the background tasks deadlock-free.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::engine::bot::{MoveScheduler, WordSource};
use crate::engine::bot_profiles::BotProfilesFile;
use crate::engine::clock::{ClockControl, TurnClock};
use crate::engine::game::{GameEngine, TickOutcome, SKIP_NO_WORD};
use crate::engine::models::*;

struct SessionInner {
    engine: Mutex<GameEngine>,
    clock: Mutex<TurnClock>,
    scheduler: Mutex<MoveScheduler>,
    source: Arc<dyn WordSource>,
    profiles: BotProfilesFile,
}

impl SessionInner {
    fn lock_engine(&self) -> MutexGuard<'_, GameEngine> {
        self.engine.lock().expect("engine lock")
    }

    fn start_clock(self: &Arc<Self>) {
        let inner = Arc::clone(self);
        self.clock
            .lock()
            .expect("clock lock")
            .start(move || inner.on_tick());
    }

    fn stop_tasks(&self) {
        self.clock.lock().expect("clock lock").cancel();
        self.scheduler.lock().expect("scheduler lock").cancel();
    }

    fn on_tick(self: &Arc<Self>) -> ClockControl {
        let (outcome, ended, holder) = {
            let mut engine = self.lock_engine();
            let outcome = engine.tick_second();
            (
                outcome,
                engine.phase() == MatchPhase::Ended,
                engine.current_turn_holder().cloned(),
            )
        };
        if ended {
            self.scheduler.lock().expect("scheduler lock").cancel();
            return ClockControl::Stop;
        }
        // Only a timeout hands the turn to someone new; rescheduling on a
        // plain count would keep resetting a pending bot's thinking delay.
        if outcome == TickOutcome::TimedOut {
            self.schedule_bot(holder);
        }
        ClockControl::Continue
    }

    fn schedule_bot(self: &Arc<Self>, holder: Option<Participant>) {
        let Some(holder) = holder else { return };
        let ParticipantRole::Computer { difficulty } = holder.role else {
            return;
        };
        let params = self.profiles.params_for(difficulty);
        let inner = Arc::clone(self);
        let expected = holder.id.clone();
        self.scheduler
            .lock()
            .expect("scheduler lock")
            .schedule(params.think_time, move || {
                inner.apply_bot_move(&expected, difficulty);
            });
    }

    fn apply_bot_move(self: &Arc<Self>, expected_id: &str, difficulty: Difficulty) {
        // The match may have ended or the turn moved on during the delay.
        let starting = {
            let engine = self.lock_engine();
            if engine.phase() != MatchPhase::Active {
                return;
            }
            match engine.current_turn_holder() {
                Some(holder) if holder.id == expected_id => engine.starting_char(),
                _ => return,
            }
        };

        let suggestion = self.source.suggest(starting, difficulty);

        let (ended, holder) = {
            let mut engine = self.lock_engine();
            // Re-check: the lock was released around suggest().
            if engine.phase() != MatchPhase::Active
                || engine.current_turn_holder().map(|h| h.id.as_str()) != Some(expected_id)
            {
                return;
            }
            match suggestion {
                Some(word) => {
                    let outcome = engine.submit_word(&word, expected_id);
                    if !matches!(
                        outcome,
                        SubmissionOutcome::Accepted | SubmissionOutcome::Eliminated(_)
                    ) {
                        // A rejected suggestion concedes the turn.
                        engine.skip_turn(SKIP_NO_WORD);
                    }
                }
                None => engine.skip_turn(SKIP_NO_WORD),
            }
            (
                engine.phase() == MatchPhase::Ended,
                engine.current_turn_holder().cloned(),
            )
        };

        if ended {
            self.clock.lock().expect("clock lock").cancel();
            self.scheduler.lock().expect("scheduler lock").cancel();
            return;
        }
        self.schedule_bot(holder);
    }
}

/// Drives one match. Owns the engine, its clock, and the bot scheduler.
pub struct MatchSession {
    inner: Arc<SessionInner>,
}

impl MatchSession {
    /// Takes an already-configured engine (observers registered, or a
    /// restored snapshot) together with the word supply for automated
    /// participants.
    pub fn new(engine: GameEngine, source: Arc<dyn WordSource>, profiles: BotProfilesFile) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                engine: Mutex::new(engine),
                clock: Mutex::new(TurnClock::new()),
                scheduler: Mutex::new(MoveScheduler::new()),
                source,
                profiles,
            }),
        }
    }

    pub fn start(&self) -> bool {
        let (started, limit, holder) = {
            let mut engine = self.inner.lock_engine();
            let started = engine.start();
            (
                started,
                engine.config().time_limit_seconds,
                engine.current_turn_holder().cloned(),
            )
        };
        if started {
            if limit > 0 {
                self.inner.start_clock();
            }
            self.inner.schedule_bot(holder);
        }
        started
    }

    pub fn submit_word(&self, word: &str, by_participant_id: &str) -> SubmissionOutcome {
        let (outcome, ended, holder) = {
            let mut engine = self.inner.lock_engine();
            let outcome = engine.submit_word(word, by_participant_id);
            (
                outcome,
                engine.phase() == MatchPhase::Ended,
                engine.current_turn_holder().cloned(),
            )
        };
        if ended {
            self.inner.stop_tasks();
        } else if matches!(
            outcome,
            SubmissionOutcome::Accepted | SubmissionOutcome::Eliminated(_)
        ) {
            self.inner.schedule_bot(holder);
        }
        outcome
    }

    pub fn skip_turn(&self, reason: &str) {
        let (ended, holder) = {
            let mut engine = self.inner.lock_engine();
            engine.skip_turn(reason);
            (
                engine.phase() == MatchPhase::Ended,
                engine.current_turn_holder().cloned(),
            )
        };
        if ended {
            self.inner.stop_tasks();
        } else {
            self.inner.schedule_bot(holder);
        }
    }

    /// Stops the countdown and discards any pending automated move.
    pub fn pause(&self) -> bool {
        let paused = self.inner.lock_engine().pause();
        if paused {
            self.inner.stop_tasks();
        }
        paused
    }

    /// Restarts the countdown and, when a computer participant holds the
    /// turn, re-schedules its move.
    pub fn resume(&self) -> bool {
        let (resumed, limit, holder) = {
            let mut engine = self.inner.lock_engine();
            let resumed = engine.resume();
            (
                resumed,
                engine.config().time_limit_seconds,
                engine.current_turn_holder().cloned(),
            )
        };
        if resumed {
            if limit > 0 {
                self.inner.start_clock();
            }
            self.inner.schedule_bot(holder);
        }
        resumed
    }

    pub fn end_match(&self) {
        self.inner.lock_engine().end_match();
        self.inner.stop_tasks();
    }

    // --- Read access ---

    pub fn phase(&self) -> MatchPhase {
        self.inner.lock_engine().phase()
    }

    pub fn current_turn_holder(&self) -> Option<Participant> {
        self.inner.lock_engine().current_turn_holder().cloned()
    }

    pub fn time_remaining_seconds(&self) -> u32 {
        self.inner.lock_engine().time_remaining_seconds()
    }

    pub fn summary(&self) -> MatchSummary {
        self.inner.lock_engine().summary()
    }

    pub fn clock_running(&self) -> bool {
        self.inner.clock.lock().expect("clock lock").is_running()
    }

    /// Direct access under the engine lock, for snapshot capture and
    /// other reads the accessors above don't cover.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut GameEngine) -> R) -> R {
        f(&mut self.inner.lock_engine())
    }
}
