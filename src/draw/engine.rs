// Draw engine: the pool of undrawn participants, the winner history, and
// the Idle -> Spinning -> Settled phase machine.
//
// The timed spin animation lives in the app event loop; the engine only
// tracks which phase it is in. `begin_draw` validates and enters Spinning,
// `settle` performs the one and only random selection and commits the
// winner. The intermediate spin frames are pure presentation and never
// influence the outcome.

use thiserror::Error;
use tracing::debug;

use crate::rng::RandomSource;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// No eligible participants remain in the source set.
    #[error("no eligible participants remain to draw from")]
    EmptyPool,

    /// A draw is already running; overlapping draws are rejected.
    #[error("a draw is already in progress")]
    DrawInProgress,

    /// `settle` was called without a preceding `begin_draw`.
    #[error("no draw is in progress to settle")]
    NotSpinning,
}

/// Where the engine is in the draw lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawPhase {
    /// No draw running; ready to start.
    Idle,
    /// Animation window open; state-changing operations are rejected.
    Spinning,
    /// The most recent draw committed this winner.
    Settled(String),
}

/// State of the lucky draw for the current session.
///
/// `participants` is a snapshot of the imported list; `pool` holds the
/// names not yet drawn in no-repeat mode and is untouched when repeats
/// are allowed.
#[derive(Debug, Clone)]
pub struct DrawEngine {
    participants: Vec<String>,
    pool: Vec<String>,
    winners: Vec<String>,
    allow_repeat: bool,
    phase: DrawPhase,
}

impl DrawEngine {
    pub fn new() -> Self {
        DrawEngine {
            participants: Vec::new(),
            pool: Vec::new(),
            winners: Vec::new(),
            allow_repeat: false,
            phase: DrawPhase::Idle,
        }
    }

    /// Replace the participant snapshot and discard all derived state.
    ///
    /// Called by the session controller on import. The controller refuses
    /// imports while a spin is running, so this never interrupts a draw.
    pub fn reset(&mut self, list: &[String]) {
        self.participants = list.to_vec();
        self.pool = list.to_vec();
        self.winners.clear();
        self.phase = DrawPhase::Idle;
        debug!("draw engine reset with {} participants", list.len());
    }

    /// Flip repeat mode. Does not touch the pool or the history.
    pub fn toggle_repeat(&mut self) -> Result<bool, DrawError> {
        if self.phase == DrawPhase::Spinning {
            return Err(DrawError::DrawInProgress);
        }
        self.allow_repeat = !self.allow_repeat;
        Ok(self.allow_repeat)
    }

    pub fn allow_repeat(&self) -> bool {
        self.allow_repeat
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Names still eligible in no-repeat mode.
    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// Winner history, most recent first.
    pub fn winners(&self) -> &[String] {
        &self.winners
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.phase == DrawPhase::Spinning
    }

    /// The set a draw would select from right now.
    fn source(&self) -> &[String] {
        if self.allow_repeat {
            &self.participants
        } else {
            &self.pool
        }
    }

    /// Validate preconditions and open the spin window.
    ///
    /// Rejects overlapping draws and draws on an exhausted source set;
    /// state is unchanged on rejection.
    pub fn begin_draw(&mut self) -> Result<(), DrawError> {
        if self.phase == DrawPhase::Spinning {
            return Err(DrawError::DrawInProgress);
        }
        if self.source().is_empty() {
            return Err(DrawError::EmptyPool);
        }
        self.phase = DrawPhase::Spinning;
        Ok(())
    }

    /// Commit the draw: select one winner uniformly from the source set.
    ///
    /// Prepends the winner to the history and, in no-repeat mode, removes
    /// exactly one matching entry from the pool (the first occurrence, so a
    /// list imported with retained duplicates loses only the drawn
    /// instance).
    pub fn settle<R: RandomSource>(&mut self, rng: &mut R) -> Result<String, DrawError> {
        if self.phase != DrawPhase::Spinning {
            return Err(DrawError::NotSpinning);
        }

        let source = self.source();
        // begin_draw checked non-emptiness and Spinning blocks mutation,
        // but a repeat-mode flip is also blocked, so this cannot be empty.
        debug_assert!(!source.is_empty());
        let winner = source[rng.pick_index(source.len())].clone();

        self.winners.insert(0, winner.clone());
        if !self.allow_repeat {
            if let Some(idx) = self.pool.iter().position(|name| name == &winner) {
                self.pool.remove(idx);
            }
        }
        self.phase = DrawPhase::Settled(winner.clone());
        debug!(winner = %winner, remaining = self.pool.len(), "draw settled");
        Ok(winner)
    }

    /// Clear the history and restore the full pool.
    ///
    /// Rejected while a spin is running.
    pub fn clear(&mut self) -> Result<(), DrawError> {
        if self.phase == DrawPhase::Spinning {
            return Err(DrawError::DrawInProgress);
        }
        self.pool = self.participants.clone();
        self.winners.clear();
        self.phase = DrawPhase::Idle;
        Ok(())
    }
}

impl Default for DrawEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn engine_with(list: &[&str]) -> DrawEngine {
        let mut engine = DrawEngine::new();
        engine.reset(&names(list));
        engine
    }

    fn draw_once(engine: &mut DrawEngine, rng: &mut SeededRng) -> String {
        engine.begin_draw().expect("begin");
        engine.settle(rng).expect("settle")
    }

    #[test]
    fn reset_copies_list_and_clears_history() {
        let mut engine = engine_with(&["A", "B", "C"]);
        let mut rng = SeededRng::from_seed(1);
        draw_once(&mut engine, &mut rng);

        engine.reset(&names(&["D", "E"]));
        assert_eq!(engine.pool(), &["D", "E"]);
        assert!(engine.winners().is_empty());
        assert_eq!(*engine.phase(), DrawPhase::Idle);
    }

    #[test]
    fn draw_removes_winner_from_pool_and_prepends_history() {
        let mut engine = engine_with(&["A", "B", "C", "D"]);
        let mut rng = SeededRng::from_seed(3);

        let first = draw_once(&mut engine, &mut rng);
        let second = draw_once(&mut engine, &mut rng);

        assert_eq!(engine.winners().len(), 2);
        assert_eq!(engine.winners()[0], second, "most recent first");
        assert_eq!(engine.winners()[1], first);
        assert_eq!(engine.pool().len(), 2);
        assert!(!engine.pool().contains(&first));
        assert!(!engine.pool().contains(&second));
    }

    #[test]
    fn no_repeat_draws_exhaust_pool_without_duplicates() {
        let mut engine = engine_with(&["A", "B", "C", "D", "E"]);
        let mut rng = SeededRng::from_seed(11);

        for n in 1..=5 {
            draw_once(&mut engine, &mut rng);
            assert_eq!(engine.winners().len(), n);
            assert_eq!(engine.pool().len(), 5 - n);
        }

        let mut unique = engine.winners().to_vec();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 5, "history contains no duplicates");
    }

    #[test]
    fn exhausted_pool_fails_without_mutation() {
        let mut engine = engine_with(&["A"]);
        let mut rng = SeededRng::from_seed(5);
        draw_once(&mut engine, &mut rng);

        let winners_before = engine.winners().to_vec();
        assert_eq!(engine.begin_draw(), Err(DrawError::EmptyPool));
        assert_eq!(engine.winners(), winners_before.as_slice());
        assert!(engine.pool().is_empty());
        assert!(!engine.is_spinning());
    }

    #[test]
    fn two_participants_no_repeat_scenario() {
        let mut engine = engine_with(&["A", "B"]);
        let mut rng = SeededRng::from_seed(21);

        let first = draw_once(&mut engine, &mut rng);
        assert!(first == "A" || first == "B");

        let second = draw_once(&mut engine, &mut rng);
        assert_ne!(first, second, "second draw must return the other name");

        assert_eq!(engine.begin_draw(), Err(DrawError::EmptyPool));
    }

    #[test]
    fn repeat_mode_leaves_pool_untouched() {
        let mut engine = engine_with(&["A", "B", "C"]);
        engine.toggle_repeat().expect("toggle");
        let mut rng = SeededRng::from_seed(2);

        for _ in 0..10 {
            draw_once(&mut engine, &mut rng);
        }
        assert_eq!(engine.pool().len(), 3);
        assert_eq!(engine.winners().len(), 10);
    }

    #[test]
    fn repeat_mode_can_exceed_participant_count() {
        let mut engine = engine_with(&["A"]);
        engine.toggle_repeat().expect("toggle");
        let mut rng = SeededRng::from_seed(4);

        for _ in 0..3 {
            assert_eq!(draw_once(&mut engine, &mut rng), "A");
        }
        assert_eq!(engine.winners().len(), 3);
    }

    #[test]
    fn overlapping_draw_is_rejected() {
        let mut engine = engine_with(&["A", "B"]);
        engine.begin_draw().expect("begin");
        assert_eq!(engine.begin_draw(), Err(DrawError::DrawInProgress));
        assert!(engine.is_spinning());
    }

    #[test]
    fn settle_without_begin_is_rejected() {
        let mut engine = engine_with(&["A", "B"]);
        let mut rng = SeededRng::from_seed(9);
        assert_eq!(engine.settle(&mut rng), Err(DrawError::NotSpinning));
        assert!(engine.winners().is_empty());
    }

    #[test]
    fn toggle_and_clear_rejected_while_spinning() {
        let mut engine = engine_with(&["A", "B"]);
        engine.begin_draw().expect("begin");
        assert_eq!(engine.toggle_repeat(), Err(DrawError::DrawInProgress));
        assert_eq!(engine.clear(), Err(DrawError::DrawInProgress));
        assert!(!engine.allow_repeat());
    }

    #[test]
    fn clear_restores_pool_and_empties_history() {
        let mut engine = engine_with(&["A", "B", "C"]);
        let mut rng = SeededRng::from_seed(6);
        draw_once(&mut engine, &mut rng);
        draw_once(&mut engine, &mut rng);

        engine.clear().expect("clear");
        assert_eq!(engine.pool(), &["A", "B", "C"]);
        assert!(engine.winners().is_empty());
        assert_eq!(*engine.phase(), DrawPhase::Idle);
    }

    #[test]
    fn duplicate_name_loses_one_instance_per_draw() {
        // A list imported without dedupe can contain the same name twice;
        // each draw removes only the drawn instance.
        let mut engine = engine_with(&["Bob", "Bob"]);
        let mut rng = SeededRng::from_seed(8);

        assert_eq!(draw_once(&mut engine, &mut rng), "Bob");
        assert_eq!(engine.pool(), &["Bob"]);
        assert_eq!(draw_once(&mut engine, &mut rng), "Bob");
        assert!(engine.pool().is_empty());
        assert_eq!(engine.winners(), &["Bob", "Bob"]);
    }

    #[test]
    fn settled_phase_holds_last_winner() {
        let mut engine = engine_with(&["A"]);
        let mut rng = SeededRng::from_seed(10);
        let winner = draw_once(&mut engine, &mut rng);
        assert_eq!(*engine.phase(), DrawPhase::Settled(winner));
    }
}
