//! Event orchestration loop
//!
//! Composes the spawn cadence, the countdown, cut batching and miss
//! handling into one deterministic state machine driven by the embedder's
//! millisecond clock: call [`Orchestrator::advance`] whenever time has
//! passed and feed it [`SceneEvent`]s as the render layer reports them.
//!
//! Drivers are keyed by session id. A driver outliving its session
//! (replay, exit, new mode) discards every callback instead of mutating
//! the new session's state. Once the termination watcher fires, the
//! orchestrator is permanently finished: no spawn or scoring command is
//! applied afterwards, even if it was already in flight.

use glam::Vec2;

use crate::consts::{COUNTDOWN_TICK_MS, CUT_WINDOW_MS, GROUP_DELAY_MS, MIN_CUT_COMBO};
use crate::fruit::{ComboEvent, CutFruit, FruitKind, FruitSequence, FruitSpawn};
use crate::session::GameSession;

/// Commands emitted for the render layer
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Launch one fruit
    SpawnFruit(FruitSpawn),
    /// A cutting burst reached the combo threshold
    ComboDetected(ComboEvent),
    /// Drop every airborne fruit
    ClearFruits,
    PauseRendering,
    ResumeRendering,
    ResizeViewport,
    /// The session ended; no further commands follow for it
    GameOver,
}

/// Events reported by the render layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// The blade crossed a fruit at `point`
    FruitIntersected { kind: FruitKind, point: Vec2 },
    /// A fruit fell past the lower boundary uncut
    FruitMissed { kind: FruitKind },
}

#[derive(Debug, Clone, Copy)]
enum Source {
    Cuts,
    Countdown,
    Spawn,
}

/// Walks the current batch: per-fruit delay before each launch, group
/// delay after the batch, then a fresh sequence from the session.
#[derive(Debug)]
enum SpawnPhase {
    Launch { index: usize, due_at: u64 },
    Regroup { due_at: u64 },
}

#[derive(Debug)]
struct SpawnDriver {
    batch: FruitSequence,
    phase: SpawnPhase,
}

impl SpawnDriver {
    fn new(batch: FruitSequence, now_ms: u64) -> Self {
        let phase = if batch.is_empty() {
            SpawnPhase::Regroup { due_at: now_ms }
        } else {
            SpawnPhase::Launch {
                index: 0,
                due_at: now_ms + batch.delay_between_fruits_ms,
            }
        };
        Self { batch, phase }
    }

    fn due_at(&self) -> u64 {
        match self.phase {
            SpawnPhase::Launch { due_at, .. } | SpawnPhase::Regroup { due_at } => due_at,
        }
    }

    fn shift(&mut self, delta_ms: u64) {
        match &mut self.phase {
            SpawnPhase::Launch { due_at, .. } | SpawnPhase::Regroup { due_at } => {
                *due_at += delta_ms;
            }
        }
    }

    /// Run the step that is due. Deadlines chain off the due time, not the
    /// call time, so late `advance` calls do not stretch the cadence.
    fn step(&mut self, session: &mut GameSession) -> Option<Directive> {
        match self.phase {
            SpawnPhase::Launch { index, due_at } => {
                let fruit = self.batch.fruits[index].clone();
                self.phase = if index + 1 < self.batch.fruits.len() {
                    SpawnPhase::Launch {
                        index: index + 1,
                        due_at: due_at + self.batch.delay_between_fruits_ms,
                    }
                } else {
                    SpawnPhase::Regroup {
                        due_at: due_at + GROUP_DELAY_MS,
                    }
                };
                Some(Directive::SpawnFruit(fruit))
            }
            SpawnPhase::Regroup { due_at } => {
                session.generate_new_fruits();
                let batch = session.next_fruits().clone();
                if batch.is_empty() {
                    // nothing came back; retry after a group delay instead of spinning
                    self.phase = SpawnPhase::Regroup {
                        due_at: due_at + GROUP_DELAY_MS,
                    };
                } else {
                    self.phase = SpawnPhase::Launch {
                        index: 0,
                        due_at: due_at + batch.delay_between_fruits_ms,
                    };
                    self.batch = batch;
                }
                None
            }
        }
    }
}

#[derive(Debug)]
struct CountdownDriver {
    due_at: u64,
}

/// Intersections reported within one window score as a single burst
#[derive(Debug, Default)]
struct CutBuffer {
    pending: Vec<CutFruit>,
    due_at: Option<u64>,
}

/// Drives one session's lifetime worth of timers and event pipelines
pub struct Orchestrator {
    session_id: u64,
    spawn: SpawnDriver,
    countdown: Option<CountdownDriver>,
    cuts: CutBuffer,
    paused_since: Option<u64>,
    next_combo_id: u64,
    finished: bool,
}

impl Orchestrator {
    /// Wire drivers to the session's current id. `None` without a mode.
    pub fn new(session: &GameSession, now_ms: u64) -> Option<Self> {
        let config = session.mode_config()?;
        Some(Self {
            session_id: session.session_id(),
            spawn: SpawnDriver::new(session.next_fruits().clone(), now_ms),
            countdown: config.timer_ms.map(|_| CountdownDriver {
                due_at: now_ms + COUNTDOWN_TICK_MS,
            }),
            cuts: CutBuffer::default(),
            paused_since: session.is_paused().then_some(now_ms),
            next_combo_id: 1,
            finished: false,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Route a render-layer event into the matching pipeline
    pub fn handle(
        &mut self,
        session: &mut GameSession,
        event: SceneEvent,
        now_ms: u64,
    ) -> Vec<Directive> {
        match event {
            SceneEvent::FruitIntersected { kind, point } => {
                self.fruit_intersected(session, kind, point, now_ms);
                Vec::new()
            }
            SceneEvent::FruitMissed { kind } => self.fruit_missed(session, kind),
        }
    }

    /// Buffer an intersection; the burst scores when the window closes.
    /// Cuts keep landing while paused: airborne fruit stays trackable.
    pub fn fruit_intersected(
        &mut self,
        session: &GameSession,
        kind: FruitKind,
        point: Vec2,
        now_ms: u64,
    ) {
        if self.stale(session) {
            return;
        }
        self.cuts.pending.push(CutFruit { kind, point });
        self.cuts.due_at.get_or_insert(now_ms + CUT_WINDOW_MS);
    }

    /// A fruit fell through; applies immediately, no batching
    pub fn fruit_missed(&mut self, session: &mut GameSession, kind: FruitKind) -> Vec<Directive> {
        let mut out = Vec::new();
        if self.stale(session) {
            return out;
        }
        session.decrement_attempts(kind);
        if !session.is_active_game() {
            self.finish(&mut out);
        }
        out
    }

    /// Toggle pause. Spawn and countdown deadlines freeze for the pause
    /// duration; the cut window does not.
    pub fn toggle_pause(&mut self, session: &mut GameSession, now_ms: u64) -> Vec<Directive> {
        let mut out = Vec::new();
        if self.stale(session) {
            return out;
        }
        session.pause();
        if session.is_paused() {
            self.paused_since = Some(now_ms);
            out.push(Directive::PauseRendering);
        } else if let Some(since) = self.paused_since.take() {
            let frozen = now_ms.saturating_sub(since);
            self.spawn.shift(frozen);
            if let Some(countdown) = &mut self.countdown {
                countdown.due_at += frozen;
            }
            out.push(Directive::ResumeRendering);
        }
        out
    }

    /// Dispatch everything that came due by `now_ms`, in deadline order.
    /// Game-over takes precedence: the first command that flips the
    /// activity predicate halts all drivers for good.
    pub fn advance(&mut self, session: &mut GameSession, now_ms: u64) -> Vec<Directive> {
        let mut out = Vec::new();
        if self.stale(session) {
            return out;
        }

        loop {
            // earliest due source; ties resolve cuts, then countdown, then spawn
            let mut next: Option<(Source, u64)> = None;
            if let Some(due) = self.cuts.due_at {
                next = Some((Source::Cuts, due));
            }
            if !session.is_paused() {
                if let Some(countdown) = &self.countdown {
                    if next.is_none_or(|(_, best)| countdown.due_at < best) {
                        next = Some((Source::Countdown, countdown.due_at));
                    }
                }
                let spawn_due = self.spawn.due_at();
                if next.is_none_or(|(_, best)| spawn_due < best) {
                    next = Some((Source::Spawn, spawn_due));
                }
            }
            let Some((source, due)) = next else { break };
            if due > now_ms {
                break;
            }

            match source {
                Source::Cuts => self.flush_cuts(session, &mut out),
                Source::Countdown => {
                    session.update_game_time();
                    if let Some(countdown) = &mut self.countdown {
                        countdown.due_at += COUNTDOWN_TICK_MS;
                    }
                }
                Source::Spawn => {
                    if let Some(directive) = self.spawn.step(session) {
                        out.push(directive);
                    }
                }
            }

            if !session.is_active_game() {
                self.finish(&mut out);
                break;
            }
        }
        out
    }

    fn flush_cuts(&mut self, session: &mut GameSession, out: &mut Vec<Directive>) {
        self.cuts.due_at = None;
        let burst = std::mem::take(&mut self.cuts.pending);
        if burst.is_empty() {
            return;
        }
        if burst.len() >= MIN_CUT_COMBO {
            let last = burst[burst.len() - 1];
            out.push(Directive::ComboDetected(ComboEvent {
                id: self.next_combo_id,
                amount: burst.len(),
                point: last.point,
            }));
            self.next_combo_id += 1;
        }
        let kinds: Vec<FruitKind> = burst.iter().map(|cut| cut.kind).collect();
        session.update_score(&kinds);
    }

    fn finish(&mut self, out: &mut Vec<Directive>) {
        if self.finished {
            return;
        }
        self.finished = true;
        out.push(Directive::ClearFruits);
        out.push(Directive::GameOver);
        log::info!("game over for session {}", self.session_id);
    }

    fn stale(&self, session: &GameSession) -> bool {
        self.finished || session.session_id() != self.session_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameMode;
    use crate::storage::MemoryStorage;

    use crate::fruit::FruitKind::{Apple, Banana, Bomb, Pear};

    fn session_in(mode: GameMode) -> GameSession {
        let mut session =
            GameSession::new(4.5, 42, Box::new(MemoryStorage::default())).unwrap();
        session.select_mode(mode);
        session
    }

    fn spawns(directives: &[Directive]) -> Vec<FruitSpawn> {
        directives
            .iter()
            .filter_map(|d| match d {
                Directive::SpawnFruit(fruit) => Some(fruit.clone()),
                _ => None,
            })
            .collect()
    }

    fn cut(
        orchestrator: &mut Orchestrator,
        session: &mut GameSession,
        kind: FruitKind,
        now_ms: u64,
    ) {
        orchestrator.fruit_intersected(session, kind, Vec2::new(1.0, 2.0), now_ms);
    }

    #[test]
    fn needs_an_active_mode() {
        let session = GameSession::new(4.5, 42, Box::new(MemoryStorage::default())).unwrap();
        assert!(Orchestrator::new(&session, 0).is_none());
    }

    #[test]
    fn spawn_driver_walks_batches_and_regenerates() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        // empty initial batch: generate at once; iteration 0 is a single
        // fruit with no per-fruit delay
        let first = orchestrator.advance(&mut session, 0);
        assert_eq!(spawns(&first).len(), 1);
        assert_eq!(session.iteration(), 1);

        // nothing due until the group delay runs out
        assert!(orchestrator.advance(&mut session, 2_999).is_empty());

        // iteration 1 also launches one fruit, 500ms after regrouping
        assert!(orchestrator.advance(&mut session, 3_000).is_empty());
        assert_eq!(session.iteration(), 2);
        let second = orchestrator.advance(&mut session, 3_500);
        assert_eq!(spawns(&second).len(), 1);

        // iteration 2 launches exactly two fruits, 500ms apart
        let third = orchestrator.advance(&mut session, 8_000);
        assert_eq!(spawns(&third).len(), 2);
    }

    #[test]
    fn countdown_runs_a_dzen_session_to_game_over() {
        let mut session = session_in(GameMode::Dzen);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        let directives = orchestrator.advance(&mut session, 95_000);
        assert_eq!(session.time_remaining_ms(), Some(0));
        assert!(!session.is_active_game());
        assert!(orchestrator.is_finished());
        assert_eq!(
            directives.last_chunk::<2>().unwrap(),
            &[Directive::ClearFruits, Directive::GameOver]
        );

        assert!(orchestrator.advance(&mut session, 96_000).is_empty());
    }

    #[test]
    fn cuts_batch_into_one_scored_burst() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        cut(&mut orchestrator, &mut session, Apple, 10);
        cut(&mut orchestrator, &mut session, Banana, 60);

        // window closes 200ms after the first report
        let early = orchestrator.advance(&mut session, 200);
        assert!(early.iter().all(|d| matches!(d, Directive::SpawnFruit(_))));
        assert_eq!(session.score(), 0);

        orchestrator.advance(&mut session, 210);
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn a_burst_of_three_emits_a_combo() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        cut(&mut orchestrator, &mut session, Apple, 10);
        cut(&mut orchestrator, &mut session, Banana, 20);
        cut(&mut orchestrator, &mut session, Pear, 30);

        let directives = orchestrator.advance(&mut session, 500);
        let combo = directives
            .iter()
            .find_map(|d| match d {
                Directive::ComboDetected(combo) => Some(*combo),
                _ => None,
            })
            .expect("combo directive");
        assert_eq!(combo.amount, 3);
        assert_eq!(combo.point, Vec2::new(1.0, 2.0));
        assert_eq!(session.score(), 6);
    }

    #[test]
    fn a_bomb_cut_halts_everything_in_flight() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        cut(&mut orchestrator, &mut session, Bomb, 100);

        // one fruit spawns at t=0; the flush at t=300 ends the game before
        // any later spawn deadline is honored
        let directives = orchestrator.advance(&mut session, 10_000);
        assert_eq!(spawns(&directives).len(), 1);
        assert_eq!(
            directives.last_chunk::<2>().unwrap(),
            &[Directive::ClearFruits, Directive::GameOver]
        );
        assert_eq!(session.attempts(), Some(0));

        cut(&mut orchestrator, &mut session, Apple, 10_100);
        assert!(orchestrator.advance(&mut session, 20_000).is_empty());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn misses_apply_immediately_and_can_end_the_game() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        assert!(orchestrator.fruit_missed(&mut session, Apple).is_empty());
        assert_eq!(session.attempts(), Some(2));

        // a falling bomb is free
        assert!(orchestrator.fruit_missed(&mut session, Bomb).is_empty());
        assert_eq!(session.attempts(), Some(2));

        assert!(orchestrator.fruit_missed(&mut session, Pear).is_empty());
        let last = orchestrator.fruit_missed(&mut session, Banana);
        assert_eq!(last, vec![Directive::ClearFruits, Directive::GameOver]);
        assert!(orchestrator.is_finished());
    }

    #[test]
    fn stale_drivers_never_touch_a_newer_session() {
        let mut session = session_in(GameMode::Classic);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();
        orchestrator.advance(&mut session, 0);

        session.replay();
        assert!(orchestrator.advance(&mut session, 5_000).is_empty());
        assert!(orchestrator.fruit_missed(&mut session, Apple).is_empty());
        assert_eq!(session.attempts(), Some(3));

        cut(&mut orchestrator, &mut session, Apple, 5_000);
        assert!(orchestrator.advance(&mut session, 6_000).is_empty());
        assert_eq!(session.score(), 0);

        // exit resets the id to the 0 sentinel; still stale
        let mut orchestrator = Orchestrator::new(&session, 6_000).unwrap();
        session.exit_from_current_mode();
        assert!(orchestrator.advance(&mut session, 7_000).is_empty());
    }

    #[test]
    fn pause_freezes_spawn_and_countdown_but_cuts_still_score() {
        let mut session = session_in(GameMode::Dzen);
        let mut orchestrator = Orchestrator::new(&session, 0).unwrap();

        let paused = orchestrator.toggle_pause(&mut session, 0);
        assert_eq!(paused, vec![Directive::PauseRendering]);

        assert!(orchestrator.advance(&mut session, 5_000).is_empty());
        assert_eq!(session.time_remaining_ms(), Some(90_000));
        assert_eq!(session.iteration(), 0);

        cut(&mut orchestrator, &mut session, Apple, 5_100);
        cut(&mut orchestrator, &mut session, Banana, 5_150);
        orchestrator.advance(&mut session, 5_400);
        assert_eq!(session.score(), 2);

        let resumed = orchestrator.toggle_pause(&mut session, 6_000);
        assert_eq!(resumed, vec![Directive::ResumeRendering]);

        // countdown was due at 1_000 and shifted by the 6s pause
        orchestrator.advance(&mut session, 6_999);
        assert_eq!(session.time_remaining_ms(), Some(90_000));
        orchestrator.advance(&mut session, 7_000);
        assert_eq!(session.time_remaining_ms(), Some(89_000));
        assert!(session.iteration() > 0);
    }
}
