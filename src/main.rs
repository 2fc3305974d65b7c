//! Fruit Slash entry point
//!
//! Native headless demo: scripts a player against the real session and
//! orchestrator with a simulated clock, logging every directive. The
//! browser presentation layer embeds the library the same way, driven by
//! requestAnimationFrame instead of this loop.

use glam::Vec2;

use fruit_slash::consts::FRUIT_POSITION_INTERVAL;
use fruit_slash::storage::MemoryStorage;
use fruit_slash::{Directive, GameError, GameMode, GameSession, Orchestrator};

fn main() -> Result<(), GameError> {
    env_logger::init();

    let seed = fruit_slash::platform::now_ms();
    let mut session = GameSession::new(
        FRUIT_POSITION_INTERVAL,
        seed,
        Box::new(MemoryStorage::default()),
    )?;
    log::info!("running scripted sessions with seed {seed}");

    // Classic: the script never cuts a bomb, so the run ends at the cap
    play(&mut session, GameMode::Classic, 20_000);
    // Dzen: no bombs exist; the countdown ends the run
    play(&mut session, GameMode::Dzen, 120_000);

    session.exit_from_current_mode();
    Ok(())
}

/// Drive one session: cut every real fruit as it spawns, let bombs fall,
/// stop at game over or the time cap.
fn play(session: &mut GameSession, mode: GameMode, cap_ms: u64) {
    session.select_mode(mode);
    let Some(mut orchestrator) = Orchestrator::new(session, 0) else {
        return;
    };

    let mut now_ms = 0;
    while now_ms <= cap_ms && !orchestrator.is_finished() {
        let directives = orchestrator.advance(session, now_ms);
        for directive in &directives {
            match directive {
                Directive::SpawnFruit(fruit) if fruit.kind.is_bomb() => {
                    log::debug!("letting bomb {} fall", fruit.id);
                    orchestrator.fruit_missed(session, fruit.kind);
                }
                Directive::SpawnFruit(fruit) => {
                    orchestrator.fruit_intersected(
                        session,
                        fruit.kind,
                        Vec2::new(fruit.start_position_x, 0.0),
                        now_ms,
                    );
                }
                Directive::ComboDetected(combo) => {
                    log::info!("{} fruits combo at {}", combo.amount, combo.point);
                }
                Directive::GameOver => log::info!("{} run over", mode.as_str()),
                _ => {}
            }
        }
        now_ms += 50;
    }

    log::info!(
        "{} finished: score {}, best {}",
        mode.as_str(),
        session.score(),
        session.best_score_for_current_mode()
    );
}
