//! Horde Survivor headless runner
//!
//! Plays one run on autopilot with a synthetic 60 fps clock and prints the
//! final HUD as JSON.
//!
//! Usage: `horde-survivor [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use horde_survivor::sim::GameEvent;
    use horde_survivor::{Session, SimConfig};

    env_logger::init();
    log::info!("Horde Survivor (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load_or_default(path),
        None => SimConfig::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5EED);

    // Generous cap in case the run never ends (e.g. win_time disabled)
    let max_frames = ((config.win_time.max(0.0) as f64 + 60.0) * 60.0) as u64;
    let mut session = Session::new(config, seed);
    session.set_idle_mode(true);

    const FRAME_DT: f32 = 1.0 / 60.0;
    let mut now = 0.0;
    let mut kills = 0u32;
    for _ in 0..max_frames {
        now += FRAME_DT as f64 * 1000.0;
        for event in session.frame(FRAME_DT, now) {
            match event {
                GameEvent::EnemyKilled { .. } => kills += 1,
                GameEvent::LevelUp { level } => log::debug!("Reached level {level}"),
                _ => {}
            }
        }
        if session.state().phase.is_terminal() {
            break;
        }
    }

    let state = session.state();
    log::info!(
        "Run finished: {:?} at t={:.1}s, level {}, {kills} kills",
        state.phase,
        state.game_time,
        state.player.level
    );
    match serde_json::to_string_pretty(&session.hud_snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize HUD: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly
}
