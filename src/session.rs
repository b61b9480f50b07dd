//! Frame controller
//!
//! Turns variable-length host frames into fixed simulation ticks, holds the
//! current input, and feeds one-shot actions to exactly one tick.

use crate::config::SimConfig;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{
    GameEvent, GameState, HudSnapshot, MoveIntent, RenderSnapshot, TickInput, build_hud_snapshot,
    build_render_snapshot, tick,
};

/// Discrete player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Toggle pause
    Pause,
    /// Take (or banish) the level-up offer in this slot
    Select(usize),
    Reroll,
    ToggleBanish,
    Dash,
}

/// One run plus the frame loop driving it
pub struct Session {
    state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Session {
    /// Start a run; a config that fails validation is replaced by the defaults
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("{e}, using default config");
                SimConfig::default()
            }
        };
        log::info!("New run (seed {seed})");
        Self {
            state: GameState::new(config, seed),
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Start over with the same config; idle mode carries over
    pub fn restart(&mut self, seed: u64) {
        log::info!("Restarting (seed {seed})");
        let idle_mode = self.input.idle_mode;
        self.state = GameState::new(self.state.config.clone(), seed);
        self.accumulator = 0.0;
        self.input = TickInput {
            idle_mode,
            ..Default::default()
        };
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the held movement keys
    pub fn set_intent(&mut self, intent: MoveIntent) {
        self.input.intent = intent;
    }

    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    /// Queue a one-shot action for the next tick
    pub fn push_action(&mut self, action: Action) {
        match action {
            Action::Pause => self.input.pause = true,
            Action::Select(slot) => self.input.select = Some(slot),
            Action::Reroll => self.input.reroll = true,
            Action::ToggleBanish => self.input.banish = true,
            Action::Dash => self.input.dash = true,
        }
    }

    /// Advance by one host frame and return the events it produced.
    ///
    /// While suspended no time accumulates; a single zero-length tick still
    /// runs so queued actions (unpause, offer selection) take effect.
    pub fn frame(&mut self, frame_dt: f32, now_ms: f64) -> Vec<GameEvent> {
        self.input.now = now_ms;

        if self.state.phase.is_suspended() {
            self.accumulator = 0.0;
            tick(&mut self.state, &self.input, 0.0);
            self.clear_one_shots();
            return self.state.drain_events();
        }

        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.clear_one_shots();

            if self.state.phase.is_suspended() {
                self.accumulator = 0.0;
                break;
            }
        }
        if substeps == MAX_SUBSTEPS {
            // Drop the backlog instead of trying to catch up next frame
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        self.state.drain_events()
    }

    fn clear_one_shots(&mut self) {
        self.input.pause = false;
        self.input.select = None;
        self.input.reroll = false;
        self.input.banish = false;
        self.input.dash = false;
    }

    pub fn render_snapshot(&self) -> RenderSnapshot {
        build_render_snapshot(&self.state)
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        build_hud_snapshot(&self.state)
    }
}
