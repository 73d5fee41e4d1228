//! Embedding facade
//!
//! `Engine` is what a host drives once per display frame: it owns the game
//! state and the input source, runs fixed-timestep substeps, renders, and
//! hands outward events to the host.

use crate::consts::*;
use crate::input::{InputSource, InputTracker};
use crate::progress::ProgressStore;
use crate::render::{self, AssetProvider, DrawContext};
use crate::settings::Settings;
use crate::sim::level::{LevelCatalog, LevelError};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// A running game bound to an input source
pub struct Engine<I: InputSource> {
    state: GameState,
    input: I,
    tracker: InputTracker,
    settings: Settings,
    accumulator: f32,
    destroyed: bool,
}

impl<I: InputSource> Engine<I> {
    pub fn new(catalog: LevelCatalog, input: I, settings: Settings) -> Self {
        Self {
            state: GameState::new(catalog),
            input,
            tracker: InputTracker::new(),
            settings,
            accumulator: 0.0,
            destroyed: false,
        }
    }

    /// Engine over the built-in level catalog
    pub fn with_builtin_levels(input: I, settings: Settings) -> Self {
        Self::new(LevelCatalog::builtin(), input, settings)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    // === Lifecycle ===

    pub fn start(&mut self) {
        self.state.start();
    }

    pub fn pause(&mut self) {
        self.state.pause();
    }

    pub fn resume(&mut self) {
        self.state.resume();
    }

    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.accumulator = 0.0;
        self.state.restart()
    }

    pub fn advance_to_level(&mut self, index: usize) -> Result<(), LevelError> {
        self.accumulator = 0.0;
        self.state.advance_to_level(index)
    }

    /// Host lost focus or the page was hidden
    pub fn focus_lost(&mut self) {
        let running = matches!(
            self.state.phase,
            GamePhase::Playing | GamePhase::LevelComplete
        );
        if self.settings.auto_pause_on_blur && running {
            log::info!("Auto-paused (focus lost)");
            self.state.pause();
        }
    }

    /// Stop for good: detaches input. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.input.detach();
        self.accumulator = 0.0;
        log::info!("Engine destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    // === Frame loop ===

    /// Advance by a frame's wall-clock `dt` in fixed substeps.
    /// Returns whether the host should schedule another frame.
    pub fn frame(&mut self, dt: f32) -> bool {
        if self.destroyed {
            return false;
        }

        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let held = self.input.poll();
            let input = self.tracker.advance(held);
            self.step(&input);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        // Drop time we could not simulate rather than spiral
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        true
    }

    /// One fixed tick with explicit input
    pub fn step(&mut self, input: &TickInput) {
        // Jump doubles as "start" on the title and end screens
        if input.jump_pressed
            && matches!(
                self.state.phase,
                GamePhase::Menu | GamePhase::GameOver | GamePhase::Finished
            )
        {
            self.state.start();
            return;
        }
        tick(&mut self.state, input, SIM_DT);
    }

    /// Draw the current frame. Returns the camera offset.
    pub fn render(&self, ctx: &mut dyn DrawContext, assets: &dyn AssetProvider) -> f32 {
        render::render_frame(&self.state, ctx, assets, &self.settings)
    }

    /// Hand queued events to the host, recording outcomes in `progress`
    pub fn drain_events(&mut self, progress: &mut dyn ProgressStore) -> Vec<GameEvent> {
        let events = self.state.drain_events();
        for event in &events {
            match *event {
                GameEvent::LevelComplete { index, score } => {
                    progress.record_level_complete(index, score);
                }
                GameEvent::GameOver { index, score } => progress.record_game_over(index, score),
                _ => {}
            }
        }
        events
    }
}
