//! Level unlocks and run history
//!
//! Persisted to LocalStorage, tracks the furthest unlocked level, the best
//! score and the last 10 finished runs.

use serde::{Deserialize, Serialize};

/// Maximum number of run records to keep
pub const MAX_RUNS: usize = 10;

/// Receives level outcomes and answers unlock queries
pub trait ProgressStore {
    /// Level `level` (catalog index) was cleared with `score`
    fn record_level_complete(&mut self, level: usize, score: u64);
    /// The run ended on `level` with `score`
    fn record_game_over(&mut self, level: usize, score: u64);
    fn is_unlocked(&self, level: usize) -> bool;
}

/// How a recorded run segment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Cleared,
    GameOver,
}

/// A single run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Catalog index the record refers to
    pub level: usize,
    pub score: u64,
    pub outcome: RunOutcome,
    /// Unix timestamp (ms) when recorded
    pub timestamp: f64,
}

/// Persistent player progress
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Progress {
    /// Highest catalog index the player may start from
    pub highest_unlocked: usize,
    pub best_score: u64,
    /// Most recent first
    pub runs: Vec<RunRecord>,
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilliman_progress";

    /// Fresh progress: only the first level is open
    pub fn new() -> Self {
        Self::default()
    }

    fn push_run(&mut self, level: usize, score: u64, outcome: RunOutcome) {
        self.best_score = self.best_score.max(score);
        self.runs.insert(
            0,
            RunRecord {
                level,
                score,
                outcome,
                timestamp: now_ms(),
            },
        );
        self.runs.truncate(MAX_RUNS);
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(progress) = serde_json::from_str::<Progress>(&json) {
                    log::info!(
                        "Loaded progress: level {} unlocked, best score {}",
                        progress.highest_unlocked + 1,
                        progress.best_score
                    );
                    return progress;
                }
            }
        }

        log::info!("No saved progress found, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Progress saved ({} runs)", self.runs.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl ProgressStore for Progress {
    fn record_level_complete(&mut self, level: usize, score: u64) {
        self.highest_unlocked = self.highest_unlocked.max(level + 1);
        self.push_run(level, score, RunOutcome::Cleared);
        self.save();
    }

    fn record_game_over(&mut self, level: usize, score: u64) {
        self.push_run(level, score, RunOutcome::GameOver);
        self.save();
    }

    fn is_unlocked(&self, level: usize) -> bool {
        level <= self.highest_unlocked
    }
}

#[cfg(target_arch = "wasm32")]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
