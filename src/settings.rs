//! Game settings and preferences
//!
//! Persisted separately from progress in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Something a key can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Jump,
    Dash,
    Pause,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Left => "Left",
            Action::Right => "Right",
            Action::Jump => "Jump",
            Action::Dash => "Dash",
            Action::Pause => "Pause",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "left" => Some(Action::Left),
            "right" => Some(Action::Right),
            "jump" => Some(Action::Jump),
            "dash" => Some(Action::Dash),
            "pause" => Some(Action::Pause),
            _ => None,
        }
    }
}

/// Key names (as reported by `KeyboardEvent.key`) for each action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub jump: Vec<String>,
    pub dash: Vec<String>,
    pub pause: Vec<String>,
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: keys(&["ArrowLeft", "a"]),
            right: keys(&["ArrowRight", "d"]),
            jump: keys(&["ArrowUp", "w", " "]),
            dash: keys(&["Shift", "x"]),
            pause: keys(&["Escape", "p"]),
        }
    }
}

impl KeyBindings {
    /// Action bound to `key`. Letter keys match regardless of case.
    pub fn action_for(&self, key: &str) -> Option<Action> {
        let matches = |bound: &[String]| bound.iter().any(|k| k.eq_ignore_ascii_case(key));
        if matches(&self.left) {
            Some(Action::Left)
        } else if matches(&self.right) {
            Some(Action::Right)
        } else if matches(&self.jump) {
            Some(Action::Jump)
        } else if matches(&self.dash) {
            Some(Action::Dash)
        } else if matches(&self.pause) {
            Some(Action::Pause)
        } else {
            None
        }
    }

    /// Replace the keys bound to `action`
    pub fn rebind(&mut self, action: Action, bound: Vec<String>) {
        let slot = match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Jump => &mut self.jump,
            Action::Dash => &mut self.dash,
            Action::Pause => &mut self.pause,
        };
        *slot = bound;
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Display ===
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Controls ===
    pub key_bindings: KeyBindings,
    /// Pause when the page is hidden or loses focus
    pub auto_pause_on_blur: bool,

    // === HUD ===
    /// Show score, lives and gear counters
    pub show_hud: bool,

    // === Accessibility ===
    /// Don't blink the player while invulnerable
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            key_bindings: KeyBindings::default(),
            auto_pause_on_blur: true,
            show_hud: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilliman_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
