use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub assets_path: String,
    pub script_path: String,
    pub save_path:   String,
    pub log_path:    String,
    pub log_level:   String,
    pub script_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub tick_ms: u32,
    pub reveal_interval_ms: u32,
    /// Ticks of the opening fade-in and the closing fade-out.
    pub transition_steps: u32,
    pub close_grace_ms: u32,
    /// Most nodes one run of the loop dispatches before yielding to the host.
    pub steps_per_run: usize,
    pub preload_ahead: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub music_volume:  u32,
    pub sound_volume:  u32,
    pub letter_volume: u32,
    pub letter_pool_size: usize,
    /// Name of the per-letter sample under the `system` asset folder.
    pub letter_sound: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub show_tree: bool,
}

/// Every section, as written to a fresh `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub system: SystemConfig,
    pub player: PlayerConfig,
    pub audio:  AudioConfig,
    pub debug:  DebugConfig,
}

impl CoreConfig {
    pub fn load() -> Self {
        Self {
            system: novella_shared::config::get("system"),
            player: novella_shared::config::get("player"),
            audio:  novella_shared::config::get("audio"),
            debug:  novella_shared::config::get("debug"),
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            assets_path: "assets/".into(),
            script_path: "scripts/".into(),
            save_path:   "saves/".into(),
            log_path:    "logs/".into(),
            log_level:   "info".into(),
            script_extensions: vec!["txt".into(), "nvl".into()],
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            reveal_interval_ms: 30,
            transition_steps: 20,
            close_grace_ms: 500,
            steps_per_run: 10_000,
            preload_ahead: 20,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            music_volume: 100,
            sound_volume: 100,
            letter_volume: 60,
            letter_pool_size: 20,
            letter_sound: "letter_se".into(),
        }
    }
}
