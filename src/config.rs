/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::grid::Grid;
use crate::error::GameResult;
use crate::sim::resolver::MoveTiming;
use crate::sim::session::SessionSettings;

// ── Public Config Struct ──

#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub display: DisplayConfig,
    pub gamepad: GamepadConfig,
    /// Replacement map rows; the built-in cave when absent.
    pub map: Option<Vec<String>>,
    /// Glyph overrides keyed by asset name (`wall = "▓"`).
    pub assets: HashMap<String, String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub move_ms: u64,
    pub scare_ms: u64,
    pub wall_notice_ms: u64,
    pub bats_notice_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub tile_length: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    map: TomlMap,
    #[serde(default)]
    assets: HashMap<String, String>,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_move")]
    move_ms: u64,
    #[serde(default = "default_scare")]
    scare_ms: u64,
    #[serde(default = "default_wall_notice")]
    wall_notice_ms: u64,
    #[serde(default = "default_bats_notice")]
    bats_notice_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_tile_length")]
    tile_length: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlMap {
    #[serde(default)]
    rows: Option<Vec<String>>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_move() -> u64 { 350 }
fn default_scare() -> u64 { 900 }
fn default_wall_notice() -> u64 { 1000 }
fn default_bats_notice() -> u64 { 2000 }
fn default_tile_length() -> f32 { 100.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            move_ms: default_move(),
            scare_ms: default_scare(),
            wall_notice_ms: default_wall_notice(),
            bats_notice_ms: default_bats_notice(),
        }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            tile_length: default_tile_length(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home, (4) system data directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        load_from(&candidate_dirs())
    }

    /// Parse a config document. Missing keys take their defaults.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(GameConfig::from_toml)
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let mut display = DisplayConfig {
            tile_length: cfg.display.tile_length,
        };
        if !(display.tile_length.is_finite() && display.tile_length > 0.0) {
            warn!(
                "display.tile_length = {} is not a positive size, using {}",
                display.tile_length,
                default_tile_length()
            );
            display.tile_length = default_tile_length();
        }

        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: cfg.timing.tick_rate_ms.max(1),
                move_ms: cfg.timing.move_ms,
                scare_ms: cfg.timing.scare_ms,
                wall_notice_ms: cfg.timing.wall_notice_ms,
                bats_notice_ms: cfg.timing.bats_notice_ms,
            },
            display,
            gamepad: GamepadConfig {
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
            map: cfg.map.rows,
            assets: cfg.assets,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.timing.tick_rate_ms)
    }

    pub fn move_timing(&self) -> MoveTiming {
        MoveTiming {
            step: Duration::from_millis(self.timing.move_ms),
            scare: Duration::from_millis(self.timing.scare_ms),
            wall_notice: Duration::from_millis(self.timing.wall_notice_ms),
            bats_notice: Duration::from_millis(self.timing.bats_notice_ms),
        }
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            tile_length: self.display.tile_length,
            timing: self.move_timing(),
        }
    }

    /// The configured map, or the built-in cave.
    pub fn grid(&self) -> GameResult<Grid> {
        match &self.map {
            Some(rows) => Grid::parse(rows.as_slice()),
            None => Grid::cave(),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/cavebrave)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cavebrave");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory (/usr/share/cavebrave)
    let sys = PathBuf::from("/usr/share/cavebrave");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_from(search_dirs: &[PathBuf]) -> GameConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match GameConfig::parse(&text) {
                Ok(cfg) => {
                    log::info!("config: {}", path.display());
                    return cfg;
                }
                Err(e) => {
                    warn!("{}: parse error, using default settings: {e}", path.display());
                    return GameConfig::default();
                }
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    GameConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::Pos;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::parse("").unwrap();
        assert_eq!(cfg, GameConfig::default());
        assert_eq!(cfg.move_timing(), MoveTiming::default());
        assert_eq!(cfg.display.tile_length, 100.0);
        assert_eq!(cfg.tick_rate(), Duration::from_millis(16));
        assert!(cfg.map.is_none());
        assert!(cfg.assets.is_empty());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = GameConfig::parse(
            r#"
            [timing]
            move_ms = 120

            [display]
            tile_length = 64.0

            [gamepad]
            confirm = ["B"]
            "#,
        )
        .unwrap();
        let timing = cfg.move_timing();
        assert_eq!(timing.step, Duration::from_millis(120));
        assert_eq!(timing.scare, Duration::from_millis(900));
        assert_eq!(cfg.session_settings().tile_length, 64.0);
        assert_eq!(cfg.gamepad.confirm, vec!["B".to_string()]);
        assert_eq!(cfg.gamepad.cancel, vec!["Select".to_string()]);
    }

    #[test]
    fn custom_map_replaces_the_cave() {
        let cfg = GameConfig::parse(
            r##"
            [map]
            rows = ["C.W", "#B."]
            "##,
        )
        .unwrap();
        let grid = cfg.grid().unwrap();
        assert_eq!((grid.rows(), grid.cols()), (2, 3));
        assert_eq!(grid.find_init().unwrap(), Pos::new(0, 0));

        assert_eq!(GameConfig::default().grid().unwrap(), Grid::cave().unwrap());
    }

    #[test]
    fn asset_overrides_are_kept_by_name() {
        let cfg = GameConfig::parse(
            r#"
            [assets]
            wall = "X"
            fog = "~"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.assets.get("wall").map(String::as_str), Some("X"));
        assert_eq!(cfg.assets.len(), 2);
    }

    #[test]
    fn nonsense_tile_length_falls_back() {
        let cfg = GameConfig::parse("[display]\ntile_length = -3.0\n").unwrap();
        assert_eq!(cfg.display.tile_length, 100.0);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::parse("[timing\nmove_ms = 1").is_err());
        assert!(GameConfig::parse("[timing]\nmove_ms = \"fast\"").is_err());
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cavebrave-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn first_config_file_found_wins() {
        let empty = scratch_dir("empty");
        let found = scratch_dir("found");
        std::fs::write(found.join("config.toml"), "[timing]\nmove_ms = 200\n").unwrap();

        let cfg = load_from(&[empty.clone(), found.clone()]);
        assert_eq!(cfg.timing.move_ms, 200);

        std::fs::remove_dir_all(empty).unwrap();
        std::fs::remove_dir_all(found).unwrap();
    }

    #[test]
    fn unreadable_config_falls_back_to_defaults() {
        let broken = scratch_dir("broken");
        std::fs::write(broken.join("config.toml"), "[timing\n").unwrap();

        assert_eq!(load_from(&[broken.clone()]), GameConfig::default());
        assert_eq!(load_from(&[]), GameConfig::default());

        std::fs::remove_dir_all(broken).unwrap();
    }
}
