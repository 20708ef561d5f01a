//! Per-game configuration loaded from a TOML file.
//!
//! Spawn points and trigger zones are data, not code: each game ships a
//! config next to its assets so playfield coordinates can be tuned
//! without recompiling.

use std::{collections::HashMap, path::Path};

use serde::Deserialize;

use crate::game::zones::Zone;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "tiltbox".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub gravity: [f32; 3],
    /// Maximum board tilt per axis, in radians.
    pub tilt_limit: f32,
    pub spawns: HashMap<String, [f32; 3]>,
    pub zones: HashMap<String, Zone>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            gravity: [0.0, -10.0, 0.0],
            tilt_limit: 0.5,
            spawns: HashMap::new(),
            zones: HashMap::new(),
        }
    }
}

impl GameConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = toml::from_str(&text)?;
        Ok(config)
    }

    /// Load a config, falling back to defaults when the file is missing
    /// or malformed. The games stay playable without one.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(error) => {
                log::warn!(
                    "could not load config {}: {error}; using defaults",
                    path.as_ref().display()
                );
                Self::default()
            }
        }
    }

    /// Spawn point by name, or the origin when the config omits it.
    pub fn spawn(&self, name: &str) -> cgmath::Vector3<f32> {
        self.spawns
            .get(name)
            .map(|p| cgmath::Vector3::new(p[0], p[1], p[2]))
            .unwrap_or_else(|| cgmath::Vector3::new(0.0, 0.0, 0.0))
    }

    pub fn zone(&self, name: &str) -> Option<Zone> {
        self.zones.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zones_and_spawns() {
        let text = r#"
            gravity = [0.0, -10.0, 0.0]
            tilt_limit = 0.5

            [window]
            title = "labyrinth"
            width = 1024
            height = 768

            [spawns]
            ball = [2.0, 1.0, 2.0]

            [zones.win]
            kind = "box"
            min = [-100.0, -5.0, -6.7]
            max = [-9.0, 5.0, -6.3]

            [zones.fall]
            kind = "below"
            y = -15.0
        "#;
        let config: GameConfig = toml::from_str(text).unwrap();
        assert_eq!(config.window.title, "labyrinth");
        assert_eq!(config.spawn("ball"), cgmath::Vector3::new(2.0, 1.0, 2.0));
        assert_eq!(
            config.zone("fall"),
            Some(Zone::Below { y: -15.0 })
        );
        match config.zone("win") {
            Some(Zone::Box { min, max }) => {
                assert_eq!(min[2], -6.7);
                assert_eq!(max[0], -9.0);
            }
            other => panic!("unexpected win zone {other:?}"),
        }
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config.gravity, [0.0, -10.0, 0.0]);
        assert_eq!(config.tilt_limit, 0.5);
        assert!(config.zone("win").is_none());
        assert_eq!(config.spawn("ball"), cgmath::Vector3::new(0.0, 0.0, 0.0));
    }
}
