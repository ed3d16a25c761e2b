//! Orrery configuration (window, scene, carousel). Loaded from orrery.ron at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use engine_core::{BeamFlow, Color};
use scene::{LaserSettings, SceneConfig, SceneKind, SkillEntry, Theme, DEFAULT_GLOBE_RADIUS, DEFAULT_LASER_COLOR};
use serde::{Deserialize, Serialize};

use crate::deck::Card;

/// A label with a packed `0xRRGGBB` colour, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledColor {
    pub label: String,
    pub color: u32,
}

impl LabeledColor {
    fn new(label: &str, color: u32) -> Self {
        Self { label: label.to_string(), color }
    }
}

/// Persistent settings. Loaded from `orrery.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrreryConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default)]
    pub theme: Theme,
    /// Scene shown at startup.
    #[serde(default)]
    pub view: SceneKind,
    /// Height of the virtual page the mouse wheel scrolls through.
    #[serde(default = "default_page_height")]
    pub page_height: f32,
    /// Logical pixels scrolled per wheel line.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default = "default_star_count")]
    pub star_count: usize,
    #[serde(default = "default_star_seed")]
    pub star_seed: u64,
    /// Milliseconds between carousel rotations.
    #[serde(default = "default_carousel_delay")]
    pub carousel_delay_ms: u64,
    #[serde(default = "default_true")]
    pub pause_on_hover: bool,
    #[serde(default = "default_card_vertical_distance")]
    pub card_vertical_distance: f32,
    #[serde(default = "default_cards")]
    pub cards: Vec<LabeledColor>,
    #[serde(default = "default_skills")]
    pub skills: Vec<LabeledColor>,
    #[serde(default = "default_globe_radius")]
    pub globe_radius: f32,
    /// Beam colour of the laser scene, `0xRRGGBB`.
    #[serde(default = "default_laser_color")]
    pub laser_color: u32,
    /// How fast the beams flow.
    #[serde(default = "default_laser_speed")]
    pub laser_speed: f32,
    #[serde(default)]
    pub laser_horizontal_offset: f32,
    #[serde(default)]
    pub laser_vertical_offset: f32,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    800
}
fn default_page_height() -> f32 {
    6000.0
}
fn default_line_height() -> f32 {
    40.0
}
fn default_star_count() -> usize {
    2000
}
fn default_star_seed() -> u64 {
    0x5eed
}
fn default_carousel_delay() -> u64 {
    carousel::DEFAULT_INTERVAL.as_millis() as u64
}
fn default_true() -> bool {
    true
}
fn default_card_vertical_distance() -> f32 {
    70.0
}
fn default_globe_radius() -> f32 {
    DEFAULT_GLOBE_RADIUS
}
fn default_laser_color() -> u32 {
    DEFAULT_LASER_COLOR
}
fn default_laser_speed() -> f32 {
    1.0
}
fn default_cards() -> Vec<LabeledColor> {
    vec![
        LabeledColor::new("Hey Attrangi Meet", 0x1e293b),
        LabeledColor::new("Pragya", 0x312e81),
        LabeledColor::new("Solar Power Prediction", 0x713f12),
        LabeledColor::new("Geolocation-Based Attendance System", 0x064e3b),
    ]
}
fn default_skills() -> Vec<LabeledColor> {
    scene::default_skills()
        .into_iter()
        .map(|skill| LabeledColor { color: pack(skill.color), label: skill.label })
        .collect()
}

fn pack(color: Color) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(color.r) << 16) | (channel(color.g) << 8) | channel(color.b)
}

impl Default for OrreryConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            theme: Theme::default(),
            view: SceneKind::default(),
            page_height: default_page_height(),
            line_height: default_line_height(),
            star_count: default_star_count(),
            star_seed: default_star_seed(),
            carousel_delay_ms: default_carousel_delay(),
            pause_on_hover: default_true(),
            card_vertical_distance: default_card_vertical_distance(),
            cards: default_cards(),
            skills: default_skills(),
            globe_radius: default_globe_radius(),
            laser_color: default_laser_color(),
            laser_speed: default_laser_speed(),
            laser_horizontal_offset: 0.0,
            laser_vertical_offset: 0.0,
        }
    }
}

impl OrreryConfig {
    /// Load config from `orrery.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `orrery.ron`. Logs on error.
    pub fn save(&self) {
        let path = config_path();
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(&path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// The scene the window starts with.
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            theme: self.theme,
            kind: self.view,
            star_count: self.star_count,
            star_seed: self.star_seed,
            skills: self
                .skills
                .iter()
                .map(|s| SkillEntry::new(s.label.clone(), s.color))
                .collect(),
            globe_radius: self.globe_radius,
            laser: LaserSettings {
                color: Color::from_hex(self.laser_color),
                flow: BeamFlow {
                    speed: self.laser_speed,
                    horizontal_offset: self.laser_horizontal_offset,
                    vertical_offset: self.laser_vertical_offset,
                },
            },
        }
    }

    pub fn cards(&self) -> Vec<Card> {
        self.cards
            .iter()
            .map(|c| Card { label: c.label.clone(), color: Color::from_hex(c.color) })
            .collect()
    }

    pub fn carousel_interval(&self) -> Duration {
        Duration::from_millis(self.carousel_delay_ms)
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("orrery.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: OrreryConfig = ron::from_str("(theme: Light, carousel_delay_ms: 1500)").unwrap();
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.carousel_interval(), Duration::from_millis(1500));
        assert_eq!(config.window_width, 1280);
        assert_eq!(config.cards.len(), 4);
    }

    #[test]
    fn hex_colours_parse() {
        let config: OrreryConfig =
            ron::from_str("(skills: [(label: \"Rust\", color: 0xdea584)])").unwrap();
        let scene = config.scene_config();
        assert_eq!(scene.skills.len(), 1);
        assert_eq!(scene.skills[0].color, Color::from_hex(0xdea584));
    }

    #[test]
    fn laser_settings_reach_the_scene() {
        let config: OrreryConfig =
            ron::from_str("(view: Laser, laser_color: 0x00ffcc, laser_speed: 2.5, laser_vertical_offset: -0.5)")
                .unwrap();
        let scene = config.scene_config();
        assert_eq!(scene.kind, SceneKind::Laser);
        assert_eq!(scene.laser.color, Color::from_hex(0x00ffcc));
        assert_eq!(
            scene.laser.flow,
            BeamFlow { speed: 2.5, horizontal_offset: 0.0, vertical_offset: -0.5 }
        );
        assert_eq!(OrreryConfig::default().scene_config().laser, LaserSettings::default());
    }

    #[test]
    fn default_skills_match_scene_defaults() {
        let config = OrreryConfig::default();
        assert_eq!(config.scene_config().skills, scene::default_skills());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = OrreryConfig::load_from(Path::new("/definitely/not/here/orrery.ron"));
        assert_eq!(config, OrreryConfig::default());
    }
}
