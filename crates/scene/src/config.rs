//! Immutable scene configuration.

use engine_core::{BeamFlow, Color};
use serde::{Deserialize, Serialize};

/// Alpha the surface is cleared with.
pub const CLEAR_ALPHA: f32 = 0.7;

/// Default radius the globe nodes sit on.
pub const DEFAULT_GLOBE_RADIUS: f32 = 1.6;

pub const DEFAULT_LASER_COLOR: u32 = 0xff79c6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                clear: Color::from_hex(0x000000),
                foreground: Color::from_hex(0xffffff),
                wireframe: Color::from_hex(0xcccccc),
                satellite: Color::from_hex(0xdddddd),
                ambient: Color::from_hex(0x404040),
                directional: Color::from_hex(0xffffff),
            },
            Theme::Light => Palette {
                clear: Color::from_hex(0xffffff),
                foreground: Color::from_hex(0x000000),
                wireframe: Color::from_hex(0x333333),
                satellite: Color::from_hex(0x222222),
                ambient: Color::from_hex(0x808080),
                directional: Color::from_hex(0x222222),
            },
        }
    }
}

/// Colors a scene is built with. Fixed for the scene's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub clear: Color,
    pub foreground: Color,
    pub wireframe: Color,
    pub satellite: Color,
    pub ambient: Color,
    pub directional: Color,
}

/// Which scene to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SceneKind {
    /// Earth and moon under a scroll-driven camera.
    #[default]
    Hero,
    /// Spinning globe of labeled nodes.
    Globe,
    /// Flowing noise beams filling the view.
    Laser,
}

impl SceneKind {
    /// The next kind in the cycle Hero, Globe, Laser.
    pub fn next(self) -> Self {
        match self {
            SceneKind::Hero => SceneKind::Globe,
            SceneKind::Globe => SceneKind::Laser,
            SceneKind::Laser => SceneKind::Hero,
        }
    }
}

/// Look of the laser scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserSettings {
    pub color: Color,
    pub flow: BeamFlow,
}

impl Default for LaserSettings {
    fn default() -> Self {
        Self { color: Color::from_hex(DEFAULT_LASER_COLOR), flow: BeamFlow::default() }
    }
}

/// One labeled globe node.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillEntry {
    pub label: String,
    pub color: Color,
}

impl SkillEntry {
    pub fn new(label: impl Into<String>, hex: u32) -> Self {
        Self { label: label.into(), color: Color::from_hex(hex) }
    }
}

/// Everything a scene is built from. Changing any field means building a new scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub theme: Theme,
    pub kind: SceneKind,
    pub star_count: usize,
    pub star_seed: u64,
    pub skills: Vec<SkillEntry>,
    pub globe_radius: f32,
    pub laser: LaserSettings,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            kind: SceneKind::default(),
            star_count: 2000,
            star_seed: 0x5eed,
            skills: default_skills(),
            globe_radius: DEFAULT_GLOBE_RADIUS,
            laser: LaserSettings::default(),
        }
    }
}

impl SceneConfig {
    pub fn with_theme(&self, theme: Theme) -> Self {
        Self { theme, ..self.clone() }
    }

    pub fn with_kind(&self, kind: SceneKind) -> Self {
        Self { kind, ..self.clone() }
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }
}

pub fn default_skills() -> Vec<SkillEntry> {
    vec![
        SkillEntry::new("React", 0x61dafb),
        SkillEntry::new("Node.js", 0x339933),
        SkillEntry::new("Python", 0x3776ab),
        SkillEntry::new("Docker", 0x2496ed),
        SkillEntry::new("AWS", 0xff9900),
        SkillEntry::new("Next.js", 0xffffff),
        SkillEntry::new("TypeScript", 0x3178c6),
        SkillEntry::new("PostgreSQL", 0x4169e1),
        SkillEntry::new("FastAPI", 0x009688),
        SkillEntry::new("Tailwind", 0x06b6d4),
    ]
}
