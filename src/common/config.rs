use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout_engine::DockPosition;

pub fn config_file() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".edgedock.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub dock: DockConfig,
}

/// The flat option set read on every layout pass.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct DockConfig {
    /// Screen edge the dock is anchored to. Anything other than `bottom`
    /// requires `experimental_features`.
    #[serde(default)]
    pub position: DockPosition,
    #[serde(default)]
    pub experimental_features: bool,
    /// Normalized icon size in [0, 1], mapped through the preferred size table.
    #[serde(default = "default_icon_size")]
    pub icon_size: f64,
    /// Gap between the dock and the screen edge, in 20px units.
    #[serde(default)]
    pub edge_distance: f64,
    #[serde(default)]
    pub panel_mode: bool,
    #[serde(default)]
    pub shrink_icons: bool,
    #[serde(default = "default_half")]
    pub animation_spread: f64,
    #[serde(default = "default_half")]
    pub animation_magnify: f64,
    #[serde(default = "default_half")]
    pub animation_rise: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub favorites_only: bool,
    #[serde(default = "yes")]
    pub open_app_animation: bool,
    /// Whether the show-applications affordance is displayed.
    #[serde(default = "yes")]
    pub apps_icon: bool,
    #[serde(default = "default_animation_fps")]
    pub animation_fps: f64,
    #[serde(default)]
    pub autohide: AutoHideSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct AutoHideSettings {
    #[serde(default = "yes")]
    pub enabled: bool,
    /// Dwell time outside the dock before hiding starts.
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: f64,
    /// Duration of the show and hide slides.
    #[serde(default = "default_autohide_duration_ms")]
    pub duration_ms: f64,
    #[serde(default)]
    pub easing: AnimationEasing,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnimationEasing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    BounceIn,
    BounceOut,
    BounceInOut,
}

impl Default for DockConfig {
    fn default() -> Self {
        Self {
            position: DockPosition::default(),
            experimental_features: false,
            icon_size: default_icon_size(),
            edge_distance: 0.0,
            panel_mode: false,
            shrink_icons: false,
            animation_spread: default_half(),
            animation_magnify: default_half(),
            animation_rise: default_half(),
            scale: default_scale(),
            favorites_only: false,
            open_app_animation: true,
            apps_icon: true,
            animation_fps: default_animation_fps(),
            autohide: AutoHideSettings::default(),
        }
    }
}

impl Default for AutoHideSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_delay_ms: default_hide_delay_ms(),
            duration_ms: default_autohide_duration_ms(),
            easing: AnimationEasing::default(),
        }
    }
}

impl DockConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        for (name, value) in self.fractions() {
            if !(0.0..=1.0).contains(&value) {
                issues.push(format!("{name} must be within [0, 1], got {value}"));
            }
        }

        if self.edge_distance < 0.0 {
            issues.push(format!(
                "edge_distance must be non-negative, got {}",
                self.edge_distance
            ));
        }

        if self.scale <= 0.0 {
            issues.push(format!("scale must be positive, got {}", self.scale));
        }

        if self.animation_fps <= 0.0 {
            issues.push(format!(
                "animation_fps must be positive, got {}",
                self.animation_fps
            ));
        }

        issues.extend(self.autohide.validate());

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        let defaults = DockConfig::default();
        for (value, default) in [
            (&mut self.icon_size, defaults.icon_size),
            (&mut self.animation_spread, defaults.animation_spread),
            (&mut self.animation_magnify, defaults.animation_magnify),
            (&mut self.animation_rise, defaults.animation_rise),
        ] {
            if !(0.0..=1.0).contains(&*value) {
                *value = default;
                fixes += 1;
            }
        }

        if self.edge_distance < 0.0 {
            self.edge_distance = 0.0;
            fixes += 1;
        }

        if self.scale <= 0.0 {
            self.scale = default_scale();
            fixes += 1;
        }

        if self.animation_fps <= 0.0 {
            self.animation_fps = default_animation_fps();
            fixes += 1;
        }

        fixes += self.autohide.auto_fix_values();

        fixes
    }

    fn fractions(&self) -> [(&'static str, f64); 4] {
        [
            ("icon_size", self.icon_size),
            ("animation_spread", self.animation_spread),
            ("animation_magnify", self.animation_magnify),
            ("animation_rise", self.animation_rise),
        ]
    }
}

impl AutoHideSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.hide_delay_ms < 0.0 {
            issues.push(format!(
                "autohide.hide_delay_ms must be non-negative, got {}",
                self.hide_delay_ms
            ));
        }

        if self.duration_ms < 0.0 {
            issues.push(format!(
                "autohide.duration_ms must be non-negative, got {}",
                self.duration_ms
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if self.hide_delay_ms < 0.0 {
            self.hide_delay_ms = default_hide_delay_ms();
            fixes += 1;
        }

        if self.duration_ms < 0.0 {
            self.duration_ms = default_autohide_duration_ms();
            fixes += 1;
        }

        fixes
    }
}

fn yes() -> bool { true }

fn default_icon_size() -> f64 { 0.15 }

fn default_half() -> f64 { 0.5 }

fn default_scale() -> f64 { 1.0 }

fn default_animation_fps() -> f64 { 60.0 }

fn default_hide_delay_ms() -> f64 { 300.0 }

fn default_autohide_duration_ms() -> f64 { 200.0 }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&buf)
    }

    /// Reads the config at `path` if it exists, falling back to the embedded
    /// default otherwise.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn default() -> Config {
        Self::parse(include_str!("../../edgedock.default.toml"))
            .expect("embedded default config is valid")
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;

        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.dock.validate() }

    /// Attempts to fix configuration values automatically.
    /// Returns the number of fixes applied.
    pub fn auto_fix_values(&mut self) -> usize { self.dock.auto_fix_values() }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }
}
