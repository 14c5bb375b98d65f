//! Centralized navigation and scene options with TOML preset support.
//!
//! Control tuning, key bindings and the scene look are consolidated here.
//! Options serialize to/from TOML; the six built-in world presets live in
//! `assets/presets/` and are compiled into the binary.

mod controls;
mod keybindings;
mod scene;

use std::path::Path;

pub use controls::ControlOptions;
pub use keybindings::KeybindingOptions;
pub use scene::{AmbientOptions, LightOptions, MeshOptions, SceneOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::CruiseError;

/// Built-in world presets: `(name, TOML source)`.
const PRESETS: [(&str, &str); 6] = [
    ("bw", include_str!("../../assets/presets/bw.toml")),
    ("green", include_str!("../../assets/presets/green.toml")),
    (
        "pink-orange",
        include_str!("../../assets/presets/pink-orange.toml"),
    ),
    ("polyester", include_str!("../../assets/presets/polyester.toml")),
    ("red", include_str!("../../assets/presets/red.toml")),
    ("sonne", include_str!("../../assets/presets/sonne.toml")),
];

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[controls]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Navigation speeds, clamps and speed curve.
    pub controls: ControlOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
    /// Background, mesh material and lights.
    pub scene: SceneOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from a TOML string and validate them.
    pub fn from_toml(content: &str) -> Result<Self, CruiseError> {
        let opts: Self = toml::from_str(content)
            .map_err(|e| CruiseError::OptionsParse(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, CruiseError> {
        let content = std::fs::read_to_string(path).map_err(CruiseError::Io)?;
        Self::from_toml(&content)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), CruiseError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CruiseError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CruiseError::Io)?;
        }
        std::fs::write(path, content).map_err(CruiseError::Io)
    }

    /// Check control scalars, key bindings and scene colors.
    pub fn validate(&self) -> Result<(), CruiseError> {
        self.controls
            .validate()
            .map_err(CruiseError::InvalidOptions)?;
        self.keybindings
            .validate()
            .map_err(CruiseError::InvalidOptions)?;
        self.scene.validate()
    }

    /// Names of the built-in presets.
    #[must_use]
    pub fn preset_names() -> Vec<&'static str> {
        PRESETS.iter().map(|(name, _)| *name).collect()
    }

    /// Load a built-in preset by name.
    pub fn preset(name: &str) -> Result<Self, CruiseError> {
        let (_, source) = PRESETS
            .iter()
            .find(|(preset, _)| *preset == name)
            .ok_or_else(|| CruiseError::UnknownPreset(name.to_owned()))?;
        Self::from_toml(source)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
