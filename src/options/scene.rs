use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{error::CruiseError, util::color::parse_hex_color};

/// Scene look: background, mesh material and up to three lights.
///
/// A light missing from a document is absent from the scene, it does not
/// fall back to the default light. Field names accept the camelCase spellings of the settings editor JSON
/// (`castShadow`, `shadow_mapSize_width`, ...) as aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Scene", inline)]
#[serde(default)]
pub struct SceneOptions {
    /// Background color (`#rrggbb`).
    #[schemars(title = "Background")]
    pub background: String,
    /// Mesh material.
    pub mesh: MeshOptions,
    /// Optional ambient light.
    #[serde(default)]
    #[schemars(skip)]
    pub ambient: Option<AmbientOptions>,
    /// Optional spot light.
    #[serde(default)]
    #[schemars(skip)]
    pub spotlight: Option<LightOptions>,
    /// Optional point light.
    #[serde(default)]
    #[schemars(skip)]
    pub pointlight: Option<LightOptions>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            background: "#000000".into(),
            mesh: MeshOptions::default(),
            ambient: None,
            spotlight: None,
            pointlight: Some(LightOptions {
                color: "#ffffff".into(),
                position: [400.0, 1000.0, 400.0],
                ..LightOptions::default()
            }),
        }
    }
}

/// Mesh material and shadow flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Mesh", inline)]
#[serde(default)]
pub struct MeshOptions {
    /// Diffuse color (`#rrggbb`).
    #[schemars(title = "Mesh Color")]
    pub color: String,
    /// Whether the mesh casts shadows.
    #[serde(alias = "castShadow")]
    #[schemars(title = "Cast Shadow")]
    pub cast_shadow: bool,
    /// Whether the mesh receives shadows.
    #[serde(alias = "receiveShadow")]
    #[schemars(title = "Receive Shadow")]
    pub receive_shadow: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            color: "#7f828c".into(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// Ambient light.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AmbientOptions {
    /// Light color (`#rrggbb`).
    pub color: String,
}

/// A positioned light (spot or point).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(default)]
pub struct LightOptions {
    /// Light color (`#rrggbb`).
    pub color: String,
    /// World-space position.
    pub position: [f32; 3],
    /// Whether the light casts shadows.
    #[serde(alias = "castShadow")]
    pub cast_shadow: bool,
    /// Intensity multiplier (engine default when absent).
    pub intensity: Option<f32>,
    /// Shadow map width in texels.
    #[serde(alias = "shadow_mapSize_width")]
    pub shadow_map_width: Option<u32>,
    /// Shadow map height in texels.
    #[serde(alias = "shadow_mapSize_height")]
    pub shadow_map_height: Option<u32>,
    /// Shadow camera near plane.
    pub shadow_camera_near: Option<f32>,
    /// Shadow camera far plane.
    pub shadow_camera_far: Option<f32>,
    /// Shadow camera field of view.
    pub shadow_camera_fov: Option<f32>,
}

impl Default for LightOptions {
    fn default() -> Self {
        Self {
            color: "#ffffff".into(),
            position: [0.0; 3],
            cast_shadow: false,
            intensity: None,
            shadow_map_width: None,
            shadow_map_height: None,
            shadow_camera_near: None,
            shadow_camera_far: None,
            shadow_camera_fov: None,
        }
    }
}

impl SceneOptions {
    /// Parse the settings editor JSON shape. Unlike TOML presets, a
    /// settings document must carry a `mesh` object.
    pub fn from_settings_json(json: &str) -> Result<Self, CruiseError> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| CruiseError::OptionsParse(e.to_string()))?;
        if !value.get("mesh").is_some_and(serde_json::Value::is_object) {
            return Err(CruiseError::InvalidOptions(
                "settings: mesh properties required".into(),
            ));
        }
        let scene: Self = serde_json::from_value(value)
            .map_err(|e| CruiseError::OptionsParse(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Check every color decodes and every light position is finite.
    pub fn validate(&self) -> Result<(), CruiseError> {
        let _ = parse_hex_color(&self.background)?;
        let _ = parse_hex_color(&self.mesh.color)?;
        if let Some(ambient) = &self.ambient {
            let _ = parse_hex_color(&ambient.color)?;
        }
        for light in [&self.spotlight, &self.pointlight].into_iter().flatten() {
            let _ = parse_hex_color(&light.color)?;
            if !light.position.iter().all(|c| c.is_finite()) {
                return Err(CruiseError::InvalidOptions(format!(
                    "light position {:?} is not finite",
                    light.position
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_json_accepts_editor_spelling() {
        let json = r##"{
            "background": "#ff0000",
            "ambient": { "color": "#ffd700" },
            "mesh": { "castShadow": true, "receiveShadow": true, "color": "#7f828c" },
            "spotlight": {
                "color": "#ffffff",
                "position": [2000, 600, 450],
                "castShadow": true,
                "intensity": 1.6,
                "shadow_mapSize_width": 1024,
                "shadow_camera_far": 7777
            }
        }"##;
        let scene = SceneOptions::from_settings_json(json).unwrap();
        assert!(scene.mesh.cast_shadow);
        assert!(scene.mesh.receive_shadow);
        let spot = scene.spotlight.unwrap();
        assert_eq!(spot.shadow_map_width, Some(1024));
        assert_eq!(spot.shadow_camera_far, Some(7777.0));
        assert_eq!(spot.intensity, Some(1.6));
        assert!(scene.pointlight.is_none());
    }

    #[test]
    fn settings_json_requires_mesh() {
        let err = SceneOptions::from_settings_json(r##"{"background": "#000"}"##)
            .unwrap_err();
        assert!(matches!(err, CruiseError::InvalidOptions(_)));
    }

    #[test]
    fn settings_json_reports_syntax_errors() {
        let err = SceneOptions::from_settings_json("{ mesh: ").unwrap_err();
        assert!(matches!(err, CruiseError::OptionsParse(_)));
    }

    #[test]
    fn bad_color_fails_validation() {
        let scene = SceneOptions {
            background: "blue-ish".into(),
            ..SceneOptions::default()
        };
        assert!(matches!(
            scene.validate(),
            Err(CruiseError::InvalidColor(_))
        ));
    }
}
