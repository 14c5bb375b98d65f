//! Resolved scene look: decoded colors, mesh material and a light list the
//! host renderer can apply directly.

use glam::Vec3;

use crate::{
    error::CruiseError,
    options::{LightOptions, SceneOptions},
    util::color::parse_hex_color,
};

/// Mesh material flags and color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    /// Diffuse color, sRGB in `[0, 1]`.
    pub color: [f32; 3],
    /// Whether the mesh casts shadows.
    pub cast_shadow: bool,
    /// Whether the mesh receives shadows.
    pub receive_shadow: bool,
}

/// Light type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Uniform, unpositioned.
    Ambient,
    /// Omnidirectional from a position.
    Point,
    /// Cone from a position.
    Spot,
}

/// Shadow map and shadow camera parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowParams {
    /// Shadow map size in texels (width, height).
    pub map_size: [u32; 2],
    /// Shadow camera near plane.
    pub near: f32,
    /// Shadow camera far plane.
    pub far: f32,
    /// Shadow camera field of view in degrees.
    pub fov: f32,
}

impl ShadowParams {
    /// Renderer defaults for a light kind.
    #[must_use]
    pub fn for_kind(kind: LightKind) -> Self {
        Self {
            map_size: [512, 512],
            near: 0.5,
            far: 500.0,
            fov: if kind == LightKind::Point { 90.0 } else { 50.0 },
        }
    }
}

/// One resolved light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Light type.
    pub kind: LightKind,
    /// sRGB color in `[0, 1]`.
    pub color: [f32; 3],
    /// World-space position (zero for ambient).
    pub position: Vec3,
    /// Intensity multiplier.
    pub intensity: f32,
    /// Whether the light casts shadows.
    pub cast_shadow: bool,
    /// Shadow parameters.
    pub shadow: ShadowParams,
}

/// Everything the renderer needs to set up the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDescription {
    /// Clear color.
    pub background: [f32; 3],
    /// Material applied to the loaded mesh.
    pub mesh: MeshMaterial,
    /// Lights in the order they are added: ambient, point, spot.
    pub lights: Vec<Light>,
}

impl SceneDescription {
    /// Decode colors and merge light settings over renderer defaults.
    ///
    /// Zero-valued optional light parameters keep the default, matching
    /// how the settings editor treats an empty field.
    pub fn from_options(options: &SceneOptions) -> Result<Self, CruiseError> {
        let mut lights = Vec::with_capacity(3);
        if let Some(ambient) = &options.ambient {
            lights.push(Light {
                kind: LightKind::Ambient,
                color: parse_hex_color(&ambient.color)?,
                position: Vec3::ZERO,
                intensity: 1.0,
                cast_shadow: false,
                shadow: ShadowParams::for_kind(LightKind::Ambient),
            });
        }
        if let Some(point) = &options.pointlight {
            lights.push(resolve_light(LightKind::Point, point)?);
        }
        if let Some(spot) = &options.spotlight {
            lights.push(resolve_light(LightKind::Spot, spot)?);
        }

        Ok(Self {
            background: parse_hex_color(&options.background)?,
            mesh: MeshMaterial {
                color: parse_hex_color(&options.mesh.color)?,
                cast_shadow: options.mesh.cast_shadow,
                receive_shadow: options.mesh.receive_shadow,
            },
            lights,
        })
    }

    /// Whether any light or the mesh needs a shadow pass.
    #[must_use]
    pub fn needs_shadow_map(&self) -> bool {
        self.mesh.cast_shadow || self.lights.iter().any(|l| l.cast_shadow)
    }

    /// First light of a kind.
    #[must_use]
    pub fn light(&self, kind: LightKind) -> Option<&Light> {
        self.lights.iter().find(|l| l.kind == kind)
    }
}

fn resolve_light(
    kind: LightKind,
    options: &LightOptions,
) -> Result<Light, CruiseError> {
    let position = Vec3::from(options.position);
    if !position.is_finite() {
        return Err(CruiseError::InvalidOptions(format!(
            "{kind:?} light position is not finite"
        )));
    }

    let set_f = |v: Option<f32>| v.filter(|v| *v != 0.0);
    let set_u = |v: Option<u32>| v.filter(|v| *v != 0);
    let defaults = ShadowParams::for_kind(kind);
    let shadow = ShadowParams {
        map_size: [
            set_u(options.shadow_map_width).unwrap_or(defaults.map_size[0]),
            set_u(options.shadow_map_height).unwrap_or(defaults.map_size[1]),
        ],
        near: set_f(options.shadow_camera_near).unwrap_or(defaults.near),
        far: set_f(options.shadow_camera_far).unwrap_or(defaults.far),
        fov: set_f(options.shadow_camera_fov).unwrap_or(defaults.fov),
    };

    Ok(Light {
        kind,
        color: parse_hex_color(&options.color)?,
        position,
        intensity: set_f(options.intensity).unwrap_or(1.0),
        cast_shadow: options.cast_shadow,
        shadow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{AmbientOptions, Options};

    #[test]
    fn default_scene_has_one_point_light() {
        let scene = SceneDescription::from_options(&SceneOptions::default())
            .unwrap();
        assert_eq!(scene.background, [0.0; 3]);
        assert_eq!(scene.lights.len(), 1);
        let point = scene.light(LightKind::Point).unwrap();
        assert_eq!(point.position, Vec3::new(400.0, 1000.0, 400.0));
        assert_eq!(point.intensity, 1.0);
        assert!(!scene.needs_shadow_map());
    }

    #[test]
    fn lights_are_ordered_and_overridden() {
        let options = SceneOptions {
            ambient: Some(AmbientOptions {
                color: "#ffd700".into(),
            }),
            spotlight: Some(LightOptions {
                position: [2000.0, 600.0, 450.0],
                cast_shadow: true,
                intensity: Some(1.6),
                shadow_map_width: Some(1024),
                shadow_camera_far: Some(7777.0),
                shadow_camera_near: Some(0.0),
                ..LightOptions::default()
            }),
            ..SceneOptions::default()
        };
        let scene = SceneDescription::from_options(&options).unwrap();
        let kinds: Vec<_> = scene.lights.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [LightKind::Ambient, LightKind::Point, LightKind::Spot]
        );

        let spot = scene.light(LightKind::Spot).unwrap();
        assert_eq!(spot.intensity, 1.6);
        assert_eq!(spot.shadow.map_size, [1024, 512]);
        assert_eq!(spot.shadow.far, 7777.0);
        // Zero keeps the default.
        assert_eq!(spot.shadow.near, 0.5);
        assert!(scene.needs_shadow_map());
    }

    #[test]
    fn presets_resolve() {
        for name in Options::preset_names() {
            let options = Options::preset(name).unwrap();
            assert!(
                SceneDescription::from_options(&options.scene).is_ok(),
                "{name}"
            );
        }
    }

    #[test]
    fn bad_mesh_color_is_rejected() {
        let mut options = SceneOptions::default();
        options.mesh.color = "#zzz".into();
        assert!(matches!(
            SceneDescription::from_options(&options),
            Err(CruiseError::InvalidColor(_))
        ));
    }
}
