//! Model catalog and load progress reporting.
//!
//! The controller does not care what it flies through; the host loads one
//! of these meshes, reports progress, and tells the
//! [`ViewerSession`](crate::session::ViewerSession) when it is done.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mesh container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    /// Binary glTF.
    Glb,
    /// Draco-compressed glTF.
    Gltf,
    /// Stanford polygon file.
    Ply,
}

impl ModelType {
    /// Infer the format from a URL or path extension (case-insensitive,
    /// query string and fragment ignored).
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let file = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = file.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "glb" => Some(Self::Glb),
            "gltf" => Some(Self::Gltf),
            "ply" => Some(Self::Ply),
            _ => None,
        }
    }

    /// Whether the loader needs a Draco decoder for this format.
    #[must_use]
    pub fn needs_draco(self) -> bool {
        self == Self::Gltf
    }
}

/// A loadable model: URL, format and a human-readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    /// Catalog key.
    pub id: &'static str,
    /// Relative URL of the mesh.
    pub url: &'static str,
    /// Container format.
    #[serde(rename = "type")]
    pub model_type: ModelType,
    /// Shown in the model picker.
    pub description: &'static str,
}

static CATALOG: [ModelInfo; 7] = [
    ModelInfo {
        id: "glbLow",
        url: "./model/glb/nest_full_LOD4.glb",
        model_type: ModelType::Glb,
        description: "GLB, low resolution (52 MB)",
    },
    ModelInfo {
        id: "glbMid",
        url: "./model/glb/nest_full_LOD2.glb",
        model_type: ModelType::Glb,
        description: "GLB, medium resolution (182 MB)",
    },
    ModelInfo {
        id: "gltfLow",
        url: "./model/glb/nest_full_LOD4.gltf",
        model_type: ModelType::Gltf,
        description: "GLTF, low resolution, compressed (15 MB), desktop \
                      machines with enough memory only",
    },
    ModelInfo {
        id: "gltfMid",
        url: "./model/glb/nest_full_LOD2.gltf",
        model_type: ModelType::Gltf,
        description: "GLTF, medium resolution, compressed (45 MB), desktop \
                      machines with enough memory only",
    },
    ModelInfo {
        id: "plyLow",
        url: "./model/ply/nest_full_LOD4.ply",
        model_type: ModelType::Ply,
        description: "PLY, low resolution (44 MB)",
    },
    ModelInfo {
        id: "plyMid",
        url: "./model/ply/nest_full_LOD2.ply",
        model_type: ModelType::Ply,
        description: "PLY, medium resolution (44 MB)",
    },
    ModelInfo {
        id: "plyCube",
        url: "./model/ply/cube.ply",
        model_type: ModelType::Ply,
        description: "Test cube",
    },
];

/// Built-in model catalog.
#[must_use]
pub fn catalog() -> &'static [ModelInfo] {
    &CATALOG
}

/// Look up a catalog entry by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static ModelInfo> {
    CATALOG.iter().find(|m| m.id == id)
}

/// The model loaded when nothing else is selected.
#[must_use]
pub fn default_model() -> &'static ModelInfo {
    &CATALOG[4]
}

/// Bytes received so far for a model download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    /// Bytes received.
    pub loaded: u64,
    /// Total size, if the server reported one.
    pub total: Option<u64>,
}

impl LoadProgress {
    /// Progress with a known total.
    #[must_use]
    pub fn new(loaded: u64, total: u64) -> Self {
        Self {
            loaded,
            total: Some(total),
        }
    }

    /// Whole percent, rounded up. `None` when the length is not computable.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|&t| t > 0)?;
        let loaded = u128::from(self.loaded.min(total));
        Some((loaded * 100).div_ceil(u128::from(total)) as u8)
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.percent() {
            Some(p) => write!(f, "{p}%"),
            None => write!(f, "{} bytes", self.loaded),
        }
    }
}

/// Where the session's model is in its load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Download or decode in progress.
    Loading(LoadProgress),
    /// Mesh is in the scene.
    Loaded,
    /// Loading failed; the message is shown to the user.
    Failed(String),
}

impl LoadStatus {
    /// Whether the mesh is ready to render.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }
}
