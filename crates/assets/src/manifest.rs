//! Lesson catalogue.
//!
//! Every lesson has baked-in defaults pointing at fixed paths under the assets
//! directory. An optional JSON manifest can override any lesson's entry:
//!
//! ```json
//! {
//!   "lessons": {
//!     "quad": { "vertex_shader": "shaders/quad.vert.wgsl",
//!               "fragment_shader": "shaders/grey.frag.wgsl",
//!               "texture": null, "geometry": "quad", "camera": false,
//!               "instances": "single" }
//!   }
//! }
//! ```

use crate::AssetError;
use crate::geometry::GeometryKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The tutorial steps, in teaching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lesson {
    Triangle,
    Quad,
    Cube,
    Camera,
    Lighting,
}

impl Lesson {
    pub const ALL: [Lesson; 5] = [
        Lesson::Triangle,
        Lesson::Quad,
        Lesson::Cube,
        Lesson::Camera,
        Lesson::Lighting,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Lesson::Triangle => "triangle",
            Lesson::Quad => "quad",
            Lesson::Cube => "cube",
            Lesson::Camera => "camera",
            Lesson::Lighting => "lighting",
        }
    }

    /// Built-in asset set, relative to the assets directory.
    pub fn default_assets(self) -> LessonAssets {
        let shaders = |vert: &str, frag: &str| {
            (
                PathBuf::from(format!("shaders/{vert}.vert.wgsl")),
                PathBuf::from(format!("shaders/{frag}.frag.wgsl")),
            )
        };
        let texture = Some(PathBuf::from("textures/test.png"));
        let (vertex_shader, fragment_shader, texture, geometry, camera, instances) = match self {
            Lesson::Triangle => {
                let (v, f) = shaders("triangle", "triangle");
                (v, f, None, GeometryKind::Triangle, false, Instances::Single)
            }
            Lesson::Quad => {
                let (v, f) = shaders("quad", "texture");
                (v, f, texture, GeometryKind::Quad, false, Instances::Single)
            }
            Lesson::Cube => {
                let (v, f) = shaders("cube", "texture");
                (v, f, texture, GeometryKind::Cube, false, Instances::Single)
            }
            Lesson::Camera => {
                let (v, f) = shaders("cube", "texture");
                (v, f, texture, GeometryKind::Cube, true, Instances::Scattered)
            }
            Lesson::Lighting => {
                let (v, f) = shaders("lit", "lit");
                (v, f, texture, GeometryKind::LitCube, true, Instances::Scattered)
            }
        };
        LessonAssets {
            vertex_shader,
            fragment_shader,
            texture,
            geometry,
            camera,
            instances,
        }
    }
}

impl fmt::Display for Lesson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown lesson name on the command line.
#[derive(Debug, thiserror::Error)]
#[error("unknown lesson '{0}' (expected one of: triangle, quad, cube, camera, lighting)")]
pub struct ParseLessonError(String);

impl FromStr for Lesson {
    type Err = ParseLessonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lesson::ALL
            .into_iter()
            .find(|lesson| lesson.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLessonError(s.to_string()))
    }
}

/// How many copies of the mesh a lesson draws and how they move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instances {
    /// One mesh at the origin.
    Single,
    /// One mesh rotating about a tilted axis. Only selected by a manifest
    /// override; no lesson spins by default.
    Spinning,
    /// Ten cubes at fixed positions, each with its own tilt.
    Scattered,
}

/// Everything a lesson loads at startup. Paths are relative to the assets root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonAssets {
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    #[serde(default)]
    pub texture: Option<PathBuf>,
    pub geometry: GeometryKind,
    #[serde(default)]
    pub camera: bool,
    #[serde(default = "default_instances")]
    pub instances: Instances,
}

fn default_instances() -> Instances {
    Instances::Single
}

impl LessonAssets {
    /// Resolve relative paths against `root`.
    pub fn resolved(&self, root: &Path) -> LessonAssets {
        LessonAssets {
            vertex_shader: root.join(&self.vertex_shader),
            fragment_shader: root.join(&self.fragment_shader),
            texture: self.texture.as_ref().map(|t| root.join(t)),
            ..self.clone()
        }
    }
}

/// Per-lesson overrides loaded from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    #[serde(default)]
    pub lessons: BTreeMap<Lesson, LessonAssets>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Self =
            serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| {
                AssetError::Manifest {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        tracing::debug!(
            path = %path.display(),
            overrides = manifest.lessons.len(),
            "loaded lesson manifest"
        );
        Ok(manifest)
    }

    /// Save the manifest as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AssetError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_writer_pretty(file, self).map_err(|source| AssetError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The override for `lesson` if present, otherwise its defaults.
    pub fn lesson(&self, lesson: Lesson) -> LessonAssets {
        self.lessons
            .get(&lesson)
            .cloned()
            .unwrap_or_else(|| lesson.default_assets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lesson_names() {
        assert_eq!("quad".parse::<Lesson>().unwrap(), Lesson::Quad);
        assert_eq!("Lighting".parse::<Lesson>().unwrap(), Lesson::Lighting);
        assert!("teapot".parse::<Lesson>().is_err());
        for lesson in Lesson::ALL {
            assert_eq!(lesson.to_string().parse::<Lesson>().unwrap(), lesson);
        }
    }

    #[test]
    fn defaults_follow_fixed_layout() {
        let quad = Lesson::Quad.default_assets();
        assert_eq!(quad.vertex_shader, PathBuf::from("shaders/quad.vert.wgsl"));
        assert_eq!(quad.fragment_shader, PathBuf::from("shaders/texture.frag.wgsl"));
        assert_eq!(quad.texture, Some(PathBuf::from("textures/test.png")));
        assert_eq!(quad.geometry, GeometryKind::Quad);
        assert!(!quad.camera);

        let triangle = Lesson::Triangle.default_assets();
        assert!(triangle.texture.is_none());

        let cube = Lesson::Cube.default_assets();
        assert_eq!(cube.instances, Instances::Single);
        assert!(
            Lesson::ALL
                .into_iter()
                .all(|lesson| lesson.default_assets().instances != Instances::Spinning)
        );

        let lighting = Lesson::Lighting.default_assets();
        assert_eq!(lighting.geometry, GeometryKind::LitCube);
        assert!(lighting.camera);
    }

    #[test]
    fn resolved_joins_root() {
        let assets = Lesson::Cube.default_assets().resolved(Path::new("/data"));
        assert_eq!(assets.vertex_shader, PathBuf::from("/data/shaders/cube.vert.wgsl"));
        assert_eq!(assets.texture, Some(PathBuf::from("/data/textures/test.png")));
    }

    #[test]
    fn manifest_overrides_single_lesson() {
        let json = r#"{
            "lessons": {
                "quad": {
                    "vertex_shader": "custom/quad.vert.wgsl",
                    "fragment_shader": "custom/quad.frag.wgsl",
                    "geometry": "quad"
                }
            }
        }"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lessons.json");
        std::fs::write(&path, json).unwrap();

        let manifest = AssetManifest::load(&path).unwrap();
        let quad = manifest.lesson(Lesson::Quad);
        assert_eq!(quad.vertex_shader, PathBuf::from("custom/quad.vert.wgsl"));
        assert_eq!(quad.texture, None);
        assert_eq!(quad.instances, Instances::Single);
        assert_eq!(manifest.lesson(Lesson::Cube), Lesson::Cube.default_assets());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lessons.json");
        let mut manifest = AssetManifest::new();
        manifest
            .lessons
            .insert(Lesson::Camera, Lesson::Lighting.default_assets());
        manifest.save(&path).unwrap();

        let loaded = AssetManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn malformed_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lessons.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            AssetManifest::load(&path),
            Err(AssetError::Manifest { .. })
        ));
    }
}
