//! Shader selection, WGSL sources, and the compiled module cache.
//!
//! Each [`ShaderKind`] has a vertex and a fragment stage. Both stages are
//! compiled as separate modules, each prefixed with the shared prelude that
//! declares the uniform blocks, vertex attributes and noise helpers.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;
use wgpu::{ShaderModuleDescriptor, ShaderSource};

/// Uniform blocks, vertex I/O structs and noise functions shared by every stage.
pub const PRELUDE_SOURCE: &str = include_str!("../shaders/prelude.wgsl");

/// Error types for shader loading operations.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("unknown shader '{0}' (expected lambert, custom or planet)")]
    UnknownKind(String),

    #[error("shader file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read shader file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("shader '{name}' not found in library")]
    NotLoaded { name: String },

    #[error("no shader directory configured for file-based loading")]
    NoShaderDir,

    #[error("shader '{name}' failed validation: {message}")]
    Compile { name: String, message: String },
}

/// Run `create` inside a validation error scope. A captured error becomes
/// [`ShaderError::Compile`].
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    name: &str,
    create: impl FnOnce() -> T,
) -> Result<T, ShaderError> {
    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(scope.pop()) {
        None => Ok(value),
        Some(err) => Err(ShaderError::Compile {
            name: name.to_string(),
            message: err.to_string(),
        }),
    }
}

/// The selectable surface shaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShaderKind {
    #[default]
    Lambert,
    Custom,
    Planet,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 3] = [ShaderKind::Lambert, ShaderKind::Custom, ShaderKind::Planet];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Lambert => "lambert",
            ShaderKind::Custom => "custom",
            ShaderKind::Planet => "planet",
        }
    }

    /// The next kind in [`ShaderKind::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&k| k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Built-in WGSL body for one stage (without the prelude).
    pub fn builtin_source(self, stage: ShaderStage) -> &'static str {
        match (self, stage) {
            (ShaderKind::Lambert, ShaderStage::Vertex) => include_str!("../shaders/lambert.vert.wgsl"),
            (ShaderKind::Lambert, ShaderStage::Fragment) => include_str!("../shaders/lambert.frag.wgsl"),
            (ShaderKind::Custom, ShaderStage::Vertex) => include_str!("../shaders/custom.vert.wgsl"),
            (ShaderKind::Custom, ShaderStage::Fragment) => include_str!("../shaders/custom.frag.wgsl"),
            (ShaderKind::Planet, ShaderStage::Vertex) => include_str!("../shaders/planet.vert.wgsl"),
            (ShaderKind::Planet, ShaderStage::Fragment) => include_str!("../shaders/planet.frag.wgsl"),
        }
    }

    /// Library key for one stage, e.g. `planet.vert`.
    pub fn module_name(self, stage: ShaderStage) -> String {
        format!("{}.{}", self.name(), stage.extension())
    }

    /// File name for one stage inside a shader directory, e.g. `planet.vert.wgsl`.
    pub fn file_name(self, stage: ShaderStage) -> String {
        format!("{}.wgsl", self.module_name(stage))
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderKind {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ShaderError::UnknownKind(s.to_string()))
    }
}

/// Programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
        }
    }
}

/// Join the prelude and a stage body into one compilable WGSL module.
pub fn with_prelude(body: &str) -> String {
    format!("{PRELUDE_SOURCE}\n{body}")
}

/// Central registry for compiled shader modules with optional file-based reload.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
    shader_dir: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            shader_dir: None,
        }
    }

    /// Set the directory to load `.wgsl` stage files from (development mode).
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = Some(dir.into());
        self
    }

    pub fn shader_dir(&self) -> Option<&PathBuf> {
        self.shader_dir.as_ref()
    }

    pub fn set_shader_dir(&mut self, dir: Option<PathBuf>) {
        self.shader_dir = dir;
    }

    /// Compile a module from a complete WGSL source string and cache it under `name`.
    ///
    /// A module that fails validation is not cached; any previous module under
    /// `name` stays in place.
    pub fn load_from_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: &str,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        debug!("Compiling shader '{}'", name);

        let module = Arc::new(validated(device, name, || {
            device.create_shader_module(ShaderModuleDescriptor {
                label: Some(name),
                source: ShaderSource::Wgsl(source.into()),
            })
        })?);

        if self.modules.insert(name.to_string(), module.clone()).is_some() {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }

        Ok(module)
    }

    /// Read a stage body from the shader directory.
    pub fn read_stage_file(&self, filename: &str) -> Result<String, ShaderError> {
        let shader_dir = self.shader_dir.as_ref().ok_or(ShaderError::NoShaderDir)?;
        let path = shader_dir.join(filename);

        if !path.exists() {
            return Err(ShaderError::FileNotFound { path });
        }

        debug!("Reading shader stage from {:?}", path);
        Ok(std::fs::read_to_string(&path)?)
    }

    /// Compile one stage of `kind`.
    ///
    /// With a shader directory configured, a matching `<kind>.<stage>.wgsl`
    /// file overrides the built-in body; otherwise the embedded source is used.
    pub fn load_stage(
        &mut self,
        device: &wgpu::Device,
        kind: ShaderKind,
        stage: ShaderStage,
    ) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        let body = match self.read_stage_file(&kind.file_name(stage)) {
            Ok(body) => body,
            Err(ShaderError::NoShaderDir | ShaderError::FileNotFound { .. }) => {
                kind.builtin_source(stage).to_string()
            }
            Err(e) => return Err(e),
        };

        self.load_from_source(device, &kind.module_name(stage), &with_prelude(&body))
    }

    /// Compile both stages of `kind`, returning `(vertex, fragment)`.
    pub fn load_kind(
        &mut self,
        device: &wgpu::Device,
        kind: ShaderKind,
    ) -> Result<(Arc<wgpu::ShaderModule>, Arc<wgpu::ShaderModule>), ShaderError> {
        let vertex = self.load_stage(device, kind, ShaderStage::Vertex)?;
        let fragment = self.load_stage(device, kind, ShaderStage::Fragment)?;
        Ok((vertex, fragment))
    }

    /// Get a previously loaded module by name.
    pub fn get(&self, name: &str) -> Result<Arc<wgpu::ShaderModule>, ShaderError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| ShaderError::NotLoaded {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::create_test_device;

    #[test]
    fn test_kind_names_round_trip_through_from_str() {
        for kind in ShaderKind::ALL {
            assert_eq!(kind.name().parse::<ShaderKind>().unwrap(), kind);
        }
        assert_eq!(" Planet ".parse::<ShaderKind>().unwrap(), ShaderKind::Planet);
        assert!(matches!(
            "phong".parse::<ShaderKind>(),
            Err(ShaderError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_next_cycles_through_all() {
        assert_eq!(ShaderKind::Lambert.next(), ShaderKind::Custom);
        assert_eq!(ShaderKind::Custom.next(), ShaderKind::Planet);
        assert_eq!(ShaderKind::Planet.next(), ShaderKind::Lambert);
    }

    #[test]
    fn test_module_and_file_names() {
        assert_eq!(
            ShaderKind::Planet.module_name(ShaderStage::Vertex),
            "planet.vert"
        );
        assert_eq!(
            ShaderKind::Custom.file_name(ShaderStage::Fragment),
            "custom.frag.wgsl"
        );
    }

    #[test]
    fn test_builtin_stages_have_entry_points() {
        for kind in ShaderKind::ALL {
            assert!(kind.builtin_source(ShaderStage::Vertex).contains("fn vs_main"));
            assert!(
                kind.builtin_source(ShaderStage::Fragment)
                    .contains("fn fs_main")
            );
        }
    }

    #[test]
    fn test_prelude_declares_uniforms() {
        assert!(PRELUDE_SOURCE.contains("struct FrameUniforms"));
        assert!(PRELUDE_SOURCE.contains("struct ModelUniforms"));
        assert!(PRELUDE_SOURCE.contains("@group(0) @binding(0)"));
        assert!(PRELUDE_SOURCE.contains("@group(1) @binding(0)"));
        assert!(with_prelude("// body").ends_with("// body"));
    }

    #[test]
    fn test_planet_land_band_starts_at_ocean_height() {
        let body = ShaderKind::Planet.builtin_source(ShaderStage::Vertex);
        assert!(body.contains("mix(h.x, h.y, smoothstep(OCEAN_LEVEL, MOUNTAIN_LEVEL, n))"));
    }

    #[test]
    fn test_set_shader_dir() {
        let mut library = ShaderLibrary::new().with_shader_dir("shaders");
        assert_eq!(library.shader_dir(), Some(&PathBuf::from("shaders")));
        library.set_shader_dir(None);
        assert!(library.shader_dir().is_none());
    }

    #[test]
    fn test_read_stage_without_dir_errors() {
        let library = ShaderLibrary::new();
        assert!(matches!(
            library.read_stage_file("lambert.vert.wgsl"),
            Err(ShaderError::NoShaderDir)
        ));
    }

    #[test]
    fn test_read_stage_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        assert!(matches!(
            library.read_stage_file("planet.frag.wgsl"),
            Err(ShaderError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_read_stage_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("custom.vert.wgsl"), "// override").unwrap();
        let library = ShaderLibrary::new().with_shader_dir(dir.path());
        assert_eq!(library.read_stage_file("custom.vert.wgsl").unwrap(), "// override");
    }

    #[test]
    fn test_get_missing_module_errors() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(matches!(
            library.get("lambert.vert"),
            Err(ShaderError::NotLoaded { .. })
        ));
    }

    #[test]
    fn test_all_builtin_kinds_compile() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        for kind in ShaderKind::ALL {
            library.load_kind(&device, kind).unwrap();
        }
        assert_eq!(library.len(), 6);
        let a = library.get("planet.frag").unwrap();
        let b = library.get("planet.frag").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        library
            .load_stage(&device, ShaderKind::Lambert, ShaderStage::Vertex)
            .unwrap();
        let original = library.get("lambert.vert").unwrap();
        library
            .load_stage(&device, ShaderKind::Lambert, ShaderStage::Vertex)
            .unwrap();
        let reloaded = library.get("lambert.vert").unwrap();
        assert!(!Arc::ptr_eq(&original, &reloaded));
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_invalid_override_is_compile_error() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("lambert.frag.wgsl"),
            "@fragment fn fs_main( -> oops",
        )
        .unwrap();
        let mut library = ShaderLibrary::new().with_shader_dir(dir.path());

        let err = library.load_kind(&device, ShaderKind::Lambert).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { ref name, .. } if name == "lambert.frag"));
        assert!(library.get("lambert.frag").is_err());

        // The valid vertex stage still compiled and the device stays usable.
        assert!(library.get("lambert.vert").is_ok());
        library.set_shader_dir(None);
        library.load_kind(&device, ShaderKind::Lambert).unwrap();
    }
}
