//! Geometry generation errors.

/// Errors produced while generating procedural meshes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    /// The requested icosphere subdivision level exceeds the supported maximum.
    #[error("tessellation level {requested} out of range (max {max})")]
    TessellationOutOfRange { requested: u32, max: u32 },
}
