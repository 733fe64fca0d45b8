//! wgpu rendering for Orbis: GPU context, mesh buffers, shader programs, camera, and the per-frame renderer.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod program;
pub mod renderer;
pub mod shader;

#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use buffer::{BufferAllocator, MeshBuffer, VertexPositionNormal};
pub use camera::{Camera, OrbitControls};
pub use depth::DepthBuffer;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder};
pub use program::{
    ATTR_NOR, ATTR_POS, FrameUniforms, ModelUniforms, ShaderProgram, UniformLayouts,
};
pub use renderer::{DEFAULT_CLEAR_COLOR, Drawable, FrameParams, Renderer};
pub use shader::{ShaderError, ShaderKind, ShaderLibrary, ShaderStage};
