//! Per-frame draw orchestration.

use glam::{Mat4, Vec3, Vec4};
use orbis_geometry::MeshData;

use crate::buffer::{BufferAllocator, MeshBuffer};
use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::gpu::{RenderContext, SurfaceError};
use crate::pass::{FrameEncoder, RenderPassBuilder};
use crate::program::{ModelUniforms, ShaderProgram};

/// Dark grey background.
pub const DEFAULT_CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

/// Values the frame uniforms are set from before each draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub color: Vec4,
    pub time: f32,
    pub chaos: f32,
    pub heights: Vec3,
    pub swap_colors: bool,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            time: 0.0,
            chaos: 1.0,
            heights: Vec3::ZERO,
            swap_colors: false,
        }
    }
}

/// A GPU mesh with its own model transform bound at group 1.
pub struct Drawable {
    pub label: String,
    pub mesh: MeshBuffer,
    model: Mat4,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl Drawable {
    pub fn from_mesh(
        device: &wgpu::Device,
        model_layout: &wgpu::BindGroupLayout,
        label: &str,
        mesh: &MeshData,
        model: Mat4,
    ) -> Self {
        let allocator = BufferAllocator::new(device);
        let mesh = allocator.create_mesh(label, mesh);
        let uniform_buffer = allocator.create_uniform_buffer(
            &format!("{label}-model-uniforms"),
            &ModelUniforms::from_model(model),
        );
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-model-bind-group")),
            layout: model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        Self {
            label: label.to_owned(),
            mesh,
            model,
            uniform_buffer,
            bind_group,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn set_model_matrix(&mut self, queue: &wgpu::Queue, model: Mat4) {
        self.model = model;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&ModelUniforms::from_model(model)),
        );
    }

    /// Replace the GPU buffers with freshly generated geometry. The old buffers are dropped.
    pub fn replace_mesh(&mut self, device: &wgpu::Device, mesh: &MeshData) {
        self.mesh = BufferAllocator::new(device).create_mesh(&self.label, mesh);
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(1, &self.bind_group, &[]);
        self.mesh.bind(render_pass);
        self.mesh.draw(render_pass);
    }
}

/// Clears the frame and draws every drawable with one program.
pub struct Renderer {
    depth: DepthBuffer,
    clear_color: wgpu::Color,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        Self {
            depth: DepthBuffer::new(device, width, height),
            clear_color: DEFAULT_CLEAR_COLOR,
        }
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> wgpu::Color {
        self.clear_color
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
    }

    /// Draw one frame and present it.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        camera: &Camera,
        program: &mut ShaderProgram,
        drawables: &[Drawable],
        params: &FrameParams,
    ) -> Result<(), SurfaceError> {
        let surface_texture = ctx.get_current_texture()?;

        stage_frame_uniforms(program, camera, params);
        program.upload(&ctx.queue);

        let mut frame = FrameEncoder::new(&ctx.device, &ctx.queue, surface_texture);
        {
            let builder = RenderPassBuilder::new()
                .clear_color(self.clear_color)
                .label("scene-pass");
            let mut pass = frame.begin_render_pass(&builder, Some(&self.depth.view));
            program.bind(&mut pass);
            for drawable in drawables {
                drawable.draw(&mut pass);
            }
        }
        frame.submit();

        Ok(())
    }
}

fn stage_frame_uniforms(program: &mut ShaderProgram, camera: &Camera, params: &FrameParams) {
    program.set_view_proj(camera.view_projection_matrix());
    program.set_geometry_color(params.color);
    program.set_time(params.time);
    program.set_chaos(params.chaos);
    program.set_heights(params.heights);
    program.set_swap_colors(params.swap_colors);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::UniformLayouts;
    use crate::shader::{ShaderKind, ShaderLibrary};
    use crate::test_util::create_test_device;

    #[test]
    fn test_frame_params_default() {
        let params = FrameParams::default();
        assert_eq!(params.color, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(params.chaos, 1.0);
        assert!(!params.swap_colors);
    }

    #[test]
    fn test_stage_frame_uniforms_copies_params() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let layouts = UniformLayouts::new(&device);
        let mut library = ShaderLibrary::new();
        let (vs, fs) = library.load_kind(&device, ShaderKind::Lambert).unwrap();
        let mut program = ShaderProgram::new(
            &device,
            &layouts,
            ShaderKind::Lambert,
            &vs,
            &fs,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            None,
        )
        .unwrap();

        let camera = Camera::default();
        let params = FrameParams {
            color: Vec4::new(0.5, 0.25, 1.0, 1.0),
            time: 2.0,
            chaos: 4.0,
            heights: Vec3::new(0.1, 0.2, 0.3),
            swap_colors: true,
        };
        stage_frame_uniforms(&mut program, &camera, &params);

        let u = program.uniforms();
        assert_eq!(
            u.view_proj,
            camera.view_projection_matrix().to_cols_array_2d()
        );
        assert_eq!(u.color, [0.5, 0.25, 1.0, 1.0]);
        assert_eq!(u.time, 2.0);
        assert_eq!(u.chaos, 4.0);
        assert_eq!(u.heights, [0.1, 0.2, 0.3, 0.0]);
        assert_eq!(u.swap_colors, 1);
    }

    #[test]
    fn test_drawable_replace_mesh() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let layouts = UniformLayouts::new(&device);
        let mesh = orbis_geometry::icosphere(Vec3::ZERO, 1.0, 0).unwrap();
        let mut drawable =
            Drawable::from_mesh(&device, &layouts.model, "sphere", &mesh, Mat4::IDENTITY);
        assert_eq!(drawable.mesh.vertex_count, 12);
        assert_eq!(drawable.mesh.index_count, 60);

        let finer = orbis_geometry::icosphere(Vec3::ZERO, 1.0, 2).unwrap();
        drawable.replace_mesh(&device, &finer);
        assert_eq!(drawable.mesh.vertex_count, 162);
        assert_eq!(drawable.mesh.index_count, 320 * 3);

        let moved = Mat4::from_translation(Vec3::X);
        drawable.set_model_matrix(&queue, moved);
        assert_eq!(drawable.model_matrix(), moved);
    }

    #[test]
    fn test_renderer_resize_and_clear_color() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut renderer = Renderer::new(&device, 640, 480);
        assert_eq!(renderer.clear_color(), DEFAULT_CLEAR_COLOR);
        renderer.set_clear_color(wgpu::Color::WHITE);
        assert_eq!(renderer.clear_color(), wgpu::Color::WHITE);

        renderer.resize(&device, 1024, 0);
        assert_eq!(renderer.depth.width(), 1024);
        assert_eq!(renderer.depth.height(), 1);
    }
}
