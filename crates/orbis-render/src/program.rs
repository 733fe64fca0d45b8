//! Linked shader programs and their uniform binding points.
//!
//! A [`ShaderProgram`] pairs a vertex and a fragment module into one render
//! pipeline. Binding points are fixed across programs:
//!
//! | binding          | contents                                             |
//! |------------------|------------------------------------------------------|
//! | `@location(0)`   | `pos` ([`ATTR_POS`])                                 |
//! | `@location(1)`   | `nor` ([`ATTR_NOR`])                                 |
//! | group 0, slot 0  | [`FrameUniforms`]: view-proj, color, heights, time, chaos, swap |
//! | group 1, slot 0  | [`ModelUniforms`]: model and inverse-transpose model  |

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::buffer::{BufferAllocator, VertexPositionNormal};
use crate::depth::DepthBuffer;
use crate::shader::{ShaderError, ShaderKind, ShaderLibrary, validated};

/// Vertex attribute location of the homogeneous position.
pub const ATTR_POS: u32 = 0;
/// Vertex attribute location of the homogeneous normal.
pub const ATTR_NOR: u32 = 1;

/// Per-frame uniforms shared by every drawable.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Ocean, land and mountain displacement in `xyz`; `w` unused.
    pub heights: [f32; 4],
    pub time: f32,
    pub chaos: f32,
    /// Non-zero swaps the planet's water and land palettes.
    pub swap_colors: u32,
    pub _padding: u32,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            color: [1.0, 0.0, 0.0, 1.0],
            heights: [0.0; 4],
            time: 0.0,
            chaos: 1.0,
            swap_colors: 0,
            _padding: 0,
        }
    }
}

/// Per-drawable model transform.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelUniforms {
    pub model: [[f32; 4]; 4],
    pub model_inv_tr: [[f32; 4]; 4],
}

impl ModelUniforms {
    pub fn from_model(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            model_inv_tr: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

/// Bind group layouts shared by all programs so drawables bind to any of them.
pub struct UniformLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
}

impl UniformLayouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-uniforms-bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                std::mem::size_of::<FrameUniforms>(),
            )],
        });

        let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model-uniforms-bgl"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX,
                std::mem::size_of::<ModelUniforms>(),
            )],
        });

        Self { frame, model }
    }
}

fn uniform_entry(visibility: wgpu::ShaderStages, size: usize) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(size as u64),
        },
        count: None,
    }
}

/// A vertex + fragment module pair linked into a render pipeline, with staged frame uniforms.
pub struct ShaderProgram {
    pub kind: ShaderKind,
    pub pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    uniforms: FrameUniforms,
}

impl ShaderProgram {
    /// Link `vertex` (`vs_main`) and `fragment` (`fs_main`) into a pipeline.
    ///
    /// Stage interfaces that do not match the shared layouts fail with
    /// [`ShaderError::Compile`].
    pub fn new(
        device: &wgpu::Device,
        layouts: &UniformLayouts,
        kind: ShaderKind,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        cull_mode: Option<wgpu::Face>,
    ) -> Result<Self, ShaderError> {
        let label = format!("{}-pipeline", kind.name());

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label}-layout")),
            bind_group_layouts: &[&layouts.frame, &layouts.model],
            immediate_size: 0,
        });

        let pipeline = validated(device, &label, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: vertex,
                    entry_point: Some("vs_main"),
                    buffers: &[VertexPositionNormal::layout()],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode,
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: Some(DepthBuffer::stencil_state()),
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                fragment: Some(wgpu::FragmentState {
                    module: fragment,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: surface_format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
        })?;

        let uniforms = FrameUniforms::default();
        let frame_buffer = BufferAllocator::new(device)
            .create_uniform_buffer(&format!("{}-frame-uniforms", kind.name()), &uniforms);
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-frame-bind-group", kind.name())),
            layout: &layouts.frame,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        log::info!("Linked shader program '{}'", kind.name());

        Ok(Self {
            kind,
            pipeline,
            frame_buffer,
            frame_bind_group,
            uniforms,
        })
    }

    /// Load both stages of `kind` from `library` and link them.
    pub fn from_library(
        device: &wgpu::Device,
        library: &mut ShaderLibrary,
        layouts: &UniformLayouts,
        kind: ShaderKind,
        surface_format: wgpu::TextureFormat,
        cull_mode: Option<wgpu::Face>,
    ) -> Result<Self, ShaderError> {
        let (vertex, fragment) = library.load_kind(device, kind)?;
        Self::new(
            device,
            layouts,
            kind,
            &vertex,
            &fragment,
            surface_format,
            cull_mode,
        )
    }

    pub fn set_view_proj(&mut self, view_proj: Mat4) {
        self.uniforms.view_proj = view_proj.to_cols_array_2d();
    }

    pub fn set_geometry_color(&mut self, color: Vec4) {
        self.uniforms.color = color.to_array();
    }

    pub fn set_time(&mut self, time: f32) {
        self.uniforms.time = time;
    }

    pub fn set_chaos(&mut self, chaos: f32) {
        self.uniforms.chaos = chaos;
    }

    pub fn set_heights(&mut self, heights: Vec3) {
        self.uniforms.heights = heights.extend(0.0).to_array();
    }

    pub fn set_swap_colors(&mut self, swap: bool) {
        self.uniforms.swap_colors = u32::from(swap);
    }

    /// Currently staged frame uniforms.
    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// Write the staged frame uniforms to the GPU.
    pub fn upload(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.uniforms));
    }

    /// Bind the pipeline and frame uniforms (group 0).
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::create_test_device;

    #[test]
    fn test_uniform_sizes_match_wgsl_layout() {
        // mat4 + 2 * vec4 + 4 scalars
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 112);
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        // two mat4
        assert_eq!(std::mem::size_of::<ModelUniforms>(), 128);
    }

    #[test]
    fn test_model_uniforms_inverse_transpose() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniforms = ModelUniforms::from_model(model);
        assert_eq!(uniforms.model, model.to_cols_array_2d());
        let inv_tr = Mat4::from_cols_array_2d(&uniforms.model_inv_tr);
        assert!((inv_tr.x_axis.x - 0.5).abs() < 1e-6);
        assert!((inv_tr.y_axis.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_identity_model_is_its_own_inverse_transpose() {
        let uniforms = ModelUniforms::from_model(Mat4::IDENTITY);
        assert_eq!(uniforms.model, uniforms.model_inv_tr);
    }

    #[test]
    fn test_frame_uniform_defaults() {
        let u = FrameUniforms::default();
        assert_eq!(u.view_proj, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(u.chaos, 1.0);
        assert_eq!(u.swap_colors, 0);
    }

    #[test]
    fn test_program_setters_stage_uniforms() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let layouts = UniformLayouts::new(&device);
        let mut library = ShaderLibrary::new();
        let (vs, fs) = library.load_kind(&device, ShaderKind::Planet).unwrap();
        let mut program = ShaderProgram::new(
            &device,
            &layouts,
            ShaderKind::Planet,
            &vs,
            &fs,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            Some(wgpu::Face::Back),
        )
        .unwrap();

        program.set_geometry_color(Vec4::new(0.0, 1.0, 0.0, 1.0));
        program.set_time(3.5);
        program.set_chaos(2.0);
        program.set_heights(Vec3::new(-0.1, 0.05, 0.2));
        program.set_swap_colors(true);
        program.upload(&queue);

        let u = program.uniforms();
        assert_eq!(u.color, [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(u.time, 3.5);
        assert_eq!(u.chaos, 2.0);
        assert_eq!(u.heights, [-0.1, 0.05, 0.2, 0.0]);
        assert_eq!(u.swap_colors, 1);
    }

    #[test]
    fn test_all_programs_link() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let layouts = UniformLayouts::new(&device);
        let mut library = ShaderLibrary::new();
        for kind in ShaderKind::ALL {
            let program = ShaderProgram::from_library(
                &device,
                &mut library,
                &layouts,
                kind,
                wgpu::TextureFormat::Rgba8UnormSrgb,
                None,
            )
            .unwrap();
            assert_eq!(program.kind, kind);
        }
        assert_eq!(library.len(), 6);
    }

    #[test]
    fn test_mismatched_stage_interface_is_compile_error() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let layouts = UniformLayouts::new(&device);
        let mut library = ShaderLibrary::new();
        let (vs, _) = library.load_kind(&device, ShaderKind::Lambert).unwrap();
        // Reads a uniform at group 2, which the shared pipeline layout does not have.
        let fs = library
            .load_from_source(
                &device,
                "stray.frag",
                "@group(2) @binding(0) var<uniform> stray: vec4<f32>;\n\
                 @fragment fn fs_main() -> @location(0) vec4<f32> { return stray; }",
            )
            .unwrap();

        let err = ShaderProgram::new(
            &device,
            &layouts,
            ShaderKind::Lambert,
            &vs,
            &fs,
            wgpu::TextureFormat::Bgra8UnormSrgb,
            None,
        )
        .err()
        .unwrap();
        assert!(matches!(err, ShaderError::Compile { ref name, .. } if name == "lambert-pipeline"));
    }
}
