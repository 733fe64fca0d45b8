//! Render pass and per-frame command encoding helpers.
//!
//! [`RenderPassBuilder`] describes how the color and depth attachments are
//! cleared; [`FrameEncoder`] owns one frame's command encoder and surface
//! texture until [`FrameEncoder::submit`] presents it.

use crate::depth::DepthBuffer;

/// Builder for the scene render pass.
#[derive(Debug, Clone)]
pub struct RenderPassBuilder {
    clear_color: wgpu::Color,
    depth_clear: f32,
    label: Option<&'static str>,
}

impl Default for RenderPassBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderPassBuilder {
    /// Black clear color, reverse-Z depth clear.
    pub fn new() -> Self {
        Self {
            clear_color: wgpu::Color::BLACK,
            depth_clear: DepthBuffer::CLEAR_VALUE,
            label: None,
        }
    }

    pub fn clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn depth_clear(mut self, value: f32) -> Self {
        self.depth_clear = value;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    fn begin<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: Option<&wgpu::TextureView>,
    ) -> wgpu::RenderPass<'e> {
        let color_attachment = wgpu::RenderPassColorAttachment {
            view: color_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(self.clear_color),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        };

        let depth_stencil_attachment =
            depth_view.map(|view| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.depth_clear),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label,
            color_attachments: &[Some(color_attachment)],
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}

/// One frame's command encoder and acquired surface texture.
pub struct FrameEncoder<'q> {
    encoder: wgpu::CommandEncoder,
    queue: &'q wgpu::Queue,
    surface_texture: wgpu::SurfaceTexture,
    surface_view: wgpu::TextureView,
}

impl<'q> FrameEncoder<'q> {
    pub fn new(
        device: &wgpu::Device,
        queue: &'q wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
    ) -> Self {
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame-encoder"),
        });
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            encoder,
            queue,
            surface_texture,
            surface_view,
        }
    }

    /// Begin a render pass onto the surface texture.
    pub fn begin_render_pass(
        &mut self,
        builder: &RenderPassBuilder,
        depth_view: Option<&wgpu::TextureView>,
    ) -> wgpu::RenderPass<'_> {
        builder.begin(&mut self.encoder, &self.surface_view, depth_view)
    }

    /// Submit the recorded commands and present the surface texture.
    pub fn submit(self) {
        self.queue.submit([self.encoder.finish()]);
        self.surface_texture.present();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = RenderPassBuilder::new();
        assert_eq!(builder.clear_color, wgpu::Color::BLACK);
        assert_eq!(builder.depth_clear, DepthBuffer::CLEAR_VALUE);
        assert!(builder.label.is_none());
    }

    #[test]
    fn test_builder_sets_fields() {
        let builder = RenderPassBuilder::new()
            .clear_color(wgpu::Color::RED)
            .depth_clear(1.0)
            .label("scene-pass");
        assert_eq!(builder.clear_color.r, 1.0);
        assert_eq!(builder.clear_color.g, 0.0);
        assert_eq!(builder.depth_clear, 1.0);
        assert_eq!(builder.label, Some("scene-pass"));
    }
}
