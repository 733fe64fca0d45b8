//! The hardcoded scene and the compiled shader programs that draw it.

use glam::{Mat4, Vec3};
use orbis_geometry::{GeometryError, Primitive};
use orbis_render::{
    Drawable, ShaderError, ShaderKind, ShaderLibrary, ShaderProgram, UniformLayouts,
};
use tracing::info;

pub const CUBE_OFFSET: Vec3 = Vec3::new(2.5, 0.0, 0.0);
pub const SQUARE_OFFSET: Vec3 = Vec3::new(-2.5, 0.0, 0.0);

/// Primitives and model transforms in draw order. The icosphere is always first.
pub fn scene_primitives(
    tessellations: u32,
    show_cube: bool,
    show_square: bool,
) -> Vec<(Primitive, Mat4)> {
    let mut primitives = vec![(
        Primitive::Icosphere {
            subdivisions: tessellations,
        },
        Mat4::IDENTITY,
    )];
    if show_cube {
        primitives.push((Primitive::Cube, Mat4::from_translation(CUBE_OFFSET)));
    }
    if show_square {
        primitives.push((Primitive::Square, Mat4::from_translation(SQUARE_OFFSET)));
    }
    primitives
}

/// Whether the icosphere has to be regenerated this frame.
pub fn sphere_needs_rebuild(built: u32, requested: u32, load_requested: bool) -> bool {
    load_requested || built != requested
}

pub struct Scene {
    drawables: Vec<Drawable>,
    sphere_subdivisions: u32,
}

impl Scene {
    pub fn build(
        device: &wgpu::Device,
        layouts: &UniformLayouts,
        tessellations: u32,
        show_cube: bool,
        show_square: bool,
    ) -> Result<Self, GeometryError> {
        let drawables = scene_primitives(tessellations, show_cube, show_square)
            .into_iter()
            .map(|(primitive, model)| {
                let mesh = primitive.generate(Vec3::ZERO)?;
                Ok(Drawable::from_mesh(
                    device,
                    &layouts.model,
                    primitive.label(),
                    &mesh,
                    model,
                ))
            })
            .collect::<Result<Vec<_>, GeometryError>>()?;

        info!("Built scene with {} drawables", drawables.len());

        Ok(Self {
            drawables,
            sphere_subdivisions: tessellations,
        })
    }

    /// Regenerate the icosphere at `tessellations` and replace its GPU buffers.
    pub fn rebuild_sphere(
        &mut self,
        device: &wgpu::Device,
        tessellations: u32,
    ) -> Result<(), GeometryError> {
        let mesh = Primitive::Icosphere {
            subdivisions: tessellations,
        }
        .generate(Vec3::ZERO)?;
        if let Some(sphere) = self.drawables.first_mut() {
            sphere.replace_mesh(device, &mesh);
        }
        self.sphere_subdivisions = tessellations;
        info!(
            "Icosphere rebuilt at level {} ({} triangles)",
            tessellations,
            mesh.triangle_count()
        );
        Ok(())
    }

    pub fn sphere_subdivisions(&self) -> u32 {
        self.sphere_subdivisions
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }
}

/// One linked [`ShaderProgram`] per [`ShaderKind`].
pub struct ProgramSet {
    lambert: ShaderProgram,
    custom: ShaderProgram,
    planet: ShaderProgram,
}

impl ProgramSet {
    /// Compile and link every kind. Fails on the first stage that cannot be loaded.
    pub fn build(
        device: &wgpu::Device,
        library: &mut ShaderLibrary,
        layouts: &UniformLayouts,
        surface_format: wgpu::TextureFormat,
        cull_mode: Option<wgpu::Face>,
    ) -> Result<Self, ShaderError> {
        let mut link = |kind| {
            ShaderProgram::from_library(device, library, layouts, kind, surface_format, cull_mode)
        };
        Ok(Self {
            lambert: link(ShaderKind::Lambert)?,
            custom: link(ShaderKind::Custom)?,
            planet: link(ShaderKind::Planet)?,
        })
    }

    pub fn get_mut(&mut self, kind: ShaderKind) -> &mut ShaderProgram {
        match kind {
            ShaderKind::Lambert => &mut self.lambert,
            ShaderKind::Custom => &mut self.custom,
            ShaderKind::Planet => &mut self.planet,
        }
    }
}
