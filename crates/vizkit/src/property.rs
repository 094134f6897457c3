//! Surface appearance of an actor.

use glam::{Vec3, Vec4};
use vizkit_render::ShaderProgram;

/// How an actor's geometry is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Representation {
    /// Every point as a dot.
    Points,
    /// Polygon edges and polylines.
    Wireframe,
    /// Filled polygons, polylines and vertices.
    #[default]
    Surface,
}

/// Color, lighting coefficients and representation of an actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Base color, used when the mapper does not color by scalars.
    pub color: Vec3,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Ambient lighting coefficient.
    pub ambient: f32,
    /// Diffuse lighting coefficient.
    pub diffuse: f32,
    /// Specular lighting coefficient.
    pub specular: f32,
    /// Specular exponent.
    pub specular_power: f32,
    /// Draw mode.
    pub representation: Representation,
    /// Point size in pixels. Points are always drawn one pixel wide; sphere
    /// programs use it as the radius when no radius attribute is mapped.
    pub point_size: f32,
    /// Program that draws vertex cells as ray-cast spheres.
    pub shader_program: Option<ShaderProgram>,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            opacity: 1.0,
            ambient: 0.0,
            diffuse: 1.0,
            specular: 0.0,
            specular_power: 1.0,
            representation: Representation::Surface,
            point_size: 1.0,
            shader_program: None,
        }
    }
}

impl Property {
    /// Sets the color.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.color = Vec3::new(r, g, b);
    }

    /// Color with opacity as alpha.
    #[must_use]
    pub fn rgba(&self) -> Vec4 {
        self.color.extend(self.opacity.clamp(0.0, 1.0))
    }

    /// Ambient, diffuse, specular and specular power packed for the shaders.
    #[must_use]
    pub fn lighting(&self) -> Vec4 {
        Vec4::new(self.ambient, self.diffuse, self.specular, self.specular_power)
    }
}
