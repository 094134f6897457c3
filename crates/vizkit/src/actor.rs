//! Actors: a mapper plus appearance and placement.

use glam::{Mat4, Vec3};
use vizkit_core::{Bounds, PolyData};
use vizkit_render::{MeshGeometry, SphereGeometry};

use crate::mapper::{next_generation, PolyDataMapper};
use crate::property::{Property, Representation};

/// Shader vertex attribute holding per-sphere radii.
pub const RADIUS_ATTRIBUTE: &str = "radiusAttrib";

/// A renderable object in a scene.
///
/// Every mutable accessor stamps the actor from a process-wide clock; the
/// window rebuilds the object's GPU copy when the stamp changes.
#[derive(Debug, Clone)]
pub struct Actor {
    mapper: PolyDataMapper,
    property: Property,
    position: Vec3,
    scale: Vec3,
    visible: bool,
    modified: u64,
}

impl Default for Actor {
    fn default() -> Self {
        Self::new(PolyDataMapper::default())
    }
}

impl Actor {
    /// Creates a visible actor at the origin.
    #[must_use]
    pub fn new(mapper: PolyDataMapper) -> Self {
        Self {
            mapper,
            property: Property::default(),
            position: Vec3::ZERO,
            scale: Vec3::ONE,
            visible: true,
            modified: 0,
        }
    }

    /// Shorthand for an actor of `data` with a default mapper.
    #[must_use]
    pub fn from_poly_data(data: PolyData) -> Self {
        Self::new(PolyDataMapper::new(data))
    }

    /// The mapper.
    #[must_use]
    pub fn mapper(&self) -> &PolyDataMapper {
        &self.mapper
    }

    /// Replaces the mapper.
    pub fn set_mapper(&mut self, mapper: PolyDataMapper) {
        self.mapper = mapper;
        self.modified = next_generation();
    }

    /// Mutable access to the mapper.
    pub fn mapper_mut(&mut self) -> &mut PolyDataMapper {
        self.modified = next_generation();
        &mut self.mapper
    }

    /// The surface property.
    #[must_use]
    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Mutable access to the surface property.
    pub fn property_mut(&mut self) -> &mut Property {
        self.modified = next_generation();
        &mut self.property
    }

    /// Translation applied to the data.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Sets the translation.
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
        self.modified = next_generation();
    }

    /// Per-axis scale applied to the data before translation.
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Sets a uniform scale.
    pub fn set_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
        self.modified = next_generation();
    }

    /// Whether the actor is drawn.
    #[must_use]
    pub fn visibility(&self) -> bool {
        self.visible
    }

    /// Shows or hides the actor.
    pub fn set_visibility(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.modified = next_generation();
        }
    }

    /// Model matrix: scale, then translate.
    #[must_use]
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, glam::Quat::IDENTITY, self.position)
    }

    /// World-space bounds of the transformed data.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        let local = self.mapper.input().bounds();
        if local.is_empty() {
            return local;
        }
        let model = self.model_matrix();
        Bounds::from_points(&local.corners().map(|c| model.transform_point3(c)))
    }

    /// Stamp of the latest change to the actor or its mapper.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.modified.max(self.mapper.generation())
    }

    fn draws_spheres(&self) -> bool {
        self.property.shader_program.is_some()
            && self.property.representation == Representation::Surface
    }

    /// Meshes to draw for the current representation, skipping empty ones.
    #[must_use]
    pub fn mesh_geometries(&self) -> Vec<MeshGeometry> {
        let data = self.mapper.input();
        let mut out = match self.property.representation {
            Representation::Surface => {
                let mut v = vec![MeshGeometry::triangles(data), MeshGeometry::lines(data, false)];
                if !self.draws_spheres() {
                    v.push(MeshGeometry::points(data, false));
                }
                v
            }
            Representation::Wireframe => vec![
                MeshGeometry::lines(data, true),
                MeshGeometry::points(data, false),
            ],
            Representation::Points => vec![MeshGeometry::points(data, true)],
        };
        out.retain(|g| !g.is_empty());
        let colors = self.mapper.point_colors();
        out.into_iter()
            .map(|g| g.with_colors(colors.clone()))
            .collect()
    }

    /// Spheres to draw when a sphere program is set: one per vertex cell
    /// (or per point when there are no vertex cells).
    #[must_use]
    pub fn sphere_geometry(&self) -> Option<SphereGeometry> {
        if !self.draws_spheres() {
            return None;
        }
        let data = self.mapper.input();
        let ids: Vec<usize> = if data.verts.is_empty() {
            (0..data.num_points()).collect()
        } else {
            data.verts
                .iter()
                .map(|&v| v as usize)
                .filter(|&v| v < data.num_points())
                .collect()
        };
        let radii = self.mapper.vertex_attribute(RADIUS_ATTRIBUTE);
        let colors = self
            .mapper
            .point_colors()
            .filter(|c| c.len() == data.num_points());
        Some(SphereGeometry {
            centers: ids.iter().map(|&i| data.points[i]).collect(),
            radii: ids
                .iter()
                .map(|&i| {
                    radii
                        .and_then(|r| r.get(i).copied())
                        .unwrap_or(self.property.point_size)
                })
                .collect(),
            colors: colors.map(|c| ids.iter().map(|&i| c[i]).collect()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizkit_core::{ConeSource, SphereSource};
    use vizkit_render::{Primitive, ShaderProgram};

    #[test]
    fn test_modification_counter() {
        let mut actor = Actor::from_poly_data(SphereSource::default().output());
        let g0 = actor.generation();
        actor.property_mut().set_color(1.0, 0.0, 0.0);
        let g1 = actor.generation();
        assert!(g1 > g0);
        actor.set_visibility(true);
        assert_eq!(actor.generation(), g1);
        actor.mapper_mut().set_scalar_visibility(false);
        assert!(actor.generation() > g1);
    }

    #[test]
    fn test_replacing_mapper_changes_generation() {
        let mut tuned = PolyDataMapper::new(SphereSource::default().output());
        tuned.set_scalar_range(0.0, 1.0);
        tuned.set_scalar_visibility(true);
        let mut actor = Actor::new(tuned);
        let fresh = PolyDataMapper::new(ConeSource::default().output());

        let before = actor.generation();
        *actor.mapper_mut() = fresh.clone();
        let after = actor.generation();
        assert_ne!(before, after);

        actor.set_mapper(fresh);
        assert!(actor.generation() > after);
    }

    #[test]
    fn test_bounds_follow_transform() {
        let mut actor = Actor::from_poly_data(SphereSource::new(Vec3::ZERO, 1.0).output());
        actor.set_scale(10.0);
        actor.set_position(5.0, -1.0, 0.0);
        let b = actor.bounds();
        assert!((b.center() - Vec3::new(5.0, -1.0, 0.0)).length() < 1e-3);
        assert!((b.extent().x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_representations() {
        let mut actor = Actor::from_poly_data(SphereSource::default().output());
        let surface = actor.mesh_geometries();
        assert_eq!(surface.len(), 1);
        assert_eq!(surface[0].primitive, Primitive::Triangles);

        actor.property_mut().representation = Representation::Wireframe;
        let wire = actor.mesh_geometries();
        assert_eq!(wire.len(), 1);
        assert_eq!(wire[0].primitive, Primitive::Lines);

        actor.property_mut().representation = Representation::Points;
        let points = actor.mesh_geometries();
        assert_eq!(points[0].indices.len(), actor.mapper().input().num_points());
    }

    #[test]
    fn test_sphere_geometry_uses_radius_attribute() {
        let mut pd = PolyData::new();
        pd.points = vec![Vec3::ZERO, Vec3::X];
        pd.verts = vec![0, 1];
        pd.add_array("radii", vec![2.0, 3.0]).unwrap();
        let mut actor = Actor::from_poly_data(pd);
        assert!(actor.sphere_geometry().is_none());

        actor.property_mut().shader_program = Some(ShaderProgram::builtin_sphere());
        actor
            .mapper_mut()
            .map_data_array_to_vertex_attribute(RADIUS_ATTRIBUTE, "radii");
        let spheres = actor.sphere_geometry().unwrap();
        assert_eq!(spheres.radii, vec![2.0, 3.0]);
        // Vertex cells become spheres, not points.
        assert!(actor.mesh_geometries().is_empty());
    }
}
