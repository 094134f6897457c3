//! Procedural geometry sources.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::poly_data::PolyData;

/// A triangulated UV sphere with outward point normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSource {
    /// Sphere center.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
    /// Number of points around the equator (at least 3).
    pub theta_resolution: u32,
    /// Number of latitude bands from pole to pole (at least 3).
    pub phi_resolution: u32,
}

impl Default for SphereSource {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            radius: 0.5,
            theta_resolution: 8,
            phi_resolution: 8,
        }
    }
}

impl SphereSource {
    /// Creates a sphere with the default resolution.
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius,
            ..Self::default()
        }
    }

    /// Generates the sphere.
    #[must_use]
    pub fn output(&self) -> PolyData {
        let n_theta = self.theta_resolution.max(3);
        let n_phi = self.phi_resolution.max(3);

        let mut normals = vec![Vec3::Z, Vec3::NEG_Z];
        for ring in 1..n_phi {
            let phi = PI * ring as f32 / n_phi as f32;
            for seg in 0..n_theta {
                let theta = TAU * seg as f32 / n_theta as f32;
                normals.push(Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                ));
            }
        }

        let ring_start = |ring: u32| 2 + (ring - 1) * n_theta;
        let mut polys = Vec::new();
        for seg in 0..n_theta {
            let next = (seg + 1) % n_theta;
            // North cap
            polys.push(vec![0, ring_start(1) + seg, ring_start(1) + next]);
            // South cap
            let last = ring_start(n_phi - 1);
            polys.push(vec![1, last + next, last + seg]);
        }
        for ring in 1..n_phi - 1 {
            let (a, b) = (ring_start(ring), ring_start(ring + 1));
            for seg in 0..n_theta {
                let next = (seg + 1) % n_theta;
                polys.push(vec![a + seg, b + seg, b + next]);
                polys.push(vec![a + seg, b + next, a + next]);
            }
        }

        let points = normals
            .iter()
            .map(|n| self.center + *n * self.radius)
            .collect();
        let mut out = PolyData::from_polygons(points, polys);
        out.point_data.normals = Some(normals);
        out
    }
}

/// A cone with its apex along `direction`, optionally capped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeSource {
    /// Center of the cone's axis segment.
    pub center: Vec3,
    /// Axis direction, from base toward apex.
    pub direction: Vec3,
    /// Distance from base to apex.
    pub height: f32,
    /// Base radius.
    pub radius: f32,
    /// Number of sides.
    pub resolution: u32,
    /// Whether the base polygon is emitted.
    pub capping: bool,
}

impl Default for ConeSource {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            direction: Vec3::X,
            height: 1.0,
            radius: 0.5,
            resolution: 6,
            capping: true,
        }
    }
}

impl ConeSource {
    /// Generates the cone.
    #[must_use]
    pub fn output(&self) -> PolyData {
        let n = self.resolution.max(3);
        let axis = self.direction.normalize_or(Vec3::X);
        let (u, v) = axis.any_orthonormal_pair();

        let mut points = vec![self.center + axis * (self.height * 0.5)];
        let base = self.center - axis * (self.height * 0.5);
        for i in 0..n {
            let a = TAU * i as f32 / n as f32;
            points.push(base + (u * a.cos() + v * a.sin()) * self.radius);
        }

        let mut polys: Vec<Vec<u32>> = (0..n).map(|i| vec![0, 1 + i, 1 + (i + 1) % n]).collect();
        if self.capping {
            polys.push((1..=n).rev().collect());
        }
        PolyData::from_polygons(points, polys)
    }
}

/// A rectangular grid of quads spanned by `origin`, `point1` and `point2`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSource {
    /// First corner.
    pub origin: Vec3,
    /// Corner along the first axis.
    pub point1: Vec3,
    /// Corner along the second axis.
    pub point2: Vec3,
    /// Subdivisions along the first axis.
    pub x_resolution: u32,
    /// Subdivisions along the second axis.
    pub y_resolution: u32,
}

impl Default for PlaneSource {
    fn default() -> Self {
        Self {
            origin: Vec3::new(-0.5, -0.5, 0.0),
            point1: Vec3::new(0.5, -0.5, 0.0),
            point2: Vec3::new(-0.5, 0.5, 0.0),
            x_resolution: 1,
            y_resolution: 1,
        }
    }
}

impl PlaneSource {
    /// Unit normal of the plane (zero for a degenerate plane).
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        (self.point1 - self.origin)
            .cross(self.point2 - self.origin)
            .normalize_or_zero()
    }

    /// Center of the plane.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.origin + ((self.point1 - self.origin) + (self.point2 - self.origin)) * 0.5
    }

    /// Generates the grid: `(x_res + 1) * (y_res + 1)` points, x fastest.
    #[must_use]
    pub fn output(&self) -> PolyData {
        let (nx, ny) = (self.x_resolution.max(1), self.y_resolution.max(1));
        let (ax, ay) = (self.point1 - self.origin, self.point2 - self.origin);

        let mut points = Vec::with_capacity(((nx + 1) * (ny + 1)) as usize);
        for j in 0..=ny {
            for i in 0..=nx {
                points.push(
                    self.origin + ax * (i as f32 / nx as f32) + ay * (j as f32 / ny as f32),
                );
            }
        }
        let mut polys = Vec::with_capacity((nx * ny) as usize);
        for j in 0..ny {
            for i in 0..nx {
                let p = j * (nx + 1) + i;
                polys.push(vec![p, p + 1, p + nx + 2, p + nx + 1]);
            }
        }
        let n = points.len();
        let mut out = PolyData::from_polygons(points, polys);
        out.point_data.normals = Some(vec![self.normal(); n]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_points_on_surface() {
        let s = SphereSource::new(Vec3::new(1.0, 2.0, 3.0), 2.0).output();
        assert_eq!(s.num_points(), 2 + 7 * 8);
        for p in &s.points {
            assert!(((*p - Vec3::new(1.0, 2.0, 3.0)).length() - 2.0).abs() < 1e-5);
        }
        let normals = s.point_data.normals.as_ref().unwrap();
        assert_eq!(normals.len(), s.num_points());
    }

    #[test]
    fn test_sphere_is_closed() {
        // Each edge of a closed triangle mesh is shared by exactly two faces.
        let s = SphereSource::default().output();
        let mut counts = std::collections::HashMap::new();
        for t in s.triangles() {
            for k in 0..3 {
                let (a, b) = (t[k], t[(k + 1) % 3]);
                *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(counts.values().all(|&c| c == 2));
    }

    #[test]
    fn test_sphere_faces_point_outward() {
        let s = SphereSource::default().output();
        for [a, b, c] in s.triangles() {
            let (pa, pb, pc) = (s.points[a as usize], s.points[b as usize], s.points[c as usize]);
            let n = (pb - pa).cross(pc - pa);
            assert!(n.dot((pa + pb + pc) / 3.0) > 0.0);
        }
    }

    #[test]
    fn test_cone_apex_and_cap() {
        let cone = ConeSource {
            resolution: 64,
            ..ConeSource::default()
        }
        .output();
        assert_eq!(cone.num_points(), 65);
        assert_eq!(cone.points[0], Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(cone.polys.len(), 65);
        assert_eq!(cone.polys.last().map(Vec::len), Some(64));
        for p in &cone.points[1..] {
            assert!((p.x + 0.5).abs() < 1e-6);
            assert!((p.y.hypot(p.z) - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_plane_grid_counts() {
        let plane = PlaneSource {
            x_resolution: 16,
            y_resolution: 16,
            ..PlaneSource::default()
        };
        let out = plane.output();
        assert_eq!(out.num_points(), 17 * 17);
        assert_eq!(out.polys.len(), 256);
        assert_eq!(plane.normal(), Vec3::Z);
        assert_eq!(plane.center(), Vec3::ZERO);
    }
}
