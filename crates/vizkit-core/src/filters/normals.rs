//! Point normal generation for polygonal meshes.

use glam::Vec3;

use crate::poly_data::PolyData;

/// Computes area-weighted point normals from the polygon cells.
///
/// Points that belong to no polygon get a zero normal. Cell normals are not
/// produced; the output keeps every input cell and attribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolyDataNormals {
    /// Reverse the computed normals.
    pub flip: bool,
}

impl PolyDataNormals {
    /// Runs the filter.
    #[must_use]
    pub fn execute(&self, input: &PolyData) -> PolyData {
        let mut normals = vec![Vec3::ZERO; input.num_points()];
        for [a, b, c] in input.triangles() {
            let (pa, pb, pc) = (
                input.points[a as usize],
                input.points[b as usize],
                input.points[c as usize],
            );
            // Unnormalized: length is twice the triangle area.
            let n = (pb - pa).cross(pc - pa);
            for i in [a, b, c] {
                normals[i as usize] += n;
            }
        }
        let sign = if self.flip { -1.0 } else { 1.0 };
        for n in &mut normals {
            *n = n.normalize_or_zero() * sign;
        }

        let mut out = input.clone();
        out.point_data.normals = Some(normals);
        log::debug!("computed {} point normals", out.num_points());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::SphereSource;

    #[test]
    fn test_sphere_normals_point_outward() {
        let mut sphere = SphereSource::default().output();
        sphere.point_data.normals = None;
        let out = PolyDataNormals::default().execute(&sphere);
        let normals = out.point_data.normals.unwrap();
        for (p, n) in out.points.iter().zip(&normals) {
            assert!(p.normalize().dot(*n) > 0.9);
        }
    }

    #[test]
    fn test_flat_quad_and_flip() {
        let quad = PolyData::from_polygons(
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y, Vec3::Z],
            vec![vec![0, 1, 2, 3]],
        );
        let out = PolyDataNormals { flip: true }.execute(&quad);
        let normals = out.point_data.normals.unwrap();
        assert_eq!(normals[0], Vec3::NEG_Z);
        // Unreferenced point
        assert_eq!(normals[4], Vec3::ZERO);
    }
}
