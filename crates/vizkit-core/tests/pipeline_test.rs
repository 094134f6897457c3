//! End-to-end data pipelines: read a file, filter it, check the result.
//!
//! Input files are generated into the temp directory so the tests do not
//! depend on the bundled sample data.

use std::path::PathBuf;

use vizkit_core::*;

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("vizkit-it-{}-{name}", std::process::id()));
    std::fs::write(&path, bytes).expect("write temp file");
    path
}

/// A swirl around the z axis with a constant upward drift.
fn helix_field_bytes(n: usize) -> Vec<u8> {
    let mut bytes = format!("{n} {n} {n}\n").into_bytes();
    let c = (n - 1) as f32 * 0.5;
    for _ in 0..n {
        for j in 0..n {
            for i in 0..n {
                let (x, y) = (i as f32 - c, j as f32 - c);
                for v in [-y * 0.1, x * 0.1, 0.5] {
                    bytes.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
    }
    bytes
}

#[test]
fn test_vec_file_to_ribbons() {
    let path = temp_file("helix.vec", &helix_field_bytes(16));
    let field = read_vector_field(&path).expect("read field");
    std::fs::remove_file(&path).ok();

    // Seed plane placed like the plane widget does: centered, normal +Z.
    let bounds = field.bounds();
    let plane = PlaneSource {
        origin: Vec3::new(4.0, 4.0, 2.0),
        point1: Vec3::new(11.0, 4.0, 2.0),
        point2: Vec3::new(4.0, 11.0, 2.0),
        x_resolution: 4,
        y_resolution: 4,
    };
    let seeds = plane.output();
    assert!(seeds.points.iter().all(|p| bounds.contains(*p)));

    let lines = StreamTracer::default()
        .execute(&field, &seeds.points)
        .expect("trace");
    assert_eq!(lines.lines.len(), 25);

    // Speed never drops below the drift and never exceeds the fastest sample.
    let (lo, hi) = lines.scalar_range().expect("speed scalars");
    let (_, field_hi) = field.vector_magnitude_range().expect("vectors");
    assert!(lo >= 0.5 - 1e-4 && hi <= field_hi + 1e-4);

    // Every line climbs with the drift until it leaves through the top.
    for line in &lines.lines {
        let first = lines.points[line[0] as usize];
        let last = lines.points[*line.last().unwrap() as usize];
        assert!(last.z > first.z + 10.0);
    }

    let ribbons = RibbonFilter {
        vary_width: true,
        ..RibbonFilter::default()
    }
    .execute(&lines)
    .expect("ribbons");
    assert_eq!(ribbons.num_points(), 2 * lines.num_points());
    assert_eq!(
        ribbons.point_data.scalars.as_ref().map(Vec::len),
        Some(ribbons.num_points())
    );

    let tubes = TubeFilter {
        radius: 0.25,
        number_of_sides: 5,
    }
    .execute(&lines)
    .expect("tubes");
    assert_eq!(tubes.num_points(), 5 * lines.num_points());
}

#[test]
fn test_vtk_file_to_isosurfaces() {
    let n = 12;
    let mut text = format!(
        "# vtk DataFile Version 3.0\nnoise\nASCII\nDATASET STRUCTURED_POINTS\n\
         DIMENSIONS {n} {n} {n}\nSPACING 1 1 1\nORIGIN -5.5 -5.5 -5.5\n\
         POINT_DATA {}\nSCALARS scalars float\nLOOKUP_TABLE default\n",
        n * n * n
    );
    for k in 0..n {
        for j in 0..n {
            for i in 0..n {
                let p = Vec3::new(i as f32, j as f32, k as f32) - Vec3::splat(5.5);
                text.push_str(&format!("{}\n", p.length()));
            }
        }
    }
    let path = temp_file("noise.vtk", text.as_bytes());
    let image = LegacyVtkReader::new(&path).read().expect("read vtk");
    std::fs::remove_file(&path).ok();

    let mut contour = ContourFilter::new();
    contour.set_value(0, 1.5);
    contour.set_value(1, 3.0);
    contour.set_value(2, 4.5);
    let surfaces = contour.execute(&image).expect("contour");
    assert_eq!(surfaces.scalar_range(), Some((1.5, 4.5)));
    for (p, s) in surfaces
        .points
        .iter()
        .zip(surfaces.point_data.scalars.as_ref().unwrap())
    {
        assert!((p.length() - s).abs() < 0.15);
    }

    let cut = Cutter::new(Plane::new(Vec3::ZERO, Vec3::ONE))
        .execute(&image)
        .expect("cut");
    assert!(!cut.is_empty());
    assert!(cut.points.iter().all(|p| (p.x + p.y + p.z).abs() < 1e-3));

    let outline = OutlineFilter.execute(&image.bounds());
    assert_eq!(outline.lines.len(), 12);
    assert_eq!(outline.bounds(), image.bounds());

    let boundary = ImageDataGeometryFilter.execute(&image);
    assert_eq!(boundary.polys.len(), 6 * 11 * 11);
}
