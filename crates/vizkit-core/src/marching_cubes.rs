//! Marching cubes isosurface extraction over a regular grid.
//!
//! Uses the compact triangle table of the public-domain `MarchingCubeCpp`
//! library. Edge vertices are shared between neighboring cells through a
//! two-layer slab cache, so the output mesh is indexed and watertight inside
//! the grid.

#![allow(clippy::unreadable_literal)]

use glam::Vec3;

/// Where an output vertex came from: the grid edge `(a, b)` and the
/// interpolation parameter `t` (the vertex is `a + t * (b - a)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSample {
    /// Linear index of the first grid point.
    pub a: u32,
    /// Linear index of the second grid point.
    pub b: u32,
    /// Interpolation parameter in `[0, 1]`.
    pub t: f32,
}

impl EdgeSample {
    /// Interpolates a per-grid-point attribute at this vertex.
    #[must_use]
    pub fn lerp(&self, values: &[f32]) -> f32 {
        let va = values[self.a as usize];
        let vb = values[self.b as usize];
        va + (vb - va) * self.t
    }
}

/// Output of [`marching_cubes`].
#[derive(Debug, Clone, Default)]
pub struct McMesh {
    /// Vertex positions in grid-index space.
    pub vertices: Vec<Vec3>,
    /// Unit vertex normals accumulated from adjacent faces.
    pub normals: Vec<Vec3>,
    /// Origin of each vertex on the grid.
    pub samples: Vec<EdgeSample>,
    /// Triangle list.
    pub indices: Vec<u32>,
}

impl McMesh {
    /// Number of triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if no surface was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Extracts the `isoval` level set of `field`.
///
/// `field` is laid out x fastest: point `(x, y, z)` is at
/// `x + nx * (y + ny * z)`. Grids with a dimension below 2, or a field of the
/// wrong length, produce an empty mesh.
#[must_use]
pub fn marching_cubes(field: &[f32], isoval: f32, dims: [usize; 3]) -> McMesh {
    let [nx, ny, nz] = dims;
    if nx < 2 || ny < 2 || nz < 2 || field.len() != nx * ny * nz {
        log::warn!(
            "marching cubes skipped: dims {dims:?} with {} values",
            field.len()
        );
        return McMesh::default();
    }

    let mut ex = Extractor {
        dims,
        slab: vec![[u32::MAX; 3]; nx * ny * 2],
        mesh: McMesh::default(),
    };
    let at = |x: usize, y: usize, z: usize| field[x + nx * (y + ny * z)] - isoval;

    let mut vs = [0.0_f32; 8];
    let mut edges = [0_u32; 12];
    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                for (c, v) in vs.iter_mut().enumerate() {
                    *v = at(x + (c & 1), y + ((c >> 1) & 1), z + ((c >> 2) & 1));
                }
                let config = vs
                    .iter()
                    .enumerate()
                    .fold(0usize, |acc, (c, v)| acc | (usize::from(*v < 0.0) << c));
                if config == 0 || config == 255 {
                    continue;
                }

                // x edges
                if y == 0 && z == 0 {
                    ex.edge(vs[0], vs[1], 0, [x, y, z]);
                }
                if z == 0 {
                    ex.edge(vs[2], vs[3], 0, [x, y + 1, z]);
                }
                if y == 0 {
                    ex.edge(vs[4], vs[5], 0, [x, y, z + 1]);
                }
                ex.edge(vs[6], vs[7], 0, [x, y + 1, z + 1]);
                // y edges
                if x == 0 && z == 0 {
                    ex.edge(vs[0], vs[2], 1, [x, y, z]);
                }
                if z == 0 {
                    ex.edge(vs[1], vs[3], 1, [x + 1, y, z]);
                }
                if x == 0 {
                    ex.edge(vs[4], vs[6], 1, [x, y, z + 1]);
                }
                ex.edge(vs[5], vs[7], 1, [x + 1, y, z + 1]);
                // z edges
                if x == 0 && y == 0 {
                    ex.edge(vs[0], vs[4], 2, [x, y, z]);
                }
                if y == 0 {
                    ex.edge(vs[1], vs[5], 2, [x + 1, y, z]);
                }
                if x == 0 {
                    ex.edge(vs[2], vs[6], 2, [x, y + 1, z]);
                }
                ex.edge(vs[3], vs[7], 2, [x + 1, y + 1, z]);

                edges[0] = ex.cached(x, y, z, 0);
                edges[1] = ex.cached(x, y + 1, z, 0);
                edges[2] = ex.cached(x, y, z + 1, 0);
                edges[3] = ex.cached(x, y + 1, z + 1, 0);
                edges[4] = ex.cached(x, y, z, 1);
                edges[5] = ex.cached(x + 1, y, z, 1);
                edges[6] = ex.cached(x, y, z + 1, 1);
                edges[7] = ex.cached(x + 1, y, z + 1, 1);
                edges[8] = ex.cached(x, y, z, 2);
                edges[9] = ex.cached(x + 1, y, z, 2);
                edges[10] = ex.cached(x, y + 1, z, 2);
                edges[11] = ex.cached(x + 1, y + 1, z, 2);

                let entry = MC_TRIS[config];
                #[allow(clippy::cast_possible_truncation)]
                let n_tris = (entry & 0xF) as usize;
                for tri in 0..n_tris {
                    let mut corner = [0u32; 3];
                    for (k, slot) in corner.iter_mut().enumerate() {
                        let shift = 4 * (1 + tri * 3 + k);
                        #[allow(clippy::cast_possible_truncation)]
                        let edge = ((entry >> shift) & 0xF) as usize;
                        *slot = edges[edge];
                    }
                    ex.triangle(corner);
                }
            }
        }
    }

    for n in &mut ex.mesh.normals {
        *n = n.normalize_or_zero();
    }
    ex.mesh
}

struct Extractor {
    dims: [usize; 3],
    /// Vertex index per (x, y, z % 2) and edge axis.
    slab: Vec<[u32; 3]>,
    mesh: McMesh,
}

impl Extractor {
    fn slab_index(&self, x: usize, y: usize, z: usize) -> usize {
        let [nx, ny, _] = self.dims;
        nx * ny * (z % 2) + y * nx + x
    }

    fn cached(&self, x: usize, y: usize, z: usize, axis: usize) -> u32 {
        self.slab[self.slab_index(x, y, z)][axis]
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn edge(&mut self, va: f32, vb: f32, axis: usize, [x, y, z]: [usize; 3]) {
        if (va < 0.0) == (vb < 0.0) {
            return;
        }
        let t = va / (va - vb);
        let [nx, ny, _] = self.dims;
        let a = x + nx * (y + ny * z);
        let b = a + [1, nx, nx * ny][axis];

        let mut v = Vec3::new(x as f32, y as f32, z as f32);
        v[axis] += t;
        let idx = self.mesh.vertices.len() as u32;
        let slot = self.slab_index(x, y, z);
        self.slab[slot][axis] = idx;
        self.mesh.vertices.push(v);
        self.mesh.normals.push(Vec3::ZERO);
        self.mesh.samples.push(EdgeSample {
            a: a as u32,
            b: b as u32,
            t,
        });
    }

    fn triangle(&mut self, [a, b, c]: [u32; 3]) {
        let mesh = &mut self.mesh;
        let (va, vb, vc) = (
            mesh.vertices[a as usize],
            mesh.vertices[b as usize],
            mesh.vertices[c as usize],
        );
        let n = (vc - vb).cross(va - vb);
        for i in [a, b, c] {
            mesh.normals[i as usize] += n;
        }
        mesh.indices.extend_from_slice(&[a, b, c]);
    }
}

/// Triangle configurations, one per cube sign pattern.
///
/// Bits `[3:0]` hold the triangle count; each following nibble is an edge
/// index (0-11) of a triangle corner.
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[allow(clippy::cast_precision_loss)]
    fn sphere_field(n: usize, radius: f32) -> Vec<f32> {
        let c = Vec3::splat((n - 1) as f32 / 2.0);
        let mut field = Vec::with_capacity(n * n * n);
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    field.push((Vec3::new(x as f32, y as f32, z as f32) - c).length() - radius);
                }
            }
        }
        field
    }

    #[test]
    fn test_uniform_fields_are_empty() {
        assert!(marching_cubes(&[1.0; 27], 0.0, [3, 3, 3]).is_empty());
        assert!(marching_cubes(&[-1.0; 27], 0.0, [3, 3, 3]).is_empty());
    }

    #[test]
    fn test_single_corner_gives_one_triangle() {
        let mut field = vec![1.0_f32; 8];
        field[0] = -1.0;
        let mesh = marching_cubes(&field, 0.0, [2, 2, 2]);
        assert_eq!(mesh.num_triangles(), 1);
        // Every vertex sits halfway along an edge touching the origin.
        for (v, s) in mesh.vertices.iter().zip(&mesh.samples) {
            assert_eq!(s.a, 0);
            assert!((s.t - 0.5).abs() < 1e-6);
            assert!((v.length() - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bad_input_is_empty_not_panic() {
        assert!(marching_cubes(&[0.0; 10], 0.0, [3, 3, 3]).is_empty());
        assert!(marching_cubes(&[0.0; 1], 0.0, [1, 1, 1]).is_empty());
    }

    #[test]
    #[allow(clippy::cast_precision_loss)]
    fn test_sphere_vertices_lie_on_surface() {
        let n = 20;
        let radius = 5.0;
        let mesh = marching_cubes(&sphere_field(n, radius), 0.0, [n, n, n]);
        assert!(mesh.num_triangles() > 100);
        let c = Vec3::splat((n - 1) as f32 / 2.0);
        for v in &mesh.vertices {
            assert!(((*v - c).length() - radius).abs() < 0.5);
        }
        for normal in &mesh.normals {
            assert!((normal.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_samples_interpolate_the_field() {
        let n = 8;
        let field = sphere_field(n, 2.5);
        let mesh = marching_cubes(&field, 0.0, [n, n, n]);
        for s in &mesh.samples {
            assert!(s.lerp(&field).abs() < 1e-4);
        }
    }

    proptest! {
        #[test]
        fn prop_indices_in_range(values in proptest::collection::vec(-1.0f32..1.0, 64)) {
            let mesh = marching_cubes(&values, 0.1, [4, 4, 4]);
            prop_assert_eq!(mesh.indices.len() % 3, 0);
            prop_assert_eq!(mesh.vertices.len(), mesh.samples.len());
            for &i in &mesh.indices {
                prop_assert!((i as usize) < mesh.vertices.len());
            }
        }
    }
}
