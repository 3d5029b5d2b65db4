//! Isosurface extraction from scalar volumes by marching tetrahedra
//!
//! Each grid cube is split into six tetrahedra sharing its main diagonal. A
//! tetrahedron crossed by the level set contributes one triangle (one corner
//! separated) or two (two corners on each side). Vertices on shared grid edges
//! are deduplicated so the output is an indexed mesh.

use bitvec::vec::BitVec;
use ndarray::Array3;
use std::collections::HashMap;

/// Cube corner offsets, bit 0 = x, bit 1 = y, bit 2 = z in the usual corner numbering
const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Six tetrahedra around the diagonal from corner 0 to corner 6
const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Indexed triangle mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions
    pub vertices: Vec<[f64; 3]>,
    /// Triangles as vertex index triples, oriented so normals point from high to low values
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Whether the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Grid point with its scalar value
#[derive(Clone, Copy)]
struct Sample {
    index: usize,
    position: [f64; 3],
    value: f64,
}

struct Extractor<'a> {
    level: f64,
    inside: &'a BitVec,
    edge_vertices: HashMap<(usize, usize), usize>,
    mesh: TriangleMesh,
}

impl Extractor<'_> {
    fn is_inside(&self, sample: &Sample) -> bool {
        self.inside.get(sample.index).is_some_and(|bit| *bit)
    }

    /// Vertex where the level set crosses the edge between two samples
    fn edge_vertex(&mut self, a: &Sample, b: &Sample) -> usize {
        let key = (a.index.min(b.index), a.index.max(b.index));
        if let Some(&vertex) = self.edge_vertices.get(&key) {
            return vertex;
        }

        let span = b.value - a.value;
        let t = if span.abs() > f64::EPSILON {
            ((self.level - a.value) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let position = [
            t.mul_add(b.position[0] - a.position[0], a.position[0]),
            t.mul_add(b.position[1] - a.position[1], a.position[1]),
            t.mul_add(b.position[2] - a.position[2], a.position[2]),
        ];

        let vertex = self.mesh.vertices.len();
        self.mesh.vertices.push(position);
        self.edge_vertices.insert(key, vertex);
        vertex
    }

    /// Add a triangle whose normal points from `inside_anchor` towards `outside_anchor`
    fn emit(&mut self, mut face: [usize; 3], inside_anchor: [f64; 3], outside_anchor: [f64; 3]) {
        let corner = |i: usize| self.mesh.vertices.get(i).copied().unwrap_or([0.0; 3]);
        let [p0, p1, p2] = face.map(corner);
        let u = sub(p1, p0);
        let v = sub(p2, p0);
        let normal = [
            u[1].mul_add(v[2], -(u[2] * v[1])),
            u[2].mul_add(v[0], -(u[0] * v[2])),
            u[0].mul_add(v[1], -(u[1] * v[0])),
        ];
        if dot(normal, sub(outside_anchor, inside_anchor)) < 0.0 {
            face.swap(1, 2);
        }
        if face[0] != face[1] && face[1] != face[2] && face[0] != face[2] {
            self.mesh.faces.push(face);
        }
    }

    fn march_tetrahedron(&mut self, corners: [Sample; 4]) {
        let (inside, outside): (Vec<Sample>, Vec<Sample>) =
            corners.into_iter().partition(|sample| self.is_inside(sample));

        match (inside.as_slice(), outside.as_slice()) {
            ([lone], [a, b, c]) | ([a, b, c], [lone]) => {
                let lone_inside = self.is_inside(lone);
                let face = [
                    self.edge_vertex(lone, a),
                    self.edge_vertex(lone, b),
                    self.edge_vertex(lone, c),
                ];
                let rest = centroid(&[a.position, b.position, c.position]);
                if lone_inside {
                    self.emit(face, lone.position, rest);
                } else {
                    self.emit(face, rest, lone.position);
                }
            }
            ([i0, i1], [o0, o1]) => {
                let q0 = self.edge_vertex(i0, o0);
                let q1 = self.edge_vertex(i0, o1);
                let q2 = self.edge_vertex(i1, o1);
                let q3 = self.edge_vertex(i1, o0);
                let inside_anchor = centroid(&[i0.position, i1.position]);
                let outside_anchor = centroid(&[o0.position, o1.position]);
                self.emit([q0, q1, q2], inside_anchor, outside_anchor);
                self.emit([q0, q2, q3], inside_anchor, outside_anchor);
            }
            _ => {}
        }
    }
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0].mul_add(b[0], a[1].mul_add(b[1], a[2] * b[2]))
}

fn centroid(points: &[[f64; 3]]) -> [f64; 3] {
    let count = points.len().max(1) as f64;
    let sum = points
        .iter()
        .fold([0.0; 3], |acc, p| [acc[0] + p[0], acc[1] + p[1], acc[2] + p[2]]);
    sum.map(|s| s / count)
}

/// Extract the surface where `volume` crosses `level`
///
/// Grid point `(i, j, k)` sits at `(i * spacing[0], j * spacing[1], k * spacing[2])`.
/// Points with value `>= level` count as inside. Returns an empty mesh when the
/// level set does not cross the volume.
pub fn extract_isosurface(volume: &Array3<f64>, level: f64, spacing: [f64; 3]) -> TriangleMesh {
    let (nx, ny, nz) = volume.dim();
    let inside: BitVec = volume.iter().map(|&value| value >= level).collect();

    let mut extractor = Extractor {
        level,
        inside: &inside,
        edge_vertices: HashMap::new(),
        mesh: TriangleMesh::default(),
    };

    let sample_at = |[i, j, k]: [usize; 3]| Sample {
        index: (i * ny + j) * nz + k,
        position: [
            i as f64 * spacing[0],
            j as f64 * spacing[1],
            k as f64 * spacing[2],
        ],
        value: volume.get((i, j, k)).copied().unwrap_or(f64::NAN),
    };

    for i in 0..nx.saturating_sub(1) {
        for j in 0..ny.saturating_sub(1) {
            for k in 0..nz.saturating_sub(1) {
                let cube = CORNERS.map(|[di, dj, dk]| sample_at([i + di, j + dj, k + dk]));
                for tetrahedron in TETRAHEDRA {
                    let corners = tetrahedron.map(|c| cube.get(c).copied());
                    if let [Some(a), Some(b), Some(c), Some(d)] = corners {
                        extractor.march_tetrahedron([a, b, c, d]);
                    }
                }
            }
        }
    }

    extractor.mesh
}
