use serde::{Deserialize, Serialize};

/// Interleaved vertex formats used by the lessons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexLayout {
    /// `x, y, z, u, v`
    PosUv,
    /// `x, y, z, u, v, nx, ny, nz`
    PosUvNormal,
}

/// Float vector width of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Vec2,
    Vec3,
}

impl AttributeKind {
    pub fn components(self) -> u32 {
        match self {
            Self::Vec2 => 2,
            Self::Vec3 => 3,
        }
    }
}

/// One attribute within an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub kind: AttributeKind,
    pub offset_floats: u32,
}

#[rustfmt::skip]
const POS_UV: [VertexAttribute; 2] = [
    VertexAttribute { location: 0, kind: AttributeKind::Vec3, offset_floats: 0 },
    VertexAttribute { location: 1, kind: AttributeKind::Vec2, offset_floats: 3 },
];

#[rustfmt::skip]
const POS_UV_NORMAL: [VertexAttribute; 3] = [
    VertexAttribute { location: 0, kind: AttributeKind::Vec3, offset_floats: 0 },
    VertexAttribute { location: 1, kind: AttributeKind::Vec2, offset_floats: 3 },
    VertexAttribute { location: 2, kind: AttributeKind::Vec3, offset_floats: 5 },
];

impl VertexLayout {
    pub fn stride_floats(self) -> usize {
        match self {
            Self::PosUv => 5,
            Self::PosUvNormal => 8,
        }
    }

    pub fn stride_bytes(self) -> u64 {
        (self.stride_floats() * std::mem::size_of::<f32>()) as u64
    }

    pub fn attributes(self) -> &'static [VertexAttribute] {
        match self {
            Self::PosUv => &POS_UV,
            Self::PosUvNormal => &POS_UV_NORMAL,
        }
    }

    /// First shader location free for per-instance attributes.
    pub fn next_location(self) -> u32 {
        self.attributes().len() as u32
    }
}

/// Built-in meshes, selectable from the lesson manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryKind {
    Triangle,
    Quad,
    Cube,
    LitCube,
}

impl GeometryKind {
    pub fn build(self) -> Geometry {
        match self {
            Self::Triangle => Geometry::triangle(),
            Self::Quad => Geometry::quad(),
            Self::Cube => Geometry::cube(),
            Self::LitCube => Geometry::lit_cube(),
        }
    }
}

/// Static interleaved vertex data, optionally indexed. Uploaded once.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub layout: VertexLayout,
    pub vertices: Vec<f32>,
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.layout.stride_floats()) as u32
    }

    /// Number of elements a draw call covers: indices if present, else vertices.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.len() as u32,
            None => self.vertex_count(),
        }
    }

    pub fn triangle() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // XYZ            UV
            -0.5, -0.5, 0.0,  0.0, 0.0,
             0.5, -0.5, 0.0,  1.0, 0.0,
             0.0,  0.5, 0.0,  0.5, 1.0,
        ];
        Self {
            layout: VertexLayout::PosUv,
            vertices,
            indices: None,
        }
    }

    pub fn quad() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            // XYZ            UV
             0.5,  0.5, 0.0,  1.0, 1.0,
             0.5, -0.5, 0.0,  1.0, 0.0,
            -0.5, -0.5, 0.0,  0.0, 0.0,
            -0.5,  0.5, 0.0,  0.0, 1.0,
        ];
        Self {
            layout: VertexLayout::PosUv,
            vertices,
            indices: Some(vec![0, 1, 3, 1, 2, 3]),
        }
    }

    /// Unit cube as 36 unindexed vertices, so each face has its own UVs.
    pub fn cube() -> Self {
        let vertices = cube_faces()
            .into_iter()
            .flat_map(|(position, uv, _)| [position[0], position[1], position[2], uv[0], uv[1]])
            .collect();
        Self {
            layout: VertexLayout::PosUv,
            vertices,
            indices: None,
        }
    }

    /// Unit cube with per-face normals for lighting.
    pub fn lit_cube() -> Self {
        let vertices = cube_faces()
            .into_iter()
            .flat_map(|(p, uv, n)| [p[0], p[1], p[2], uv[0], uv[1], n[0], n[1], n[2]])
            .collect();
        Self {
            layout: VertexLayout::PosUvNormal,
            vertices,
            indices: None,
        }
    }
}

type CubeVertex = ([f32; 3], [f32; 2], [f32; 3]);

fn cube_faces() -> Vec<CubeVertex> {
    let p = 0.5_f32;
    // (normal, corners counter-clockwise seen from outside)
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([ 0.0,  0.0,  1.0], [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        ([ 0.0,  0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        ([ 1.0,  0.0,  0.0], [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        ([-1.0,  0.0,  0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        ([ 0.0,  1.0,  0.0], [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        ([ 0.0, -1.0,  0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut out = Vec::with_capacity(36);
    for (normal, corners) in faces {
        for corner in [0, 1, 2, 2, 3, 0] {
            out.push((corners[corner], uvs[corner], normal));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Geometry> {
        [
            GeometryKind::Triangle,
            GeometryKind::Quad,
            GeometryKind::Cube,
            GeometryKind::LitCube,
        ]
        .into_iter()
        .map(GeometryKind::build)
        .collect()
    }

    #[test]
    fn vertex_data_matches_stride() {
        for geometry in all() {
            assert_eq!(geometry.vertices.len() % geometry.layout.stride_floats(), 0);
        }
    }

    #[test]
    fn indices_stay_in_bounds() {
        for geometry in all() {
            if let Some(indices) = &geometry.indices {
                assert!(indices.iter().all(|&i| i < geometry.vertex_count()));
            }
            assert_eq!(geometry.draw_count() % 3, 0);
        }
    }

    #[test]
    fn quad_is_two_indexed_triangles() {
        let quad = Geometry::quad();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.draw_count(), 6);
    }

    #[test]
    fn cube_has_36_vertices() {
        assert_eq!(Geometry::cube().vertex_count(), 36);
        assert_eq!(Geometry::lit_cube().vertex_count(), 36);
    }

    #[test]
    fn lit_cube_normals_are_unit_and_face_outward() {
        let cube = Geometry::lit_cube();
        for vertex in cube.vertices.chunks(cube.layout.stride_floats()) {
            let (p, n) = (&vertex[0..3], &vertex[5..8]);
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-6);
            let outward = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            assert!((outward - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn cube_faces_wind_counter_clockwise() {
        let cube = Geometry::lit_cube();
        let stride = cube.layout.stride_floats();
        for tri in cube.vertices.chunks(stride * 3) {
            let v = |i: usize| [tri[i * stride], tri[i * stride + 1], tri[i * stride + 2]];
            let (a, b, c) = (v(0), v(1), v(2));
            let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
            let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let n = &tri[5..8];
            assert!(cross[0] * n[0] + cross[1] * n[1] + cross[2] * n[2] > 0.0);
        }
    }

    #[test]
    fn layout_attributes_cover_stride() {
        for layout in [VertexLayout::PosUv, VertexLayout::PosUvNormal] {
            let covered: u32 = layout
                .attributes()
                .iter()
                .map(|a| a.kind.components())
                .sum();
            assert_eq!(covered as usize, layout.stride_floats());
            assert_eq!(layout.next_location() as usize, layout.attributes().len());
        }
    }
}
