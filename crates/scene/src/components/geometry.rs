use foundation::bounds::Aabb3;
use foundation::math::Vec3;

/// Indexed triangle mesh in model units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    pub fn new(positions: Vec<[f32; 3]>, normals: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Local-space bounds of all vertices (empty box for an empty mesh).
    pub fn bounds(&self) -> Aabb3 {
        Aabb3::from_points(self.positions.iter().map(|p| Vec3::from_f32(*p)))
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.indices.is_empty()
    }

    /// Per-vertex normals: the stored ones when complete, otherwise area
    /// weighted averages of the adjacent face normals.
    pub fn vertex_normals(&self) -> Vec<[f32; 3]> {
        if self.normals.len() == self.positions.len() {
            return self.normals.clone();
        }
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                continue;
            }
            let pa = Vec3::from_f32(self.positions[a]);
            let e1 = Vec3::from_f32(self.positions[b]) - pa;
            let e2 = Vec3::from_f32(self.positions[c]) - pa;
            let n = e1.cross(e2);
            for i in [a, b, c] {
                acc[i] = acc[i] + n;
            }
        }
        acc.into_iter()
            .map(|n| n.normalize().unwrap_or(Vec3::Z).as_f32())
            .collect()
    }
}
