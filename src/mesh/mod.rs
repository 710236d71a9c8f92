//! Half-edge boundary representation of convex hulls.

mod builder;
mod half_edge;
mod merge;
pub mod obj;

pub use half_edge::{
    newell_normal, EdgeHandle, Face, FaceEdges, FaceHandle, HalfEdge, HalfEdgeMesh, Vertex,
    VertexHandle,
};

/// Default normal tolerance for [`HalfEdgeMesh::merge_coplanar_faces`].
pub const DEFAULT_MERGE_TOLERANCE: f32 = 1e-4;

#[cfg(test)]
pub(crate) mod test_shapes {
    use super::HalfEdgeMesh;
    use crate::math::Vec3;

    /// Outward CCW quads of the unit cube over [`cube_positions`].
    pub const CUBE_QUADS: [[u32; 4]; 6] = [
        [1, 4, 3, 2],
        [5, 6, 7, 8],
        [1, 2, 6, 5],
        [3, 4, 8, 7],
        [1, 5, 8, 4],
        [2, 3, 7, 6],
    ];

    pub fn cube_positions() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
        ]
    }

    pub fn unit_cube() -> HalfEdgeMesh {
        HalfEdgeMesh::from_polygons(&cube_positions(), &CUBE_QUADS).unwrap()
    }

    pub fn triangulated_cube() -> HalfEdgeMesh {
        let tris: Vec<[u32; 3]> = CUBE_QUADS
            .iter()
            .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
            .collect();
        HalfEdgeMesh::from_polygons(&cube_positions(), &tris).unwrap()
    }

    pub fn tetrahedron() -> HalfEdgeMesh {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        let faces = [[1u32, 3, 2], [1, 2, 4], [1, 4, 3], [2, 3, 4]];
        HalfEdgeMesh::from_polygons(&positions, &faces).unwrap()
    }
}
