//! Construction of a [`HalfEdgeMesh`] from indexed polygons.

use std::collections::HashMap;

use tracing::debug;

use super::half_edge::{EdgeHandle, Face, FaceHandle, HalfEdge, HalfEdgeMesh, Vertex, VertexHandle};
use crate::error::MeshError;
use crate::math::Vec3;

impl HalfEdgeMesh {
    /// Builds a closed half-edge mesh from vertex positions and polygons.
    ///
    /// Face indices are 1-based (OBJ convention) and each polygon must wind
    /// counter-clockwise seen from outside. Every directed edge has to be
    /// matched by its reverse on another face; nothing is returned on failure.
    ///
    /// The half-edge arena comes back sorted by `(tail id, head id)`.
    pub fn from_polygons<F: AsRef<[u32]>>(
        positions: &[Vec3],
        faces: &[F],
    ) -> Result<Self, MeshError> {
        if faces.is_empty() {
            return Err(MeshError::Empty);
        }

        let mut vertices: Vec<Vertex> = positions
            .iter()
            .enumerate()
            .map(|(i, &position)| Vertex {
                position,
                id: i as u32 + 1,
                edge: None,
            })
            .collect();

        let edge_count = faces.iter().map(|f| f.as_ref().len()).sum();
        let mut edges: Vec<HalfEdge> = Vec::with_capacity(edge_count);
        let mut mesh_faces: Vec<Face> = Vec::with_capacity(faces.len());
        let mut directed: HashMap<(u32, u32), EdgeHandle> = HashMap::with_capacity(edge_count);

        for (fi, polygon) in faces.iter().enumerate() {
            let polygon = polygon.as_ref();
            let face_id = fi + 1;
            if polygon.len() < 3 {
                return Err(MeshError::DegenerateFace { face: face_id });
            }
            if let Some(&bad) = polygon
                .iter()
                .find(|&&v| v == 0 || v as usize > positions.len())
            {
                return Err(MeshError::VertexOutOfRange {
                    face: face_id,
                    vertex: i64::from(bad),
                    count: positions.len(),
                });
            }

            let base = edges.len() as u32;
            let n = polygon.len() as u32;
            let face = FaceHandle(fi as u32);
            for k in 0..n {
                let tail = polygon[k as usize];
                let head = polygon[((k + 1) % n) as usize];
                if tail == head {
                    return Err(MeshError::DegenerateFace { face: face_id });
                }
                let handle = EdgeHandle(base + k);
                if directed.insert((tail, head), handle).is_some() {
                    return Err(MeshError::DuplicateEdge { tail, head });
                }
                let vertex = &mut vertices[tail as usize - 1];
                vertex.edge.get_or_insert(handle);
                edges.push(HalfEdge {
                    face,
                    tail: VertexHandle(tail - 1),
                    twin: EdgeHandle::INVALID,
                    next: EdgeHandle(base + (k + 1) % n),
                    prev: EdgeHandle(base + (k + n - 1) % n),
                });
            }
            mesh_faces.push(Face {
                edge: EdgeHandle(base),
                normal: Vec3::ZERO,
                id: face_id as u32,
            });
        }

        for i in 0..edges.len() {
            let tail = edges[i].tail.0 + 1;
            let head = edges[edges[i].next.index()].tail.0 + 1;
            edges[i].twin = directed
                .get(&(head, tail))
                .copied()
                .ok_or(MeshError::UnresolvedTwin { tail, head })?;
        }

        let mut mesh = Self {
            vertices,
            edges,
            faces: mesh_faces,
            sorted: false,
        };
        mesh.recompute_normals()?;
        mesh.sort_edges();

        debug!(
            vertices = mesh.num_vertices(),
            half_edges = mesh.num_edges(),
            faces = mesh.num_faces(),
            "built half-edge mesh"
        );
        Ok(mesh)
    }
}
