//! Arena-backed half-edge mesh.
//!
//! Vertices, half-edges and faces live in flat vectors owned by the mesh and
//! refer to each other through typed integer handles. Handles are only
//! meaningful for the mesh that produced them.

use crate::error::MeshError;
use crate::math::Vec3;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Placeholder for a link that has not been resolved yet.
            pub const INVALID: Self = Self(u32::MAX);

            /// Returns the arena index of this handle
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Returns true if this handle is not the placeholder
            #[inline]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }
    };
}

handle!(
    /// Handle to a [`Vertex`] of a [`HalfEdgeMesh`].
    VertexHandle
);
handle!(
    /// Handle to a [`HalfEdge`] of a [`HalfEdgeMesh`].
    EdgeHandle
);
handle!(
    /// Handle to a [`Face`] of a [`HalfEdgeMesh`].
    FaceHandle
);

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Position in the hull's local frame.
    pub position: Vec3,
    /// 1-based identifier, unique within the mesh.
    pub id: u32,
    /// One outgoing half-edge; `None` once a merge has orphaned the vertex.
    pub edge: Option<EdgeHandle>,
}

/// A directed edge on the boundary of exactly one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// Face this half-edge bounds.
    pub face: FaceHandle,
    /// Vertex the half-edge starts from.
    pub tail: VertexHandle,
    /// Opposite half-edge on the adjacent face.
    pub twin: EdgeHandle,
    /// Next half-edge around the face (CCW seen from outside).
    pub next: EdgeHandle,
    /// Previous half-edge around the face.
    pub prev: EdgeHandle,
}

/// A planar, convex, CCW-wound polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Representative boundary half-edge.
    pub edge: EdgeHandle,
    /// Outward unit normal.
    pub normal: Vec3,
    /// 1-based identifier.
    pub id: u32,
}

/// Closed manifold polygon mesh in half-edge form.
///
/// Every half-edge has a twin (`twin(twin(e)) == e`) once construction
/// succeeds; see [`HalfEdgeMesh::from_polygons`].
#[derive(Debug, Clone, PartialEq)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
    pub(crate) sorted: bool,
}

impl HalfEdgeMesh {
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[HalfEdge] {
        &self.edges
    }

    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    pub fn vertex(&self, handle: VertexHandle) -> &Vertex {
        &self.vertices[handle.index()]
    }

    #[inline]
    pub fn edge(&self, handle: EdgeHandle) -> &HalfEdge {
        &self.edges[handle.index()]
    }

    #[inline]
    pub fn face(&self, handle: FaceHandle) -> &Face {
        &self.faces[handle.index()]
    }

    /// Handles of all faces in arena order.
    pub fn face_handles(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        (0..self.faces.len() as u32).map(FaceHandle)
    }

    /// Vertex the half-edge points to.
    #[inline]
    pub fn head(&self, edge: EdgeHandle) -> VertexHandle {
        self.edge(self.edge(edge).next).tail
    }

    /// Position of the tail vertex of the face's representative edge.
    #[inline]
    pub fn face_point(&self, face: FaceHandle) -> Vec3 {
        let edge = self.face(face).edge;
        self.vertex(self.edge(edge).tail).position
    }

    /// Boundary half-edges of a face, starting at its representative edge.
    pub fn face_edges(&self, face: FaceHandle) -> FaceEdges<'_> {
        let start = self.face(face).edge;
        FaceEdges {
            mesh: self,
            start,
            current: Some(start),
            remaining: self.edges.len(),
        }
    }

    /// Boundary vertex positions of a face in winding order.
    pub fn face_polygon(&self, face: FaceHandle) -> Vec<Vec3> {
        self.face_edges(face)
            .map(|e| self.vertex(self.edge(e).tail).position)
            .collect()
    }

    /// Looks up the half-edge running from vertex id `tail` to vertex id `head`.
    ///
    /// Binary search while the edge order is intact, linear scan otherwise.
    pub fn find_edge(&self, tail: u32, head: u32) -> Option<EdgeHandle> {
        let key = (tail, head);
        if self.sorted {
            self.edges
                .binary_search_by(|e| self.edge_key(e).cmp(&key))
                .ok()
                .map(|i| EdgeHandle(i as u32))
        } else {
            self.edges
                .iter()
                .position(|e| self.edge_key(e) == key)
                .map(|i| EdgeHandle(i as u32))
        }
    }

    /// `(tail id, head id)` of a half-edge.
    #[inline]
    fn edge_key(&self, edge: &HalfEdge) -> (u32, u32) {
        let head = self.edge(edge.next).tail;
        (self.vertex(edge.tail).id, self.vertex(head).id)
    }

    /// True if the half-edge arena is in `(tail id, head id)` order.
    #[inline]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Reorders the half-edge arena by `(tail id, head id)` and remaps every
    /// edge handle held by vertices, faces and other edges.
    pub fn sort_edges(&mut self) {
        let mut order: Vec<u32> = (0..self.edges.len() as u32).collect();
        order.sort_by_key(|&i| self.edge_key(&self.edges[i as usize]));

        let mut remap = vec![EdgeHandle::INVALID; self.edges.len()];
        for (new, &old) in order.iter().enumerate() {
            remap[old as usize] = EdgeHandle(new as u32);
        }
        let map = |h: EdgeHandle| remap[h.index()];

        self.edges = order
            .iter()
            .map(|&old| {
                let e = self.edges[old as usize];
                HalfEdge {
                    twin: map(e.twin),
                    next: map(e.next),
                    prev: map(e.prev),
                    ..e
                }
            })
            .collect();
        for face in &mut self.faces {
            face.edge = map(face.edge);
        }
        for vertex in &mut self.vertices {
            vertex.edge = vertex.edge.map(map);
        }
        self.sorted = true;
    }

    /// Recomputes every face normal from its boundary.
    pub(crate) fn recompute_normals(&mut self) -> Result<(), MeshError> {
        for i in 0..self.faces.len() {
            let polygon = self.face_polygon(FaceHandle(i as u32));
            let normal = newell_normal(&polygon).ok_or(MeshError::DegenerateFace { face: i + 1 })?;
            self.faces[i].normal = normal;
        }
        Ok(())
    }

    /// Uniformly scaled copy; topology and normals are unchanged.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        let mut mesh = self.clone();
        for vertex in &mut mesh.vertices {
            vertex.position *= factor;
        }
        mesh
    }

    /// Checks the structural invariants: twins are mutual and opposite,
    /// next/prev agree, and every face cycle closes on its own face.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (i, e) in self.edges.iter().enumerate() {
            let h = EdgeHandle(i as u32);
            let twin = self.edge(e.twin);
            let (tail, head) = self.edge_key(e);
            if twin.twin != h || self.head(e.twin) != e.tail || twin.tail != self.head(h) {
                return Err(MeshError::UnresolvedTwin { tail, head });
            }
            if self.edge(e.next).prev != h || self.edge(e.prev).next != h {
                return Err(MeshError::DuplicateEdge { tail, head });
            }
        }
        for f in self.face_handles() {
            let mut count = 0;
            for e in self.face_edges(f) {
                if self.edge(e).face != f {
                    return Err(MeshError::DegenerateFace { face: f.index() + 1 });
                }
                count += 1;
            }
            if count < 3 {
                return Err(MeshError::DegenerateFace { face: f.index() + 1 });
            }
        }
        Ok(())
    }
}

/// Iterator over the boundary cycle of one face.
pub struct FaceEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    start: EdgeHandle,
    current: Option<EdgeHandle>,
    remaining: usize,
}

impl Iterator for FaceEdges<'_> {
    type Item = EdgeHandle;

    fn next(&mut self) -> Option<EdgeHandle> {
        let current = self.current?;
        if self.remaining == 0 {
            self.current = None;
            return None;
        }
        self.remaining -= 1;
        let next = self.mesh.edge(current).next;
        self.current = (next != self.start).then_some(next);
        Some(current)
    }
}

/// Unit normal of a planar polygon by Newell's method.
///
/// Returns `None` for polygons with (near) zero area.
pub fn newell_normal(polygon: &[Vec3]) -> Option<Vec3> {
    let mut n = Vec3::ZERO;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.try_normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_shapes::{tetrahedron, unit_cube};

    #[test]
    fn test_newell_normal() {
        let square = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        assert!(newell_normal(&square).unwrap().abs_diff_eq(Vec3::Z, 1e-6));

        let line = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0];
        assert!(newell_normal(&line).is_none());
    }

    #[test]
    fn test_face_cycle() {
        let mesh = unit_cube();
        for f in mesh.face_handles() {
            assert_eq!(mesh.face_edges(f).count(), 4);
            assert_eq!(mesh.face_polygon(f).len(), 4);
        }
    }

    #[test]
    fn test_sorted_edges() {
        let mesh = tetrahedron();
        assert!(mesh.is_sorted());
        let keys: Vec<_> = mesh.edges().iter().map(|e| mesh.edge_key(e)).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_find_edge() {
        let mesh = tetrahedron();
        let e = mesh.find_edge(1, 2).expect("edge 1->2 exists");
        assert_eq!(mesh.vertex(mesh.edge(e).tail).id, 1);
        assert_eq!(mesh.vertex(mesh.head(e)).id, 2);
        assert!(mesh.find_edge(1, 1).is_none());
    }

    #[test]
    fn test_scaled_keeps_normals() {
        let mesh = unit_cube();
        let big = mesh.scaled(3.0);
        assert_eq!(big.faces(), mesh.faces());
        assert!(big.vertices()[6].position.abs_diff_eq(Vec3::splat(3.0), 1e-6));
        big.validate().unwrap();
    }
}
