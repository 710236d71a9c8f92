//! Coplanar face merging.

use tracing::debug;

use crate::error::MeshError;

use super::half_edge::{EdgeHandle, FaceHandle, HalfEdgeMesh, VertexHandle};

impl HalfEdgeMesh {
    /// Merges adjacent faces whose normals agree within `tolerance`
    /// (`dot(n_f, n_g) >= 1 - tolerance`) and returns the number of merges.
    ///
    /// The shared edge pair disappears from the combined boundary, along with
    /// any dangling edge pair the merge leaves behind. Dead elements are
    /// compacted, face ids renumbered from 1, normals recomputed and the edge
    /// arena re-sorted.
    ///
    /// Fails with [`MeshError::DegenerateFace`] if a merged face has no
    /// well-defined normal; the mesh is left compacted but unusable.
    pub fn merge_coplanar_faces(&mut self, tolerance: f32) -> Result<usize, MeshError> {
        let mut edge_alive = vec![true; self.edges.len()];
        let mut face_alive = vec![true; self.faces.len()];
        let mut merges = 0;

        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.edges.len() {
                if !edge_alive[i] {
                    continue;
                }
                let e = EdgeHandle(i as u32);
                let t = self.edges[i].twin;
                let f = self.edges[i].face;
                let g = self.edge(t).face;
                if f == g {
                    continue;
                }
                if self.face(f).normal.dot(self.face(g).normal) < 1.0 - tolerance {
                    continue;
                }

                self.splice(e, t);
                edge_alive[e.index()] = false;
                edge_alive[t.index()] = false;
                face_alive[g.index()] = false;
                self.remove_antennas(f, &mut edge_alive);

                merges += 1;
                changed = true;
            }
        }

        if merges == 0 {
            return Ok(0);
        }

        self.compact(&edge_alive, &face_alive);
        self.recompute_normals()?;
        self.sort_edges();

        debug!(
            merges,
            faces = self.num_faces(),
            half_edges = self.num_edges(),
            "merged coplanar faces"
        );
        Ok(merges)
    }

    /// Removes the edge pair `(e, t)` and joins face `twin`'s cycle into
    /// face `e`'s.
    fn splice(&mut self, e: EdgeHandle, t: EdgeHandle) {
        let f = self.edge(e).face;

        let mut x = self.edge(t).next;
        while x != t {
            self.edges[x.index()].face = f;
            x = self.edge(x).next;
        }

        let HalfEdgeEnds { next: en, prev: ep } = self.ends(e);
        let HalfEdgeEnds { next: tn, prev: tp } = self.ends(t);
        self.edges[ep.index()].next = tn;
        self.edges[tn.index()].prev = ep;
        self.edges[tp.index()].next = en;
        self.edges[en.index()].prev = tp;

        self.faces[f.index()].edge = en;
    }

    /// Drops every edge of face `f` whose successor is its own twin.
    fn remove_antennas(&mut self, f: FaceHandle, edge_alive: &mut [bool]) {
        loop {
            let antenna = self
                .face_edges(f)
                .find(|&x| self.edge(x).next == self.edge(x).twin);
            let Some(x) = antenna else { break };

            let y = self.edge(x).twin;
            let p = self.edge(x).prev;
            let n = self.edge(y).next;
            self.edges[p.index()].next = n;
            self.edges[n.index()].prev = p;
            let rep = self.face(f).edge;
            if rep == x || rep == y {
                self.faces[f.index()].edge = n;
            }
            edge_alive[x.index()] = false;
            edge_alive[y.index()] = false;
        }
    }

    /// Rebuilds the arenas without dead elements and remaps every handle.
    fn compact(&mut self, edge_alive: &[bool], face_alive: &[bool]) {
        let edge_map = remap(edge_alive);
        let face_map = remap(face_alive);

        let mut outgoing = vec![None; self.vertices.len()];
        for (i, e) in self.edges.iter().enumerate() {
            if edge_alive[i] {
                outgoing[e.tail.index()].get_or_insert(EdgeHandle(edge_map[i]));
            }
        }
        let vertex_alive: Vec<bool> = outgoing.iter().map(Option::is_some).collect();
        let vertex_map = remap(&vertex_alive);

        self.edges = self
            .edges
            .iter()
            .zip(edge_alive)
            .filter(|(_, &alive)| alive)
            .map(|(e, _)| {
                let mut e = *e;
                e.twin = EdgeHandle(edge_map[e.twin.index()]);
                e.next = EdgeHandle(edge_map[e.next.index()]);
                e.prev = EdgeHandle(edge_map[e.prev.index()]);
                e.face = FaceHandle(face_map[e.face.index()]);
                e.tail = VertexHandle(vertex_map[e.tail.index()]);
                e
            })
            .collect();

        self.faces = self
            .faces
            .iter()
            .zip(face_alive)
            .filter(|(_, &alive)| alive)
            .enumerate()
            .map(|(i, (face, _))| {
                let mut face = *face;
                face.edge = EdgeHandle(edge_map[face.edge.index()]);
                face.id = i as u32 + 1;
                face
            })
            .collect();

        self.vertices = std::mem::take(&mut self.vertices)
            .into_iter()
            .zip(outgoing)
            .filter_map(|(mut v, edge)| {
                v.edge = Some(edge?);
                Some(v)
            })
            .collect();

        self.sorted = false;
    }

    fn ends(&self, e: EdgeHandle) -> HalfEdgeEnds {
        let edge = self.edge(e);
        HalfEdgeEnds {
            next: edge.next,
            prev: edge.prev,
        }
    }
}

struct HalfEdgeEnds {
    next: EdgeHandle,
    prev: EdgeHandle,
}

/// Maps old arena indices to compacted ones; dead slots map to `u32::MAX`.
fn remap(alive: &[bool]) -> Vec<u32> {
    let mut next = 0;
    alive
        .iter()
        .map(|&a| {
            if a {
                next += 1;
                next - 1
            } else {
                u32::MAX
            }
        })
        .collect()
}
