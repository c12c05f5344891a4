//! Optional Laplacian-like smoothing pass, coefficient scaled by how much
//! the triangle fan around a vertex deviates from planar.
//!
//! Ported from `delaunay.cpp::smooth`/`smoothPt`.

use super::Triangulator;
use crate::halfedge::EdgeId;
use crate::vertex::Vertex;

impl Triangulator {
    pub(crate) fn smooth(&mut self, iters: usize) {
        let all_edges: Vec<EdgeId> = self.edges.edge_ids().collect();
        for _ in 0..iters {
            for &e in &all_edges {
                self.smooth_pt(e);
            }
            self.stats.smoothing_passes_run += 1;
        }
    }

    /// Moves `edge.org` toward the centroid of its one-ring, damped by
    /// `(1 - min_pairwise_face_cosine) / 2` so a vertex on a near-flat patch
    /// barely moves while one at a sharp crease moves almost fully.
    fn smooth_pt(&mut self, edge: EdgeId) {
        if self.edges.next(edge).is_none() {
            return;
        }

        let org_id = self.edges.org(edge);
        let v0 = self.edges.verts()[org_id];
        let v1 = self.edges.verts()[self.edges.dst(edge)];

        let mut pnt = v0.p + v1.p;
        let mut nor = v0.n + v1.n;
        let mut counter = 2usize;

        let mut tris = Vec::new();
        let mut curr = edge;
        loop {
            let Some(tri) = self.edges.tri(curr) else {
                break;
            };
            tris.push(tri);

            let Some(c1) = self.edges.next(curr) else {
                break;
            };
            let Some(c2) = self.edges.next(c1) else {
                break;
            };
            curr = c2;

            let v = self.edges.verts()[self.edges.org(curr)];
            pnt += v.p;
            nor += v.n;
            counter += 1;

            let Some(adj) = self.edges.twin(curr) else {
                break;
            };
            curr = adj;
            if curr == edge {
                break;
            }
        }

        let mut cosa_min = 1.0f64;
        for i in 0..tris.len() {
            let (a0, b0, c0) = tris[i];
            let p0 = self.edges.verts()[a0].p;
            let p1 = self.edges.verts()[b0].p;
            let p2 = self.edges.verts()[c0].p;
            let n0 = (p1 - p0).cross(p2 - p0).normalize();

            for tri_j in tris.iter().skip(i + 1) {
                let (a1, b1, c1) = *tri_j;
                let q0 = self.edges.verts()[a1].p;
                let q1 = self.edges.verts()[b1].p;
                let q2 = self.edges.verts()[c1].p;
                let n1 = (q1 - q0).cross(q2 - q0).normalize();
                let cosa = n1.dot(n0);
                if cosa < cosa_min {
                    cosa_min = cosa;
                }
            }
        }

        let coef = ((1.0 - cosa_min) * 0.5).clamp(0.0, 1.0);

        pnt *= 1.0 / counter as f64;
        let nor = if nor.length() > crate::numeric::EPS {
            nor.normalize()
        } else {
            v0.n
        };
        let dp = (pnt - v0.p) * coef;
        let new_p = v0.p + dp;

        self.edges.verts_mut().set(org_id, Vertex::new(new_p, nor));
    }
}
