//! Self-intersection guard: octree-backed tests for whether a hypothetical
//! edge or triangle would cross any existing geometry.
//!
//! Ported from `delaunay.cpp`'s `selfIsect(OrEdge*)` / `selfIsect(const
//! Triangle&)` / `haveCrossSections`. Both `selfIsect` overloads in the
//! source are only ever called with a *hypothetical* edge/triangle that was
//! never inserted into the half-edge arena (a local stack variable in the
//! original), so these take bare vertex ids and positions rather than a live
//! [`crate::halfedge::EdgeId`].

use std::collections::HashSet;

use super::Triangulator;
use crate::geom::{Rect3, Vec3};
use crate::halfedge::EdgeId;
use crate::vertex::VertexId;

impl Triangulator {
    fn pos(&self, v: VertexId) -> Vec3 {
        self.edges.verts()[v].p
    }

    fn touches(&self, tri: (VertexId, VertexId, VertexId), a: VertexId, b: VertexId) -> bool {
        let (x, y, z) = tri;
        x == a || x == b || y == a || y == b || z == a || z == b
    }

    /// Would the segment `a`→`b` cross any existing triangle face or
    /// still-open boundary edge nearby?
    pub(crate) fn self_isect_hypothetical_edge(&self, a: VertexId, b: VertexId) -> bool {
        let ep0 = self.pos(a);
        let ep1 = self.pos(b);

        let mut rect = Rect3::invalid();
        rect.add_point(ep0);
        rect.add_point(ep1);
        let items = self.octree.collect(&rect);

        let mut used: HashSet<EdgeId> = HashSet::new();
        let mut polyline: HashSet<EdgeId> = HashSet::new();

        for e in items {
            if used.contains(&e) {
                continue;
            }
            if !self.edges.is_triangle(e) {
                polyline.insert(e);
                continue;
            }

            let n1 = self.edges.next(e).expect("triangle edge has next");
            let n2 = self.edges.next(n1).expect("triangle edge has next");
            used.insert(n1);
            used.insert(n2);

            let Some(tri) = self.edges.tri(e) else {
                continue;
            };
            if self.touches(tri, a, b) {
                continue;
            }

            let (tp0, tp1, tp2) = (self.pos(tri.0), self.pos(tri.1), self.pos(tri.2));
            if crate::numeric::edge_tri_isect(ep0, ep1, tp0, tp1, tp2).is_some() {
                return true;
            }
        }

        if polyline.is_empty() {
            return false;
        }

        for from in polyline {
            if used.contains(&from) {
                continue;
            }
            let Some(mut curr) = self.edges.next(from) else {
                continue;
            };
            while curr != from && self.edges.next(curr) != Some(from) {
                used.insert(curr);

                let tri = (self.edges.org(from), self.edges.org(curr), self.edges.dst(curr));
                if !self.touches(tri, a, b) {
                    let (tp0, tp1, tp2) = (self.pos(tri.0), self.pos(tri.1), self.pos(tri.2));
                    if crate::numeric::edge_tri_isect(ep0, ep1, tp0, tp1, tp2).is_some() {
                        return true;
                    }
                }

                let Some(next) = self.edges.next(curr) else {
                    break;
                };
                curr = next;
            }
        }

        false
    }

    /// Would the (hypothetical, not-yet-inserted) triangle `(a, b, c)` cross
    /// any existing geometry nearby?
    pub(crate) fn self_isect_triangle(&self, a: VertexId, b: VertexId, c: VertexId) -> bool {
        let tp0 = self.pos(a);
        let tp1 = self.pos(b);
        let tp2 = self.pos(c);

        let mut rect = Rect3::invalid();
        rect.add_point(tp0);
        rect.add_point(tp1);
        rect.add_point(tp2);

        let own_edges = [(a, b), (b, c), (c, a)];

        let items = self.octree.collect(&rect);
        let mut used: HashSet<EdgeId> = HashSet::new();

        for e in items {
            if used.contains(&e) {
                continue;
            }

            if !self.touches((a, b, c), self.edges.org(e), self.edges.dst(e)) {
                let ep0 = self.pos(self.edges.org(e));
                let ep1 = self.pos(self.edges.dst(e));
                if crate::numeric::edge_tri_isect(ep0, ep1, tp0, tp1, tp2).is_some() {
                    return true;
                }
            }

            if !self.edges.is_triangle(e) {
                continue;
            }
            used.insert(self.edges.next(e).unwrap());
            used.insert(self.edges.next(self.edges.next(e).unwrap()).unwrap());

            let Some(etr) = self.edges.tri(e) else {
                continue;
            };
            let (q0, q1, q2) = (self.pos(etr.0), self.pos(etr.1), self.pos(etr.2));

            for &(oa, ob) in &own_edges {
                if self.touches(etr, oa, ob) {
                    continue;
                }
                let (x0, x1) = (self.pos(oa), self.pos(ob));
                if crate::numeric::edge_tri_isect(x0, x1, q0, q1, q2).is_some() {
                    return true;
                }
            }
        }

        false
    }

    /// `true` if any nearby indexed edge crosses `edge` in the plane sense
    /// (`edges_isect`, not a face test) — used by `findConvexEdgeAlt` to
    /// steer away from ears whose clipping diagonal would cross the
    /// remaining boundary.
    pub(crate) fn have_cross_sections(&self, edge: EdgeId) -> bool {
        let items = self.octree.collect(&self.edges.rect(edge));

        let p0 = self.pos(self.edges.org(edge));
        let p1 = self.pos(self.edges.dst(edge));

        for e in items {
            let q0 = self.pos(self.edges.org(e));
            let q1 = self.pos(self.edges.dst(e));
            if crate::numeric::edges_isect(p0, p1, q0, q1).is_some() {
                return true;
            }
        }

        false
    }
}
