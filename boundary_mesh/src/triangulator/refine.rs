//! Edge-splitting refinement: subdivide edges longer than `split_threshold`,
//! rejecting candidates that would leave a sliver ("thin V") pair of
//! triangles, and keep the touched neighborhood locally Delaunay after each
//! split.
//!
//! Ported from `delaunay.cpp::split()`/`getSplitPoint`. The localized
//! Delaunay recheck after each split is a performance optimization in the
//! source (a full `makeDelaunayRep` sweep always runs again once refinement
//! finishes) — the exact neighborhood re-examined here is the edges bounding
//! the two triangle pairs touched by the split, not a pointer-for-pointer
//! reproduction of the source's local variable picks.

use tracing::warn;

use super::{EdgeSet, Triangulator};
use crate::error::TriangulationError;
use crate::halfedge::EdgeId;
use crate::vertex::Vertex;

impl Triangulator {
    pub(crate) fn split(&mut self) -> Result<(), TriangulationError> {
        let mut to_split = EdgeSet::new();
        let mut to_exclude = EdgeSet::new();

        for e in self.edges.edge_ids() {
            let Some(a) = self.edges.twin(e) else {
                continue;
            };
            if self.edges.length(e) < self.split_threshold {
                continue;
            }
            if to_exclude.contains(&e) {
                continue;
            }
            to_split.insert(e);
            to_exclude.insert(a);
        }

        while let Some(&e) = to_split.iter().next() {
            to_split.remove(&e);

            let Some(adj) = self.edges.twin(e) else {
                continue;
            };

            let Some(v) = self.get_split_point(e) else {
                self.stats.splits_skipped += 1;
                continue;
            };

            let r_next = self.edges.next(e).ok_or_else(|| {
                TriangulationError::BadTopology("edge to split has no next".to_string())
            })?;
            let r_prev = self.edges.prev(e).ok_or_else(|| {
                TriangulationError::BadTopology("edge to split has no prev".to_string())
            })?;
            let l_next = self.edges.next(adj).ok_or_else(|| {
                TriangulationError::BadTopology("twin has no next".to_string())
            })?;
            let l_prev = self.edges.prev(adj).ok_or_else(|| {
                TriangulationError::BadTopology("twin has no prev".to_string())
            })?;

            let i = self.edges.push_vertex(v.p, v.n);

            if !self.edges.split_edge(e, i) {
                // SplitFailed is non-fatal (spec.md §7): the surrounding
                // faces weren't both triangles (e.g. already reshaped by an
                // earlier split in this same draining pass). Skip this
                // candidate and keep refining the rest.
                warn!(?e, "split rejected, surrounding faces not both triangles");
                self.stats.splits_skipped += 1;
                continue;
            }
            self.stats.splits_performed += 1;

            let mut to_delaunay = EdgeSet::new();
            for g in [e, adj, r_next, r_prev, l_next, l_prev] {
                to_delaunay.insert(g);
            }
            self.make_delaunay_localized(to_delaunay, &mut to_split, &mut to_exclude)?;

            for g in [r_next, r_prev, l_next, l_prev] {
                let Some(a) = self.edges.twin(g) else {
                    continue;
                };
                if self.edges.length(g) < self.split_threshold {
                    continue;
                }
                if to_exclude.contains(&g) {
                    continue;
                }
                to_split.insert(g);
                to_exclude.insert(a);
            }
        }

        Ok(())
    }

    /// Midpoint-plus-averaged-normal candidate for splitting `edge`, or
    /// `None` if the edge is too short or splitting would leave a sliver
    /// pair of triangles thinner than `thin_threshold`.
    fn get_split_point(&self, edge: EdgeId) -> Option<Vertex> {
        let adj = self.edges.twin(edge)?;
        if self.edges.length(edge) < self.split_threshold {
            return None;
        }

        let p0 = self.edges.verts()[self.edges.org(edge)].p;
        let p1 = self.edges.verts()[self.edges.dst(edge)].p;
        let n0 = self.edges.verts()[self.edges.org(edge)].n;
        let n1 = self.edges.verts()[self.edges.dst(edge)].n;

        let p = (p0 + p1) * 0.5;
        let n_sum = n0 + n1;
        let n = if n_sum.length() > crate::numeric::EPS {
            n_sum.normalize()
        } else {
            n0
        };

        let r_next = self.edges.next(edge)?;
        let l_next = self.edges.next(adj)?;
        let q0 = self.edges.verts()[self.edges.dst(r_next)].p;
        let q1 = self.edges.verts()[self.edges.dst(l_next)].p;

        for (a, b) in [(p0, q0), (p1, q0), (p0, q1), (p1, q1)] {
            let (v, outside) = crate::numeric::dist_to_line(a, b, p);
            if v.length() < self.thin_threshold && outside {
                return None;
            }
        }

        Some(Vertex::new(p, n))
    }
}
