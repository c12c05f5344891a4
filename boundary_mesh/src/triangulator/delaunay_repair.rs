//! Local Delaunay criterion and the repeated-rotation repair passes.

use tracing::{debug, trace};

use super::{EdgeSet, Triangulator};
use crate::error::TriangulationError;
use crate::halfedge::EdgeId;

impl Triangulator {
    /// Runs [`Self::make_delaunay`] to a fixed point, with an
    /// anti-oscillation guard: if the number of rotations performed per pass
    /// stops decreasing for more than 3 consecutive passes, stop rather than
    /// spin forever on a pair of edges flipping back and forth.
    pub(crate) fn make_delaunay_rep(&mut self, check_si: bool) -> Result<(), TriangulationError> {
        let mut best = usize::MAX;
        let mut stalled = 0;
        loop {
            let n = self.make_delaunay(check_si)?;
            if n == 0 {
                break;
            }
            if n >= best {
                stalled += 1;
            } else {
                stalled = 0;
            }
            best = n;
            if stalled > 3 {
                debug!(rotations = n, "delaunay repair stalled, stopping");
                break;
            }
        }
        Ok(())
    }

    /// One full sweep over every interior edge, rotating those that fail
    /// the local Delaunay criterion. Returns the number of rotations
    /// actually performed.
    fn make_delaunay(&mut self, check_si: bool) -> Result<usize, TriangulationError> {
        let mut to_delaunay = EdgeSet::new();
        let mut to_exclude = EdgeSet::new();
        for e in self.edges.edge_ids() {
            let Some(a) = self.edges.twin(e) else {
                continue;
            };
            if to_exclude.contains(&e) {
                continue;
            }
            to_delaunay.insert(e);
            to_exclude.insert(a);
        }

        let mut num = 0;
        for e in to_delaunay {
            if !self.need_rotate(e, check_si)? {
                continue;
            }
            let a = self.edges.twin(e).expect("need_rotate requires a twin");

            if check_si {
                self.octree.remove(&self.edges.rect(e), &e);
                self.octree.remove(&self.edges.rect(a), &a);
            }

            if self.edges.rotate(e)? {
                num += 1;
                self.stats.rotations_performed += 1;
            }

            if check_si {
                self.octree.add(self.edges.rect(e), e);
                self.octree.add(self.edges.rect(a), a);
            }
        }

        Ok(num)
    }

    /// Localized repair used by [`super::refine`] right after a split: seeds
    /// the to-check set with the edges touched by the split instead of
    /// sweeping the whole mesh, and feeds any edge it rotates back into the
    /// set together with its new neighbors.
    pub(crate) fn make_delaunay_localized(
        &mut self,
        mut to_delaunay: EdgeSet,
        to_split: &mut EdgeSet,
        to_exclude: &mut EdgeSet,
    ) -> Result<(), TriangulationError> {
        while let Some(&e) = to_delaunay.iter().next() {
            to_delaunay.remove(&e);

            if !self.need_rotate(e, false)? {
                continue;
            }
            if !self.edges.rotate(e)? {
                continue;
            }

            let r_next = self.edges.next(e).ok_or_else(|| {
                TriangulationError::BadTopology("rotated edge missing next".to_string())
            })?;
            let r_prev = self.edges.prev(e).ok_or_else(|| {
                TriangulationError::BadTopology("rotated edge missing prev".to_string())
            })?;
            let twin = self.edges.twin(e).ok_or_else(|| {
                TriangulationError::BadTopology("rotated edge missing twin".to_string())
            })?;
            let l_next = self.edges.next(twin).ok_or_else(|| {
                TriangulationError::BadTopology("rotated twin missing next".to_string())
            })?;
            let l_prev = self.edges.prev(twin).ok_or_else(|| {
                TriangulationError::BadTopology("rotated twin missing prev".to_string())
            })?;

            self.stats.rotations_performed += 1;

            for g in [r_next, r_prev, l_next, l_prev] {
                to_delaunay.insert(g);

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

    /// Local planar Delaunay test on the quad formed by `edge`'s two
    /// triangles, plus (optionally) a self-intersection veto.
    fn need_rotate(&self, edge: EdgeId, check_si: bool) -> Result<bool, TriangulationError> {
        let Some(adj) = self.edges.twin(edge) else {
            return Ok(false);
        };

        let po = self.edges.verts()[self.edges.org(edge)].p;
        let pd = self.edges.verts()[self.edges.dst(edge)].p;

        let Some(r_next) = self.edges.next(edge) else {
            return Ok(false);
        };
        let Some(l_next) = self.edges.next(adj) else {
            return Ok(false);
        };
        let pr = self.edges.verts()[self.edges.dst(r_next)].p;
        let pl = self.edges.verts()[self.edges.dst(l_next)].p;

        let (dist_r, outside_r) = crate::numeric::dist_to_line(po, pd, pr);
        if dist_r.length() < self.rotate_threshold || outside_r {
            return Ok(false);
        }
        let (dist_l, outside_l) = crate::numeric::dist_to_line(po, pd, pl);
        if dist_l.length() < self.rotate_threshold || outside_l {
            return Ok(false);
        }

        let Some(r_prev) = self.edges.prev(edge) else {
            return Ok(false);
        };
        let Some(l_prev) = self.edges.prev(adj) else {
            return Ok(false);
        };

        let r1 = -self.edges.dir(r_next);
        let r2 = self.edges.dir(r_prev);
        let r3 = -self.edges.dir(l_next);
        let r4 = self.edges.dir(l_prev);

        let (sa, ca) = crate::numeric::sincos(r1, r2);
        let (sb, cb) = crate::numeric::sincos(r3, r4);

        let dln = sa * cb + sb * ca;
        if dln > -self.config.eps {
            return Ok(false);
        }

        if check_si {
            let i0 = self.edges.dst(r_next);
            let i1 = self.edges.dst(l_next);

            if self.self_isect_hypothetical_edge(i0, i1) {
                return Ok(false);
            }
            if self.self_isect_triangle(self.edges.org(edge), i0, i1) {
                return Ok(false);
            }
            if self.self_isect_triangle(self.edges.dst(edge), i1, i0) {
                return Ok(false);
            }
        }

        trace!(?edge, "rotation admissible");
        Ok(true)
    }
}
