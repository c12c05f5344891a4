//! Ear-cutting of the initial (possibly deeply concave, non-planar) boundary
//! ring into a valid starting triangulation.
//!
//! Ported from `delaunay.cpp`'s `intrusionPoint`/`findConvexEdge`/
//! `findConvexEdgeAlt`/`findIntrudeEdge`/`isEdgeConvex`. The original
//! recurses implicitly through a `for(;;)` loop holding a single boundary
//! cursor; here the same loop is an explicit work-stack (`elist`) of
//! boundary edges still needing an ear to be found, matching the stack
//! already present in the source (`EdgesList elist`).

use tracing::trace;

use super::Triangulator;
use crate::error::TriangulationError;
use crate::halfedge::EdgeId;

impl Triangulator {
    pub(crate) fn intrusion_point(&mut self, from: EdgeId) -> Result<(), TriangulationError> {
        let mut work = vec![from];

        while let Some(curr) = work.pop() {
            let (cv_prev, cv_edge) = self.find_convex_edge(curr)?;

            let cv_next = self.edges.next(cv_edge).ok_or_else(|| {
                TriangulationError::BadTopology("convex edge has no next".to_string())
            })?;

            // Ring has closed down to a single triangle.
            if Some(cv_prev) == self.edges.next(cv_next) {
                self.stats.ears_clipped += 1;
                continue;
            }

            if let Some(ir_edge) = self.find_intrude_edge(cv_edge) {
                let ir_next = self.edges.next(ir_edge).ok_or_else(|| {
                    TriangulationError::BadTopology("intruder edge has no next".to_string())
                })?;

                let e = self.edges.new_edge(self.edges.dst(ir_edge), self.edges.dst(cv_edge));
                let a = self.edges.create_twin(e);
                self.octree.add(self.edges.rect(e), e);
                self.octree.add(self.edges.rect(a), a);

                self.edges.set_next(e, cv_next);
                self.edges.set_next(ir_edge, e);
                self.edges.set_next(cv_edge, a);
                self.edges.set_next(a, ir_next);

                self.stats.intrusions_resolved += 1;
                work.push(e);
                work.push(a);
            } else {
                let e = self.edges.new_edge(self.edges.org(cv_edge), self.edges.dst(cv_next));
                let a = self.edges.create_twin(e);
                self.octree.add(self.edges.rect(e), e);
                self.octree.add(self.edges.rect(a), a);

                let cv_next_next = self.edges.next(cv_next).ok_or_else(|| {
                    TriangulationError::BadTopology("boundary edge has no next".to_string())
                })?;

                self.edges.set_next(cv_prev, e);
                self.edges.set_next(e, cv_next_next);
                self.edges.set_next(cv_next, a);
                self.edges.set_next(a, cv_edge);

                self.stats.ears_clipped += 1;
                work.push(e);
            }
        }

        Ok(())
    }

    /// `true` iff the triangle fan through `edge` (`pre → cur → nxt`) bends
    /// the right way relative to `cur`'s surface normal.
    fn is_edge_convex(&self, edge: EdgeId) -> bool {
        let Some(next) = self.edges.next(edge) else {
            return false;
        };
        let pre = self.edges.verts()[self.edges.org(edge)];
        let cur = self.edges.verts()[self.edges.dst(edge)];
        let nxt = self.edges.verts()[self.edges.dst(next)];

        let dir = (pre.p - cur.p).cross(nxt.p - cur.p);
        if dir.length() < crate::numeric::EPS {
            return false;
        }
        let dir = dir.normalize();

        cur.n.dot(dir) > self.config.convex_threshold
    }

    /// Shortest convex ear on the boundary loop starting at `from`. Falls
    /// back to [`Self::find_convex_edge_alt`] if nothing is convex by the
    /// strict test (a dimple too shallow to clear `convex_threshold`, or a
    /// genuinely reflex ring position).
    fn find_convex_edge(&self, from: EdgeId) -> Result<(EdgeId, EdgeId), TriangulationError> {
        let mut best: Option<EdgeId> = None;
        let mut best_prev: Option<EdgeId> = None;
        let mut length_min = f64::MAX;

        let mut prev: Option<EdgeId> = None;
        let mut curr = from;
        loop {
            let next = self.edges.next(curr).ok_or_else(|| {
                TriangulationError::BadTopology("boundary ring is not closed".to_string())
            })?;

            if self.is_edge_convex(curr) {
                let pre = self.edges.verts()[self.edges.org(curr)].p;
                let nxt = self.edges.verts()[self.edges.dst(next)].p;
                let leng = (nxt - pre).length();
                if leng < length_min {
                    best = Some(curr);
                    best_prev = prev;
                    length_min = leng;
                }
            }

            prev = Some(curr);
            curr = next;
            if curr == from {
                break;
            }
        }

        let best = match best {
            Some(b) => b,
            None => {
                trace!("no strictly convex ear found, falling back");
                return self.find_convex_edge_alt(from);
            }
        };

        let cv_prev = match best_prev {
            Some(p) => p,
            None => self.edges.prev(best).ok_or_else(|| {
                TriangulationError::BadTopology("boundary ring is not closed".to_string())
            })?,
        };

        Ok((cv_prev, best))
    }

    /// Fallback when no edge clears the convexity threshold: prefer the
    /// shortest ear with no crossing boundary segment nearby; if every
    /// candidate has a crossing, just take the globally shortest one.
    fn find_convex_edge_alt(&self, from: EdgeId) -> Result<(EdgeId, EdgeId), TriangulationError> {
        let mut best: Option<EdgeId> = None;
        let mut best_prev: Option<EdgeId> = None;
        let mut length_min = f64::MAX;

        let mut shortest: Option<EdgeId> = None;
        let mut shortest_prev: Option<EdgeId> = None;
        let mut length_min2 = f64::MAX;

        let mut prev: Option<EdgeId> = None;
        let mut curr = from;
        loop {
            let next = self.edges.next(curr).ok_or_else(|| {
                TriangulationError::BadTopology("boundary ring is not closed".to_string())
            })?;

            let pre = self.edges.verts()[self.edges.org(curr)].p;
            let nxt = self.edges.verts()[self.edges.dst(next)].p;
            let leng = (nxt - pre).length();

            if !self.have_cross_sections(curr) {
                if leng < length_min {
                    best = Some(curr);
                    best_prev = prev;
                    length_min = leng;
                }
            } else if leng < length_min2 {
                shortest = Some(curr);
                shortest_prev = prev;
                length_min2 = leng;
            }

            prev = Some(curr);
            curr = next;
            if curr == from {
                break;
            }
        }

        let (best, best_prev) = match best {
            Some(b) => (b, best_prev),
            None => (
                shortest.ok_or_else(|| {
                    TriangulationError::BadTopology(
                        "no candidate ear found in fallback search".to_string(),
                    )
                })?,
                shortest_prev,
            ),
        };

        let cv_prev = match best_prev {
            Some(p) => p,
            None => self.edges.prev(best).ok_or_else(|| {
                TriangulationError::BadTopology("boundary ring is not closed".to_string())
            })?,
        };

        Ok((cv_prev, best))
    }

    /// Deepest admissible intruder into the ear candidate `cv_edge`, or
    /// `None` if the ear can be clipped directly.
    fn find_intrude_edge(&self, cv_edge: EdgeId) -> Option<EdgeId> {
        let next = self.edges.next(cv_edge)?;

        let pre = self.edges.verts()[self.edges.org(cv_edge)];
        let cvv = self.edges.verts()[self.edges.dst(cv_edge)];
        let nxt = self.edges.verts()[self.edges.dst(next)];

        let nor = pre.n + cvv.n + nxt.n;

        let (vdist_cvv, _) = crate::numeric::dist_to_line(pre.p, nxt.p, cvv.p);
        let dist_cvv = vdist_cvv.length();
        let mut dist = 0.0;

        let normal = (cvv.p - pre.p).cross(nxt.p - pre.p);
        if normal.length() < crate::numeric::EPS {
            return None;
        }
        let normal = normal.normalize();
        let d_plane = -cvv.p.dot(normal);

        let mut ir_edge = None;
        let mut curr = match self.edges.next(next) {
            Some(c) => c,
            None => return None,
        };
        loop {
            if curr == cv_edge {
                break;
            }
            let Some(curr_next) = self.edges.next(curr) else {
                break;
            };
            if curr_next == cv_edge {
                break;
            }

            let iv = self.edges.verts()[self.edges.dst(curr)];
            let (vd, _) = crate::numeric::dist_to_line(pre.p, nxt.p, iv.p);

            let ivd = iv.p.dot(normal) + d_plane;
            let ivp = iv.p - normal * ivd;

            let inside = crate::numeric::inside_tri(pre.p, cvv.p, nxt.p, ivp);
            if inside && vd.dot(vdist_cvv) > 0.0 {
                let d = vd.length();
                let dist_icv = (iv.p - cvv.p).length();
                let admissible = d > dist
                    && d < dist_cvv
                    && dist_icv <= self.config.intrusion_locality_factor * dist_cvv;

                let normal_ok = !self.config.reject_opposite_normal_intrusions || nor.dot(iv.n) >= 0.0;

                if admissible && normal_ok {
                    ir_edge = Some(curr);
                    dist = d;
                }
            }

            curr = curr_next;
        }

        ir_edge
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TriangulationConfig;
    use crate::geom::Vec3;
    use crate::triangulator::Triangulator;

    #[test]
    fn ear_cutting_closes_a_convex_pentagon() {
        let n = Vec3::Z;
        let boundary = vec![
            (Vec3::new(0.0, 0.0, 0.0), n),
            (Vec3::new(2.0, 0.0, 0.0), n),
            (Vec3::new(2.5, 1.5, 0.0), n),
            (Vec3::new(1.0, 2.5, 0.0), n),
            (Vec3::new(-0.5, 1.5, 0.0), n),
        ];
        let t = Triangulator::new(boundary, TriangulationConfig::default()).unwrap();
        // Ear-cutting a convex pentagon takes exactly 2 clips to leave one
        // closed triangle (3 clips total counting the final closure).
        assert_eq!(t.stats().ears_clipped, 3);
        assert_eq!(t.stats().intrusions_resolved, 0);
    }

    #[test]
    fn ear_cutting_resolves_a_concave_dart() {
        let n = Vec3::Z;
        // A dart/arrowhead: vertex 2 bends inward past the line from 1 to 3,
        // forcing at least one intrusion before the ring can be ear-clipped.
        let boundary = vec![
            (Vec3::new(0.0, 0.0, 0.0), n),
            (Vec3::new(2.0, 0.0, 0.0), n),
            (Vec3::new(1.0, 0.3, 0.0), n),
            (Vec3::new(2.0, 2.0, 0.0), n),
            (Vec3::new(0.0, 2.0, 0.0), n),
        ];
        let t = Triangulator::new(boundary, TriangulationConfig::default()).unwrap();
        let tris = t.edges.edge_ids().filter(|&e| t.edges.is_triangle(e)).count() / 3;
        assert_eq!(tris, 3);
    }
}
