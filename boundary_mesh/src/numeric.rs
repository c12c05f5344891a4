//! Numeric kernel: segment/line intersection primitives, point-in-triangle,
//! polygon orientation and the `sincos` helper the Delaunay criterion uses.
//!
//! Ported from the vector-form primitives declared in the original source's
//! `imath.h` (`edges_isect`, `edge_halfline_isect`, `line_line_isect`,
//! `edge_tri_isect`, `dist_to_line`, `inside_tri`, `cw_dir`, `sincos`),
//! generalized from that revision's 2D `z=0` specializations to full 3D.

use crate::geom::Vec3;

/// Numeric epsilon used throughout the kernel, matching spec tunable `err`.
pub const EPS: f64 = 1e-10;

/// Signed, vectorized distance of `q` from the line through `p0`→`p1`.
///
/// The returned vector points from the line to `q` and its length is the
/// (unsigned) perpendicular distance; comparing two such vectors with `dot`
/// tells whether two points are on the same side of the line. `outside` is
/// `true` when the foot of the perpendicular falls outside the `[p0, p1]`
/// segment.
pub fn dist_to_line(p0: Vec3, p1: Vec3, q: Vec3) -> (Vec3, bool) {
    let dir = p1 - p0;
    let len = dir.length();
    if len < EPS {
        return (q - p0, true);
    }
    let dir = dir / len;
    let to_q = q - p0;
    let t = dir.dot(to_q);
    let outside = t < 0.0 || t > len;
    let perp = to_q - dir * t;
    (perp, outside)
}

/// True iff `q`, assumed coplanar with the triangle, lies inside (or on the
/// boundary of) `(p0, p1, p2)`. Orientation-agnostic: works for either
/// winding since it only checks that the three edge-cross-products agree in
/// direction, not a fixed sign.
pub fn inside_tri(p0: Vec3, p1: Vec3, p2: Vec3, q: Vec3) -> bool {
    let e01 = p1 - p0;
    let e12 = p2 - p1;
    let e20 = p0 - p2;

    let v0 = e01.cross(q - p0);
    let v1 = e12.cross(q - p1);
    let v2 = e20.cross(q - p2);

    v1.dot(v0) >= -EPS && v2.dot(v0) >= -EPS
}

/// Closest points between two infinite lines `p + t*rp` and `q + u*rq`.
/// Returns `(point_on_first, point_on_second, t, u)`. Falls back to treating
/// the lines as parallel (returns `p`/`q` themselves) when nearly parallel.
fn closest_points_on_lines(p: Vec3, rp: Vec3, q: Vec3, rq: Vec3) -> (Vec3, Vec3, f64, f64) {
    let r = p - q;
    let a = rp.dot(rp);
    let e = rq.dot(rq);
    let f = rq.dot(r);

    if a < EPS || e < EPS {
        return (p, q, 0.0, 0.0);
    }

    let c = rp.dot(r);
    let b = rp.dot(rq);
    let denom = a * e - b * b;

    let t = if denom.abs() > EPS {
        (b * f - c * e) / denom
    } else {
        0.0
    };
    let u = (b * t + f) / e;

    (p + rp * t, q + rq * u, t, u)
}

/// Line-line intersection (or closest-approach point if skew). Returns the
/// midpoint of the two closest points and the separation distance between
/// them; `None` only when both directions degenerate to points.
pub fn line_line_isect(p: Vec3, rp: Vec3, q: Vec3, rq: Vec3) -> Option<(Vec3, f64)> {
    if rp.length() < EPS && rq.length() < EPS {
        return None;
    }
    let (cp, cq, _, _) = closest_points_on_lines(p, rp, q, rq);
    let dist = (cp - cq).length();
    Some(((cp + cq) * 0.5, dist))
}

/// Segment-segment intersection test. Both points and parameters must land
/// within `[0, 1]` and the segments must pass close enough to be considered
/// crossing (handles near-coplanar 3D segments, not just exact 2D ones).
pub fn edges_isect(p0: Vec3, p1: Vec3, q0: Vec3, q1: Vec3) -> Option<(Vec3, f64)> {
    let rp = p1 - p0;
    let rq = q1 - q0;
    if rp.length() < EPS || rq.length() < EPS {
        return None;
    }

    let (cp, cq, t, u) = closest_points_on_lines(p0, rp, q0, rq);
    let dist = (cp - cq).length();

    let tol = (rp.length().max(rq.length())) * 1e-6;
    if dist > tol {
        return None;
    }
    if !(-EPS..=1.0 + EPS).contains(&t) || !(-EPS..=1.0 + EPS).contains(&u) {
        return None;
    }

    Some(((cp + cq) * 0.5, dist))
}

/// Segment `p0`→`p1` against a half-line starting at `q` with direction
/// `rq` (`u >= 0`, unbounded).
pub fn edge_halfline_isect(p0: Vec3, p1: Vec3, q: Vec3, rq: Vec3) -> Option<(Vec3, f64)> {
    let rp = p1 - p0;
    if rp.length() < EPS || rq.length() < EPS {
        return None;
    }

    let (cp, cq, t, u) = closest_points_on_lines(p0, rp, q, rq);
    let dist = (cp - cq).length();

    let tol = (rp.length().max(rq.length())) * 1e-6;
    if dist > tol || u < -EPS || !(-EPS..=1.0 + EPS).contains(&t) {
        return None;
    }

    Some(((cp + cq) * 0.5, dist))
}

/// Segment-triangle intersection (Möller–Trumbore), restricted to the
/// segment's own parameter range rather than an unbounded ray.
pub fn edge_tri_isect(ep0: Vec3, ep1: Vec3, tp0: Vec3, tp1: Vec3, tp2: Vec3) -> Option<Vec3> {
    let dir = ep1 - ep0;
    let seg_len = dir.length();
    if seg_len < EPS {
        return None;
    }
    let dir = dir / seg_len;

    let e1 = tp1 - tp0;
    let e2 = tp2 - tp0;
    let pvec = dir.cross(e2);
    let det = e1.dot(pvec);
    if det.abs() < EPS {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ep0 - tp0;
    let u = tvec.dot(pvec) * inv_det;
    if !(-EPS..=1.0 + EPS).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(e1);
    let v = dir.dot(qvec) * inv_det;
    if v < -EPS || u + v > 1.0 + EPS {
        return None;
    }

    let t = e2.dot(qvec) * inv_det;
    if !(-EPS..=seg_len + EPS).contains(&t) {
        return None;
    }

    Some(ep0 + dir * t)
}

/// Newell's method: a signed normal for a (possibly non-planar) polygon
/// ring, used to decide overall winding before vertex normals take over as
/// the per-vertex "up" reference.
pub fn cw_dir(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    let n = points.len();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal += a.cross(b);
    }
    if normal.length() > EPS {
        normal.normalize()
    } else {
        normal
    }
}

/// Sine and cosine of the angle between two (not necessarily unit) vectors.
pub fn sincos(r1: Vec3, r2: Vec3) -> (f64, f64) {
    let l1 = r1.length();
    let l2 = r2.length();
    if l1 < EPS || l2 < EPS {
        return (0.0, 1.0);
    }
    let u1 = r1 / l1;
    let u2 = r2 / l2;
    let c = u1.dot(u2).clamp(-1.0, 1.0);
    let s = u1.cross(u2).length();
    (s, c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dist_to_line_perpendicular_and_side() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let (v, outside) = dist_to_line(p0, p1, Vec3::new(0.5, 1.0, 0.0));
        assert_relative_eq!(v.length(), 1.0, epsilon = 1e-9);
        assert!(!outside);

        let (_, outside) = dist_to_line(p0, p1, Vec3::new(2.0, 1.0, 0.0));
        assert!(outside);
    }

    #[test]
    fn dist_to_line_dot_gives_same_side() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let (va, _) = dist_to_line(p0, p1, Vec3::new(0.5, 1.0, 0.0));
        let (vb, _) = dist_to_line(p0, p1, Vec3::new(0.2, 2.0, 0.0));
        let (vc, _) = dist_to_line(p0, p1, Vec3::new(0.2, -2.0, 0.0));
        assert!(va.dot(vb) > 0.0);
        assert!(va.dot(vc) < 0.0);
    }

    #[test]
    fn inside_tri_center_and_outside() {
        let p0 = Vec3::new(0.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(0.0, 1.0, 0.0);
        assert!(inside_tri(p0, p1, p2, Vec3::new(0.2, 0.2, 0.0)));
        assert!(!inside_tri(p0, p1, p2, Vec3::new(0.9, 0.9, 0.0)));
    }

    #[test]
    fn edges_isect_crossing_segments() {
        let p0 = Vec3::new(0.0, -1.0, 0.0);
        let p1 = Vec3::new(0.0, 1.0, 0.0);
        let q0 = Vec3::new(-1.0, 0.0, 0.0);
        let q1 = Vec3::new(1.0, 0.0, 0.0);
        let r = edges_isect(p0, p1, q0, q1);
        assert!(r.is_some());
        let (pt, _) = r.unwrap();
        assert_relative_eq!(pt.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pt.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn edges_isect_non_crossing_segments() {
        let p0 = Vec3::new(0.0, -1.0, 0.0);
        let p1 = Vec3::new(0.0, -0.5, 0.0);
        let q0 = Vec3::new(-1.0, 0.0, 0.0);
        let q1 = Vec3::new(1.0, 0.0, 0.0);
        assert!(edges_isect(p0, p1, q0, q1).is_none());
    }

    #[test]
    fn edge_tri_isect_hits_face() {
        let tp0 = Vec3::new(0.0, 0.0, 0.0);
        let tp1 = Vec3::new(1.0, 0.0, 0.0);
        let tp2 = Vec3::new(0.0, 1.0, 0.0);
        let ep0 = Vec3::new(0.2, 0.2, -1.0);
        let ep1 = Vec3::new(0.2, 0.2, 1.0);
        let hit = edge_tri_isect(ep0, ep1, tp0, tp1, tp2);
        assert!(hit.is_some());
        assert_relative_eq!(hit.unwrap().z, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn edge_tri_isect_misses_face() {
        let tp0 = Vec3::new(0.0, 0.0, 0.0);
        let tp1 = Vec3::new(1.0, 0.0, 0.0);
        let tp2 = Vec3::new(0.0, 1.0, 0.0);
        let ep0 = Vec3::new(5.0, 5.0, -1.0);
        let ep1 = Vec3::new(5.0, 5.0, 1.0);
        assert!(edge_tri_isect(ep0, ep1, tp0, tp1, tp2).is_none());
    }

    #[test]
    fn sincos_right_angle() {
        let (s, c) = sincos(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(s, 1.0, epsilon = 1e-9);
        assert_relative_eq!(c, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn cw_dir_of_planar_square() {
        let pts = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let n = cw_dir(&pts);
        assert_relative_eq!(n.z.abs(), 1.0, epsilon = 1e-9);
    }
}
