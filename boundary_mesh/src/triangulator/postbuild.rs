//! Final walk emitting one [`Triangle`] per closed face.

use std::collections::HashSet;

use super::{Triangle, Triangulator};
use crate::halfedge::EdgeId;

impl Triangulator {
    pub(crate) fn postbuild(&self) -> Vec<Triangle> {
        let mut used: HashSet<EdgeId> = HashSet::new();
        let mut tris = Vec::new();

        for e in self.edges.edge_ids() {
            if used.contains(&e) {
                continue;
            }
            if !self.edges.is_triangle(e) {
                continue;
            }
            let Some((a, b, c)) = self.edges.tri(e) else {
                continue;
            };
            tris.push(Triangle { a, b, c });

            let n1 = self.edges.next(e).expect("triangle edge has next");
            let n2 = self.edges.next(n1).expect("triangle edge has next");
            used.insert(e);
            used.insert(n1);
            used.insert(n2);
        }

        tris
    }
}
