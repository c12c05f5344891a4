//! Pipeline orchestration: prebuild (ear-cut) → Delaunay repair → refine →
//! smooth → postbuild, matching the stage order in
//! `examples/original_source/ipoint/delaunay.cpp::triangulate()`.

mod delaunay_repair;
mod intrusion;
mod postbuild;
mod prebuild;
mod refine;
mod selfisect;
mod smooth;

use std::collections::HashSet;

use tracing::{info, info_span};

use crate::config::TriangulationConfig;
use crate::error::TriangulationError;
use crate::geom::{Rect3, Vec3};
use crate::halfedge::{EdgeId, EdgesContainer};
use crate::octree::Octree;
use crate::vertex::{Vertex, VertexId};

/// One output face, referencing vertices by id into [`Triangulator::vertices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub a: VertexId,
    pub b: VertexId,
    pub c: VertexId,
}

/// Counters surfaced for diagnostics; none of them affect triangulation
/// results, only what gets logged and what a caller can assert on in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriangulationStats {
    pub ears_clipped: usize,
    pub intrusions_resolved: usize,
    pub rotations_performed: usize,
    pub splits_performed: usize,
    pub splits_skipped: usize,
    pub smoothing_passes_run: usize,
}

/// Constrained Delaunay triangulator of a simple, closed, oriented boundary
/// ring with per-vertex normals.
pub struct Triangulator {
    pub(crate) edges: EdgesContainer,
    pub(crate) octree: Octree<EdgeId>,
    pub(crate) config: TriangulationConfig,
    pub(crate) boundary: Vec<VertexId>,

    pub(crate) edge_length: f64,
    pub(crate) rotate_threshold: f64,
    pub(crate) split_threshold: f64,
    pub(crate) thin_threshold: f64,

    pub(crate) stats: TriangulationStats,
}

impl Triangulator {
    /// `boundary` is the closed ring in traversal order, one `(position,
    /// normal)` pair per vertex. Requires at least 3 vertices; normals are
    /// expected non-degenerate (checked lazily wherever they're used as a
    /// local "up" reference).
    pub fn new(
        boundary: impl IntoIterator<Item = (Vec3, Vec3)>,
        config: TriangulationConfig,
    ) -> Result<Self, TriangulationError> {
        let boundary: Vec<(Vec3, Vec3)> = boundary.into_iter().collect();
        if boundary.len() < 3 {
            return Err(TriangulationError::InvalidInput(
                "at least 3 boundary vertices are required".to_string(),
            ));
        }

        let mut container = EdgesContainer::new(crate::vertex::VertexStore::new());
        let mut rect = Rect3::invalid();
        let mut boundary_ids = Vec::with_capacity(boundary.len());
        for (p, n) in &boundary {
            if !p.is_finite() || !n.is_finite() {
                return Err(TriangulationError::InvalidInput(
                    "vertex position and normal must be finite".to_string(),
                ));
            }
            if n.length() < crate::numeric::EPS {
                return Err(TriangulationError::InvalidInput(
                    "vertex normal must be non-degenerate".to_string(),
                ));
            }
            rect.add_point(*p);
            boundary_ids.push(container.push_vertex(*p, *n));
        }

        let octree = Octree::new(rect, crate::octree::depth_for_count(boundary_ids.len()));

        let mut t = Self {
            edges: container,
            octree,
            config,
            boundary: boundary_ids,
            edge_length: 0.0,
            rotate_threshold: 0.0,
            split_threshold: 0.0,
            thin_threshold: 0.0,
            stats: TriangulationStats::default(),
        };
        t.prebuild()?;
        Ok(t)
    }

    pub fn vertices(&self) -> &[Vertex] {
        self.edges.verts().as_slice()
    }

    pub fn stats(&self) -> TriangulationStats {
        self.stats
    }

    /// Runs the full pipeline and emits the resulting closed triangle set.
    pub fn triangulate(&mut self) -> Result<Vec<Triangle>, TriangulationError> {
        let span = info_span!("triangulate", vertices = self.boundary.len());
        let _enter = span.enter();

        {
            let _span = info_span!("delaunay_repair", pass = "intrusion").entered();
            self.make_delaunay_rep(true)?;
        }
        {
            let _span = info_span!("refine").entered();
            self.split()?;
        }
        {
            let _span = info_span!("delaunay_repair", pass = "post_refine").entered();
            self.make_delaunay_rep(false)?;
        }
        if self.config.smoothing_passes > 0 {
            let _span = info_span!("smooth").entered();
            self.smooth(self.config.smoothing_passes);
        }

        let tris = {
            let _span = info_span!("postbuild").entered();
            self.postbuild()
        };

        info!(triangles = tris.len(), "triangulation complete");
        Ok(tris)
    }
}

pub(crate) type EdgeSet = HashSet<EdgeId>;
