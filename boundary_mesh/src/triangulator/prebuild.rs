//! Boundary ring construction and mean-edge-length-derived thresholds.

use tracing::debug;

use super::Triangulator;
use crate::error::TriangulationError;

impl Triangulator {
    pub(crate) fn prebuild(&mut self) -> Result<(), TriangulationError> {
        let n = self.boundary.len();
        let mut first = None;
        let mut prev = None;

        for i in 0..n {
            let org = self.boundary[i];
            let dst = self.boundary[(i + 1) % n];
            let e = self.edges.new_edge(org, dst);
            self.octree.add(self.edges.rect(e), e);

            self.edge_length += self.edges.length(e);
            if first.is_none() {
                first = Some(e);
            }
            if let Some(p) = prev {
                self.edges.set_next(p, e);
            }
            prev = Some(e);
        }

        let last = prev.ok_or_else(|| {
            TriangulationError::InvalidInput("boundary ring produced no edges".to_string())
        })?;
        let first = first.unwrap();
        self.edges.set_next(last, first);

        self.edge_length /= n as f64;
        self.rotate_threshold = self.edge_length * self.config.rotate_threshold;
        self.split_threshold = self.edge_length * self.config.split_threshold;
        self.thin_threshold = self.edge_length * self.config.thin_threshold;

        debug!(
            mean_edge_length = self.edge_length,
            rotate_threshold = self.rotate_threshold,
            split_threshold = self.split_threshold,
            thin_threshold = self.thin_threshold,
            "prebuild thresholds derived"
        );

        self.intrusion_point(last)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::TriangulationConfig;
    use crate::geom::Vec3;
    use crate::triangulator::Triangulator;

    #[test]
    fn thresholds_scale_with_mean_edge_length() {
        let n = Vec3::Z;
        let boundary = vec![
            (Vec3::new(0.0, 0.0, 0.0), n),
            (Vec3::new(2.0, 0.0, 0.0), n),
            (Vec3::new(2.0, 2.0, 0.0), n),
            (Vec3::new(0.0, 2.0, 0.0), n),
        ];
        let t = Triangulator::new(boundary, TriangulationConfig::default()).unwrap();
        assert!((t.edge_length - 2.0).abs() < 1e-9);
        assert!((t.split_threshold - 4.0).abs() < 1e-9);
        assert!((t.thin_threshold - 0.5).abs() < 1e-9);
    }

    #[test]
    fn prebuild_leaves_a_closed_triangle_ring_for_a_triangle_boundary() {
        let n = Vec3::Z;
        let boundary = vec![
            (Vec3::new(0.0, 0.0, 0.0), n),
            (Vec3::new(1.0, 0.0, 0.0), n),
            (Vec3::new(0.0, 1.0, 0.0), n),
        ];
        let t = Triangulator::new(boundary, TriangulationConfig::default()).unwrap();
        // A 3-vertex boundary needs no ear-cutting at all: the ring itself
        // is already the one closed triangle.
        assert_eq!(t.stats().ears_clipped, 1);
        let tris = t.edges.edge_ids().filter(|&e| t.edges.is_triangle(e)).count();
        assert_eq!(tris, 3);
    }
}
