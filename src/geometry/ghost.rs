//! Ghost cell geometry for boundary faces.
//!
//! A physical ghost mirrors its owner cell through the face plane and copies
//! the owner volume. Faces whose area is at or below the degenerate threshold
//! have no reliable normal; their ghost is the point reflection of the owner
//! through the face center instead. Interface ghosts receive the same
//! placeholder and are reported as pending: their real geometry comes from
//! the neighbor zone through halo exchange.

use super::metrics::{MeshMetrics, dot, scale, sub};
use crate::algs::boundary::ClassifiedTopology;
use crate::topology::FaceId;

/// Face area at or below which a face counts as degenerate.
pub const DEGENERATE_AREA: f64 = 1e-12;

/// Ghost center for the owner at `owner` across a face.
///
/// `normal` must be a unit vector when `area > threshold`.
pub fn mirror_ghost_center(
    owner: [f64; 3],
    face_center: [f64; 3],
    normal: [f64; 3],
    area: f64,
    threshold: f64,
) -> [f64; 3] {
    if area > threshold {
        let d = 2.0 * dot(sub(owner, face_center), normal);
        sub(owner, scale(normal, d))
    } else {
        sub(scale(face_center, 2.0), owner)
    }
}

/// Outcome of [`synthesize_ghosts`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GhostReport {
    /// Boundary faces handled by the point-reflection fallback.
    pub degenerate: Vec<FaceId>,
    /// Interface boundary faces whose ghosts await halo import.
    pub pending_interfaces: Vec<FaceId>,
}

/// Fill the ghost slots of `metrics` for every boundary face.
pub fn synthesize_ghosts(
    topology: &ClassifiedTopology,
    metrics: &mut MeshMetrics,
    threshold: f64,
) -> GhostReport {
    let mut report = GhostReport::default();
    let ncells = topology.cell_count();

    for (i, face) in topology.boundary_faces().iter().enumerate() {
        let area = metrics.face_areas[i];
        if area <= threshold {
            report.degenerate.push(i);
        }
        if face.bc.is_interface() {
            report.pending_interfaces.push(i);
        }
        let ghost = ncells + i;
        metrics.cell_centers[ghost] = mirror_ghost_center(
            metrics.cell_centers[face.left],
            metrics.face_centers[i],
            metrics.face_normals[i],
            area,
            threshold,
        );
        metrics.cell_volumes[ghost] = metrics.cell_volumes[face.left];
    }

    if !report.degenerate.is_empty() {
        log::warn!(
            "{} degenerate boundary faces (area <= {threshold:e}) used point reflection; first: {:?}",
            report.degenerate.len(),
            &report.degenerate[..report.degenerate.len().min(8)]
        );
    }
    log::debug!(
        "synthesized {} ghost cells ({} pending interface imports)",
        topology.boundary_count(),
        report.pending_interfaces.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_is_symmetric_about_the_plane() {
        let owner = [0.3, 0.2, -0.7];
        let fc = [0.0, 0.0, 0.0];
        let n = [0.0, 0.0, 1.0];
        let g = mirror_ghost_center(owner, fc, n, 1.0, DEGENERATE_AREA);
        assert_eq!(g, [0.3, 0.2, 0.7]);
        let to_face = dot(sub(fc, owner), n);
        let to_ghost = dot(sub(g, fc), n);
        assert!((to_face - to_ghost).abs() < 1e-15);
    }

    #[test]
    fn degenerate_face_uses_point_reflection() {
        let owner = [1.0, 2.0, 3.0];
        let fc = [0.5, 0.5, 0.5];
        let g = mirror_ghost_center(owner, fc, [0.0; 3], 0.0, DEGENERATE_AREA);
        assert_eq!(g, [0.0, -1.0, -2.0]);
        let at_threshold = mirror_ghost_center(owner, fc, [0.0, 0.0, 1.0], DEGENERATE_AREA, DEGENERATE_AREA);
        assert_eq!(at_threshold, g);
    }
}
