//! Face and cell metrics derived from face topology alone.
//!
//! Only face node lists and left/right cells are used, so the metrics of a
//! zone read back from a snapshot (which has no element connectivity) match
//! those of the zone that wrote it.
//!
//! - Face center: average of the face nodes.
//! - Face area/normal: 1D faces have unit area; 2D faces (edges) use the
//!   in-plane normal `(t.y, -t.x, 0)`; 3D faces use the Newell area vector.
//!   Normals are flipped when needed so that they point out of the left cell.
//! - Cell center: area-weighted average of the centers of the cell's faces
//!   (plain average when every face is degenerate).
//! - Cell volume: `(1/d) * sum(dot(fc - cc, n) * area)` over the cell's faces.
//!
//! Cell arrays cover real and ghost cells (`cell_count + boundary_count`);
//! ghost entries are filled by [`synthesize_ghosts`](super::ghost::synthesize_ghosts).

use crate::algs::boundary::ClassifiedTopology;
use crate::mesh_error::MeshError;

pub(crate) fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub(crate) fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub(crate) fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub(crate) fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub(crate) fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Geometric quantities of one zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshMetrics {
    /// Topological dimension of the cells (1, 2 or 3).
    pub dimension: u8,
    pub face_centers: Vec<[f64; 3]>,
    /// Unit normals pointing out of the left cell; zero for degenerate faces.
    pub face_normals: Vec<[f64; 3]>,
    pub face_areas: Vec<f64>,
    /// Real cells followed by one ghost per boundary face.
    pub cell_centers: Vec<[f64; 3]>,
    pub cell_volumes: Vec<f64>,
}

/// Infer the cell dimension from face node counts.
fn face_dimension(topology: &ClassifiedTopology) -> Result<u8, MeshError> {
    let mut dim = None;
    for (id, face) in topology.faces().iter().enumerate() {
        let d = match face.nodes.len() {
            0 => {
                return Err(MeshError::InvalidGeometry(format!("face {id} has no nodes")));
            }
            1 => 1,
            2 => 2,
            _ => 3,
        };
        match dim {
            None => dim = Some(d),
            Some(prev) if prev != d => {
                return Err(MeshError::InvalidGeometry(format!(
                    "face {id} implies dimension {d}, earlier faces dimension {prev}"
                )));
            }
            Some(_) => {}
        }
    }
    dim.ok_or_else(|| MeshError::InvalidGeometry("zone has no faces".into()))
}

/// Compute face and cell metrics of a classified zone.
///
/// Ghost cell slots are zeroed; run
/// [`synthesize_ghosts`](super::ghost::synthesize_ghosts) to fill them.
///
/// # Errors
/// [`MeshError::InvalidGeometry`] if a face references a missing node, faces
/// disagree on the dimension, or a cell has no faces.
pub fn compute_metrics(
    nodes: &[[f64; 3]],
    topology: &ClassifiedTopology,
    degenerate_area: f64,
) -> Result<MeshMetrics, MeshError> {
    let dimension = face_dimension(topology)?;
    let faces = topology.faces();
    let ncells = topology.cell_count();
    let ntotal = ncells + topology.boundary_count();

    let mut face_centers = Vec::with_capacity(faces.len());
    for (id, face) in faces.iter().enumerate() {
        let mut c = [0.0; 3];
        for &n in &face.nodes {
            let xyz = nodes.get(n).ok_or_else(|| {
                MeshError::InvalidGeometry(format!(
                    "face {id} references node {n}, zone has {} nodes",
                    nodes.len()
                ))
            })?;
            c = add(c, *xyz);
        }
        face_centers.push(scale(c, 1.0 / face.nodes.len() as f64));
    }

    // Area vectors in node order; orientation is fixed once cell centers exist.
    let mut area_vectors = Vec::with_capacity(faces.len());
    for face in faces {
        let p = |i: usize| nodes[face.nodes[i]];
        let av = match dimension {
            1 => (1.0, [0.0; 3]),
            2 => {
                let t = sub(p(1), p(0));
                (norm(t), [t[1], -t[0], 0.0])
            }
            _ => {
                let k = face.nodes.len();
                let mut v = [0.0; 3];
                for i in 0..k {
                    v = add(v, cross(p(i), p((i + 1) % k)));
                }
                let v = scale(v, 0.5);
                (norm(v), v)
            }
        };
        area_vectors.push(av);
    }

    // Area-weighted: splitting a face into children leaves the center unchanged.
    let mut cell_centers = vec![[0.0; 3]; ntotal];
    let mut plain = vec![[0.0; 3]; ncells];
    let mut weight = vec![0.0f64; ncells];
    let mut touch = vec![0usize; ncells];
    for ((face, fc), &(area, _)) in faces.iter().zip(&face_centers).zip(&area_vectors) {
        for cell in [Some(face.left), face.right].into_iter().flatten() {
            if cell < ncells {
                cell_centers[cell] = add(cell_centers[cell], scale(*fc, area));
                plain[cell] = add(plain[cell], *fc);
                weight[cell] += area;
                touch[cell] += 1;
            }
        }
    }
    for (cell, &n) in touch.iter().enumerate() {
        if n == 0 {
            return Err(MeshError::InvalidGeometry(format!("cell {cell} has no faces")));
        }
        cell_centers[cell] = if weight[cell] > degenerate_area {
            scale(cell_centers[cell], 1.0 / weight[cell])
        } else {
            scale(plain[cell], 1.0 / n as f64)
        };
    }

    let mut face_normals = Vec::with_capacity(faces.len());
    let mut face_areas = Vec::with_capacity(faces.len());
    for ((face, fc), &(area, raw)) in faces.iter().zip(&face_centers).zip(&area_vectors) {
        let outward = sub(*fc, cell_centers[face.left]);
        let mut normal = if dimension == 1 {
            let len = norm(outward);
            if len > 0.0 { scale(outward, 1.0 / len) } else { [0.0; 3] }
        } else if area > degenerate_area {
            scale(raw, 1.0 / area)
        } else {
            [0.0; 3]
        };
        if dot(normal, outward) < 0.0 {
            normal = scale(normal, -1.0);
        }
        face_normals.push(normal);
        face_areas.push(area);
    }

    let mut cell_volumes = vec![0.0; ntotal];
    for (i, face) in faces.iter().enumerate() {
        let (fc, n, a) = (face_centers[i], face_normals[i], face_areas[i]);
        cell_volumes[face.left] += dot(sub(fc, cell_centers[face.left]), n) * a;
        if let Some(r) = face.right.filter(|&r| r < ncells) {
            cell_volumes[r] -= dot(sub(fc, cell_centers[r]), n) * a;
        }
    }
    for v in &mut cell_volumes[..ncells] {
        *v /= dimension as f64;
    }

    log::debug!(
        "metrics: {} faces, {ncells} cells, dimension {dimension}, total volume {:.6e}",
        faces.len(),
        cell_volumes[..ncells].iter().sum::<f64>()
    );

    Ok(MeshMetrics {
        dimension,
        face_centers,
        face_normals,
        face_areas,
        cell_centers,
        cell_volumes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::boundary::{PatchOverlapHandling, classify_boundary};
    use crate::data::bc::{BcType, BoundaryPatch, PatchSet};
    use crate::data::geometry::GeometryStore;
    use crate::topology::builder::build_face_topology;
    use crate::topology::cell_type::CellType;

    fn classify(geo: &GeometryStore) -> ClassifiedTopology {
        let all: PatchSet = [BoundaryPatch::new("wall", BcType::Wall, 0..geo.node_count())]
            .into_iter()
            .collect();
        classify_boundary(build_face_topology(geo).unwrap(), &all, PatchOverlapHandling::Ignore)
            .unwrap()
    }

    #[test]
    fn unit_square_split_into_triangles() {
        let mut geo = GeometryStore::new();
        for xy in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            geo.push_node([xy[0], xy[1], 0.0]);
        }
        geo.push_element(CellType::Triangle, vec![0, 1, 2]).unwrap();
        geo.push_element(CellType::Triangle, vec![0, 2, 3]).unwrap();
        let topo = classify(&geo);
        let m = compute_metrics(geo.nodes(), &topo, 1e-12).unwrap();
        assert_eq!(m.dimension, 2);
        assert!((m.cell_volumes[0] - 0.5).abs() < 1e-12);
        assert!((m.cell_volumes[1] - 0.5).abs() < 1e-12);
        assert_eq!(m.cell_centers.len(), 2 + 4);
        // Bottom edge (0,1): normal points down, away from triangle 0.
        assert_eq!(m.face_normals[0], [0.0, -1.0, 0.0]);
        assert!((m.face_areas[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unit_cube_hex() {
        let mut geo = GeometryStore::new();
        for k in 0..2 {
            for (i, j) in [(0, 0), (1, 0), (1, 1), (0, 1)] {
                geo.push_node([i as f64, j as f64, k as f64]);
            }
        }
        geo.push_element(CellType::Hexahedron, (0..8).collect::<Vec<_>>()).unwrap();
        let topo = classify(&geo);
        let m = compute_metrics(geo.nodes(), &topo, 1e-12).unwrap();
        assert!((m.cell_volumes[0] - 1.0).abs() < 1e-12);
        assert_eq!(m.cell_centers[0], [0.5, 0.5, 0.5]);
        for (n, fc) in m.face_normals.iter().zip(&m.face_centers) {
            assert!(dot(*n, sub(*fc, [0.5; 3])) > 0.0);
        }
    }

    #[test]
    fn segments_have_unit_area() {
        let mut geo = GeometryStore::new();
        for x in [0.0, 0.5, 2.0] {
            geo.push_node([x, 0.0, 0.0]);
        }
        geo.push_element(CellType::Segment, vec![0, 1]).unwrap();
        geo.push_element(CellType::Segment, vec![1, 2]).unwrap();
        let topo = classify(&geo);
        let m = compute_metrics(geo.nodes(), &topo, 1e-12).unwrap();
        assert_eq!(m.dimension, 1);
        assert!(m.face_areas.iter().all(|&a| a == 1.0));
        assert!((m.cell_volumes[0] - 0.5).abs() < 1e-12);
        assert!((m.cell_volumes[1] - 1.5).abs() < 1e-12);
    }
}
