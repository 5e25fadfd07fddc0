use std::f32::consts::PI;

use crate::types::MeshVertex;

/// Unit-radius UV sphere used as the raster proxy for every scene object
#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn new(segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);

        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let p = [ring_radius * theta.cos(), y, ring_radius * theta.sin()];
                vertices.push(MeshVertex {
                    position: p,
                    normal: p,
                });
            }
        }

        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
        for ring in 0..rings {
            for seg in 0..segments {
                let current = ring * (segments + 1) + seg;
                let next = current + segments + 1;
                indices.extend_from_slice(&[current, next, current + 1, current + 1, next, next + 1]);
            }
        }

        Self { vertices, indices }
    }
}

impl Default for SphereMesh {
    fn default() -> Self {
        Self::new(32, 16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_lie_on_unit_sphere() {
        let mesh = SphereMesh::new(8, 4);
        for v in &mesh.vertices {
            let [x, y, z] = v.position;
            assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn index_count_and_range() {
        let mesh = SphereMesh::new(8, 4);
        assert_eq!(mesh.indices.len(), 8 * 4 * 6);
        assert_eq!(mesh.vertices.len(), 9 * 5);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn degenerate_counts_are_raised() {
        let mesh = SphereMesh::new(0, 0);
        assert_eq!(mesh.indices.len(), 3 * 2 * 6);
    }
}
