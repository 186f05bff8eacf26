//! Simple closed meshes for tests, benches, and the CLI.

use std::f64::consts::PI;

use meshcast_math::Point3;

use crate::aabb::Aabb3;
use crate::mesh::TriangleMesh;

/// Closed box mesh (12 triangles) spanning `bounds`.
pub fn make_box(bounds: &Aabb3) -> TriangleMesh {
    let vertices = bounds
        .corners()
        .iter()
        .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
        .collect();

    // Corner bits: 1 = +x, 2 = +y, 4 = +z. Outward counter-clockwise winding.
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 3,  0, 3, 1, // -z
        4, 5, 7,  4, 7, 6, // +z
        0, 1, 5,  0, 5, 4, // -y
        2, 6, 7,  2, 7, 3, // +y
        0, 4, 6,  0, 6, 2, // -x
        1, 3, 7,  1, 7, 5, // +x
    ];

    TriangleMesh::indexed(vertices, indices)
}

/// Axis-aligned cube of edge `size` with its minimum corner at the origin.
pub fn make_cube(size: f64) -> TriangleMesh {
    make_box(&Aabb3::new(Point3::origin(), Point3::new(size, size, size)))
}

/// UV sphere centered at the origin.
///
/// `rings` latitude bands and `segments` longitude slices; both are clamped
/// to at least 3.
pub fn make_sphere(radius: f64, rings: u32, segments: u32) -> TriangleMesh {
    let rings = rings.max(3);
    let segments = segments.max(3);

    let mut vertices = Vec::new();
    for r in 0..=rings {
        let theta = PI * r as f64 / rings as f64;
        for s in 0..=segments {
            let phi = 2.0 * PI * s as f64 / segments as f64;
            vertices.extend_from_slice(&[
                (radius * theta.sin() * phi.cos()) as f32,
                (radius * theta.cos()) as f32,
                (radius * theta.sin() * phi.sin()) as f32,
            ]);
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::new();
    for r in 0..rings {
        for s in 0..segments {
            let a = r * stride + s;
            let b = a + stride;
            if r != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if r != rings - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    TriangleMesh::indexed(vertices, indices)
}
