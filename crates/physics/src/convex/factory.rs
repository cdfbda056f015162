//! Shape factories.
//!
//! Free functions returning fully formed shapes with an identity transform.

use glam::Vec3;

use crate::error::BuildError;

use super::shape::ConvexShape;

/// Box faces over corners indexed by `x | y << 1 | z << 2` (bit set = positive
/// side). Counter-clockwise from outside, ordered -X, +X, -Y, +Y, -Z, +Z.
const BOX_FACES: [[usize; 4]; 6] = [
    [0, 4, 6, 2],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 6, 7, 3],
    [0, 2, 3, 1],
    [4, 5, 7, 6],
];

/// Above this |dot| with the beam direction, the up reference switches axes.
const PARALLEL_THRESHOLD: f32 = 0.99;

/// Corners of the box spanned by `center ± x ± y ± z`, in `BOX_FACES` order.
///
/// `(x, y, z)` must be right-handed for the winding to stay outward.
fn box_corners(center: Vec3, x: Vec3, y: Vec3, z: Vec3) -> Vec<Vec3> {
    (0..8)
        .map(|i| {
            let sx = if i & 1 != 0 { 1.0 } else { -1.0 };
            let sy = if i & 2 != 0 { 1.0 } else { -1.0 };
            let sz = if i & 4 != 0 { 1.0 } else { -1.0 };
            center + x * sx + y * sy + z * sz
        })
        .collect()
}

fn box_faces() -> Vec<Vec<usize>> {
    BOX_FACES.iter().map(|f| f.to_vec()).collect()
}

/// Axis-aligned box centred on the local origin.
pub fn cuboid(half_extents: Vec3) -> Result<ConvexShape, BuildError> {
    let corners = box_corners(
        Vec3::ZERO,
        Vec3::X * half_extents.x,
        Vec3::Y * half_extents.y,
        Vec3::Z * half_extents.z,
    );
    ConvexShape::new(corners, box_faces())
}

/// Square-section box running from `start` to `end`.
///
/// The cross-section basis comes from a +Y up reference, switching to +X
/// when the beam is (nearly) vertical. Points are placed directly in world
/// coordinates, so the transform stays identity.
pub fn beam(start: Vec3, end: Vec3, half_width: f32) -> Result<ConvexShape, BuildError> {
    if !start.is_finite() || !end.is_finite() {
        return Err(BuildError::NonFinite);
    }
    let axis = end - start;
    let length = axis.length();
    if length < f32::EPSILON {
        return Err(BuildError::DegenerateBeam);
    }

    let direction = axis / length;
    let up = if direction.dot(Vec3::Y).abs() > PARALLEL_THRESHOLD {
        Vec3::X
    } else {
        Vec3::Y
    };
    let right = up.cross(direction).normalize();
    let up = direction.cross(right);

    let corners = box_corners(
        (start + end) * 0.5,
        right * half_width,
        up * half_width,
        axis * 0.5,
    );
    ConvexShape::new(corners, box_faces())
}

/// Extrude a convex polygon in the XZ plane upward by `height`.
///
/// `base` is wound counter-clockwise seen from above. Base points keep their
/// Y; the top ring is offset by `height`.
pub fn prism(base: &[Vec3], height: f32) -> Result<ConvexShape, BuildError> {
    let n = base.len();
    if n < 3 {
        return Err(BuildError::DegeneratePrism(n));
    }

    let mut points = Vec::with_capacity(n * 2);
    points.extend_from_slice(base);
    points.extend(base.iter().map(|p| *p + Vec3::Y * height));

    let mut faces = Vec::with_capacity(n + 2);
    // Bottom cap faces down: reverse the winding
    faces.push((0..n).rev().collect());
    // Top cap faces up
    faces.push((n..2 * n).collect());
    for i in 0..n {
        let j = (i + 1) % n;
        faces.push(vec![i, j, n + j, n + i]);
    }

    ConvexShape::new(points, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(shape: &ConvexShape) {
        let center = shape.centroid();
        for (f, face) in shape.faces().iter().enumerate() {
            let normal = shape.face_normal(f).unwrap();
            let on_face = shape.world_points()[face[0]];
            assert!(
                normal.dot(on_face - center) > 0.0,
                "face {f} normal {normal:?} points inward"
            );
        }
    }

    #[test]
    fn test_cuboid() {
        let shape = cuboid(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(shape.world_points().len(), 8);
        assert_eq!(shape.faces().len(), 6);
        assert_eq!(shape.bounding_box().max, Vec3::new(1.0, 2.0, 3.0));
        assert_outward(&shape);
    }

    #[test]
    fn test_beam_horizontal() {
        let shape = beam(Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0), 0.25).unwrap();
        let aabb = shape.bounding_box();
        assert!(aabb.min.abs_diff_eq(Vec3::new(0.0, -0.25, -0.25), 1e-5), "{aabb:?}");
        assert!(aabb.max.abs_diff_eq(Vec3::new(4.0, 0.25, 0.25), 1e-5), "{aabb:?}");
        assert_outward(&shape);
    }

    #[test]
    fn test_beam_vertical_uses_fallback_up() {
        let shape = beam(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0), 0.5).unwrap();
        assert!(shape.world_points().iter().all(|p| p.is_finite()));
        let aabb = shape.bounding_box();
        assert!(aabb.max.abs_diff_eq(Vec3::new(0.5, 3.0, 0.5), 1e-5), "{aabb:?}");
        assert_outward(&shape);
    }

    #[test]
    fn test_beam_degenerate() {
        assert_eq!(
            beam(Vec3::ONE, Vec3::ONE, 0.5).unwrap_err(),
            BuildError::DegenerateBeam
        );
    }

    #[test]
    fn test_prism() {
        let triangle = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        ];
        let shape = prism(&triangle, 1.0).unwrap();
        assert_eq!(shape.world_points().len(), 6);
        assert_eq!(shape.faces().len(), 5);
        assert_outward(&shape);
        assert!(shape.face_normal(1).unwrap().abs_diff_eq(Vec3::Y, 1e-6));
    }
}
