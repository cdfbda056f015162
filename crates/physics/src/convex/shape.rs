//! Convex shape storage and the transform pipeline.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::aabb::Aabb;
use crate::error::BuildError;

use super::transform::Transform;

/// A rigid convex polyhedron.
///
/// The local point cloud and face list are fixed at construction. World-space
/// points, face normals and the bounding box are caches that every transform
/// mutation refreshes before returning, so queries never see stale data.
///
/// Faces are index lists into the point array, wound counter-clockwise as
/// seen from outside. A shape with no faces still answers queries using its
/// vertices and edges.
///
/// Only the points, faces and transform are serialized. Deserializing runs
/// the same validation as [`ConvexShape::new`] and rebuilds the caches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ShapeData")]
pub struct ConvexShape {
    local_points: Vec<Vec3>,
    faces: Vec<Vec<usize>>,
    transform: Transform,

    // Derived from the above in `update_transform`
    #[serde(skip_serializing)]
    world_points: Vec<Vec3>,
    #[serde(skip_serializing)]
    world_normals: Vec<Vec3>,
    #[serde(skip_serializing)]
    bounding_box: Aabb,
}

/// Serialized form of a [`ConvexShape`].
#[derive(Deserialize)]
struct ShapeData {
    local_points: Vec<Vec3>,
    #[serde(default)]
    faces: Vec<Vec<usize>>,
    #[serde(default)]
    transform: Transform,
}

impl TryFrom<ShapeData> for ConvexShape {
    type Error = BuildError;

    fn try_from(data: ShapeData) -> Result<Self, Self::Error> {
        if !data.transform.is_finite() {
            return Err(BuildError::NonFinite);
        }
        let mut shape = Self::new(data.local_points, data.faces)?;
        shape.set_transform(data.transform);
        Ok(shape)
    }
}

impl ConvexShape {
    /// Build a shape from local points and faces, with an identity transform.
    ///
    /// Every face needs at least three indices and every index must be in
    /// range. Points must be finite.
    pub fn new(points: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Result<Self, BuildError> {
        if points.is_empty() {
            return Err(BuildError::EmptyShape);
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(BuildError::NonFinite);
        }

        let count = points.len();
        for (face, indices) in faces.iter().enumerate() {
            if indices.len() < 3 {
                return Err(BuildError::DegenerateFace {
                    face,
                    len: indices.len(),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i >= count) {
                return Err(BuildError::FaceIndexOutOfRange { face, index, count });
            }
        }

        let mut shape = Self {
            world_points: points.clone(),
            world_normals: vec![Vec3::ZERO; faces.len()],
            local_points: points,
            faces,
            transform: Transform::IDENTITY,
            bounding_box: Aabb::default(),
        };
        shape.update_transform();
        Ok(shape)
    }

    /// Build a faceless shape. Queries fall back to vertices and edges.
    pub fn from_points(points: Vec<Vec3>) -> Result<Self, BuildError> {
        Self::new(points, Vec::new())
    }

    // ========================================================================
    // Transform
    // ========================================================================

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.update_transform();
    }

    pub fn set_orientation(&mut self, orientation: Quat) {
        self.transform.orientation = orientation;
        self.update_transform();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
        self.update_transform();
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
        self.update_transform();
    }

    /// Change several transform components and commit once.
    ///
    /// ```
    /// use glam::{Quat, Vec3};
    /// use tether_physics::cuboid;
    ///
    /// let mut shape = cuboid(Vec3::ONE).unwrap();
    /// shape.edit_transform(|t| {
    ///     t.position = Vec3::new(0.0, 2.0, 0.0);
    ///     t.orientation = Quat::from_rotation_y(0.5);
    /// });
    /// ```
    pub fn edit_transform<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut Transform),
    {
        edit(&mut self.transform);
        self.update_transform();
    }

    /// Recompute world points, face normals and the bounding box.
    ///
    /// A zero or non-finite orientation is treated as identity.
    pub fn update_transform(&mut self) {
        let matrix = self.transform.matrix();

        self.world_points.resize(self.local_points.len(), Vec3::ZERO);
        for (world, local) in self.world_points.iter_mut().zip(&self.local_points) {
            *world = matrix.transform_point3(*local);
        }

        self.world_normals.resize(self.faces.len(), Vec3::ZERO);
        for (normal, face) in self.world_normals.iter_mut().zip(&self.faces) {
            *normal = newell_normal(&self.world_points, face);
        }

        self.bounding_box = Aabb::from_points(self.world_points.iter().copied());
    }

    // ========================================================================
    // Access
    // ========================================================================

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn orientation(&self) -> Quat {
        self.transform.orientation
    }

    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    pub fn local_points(&self) -> &[Vec3] {
        &self.local_points
    }

    pub fn world_points(&self) -> &[Vec3] {
        &self.world_points
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Outward unit normal of a face in world space.
    ///
    /// Zero for collinear (degenerate) faces.
    pub fn face_normal(&self, face: usize) -> Option<Vec3> {
        self.world_normals.get(face).copied()
    }

    pub(crate) fn world_normals(&self) -> &[Vec3] {
        &self.world_normals
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bounding_box
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    /// Average of the world points.
    pub fn centroid(&self) -> Vec3 {
        let sum: Vec3 = self.world_points.iter().copied().sum();
        sum / self.world_points.len() as f32
    }
}

/// Unit polygon normal by Newell's method.
///
/// Robust to slightly non-planar faces. Counter-clockwise winding seen from
/// outside gives an outward normal.
fn newell_normal(points: &[Vec3], face: &[usize]) -> Vec3 {
    let mut normal = Vec3::ZERO;

    for (i, &index) in face.iter().enumerate() {
        let current = points[index];
        let next = points[face[(i + 1) % face.len()]];

        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }

    normal.normalize_or_zero()
}
