//! Ready-made body topologies.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

use super::body::Body;
use super::config::BodyConfig;

/// Create a rope of `segments` links between `start` and `end`.
///
/// The rope has `segments + 1` particles; the first sits at `start` and the
/// last at `end`. A zero segment count is treated as one.
pub fn rope(
    start: Vec3,
    end: Vec3,
    segments: usize,
    radius: f32,
    config: BodyConfig,
) -> Result<Body, BuildError> {
    let segments = segments.max(1);
    let step = (end - start) / segments as f32;

    let particles: Vec<(Vec3, f32)> = (0..=segments)
        .map(|i| (start + step * i as f32, radius))
        .collect();
    let links: Vec<(usize, usize)> = (0..segments).map(|i| (i, i + 1)).collect();

    Body::from_parts(config, &particles, &links)
}

/// Create a `cols` × `rows` lattice in the XZ plane, connected to its
/// horizontal and vertical neighbours.
///
/// Particles are stored row-major starting at `origin`.
pub fn chain_grid(
    origin: Vec3,
    cols: usize,
    rows: usize,
    spacing: f32,
    radius: f32,
    config: BodyConfig,
) -> Result<Body, BuildError> {
    let mut body = Body::new(config);

    for row in 0..rows {
        for col in 0..cols {
            let offset = Vec3::new(col as f32 * spacing, 0.0, row as f32 * spacing);
            body.add_particle(origin + offset, radius);
        }
    }

    for row in 0..rows {
        for col in 0..cols {
            let index = row * cols + col;
            if col + 1 < cols {
                body.connect(index, index + 1)?;
            }
            if row + 1 < rows {
                body.connect(index, index + cols)?;
            }
        }
    }

    Ok(body)
}

/// Named particles of the rig built by [`humanoid`].
///
/// The discriminant is the particle index in the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HumanoidJoint {
    Head = 0,
    Neck = 1,
    Pelvis = 2,
    LeftHand = 3,
    RightHand = 4,
    LeftFoot = 5,
    RightFoot = 6,
}

impl HumanoidJoint {
    pub const ALL: [Self; 7] = [
        Self::Head,
        Self::Neck,
        Self::Pelvis,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rest offset from the feet midpoint for a rig of height 1.
    fn rest_offset(self) -> Vec3 {
        match self {
            Self::Head => Vec3::new(0.0, 0.95, 0.0),
            Self::Neck => Vec3::new(0.0, 0.8, 0.0),
            Self::Pelvis => Vec3::new(0.0, 0.5, 0.0),
            Self::LeftHand => Vec3::new(-0.3, 0.5, 0.0),
            Self::RightHand => Vec3::new(0.3, 0.5, 0.0),
            Self::LeftFoot => Vec3::new(-0.12, 0.05, 0.0),
            Self::RightFoot => Vec3::new(0.12, 0.05, 0.0),
        }
    }

    fn radius(self) -> f32 {
        match self {
            Self::Head => 0.1,
            Self::Pelvis => 0.08,
            _ => 0.05,
        }
    }
}

/// Create a stick-figure rig standing on `root` (the feet midpoint).
///
/// `scale` is the rig's height. Besides the limbs, the torso is braced from
/// the head and neck to the feet so the rig keeps its shape when dropped.
pub fn humanoid(root: Vec3, scale: f32, config: BodyConfig) -> Result<Body, BuildError> {
    use HumanoidJoint::*;

    let particles: Vec<(Vec3, f32)> = HumanoidJoint::ALL
        .iter()
        .map(|joint| (root + joint.rest_offset() * scale, joint.radius() * scale))
        .collect();

    let bones = [
        // Skeleton
        (Head, Neck),
        (Neck, Pelvis),
        (Neck, LeftHand),
        (Neck, RightHand),
        (Pelvis, LeftFoot),
        (Pelvis, RightFoot),
        // Bracing
        (Head, Pelvis),
        (LeftFoot, RightFoot),
        (Neck, LeftFoot),
        (Neck, RightFoot),
    ];
    let links: Vec<(usize, usize)> = bones.iter().map(|(a, b)| (a.index(), b.index())).collect();

    Body::from_parts(config, &particles, &links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rope_topology() {
        let body = rope(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 5, 0.1, BodyConfig::rope()).unwrap();
        assert_eq!(body.len(), 6);
        assert_eq!(body.constraints().len(), 5);
        for c in body.constraints() {
            assert!((c.rest_length() - 2.0).abs() < 1e-5);
        }
        assert_eq!(body.last().position, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_rope_zero_length_rejected() {
        let result = rope(Vec3::ONE, Vec3::ONE, 3, 0.1, BodyConfig::rope());
        assert!(matches!(result, Err(BuildError::DegenerateConstraint { .. })));
    }

    #[test]
    fn test_chain_grid_topology() {
        let body = chain_grid(Vec3::ZERO, 4, 3, 0.5, 0.05, BodyConfig::default()).unwrap();
        assert_eq!(body.len(), 12);
        // 3 rows * 3 horizontal + 2 * 4 vertical
        assert_eq!(body.constraints().len(), 17);
    }

    #[test]
    fn test_humanoid_joints() {
        let body = humanoid(Vec3::ZERO, 1.8, BodyConfig::ragdoll()).unwrap();
        assert_eq!(body.len(), HumanoidJoint::ALL.len());

        let head = body.particle(HumanoidJoint::Head.index()).unwrap();
        let foot = body.particle(HumanoidJoint::LeftFoot.index()).unwrap();
        assert!(head.position.y > foot.position.y);
    }
}
