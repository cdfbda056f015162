//! Level loading and sphere-vs-level collision.
//!
//! Levels are authored as a [`LevelDef`] (plain serde data, usually JSON) and
//! built into a [`Level`] holding ready-to-query convex shapes.

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tether_physics::{beam, cuboid, BuildError, ConvexShape};

/// Errors raised while loading or building a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("failed to read level file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("shape {index} is invalid: {source}")]
    Shape {
        index: usize,
        #[source]
        source: BuildError,
    },

    #[error("rope {index} is invalid: {source}")]
    Rope {
        index: usize,
        #[source]
        source: BuildError,
    },
}

// ============================================================================
// Definitions
// ============================================================================

/// Serialized description of a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDef {
    /// Display name.
    pub name: String,

    /// Where the player starts.
    #[serde(default)]
    pub spawn: Vec3,

    /// Static collision geometry.
    pub shapes: Vec<ShapeDef>,

    /// Ropes to hang when the simulation starts.
    #[serde(default)]
    pub ropes: Vec<RopeDef>,
}

/// One piece of static geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDef {
    /// Oriented box.
    Box {
        center: Vec3,
        half_extents: Vec3,
        #[serde(default)]
        rotation: Quat,
    },

    /// Square-section beam between two points.
    Beam {
        start: Vec3,
        end: Vec3,
        half_width: f32,
    },

    /// Arbitrary convex hull. With no faces, queries use vertices and edges.
    Hull {
        points: Vec<Vec3>,
        #[serde(default)]
        faces: Vec<Vec<usize>>,
        #[serde(default)]
        position: Vec3,
    },
}

/// A rope hanging from a fixed anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopeDef {
    /// Pinned end.
    pub anchor: Vec3,

    /// Initial position of the free end.
    pub end: Vec3,

    /// Number of links.
    pub segments: usize,

    /// Collision radius of each particle.
    pub radius: f32,
}

impl ShapeDef {
    /// Build the world-space shape.
    pub fn build(&self) -> Result<ConvexShape, BuildError> {
        match self {
            ShapeDef::Box {
                center,
                half_extents,
                rotation,
            } => {
                let length = rotation.length();
                if !length.is_finite() || length < f32::EPSILON {
                    return Err(BuildError::NonFinite);
                }

                let mut shape = cuboid(*half_extents)?;
                let orientation = *rotation / length;
                shape.edit_transform(|t| {
                    t.position = *center;
                    t.orientation = orientation;
                });
                Ok(shape)
            }
            ShapeDef::Beam {
                start,
                end,
                half_width,
            } => beam(*start, *end, *half_width),
            ShapeDef::Hull {
                points,
                faces,
                position,
            } => {
                if !position.is_finite() {
                    return Err(BuildError::NonFinite);
                }
                let mut shape = ConvexShape::new(points.clone(), faces.clone())?;
                shape.set_position(*position);
                Ok(shape)
            }
        }
    }
}

impl LevelDef {
    /// Parse a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LevelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A walled arena with a pillar, a tilted crate, a ramp beam, a pyramid
    /// and two ropes.
    pub fn test_arena() -> Self {
        let arena_size = 20.0;
        let wall_height = 5.0;
        let wall_thickness = 0.5;

        let wall = |center: Vec3, half_extents: Vec3| ShapeDef::Box {
            center,
            half_extents,
            rotation: Quat::IDENTITY,
        };

        let shapes = vec![
            // Floor, top face at y = 0
            wall(Vec3::new(0.0, -0.5, 0.0), Vec3::new(arena_size, 0.5, arena_size)),
            // North and south walls
            wall(
                Vec3::new(0.0, wall_height / 2.0, -arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            wall(
                Vec3::new(0.0, wall_height / 2.0, arena_size),
                Vec3::new(arena_size, wall_height / 2.0, wall_thickness),
            ),
            // East and west walls
            wall(
                Vec3::new(arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
            wall(
                Vec3::new(-arena_size, wall_height / 2.0, 0.0),
                Vec3::new(wall_thickness, wall_height / 2.0, arena_size),
            ),
            // Central pillar
            wall(Vec3::new(0.0, 2.0, 0.0), Vec3::splat(2.0)),
            // Tilted crate
            ShapeDef::Box {
                center: Vec3::new(-8.0, 1.0, 6.0),
                half_extents: Vec3::ONE,
                rotation: Quat::from_rotation_y(0.6),
            },
            // Ramp
            ShapeDef::Beam {
                start: Vec3::new(-6.0, 0.5, -8.0),
                end: Vec3::new(6.0, 3.5, -8.0),
                half_width: 0.4,
            },
            // Square pyramid
            ShapeDef::Hull {
                points: vec![
                    Vec3::new(-1.0, 0.0, -1.0),
                    Vec3::new(1.0, 0.0, -1.0),
                    Vec3::new(1.0, 0.0, 1.0),
                    Vec3::new(-1.0, 0.0, 1.0),
                    Vec3::new(0.0, 1.5, 0.0),
                ],
                faces: vec![
                    vec![0, 1, 2, 3],
                    vec![1, 0, 4],
                    vec![2, 1, 4],
                    vec![3, 2, 4],
                    vec![0, 3, 4],
                ],
                position: Vec3::new(10.0, 0.0, 8.0),
            },
        ];

        let ropes = vec![
            // Swings free beside the pillar
            RopeDef {
                anchor: Vec3::new(8.0, 6.0, -3.0),
                end: Vec3::new(12.0, 6.0, -3.0),
                segments: 8,
                radius: 0.1,
            },
            // Drapes over the pillar top
            RopeDef {
                anchor: Vec3::new(0.0, 7.0, 0.0),
                end: Vec3::new(0.0, 7.0, 3.0),
                segments: 6,
                radius: 0.1,
            },
        ];

        Self {
            name: "Test Arena".to_string(),
            spawn: Vec3::new(0.0, 1.0, 10.0),
            shapes,
            ropes,
        }
    }
}

// ============================================================================
// Level
// ============================================================================

/// Result of pushing a sphere out of the level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereContact {
    /// Sphere centre after every push.
    pub center: Vec3,

    /// Sum of all pushes applied.
    pub push: Vec3,

    /// Largest upward component of any single push direction, 0 without
    /// contact. Near 1 means the sphere is resting on a floor.
    pub support: f32,
}

impl SphereContact {
    pub fn touched(&self) -> bool {
        self.push != Vec3::ZERO
    }
}

/// A built level: convex geometry plus the rope layout.
#[derive(Debug, Clone)]
pub struct Level {
    /// Display name.
    pub name: String,

    /// Player start.
    pub spawn: Vec3,

    /// Static collision shapes, in definition order.
    pub shapes: Vec<ConvexShape>,

    /// Ropes for the simulation to spawn.
    pub ropes: Vec<RopeDef>,
}

impl Level {
    /// Build every shape of `def`.
    pub fn from_def(def: &LevelDef) -> Result<Self, LevelError> {
        let shapes = def
            .shapes
            .iter()
            .enumerate()
            .map(|(index, shape)| {
                shape
                    .build()
                    .map_err(|source| LevelError::Shape { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Built level '{}': {} shapes, {} ropes",
            def.name,
            shapes.len(),
            def.ropes.len()
        );

        Ok(Self {
            name: def.name.clone(),
            spawn: def.spawn,
            shapes,
            ropes: def.ropes.clone(),
        })
    }

    /// Parse and build a level from JSON.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Self::from_def(&LevelDef::from_json(json)?)
    }

    /// Read, parse and build a level file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Built version of [`LevelDef::test_arena`].
    pub fn test_arena() -> Result<Self, LevelError> {
        Self::from_def(&LevelDef::test_arena())
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// One pass over every shape, moving the sphere out of each in turn.
    ///
    /// Returns the total push, or `None` if nothing overlapped.
    pub fn push_out(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let mut moved = center;
        for shape in &self.shapes {
            if let Some(mtv) = shape.collide_with_sphere(moved, radius) {
                moved += mtv;
            }
        }
        (moved != center).then_some(moved - center)
    }

    /// Push a sphere out of the level geometry.
    ///
    /// Runs up to `iterations` passes over every shape, stopping early once a
    /// pass finds no overlap. Corners where two shapes meet may need more
    /// than one pass.
    pub fn resolve_sphere(&self, center: Vec3, radius: f32, iterations: usize) -> SphereContact {
        let mut contact = SphereContact {
            center,
            push: Vec3::ZERO,
            support: 0.0,
        };

        for _ in 0..iterations {
            let mut hit = false;

            for shape in &self.shapes {
                if let Some(mtv) = shape.collide_with_sphere(contact.center, radius) {
                    contact.center += mtv;
                    contact.push += mtv;
                    contact.support = contact.support.max(mtv.normalize_or_zero().y);
                    hit = true;
                }
            }

            if !hit {
                break;
            }
        }

        contact
    }
}
