//! Closest-point and sphere-penetration queries.
//!
//! Every query is read-only and safe to call any number of times per tick.

use glam::Vec3;

use crate::aabb::Aabb;

use super::shape::ConvexShape;

/// Faceless shapes up to this many points are searched exhaustively.
const EXHAUSTIVE_POINT_LIMIT: usize = 8;

/// Upper bound on hill-climbing steps for large faceless shapes.
const MAX_CLIMB_STEPS: usize = 64;

/// Tolerance for point-in-polygon and half-space tests.
const PLANE_EPSILON: f32 = 1e-5;

/// Separation direction when the sphere centre sits exactly on the surface.
const FALLBACK_DIRECTION: Vec3 = Vec3::Y;

impl ConvexShape {
    /// Closest point on the shape's surface to `point`.
    ///
    /// With faces, this is exact: the minimum over face-plane projections that
    /// land inside their polygon, every edge, and every vertex. Points inside
    /// the shape get the nearest surface point.
    ///
    /// Faceless shapes with at most eight points check every vertex and every
    /// vertex pair as a segment. Larger faceless shapes use a greedy hill
    /// climb toward the vertices, which is **approximate**: it trades exactness
    /// for a bounded cost and can stop short of the true closest point.
    ///
    /// Only the hill climb starts from the query clamped to the bounding box.
    /// The exact searches do not short-circuit on it, since the clamped point
    /// is generally not on the surface.
    pub fn find_closest_point(&self, point: Vec3) -> Vec3 {
        if self.has_faces() {
            self.closest_on_faces(point)
        } else if self.world_points().len() <= EXHAUSTIVE_POINT_LIMIT {
            self.closest_on_vertex_pairs(point)
        } else {
            self.closest_by_hill_climb(point)
        }
    }

    /// Minimum translation vector pushing a sphere out of the shape.
    ///
    /// Returns `None` when the sphere does not overlap. Otherwise the returned
    /// vector points from the shape toward the sphere and its length is the
    /// penetration depth along the chosen axis. Touching counts as separated.
    ///
    /// Shapes with faces run a separating-axis test over face normals only.
    /// Faceless shapes fall back to the closest-point query.
    pub fn collide_with_sphere(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        if !self
            .bounding_box()
            .intersects(&Aabb::around_sphere(center, radius))
        {
            return None;
        }

        // (depth, axis pointing toward the sphere)
        let mut best: Option<(f32, Vec3)> = None;

        for &normal in self.world_normals() {
            if normal == Vec3::ZERO {
                continue;
            }

            let (min, max) = self.project(normal);
            let c = center.dot(normal);

            if c + radius <= min || c - radius >= max {
                return None;
            }

            let depth = (max - (c - radius)).min((c + radius) - min);
            let axis = if c > (min + max) * 0.5 { normal } else { -normal };

            if best.map_or(true, |(best_depth, _)| depth < best_depth) {
                best = Some((depth, axis));
            }
        }

        match best {
            Some((depth, axis)) => Some(axis * depth),
            None => self.sphere_against_closest_point(center, radius),
        }
    }

    /// Check if a point lies inside every face plane.
    ///
    /// Faceless shapes have no interior and always return `false`.
    pub fn contains_point(&self, point: Vec3) -> bool {
        if !self.has_faces() || !self.bounding_box().expanded(PLANE_EPSILON).contains(point) {
            return false;
        }

        self.faces()
            .iter()
            .zip(self.world_normals())
            .all(|(face, &normal)| {
                normal.dot(point - self.world_points()[face[0]]) <= PLANE_EPSILON
            })
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    /// Interval of the world points projected onto `axis`.
    fn project(&self, axis: Vec3) -> (f32, f32) {
        self.world_points()
            .iter()
            .map(|p| p.dot(axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| {
                (lo.min(d), hi.max(d))
            })
    }

    fn closest_on_faces(&self, point: Vec3) -> Vec3 {
        let points = self.world_points();
        let mut best = Closest::new(point);

        for (face, &normal) in self.faces().iter().zip(self.world_normals()) {
            if normal != Vec3::ZERO {
                let on_plane = point - normal * normal.dot(point - points[face[0]]);
                if point_in_polygon(on_plane, points, face, normal) {
                    best.consider(on_plane);
                }
            }

            // Edges cover both the outside-polygon fallback and the edge pass
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                best.consider(closest_on_segment(point, points[a], points[b]));
            }
        }

        for &vertex in points {
            best.consider(vertex);
        }

        best.point
    }

    fn closest_on_vertex_pairs(&self, point: Vec3) -> Vec3 {
        let points = self.world_points();
        let mut best = Closest::new(point);

        for (i, &a) in points.iter().enumerate() {
            best.consider(a);
            for &b in &points[i + 1..] {
                best.consider(closest_on_segment(point, a, b));
            }
        }

        best.point
    }

    /// Greedy approximation for large faceless shapes.
    ///
    /// Seeded with the vertex nearest the query clamped into the bounding
    /// box, then repeatedly moves halfway toward whichever vertex improves the
    /// estimate most. Stops when no vertex helps.
    fn closest_by_hill_climb(&self, point: Vec3) -> Vec3 {
        let points = self.world_points();
        let seed_target = self.bounding_box().clamp(point);

        let mut estimate = points
            .iter()
            .copied()
            .min_by(|a, b| {
                a.distance_squared(seed_target)
                    .total_cmp(&b.distance_squared(seed_target))
            })
            .unwrap_or(seed_target);
        let mut estimate_sq = estimate.distance_squared(point);

        for _ in 0..MAX_CLIMB_STEPS {
            let mut step = None;
            for &vertex in points {
                let candidate = (estimate + vertex) * 0.5;
                let candidate_sq = candidate.distance_squared(point);
                if candidate_sq < estimate_sq {
                    estimate_sq = candidate_sq;
                    step = Some(candidate);
                }
            }

            match step {
                Some(next) => estimate = next,
                None => break,
            }
        }

        estimate
    }

    fn sphere_against_closest_point(&self, center: Vec3, radius: f32) -> Option<Vec3> {
        let closest = self.find_closest_point(center);
        let offset = center - closest;
        let distance = offset.length();

        if distance >= radius {
            return None;
        }

        let direction = if distance < f32::EPSILON {
            FALLBACK_DIRECTION
        } else {
            offset / distance
        };
        Some(direction * (radius - distance))
    }
}

/// Running minimum over candidate points by squared distance to a target.
struct Closest {
    target: Vec3,
    point: Vec3,
    distance_sq: f32,
}

impl Closest {
    fn new(target: Vec3) -> Self {
        Self {
            target,
            point: target,
            distance_sq: f32::INFINITY,
        }
    }

    #[inline]
    fn consider(&mut self, candidate: Vec3) {
        let d = candidate.distance_squared(self.target);
        if d < self.distance_sq {
            self.distance_sq = d;
            self.point = candidate;
        }
    }
}

/// Closest point to `p` on segment `a`–`b`.
#[inline]
fn closest_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq < f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Point-in-convex-polygon test for a point already on the face plane.
///
/// With counter-clockwise winding about `normal`, the point is inside when
/// every edge cross product agrees in sign with the normal.
fn point_in_polygon(p: Vec3, points: &[Vec3], face: &[usize], normal: Vec3) -> bool {
    face.iter().enumerate().all(|(i, &a)| {
        let a = points[a];
        let b = points[face[(i + 1) % face.len()]];
        (b - a).cross(p - a).dot(normal) >= -PLANE_EPSILON
    })
}
