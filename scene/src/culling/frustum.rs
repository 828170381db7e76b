//! Bounding spheres and view-frustum containment

use glam::{Mat4, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Bounding sphere used as a cheap proxy volume for visibility tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    /// World-space center.
    pub center: Vec3,
    /// Radius; non-positive radii degenerate to a point test.
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Convex view volume bounded by six half-space planes.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6], // left, right, bottom, top, near, far
}

impl Frustum {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Each plane is `Ax + By + Cz + D = 0` with the normal pointing into
    /// the volume.
    pub fn from_matrix(view_proj: Mat4) -> Self {
        let m = view_proj.to_cols_array();

        let left = Vec4::new(m[3] + m[0], m[7] + m[4], m[11] + m[8], m[15] + m[12]);
        let right = Vec4::new(m[3] - m[0], m[7] - m[4], m[11] - m[8], m[15] - m[12]);
        let bottom = Vec4::new(m[3] + m[1], m[7] + m[5], m[11] + m[9], m[15] + m[13]);
        let top = Vec4::new(m[3] - m[1], m[7] - m[5], m[11] - m[9], m[15] - m[13]);
        // glam projections write [0,1] depth, so the near plane is the z row
        // alone rather than the w+z combination.
        let near = Vec4::new(m[2], m[6], m[10], m[14]);
        let far = Vec4::new(m[3] - m[2], m[7] - m[6], m[11] - m[10], m[15] - m[14]);

        let planes = [
            Self::normalize_plane(left),
            Self::normalize_plane(right),
            Self::normalize_plane(bottom),
            Self::normalize_plane(top),
            Self::normalize_plane(near),
            Self::normalize_plane(far),
        ];

        Self { planes }
    }

    /// Normalize a plane equation so signed distances are in world units.
    fn normalize_plane(plane: Vec4) -> Vec4 {
        let normal_length = plane.truncate().length();
        if normal_length > 0.0 {
            plane / normal_length
        } else {
            plane
        }
    }

    /// Conservative containment test.
    ///
    /// A sphere survives unless it lies entirely on the outside of at least
    /// one plane; a sphere outside a convex corner but inside every
    /// individual plane is kept, trading precision for a single
    /// dot-per-plane.
    pub fn contains_sphere(&self, sphere: &Sphere) -> bool {
        let center = sphere.center.extend(1.0);
        for plane in &self.planes {
            if plane.dot(center) < -sphere.radius {
                return false;
            }
        }
        true
    }

    /// The planes, for debug visualization.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }
}
