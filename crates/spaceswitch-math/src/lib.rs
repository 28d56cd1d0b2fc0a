#![warn(missing_docs)]

//! Math types for rig space switching.
//!
//! Thin wrappers around nalgebra providing the transform operations the
//! switch/match engine needs: composition, inversion, reparenting,
//! translate/rotate/scale composition and decomposition, and Euler angle
//! extraction under any of the six rotation orders a host can declare.
//!
//! Matrices use column vectors, so a child's world matrix is
//! `parent_world * local`. A host that stores row vectors writes the same
//! relation as `local * parent_world`; the two are transposes of each other.

use nalgebra::{Matrix3, Matrix4, Vector3};
use serde::{Deserialize, Serialize};

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Order in which the three axis rotations of an Euler triple are applied.
///
/// `Xyz` rotates about X first, then Y, then Z. The discriminants follow the
/// host's `rotateOrder` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationOrder {
    /// X, then Y, then Z.
    #[default]
    Xyz = 0,
    /// Y, then Z, then X.
    Yzx = 1,
    /// Z, then X, then Y.
    Zxy = 2,
    /// X, then Z, then Y.
    Xzy = 3,
    /// Y, then X, then Z.
    Yxz = 4,
    /// Z, then Y, then X.
    Zyx = 5,
}

impl RotationOrder {
    /// All six orders, indexed by the host enum value.
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::Xyz,
        RotationOrder::Yzx,
        RotationOrder::Zxy,
        RotationOrder::Xzy,
        RotationOrder::Yxz,
        RotationOrder::Zyx,
    ];

    /// Look up an order from the host enum value.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Axis indices `(first, second, third)` in application order.
    pub fn axes(self) -> (usize, usize, usize) {
        match self {
            RotationOrder::Xyz => (0, 1, 2),
            RotationOrder::Yzx => (1, 2, 0),
            RotationOrder::Zxy => (2, 0, 1),
            RotationOrder::Xzy => (0, 2, 1),
            RotationOrder::Yxz => (1, 0, 2),
            RotationOrder::Zyx => (2, 1, 0),
        }
    }

    /// `1.0` for cyclic (even) axis permutations, `-1.0` otherwise.
    fn parity(self) -> f64 {
        match self {
            RotationOrder::Xyz | RotationOrder::Yzx | RotationOrder::Zxy => 1.0,
            RotationOrder::Xzy | RotationOrder::Yxz | RotationOrder::Zyx => -1.0,
        }
    }
}

/// Translation, rotation and scale pulled out of an affine matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposed {
    /// Translation component.
    pub translation: Vec3,
    /// Pure rotation (orthonormal, no translation).
    pub rotation: Transform,
    /// Per-axis scale factors.
    pub scale: Vec3,
}

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 2)] = s;
        m[(2, 0)] = -s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(0, 0)] = c;
        m[(0, 1)] = -s;
        m[(1, 0)] = s;
        m[(1, 1)] = c;
        Self { matrix: m }
    }

    fn rotation_about(axis: usize, angle: f64) -> Self {
        match axis {
            0 => Self::rotation_x(angle),
            1 => Self::rotation_y(angle),
            _ => Self::rotation_z(angle),
        }
    }

    /// Rotation from Euler angles in radians, indexed by axis (x, y, z),
    /// applied in `order`.
    pub fn from_euler(angles: &Vec3, order: RotationOrder) -> Self {
        let (i, j, k) = order.axes();
        Self::rotation_about(k, angles[k])
            .then(&Self::rotation_about(j, angles[j]))
            .then(&Self::rotation_about(i, angles[i]))
    }

    /// Euler angles in radians (indexed by axis) that reproduce the rotation
    /// part of this transform under `order`.
    ///
    /// This is the only place rotations are turned back into angles. Scale is
    /// removed first. At gimbal lock the last axis is pinned to zero.
    pub fn to_euler(&self, order: RotationOrder) -> Vec3 {
        let r = self.rotation_part().matrix;
        let (i, j, k) = order.axes();
        let s = order.parity();

        let sin_b = (-s * r[(k, i)]).clamp(-1.0, 1.0);
        let b = sin_b.asin();
        let cos_b = b.cos();

        let (a, c) = if cos_b.abs() > Tolerance::DEFAULT.angular {
            (
                (s * r[(k, j)]).atan2(r[(k, k)]),
                (s * r[(j, i)]).atan2(r[(i, i)]),
            )
        } else {
            ((-s * r[(j, k)]).atan2(r[(j, j)]), 0.0)
        };

        let mut out = Vec3::zeros();
        out[i] = a;
        out[j] = b;
        out[k] = c;
        out
    }

    /// Compose translate, rotate and scale as `T * R * S`.
    pub fn from_trs(translation: &Vec3, rotation: &Transform, scale: &Vec3) -> Self {
        Self::translation(translation.x, translation.y, translation.z)
            .then(&rotation.rotation_part())
            .then(&Self::scale(scale.x, scale.y, scale.z))
    }

    /// Split into translation, rotation and scale. Shear is discarded.
    pub fn decompose(&self) -> Decomposed {
        let m3: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let mut scale = Vec3::new(
            m3.column(0).norm(),
            m3.column(1).norm(),
            m3.column(2).norm(),
        );
        if m3.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let mut rotation = Matrix4::identity();
        for col in 0..3 {
            let s = if scale[col].abs() > f64::EPSILON {
                scale[col]
            } else {
                1.0
            };
            for row in 0..3 {
                rotation[(row, col)] = m3[(row, col)] / s;
            }
        }

        Decomposed {
            translation: self.translation_part(),
            rotation: Self { matrix: rotation },
            scale,
        }
    }

    /// The translation column.
    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.matrix[(0, 3)], self.matrix[(1, 3)], self.matrix[(2, 3)])
    }

    /// The orthonormal rotation with translation and scale removed.
    pub fn rotation_part(&self) -> Self {
        let m3: Matrix3<f64> = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let mut m = Matrix4::identity();
        for col in 0..3 {
            let n = m3.column(col).norm();
            let n = if n > f64::EPSILON { n } else { 1.0 };
            for row in 0..3 {
                m[(row, col)] = m3[(row, col)] / n;
            }
        }
        if m.fixed_view::<3, 3>(0, 0).determinant() < 0.0 {
            for row in 0..3 {
                m[(row, 0)] = -m[(row, 0)];
            }
        }
        Self { matrix: m }
    }

    /// Express a world transform in a parent's frame: `parent_inverse * world`.
    ///
    /// This is the host relation `local = world * parentInverse` written for
    /// column vectors.
    pub fn reparent(world: &Transform, parent_inverse: &Transform) -> Self {
        parent_inverse.then(world)
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Inverse of this transform, if it exists.
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Element-wise comparison within `eps`.
    pub fn approx_eq(&self, other: &Transform, eps: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert a triple of degrees to radians.
pub fn radians(degrees: &Vec3) -> Vec3 {
    degrees.map(f64::to_radians)
}

/// Convert a triple of radians to degrees.
pub fn degrees(radians: &Vec3) -> Vec3 {
    radians.map(f64::to_degrees)
}

/// Tolerance constants for transform comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two transforms match element-wise within the linear tolerance.
    pub fn transforms_equal(&self, a: &Transform, b: &Transform) -> bool {
        a.approx_eq(b, self.linear)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
