//! Six-parameter rigid transform about a fixed centre.
//!
//! `T(p) = R (p - c) + c + t` with Euler angles composed as
//! `R = Rz(rz) · Rx(rx) · Ry(ry)`.

use nalgebra::{Matrix3, SMatrix, Vector3};
use serde::{Deserialize, Serialize};

/// Number of rigid-body parameters: three rotations, three translations.
pub const PARAMETER_COUNT: usize = 6;

/// Per-point derivative of the transformed point with respect to the
/// parameters `(rx, ry, rz, tx, ty, tz)`.
pub type PointJacobian = SMatrix<f64, 3, PARAMETER_COUNT>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    /// Euler angles in radians about the x, y and z axes.
    pub rotation: [f64; 3],
    /// Translation in physical units (mm).
    pub translation: [f64; 3],
    /// Fixed centre of rotation in physical space.
    pub center: [f64; 3],
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity([0.0; 3])
    }
}

impl RigidTransform {
    pub fn identity(center: [f64; 3]) -> Self {
        Self {
            rotation: [0.0; 3],
            translation: [0.0; 3],
            center,
        }
    }

    pub fn from_parameters(parameters: [f64; PARAMETER_COUNT], center: [f64; 3]) -> Self {
        Self {
            rotation: [parameters[0], parameters[1], parameters[2]],
            translation: [parameters[3], parameters[4], parameters[5]],
            center,
        }
    }

    /// Parameters in optimizer order `(rx, ry, rz, tx, ty, tz)`.
    pub fn parameters(&self) -> [f64; PARAMETER_COUNT] {
        let [rx, ry, rz] = self.rotation;
        let [tx, ty, tz] = self.translation;
        [rx, ry, rz, tx, ty, tz]
    }

    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.parameters().iter().all(|p| p.abs() <= tolerance)
    }

    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        let [rx, ry, rz] = self.rotation;
        rot_z(rz) * rot_x(rx) * rot_y(ry)
    }

    pub fn transform_point(&self, point: [f64; 3]) -> [f64; 3] {
        self.transform_with(&self.rotation_matrix(), point)
    }

    /// Apply the transform with a precomputed rotation matrix. Hot loops
    /// build the matrix once per evaluation.
    pub(crate) fn transform_with(&self, rotation: &Matrix3<f64>, point: [f64; 3]) -> [f64; 3] {
        let c = Vector3::from(self.center);
        let t = Vector3::from(self.translation);
        let q = rotation * (Vector3::from(point) - c) + c + t;
        [q.x, q.y, q.z]
    }

    /// Derivatives of the three rotation-matrix factors' product with
    /// respect to `rx`, `ry` and `rz`.
    pub(crate) fn rotation_derivatives(&self) -> [Matrix3<f64>; 3] {
        let [rx, ry, rz] = self.rotation;
        let (x, y, z) = (rot_x(rx), rot_y(ry), rot_z(rz));
        [
            z * d_rot_x(rx) * y,
            z * x * d_rot_y(ry),
            d_rot_z(rz) * x * y,
        ]
    }

    pub fn jacobian(&self, point: [f64; 3]) -> PointJacobian {
        self.jacobian_with(&self.rotation_derivatives(), point)
    }

    pub(crate) fn jacobian_with(
        &self,
        derivatives: &[Matrix3<f64>; 3],
        point: [f64; 3],
    ) -> PointJacobian {
        let d = Vector3::from(point) - Vector3::from(self.center);
        let mut jacobian = PointJacobian::zeros();
        for (col, dr) in derivatives.iter().enumerate() {
            jacobian.set_column(col, &(dr * d));
        }
        for axis in 0..3 {
            jacobian[(axis, 3 + axis)] = 1.0;
        }
        jacobian
    }
}

fn rot_x(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(1.0, 0.0, 0.0, 0.0, c, -s, 0.0, s, c)
}

fn rot_y(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(c, 0.0, s, 0.0, 1.0, 0.0, -s, 0.0, c)
}

fn rot_z(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0)
}

fn d_rot_x(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(0.0, 0.0, 0.0, 0.0, -s, -c, 0.0, c, -s)
}

fn d_rot_y(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(-s, 0.0, c, 0.0, 0.0, 0.0, -c, 0.0, -s)
}

fn d_rot_z(a: f64) -> Matrix3<f64> {
    let (s, c) = a.sin_cos();
    Matrix3::new(-s, -c, 0.0, c, -s, 0.0, 0.0, 0.0, 0.0)
}
