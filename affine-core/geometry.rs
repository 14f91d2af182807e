//! Closed-form 2x2 algebra shared by shape convergence and patch normalization.

use std::ops::Mul;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Absolute gravity direction (downward), radians
pub const GRAVITY_THETA: f32 = std::f32::consts::FRAC_PI_2;

/// Reference orientation relative to gravity
pub const R_GRAVITY_THETA: f32 = 0.0;

const ALMOST_EQ_EPS: f32 = 1e-5;

pub fn almost_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < ALMOST_EQ_EPS
}

/// 2x2 linear map, row-major `[a11 a12; a21 a22]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Affine2 {
    pub a11: f32,
    pub a12: f32,
    pub a21: f32,
    pub a22: f32,
}

impl Affine2 {
    pub const IDENTITY: Affine2 = Affine2 { a11: 1.0, a12: 0.0, a21: 0.0, a22: 1.0 };

    pub fn new(a11: f32, a12: f32, a21: f32, a22: f32) -> Self {
        Self { a11, a12, a21, a22 }
    }

    pub fn diagonal(d1: f32, d2: f32) -> Self {
        Self::new(d1, 0.0, 0.0, d2)
    }

    pub fn rotation(theta: f32) -> Self {
        let (s, c) = theta.sin_cos();
        Self::new(c, -s, s, c)
    }

    pub fn scaled(&self, k: f32) -> Self {
        Self::new(self.a11 * k, self.a12 * k, self.a21 * k, self.a22 * k)
    }

    pub fn det(&self) -> f32 {
        self.a11 * self.a22 - self.a12 * self.a21
    }

    pub fn trace(&self) -> f32 {
        self.a11 + self.a22
    }

    pub fn is_finite(&self) -> bool {
        self.a11.is_finite() && self.a12.is_finite() && self.a21.is_finite() && self.a22.is_finite()
    }

    /// Real eigenvalues with `l1 >= l2`.
    ///
    /// Returns `None` when the spectrum is complex or an eigenvalue is not
    /// strictly positive, i.e. the map is singular or flips orientation.
    pub fn eigenvalues(&self) -> Option<EigenPair> {
        let trace = self.trace();
        let delta = trace * trace - 4.0 * self.det();
        if !(delta >= 0.0) {
            return None;
        }
        let root = delta.sqrt();
        let l1 = (trace + root) / 2.0;
        let l2 = (trace - root) / 2.0;
        if !(l2 > 0.0) || !l1.is_finite() {
            return None;
        }
        Some(EigenPair { l1, l2 })
    }

    /// Right-multiply by a rotation of `theta` radians.
    ///
    /// Skew and elongation are kept, only the frame's reference direction turns.
    pub fn rotated(&self, theta: f32) -> Self {
        *self * Self::rotation(theta)
    }

    /// Split into a unit-determinant frame and its isotropic scale
    pub fn normalized(&self) -> (Self, f32) {
        let scale = self.det().abs().sqrt();
        (self.scaled(1.0 / scale), scale)
    }

    /// Lower-triangular frame with unit determinant that keeps the first
    /// row's direction pointing along +x ("up is up").
    pub fn rectified_up_is_up(&self) -> Self {
        let (a, b, c, d) = (self.a11 as f64, self.a12 as f64, self.a21 as f64, self.a22 as f64);
        let det = (a * d - b * c).abs().sqrt();
        let b2a2 = (b * b + a * a).sqrt();
        Self::new(
            (b2a2 / det) as f32,
            0.0,
            ((d * b + c * a) / (b2a2 * det)) as f32,
            (det / b2a2) as f32,
        )
    }
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Affine2 {
    type Output = Affine2;

    fn mul(self, rhs: Affine2) -> Affine2 {
        Affine2::new(
            self.a11 * rhs.a11 + self.a12 * rhs.a21,
            self.a11 * rhs.a12 + self.a12 * rhs.a22,
            self.a21 * rhs.a11 + self.a22 * rhs.a21,
            self.a21 * rhs.a12 + self.a22 * rhs.a22,
        )
    }
}

/// Eigenvalues of a 2x2 map, `l1 >= l2 > 0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EigenPair {
    pub l1: f32,
    pub l2: f32,
}

impl EigenPair {
    /// `1 - l2/l1`; zero for an isotropic map
    pub fn eigen_ratio(&self) -> f32 {
        1.0 - self.l2 / self.l1
    }

    /// Largest of `l1/l2` and `l2/l1`
    pub fn anisotropy(&self) -> f32 {
        (self.l1 / self.l2).max(self.l2 / self.l1)
    }
}

/// Symmetric second moment matrix `[a b; b c]`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SecondMomentMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl SecondMomentMatrix {
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    pub fn det(&self) -> f32 {
        self.a * self.c - self.b * self.b
    }

    pub fn is_positive_definite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
            && self.a > 0.0
            && self.c > 0.0
            && self.det() > 0.0
    }

    /// Inverse square root normalized to unit determinant, together with its
    /// eigenvalues.
    ///
    /// Diagonalizes with a single Jacobi rotation, so the result is exact for
    /// any symmetric positive definite input. Returns `None` otherwise.
    pub fn inv_sqrt(&self) -> Option<(Affine2, EigenPair)> {
        if !self.is_positive_definite() {
            return None;
        }
        let (a, b, c) = (self.a as f64, self.b as f64, self.c as f64);

        // r = cos, t = sin of the diagonalizing rotation
        let (r, t) = if b != 0.0 {
            let cot2 = (c - a) / (2.0 * b);
            let tan = if cot2 >= 0.0 {
                1.0 / (cot2 + (1.0 + cot2 * cot2).sqrt())
            } else {
                -1.0 / (-cot2 + (1.0 + cot2 * cot2).sqrt())
            };
            let cos = 1.0 / (1.0 + tan * tan).sqrt();
            (cos, tan * cos)
        } else {
            (1.0, 0.0)
        };

        let lx = r * r * a - 2.0 * r * t * b + t * t * c;
        let lz = t * t * a + 2.0 * r * t * b + r * r * c;
        if !(lx > 0.0 && lz > 0.0) {
            return None;
        }
        let mut x = 1.0 / lx.sqrt();
        let mut z = 1.0 / lz.sqrt();
        let d = (x * z).sqrt();
        x /= d;
        z /= d;

        let eigen = if x < z {
            EigenPair { l1: z as f32, l2: x as f32 }
        } else {
            EigenPair { l1: x as f32, l2: z as f32 }
        };
        let root = Affine2::new(
            (r * r * x + t * t * z) as f32,
            (-r * t * x + t * r * z) as f32,
            (-r * t * x + t * r * z) as f32,
            (t * t * x + r * r * z) as f32,
        );
        Some((root, eigen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!((a - b).abs() <= tol, "{} vs {} (tol {})", a, b, tol);
    }

    #[test]
    fn test_compose_is_matrix_product() {
        let a = Affine2::new(1.0, 2.0, 3.0, 4.0);
        let b = Affine2::new(0.0, 1.0, 1.0, 0.0);
        assert_eq!(a * b, Affine2::new(2.0, 1.0, 4.0, 3.0));
        assert_eq!(Affine2::IDENTITY * a, a);
    }

    #[test]
    fn test_eigenvalues_of_diagonal() {
        let e = Affine2::diagonal(2.0, 8.0).eigenvalues().unwrap();
        assert_eq!((e.l1, e.l2), (8.0, 2.0));
        assert_close(e.eigen_ratio(), 0.75, 1e-6);
        assert_close(e.anisotropy(), 4.0, 1e-6);
    }

    #[test]
    fn test_eigenvalues_degenerate() {
        // pure rotation has a complex spectrum
        assert!(Affine2::rotation(0.7).eigenvalues().is_none());
        // singular
        assert!(Affine2::new(1.0, 1.0, 1.0, 1.0).eigenvalues().is_none());
        assert!(Affine2::diagonal(1.0, -1.0).eigenvalues().is_none());
    }

    #[test]
    fn test_rotated_keeps_determinant() {
        let a = Affine2::new(1.5, 0.2, -0.3, 0.7);
        let r = a.rotated(1.1);
        assert_close(r.det(), a.det(), 1e-5);
        assert_eq!(Affine2::IDENTITY.rotated(0.0), Affine2::IDENTITY);
    }

    #[test]
    fn test_rectified_up_is_up() {
        let a = Affine2::new(2.0, 0.5, 0.3, 1.2);
        let r = a.rectified_up_is_up();
        assert_eq!(r.a12, 0.0);
        assert!(r.a11 > 0.0 && r.a22 > 0.0);
        assert_close(r.det(), 1.0, 1e-5);

        let rot = Affine2::rotation(0.4).rectified_up_is_up();
        assert_close(rot.a11, 1.0, 1e-5);
        assert_close(rot.a21, 0.0, 1e-5);
        assert_close(rot.a22, 1.0, 1e-5);
    }

    #[test]
    fn test_normalized_splits_scale() {
        let (frame, scale) = Affine2::diagonal(4.0, 1.0).normalized();
        assert_close(scale, 2.0, 1e-6);
        assert_close(frame.det(), 1.0, 1e-6);
    }

    #[test]
    fn test_inv_sqrt_diagonal() {
        let (root, eigen) = SecondMomentMatrix::new(4.0, 0.0, 1.0).inv_sqrt().unwrap();
        let s = std::f32::consts::SQRT_2;
        assert_close(root.a11, 1.0 / s, 1e-6);
        assert_close(root.a22, s, 1e-6);
        assert_close(root.a12, 0.0, 1e-6);
        assert_close(eigen.l1, s, 1e-6);
        assert_close(eigen.l2, 1.0 / s, 1e-6);
    }

    #[test]
    fn test_inv_sqrt_isotropic_is_identity() {
        let (root, eigen) = SecondMomentMatrix::new(3.0, 0.0, 3.0).inv_sqrt().unwrap();
        assert_eq!(root, Affine2::IDENTITY);
        assert_eq!(eigen.eigen_ratio(), 0.0);
    }

    #[test]
    fn test_inv_sqrt_rejects_indefinite() {
        assert!(SecondMomentMatrix::new(0.0, 0.0, 0.0).inv_sqrt().is_none());
        assert!(SecondMomentMatrix::new(1.0, 2.0, 1.0).inv_sqrt().is_none());
        assert!(SecondMomentMatrix::new(f32::NAN, 0.0, 1.0).inv_sqrt().is_none());
    }

    proptest! {
        #[test]
        fn prop_inv_sqrt_whitens(a in 0.5f32..10.0, c in 0.5f32..10.0, k in -0.9f32..0.9) {
            let b = k * (a * c).sqrt();
            let smm = SecondMomentMatrix::new(a, b, c);
            let (root, eigen) = smm.inv_sqrt().unwrap();
            let m = Affine2::new(a, b, b, c);
            // S * S * M == sqrt(det M) * I
            let p = root * root * m;
            let expected = smm.det().sqrt();
            prop_assert!((p.a11 - expected).abs() <= 1e-3 * expected);
            prop_assert!((p.a22 - expected).abs() <= 1e-3 * expected);
            prop_assert!(p.a12.abs() <= 1e-3 * expected);
            prop_assert!(p.a21.abs() <= 1e-3 * expected);
            prop_assert!((root.det() - 1.0).abs() < 1e-3);
            prop_assert!(eigen.l1 >= eigen.l2);
        }

        #[test]
        fn prop_rectified_has_unit_det(a11 in 0.2f32..3.0, a12 in -1.0f32..1.0, a21 in -1.0f32..1.0, a22 in 0.2f32..3.0) {
            let a = Affine2::new(a11, a12, a21, a22);
            prop_assume!(a.det().abs() > 0.05);
            let r = a.rectified_up_is_up();
            prop_assert!((r.det() - 1.0).abs() < 1e-3);
            prop_assert_eq!(r.a12, 0.0);
        }
    }
}
