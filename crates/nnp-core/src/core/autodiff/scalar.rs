use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A position in Cartesian space whose components may be tracked on a tape.
pub type Vec3<S> = [S; 3];

/// Numeric interface that energy functions are written against.
///
/// Implemented by plain `f64` (for cheap evaluation) and by [`Var`](super::tape::Var)
/// (for evaluation on a differentiation tape). Writing a potential generically over
/// `S: Scalar` is what makes its forces and Hessian available.
pub trait Scalar:
    Copy
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Add<f64, Output = Self>
    + Sub<f64, Output = Self>
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    fn value(&self) -> f64;

    /// A constant that needs no existing value to be created from.
    fn constant(value: f64) -> Self;

    /// Creates a constant living in the same context as `self`.
    fn lift(&self, constant: f64) -> Self;

    fn sqrt(self) -> Self;
    fn exp(self) -> Self;
    fn ln(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn powi(self, n: i32) -> Self;
}

impl Scalar for f64 {
    #[inline]
    fn value(&self) -> f64 {
        *self
    }

    #[inline]
    fn constant(value: f64) -> Self {
        value
    }

    #[inline]
    fn lift(&self, constant: f64) -> Self {
        constant
    }

    #[inline]
    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    #[inline]
    fn exp(self) -> Self {
        f64::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f64::ln(self)
    }

    #[inline]
    fn sin(self) -> Self {
        f64::sin(self)
    }

    #[inline]
    fn cos(self) -> Self {
        f64::cos(self)
    }

    #[inline]
    fn powi(self, n: i32) -> Self {
        f64::powi(self, n)
    }
}

#[inline]
pub fn difference<S: Scalar>(a: &Vec3<S>, b: &Vec3<S>) -> Vec3<S> {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn dot<S: Scalar>(a: &Vec3<S>, b: &Vec3<S>) -> S {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn norm_squared<S: Scalar>(a: &Vec3<S>) -> S {
    dot(a, a)
}

/// Constant matrix times a column vector, `M · r`.
#[inline]
pub fn matrix_times_column<S: Scalar>(m: &nalgebra::Matrix3<f64>, r: &Vec3<S>) -> Vec3<S> {
    std::array::from_fn(|i| r[0] * m[(i, 0)] + r[1] * m[(i, 1)] + r[2] * m[(i, 2)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    #[test]
    fn f64_scalar_methods_match_inherent_functions() {
        let x = 0.7_f64;
        assert_eq!(Scalar::sqrt(x), x.sqrt());
        assert_eq!(Scalar::exp(x), x.exp());
        assert_eq!(Scalar::ln(x), x.ln());
        assert_eq!(Scalar::sin(x), x.sin());
        assert_eq!(Scalar::cos(x), x.cos());
        assert_eq!(Scalar::powi(x, 3), x.powi(3));
        assert_eq!(x.lift(2.5), 2.5);
        assert_eq!(<f64 as Scalar>::constant(2.5), 2.5);
    }

    #[test]
    fn vector_helpers_compute_expected_values() {
        let a = [1.0, 2.0, 3.0];
        let b = [0.5, -1.0, 2.0];
        assert_eq!(difference(&a, &b), [0.5, 3.0, 1.0]);
        assert_eq!(dot(&a, &b), 4.5);
        assert_eq!(norm_squared(&a), 14.0);
    }

    #[test]
    fn matrix_times_column_matches_nalgebra_product() {
        let m = Matrix3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0);
        let r = [1.0, -2.0, 0.5];
        let expected = m * nalgebra::Vector3::new(1.0, -2.0, 0.5);
        assert_eq!(matrix_times_column(&m, &r), [expected.x, expected.y, expected.z]);
        assert_eq!(matrix_times_column(&m, &r), [-1.5, -3.0, -4.0]);
    }
}
