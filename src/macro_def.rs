//! defines macro
//!
//! # getter!
//! getter that return a reference
//! ## Examples
//! ```ignore
//! struct a {b: usize}
//! impl a {
//!     getter!(pub const, b, usize);
//! }
//! ```
//! # getter_copy!
//! create a getter that copy the value.
//! ## Examples
//! ```ignore
//! struct a {b: usize}
//! impl a {
//!     getter_copy!(pub const, b, usize);
//! }
//! ```

macro_rules! getter {
    ($(#[$meta:meta])* pub, $i:ident, $t:ty) => {
        $(#[$meta])*
        #[must_use]
        #[inline]
        pub fn $i(&self) -> &$t {
            &self.$i
        }
    };
    ($(#[$meta:meta])* pub const, $i:ident, $t:ty) => {
        $(#[$meta])*
        #[must_use]
        #[inline]
        pub const fn $i(&self) -> &$t {
            &self.$i
        }
    };
}

macro_rules! getter_copy {
    ($(#[$meta:meta])* pub, $i:ident, $t:ty) => {
        $(#[$meta])*
        #[must_use]
        #[inline]
        pub fn $i(&self) -> $t {
            self.$i
        }
    };
    ($(#[$meta:meta])* pub const, $i:ident, $t:ty) => {
        $(#[$meta])*
        #[must_use]
        #[inline]
        pub const fn $i(&self) -> $t {
            self.$i
        }
    };
}

#[macro_export]
/// assert if two matrices are approximatively the same
macro_rules! assert_eq_matrix {
    ($e:expr, $e2:expr, $epsilon:expr) => {
        assert!(($e - $e2).norm() < $epsilon, "assertion failed: norm `{} > {}`", ($e - $e2).norm(), $epsilon)
    };
    ($e:expr, $e2:expr, $epsilon:expr, $($arg:tt)+) => {
        assert!(($e - $e2).norm() < $epsilon, "assertion failed: norm `{} > {}` : {}", ($e - $e2).norm(), $epsilon, format_args!($($arg)*))
    };
}

#[macro_export]
/// assert if the matrix is SU(3) (special unitary)
macro_rules! assert_matrix_is_su_3 {
    ($m:expr, $epsilon:expr) => {{
        use nalgebra::ComplexField;
        assert!(
            ($m.determinant() - nalgebra::Complex::from(1_f64)).modulus() < $epsilon,
            "determinant {} of {} is not 1",
            $m.determinant(),
            $m
        );
        assert!(
            ($m * $m.adjoint() - nalgebra::Matrix3::identity()).norm() < $epsilon,
            "The matrix is not unitary {}",
            $m
        );
    }};
}
