//! Module for SU(3) matrices generation and projection.
//!
//! Link variables of the lattice are elements of SU(3), the group of 3x3 unitary complex
//! matrices with determinant 1. This module builds them from random numbers: either spread over
//! the whole group with [`random_su3`] or close to the identity with
//! [`random_su3_close_to_unity`], the later being the building block of the Metropolis
//! proposals.

use std::f64::consts::PI;

use nalgebra::ComplexField;
use rand_distr::{Distribution, Uniform};

use super::{error::Su3Error, CMatrix3, Complex, Real, I, ONE};

/// Below this value a diagonal element of the `R` factor of the QR decomposition is considered
/// null, meaning that the columns of the input matrix were not independent.
const QR_DEGENERACY_THRESHOLD: Real = 1E-12_f64;

/// Tolerance on `|det(Q)| = 1` for the unitary factor of the QR decomposition.
const UNITARITY_TOLERANCE: Real = 1E-8_f64;

/// Create a matrix (v1, v2, v1* x v2*). The columns are `v1`, `v2` and the conjugate of the
/// cross product.
///
/// If `v1` and `v2` are orthonormal the result is in SU(3).
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{assert_eq_matrix, su3::create_matrix_from_2_vector, CMatrix3, Complex};
/// let v1 = nalgebra::Vector3::new(
///     Complex::new(1_f64, 0_f64),
///     Complex::new(0_f64, 0_f64),
///     Complex::new(0_f64, 0_f64),
/// );
/// let v2 = nalgebra::Vector3::new(
///     Complex::new(0_f64, 0_f64),
///     Complex::new(0_f64, 1_f64),
///     Complex::new(0_f64, 0_f64),
/// );
/// let m = create_matrix_from_2_vector(v1, v2);
/// assert_eq_matrix!(m * m.adjoint(), CMatrix3::identity(), 1E-10_f64);
/// ```
#[inline]
#[must_use]
pub fn create_matrix_from_2_vector(
    v1: nalgebra::Vector3<Complex>,
    v2: nalgebra::Vector3<Complex>,
) -> CMatrix3 {
    let cross_vec: nalgebra::Vector3<Complex> = v1.conjugate().cross(&v2.conjugate());
    let iter = v1.iter().chain(v2.iter()).chain(cross_vec.iter()).copied();
    CMatrix3::from_iterator(iter)
}

/// Gram-Schmidt on the two vector then complete with [`create_matrix_from_2_vector`].
#[inline]
#[must_use]
fn ortho_matrix_from_2_vector(
    v1: nalgebra::Vector3<Complex>,
    v2: nalgebra::Vector3<Complex>,
) -> CMatrix3 {
    let v1_new = v1.try_normalize(f64::EPSILON).unwrap_or(v1);
    let v2_temp = v2 - v1_new * v1_new.conjugate().dot(&v2);
    let v2_new = v2_temp.try_normalize(f64::EPSILON).unwrap_or(v2_temp);
    create_matrix_from_2_vector(v1_new, v2_new)
}

/// Project a matrix close to SU(3) back on SU(3).
///
/// The first two columns are orthonormalized and the third one is rebuilt from them. Products
/// of many link matrices slowly drift away from the group because of rounding, this undoes it.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{su3::{orthonormalize_matrix, random_su3, is_matrix_su3}, Complex};
/// # use rand::SeedableRng;
/// # let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let m = random_su3(&mut rng) * Complex::from(1.001_f64);
/// assert!(!is_matrix_su3(&m, 1E-10_f64));
/// assert!(is_matrix_su3(&orthonormalize_matrix(&m), 1E-10_f64));
/// ```
#[inline]
#[must_use]
pub fn orthonormalize_matrix(matrix: &CMatrix3) -> CMatrix3 {
    let v1 = nalgebra::Vector3::from_iterator(matrix.column(0).iter().copied());
    let v2 = nalgebra::Vector3::from_iterator(matrix.column(1).iter().copied());
    ortho_matrix_from_2_vector(v1, v2)
}

/// Orthonormalize the given matrix by mutating its content.
#[inline]
pub fn orthonormalize_matrix_mut(matrix: &mut CMatrix3) {
    *matrix = orthonormalize_matrix(matrix);
}

/// Generate Uniformly distributed SU(3) matrix.
///
/// Every entry has a null expected value, so a lattice filled with these matrices has an
/// average plaquette close to zero.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{assert_matrix_is_su_3, su3::random_su3};
/// # use rand::SeedableRng;
/// # let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// for _ in 0..10 {
///     assert_matrix_is_su_3!(random_su3(&mut rng), 1E-10_f64);
/// }
/// ```
#[inline]
#[must_use]
pub fn random_su3<Rng>(rng: &mut Rng) -> CMatrix3
where
    Rng: rand::Rng + ?Sized,
{
    let d = Uniform::new(-1_f64, 1_f64);
    let mut v1 = random_vec_3(rng, &d);
    while v1.norm() <= f64::EPSILON {
        v1 = random_vec_3(rng, &d);
    }
    let mut v2 = random_vec_3(rng, &d);
    while v1.dot(&v2).modulus() <= f64::EPSILON {
        v2 = random_vec_3(rng, &d);
    }
    ortho_matrix_from_2_vector(v1, v2)
}

/// get a random [`nalgebra::Vector3<Complex>`].
#[inline]
#[must_use]
fn random_vec_3<Rng>(
    rng: &mut Rng,
    d: &impl Distribution<Real>,
) -> nalgebra::Vector3<Complex>
where
    Rng: rand::Rng + ?Sized,
{
    nalgebra::Vector3::from_fn(|_, _| Complex::new(d.sample(rng), d.sample(rng)))
}

/// Get a random SU(3) matrix close to the identity.
///
/// A matrix `A` with entries `r exp(i phi)`, `r` uniform in `[0, 1)` and `phi` uniform in
/// `[0, 2 pi)`, gives `B = 1 + i eps A`. The unitary factor `Q` of the Householder QR
/// decomposition of `B`, with the phases chosen such that `R` has a positive diagonal, is then
/// divided by the principal cube root of its determinant.
///
/// `spread_parameter` is `eps`, the smaller it is the closer the result is to the identity.
///
/// # Errors
/// Returns [`Su3Error::NumericDegeneracy`] if `B` is (numerically) singular, i.e. a diagonal
/// element of `R` vanishes, or if `Q` is not unitary up to a tolerance.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{assert_matrix_is_su_3, su3::random_su3_close_to_unity, CMatrix3};
/// # use rand::SeedableRng;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// for _ in 0..10 {
///     let m = random_su3_close_to_unity(0.24_f64, &mut rng)?;
///     assert_matrix_is_su_3!(m, 1E-10_f64);
///     assert!((m - CMatrix3::identity()).norm() < 1_f64);
/// }
/// # Ok(())
/// # }
/// ```
#[inline]
pub fn random_su3_close_to_unity<R>(spread_parameter: Real, rng: &mut R) -> Result<CMatrix3, Su3Error>
where
    R: rand::Rng + ?Sized,
{
    let modulus = Uniform::new(0_f64, 1_f64);
    let phase = Uniform::new(0_f64, 2_f64 * PI);
    let a = CMatrix3::from_fn(|_, _| {
        Complex::from_polar(modulus.sample(rng), phase.sample(rng))
    });
    let b = CMatrix3::identity() + a * (I * spread_parameter);

    let qr = b.qr();
    let r_diagonal = qr.r().diagonal();
    if r_diagonal
        .iter()
        .any(|r| r.modulus() < QR_DEGENERACY_THRESHOLD)
    {
        return Err(Su3Error::NumericDegeneracy);
    }
    // Householder reflections leave phases on the diagonal of R, they are moved out of Q so that
    // Q stays close to B.
    let phases = r_diagonal.map(|r| r / r.modulus());
    let q = qr.q() * CMatrix3::from_diagonal(&phases);
    let det = q.determinant();
    if !det.is_finite() || (det.modulus() - 1_f64).abs() > UNITARITY_TOLERANCE {
        return Err(Su3Error::NumericDegeneracy);
    }
    Ok(q / det.powf(1_f64 / 3_f64))
}

/// Return wether the input matrix is SU(3) up to epsilon.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{su3::is_matrix_su3, CMatrix3, Complex};
/// assert!(is_matrix_su3(&CMatrix3::identity(), f64::EPSILON));
/// assert!(!is_matrix_su3(&(CMatrix3::identity() * Complex::from(2_f64)), 0.1_f64));
/// ```
#[inline]
#[must_use]
pub fn is_matrix_su3(m: &CMatrix3, epsilon: f64) -> bool {
    ((m.determinant() - ONE).modulus_squared() < epsilon)
        && ((m * m.adjoint() - CMatrix3::identity()).norm() < epsilon)
}
