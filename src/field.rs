//! Represent the fields on the lattice.
//!
//! [`GaugeField`] stores one SU(3) matrix per canonical link in a flat buffer ordered as
//! described in [`LatticeCyclic`]. [`PerturbationPool`] holds the fixed set of matrices close
//! to the identity used to build Metropolis candidates.

use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::{
    error::{LatticeError, Su3Error},
    lattice::{Direction, LatticeCyclic, LatticeLinkCanonical},
    su3, CMatrix3, Real,
};

/// Number of random matrices drawn for the [`PerturbationPool`], each is stored with its adjoint.
pub const PERTURBATION_PAIRS: usize = 50;

/// How the link matrices are initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum InitialCondition {
    /// Every link is an independent [`su3::random_su3`] matrix. The average plaquette starts
    /// close to 0.
    Hot,
    /// Every link is drawn with [`su3::random_su3_close_to_unity`] using the step size.
    NearUnity,
    /// Every link is the identity. The average plaquette starts at 1.
    Cold,
}

impl Default for InitialCondition {
    #[inline]
    fn default() -> Self {
        Self::Hot
    }
}

/// The link matrices of a lattice.
///
/// The buffer is created once with [`LatticeCyclic::number_of_canonical_links_space`] elements
/// and never resized.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct GaugeField {
    lattice: LatticeCyclic,
    data: Vec<CMatrix3>,
}

impl GaugeField {
    /// Create a gauge field where every link is the identity.
    #[must_use]
    #[inline]
    pub fn new_cold(lattice: LatticeCyclic) -> Self {
        let data = vec![CMatrix3::identity(); lattice.number_of_canonical_links_space()];
        Self { lattice, data }
    }

    /// Create a gauge field with link matrices drawn uniformly with [`su3::random_su3`].
    ///
    /// The links are generated in the flat index order, so the result only depends on the
    /// state of `rng`.
    #[must_use]
    #[inline]
    pub fn new_hot<R>(lattice: LatticeCyclic, rng: &mut R) -> Self
    where
        R: rand::Rng + ?Sized,
    {
        let data = (0..lattice.number_of_canonical_links_space())
            .map(|_| su3::random_su3(rng))
            .collect();
        Self { lattice, data }
    }

    /// Create a gauge field with link matrices drawn with
    /// [`su3::random_su3_close_to_unity`].
    ///
    /// # Errors
    /// Returns [`Su3Error::NumericDegeneracy`] if a generation fails.
    #[inline]
    pub fn new_near_unity<R>(
        lattice: LatticeCyclic,
        spread_parameter: Real,
        rng: &mut R,
    ) -> Result<Self, Su3Error>
    where
        R: rand::Rng + ?Sized,
    {
        let data = (0..lattice.number_of_canonical_links_space())
            .map(|_| su3::random_su3_close_to_unity(spread_parameter, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lattice, data })
    }

    /// Create a gauge field following the given [`InitialCondition`]. `spread_parameter` is only
    /// used by [`InitialCondition::NearUnity`].
    ///
    /// # Errors
    /// Returns [`Su3Error::NumericDegeneracy`] if a generation fails.
    #[inline]
    pub fn new<R>(
        lattice: LatticeCyclic,
        initial_condition: InitialCondition,
        spread_parameter: Real,
        rng: &mut R,
    ) -> Result<Self, Su3Error>
    where
        R: rand::Rng + ?Sized,
    {
        match initial_condition {
            InitialCondition::Hot => Ok(Self::new_hot(lattice, rng)),
            InitialCondition::NearUnity => Self::new_near_unity(lattice, spread_parameter, rng),
            InitialCondition::Cold => Ok(Self::new_cold(lattice)),
        }
    }

    /// Build a gauge field from existing data, `None` if the length of `data` does not match
    /// the number of links of the lattice.
    #[must_use]
    #[inline]
    pub fn from_vec(lattice: LatticeCyclic, data: Vec<CMatrix3>) -> Option<Self> {
        (data.len() == lattice.number_of_canonical_links_space()).then(|| Self { lattice, data })
    }

    getter!(
        /// The lattice the field lives on.
        pub const,
        lattice,
        LatticeCyclic
    );

    /// Number of link matrices.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false for a valid lattice.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the link matrices as a slice, in flat index order.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[CMatrix3] {
        &self.data
    }

    /// Copy of every link matrix, the first coordinate is the outermost and the direction the
    /// innermost.
    #[must_use]
    #[inline]
    pub fn export(&self) -> Vec<CMatrix3> {
        self.data.clone()
    }

    /// Link matrix at a signed coordinate, wrapped into the lattice.
    ///
    /// # Errors
    /// Returns [`LatticeError::InvalidDirection`] if `dir > 3` and
    /// [`LatticeError::DimensionMismatch`] if `coordinates` does not have 4 components.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::{field::GaugeField, lattice::LatticeCyclic, CMatrix3};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let field = GaugeField::new_cold(LatticeCyclic::new(4)?);
    /// assert_eq!(*field.get(&[-1, 0, 5, 2], 3)?, CMatrix3::identity());
    /// assert!(field.get(&[0, 0, 0, 0], 4).is_err());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn get(&self, coordinates: &[i64], dir: usize) -> Result<&CMatrix3, LatticeError> {
        let link = self.checked_link(coordinates, dir)?;
        Ok(self.link(&link))
    }

    /// Replace the link matrix at a signed coordinate, wrapped into the lattice.
    ///
    /// # Errors
    /// Same as [`GaugeField::get`].
    #[inline]
    pub fn set(
        &mut self,
        coordinates: &[i64],
        dir: usize,
        matrix: CMatrix3,
    ) -> Result<(), LatticeError> {
        let link = self.checked_link(coordinates, dir)?;
        *self.link_mut(&link) = matrix;
        Ok(())
    }

    #[inline]
    fn checked_link(
        &self,
        coordinates: &[i64],
        dir: usize,
    ) -> Result<LatticeLinkCanonical, LatticeError> {
        let dir = Direction::new(dir)?;
        let point = self.lattice.wrap(coordinates)?;
        Ok(LatticeLinkCanonical::new(point, dir))
    }

    /// Link matrix of a canonical link. The position is taken modulo the extent.
    #[must_use]
    #[inline]
    pub fn link(&self, link: &LatticeLinkCanonical) -> &CMatrix3 {
        &self.data[self.lattice.link_index(link)]
    }

    /// Mutable reference to the link matrix of a canonical link.
    #[must_use]
    #[inline]
    pub fn link_mut(&mut self, link: &LatticeLinkCanonical) -> &mut CMatrix3 {
        let index = self.lattice.link_index(link);
        &mut self.data[index]
    }

    /// Link matrix by flat index, `None` if out of bound.
    #[must_use]
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&CMatrix3> {
        self.data.get(index)
    }

    /// Write the given `(index, matrix)` pairs into the buffer.
    ///
    /// # Panic
    /// Panics if an index is out of bound.
    #[inline]
    pub fn write_back<I>(&mut self, updates: I)
    where
        I: IntoIterator<Item = (usize, CMatrix3)>,
    {
        for (index, matrix) in updates {
            self.data[index] = matrix;
        }
    }

    /// Project every link matrix back on SU(3), see [`su3::orthonormalize_matrix`].
    #[inline]
    pub fn normalize(&mut self) {
        self.data
            .par_iter_mut()
            .for_each(su3::orthonormalize_matrix_mut);
    }

    /// Whether every link matrix is in SU(3) up to `epsilon`.
    #[must_use]
    #[inline]
    pub fn is_su3(&self, epsilon: Real) -> bool {
        self.data
            .par_iter()
            .all(|m| su3::is_matrix_su3(m, epsilon))
    }
}

/// Fixed set of SU(3) matrices close to the identity, closed under the adjoint.
///
/// The matrices are stored as `m0, m0^dagger, m1, m1^dagger, ...` so that a Metropolis step is
/// as likely to propose a change as to propose its inverse.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PerturbationPool {
    matrices: Vec<CMatrix3>,
}

impl PerturbationPool {
    /// Create a pool of [`PERTURBATION_PAIRS`] pairs with the given spread parameter.
    ///
    /// # Errors
    /// Returns [`Su3Error::NumericDegeneracy`] if a generation fails.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::field::PerturbationPool;
    /// # use rand::SeedableRng;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
    /// let pool = PerturbationPool::new(0.24_f64, &mut rng)?;
    /// assert_eq!(pool.len(), 100);
    /// assert_eq!(pool.as_slice()[1], pool.as_slice()[0].adjoint());
    /// # Ok(())
    /// # }
    /// ```
    #[inline]
    pub fn new<R>(spread_parameter: Real, rng: &mut R) -> Result<Self, Su3Error>
    where
        R: rand::Rng + ?Sized,
    {
        Self::with_pairs(PERTURBATION_PAIRS, spread_parameter, rng)
    }

    /// Create a pool with `pairs` random matrices and their adjoint.
    ///
    /// # Errors
    /// Returns [`Su3Error::NumericDegeneracy`] if a generation fails.
    #[inline]
    pub fn with_pairs<R>(pairs: usize, spread_parameter: Real, rng: &mut R) -> Result<Self, Su3Error>
    where
        R: rand::Rng + ?Sized,
    {
        let mut matrices = Vec::with_capacity(2 * pairs);
        for _ in 0..pairs {
            let m = su3::random_su3_close_to_unity(spread_parameter, rng)?;
            matrices.push(m);
            matrices.push(m.adjoint());
        }
        Ok(Self { matrices })
    }

    /// Pick one of the matrices uniformly at random.
    ///
    /// # Panic
    /// Panics if the pool is empty, which can only happen if it was created with zero pairs.
    #[must_use]
    #[inline]
    pub fn random<R>(&self, rng: &mut R) -> &CMatrix3
    where
        R: rand::Rng + ?Sized,
    {
        &self.matrices[Uniform::new(0, self.matrices.len()).sample(rng)]
    }

    /// Number of matrices in the pool.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    /// Whether the pool is empty.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// The matrices of the pool.
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[CMatrix3] {
        &self.matrices
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::lattice::LatticePoint;

    const EPSILON: f64 = 0.000_000_001_f64;
    const SEED_RNG: u64 = 0x45_78_93_f4_4a_b0_67_f0;

    #[test]
    fn get_set() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let lattice = LatticeCyclic::new(3)?;
        let mut field = GaugeField::new_cold(lattice.clone());
        assert_eq!(field.len(), 3 * 3 * 3 * 3 * 4);

        let m = su3::random_su3(&mut rng);
        field.set(&[-1, 4, 0, 2], 2, m)?;
        assert_eq!(*field.get(&[2, 1, 0, 2], 2)?, m);
        assert_eq!(*field.get(&[5, -2, 3, -1], 2)?, m);
        assert_eq!(*field.get(&[2, 1, 0, 2], 1)?, CMatrix3::identity());
        let link = LatticeLinkCanonical::new(LatticePoint::from([2, 1, 0, 2]), Direction::new(2)?);
        assert_eq!(*field.link(&link), m);
        let index = ((((2 * 3 + 1) * 3) * 3 + 2) * 4) + 2;
        assert_eq!(field.get_index(index), Some(&m));
        assert_eq!(field.export()[index], m);

        assert_eq!(
            field.set(&[0, 0, 0, 0], 4, m),
            Err(LatticeError::InvalidDirection(4))
        );
        assert_eq!(
            field.get(&[0, 0, 0], 0),
            Err(LatticeError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        );
        Ok(())
    }

    #[test]
    fn initial_conditions() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let lattice = LatticeCyclic::new(2)?;
        for condition in [
            InitialCondition::Hot,
            InitialCondition::NearUnity,
            InitialCondition::Cold,
        ] {
            let field = GaugeField::new(lattice.clone(), condition, 0.24_f64, &mut rng)?;
            assert_eq!(field.len(), lattice.number_of_canonical_links_space());
            assert!(field.is_su3(EPSILON));
        }
        assert_eq!(InitialCondition::default(), InitialCondition::Hot);
        let cold = GaugeField::new_cold(lattice.clone());
        assert!(cold.as_slice().iter().all(|m| *m == CMatrix3::identity()));
        assert!(GaugeField::from_vec(lattice, vec![CMatrix3::identity(); 3]).is_none());
        Ok(())
    }

    #[test]
    fn normalize() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let lattice = LatticeCyclic::new(2)?;
        let field = GaugeField::new_hot(lattice.clone(), &mut rng);
        let drifted = field
            .as_slice()
            .iter()
            .map(|m| m * crate::Complex::from(1.000_1_f64))
            .collect();
        let mut drifted = GaugeField::from_vec(lattice, drifted).ok_or("wrong size")?;
        assert!(!drifted.is_su3(EPSILON));
        drifted.normalize();
        assert!(drifted.is_su3(EPSILON));
        for (a, b) in drifted.as_slice().iter().zip(field.as_slice()) {
            assert_eq_matrix!(a, b, EPSILON);
        }
        Ok(())
    }

    #[test]
    fn pool() -> Result<(), Su3Error> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let pool = PerturbationPool::new(0.24_f64, &mut rng)?;
        assert_eq!(pool.len(), 2 * PERTURBATION_PAIRS);
        for pair in pool.as_slice().chunks(2) {
            assert_matrix_is_su_3!(pair[0], EPSILON);
            assert_eq_matrix!(pair[0] * pair[1], CMatrix3::identity(), EPSILON);
        }
        let mut seen = vec![false; pool.len()];
        for _ in 0..10_000 {
            let m = pool.random(&mut rng);
            let position = pool
                .as_slice()
                .iter()
                .position(|p| std::ptr::eq(p, m))
                .unwrap();
            seen[position] = true;
        }
        assert!(seen.iter().all(|b| *b));
        Ok(())
    }
}
