use std::fmt::{self, Display};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::{
    Direction, IteratorLatticeLinkCanonical, IteratorLatticePoint, LatticeLinkCanonical,
    LatticePoint, Parity, DIM,
};
use crate::error::{LatticeError, LatticeInitializationError};

/// A Cyclic lattice in space-time. Does not store point and links but is used to generate them.
///
/// This lattice is Cyclic more precisely if the lattice has N points in each direction.
/// Then we can move alongside a direction going though point 0, 1, ... N-1. The next step in
/// the same direction goes back to the point at 0.
///
/// It converts lattice elements to the flat index used by [`crate::field::GaugeField`].
/// Points are ordered with the first coordinate outermost, links of a point are contiguous and
/// ordered by direction.
///
/// This contain very few data and can be cloned at almost no cost.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LatticeCyclic {
    /// The number of point *per* dimension.
    dim: usize,
}

impl LatticeCyclic {
    /// create a new lattice with `dim` the number of points in each dimension.
    ///
    /// # Errors
    /// `dim` must be greater or equal to 2, otherwise returns
    /// [`LatticeInitializationError::ExtentTooSmall`].
    #[inline]
    pub const fn new(dim: usize) -> Result<Self, LatticeInitializationError> {
        if dim < 2 {
            Err(LatticeInitializationError::ExtentTooSmall)
        } else {
            Ok(Self { dim })
        }
    }

    /// Number space + time dimension, this is [`DIM`].
    ///
    /// Not to confuse with [`LatticeCyclic::dim`] which is the number of point per dimension.
    #[must_use]
    #[inline]
    pub const fn dim_st() -> usize {
        DIM
    }

    /// Get the number of points in a single direction.
    #[must_use]
    #[inline]
    pub const fn dim(&self) -> usize {
        self.dim
    }

    /// Total number of point in the lattice.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::lattice::LatticeCyclic;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let l = LatticeCyclic::new(8)?;
    /// assert_eq!(l.number_of_points(), 8_usize.pow(4));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    #[inline]
    pub const fn number_of_points(&self) -> usize {
        self.dim * self.dim * self.dim * self.dim
    }

    /// Total number of canonical links, `DIM` per point.
    #[must_use]
    #[inline]
    pub const fn number_of_canonical_links_space(&self) -> usize {
        self.number_of_points() * DIM
    }

    /// Whether the [`Parity`] of the points is a proper two colouring of the torus, i.e. two
    /// neighbours always have opposite parity. This is the case only if the extent is even.
    #[must_use]
    #[inline]
    pub const fn has_checkerboard(&self) -> bool {
        self.dim % 2 == 0
    }

    /// Reduce signed coordinates modulo the extent.
    ///
    /// # Errors
    /// Returns [`LatticeError::DimensionMismatch`] if `coordinates` does not have [`DIM`]
    /// components.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::lattice::{LatticeCyclic, LatticePoint};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let lattice = LatticeCyclic::new(4)?;
    /// assert_eq!(lattice.wrap(&[-1, 4, 9, 2])?, LatticePoint::from([3, 0, 1, 2]));
    /// assert!(lattice.wrap(&[0, 0, 0]).is_err());
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::cast_possible_wrap)] // the extent is far below i64::MAX
    #[allow(clippy::cast_sign_loss)] // rem_euclid is positive
    #[allow(clippy::cast_possible_truncation)] // rem_euclid is below the extent
    #[inline]
    pub fn wrap(&self, coordinates: &[i64]) -> Result<LatticePoint, LatticeError> {
        if coordinates.len() != DIM {
            return Err(LatticeError::DimensionMismatch {
                expected: DIM,
                found: coordinates.len(),
            });
        }
        let n = self.dim as i64;
        let mut point = LatticePoint::new_zero();
        for (i, c) in coordinates.iter().enumerate() {
            point[i] = c.rem_euclid(n) as usize;
        }
        Ok(point)
    }

    /// Reduce each coordinate of the point modulo the extent.
    #[must_use]
    #[inline]
    pub fn wrap_point(&self, mut point: LatticePoint) -> LatticePoint {
        for i in 0..DIM {
            point[i] %= self.dim;
        }
        point
    }

    /// Build a canonical link whose position is brought back inside the lattice.
    #[must_use]
    #[inline]
    pub fn link_canonical(&self, pos: LatticePoint, dir: Direction) -> LatticeLinkCanonical {
        LatticeLinkCanonical::new(self.wrap_point(pos), dir)
    }

    /// Get the next point in the lattice following the direction `dir`.
    /// It follows the Cyclic property of the lattice.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::lattice::{LatticeCyclic, Direction, LatticePoint};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let lattice = LatticeCyclic::new(4)?;
    /// let point = LatticePoint::from([1, 0, 2, 3]);
    /// assert_eq!(
    ///     lattice.add_point_direction(point, Direction::new(3)?),
    ///     LatticePoint::from([1, 0, 2, 0])
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    #[inline]
    pub fn add_point_direction(&self, mut point: LatticePoint, dir: Direction) -> LatticePoint {
        let i = dir.index();
        point[i] = (point[i] % self.dim + 1) % self.dim;
        point
    }

    /// Get the previous point in the lattice following the direction `dir`.
    /// It follows the Cyclic property of the lattice.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::lattice::{LatticeCyclic, Direction, LatticePoint};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let lattice = LatticeCyclic::new(4)?;
    /// let point = LatticePoint::from([1, 0, 2, 0]);
    /// // In the following case we get [_, 3, _, _] because `dim = 4`, and this lattice is Cyclic.
    /// assert_eq!(
    ///     lattice.sub_point_direction(point, Direction::new(1)?),
    ///     LatticePoint::from([1, 3, 2, 0])
    /// );
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    #[inline]
    pub fn sub_point_direction(&self, mut point: LatticePoint, dir: Direction) -> LatticePoint {
        let i = dir.index();
        point[i] = (point[i] % self.dim + self.dim - 1) % self.dim;
        point
    }

    /// Flat index of a point, the coordinates are wrapped first.
    #[must_use]
    #[inline]
    pub fn point_index(&self, point: &LatticePoint) -> usize {
        point
            .iter()
            .fold(0_usize, |acc, pos| acc * self.dim + pos % self.dim)
    }

    /// Flat index of a link in the link buffer.
    #[must_use]
    #[inline]
    pub fn link_index(&self, link: &LatticeLinkCanonical) -> usize {
        self.point_index(link.pos()) * DIM + link.dir().index()
    }

    /// Inverse of [`Self::point_index`], `None` if `index >= self.number_of_points()`.
    #[must_use]
    #[inline]
    pub fn index_to_point(&self, index: usize) -> Option<LatticePoint> {
        (index < self.number_of_points()).then(|| {
            let mut point = LatticePoint::new_zero();
            let mut rest = index;
            for i in (0..DIM).rev() {
                point[i] = rest % self.dim;
                rest /= self.dim;
            }
            point
        })
    }

    /// Inverse of [`Self::link_index`], `None` if the index is outside the link buffer.
    #[must_use]
    #[inline]
    pub fn index_to_link(&self, index: usize) -> Option<LatticeLinkCanonical> {
        let point = self.index_to_point(index / DIM)?;
        let dir = Direction::new(index % DIM).ok()?;
        Some(LatticeLinkCanonical::new(point, dir))
    }

    /// Checkerboard parity of a point.
    #[must_use]
    #[inline]
    pub fn parity(&self, point: &LatticePoint) -> Parity {
        Parity::from_sum(self.wrap_point(*point).coordinate_sum())
    }

    /// Flat indices of the points of the given parity, in increasing order.
    #[must_use]
    #[inline]
    pub fn points_index_of_parity(&self, parity: Parity) -> Vec<usize> {
        self.get_points()
            .enumerate()
            .filter(|(_, point)| self.parity(point) == parity)
            .map(|(index, _)| index)
            .collect()
    }

    /// Get an Iterator over all points of the lattice, in flat index order.
    ///
    /// # Example
    /// ```
    /// # use lattice_qcd_metropolis::lattice::LatticeCyclic;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// for i in [2, 4, 8].into_iter() {
    ///     let l = LatticeCyclic::new(i)?;
    ///     assert_eq!(l.get_points().size_hint().0, l.number_of_points());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    #[inline]
    pub const fn get_points(&self) -> IteratorLatticePoint<'_> {
        IteratorLatticePoint::new(self)
    }

    /// Get an Iterator over all canonical link of the lattice, in flat index order.
    #[must_use]
    #[inline]
    pub const fn get_links(&self) -> IteratorLatticeLinkCanonical<'_> {
        IteratorLatticeLinkCanonical::new(self)
    }
}

impl Display for LatticeCyclic {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cyclic lattice with {}^{} points", self.dim, DIM)
    }
}
