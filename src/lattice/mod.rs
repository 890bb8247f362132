//! Defines lattices and lattice component.
//!
//! [`LatticeCyclic`] is the structure that encode the lattice information, the number of
//! point per dimension. It is used to do operation on [`LatticePoint`] and
//! [`LatticeLinkCanonical`]: periodic wrap, neighbours, conversion to and from the flat index
//! used to store the link matrices, and the checkerboard [`Parity`].
//! Or to get an iterator over these elements.
//!
//! [`LatticePoint`] and [`LatticeLinkCanonical`] are elements on the lattice.
//! They encode where a field element is situated.

mod iterator;
mod lattice_cyclic;

use std::fmt::{self, Display};
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use nalgebra::SVector;
#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

pub use self::iterator::{IteratorLatticeLinkCanonical, IteratorLatticePoint, LatticeIterator};
pub use self::lattice_cyclic::LatticeCyclic;
use crate::error::LatticeError;

/// Number of space-time dimensions of the lattice.
pub const DIM: usize = 4;

/// Represents point on a lattice.
///
/// The point itself does not know the lattice, there is no guarantee that it is inside one.
/// Use [`LatticeCyclic::wrap_point`] to bring it back inside.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LatticePoint {
    data: SVector<usize, DIM>,
}

impl LatticePoint {
    /// Create a new lattice point.
    ///
    /// It can be outside a lattice.
    #[must_use]
    #[inline]
    pub const fn new(data: SVector<usize, DIM>) -> Self {
        Self { data }
    }

    /// Create a point at the origin
    #[must_use]
    #[inline]
    pub fn new_zero() -> Self {
        Self {
            data: SVector::zeros(),
        }
    }

    /// Number of elements in [`LatticePoint`]. This is [`DIM`].
    #[allow(clippy::unused_self)]
    #[must_use]
    #[inline]
    pub const fn len(&self) -> usize {
        DIM
    }

    /// Always false, a point has [`DIM`] components.
    #[allow(clippy::unused_self)]
    #[must_use]
    #[inline]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Get an iterator on the data.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &usize> + ExactSizeIterator + FusedIterator {
        self.data.iter()
    }

    /// Get the point as as [`nalgebra::SVector<usize, DIM>`]
    #[must_use]
    #[inline]
    pub const fn as_svector(&self) -> &SVector<usize, DIM> {
        &self.data
    }

    /// Sum of the coordinates, its parity is the checkerboard colour of the point.
    #[must_use]
    #[inline]
    pub fn coordinate_sum(&self) -> usize {
        self.data.iter().sum()
    }
}

impl Default for LatticePoint {
    #[inline]
    fn default() -> Self {
        Self::new_zero()
    }
}

impl Display for LatticePoint {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.data[0], self.data[1], self.data[2], self.data[3]
        )
    }
}

impl Index<usize> for LatticePoint {
    type Output = usize;

    /// Get the element at position `pos`
    /// # Panic
    /// Panics if the position is out of bound
    /// ```should_panic
    /// # use lattice_qcd_metropolis::lattice::LatticePoint;
    /// let point = LatticePoint::from([0; 4]);
    /// let _ = point[4];
    /// ```
    #[inline]
    fn index(&self, pos: usize) -> &Self::Output {
        &self.data[pos]
    }
}

impl IndexMut<usize> for LatticePoint {
    #[inline]
    fn index_mut(&mut self, pos: usize) -> &mut Self::Output {
        &mut self.data[pos]
    }
}

impl From<[usize; DIM]> for LatticePoint {
    #[inline]
    fn from(data: [usize; DIM]) -> Self {
        Self::new(SVector::from(data))
    }
}

impl From<LatticePoint> for [usize; DIM] {
    #[inline]
    fn from(point: LatticePoint) -> Self {
        point.data.into()
    }
}

/// One of the [`DIM`] positive axes of the lattice.
///
/// The index is validated on creation, so a [`Direction`] is always inside `0..DIM`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Direction {
    index_dir: usize,
}

impl Direction {
    /// Create a direction from its index.
    ///
    /// # Errors
    /// Returns [`LatticeError::InvalidDirection`] if `index_dir >= DIM`.
    /// ```
    /// # use lattice_qcd_metropolis::{lattice::Direction, error::LatticeError};
    /// assert!(Direction::new(3).is_ok());
    /// assert_eq!(Direction::new(4), Err(LatticeError::InvalidDirection(4)));
    /// ```
    #[inline]
    pub const fn new(index_dir: usize) -> Result<Self, LatticeError> {
        if index_dir >= DIM {
            return Err(LatticeError::InvalidDirection(index_dir));
        }
        Ok(Self { index_dir })
    }

    /// All the directions, ordered by index.
    #[must_use]
    #[inline]
    pub const fn directions() -> [Self; DIM] {
        let mut array = [Self { index_dir: 0 }; DIM];
        let mut i = 0_usize;
        while i < DIM {
            array[i] = Self { index_dir: i };
            i += 1;
        }
        array
    }

    /// The `DIM - 1` directions orthogonal to `self`, ordered by index.
    ///
    /// ```
    /// # use lattice_qcd_metropolis::lattice::Direction;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let orthogonal = Direction::new(1)?.orthogonal_directions();
    /// assert_eq!(orthogonal, [Direction::new(0)?, Direction::new(2)?, Direction::new(3)?]);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    #[inline]
    pub const fn orthogonal_directions(self) -> [Self; DIM - 1] {
        let mut array = [Self { index_dir: 0 }; DIM - 1];
        let mut i = 0_usize;
        let mut j = 0_usize;
        while i < DIM {
            if i != self.index_dir {
                array[j] = Self { index_dir: i };
                j += 1;
            }
            i += 1;
        }
        array
    }

    /// The unordered pairs of distinct directions `(mu, nu)` with `mu < nu`,
    /// that is the independent orientations of a plaquette.
    #[must_use]
    #[inline]
    pub const fn planes() -> [(Self, Self); DIM * (DIM - 1) / 2] {
        let mut array = [(Self { index_dir: 0 }, Self { index_dir: 0 }); DIM * (DIM - 1) / 2];
        let mut k = 0_usize;
        let mut mu = 0_usize;
        while mu < DIM {
            let mut nu = mu + 1;
            while nu < DIM {
                array[k] = (Self { index_dir: mu }, Self { index_dir: nu });
                k += 1;
                nu += 1;
            }
            mu += 1;
        }
        array
    }

    /// Index of the direction, in `0..DIM`.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.index_dir
    }
}

impl Display for Direction {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index_dir)
    }
}

impl TryFrom<usize> for Direction {
    type Error = LatticeError;

    #[inline]
    fn try_from(index_dir: usize) -> Result<Self, Self::Error> {
        Self::new(index_dir)
    }
}

impl From<Direction> for usize {
    #[inline]
    fn from(d: Direction) -> Self {
        d.index()
    }
}

/// Checkerboard colour of a point, given by the parity of the sum of its coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Parity {
    /// Odd sum of coordinates.
    Odd,
    /// Even sum of coordinates.
    Even,
}

impl Parity {
    /// Both parities, in the order a sweep visits them.
    pub const SWEEP_ORDER: [Self; 2] = [Self::Odd, Self::Even];

    /// Parity of the given number.
    #[must_use]
    #[inline]
    pub const fn from_sum(sum: usize) -> Self {
        if sum % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    /// The other parity.
    #[must_use]
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Odd => Self::Even,
            Self::Even => Self::Odd,
        }
    }
}

impl Display for Parity {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Odd => write!(f, "odd"),
            Self::Even => write!(f, "even"),
        }
    }
}

/// A canonical link of a lattice. It contain a position and a direction.
///
/// By itself the link does not store data about the lattice. Hence most function require a
/// [`LatticeCyclic`]. Use [`LatticeCyclic::link_canonical`] to build a link whose position is
/// inside the lattice.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Copy)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LatticeLinkCanonical {
    from: LatticePoint,
    dir: Direction,
}

impl LatticeLinkCanonical {
    /// Create a link starting at `from` in direction `dir`.
    #[must_use]
    #[inline]
    pub const fn new(from: LatticePoint, dir: Direction) -> Self {
        Self { from, dir }
    }

    /// Position of the link.
    #[must_use]
    #[inline]
    pub const fn pos(&self) -> &LatticePoint {
        &self.from
    }

    /// Direction of the link.
    #[must_use]
    #[inline]
    pub const fn dir(&self) -> Direction {
        self.dir
    }
}

impl Display for LatticeLinkCanonical {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "canonical link [position {}, direction {}]",
            self.from, self.dir
        )
    }
}

/// Trait to convert between an element on a lattice and the flat index used to store the
/// field on it.
pub trait LatticeElementToIndex: Sized {
    /// Number of such elements on the lattice.
    #[must_use]
    fn number_of_elements(lattice: &LatticeCyclic) -> usize;

    /// Given a lattice return an index from the element.
    #[must_use]
    fn to_index(&self, lattice: &LatticeCyclic) -> usize;

    /// Converts an index into an element, `None` if the index is out of the lattice.
    #[must_use]
    fn index_to_element(lattice: &LatticeCyclic, index: usize) -> Option<Self>;
}

impl LatticeElementToIndex for LatticePoint {
    #[inline]
    fn number_of_elements(lattice: &LatticeCyclic) -> usize {
        lattice.number_of_points()
    }

    #[inline]
    fn to_index(&self, lattice: &LatticeCyclic) -> usize {
        lattice.point_index(self)
    }

    #[inline]
    fn index_to_element(lattice: &LatticeCyclic, index: usize) -> Option<Self> {
        lattice.index_to_point(index)
    }
}

impl LatticeElementToIndex for LatticeLinkCanonical {
    #[inline]
    fn number_of_elements(lattice: &LatticeCyclic) -> usize {
        lattice.number_of_canonical_links_space()
    }

    #[inline]
    fn to_index(&self, lattice: &LatticeCyclic) -> usize {
        lattice.link_index(self)
    }

    #[inline]
    fn index_to_element(lattice: &LatticeCyclic, index: usize) -> Option<Self> {
        lattice.index_to_link(index)
    }
}
