//! Iterators over the elements of a [`LatticeCyclic`].

use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::{LatticeCyclic, LatticeElementToIndex, LatticeLinkCanonical, LatticePoint};

/// Iterator over the elements of type `T` of a lattice, in flat index order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatticeIterator<'a, T> {
    lattice: &'a LatticeCyclic,
    front: usize,
    back: usize,
    _phantom: PhantomData<&'a T>,
}

/// Iterator over [`LatticePoint`]
pub type IteratorLatticePoint<'a> = LatticeIterator<'a, LatticePoint>;

/// Iterator over [`LatticeLinkCanonical`]
pub type IteratorLatticeLinkCanonical<'a> = LatticeIterator<'a, LatticeLinkCanonical>;

impl<'a, T> LatticeIterator<'a, T> {
    /// Create an iterator starting at the beginning of the lattice.
    #[must_use]
    #[inline]
    pub const fn new(lattice: &'a LatticeCyclic) -> Self {
        Self {
            lattice,
            front: 0,
            back: 0,
            _phantom: PhantomData,
        }
    }
}

impl<'a, T: LatticeElementToIndex> LatticeIterator<'a, T> {
    /// Number of elements not yet visited.
    #[inline]
    fn remaining(&self) -> usize {
        T::number_of_elements(self.lattice).saturating_sub(self.front + self.back)
    }
}

impl<'a, T: LatticeElementToIndex> Iterator for LatticeIterator<'a, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        let element = T::index_to_element(self.lattice, self.front);
        self.front += 1;
        element
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.remaining() {
            self.front += self.remaining();
            return None;
        }
        self.front += n;
        self.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let size = self.remaining();
        (size, Some(size))
    }
}

impl<'a, T: LatticeElementToIndex> DoubleEndedIterator for LatticeIterator<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining() == 0 {
            return None;
        }
        self.back += 1;
        T::index_to_element(self.lattice, T::number_of_elements(self.lattice) - self.back)
    }
}

impl<'a, T: LatticeElementToIndex> ExactSizeIterator for LatticeIterator<'a, T> {}

impl<'a, T: LatticeElementToIndex> FusedIterator for LatticeIterator<'a, T> {}

#[cfg(test)]
mod test {
    use crate::error::LatticeInitializationError;
    use crate::lattice::{LatticeCyclic, LatticePoint};

    #[test]
    fn points() -> Result<(), LatticeInitializationError> {
        let l = LatticeCyclic::new(2)?;
        let mut iterator = l.get_points();
        assert_eq!(
            iterator.size_hint(),
            (l.number_of_points(), Some(l.number_of_points()))
        );
        assert_eq!(iterator.size_hint(), (16, Some(16)));
        iterator.nth(9);
        assert_eq!(iterator.size_hint(), (6, Some(6)));
        assert!(iterator.nth(4).is_some());
        assert_eq!(iterator.size_hint(), (1, Some(1)));
        assert!(iterator.next().is_some());
        assert_eq!(iterator.size_hint(), (0, Some(0)));
        assert!(iterator.next().is_none());
        assert_eq!(iterator.size_hint(), (0, Some(0)));
        Ok(())
    }

    #[test]
    fn links() -> Result<(), LatticeInitializationError> {
        let l = LatticeCyclic::new(4)?;
        let links = l.get_links();
        assert_eq!(links.len(), l.number_of_canonical_links_space());
        assert_eq!(l.get_links().count(), 4 * 4 * 4 * 4 * 4);
        Ok(())
    }

    #[test]
    fn double_ended() -> Result<(), LatticeInitializationError> {
        let l = LatticeCyclic::new(3)?;
        let mut iterator = l.get_points();
        assert_eq!(iterator.next_back(), Some(LatticePoint::from([2, 2, 2, 2])));
        assert_eq!(iterator.next(), Some(LatticePoint::from([0, 0, 0, 0])));
        assert_eq!(iterator.len(), l.number_of_points() - 2);
        let forward = l.get_points().collect::<Vec<_>>();
        let mut backward = l.get_points().rev().collect::<Vec<_>>();
        backward.reverse();
        assert_eq!(forward, backward);
        Ok(())
    }
}
