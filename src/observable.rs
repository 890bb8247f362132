//! Measurements on a gauge field.

use rayon::prelude::*;

use super::{
    action::{plaquette, LinkSource},
    lattice::{Direction, LatticeCyclic, LatticePoint, DIM},
    Real,
};

/// Number of planes `(mu, nu)` with `mu < nu`.
const NUMBER_OF_PLANES: usize = DIM * (DIM - 1) / 2;

/// Sum of `f` over every point of the lattice, computed in parallel.
fn sum_over_points<F>(lattice: &LatticeCyclic, f: F) -> Real
where
    F: Fn(&LatticePoint) -> Real + Sync,
{
    (0..lattice.number_of_points())
        .into_par_iter()
        .filter_map(|index| lattice.index_to_point(index))
        .map(|point| f(&point))
        .sum()
}

/// Average plaquette `1/3 <Re(Tr(P_{mu nu}))>` over every point and the six planes `mu < nu`.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{observable::average_plaquette, field::GaugeField, lattice::LatticeCyclic};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let field = GaugeField::new_cold(LatticeCyclic::new(4)?);
/// assert!((average_plaquette(&field) - 1_f64).abs() < 1E-12_f64);
/// # Ok(())
/// # }
/// ```
#[allow(clippy::cast_precision_loss)] // the number of points is far below 2^52
#[must_use]
#[inline]
pub fn average_plaquette<S>(source: &S) -> Real
where
    S: LinkSource + Sync + ?Sized,
{
    let lattice = source.lattice();
    let sum = sum_over_points(lattice, |point| {
        Direction::planes()
            .iter()
            .map(|(mu, nu)| plaquette(source, point, *mu, *nu))
            .sum::<Real>()
    });
    sum / (lattice.number_of_points() * NUMBER_OF_PLANES) as Real
}

/// Average plaquette in the plane `(mu, nu)` only.
#[allow(clippy::cast_precision_loss)]
#[must_use]
#[inline]
pub fn average_plaquette_plane<S>(source: &S, mu: Direction, nu: Direction) -> Real
where
    S: LinkSource + Sync + ?Sized,
{
    let lattice = source.lattice();
    let sum = sum_over_points(lattice, |point| plaquette(source, point, mu, nu));
    sum / lattice.number_of_points() as Real
}

/// Wilson action of the whole lattice, `-beta * 6 * n^4 * <P>`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
#[inline]
pub fn average_action<S>(source: &S, beta: Real) -> Real
where
    S: LinkSource + Sync + ?Sized,
{
    let lattice = source.lattice();
    -beta * (lattice.number_of_points() * NUMBER_OF_PLANES) as Real * average_plaquette(source)
}
