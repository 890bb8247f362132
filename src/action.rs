//! Wilson gauge action and plaquettes.
//!
//! The functions are generic over a [`LinkSource`] so that the action can be evaluated on a
//! [`GaugeField`] or on a field where a single link is replaced by a candidate
//! ([`LinkOverride`]) without mutating the field.

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::{
    field::GaugeField,
    lattice::{Direction, LatticeCyclic, LatticeLinkCanonical, LatticePoint},
    CMatrix3, Real,
};

/// Read only access to the link matrices of a lattice.
pub trait LinkSource {
    /// The lattice the links live on.
    fn lattice(&self) -> &LatticeCyclic;

    /// Link matrix of a canonical link, the position is taken modulo the extent.
    fn link_matrix(&self, link: &LatticeLinkCanonical) -> &CMatrix3;
}

impl LinkSource for GaugeField {
    #[inline]
    fn lattice(&self) -> &LatticeCyclic {
        GaugeField::lattice(self)
    }

    #[inline]
    fn link_matrix(&self, link: &LatticeLinkCanonical) -> &CMatrix3 {
        self.link(link)
    }
}

/// A [`LinkSource`] identical to another one except for one link.
#[derive(Debug, Clone, Copy)]
pub struct LinkOverride<'a, S: ?Sized> {
    source: &'a S,
    index: usize,
    matrix: &'a CMatrix3,
}

impl<'a, S: LinkSource + ?Sized> LinkOverride<'a, S> {
    /// Replace the matrix of `link` by `matrix`.
    #[must_use]
    #[inline]
    pub fn new(source: &'a S, link: &LatticeLinkCanonical, matrix: &'a CMatrix3) -> Self {
        Self {
            source,
            index: source.lattice().link_index(link),
            matrix,
        }
    }
}

impl<'a, S: LinkSource + ?Sized> LinkSource for LinkOverride<'a, S> {
    #[inline]
    fn lattice(&self) -> &LatticeCyclic {
        self.source.lattice()
    }

    #[inline]
    fn link_matrix(&self, link: &LatticeLinkCanonical) -> &CMatrix3 {
        if self.source.lattice().link_index(link) == self.index {
            self.matrix
        } else {
            self.source.link_matrix(link)
        }
    }
}

/// Plaquette `1/3 Re(Tr(U_mu(x) U_nu(x + mu) U_mu(x + nu)^dagger U_nu(x)^dagger))`.
///
/// It is in `[-1, 1]` for SU(3) links and exactly 1 if `mu == nu`.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{action::plaquette, field::GaugeField, lattice::{Direction, LatticeCyclic, LatticePoint}};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let field = GaugeField::new_cold(LatticeCyclic::new(4)?);
/// let p = plaquette(&field, &LatticePoint::new_zero(), Direction::new(0)?, Direction::new(3)?);
/// assert!((p - 1_f64).abs() < 1E-12_f64);
/// # Ok(())
/// # }
/// ```
#[must_use]
#[inline]
pub fn plaquette<S>(source: &S, point: &LatticePoint, mu: Direction, nu: Direction) -> Real
where
    S: LinkSource + ?Sized,
{
    if mu == nu {
        return 1_f64;
    }
    let lattice = source.lattice();
    let point_mu = lattice.add_point_direction(*point, mu);
    let point_nu = lattice.add_point_direction(*point, nu);
    let u_mu = source.link_matrix(&lattice.link_canonical(*point, mu));
    let u_nu_shifted = source.link_matrix(&LatticeLinkCanonical::new(point_mu, nu));
    let u_mu_shifted = source.link_matrix(&LatticeLinkCanonical::new(point_nu, mu));
    let u_nu = source.link_matrix(&lattice.link_canonical(*point, nu));
    (u_mu * u_nu_shifted * u_mu_shifted.adjoint() * u_nu.adjoint())
        .trace()
        .re
        / 3_f64
}

/// Wilson action `S = -beta sum_{x, mu < nu} P_{mu nu}(x)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WilsonAction {
    beta: Real,
}

impl WilsonAction {
    /// Create the action for the coupling `beta`.
    #[must_use]
    #[inline]
    pub const fn new(beta: Real) -> Self {
        Self { beta }
    }

    getter_copy!(
        /// The coupling constant.
        pub const,
        beta,
        Real
    );

    /// Part of the action which depends on the given link.
    ///
    /// For `mu` the direction of the link at `x`, it is `-beta` times the sum over the three
    /// directions `nu` orthogonal to `mu` of `P_{mu nu}(x) + P_{mu nu}(x - nu)`.
    #[must_use]
    #[inline]
    pub fn local_action<S>(&self, source: &S, link: &LatticeLinkCanonical) -> Real
    where
        S: LinkSource + ?Sized,
    {
        let lattice = source.lattice();
        let point = lattice.wrap_point(*link.pos());
        let mu = link.dir();
        let sum = mu
            .orthogonal_directions()
            .iter()
            .map(|nu| {
                let point_minus_nu = lattice.sub_point_direction(point, *nu);
                plaquette(source, &point, mu, *nu) + plaquette(source, &point_minus_nu, mu, *nu)
            })
            .sum::<Real>();
        -self.beta * sum
    }

    /// Full action of the lattice, `-beta` times the sum of the plaquettes of every point and
    /// plane.
    #[must_use]
    #[inline]
    pub fn total_action<S>(&self, source: &S) -> Real
    where
        S: LinkSource + ?Sized,
    {
        let lattice = source.lattice();
        let sum = lattice
            .get_points()
            .map(|point| {
                Direction::planes()
                    .iter()
                    .map(|(mu, nu)| plaquette(source, &point, *mu, *nu))
                    .sum::<Real>()
            })
            .sum::<Real>();
        -self.beta * sum
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{error::LatticeInitializationError, su3};

    const EPSILON: f64 = 0.000_000_001_f64;
    const SEED_RNG: u64 = 0x45_78_93_f4_4a_b0_67_f0;

    fn hot_field(dim: usize) -> Result<GaugeField, LatticeInitializationError> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        Ok(GaugeField::new_hot(LatticeCyclic::new(dim)?, &mut rng))
    }

    #[test]
    fn plaquette_range() -> Result<(), LatticeInitializationError> {
        let field = hot_field(3)?;
        for point in field.lattice().get_points() {
            for mu in Direction::directions() {
                assert_eq!(plaquette(&field, &point, mu, mu), 1_f64);
                for nu in mu.orthogonal_directions() {
                    let p = plaquette(&field, &point, mu, nu);
                    assert!((-1_f64..=1_f64).contains(&p), "{}", p);
                    // swapping the plane gives the conjugate loop
                    assert_abs_diff_eq!(p, plaquette(&field, &point, nu, mu), epsilon = EPSILON);
                }
            }
        }
        Ok(())
    }

    #[test]
    fn trace_cyclicity() -> Result<(), LatticeInitializationError> {
        let field = hot_field(3)?;
        let lattice = field.lattice();
        for point in lattice.get_points() {
            for (mu, nu) in Direction::planes() {
                let u_mu = field.link(&LatticeLinkCanonical::new(point, mu));
                let u_nu = field.link(&LatticeLinkCanonical::new(point, nu));
                let u_nu_shifted = field.link(&LatticeLinkCanonical::new(
                    lattice.add_point_direction(point, mu),
                    nu,
                ));
                let u_mu_shifted = field.link(&LatticeLinkCanonical::new(
                    lattice.add_point_direction(point, nu),
                    mu,
                ));
                // the same loop starting from x + mu
                let rotated =
                    (u_nu_shifted * u_mu_shifted.adjoint() * u_nu.adjoint() * u_mu).trace().re
                        / 3_f64;
                assert_abs_diff_eq!(plaquette(&field, &point, mu, nu), rotated, epsilon = EPSILON);
            }
        }
        Ok(())
    }

    #[test]
    fn cold_lattice() -> Result<(), Box<dyn std::error::Error>> {
        let beta = 5.5_f64;
        let action = WilsonAction::new(beta);
        let field = GaugeField::new_cold(LatticeCyclic::new(4)?);
        for link in field.lattice().get_links() {
            assert_abs_diff_eq!(action.local_action(&field, &link), -6_f64 * beta, epsilon = EPSILON);
        }
        assert_abs_diff_eq!(
            action.total_action(&field),
            -beta * 6_f64 * 256_f64,
            epsilon = EPSILON
        );
        Ok(())
    }

    #[test]
    fn local_action_is_the_dependency_of_the_total_action() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let action = WilsonAction::new(2_f64);
        let mut field = hot_field(3)?;
        let lattice = field.lattice().clone();
        for index in [0_usize, 17, 101, 250, lattice.number_of_canonical_links_space() - 1] {
            let link = lattice.index_to_link(index).ok_or("index out of bound")?;
            let candidate = su3::random_su3(&mut rng);

            let local_before = action.local_action(&field, &link);
            let local_after =
                action.local_action(&LinkOverride::new(&field, &link, &candidate), &link);
            let total_before = action.total_action(&field);
            *field.link_mut(&link) = candidate;
            let total_after = action.total_action(&field);
            assert_abs_diff_eq!(
                local_after - local_before,
                total_after - total_before,
                epsilon = 1E-8_f64
            );
            assert_abs_diff_eq!(action.local_action(&field, &link), local_after, epsilon = EPSILON);
        }
        Ok(())
    }

    #[test]
    fn link_override() -> Result<(), Box<dyn std::error::Error>> {
        let field = hot_field(2)?;
        let link = LatticeLinkCanonical::new(LatticePoint::from([1, 0, 1, 1]), Direction::new(2)?);
        let identity = CMatrix3::identity();
        let overlay = LinkOverride::new(&field, &link, &identity);
        for other in field.lattice().get_links() {
            if other == link {
                assert_eq!(*overlay.link_matrix(&other), identity);
            } else {
                assert_eq!(overlay.link_matrix(&other), field.link(&other));
            }
        }
        // wrapped positions resolve to the same link
        let wrapped = LatticeLinkCanonical::new(LatticePoint::from([3, 2, 1, 5]), Direction::new(2)?);
        assert_eq!(*overlay.link_matrix(&wrapped), identity);
        Ok(())
    }
}
