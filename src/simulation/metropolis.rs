//! Metropolis update of a single link.

use std::fmt::{self, Display};
use std::ops::{Add, AddAssign};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use crate::{
    action::{LinkOverride, LinkSource, WilsonAction},
    field::{GaugeField, PerturbationPool},
    lattice::LatticeLinkCanonical,
    CMatrix3, Real,
};

/// Metropolis acceptance test.
///
/// A change that does not increase the action (`delta_action <= 0`) is always accepted and no
/// random number is drawn. Otherwise a number `u` is drawn uniformly in `[0, 1)` and the change
/// is accepted if `u < exp(-delta_action)`.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::simulation::accept;
/// # use rand::{Rng, SeedableRng};
/// let mut rng = rand::rngs::StdRng::seed_from_u64(0);
/// let state = rng.clone();
/// assert!(accept(-1_f64, &mut rng));
/// assert!(accept(0_f64, &mut rng));
/// // no number was drawn
/// assert_eq!(rng.gen::<u64>(), state.clone().gen::<u64>());
/// assert!(!accept(f64::INFINITY, &mut rng));
/// ```
#[inline]
pub fn accept<R>(delta_action: Real, rng: &mut R) -> bool
where
    R: rand::Rng + ?Sized,
{
    if delta_action <= 0_f64 {
        return true;
    }
    rng.gen::<Real>() < (-delta_action).exp()
}

/// Probability `min(1, exp(-delta_action))` of accepting a change.
#[must_use]
#[inline]
pub fn acceptance_probability(delta_action: Real) -> Real {
    if delta_action <= 0_f64 {
        1_f64
    } else {
        (-delta_action).exp()
    }
}

/// Outcome of a Metropolis step computed without modifying the field.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkProposal {
    link: LatticeLinkCanonical,
    candidate: CMatrix3,
    delta_action: Real,
    accepted: bool,
}

impl LinkProposal {
    getter!(
        /// The link the proposal is for.
        pub const,
        link,
        LatticeLinkCanonical
    );
    getter!(
        /// The proposed matrix `U P`.
        pub const,
        candidate,
        CMatrix3
    );
    getter_copy!(
        /// Difference of the action between the candidate and the current matrix.
        pub const,
        delta_action,
        Real
    );

    /// Whether the candidate passed the acceptance test.
    #[must_use]
    #[inline]
    pub const fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// The matrix to write back, `None` if the proposal was rejected.
    #[must_use]
    #[inline]
    pub fn accepted_matrix(&self) -> Option<&CMatrix3> {
        self.accepted.then(|| &self.candidate)
    }

    /// Write the candidate into the field if it was accepted. Returns whether the field changed.
    #[inline]
    pub fn apply(&self, field: &mut GaugeField) -> bool {
        if let Some(matrix) = self.accepted_matrix() {
            *field.link_mut(&self.link) = *matrix;
        }
        self.accepted
    }
}

/// Acceptance statistics of a set of Metropolis steps, typically one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SweepReport {
    attempted: usize,
    accepted: usize,
    sum_acceptance_probability: Real,
}

impl SweepReport {
    /// Report with no step.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            attempted: 0,
            accepted: 0,
            sum_acceptance_probability: 0_f64,
        }
    }

    getter_copy!(
        /// Number of attempted updates.
        pub const,
        attempted,
        usize
    );
    getter_copy!(
        /// Number of accepted updates.
        pub const,
        accepted,
        usize
    );

    /// Record a proposal.
    #[inline]
    pub fn record(&mut self, proposal: &LinkProposal) {
        self.attempted += 1;
        if proposal.is_accepted() {
            self.accepted += 1;
        }
        self.sum_acceptance_probability += acceptance_probability(proposal.delta_action());
    }

    /// Fraction of accepted updates, 0 if nothing was attempted.
    #[allow(clippy::cast_precision_loss)] // the number of links is far below 2^52
    #[must_use]
    #[inline]
    pub fn acceptance_rate(&self) -> Real {
        if self.attempted == 0 {
            0_f64
        } else {
            self.accepted as Real / self.attempted as Real
        }
    }

    /// Mean of `min(1, exp(-dS))` over the attempted updates, 0 if nothing was attempted.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    #[inline]
    pub fn mean_acceptance_probability(&self) -> Real {
        if self.attempted == 0 {
            0_f64
        } else {
            self.sum_acceptance_probability / self.attempted as Real
        }
    }
}

impl AddAssign for SweepReport {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.attempted += rhs.attempted;
        self.accepted += rhs.accepted;
        self.sum_acceptance_probability += rhs.sum_acceptance_probability;
    }
}

impl Add for SweepReport {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Display for SweepReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} accepted ({:.3}), mean acceptance probability {:.3}",
            self.accepted,
            self.attempted,
            self.acceptance_rate(),
            self.mean_acceptance_probability()
        )
    }
}

/// Metropolis updater of the link matrices for the Wilson action.
///
/// A candidate for `U` is `U P` where `P` is drawn uniformly from a [`PerturbationPool`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MetropolisUpdater {
    action: WilsonAction,
    pool: PerturbationPool,
}

impl MetropolisUpdater {
    /// Create the updater.
    #[must_use]
    #[inline]
    pub const fn new(action: WilsonAction, pool: PerturbationPool) -> Self {
        Self { action, pool }
    }

    getter!(
        /// The action used for the acceptance test.
        pub const,
        action,
        WilsonAction
    );
    getter!(
        /// The perturbations the candidates are built from.
        pub const,
        pool,
        PerturbationPool
    );

    /// Compute a Metropolis step for `link` without modifying `source`.
    ///
    /// The random number generator draws the perturbation first then, only if the action
    /// increases, the number for the acceptance test.
    #[inline]
    pub fn propose<S, R>(&self, source: &S, link: &LatticeLinkCanonical, rng: &mut R) -> LinkProposal
    where
        S: LinkSource + ?Sized,
        R: rand::Rng + ?Sized,
    {
        let action_old = self.action.local_action(source, link);
        let candidate = source.link_matrix(link) * self.pool.random(rng);
        let action_new = self
            .action
            .local_action(&LinkOverride::new(source, link, &candidate), link);
        let delta_action = action_new - action_old;
        let accepted = accept(delta_action, rng);
        LinkProposal {
            link: *link,
            candidate,
            delta_action,
            accepted,
        }
    }

    /// Do a Metropolis step on `link`, modifying the field if the candidate is accepted.
    /// The matrix is left untouched on rejection.
    #[inline]
    pub fn update_in_place<R>(
        &self,
        field: &mut GaugeField,
        link: &LatticeLinkCanonical,
        rng: &mut R,
    ) -> LinkProposal
    where
        R: rand::Rng + ?Sized,
    {
        let proposal = self.propose(&*field, link, rng);
        proposal.apply(field);
        proposal
    }

    /// Do a Metropolis step on `link`. Returns whether the candidate was accepted.
    #[inline]
    pub fn try_update<R>(&self, field: &mut GaugeField, link: &LatticeLinkCanonical, rng: &mut R) -> bool
    where
        R: rand::Rng + ?Sized,
    {
        self.update_in_place(field, link, rng).is_accepted()
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::{
        lattice::{Direction, LatticeCyclic, LatticePoint},
        su3,
    };

    const EPSILON: f64 = 0.000_000_001_f64;
    const SEED_RNG: u64 = 0x45_78_93_f4_4a_b0_67_f0;

    #[test]
    fn accept_without_drawing() {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        for delta in [0_f64, -0_f64, -1E-12_f64, -3_f64, f64::NEG_INFINITY] {
            let mut copy = rng.clone();
            assert!(accept(delta, &mut rng));
            assert_eq!(copy.gen::<u64>(), rng.clone().gen::<u64>());
        }
        let accepted = (0..10_000).filter(|_| accept(1_f64, &mut rng)).count();
        let rate = accepted as f64 / 10_000_f64;
        assert!((rate - (-1_f64).exp()).abs() < 0.02_f64, "{}", rate);
        assert_eq!(acceptance_probability(-2_f64), 1_f64);
        assert!((acceptance_probability(2_f64) - (-2_f64).exp()).abs() < EPSILON);
    }

    #[test]
    fn report() {
        let mut report = SweepReport::new();
        assert_eq!(report.acceptance_rate(), 0_f64);
        assert_eq!(report.mean_acceptance_probability(), 0_f64);
        let link = LatticeLinkCanonical::new(LatticePoint::new_zero(), Direction::directions()[0]);
        let accepted = LinkProposal {
            link,
            candidate: CMatrix3::identity(),
            delta_action: -1_f64,
            accepted: true,
        };
        let rejected = LinkProposal {
            link,
            candidate: CMatrix3::identity(),
            delta_action: 2_f64,
            accepted: false,
        };
        report.record(&accepted);
        report.record(&rejected);
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.accepted(), 1);
        assert!((report.acceptance_rate() - 0.5_f64).abs() < EPSILON);
        assert!(
            (report.mean_acceptance_probability() - (1_f64 + (-2_f64).exp()) / 2_f64).abs()
                < EPSILON
        );
        let sum = report + report;
        assert_eq!(sum.attempted(), 4);
        assert!((sum.acceptance_rate() - 0.5_f64).abs() < EPSILON);
        assert_eq!(
            SweepReport::default().to_string(),
            "0/0 accepted (0.000), mean acceptance probability 0.000"
        );
    }

    #[test]
    fn proposal_does_not_modify() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let field = GaugeField::new_hot(LatticeCyclic::new(3)?, &mut rng);
        let updater = MetropolisUpdater::new(
            WilsonAction::new(5.5_f64),
            PerturbationPool::new(0.24_f64, &mut rng)?,
        );
        let copy = field.clone();
        for link in field.lattice().get_links().take(50) {
            let proposal = updater.propose(&field, &link, &mut rng);
            assert_matrix_is_su_3!(proposal.candidate(), EPSILON);
            // the candidate is a right multiplication by an element of the pool
            let perturbation = field.link(&link).adjoint() * proposal.candidate();
            assert!(updater
                .pool()
                .as_slice()
                .iter()
                .any(|p| (p - perturbation).norm() < EPSILON));
            if proposal.delta_action() <= 0_f64 {
                assert!(proposal.is_accepted());
            }
        }
        assert_eq!(field, copy);
        Ok(())
    }

    #[test]
    fn try_update() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let mut field = GaugeField::new_hot(LatticeCyclic::new(3)?, &mut rng);
        let updater = MetropolisUpdater::new(
            WilsonAction::new(5.5_f64),
            PerturbationPool::new(0.24_f64, &mut rng)?,
        );
        let links = field.lattice().get_links().collect::<Vec<_>>();
        let mut report = SweepReport::new();
        for link in &links {
            let before = *field.link(link);
            let local_before = updater.action().local_action(&field, link);
            let proposal = updater.update_in_place(&mut field, link, &mut rng);
            report.record(&proposal);
            let local_after = updater.action().local_action(&field, link);
            if proposal.is_accepted() {
                assert_eq!(field.link(link), proposal.candidate());
                assert!((local_after - local_before - proposal.delta_action()).abs() < 1E-8_f64);
            } else {
                // bit for bit
                assert_eq!(*field.link(link), before);
            }
            assert_matrix_is_su_3!(field.link(link), EPSILON);
        }
        assert_eq!(report.attempted(), links.len());
        // a hot start is far from equilibrium at large beta
        assert!(report.acceptance_rate() > 0.1_f64);
        let before = *field.link(&links[0]);
        if !updater.try_update(&mut field, &links[0], &mut rng) {
            assert_eq!(*field.link(&links[0]), before);
        }
        Ok(())
    }

    #[test]
    fn identity_perturbation_is_always_accepted() -> Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(SEED_RNG);
        let mut field = GaugeField::new_hot(LatticeCyclic::new(2)?, &mut rng);
        // a pool where every candidate equals the current link, dS = 0
        let pool = PerturbationPool::with_pairs(1, 1E-300_f64, &mut rng)?;
        assert_eq_matrix!(pool.as_slice()[0], CMatrix3::identity(), EPSILON);
        let updater = MetropolisUpdater::new(WilsonAction::new(1E6_f64), pool);
        let link = LatticeLinkCanonical::new(LatticePoint::new_zero(), Direction::directions()[1]);
        let m = su3::random_su3(&mut rng);
        *field.link_mut(&link) = m;
        for _ in 0..20 {
            let proposal = updater.propose(&field, &link, &mut rng);
            assert!(proposal.delta_action().abs() < 1E-6_f64);
            if proposal.delta_action() <= 0_f64 {
                assert!(proposal.is_accepted());
            }
        }
        Ok(())
    }
}
