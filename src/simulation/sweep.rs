//! Checkerboard sweep over every link of the lattice.
//!
//! A sweep visits the points of odd parity then the points of even parity. Inside a parity the
//! directions are visited one after the other, giving eight sub-phases `(parity, mu)`. The local
//! action of `U_mu(x)` only reads the links `U_mu` at `x` and at the neighbours `x +/- nu` of
//! opposite parity, so the updates of a sub-phase are independent of each other. They are
//! computed against an immutable borrow of the field and written back once the sub-phase is
//! over.
//!
//! The links of a sub-phase are split in chunks. Each chunk receives a seed drawn from the
//! random number generator of the simulation, in order, and is processed with its own generator
//! seeded with it. The result of a sweep therefore only depends on the seed, not on the number
//! of threads or on the scheduling.

use rand::{Rng, SeedableRng};

use super::metropolis::{MetropolisUpdater, SweepReport};
use crate::{
    config::SweepConfig,
    field::GaugeField,
    lattice::{Direction, LatticeCyclic, LatticeLinkCanonical, LatticePoint, Parity},
    thread::{run_pool_parallel, ThreadError},
    CMatrix3,
};

/// Accepted matrices of a chunk together with the statistics of the chunk.
type ChunkResult = (Vec<(usize, CMatrix3)>, SweepReport);

/// Scheduler of the Metropolis updates over the lattice.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckerboardSweep {
    /// Points of each parity, in the order of [`Parity::SWEEP_ORDER`].
    points: [Vec<LatticePoint>; 2],
    config: SweepConfig,
    parallel: bool,
}

impl CheckerboardSweep {
    /// Precompute the parity classes of the lattice.
    ///
    /// If the extent is odd two neighbours can have the same parity, the sweep is then done
    /// sequentially with in place updates.
    #[must_use]
    #[inline]
    pub fn new(lattice: &LatticeCyclic, config: SweepConfig) -> Self {
        let points = Parity::SWEEP_ORDER.map(|parity| {
            lattice
                .points_index_of_parity(parity)
                .into_iter()
                .filter_map(|index| lattice.index_to_point(index))
                .collect::<Vec<_>>()
        });
        let parallel = lattice.has_checkerboard();
        if !parallel {
            log::warn!(
                "the extent {} is odd, the checkerboard is not a proper colouring of the lattice; \
                 the sweeps are run sequentially",
                lattice.dim()
            );
        }
        Self {
            points,
            config,
            parallel,
        }
    }

    getter!(
        /// The execution settings.
        pub const,
        config,
        SweepConfig
    );

    /// Whether the sub-phases are distributed over the worker threads.
    #[must_use]
    #[inline]
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Points of the given parity.
    #[must_use]
    #[inline]
    pub fn points(&self, parity: Parity) -> &[LatticePoint] {
        match parity {
            Parity::Odd => &self.points[0],
            Parity::Even => &self.points[1],
        }
    }

    /// Number of workers started for `number_of_jobs` jobs, never more than the jobs themselves.
    fn worker_count(&self, number_of_jobs: usize) -> usize {
        self.config.number_of_threads().get().min(number_of_jobs).max(1)
    }

    /// The eight sub-phases of a sweep, in order.
    #[inline]
    pub fn sub_phases() -> impl Iterator<Item = (Parity, Direction)> {
        Parity::SWEEP_ORDER.into_iter().flat_map(|parity| {
            Direction::directions()
                .into_iter()
                .map(move |dir| (parity, dir))
        })
    }

    /// Do one Metropolis step on every link of the lattice.
    ///
    /// # Errors
    /// Returns [`ThreadError::Panic`] if a worker thread panicked, the field is then left as it
    /// was at the end of the previous sub-phase.
    #[inline]
    pub fn sweep<R>(
        &self,
        updater: &MetropolisUpdater,
        field: &mut GaugeField,
        rng: &mut R,
    ) -> Result<SweepReport, ThreadError>
    where
        R: Rng + SeedableRng,
    {
        let mut report = SweepReport::new();
        for (parity, dir) in Self::sub_phases() {
            let points = self.points(parity);
            let seeds = points
                .chunks(self.config.chunk_size().get())
                .map(|_| rng.gen::<u64>())
                .collect::<Vec<_>>();
            let phase_report = if self.parallel {
                self.sub_phase_parallel::<R>(updater, field, points, dir, &seeds)?
            } else {
                self.sub_phase_sequential::<R>(updater, field, points, dir, &seeds)
            };
            log::trace!("sub-phase ({}, {}): {}", parity, dir, phase_report);
            report += phase_report;
        }
        Ok(report)
    }

    /// Updates of a sub-phase computed in parallel on the snapshot of the field, written back
    /// after every worker is joined.
    fn sub_phase_parallel<R>(
        &self,
        updater: &MetropolisUpdater,
        field: &mut GaugeField,
        points: &[LatticePoint],
        dir: Direction,
        seeds: &[u64],
    ) -> Result<SweepReport, ThreadError>
    where
        R: Rng + SeedableRng,
    {
        let chunks = points
            .chunks(self.config.chunk_size().get())
            .collect::<Vec<_>>();
        let snapshot: &GaugeField = field;
        let results = run_pool_parallel(
            0..chunks.len(),
            &(),
            &|chunk_index: &usize, _: &()| {
                let mut rng = R::seed_from_u64(seeds[*chunk_index]);
                let mut accepted = Vec::new();
                let mut report = SweepReport::new();
                for point in chunks[*chunk_index] {
                    let link = LatticeLinkCanonical::new(*point, dir);
                    let proposal = updater.propose(snapshot, &link, &mut rng);
                    report.record(&proposal);
                    if let Some(matrix) = proposal.accepted_matrix() {
                        accepted.push((snapshot.lattice().link_index(&link), *matrix));
                    }
                }
                (accepted, report)
            },
            self.worker_count(chunks.len()),
            chunks.len(),
        )?;

        let mut results = results.into_iter().collect::<Vec<(usize, ChunkResult)>>();
        results.sort_unstable_by_key(|(chunk_index, _)| *chunk_index);
        let mut report = SweepReport::new();
        for (_, (accepted, chunk_report)) in results {
            field.write_back(accepted);
            report += chunk_report;
        }
        Ok(report)
    }

    /// Updates of a sub-phase done one after the other directly in the field.
    fn sub_phase_sequential<R>(
        &self,
        updater: &MetropolisUpdater,
        field: &mut GaugeField,
        points: &[LatticePoint],
        dir: Direction,
        seeds: &[u64],
    ) -> SweepReport
    where
        R: Rng + SeedableRng,
    {
        let mut report = SweepReport::new();
        for (chunk, seed) in points.chunks(self.config.chunk_size().get()).zip(seeds) {
            let mut rng = R::seed_from_u64(*seed);
            for point in chunk {
                let link = LatticeLinkCanonical::new(*point, dir);
                report.record(&updater.update_in_place(field, &link, &mut rng));
            }
        }
        report
    }
}
