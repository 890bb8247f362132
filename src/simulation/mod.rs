//! Simulation module. Contains the Metropolis algorithm, the sweep scheduler and the simulation
//! object tying them to a gauge field.
//!
//! [`LatticeSimulation`] owns every piece of state of a run: the link matrices, the pool of
//! perturbations and the random number generator. A sweep takes `&mut self`, so nothing can
//! observe the field while it is being updated.

mod metropolis;
mod sweep;

use std::panic;

pub use self::metropolis::{
    accept, acceptance_probability, LinkProposal, MetropolisUpdater, SweepReport,
};
pub use self::sweep::CheckerboardSweep;
use super::{
    action::WilsonAction,
    config::{SimulationParameters, SweepConfig},
    error::SimulationInitializationError,
    field::{GaugeField, PerturbationPool},
    lattice::LatticeCyclic,
    observable,
    thread::ThreadError,
    CMatrix3, Real,
};

/// A Metropolis simulation of the SU(3) gauge field on a periodic four dimensional lattice.
///
/// `Rng` is the random number generator, it drives the initialization and every sweep. See the
/// crate documentation for the choice of a generator.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::{config::{SimulationParameters, SweepConfig}, simulation::LatticeSimulation};
/// # use rand::SeedableRng;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let parameters = SimulationParameters::new(4, 5.5_f64, 2, 2, 0.24_f64)?;
/// let rng = rand::rngs::StdRng::seed_from_u64(0);
/// let mut simulation = LatticeSimulation::new(parameters, SweepConfig::default(), rng)?;
/// let state = simulation.export_state();
/// assert_eq!(state.len(), 4 * 4 * 4 * 4 * 4);
/// assert_eq!(state, simulation.export_state());
/// simulation.thermalize();
/// assert_eq!(simulation.sweep_count(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LatticeSimulation<Rng> {
    parameters: SimulationParameters,
    field: GaugeField,
    updater: MetropolisUpdater,
    sweep: CheckerboardSweep,
    rng: Rng,
    last_sweep_report: Option<SweepReport>,
    sweep_count: usize,
}

impl<Rng> LatticeSimulation<Rng>
where
    Rng: rand::Rng + rand::SeedableRng,
{
    /// Initialize the gauge field and the pool of perturbations from `rng`, in this order.
    ///
    /// # Errors
    /// Returns [`SimulationInitializationError::Parameter`] if the parameters are invalid and
    /// [`SimulationInitializationError::Su3Generation`] if a random SU(3) matrix could not be
    /// generated.
    #[inline]
    pub fn new(
        parameters: SimulationParameters,
        sweep_config: SweepConfig,
        mut rng: Rng,
    ) -> Result<Self, SimulationInitializationError> {
        parameters.validate()?;
        let lattice = LatticeCyclic::new(parameters.extent())?;
        let field = GaugeField::new(
            lattice,
            parameters.initial_condition(),
            parameters.step_size(),
            &mut rng,
        )?;
        let pool = PerturbationPool::new(parameters.step_size(), &mut rng)?;
        let updater = MetropolisUpdater::new(WilsonAction::new(parameters.beta()), pool);
        let sweep = CheckerboardSweep::new(field.lattice(), sweep_config);
        let simulation = Self {
            parameters,
            field,
            updater,
            sweep,
            rng,
            last_sweep_report: None,
            sweep_count: 0,
        };
        log::info!(
            "new simulation: extent {}, beta {}, eps {}, Ncor {}, Ncf {}, {:?} start, {} thread(s), initial plaquette {}",
            parameters.extent(),
            parameters.beta(),
            parameters.step_size(),
            parameters.correlation_length(),
            parameters.number_of_configurations(),
            parameters.initial_condition(),
            sweep_config.number_of_threads(),
            simulation.average_plaquette()
        );
        Ok(simulation)
    }

    /// Do one Metropolis step on every link, following the checkerboard decomposition.
    ///
    /// # Panics
    /// If a worker thread panics the panic is resumed on the calling thread.
    #[inline]
    pub fn run_sweep(&mut self) -> SweepReport {
        let report = match self
            .sweep
            .sweep(&self.updater, &mut self.field, &mut self.rng)
        {
            Ok(report) => report,
            Err(ThreadError::Panic(payload)) => panic::resume_unwind(payload),
            Err(ThreadError::ThreadNumberIncorrect) => {
                unreachable!("the number of threads is a non zero integer")
            }
        };
        self.sweep_count += 1;
        log::debug!("sweep {}: {}", self.sweep_count, report);
        self.last_sweep_report = Some(report);
        report
    }

    /// Run `number_of_sweeps` sweeps, returns the accumulated statistics.
    ///
    /// # Panics
    /// See [`Self::run_sweep`].
    #[inline]
    pub fn run_sweeps(&mut self, number_of_sweeps: usize) -> SweepReport {
        (0..number_of_sweeps).fold(SweepReport::new(), |report, _| report + self.run_sweep())
    }

    /// Run one block of [`Self::ncor`] sweeps to bring the field towards equilibrium. Between two
    /// measurements use [`Self::run_sweeps`] with [`Self::ncor`].
    ///
    /// # Panics
    /// See [`Self::run_sweep`].
    #[inline]
    pub fn thermalize(&mut self) -> SweepReport {
        self.run_sweeps(self.ncor())
    }
}

impl<Rng> LatticeSimulation<Rng> {
    /// Average over every point and plane of the plaquette, see
    /// [`observable::average_plaquette`].
    #[must_use]
    #[inline]
    pub fn average_plaquette(&self) -> Real {
        observable::average_plaquette(&self.field)
    }

    /// Copy of the link matrices, ordered with `x0` outermost, then `x1`, `x2`, `x3` and the
    /// direction innermost.
    #[must_use]
    #[inline]
    pub fn export_state(&self) -> Vec<CMatrix3> {
        self.field.export()
    }

    /// Project every link matrix back on SU(3) to remove the rounding drift.
    #[inline]
    pub fn normalize_link_matrices(&mut self) {
        self.field.normalize();
    }

    /// Number of sweeps between two measurements.
    #[must_use]
    #[inline]
    pub const fn ncor(&self) -> usize {
        self.parameters.correlation_length()
    }

    /// Number of measurements.
    #[must_use]
    #[inline]
    pub const fn ncf(&self) -> usize {
        self.parameters.number_of_configurations()
    }

    /// The coupling constant.
    #[must_use]
    #[inline]
    pub const fn beta(&self) -> Real {
        self.parameters.beta()
    }

    /// Spread of the perturbations.
    #[must_use]
    #[inline]
    pub const fn eps(&self) -> Real {
        self.parameters.step_size()
    }

    /// The lattice.
    #[must_use]
    #[inline]
    pub const fn lattice(&self) -> &LatticeCyclic {
        self.field.lattice()
    }

    getter!(
        /// The parameters of the simulation.
        pub const,
        parameters,
        SimulationParameters
    );
    getter!(
        /// The link matrices.
        pub const,
        field,
        GaugeField
    );
    getter!(
        /// The Metropolis updater with its pool of perturbations.
        pub const,
        updater,
        MetropolisUpdater
    );
    getter!(
        /// The random number generator.
        pub const,
        rng,
        Rng
    );
    getter_copy!(
        /// Statistics of the last sweep, `None` before the first sweep.
        pub const,
        last_sweep_report,
        Option<SweepReport>
    );
    getter_copy!(
        /// Number of sweeps done since the creation.
        pub const,
        sweep_count,
        usize
    );

    /// The sweep settings.
    #[must_use]
    #[inline]
    pub const fn sweep_config(&self) -> &SweepConfig {
        self.sweep.config()
    }

    /// Mutable access to the random number generator.
    #[must_use]
    #[inline]
    pub fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Consume the simulation and return the gauge field and the random number generator.
    #[must_use]
    #[inline]
    #[allow(clippy::missing_const_for_fn)] // the destructor cannot be evaluated in const context
    pub fn into_parts(self) -> (GaugeField, Rng) {
        (self.field, self.rng)
    }
}
