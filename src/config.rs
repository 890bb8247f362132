//! Parameters of a simulation.
//!
//! [`SimulationParameters`] holds the physics of the run and is validated on creation,
//! [`SweepConfig`] only affects how a sweep is executed and never changes the results.

use std::num::NonZeroUsize;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

use super::{
    error::ParameterError,
    field::InitialCondition,
    lattice::LatticeCyclic,
    Real,
};

/// Parameters of a simulation.
///
/// # Example
/// ```
/// # use lattice_qcd_metropolis::config::SimulationParameters;
/// let parameters = SimulationParameters::default();
/// assert_eq!(parameters.extent(), 8);
/// assert_eq!(parameters.correlation_length(), 50);
/// assert_eq!(parameters.number_of_configurations(), 1000);
/// assert!(SimulationParameters::new(4, -1_f64, 5, 10, 0.24_f64).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct SimulationParameters {
    extent: usize,
    beta: Real,
    correlation_length: usize,
    number_of_configurations: usize,
    step_size: Real,
    initial_condition: InitialCondition,
}

impl SimulationParameters {
    /// Create validated parameters with a hot start.
    ///
    /// - `extent`: number of points in each direction (`n`), at least 2;
    /// - `beta`: coupling constant, finite and positive;
    /// - `correlation_length`: number of sweeps between two measurements (`Ncor`), at least 1;
    /// - `number_of_configurations`: number of measurements (`Ncf`), at least 1;
    /// - `step_size`: spread of the random matrices close to unity (`eps`), finite and strictly
    /// positive.
    ///
    /// The default [`InitialCondition::Hot`] start draws the links with
    /// [`crate::su3::random_su3`] and does not depend on `step_size`, which then only sets the
    /// spread of the Metropolis perturbations. Use [`InitialCondition::NearUnity`] for links
    /// drawn close to the identity with `step_size`.
    ///
    /// # Errors
    /// Returns the [`ParameterError`] of the first invalid parameter.
    #[inline]
    pub fn new(
        extent: usize,
        beta: Real,
        correlation_length: usize,
        number_of_configurations: usize,
        step_size: Real,
    ) -> Result<Self, ParameterError> {
        let parameters = Self {
            extent,
            beta,
            correlation_length,
            number_of_configurations,
            step_size,
            initial_condition: InitialCondition::default(),
        };
        parameters.validate()?;
        Ok(parameters)
    }

    /// Check every parameter. Useful for deserialized values.
    ///
    /// # Errors
    /// Returns the [`ParameterError`] of the first invalid parameter.
    #[inline]
    pub fn validate(&self) -> Result<(), ParameterError> {
        LatticeCyclic::new(self.extent)?;
        if !self.beta.is_finite() {
            return Err(ParameterError::NonFiniteBeta);
        }
        if self.beta < 0_f64 {
            return Err(ParameterError::NegativeBeta);
        }
        if self.correlation_length == 0 {
            return Err(ParameterError::ZeroCorrelationLength);
        }
        if self.number_of_configurations == 0 {
            return Err(ParameterError::ZeroConfigurationCount);
        }
        if !self.step_size.is_finite() || self.step_size <= 0_f64 {
            return Err(ParameterError::InvalidStepSize(self.step_size));
        }
        Ok(())
    }

    /// Replace the initial condition of the gauge field.
    #[must_use]
    #[inline]
    pub const fn with_initial_condition(mut self, initial_condition: InitialCondition) -> Self {
        self.initial_condition = initial_condition;
        self
    }

    getter_copy!(
        /// Number of points in each direction.
        pub const,
        extent,
        usize
    );
    getter_copy!(
        /// The coupling constant.
        pub const,
        beta,
        Real
    );
    getter_copy!(
        /// Number of sweeps between two measurements, `Ncor`.
        pub const,
        correlation_length,
        usize
    );
    getter_copy!(
        /// Number of measurements, `Ncf`.
        pub const,
        number_of_configurations,
        usize
    );
    getter_copy!(
        /// Spread of the random SU(3) matrices close to unity, `eps`.
        pub const,
        step_size,
        Real
    );
    getter_copy!(
        /// How the gauge field is initialized.
        pub const,
        initial_condition,
        InitialCondition
    );
}

impl Default for SimulationParameters {
    #[inline]
    fn default() -> Self {
        Self {
            extent: 8,
            beta: 5.5_f64,
            correlation_length: 50,
            number_of_configurations: 1000,
            step_size: 0.24_f64,
            initial_condition: InitialCondition::default(),
        }
    }
}

/// Execution settings of a sweep.
///
/// The results of a simulation for a given seed do not depend on these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
pub struct SweepConfig {
    number_of_threads: NonZeroUsize,
    chunk_size: NonZeroUsize,
}

/// Default number of links processed by a job of the worker pool.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

const ONE_THREAD: NonZeroUsize = match NonZeroUsize::new(1) {
    Some(n) => n,
    None => panic!("1 is not zero"),
};

const DEFAULT_CHUNK_SIZE_NON_ZERO: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CHUNK_SIZE) {
    Some(n) => n,
    None => panic!("the default chunk size is not zero"),
};

impl SweepConfig {
    /// Create a new config.
    #[must_use]
    #[inline]
    pub const fn new(number_of_threads: NonZeroUsize, chunk_size: NonZeroUsize) -> Self {
        Self {
            number_of_threads,
            chunk_size,
        }
    }

    /// Run the sweep on the calling thread only.
    #[must_use]
    #[inline]
    pub const fn single_threaded() -> Self {
        Self {
            number_of_threads: ONE_THREAD,
            chunk_size: DEFAULT_CHUNK_SIZE_NON_ZERO,
        }
    }

    getter_copy!(
        /// Number of worker threads.
        pub const,
        number_of_threads,
        NonZeroUsize
    );
    getter_copy!(
        /// Number of links per job.
        pub const,
        chunk_size,
        NonZeroUsize
    );
}

impl Default for SweepConfig {
    /// Uses [`std::thread::available_parallelism`], or one thread if it is not available.
    #[inline]
    fn default() -> Self {
        Self {
            number_of_threads: std::thread::available_parallelism().unwrap_or(ONE_THREAD),
            chunk_size: DEFAULT_CHUNK_SIZE_NON_ZERO,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::LatticeInitializationError;

    #[test]
    fn default_parameters() {
        let parameters = SimulationParameters::default();
        assert_eq!(parameters.extent(), 8);
        assert!((parameters.beta() - 5.5_f64).abs() < f64::EPSILON);
        assert_eq!(parameters.correlation_length(), 50);
        assert_eq!(parameters.number_of_configurations(), 1000);
        assert!((parameters.step_size() - 0.24_f64).abs() < f64::EPSILON);
        assert_eq!(parameters.initial_condition(), InitialCondition::Hot);
        assert_eq!(parameters.validate(), Ok(()));
    }

    #[test]
    fn validation() {
        assert_eq!(
            SimulationParameters::new(1, 5.5_f64, 5, 10, 0.24_f64),
            Err(ParameterError::Lattice(LatticeInitializationError::ExtentTooSmall))
        );
        assert_eq!(
            SimulationParameters::new(4, f64::NAN, 5, 10, 0.24_f64),
            Err(ParameterError::NonFiniteBeta)
        );
        assert_eq!(
            SimulationParameters::new(4, -0.1_f64, 5, 10, 0.24_f64),
            Err(ParameterError::NegativeBeta)
        );
        assert_eq!(
            SimulationParameters::new(4, 5.5_f64, 0, 10, 0.24_f64),
            Err(ParameterError::ZeroCorrelationLength)
        );
        assert_eq!(
            SimulationParameters::new(4, 5.5_f64, 5, 0, 0.24_f64),
            Err(ParameterError::ZeroConfigurationCount)
        );
        assert_eq!(
            SimulationParameters::new(4, 5.5_f64, 5, 10, 0_f64),
            Err(ParameterError::InvalidStepSize(0_f64))
        );
        assert!(SimulationParameters::new(4, 0_f64, 1, 1, f64::INFINITY).is_err());
        let parameters = SimulationParameters::new(2, 0_f64, 1, 1, 1_f64)
            .map(|p| p.with_initial_condition(InitialCondition::Cold));
        assert_eq!(
            parameters.map(|p| p.initial_condition()),
            Ok(InitialCondition::Cold)
        );
    }

    #[test]
    fn sweep_config() {
        let config = SweepConfig::default();
        assert!(config.number_of_threads().get() >= 1);
        assert_eq!(config.chunk_size().get(), DEFAULT_CHUNK_SIZE);
        assert_eq!(SweepConfig::single_threaded().number_of_threads().get(), 1);
    }
}
