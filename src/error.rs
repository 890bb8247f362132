//! Defines the different error types.
//!
//! Most of these errors describe a violated contract: the simulation has no way to recover
//! from a corrupted gauge field. The checked entry points return them so that the caller can
//! report the problem, the hot path of the sweep never produces them.

use std::error::Error;
use std::fmt::{self, Display};

/// Errors when accessing the lattice with unchecked coordinates or directions.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LatticeError {
    /// The direction is outside of `{0, 1, 2, 3}`. Contains the given direction.
    InvalidDirection(usize),
    /// The coordinate does not have the number of component of the lattice.
    DimensionMismatch {
        /// Dimension of the lattice.
        expected: usize,
        /// Number of components given.
        found: usize,
    },
}

impl Display for LatticeError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDirection(dir) => {
                write!(f, "invalid direction {}, expected a value in [0, 3]", dir)
            }
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "coordinate has {} components but the lattice has dimension {}",
                found, expected
            ),
        }
    }
}

impl Error for LatticeError {}

/// Error while generating an SU(3) matrix.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Su3Error {
    /// The QR factorization did not produce a well conditioned unitary factor.
    NumericDegeneracy,
}

impl Display for Su3Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NumericDegeneracy => write!(
                f,
                "the orthogonalization did not produce a well conditioned unitary matrix"
            ),
        }
    }
}

impl Error for Su3Error {}

/// Error while initializing a lattice
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LatticeInitializationError {
    /// The number of points per dimension must be greater or equal to 2.
    ExtentTooSmall,
}

impl Display for LatticeInitializationError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtentTooSmall => write!(
                f,
                "lattice initialization error : the extent must be greater or equal to 2"
            ),
        }
    }
}

impl Error for LatticeInitializationError {}

/// Invalid simulation parameter.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParameterError {
    /// `beta` is NaN or infinite.
    NonFiniteBeta,
    /// `beta` is strictly negative.
    NegativeBeta,
    /// the step size `eps` must be finite and strictly positive.
    InvalidStepSize(f64),
    /// `Ncor` must be at least 1.
    ZeroCorrelationLength,
    /// `Ncf` must be at least 1.
    ZeroConfigurationCount,
    /// The lattice extent is invalid, see [`LatticeInitializationError`].
    Lattice(LatticeInitializationError),
}

impl From<LatticeInitializationError> for ParameterError {
    #[inline]
    fn from(err: LatticeInitializationError) -> Self {
        Self::Lattice(err)
    }
}

impl Display for ParameterError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteBeta => write!(f, "beta must be a finite number"),
            Self::NegativeBeta => write!(f, "beta must be positive"),
            Self::InvalidStepSize(eps) => write!(
                f,
                "the step size must be finite and strictly positive, got {}",
                eps
            ),
            Self::ZeroCorrelationLength => write!(f, "Ncor must be at least 1"),
            Self::ZeroConfigurationCount => write!(f, "Ncf must be at least 1"),
            Self::Lattice(err) => write!(f, "{}", err),
        }
    }
}

impl Error for ParameterError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Lattice(err) => Some(err),
            _ => None,
        }
    }
}

/// Error while initializing a simulation.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimulationInitializationError {
    /// Invalid parameters, see [`ParameterError`].
    Parameter(ParameterError),
    /// The generation of a random SU(3) matrix failed, see [`Su3Error`].
    Su3Generation(Su3Error),
}

impl From<ParameterError> for SimulationInitializationError {
    #[inline]
    fn from(err: ParameterError) -> Self {
        Self::Parameter(err)
    }
}

impl From<LatticeInitializationError> for SimulationInitializationError {
    #[inline]
    fn from(err: LatticeInitializationError) -> Self {
        Self::Parameter(err.into())
    }
}

impl From<Su3Error> for SimulationInitializationError {
    #[inline]
    fn from(err: Su3Error) -> Self {
        Self::Su3Generation(err)
    }
}

impl Display for SimulationInitializationError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(err) => write!(f, "parameter error: {}", err),
            Self::Su3Generation(err) => write!(f, "SU(3) generation error: {}", err),
        }
    }
}

impl Error for SimulationInitializationError {
    #[inline]
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parameter(err) => Some(err),
            Self::Su3Generation(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            LatticeError::InvalidDirection(4).to_string(),
            "invalid direction 4, expected a value in [0, 3]"
        );
        assert_eq!(
            LatticeError::DimensionMismatch {
                expected: 4,
                found: 3
            }
            .to_string(),
            "coordinate has 3 components but the lattice has dimension 4"
        );
        let err = SimulationInitializationError::from(LatticeInitializationError::ExtentTooSmall);
        assert_eq!(
            err.to_string(),
            "parameter error: lattice initialization error : the extent must be greater or equal to 2"
        );
    }

    #[test]
    fn source() {
        let err = SimulationInitializationError::from(Su3Error::NumericDegeneracy);
        assert!(err.source().is_some());
        let err = ParameterError::from(LatticeInitializationError::ExtentTooSmall);
        assert!(err.source().is_some());
        assert!(ParameterError::NegativeBeta.source().is_none());
    }
}
