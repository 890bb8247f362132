//! provide statistical tools for the measurement series.
//!
//! The average plaquettes measured along a simulation form a time series, these functions
//! summarize it: mean, unbiased variance, standard error of the mean and normalized
//! auto-correlation.

use std::ops::Div;

use rayon::prelude::*;

use super::Real;

/// compute the mean of a collection.
///
/// # Example
/// ```
/// use lattice_qcd_metropolis::statistics::mean;
///
/// assert!((mean(&[1_f64, 2_f64, 3_f64, 4_f64]) - 2.5_f64).abs() < f64::EPSILON);
/// ```
#[allow(clippy::cast_precision_loss)]
#[inline]
pub fn mean<'a, T, IntoIter>(data: IntoIter) -> T
where
    T: Div<Real, Output = T> + std::iter::Sum<&'a T> + 'a,
    IntoIter: IntoIterator<Item = &'a T>,
    IntoIter::IntoIter: ExactSizeIterator,
{
    let iter = data.into_iter();
    let len = iter.len() as Real;
    let mean: T = iter.sum();
    mean / len
}

/// Compute the mean and the unbiased variance (squared of standard deviation) of a slice.
///
/// # Example
/// ```
/// use lattice_qcd_metropolis::statistics::mean_and_variance;
///
/// let [mean, variance] = mean_and_variance(&[1_f64, 2_f64, 3_f64, 4_f64]);
/// assert!((mean - 2.5_f64).abs() < 1E-12_f64);
/// assert!((variance - 5_f64 / 3_f64).abs() < 1E-12_f64);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
#[inline]
pub fn mean_and_variance(data: &[Real]) -> [Real; 2] {
    let mean = mean(data);
    let variance = data
        .par_iter()
        .map(|el| (el - mean) * (el - mean))
        .sum::<Real>()
        / (data.len() as Real - 1_f64);
    [mean, variance]
}

/// compute the unbiased variance of a slice.
#[must_use]
#[inline]
pub fn variance(data: &[Real]) -> Real {
    let [_, variance] = mean_and_variance(data);
    variance
}

/// compute the mean and the statistical error on this value of a slice.
///
/// The statistical error is defined by `sqrt(variance / len)`, it assumes uncorrelated data.
///
/// # Example
/// ```
/// use lattice_qcd_metropolis::statistics::mean_with_error;
///
/// let [mean, error] = mean_with_error(&[1_f64; 10]);
/// assert_eq!(mean, 1_f64);
/// assert_eq!(error, 0_f64);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
#[inline]
pub fn mean_with_error(data: &[Real]) -> [Real; 2] {
    let [mean, variance] = mean_and_variance(data);
    [mean, (variance / data.len() as Real).sqrt()]
}

/// Normalized auto-correlation of a time series at the given lag,
/// `<(x_t - m)(x_{t + lag} - m)> / <(x_t - m)^2>`.
///
/// Returns `None` if `lag` is not smaller than the length of the series or if the series is
/// constant.
///
/// # Example
/// ```
/// use lattice_qcd_metropolis::statistics::auto_correlation;
///
/// let alternating = [1_f64, -1_f64, 1_f64, -1_f64, 1_f64, -1_f64];
/// let c = auto_correlation(&alternating, 1).unwrap();
/// assert!((c + 1_f64).abs() < 1E-12_f64);
/// assert_eq!(auto_correlation(&alternating, 6), None);
/// assert_eq!(auto_correlation(&[2_f64; 4], 1), None);
/// ```
#[allow(clippy::cast_precision_loss)]
#[must_use]
#[inline]
pub fn auto_correlation(data: &[Real], lag: usize) -> Option<Real> {
    if lag >= data.len() {
        return None;
    }
    let mean = mean(data);
    let variance = data
        .par_iter()
        .map(|el| (el - mean) * (el - mean))
        .sum::<Real>()
        / data.len() as Real;
    if variance <= 0_f64 {
        return None;
    }
    let covariance = data[..data.len() - lag]
        .par_iter()
        .zip(data[lag..].par_iter())
        .map(|(a, b)| (a - mean) * (b - mean))
        .sum::<Real>()
        / (data.len() - lag) as Real;
    Some(covariance / variance)
}
