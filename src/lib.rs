//! # Lattice QCD Metropolis
//!
//! ![](https://img.shields.io/badge/language-Rust-orange)
//!
//! Monte Carlo simulation of a pure gauge SU(3) theory (Yang-Mills) on a periodic
//! four dimensional lattice.
//!
//! The crate generates equilibrated link configurations with a Metropolis algorithm and
//! measures the average plaquette `1/3 <Re(Tr(P_{mu nu}))>` on them.
//!
//! **Features**:
//! - Link matrices stored in a single flat buffer with periodic indexing;
//! - Local Wilson action, only the six plaquettes touching a link are evaluated per update;
//! - Pool of precomputed SU(3) perturbations close to the identity;
//! - Checkerboard sweep executed on a bounded pool of worker threads;
//! - Reproducible results for a given seed, whatever the number of threads;
//! - Serde support;
//!
//! **Not implemented**:
//! - Fermion support;
//! - Configuration file format for the gauge field;
//! - Distributed simulations;
//!
//! ## Usage
//!
//! Let us thermalize a `4^4` lattice at `beta = 5.5` and measure the average plaquette.
//!
//! ```rust
//! use lattice_qcd_metropolis::{
//!     config::{SimulationParameters, SweepConfig},
//!     simulation::LatticeSimulation,
//! };
//! use rand::SeedableRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rng = rand::rngs::StdRng::seed_from_u64(0); // change with your seed
//! let parameters = SimulationParameters::new(4, 5.5_f64, 5, 10, 0.24_f64)?;
//! let mut simulation = LatticeSimulation::new(parameters, SweepConfig::default(), rng)?;
//!
//! for _ in 0..simulation.ncor() {
//!     let report = simulation.run_sweep();
//!     println!("acceptance {}", report.acceptance_rate());
//! }
//! let average = simulation.average_plaquette();
//! assert!((-1_f64..=1_f64).contains(&average));
//! # Ok(())
//! # }
//! ```
//!
//! ## Discussion about Random Number Generators (RNGs)
//!
//! The simulation owns its random number generator, which must implement
//! [`rand::Rng`] and [`rand::SeedableRng`]. During a sweep the generator only draws one
//! seed per chunk of links; every chunk is then processed with its own generator of the same
//! type. Hence a simulation started with a given seed produces the same configurations on one
//! thread or on many.
//!
//! Some of the possible choice :
//! - **Recomanded** [`rand_xoshiro::Xoshiro256PlusPlus`](https://docs.rs/rand_xoshiro/0.6.0/rand_xoshiro/struct.Xoshiro256PlusPlus.html)
//! Non-cryptographic. It has good performance and statistical quality, reproducible.
//! - [`rand::rngs::StdRng`] cryptographic secure, can be seeded.
//! It is determinist but not reproducible between platform. It is however slower.

#![warn(clippy::cast_sign_loss)]
#![warn(clippy::cast_possible_truncation)]
#![warn(clippy::cast_possible_wrap)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(clippy::cognitive_complexity)]
#![warn(clippy::float_cmp_const)]
#![warn(clippy::implicit_hasher)]
#![warn(clippy::implicit_saturating_sub)]
#![warn(clippy::imprecise_flops)]
#![warn(clippy::large_types_passed_by_value)]
#![warn(clippy::macro_use_imports)]
#![warn(clippy::manual_ok_or)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::suboptimal_flops)]
#![warn(clippy::todo)]
#![warn(clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::unreadable_literal)]
#![warn(clippy::unseparated_literal_suffix)]
#![warn(clippy::unused_self)]
#![warn(clippy::missing_errors_doc)]
#![warn(missing_docs)]

pub use nalgebra::ComplexField;
pub use rand::{Rng, SeedableRng};

#[macro_use]
mod macro_def;
pub mod action;
pub mod config;
pub mod error;
pub mod field;
pub mod lattice;
pub mod observable;
pub mod prelude;
pub mod simulation;
pub mod statistics;
pub mod su3;
pub mod thread;

#[cfg(test)]
mod test;

/// alias for [`f64`]
pub type Real = f64;
/// easy to use alias for [`nalgebra::Complex::<Real>`]
pub type Complex = nalgebra::Complex<Real>;
/// alias for [`nalgebra::Matrix3<nalgebra::Complex>`]
pub type CMatrix3 = nalgebra::Matrix3<Complex>;

/// Complex 1
const ONE: Complex = Complex::new(1_f64, 0_f64);
/// Complex I
const I: Complex = Complex::new(0_f64, 1_f64);
