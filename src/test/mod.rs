//! Module for tests of the whole simulation

use std::error::Error;
use std::num::NonZeroUsize;

use rand::{rngs::StdRng, SeedableRng};

use super::{
    config::{SimulationParameters, SweepConfig},
    field::InitialCondition,
    simulation::LatticeSimulation,
    su3::is_matrix_su3,
};

/// Defines a small value to compare f64.
const EPSILON: f64 = 0.000_000_001_f64;

const SEED_RNG: u64 = 0x45_78_93_f4_4a_b0_67_f0;

fn config(threads: usize) -> Result<SweepConfig, Box<dyn Error>> {
    Ok(SweepConfig::new(
        NonZeroUsize::new(threads).ok_or("zero threads")?,
        NonZeroUsize::new(32).ok_or("zero chunk size")?,
    ))
}

fn new_simulation(
    parameters: SimulationParameters,
    threads: usize,
) -> Result<LatticeSimulation<StdRng>, Box<dyn Error>> {
    Ok(LatticeSimulation::new(
        parameters,
        config(threads)?,
        StdRng::seed_from_u64(SEED_RNG),
    )?)
}

#[test]
fn one_sweep_keeps_su3() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(4, 5.5_f64, 50, 1000, 0.24_f64)?;
    let mut simulation = new_simulation(parameters, 4)?;
    assert_eq!(simulation.ncor(), 50);
    assert_eq!(simulation.ncf(), 1000);
    assert!(simulation.last_sweep_report().is_none());

    let report = simulation.run_sweep();
    assert_eq!(report.attempted(), 4 * 4 * 4 * 4 * 4);
    assert!(report.accepted() > 0);
    assert_eq!(simulation.last_sweep_report(), Some(report));
    for m in simulation.export_state() {
        assert!(is_matrix_su3(&m, EPSILON));
        assert_matrix_is_su_3!(m, EPSILON);
    }
    Ok(())
}

#[test]
fn export_is_stable() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(3, 5.5_f64, 1, 1, 0.24_f64)?;
    let mut simulation = new_simulation(parameters, 2)?;
    assert_eq!(simulation.export_state(), simulation.export_state());
    let before = simulation.export_state();
    simulation.run_sweep();
    let after = simulation.export_state();
    assert_eq!(after, simulation.export_state());
    assert_ne!(before, after);
    assert_eq!(after.len(), simulation.lattice().number_of_canonical_links_space());
    Ok(())
}

#[test]
fn reproducible_whatever_the_number_of_threads() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(4, 5.5_f64, 3, 1, 0.24_f64)?;
    let mut single = new_simulation(parameters, 1)?;
    let mut multi = new_simulation(parameters, 4)?;
    assert_eq!(single.export_state(), multi.export_state());
    let report_single = single.thermalize();
    let report_multi = multi.thermalize();
    assert_eq!(report_single, report_multi);
    assert_eq!(single.export_state(), multi.export_state());
    Ok(())
}

#[test]
fn hot_start_plaquette() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(4, 5.5_f64, 1, 1, 0.24_f64)?;
    let simulation = new_simulation(parameters, 1)?;
    let plaquette = simulation.average_plaquette();
    assert!(plaquette.abs() < 0.05_f64, "{}", plaquette);
    Ok(())
}

#[test]
fn cold_and_near_unity_start() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(2, 5.5_f64, 1, 1, 0.24_f64)?
        .with_initial_condition(InitialCondition::Cold);
    let simulation = new_simulation(parameters, 1)?;
    assert!((simulation.average_plaquette() - 1_f64).abs() < EPSILON);

    let parameters = parameters.with_initial_condition(InitialCondition::NearUnity);
    let simulation = new_simulation(parameters, 1)?;
    let plaquette = simulation.average_plaquette();
    assert!(plaquette > 0.5_f64 && plaquette < 1_f64, "{}", plaquette);
    Ok(())
}

#[test]
fn large_beta_orders_the_field() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(2, 20_f64, 100, 1, 0.24_f64)?;
    let mut simulation = new_simulation(parameters, 2)?;
    let initial = simulation.average_plaquette();
    simulation.thermalize();
    let last = simulation.average_plaquette();
    assert!(last > 0.5_f64, "{} -> {}", initial, last);
    assert!(last > initial + 0.4_f64, "{} -> {}", initial, last);

    let parameters = parameters.with_initial_condition(InitialCondition::Cold);
    let mut simulation = new_simulation(parameters, 2)?;
    simulation.run_sweeps(10);
    assert!(simulation.average_plaquette() > 0.75_f64);
    Ok(())
}

#[test]
fn normalization_after_many_sweeps() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(2, 5.5_f64, 1, 1, 0.24_f64)?;
    let mut simulation = new_simulation(parameters, 3)?;
    let report = simulation.run_sweeps(50);
    assert_eq!(report.attempted(), 50 * simulation.field().len());
    assert_eq!(simulation.sweep_count(), 50);
    assert!(simulation.field().is_su3(1E-8_f64));
    simulation.normalize_link_matrices();
    assert!(simulation.field().is_su3(EPSILON));
    Ok(())
}

#[test]
fn invalid_parameters() {
    use crate::error::{LatticeInitializationError, ParameterError, SimulationInitializationError};

    let parameters = SimulationParameters::default();
    assert_eq!(parameters.validate(), Ok(()));
    assert!(matches!(
        SimulationParameters::new(1, 5.5_f64, 1, 1, 0.24_f64),
        Err(ParameterError::Lattice(LatticeInitializationError::ExtentTooSmall))
    ));
    assert_eq!(
        SimulationInitializationError::from(ParameterError::NegativeBeta).to_string(),
        "parameter error: beta must be positive"
    );
}

#[test]
fn hot_start_does_not_depend_on_step_size() -> Result<(), Box<dyn Error>> {
    let small = new_simulation(SimulationParameters::new(2, 5.5_f64, 1, 1, 0.01_f64)?, 1)?;
    let large = new_simulation(SimulationParameters::new(2, 5.5_f64, 1, 1, 0.5_f64)?, 1)?;
    assert_eq!(small.export_state(), large.export_state());
    assert_ne!(small.updater().pool(), large.updater().pool());

    let near_small = new_simulation(
        SimulationParameters::new(2, 5.5_f64, 1, 1, 0.01_f64)?
            .with_initial_condition(InitialCondition::NearUnity),
        1,
    )?;
    let near_large = new_simulation(
        SimulationParameters::new(2, 5.5_f64, 1, 1, 0.5_f64)?
            .with_initial_condition(InitialCondition::NearUnity),
        1,
    )?;
    assert!(near_small.average_plaquette() > near_large.average_plaquette());
    Ok(())
}

#[test]
fn sweeps_between_measurements() -> Result<(), Box<dyn Error>> {
    let parameters = SimulationParameters::new(2, 5.5_f64, 3, 4, 0.24_f64)?;
    let mut simulation = new_simulation(parameters, 2)?;
    let mut plaquettes = Vec::with_capacity(simulation.ncf());
    for _ in 0..simulation.ncf() {
        let report = simulation.run_sweeps(simulation.ncor());
        assert_eq!(report.attempted(), simulation.ncor() * simulation.field().len());
        plaquettes.push(simulation.average_plaquette());
    }
    assert_eq!(simulation.sweep_count(), 3 * 4);
    assert_eq!(plaquettes.len(), 4);
    Ok(())
}
