//! Run a Metropolis simulation and print the average plaquette.
//!
//! usage: `simulation-bin [parameters.json] [seed]`
//!
//! The parameters file contains the fields of [`SimulationParameters`], missing fields take
//! their default value. The summary of the run is printed as JSON on the standard output.

use std::{env, error::Error, fs, time::Duration, time::Instant};

use indicatif::{ProgressBar, ProgressStyle};
use lattice_qcd_metropolis::{
    config::{SimulationParameters, SweepConfig},
    simulation::{LatticeSimulation, SweepReport},
    statistics::{auto_correlation, mean_with_error},
    Real,
};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

const DEFAULT_SEED: u64 = 0x45_78_93_f4_4a_b0_67_f0;

/// Number of thermalization sweeps, in units of Ncor.
const THERMALIZATION_FACTOR: usize = 10;

#[derive(Debug, Serialize)]
struct RunSummary {
    parameters: SimulationParameters,
    seed: u64,
    number_of_threads: usize,
    average_plaquette: Real,
    error: Real,
    auto_correlation_lag_1: Option<Real>,
    thermalization: SweepReport,
    measurement: SweepReport,
    duration_seconds: f64,
}

fn read_parameters(path: Option<&String>) -> Result<SimulationParameters, Box<dyn Error>> {
    match path {
        Some(path) => {
            let parameters: SimulationParameters = serde_json::from_str(&fs::read_to_string(path)?)?;
            parameters.validate()?;
            Ok(parameters)
        }
        None => Ok(SimulationParameters::default()),
    }
}

fn progress_bar(len: usize, prefix: &'static str) -> Result<ProgressBar, Box<dyn Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{prefix:14} [{elapsed_precise}] [{bar:40.white/cyan}] {pos:>5}/{len:5} [ETA {eta_precise}] {msg}",
            )?
            .progress_chars("=>-"),
    );
    pb.set_prefix(prefix);
    pb.enable_steady_tick(Duration::from_millis(500));
    Ok(pb)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = env::args().collect::<Vec<_>>();
    let parameters = read_parameters(args.get(1))?;
    let seed = match args.get(2) {
        Some(seed) => seed.parse()?,
        None => DEFAULT_SEED,
    };
    let sweep_config = SweepConfig::default();

    let start = Instant::now();
    let rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut simulation = LatticeSimulation::new(parameters, sweep_config, rng)?;
    let ncor = simulation.ncor();

    let pb = progress_bar(THERMALIZATION_FACTOR, "Thermalisation")?;
    let mut thermalization = SweepReport::new();
    for _ in 0..THERMALIZATION_FACTOR {
        thermalization += simulation.thermalize();
        simulation.normalize_link_matrices();
        pb.set_message(format!("{:.6}", simulation.average_plaquette()));
        pb.inc(1);
    }
    pb.finish();
    log::info!("thermalization done after {} sweeps: {}", THERMALIZATION_FACTOR * ncor, thermalization);

    let pb = progress_bar(simulation.ncf(), "Measurement")?;
    let mut measurement = SweepReport::new();
    let mut plaquettes = Vec::with_capacity(simulation.ncf());
    for _ in 0..simulation.ncf() {
        measurement += simulation.run_sweeps(ncor);
        simulation.normalize_link_matrices();
        let plaquette = simulation.average_plaquette();
        plaquettes.push(plaquette);
        pb.set_message(format!("{:.6}", plaquette));
        pb.inc(1);
    }
    pb.finish();

    let [average_plaquette, error] = mean_with_error(&plaquettes);
    let summary = RunSummary {
        parameters,
        seed,
        number_of_threads: sweep_config.number_of_threads().get(),
        average_plaquette,
        error,
        auto_correlation_lag_1: auto_correlation(&plaquettes, 1),
        thermalization,
        measurement,
        duration_seconds: start.elapsed().as_secs_f64(),
    };
    eprintln!("<P> = {:.6} +/- {:.6}", average_plaquette, error);
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
