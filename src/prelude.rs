//! reexport for easy use,
//! `use lattice_qcd_metropolis::prelude::*`

pub use super::{
    action::{plaquette, LinkSource, WilsonAction},
    config::{SimulationParameters, SweepConfig},
    field::{GaugeField, InitialCondition, PerturbationPool},
    lattice::{Direction, LatticeCyclic, LatticeLinkCanonical, LatticePoint, Parity},
    observable::average_plaquette,
    simulation::{LatticeSimulation, SweepReport},
    CMatrix3, Complex, ComplexField, Real,
};
