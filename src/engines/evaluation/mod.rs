pub mod fitness;
pub mod simulation;

pub use fitness::{FitnessEvaluator, FitnessMeasure, DEFAULT_EPSILON};
pub use simulation::{SettledRatioFitness, SimulationStepper};
