use super::fitness::FitnessMeasure;
use crate::error::{Result, ShapetuneError};
use log::debug;

/// Host simulation that can be stepped and inspected
pub trait SimulationStepper {
    /// Return to the first step of the simulation
    fn rewind(&mut self) -> Result<()>;

    fn advance_step(&mut self) -> Result<()>;

    fn current_step(&self) -> u32;

    /// Step at which the simulation ends (exclusive)
    fn last_step(&self) -> u32;

    /// Ratio derived from the simulated body, e.g. width over length
    fn read_derived_ratio(&self) -> Result<f64>;
}

/// Fitness of a stepped simulation once it has settled.
///
/// Every step after the warm-up window is scored with
/// `1 / ((target_ratio - ratio)^2 + epsilon)` and the best score wins.
#[derive(Debug, Clone)]
pub struct SettledRatioFitness {
    pub target_ratio: f64,
    pub epsilon: f64,
    pub warmup_steps: u32,
}

impl SettledRatioFitness {
    pub fn new(target_ratio: f64, epsilon: f64, warmup_steps: u32) -> Self {
        Self {
            target_ratio,
            epsilon,
            warmup_steps,
        }
    }

    pub fn score(&self, ratio: f64) -> f64 {
        let delta = self.target_ratio - ratio;
        1.0 / (delta * delta + self.epsilon)
    }
}

impl<H: SimulationStepper + ?Sized> FitnessMeasure<H> for SettledRatioFitness {
    fn measure(&mut self, host: &mut H) -> Result<f64> {
        host.rewind()?;

        let mut best: Option<f64> = None;
        while host.current_step() < host.last_step() {
            let step = host.current_step();
            if step > self.warmup_steps {
                let ratio = host.read_derived_ratio()?;
                let score = self.score(ratio);
                debug!("step {}: ratio = {:.5}, fitness = {:.5}", step, ratio, score);
                best = Some(best.map_or(score, |b| b.max(score)));
            }
            host.advance_step()?;
        }

        best.ok_or_else(|| {
            ShapetuneError::Input(format!(
                "Simulation ends at step {} before the {}-step warm-up completes",
                host.last_step(),
                self.warmup_steps
            ))
        })
    }
}
