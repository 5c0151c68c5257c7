use super::accessor::AttributeAccess;
use super::parameter::{OptimizationParameter, ParamValue};
use crate::config::GridSearchConfig;
use crate::engines::evaluation::FitnessMeasure;
use crate::error::{Result, ShapetuneError};
use log::{debug, info, warn};
use serde::Serialize;

/// A committed single-attribute change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Move {
    pub round: usize,
    pub object: String,
    pub attribute: String,
    pub from: ParamValue,
    pub to: ParamValue,
    pub fitness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    /// A full round found no strictly improving neighbor
    LocalOptimum,
    MaxSteps,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridSearchOutcome {
    pub rounds: usize,
    pub initial_fitness: f64,
    pub final_fitness: f64,
    pub moves: Vec<Move>,
    pub stop: StopReason,
}

/// Discrete hill-climber that changes one attribute per group per round.
///
/// Each round visits every group: all immediate domain neighbors of every
/// attribute are tried one at a time (restoring the original value after
/// each trial) and only the single best strictly improving move of the group
/// is committed.
pub struct CoordinateDescentOptimizer {
    groups: Vec<OptimizationParameter>,
    max_steps: usize,
}

impl CoordinateDescentOptimizer {
    pub fn new(groups: Vec<OptimizationParameter>, max_steps: usize) -> Self {
        Self { groups, max_steps }
    }

    pub fn from_config(config: &GridSearchConfig) -> Result<Self> {
        Ok(Self::new(config.build_parameters()?, config.max_steps))
    }

    pub fn groups(&self) -> &[OptimizationParameter] {
        &self.groups
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn run<H, M>(&self, host: &mut H, measure: &mut M) -> Result<GridSearchOutcome>
    where
        H: AttributeAccess + ?Sized,
        M: FitnessMeasure<H> + ?Sized,
    {
        let initial_fitness = measure.measure(host)?;
        info!("Initial fitness = {}", initial_fitness);

        let mut current = initial_fitness;
        let mut moves = Vec::new();

        for round in 0..self.max_steps {
            let mut improved = false;

            for group in &self.groups {
                current = measure.measure(host)?;
                debug!("{} baseline fitness = {}", group.object(), current);

                if let Some(step) = self.best_move(group, host, measure, current, round)? {
                    host.set(&step.object, &step.attribute, step.to)?;
                    info!("taking step {}.{} = {}", step.object, step.attribute, step.to);
                    info!("\tfitness increased to {}", step.fitness);

                    current = step.fitness;
                    moves.push(step);
                    improved = true;
                }
            }

            if !improved {
                info!("There are no more steps that increase fitness");
                return Ok(GridSearchOutcome {
                    rounds: round + 1,
                    initial_fitness,
                    final_fitness: current,
                    moves,
                    stop: StopReason::LocalOptimum,
                });
            }
        }

        Ok(GridSearchOutcome {
            rounds: self.max_steps,
            initial_fitness,
            final_fitness: current,
            moves,
            stop: StopReason::MaxSteps,
        })
    }

    /// Best strictly improving neighbor across every attribute of a group.
    ///
    /// Leaves every attribute at its original value.
    fn best_move<H, M>(
        &self,
        group: &OptimizationParameter,
        host: &mut H,
        measure: &mut M,
        baseline: f64,
        round: usize,
    ) -> Result<Option<Move>>
    where
        H: AttributeAccess + ?Sized,
        M: FitnessMeasure<H> + ?Sized,
    {
        let object = group.object();
        let mut best_fitness = baseline;
        let mut best: Option<Move> = None;

        for (attribute, domain) in group.attributes() {
            let original = host.get(object, attribute)?;

            let candidates = match domain.neighbors(attribute, original) {
                Ok(candidates) => candidates,
                Err(ShapetuneError::DomainLookupMiss { attribute, value }) => {
                    warn!("{}.{} = {} is not in its domain, skipping", object, attribute, value);
                    continue;
                }
                Err(e) => return Err(e),
            };
            debug!("{}.{} = {}, candidates {:?}", object, attribute, original, candidates);

            for candidate in candidates {
                let fitness = Self::trial(host, measure, object, attribute, original, candidate)?;
                debug!("Thinking about {}.{} = {}: fitness {}", object, attribute, candidate, fitness);

                if fitness > best_fitness {
                    best_fitness = fitness;
                    best = Some(Move {
                        round,
                        object: object.to_string(),
                        attribute: attribute.clone(),
                        from: original,
                        to: candidate,
                        fitness,
                    });
                }
            }
        }

        Ok(best)
    }

    /// Measure with `candidate` in place, then put `original` back
    fn trial<H, M>(
        host: &mut H,
        measure: &mut M,
        object: &str,
        attribute: &str,
        original: ParamValue,
        candidate: ParamValue,
    ) -> Result<f64>
    where
        H: AttributeAccess + ?Sized,
        M: FitnessMeasure<H> + ?Sized,
    {
        host.set(object, attribute, candidate)?;
        let measured = measure.measure(host);
        host.set(object, attribute, original)?;
        measured
    }
}
