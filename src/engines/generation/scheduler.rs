use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::FitnessEvaluator;
use crate::engines::generation::{
    operators::{crossover, maybe_mutate, sample_parent_pair, selection_probabilities},
    progress::ProgressCallback,
    retention::RetentionPolicy,
};
use crate::error::{Result, ShapetuneError};
use crate::store::EntityStore;
use crate::types::{EntityId, EntityMetrics, FeatureSchema, FeatureVector, GenerationId};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Outcome of producing one generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generation: u32,
    pub source: GenerationId,
    pub population: usize,
    pub best_entity: Option<EntityId>,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub mutated_offspring: usize,
    pub evicted: Vec<GenerationId>,
    /// Members in placement order, present on report generations only
    pub placement: Option<Vec<EntityId>>,
}

/// Best entity seen across a run, snapshotted when it was produced
#[derive(Debug, Clone, Serialize)]
pub struct BestEntity {
    pub generation: u32,
    pub entity: EntityId,
    pub fitness: f64,
    pub features: FeatureVector,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generations: Vec<GenerationReport>,
    pub best: Option<BestEntity>,
}

/// Drives the generational lifecycle over an entity store.
///
/// The scheduler is the only writer of generation membership: it creates
/// each generation, fills it with offspring of the previous one, ranks it on
/// report intervals, and evicts generations that fall out of the retention
/// window.
pub struct GenerationScheduler {
    config: EvolutionConfig,
    evaluator: FitnessEvaluator,
    schema: FeatureSchema,
    retention: RetentionPolicy,
    rng: StdRng,
}

impl GenerationScheduler {
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config.validate()?;

        let evaluator = FitnessEvaluator::new(config.target_vector()?, config.epsilon);
        let schema = config.schema();
        let retention = RetentionPolicy::new(config.retention_lag, config.report_every);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            evaluator,
            schema,
            retention,
            rng,
        })
    }

    pub fn evaluator(&self) -> &FitnessEvaluator {
        &self.evaluator
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    /// Produce generations `0..num_generations` from the initial population
    pub fn run<S: EntityStore, C: ProgressCallback>(
        &mut self,
        store: &mut S,
        callback: &mut C,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary {
            generations: Vec::new(),
            best: None,
        };

        for generation in 0..self.config.num_generations {
            callback.on_generation_start(generation);
            let report = self.advance(store, generation, callback)?;
            callback.on_generation_complete(&report);

            if let Some(entity) = report.best_entity {
                let improved = summary
                    .best
                    .as_ref()
                    .map_or(true, |b| report.best_fitness > b.fitness);
                if improved {
                    summary.best = Some(BestEntity {
                        generation,
                        entity,
                        fitness: report.best_fitness,
                        features: store.feature_vector(entity)?,
                    });
                }
            }
            summary.generations.push(report);
        }

        if let Some(best) = &summary.best {
            info!(
                "Run complete: best fitness {:.4} from generation {}",
                best.fitness, best.generation
            );
        }
        Ok(summary)
    }

    /// Create and fill `generation` from its source generation
    pub fn advance<S: EntityStore, C: ProgressCallback>(
        &mut self,
        store: &mut S,
        generation: u32,
        callback: &mut C,
    ) -> Result<GenerationReport> {
        let source = self.resolve_source(store, generation);
        let parents = store.enumerate(source)?;
        if parents.is_empty() {
            return Err(ShapetuneError::Input(format!(
                "Cannot breed {} from an empty {}",
                GenerationId::Index(generation),
                source
            )));
        }
        if parents.len() < 2 && self.config.population_size > 0 {
            return Err(ShapetuneError::Input(format!(
                "Need at least 2 entities in {} to breed {}, found {}",
                source,
                GenerationId::Index(generation),
                parents.len()
            )));
        }

        let parent_vectors = parents
            .iter()
            .map(|id| store.feature_vector(*id))
            .collect::<Result<Vec<_>>>()?;
        let parent_fitness: Vec<f64> = parent_vectors
            .iter()
            .map(|v| self.evaluator.fitness(v))
            .collect();
        let probabilities = selection_probabilities(&parent_fitness)?;

        if self.config.annotate {
            for (i, id) in parents.iter().enumerate() {
                store.annotate(
                    *id,
                    EntityMetrics {
                        fitness: parent_fitness[i],
                        selection_probability: probabilities[i],
                        features: parent_vectors[i],
                    },
                )?;
            }
        }

        let target = GenerationId::Index(generation);
        if store.contains(target) {
            warn!("{} already exists, replacing it", target);
            store.destroy(target)?;
        }
        store.create(target)?;

        let mutated_offspring = match self.populate(
            store,
            target,
            &parents,
            &parent_vectors,
            &parent_fitness,
            callback,
        ) {
            Ok(mutated) => mutated,
            Err(e) => {
                // a partial generation would shadow its source on the next advance
                if let Err(cleanup) = store.destroy(target) {
                    warn!("Failed to remove partial {}: {}", target, cleanup);
                }
                return Err(e);
            }
        };

        let members = store.enumerate(target)?;
        let fitness = members
            .iter()
            .map(|id| store.feature_vector(*id).map(|v| self.evaluator.fitness(&v)))
            .collect::<Result<Vec<_>>>()?;

        let placement = if self.retention.is_milestone(generation) {
            Some(self.place(store, generation, &members, &fitness)?)
        } else {
            None
        };

        let evicted = self.evict(store, generation)?;

        let (best_entity, best_fitness) = members
            .iter()
            .zip(fitness.iter())
            .fold((None, 0.0), |(best, best_f), (id, f)| {
                if best.is_none() || *f > best_f {
                    (Some(*id), *f)
                } else {
                    (best, best_f)
                }
            });
        let mean_fitness = if fitness.is_empty() {
            0.0
        } else {
            fitness.iter().sum::<f64>() / fitness.len() as f64
        };

        Ok(GenerationReport {
            generation,
            source,
            population: members.len(),
            best_entity,
            best_fitness,
            mean_fitness,
            mutated_offspring,
            evicted,
            placement,
        })
    }

    /// Previous generation when present, the initial population otherwise
    fn resolve_source<S: EntityStore>(&self, store: &S, generation: u32) -> GenerationId {
        generation
            .checked_sub(1)
            .map(GenerationId::Index)
            .filter(|g| store.contains(*g))
            .unwrap_or(GenerationId::Initial)
    }

    /// Fill `target` with exactly `population_size` offspring.
    ///
    /// Returns how many offspring were mutated.
    fn populate<S: EntityStore, C: ProgressCallback>(
        &mut self,
        store: &mut S,
        target: GenerationId,
        parents: &[EntityId],
        parent_vectors: &[FeatureVector],
        parent_fitness: &[f64],
        callback: &mut C,
    ) -> Result<usize> {
        let total = self.config.population_size;
        let mut mutated = 0;

        for created in 1..=total {
            let (a, b) = sample_parent_pair(parent_fitness, &mut self.rng)?;
            let child = store.duplicate(parents[a])?;

            let method = self.config.crossover.resolve(&mut self.rng);
            let mut features = crossover(&parent_vectors[a], &parent_vectors[b], method, &mut self.rng);
            let resampled = maybe_mutate(
                &mut features,
                self.config.mutation_probability,
                &self.schema,
                &mut self.rng,
            );
            if !resampled.is_empty() {
                mutated += 1;
            }
            debug!(
                "{}: child {} of {} x {} via {:?}, mutated slots {:?}",
                target, child, parents[a], parents[b], method, resampled
            );

            let linked = store
                .set_feature_vector(child, features)
                .and_then(|_| store.link(child, target));
            if let Err(e) = linked {
                if let Err(cleanup) = store.discard(child) {
                    warn!("Failed to discard detached child {}: {}", child, cleanup);
                }
                return Err(e);
            }
            callback.on_offspring_created(created, total);
        }

        Ok(mutated)
    }

    /// Rank members by descending fitness and lay them out in a row.
    ///
    /// Ties keep enumeration order.
    fn place<S: EntityStore>(
        &self,
        store: &mut S,
        generation: u32,
        members: &[EntityId],
        fitness: &[f64],
    ) -> Result<Vec<EntityId>> {
        let mut order: Vec<usize> = (0..members.len()).collect();
        order.sort_by(|a, b| fitness[*b].total_cmp(&fitness[*a]));

        let spacing = self.config.placement_spacing;
        let mut placed = Vec::with_capacity(order.len());
        for (rank, idx) in order.into_iter().enumerate() {
            let id = members[idx];
            store.reposition(id, [spacing * generation as f64, spacing * rank as f64, 0.0])?;
            placed.push(id);
        }
        Ok(placed)
    }

    fn evict<S: EntityStore>(&self, store: &mut S, newest: u32) -> Result<Vec<GenerationId>> {
        let stale = self.retention.evictable(&store.generations(), newest);
        for generation in &stale {
            info!("Evicting {}", generation);
            store.destroy(*generation)?;
        }
        Ok(stale)
    }
}
