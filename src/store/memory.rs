use super::EntityStore;
use crate::error::{Result, ShapetuneError};
use crate::types::{EntityId, EntityMetrics, FeatureSchema, FeatureVector, GenerationId};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct EntityRecord {
    name: String,
    features: FeatureVector,
    location: [f64; 3],
    metrics: Option<EntityMetrics>,
    generation: Option<GenerationId>,
}

/// Entity store kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entities: HashMap<EntityId, EntityRecord>,
    generations: BTreeMap<GenerationId, Vec<EntityId>>,
    next_id: u64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fresh entity to a generation, creating the generation if needed
    pub fn insert(&mut self, generation: GenerationId, features: FeatureVector) -> EntityId {
        let id = self.allocate_id();
        let members = self.generations.entry(generation).or_default();
        let name = format!("Obj {}", members.len());
        members.push(id);

        self.entities.insert(
            id,
            EntityRecord {
                name,
                features,
                location: [0.0; 3],
                metrics: None,
                generation: Some(generation),
            },
        );
        id
    }

    /// Fill a generation with `size` random entities drawn from the schema
    pub fn seed_random<R: Rng>(
        &mut self,
        generation: GenerationId,
        schema: &FeatureSchema,
        size: usize,
        rng: &mut R,
    ) -> Vec<EntityId> {
        self.generations.entry(generation).or_default();
        (0..size)
            .map(|_| self.insert(generation, schema.random_vector(rng)))
            .collect()
    }

    pub fn name(&self, entity: EntityId) -> Result<&str> {
        Ok(self.record(entity)?.name.as_str())
    }

    pub fn location(&self, entity: EntityId) -> Result<[f64; 3]> {
        Ok(self.record(entity)?.location)
    }

    pub fn metrics(&self, entity: EntityId) -> Result<Option<&EntityMetrics>> {
        Ok(self.record(entity)?.metrics.as_ref())
    }

    pub fn generation_of(&self, entity: EntityId) -> Result<Option<GenerationId>> {
        Ok(self.record(entity)?.generation)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn record(&self, entity: EntityId) -> Result<&EntityRecord> {
        self.entities
            .get(&entity)
            .ok_or_else(|| ShapetuneError::HostIntegration(format!("Unknown entity {}", entity)))
    }

    fn record_mut(&mut self, entity: EntityId) -> Result<&mut EntityRecord> {
        self.entities
            .get_mut(&entity)
            .ok_or_else(|| ShapetuneError::HostIntegration(format!("Unknown entity {}", entity)))
    }
}

impl EntityStore for InMemoryStore {
    fn generations(&self) -> Vec<GenerationId> {
        self.generations.keys().copied().collect()
    }

    fn contains(&self, generation: GenerationId) -> bool {
        self.generations.contains_key(&generation)
    }

    fn enumerate(&self, generation: GenerationId) -> Result<Vec<EntityId>> {
        self.generations
            .get(&generation)
            .cloned()
            .ok_or_else(|| ShapetuneError::HostIntegration(format!("Missing {}", generation)))
    }

    fn create(&mut self, generation: GenerationId) -> Result<()> {
        if self.generations.contains_key(&generation) {
            return Err(ShapetuneError::HostIntegration(format!(
                "{} already exists",
                generation
            )));
        }
        self.generations.insert(generation, Vec::new());
        Ok(())
    }

    fn destroy(&mut self, generation: GenerationId) -> Result<()> {
        let members = self
            .generations
            .remove(&generation)
            .ok_or_else(|| ShapetuneError::HostIntegration(format!("Missing {}", generation)))?;
        for id in members {
            self.entities.remove(&id);
        }
        Ok(())
    }

    fn feature_vector(&self, entity: EntityId) -> Result<FeatureVector> {
        Ok(self.record(entity)?.features)
    }

    fn set_feature_vector(&mut self, entity: EntityId, features: FeatureVector) -> Result<()> {
        self.record_mut(entity)?.features = features;
        Ok(())
    }

    fn duplicate(&mut self, entity: EntityId) -> Result<EntityId> {
        let mut copy = self.record(entity)?.clone();
        copy.generation = None;
        copy.metrics = None;

        let id = self.allocate_id();
        self.entities.insert(id, copy);
        Ok(id)
    }

    fn discard(&mut self, entity: EntityId) -> Result<()> {
        if let Some(current) = self.record(entity)?.generation {
            return Err(ShapetuneError::HostIntegration(format!(
                "Entity {} belongs to {}, destroy the generation instead",
                entity, current
            )));
        }
        self.entities.remove(&entity);
        Ok(())
    }

    fn link(&mut self, entity: EntityId, generation: GenerationId) -> Result<()> {
        if let Some(current) = self.record(entity)?.generation {
            return Err(ShapetuneError::HostIntegration(format!(
                "Entity {} already belongs to {}",
                entity, current
            )));
        }

        let members = self
            .generations
            .get_mut(&generation)
            .ok_or_else(|| ShapetuneError::HostIntegration(format!("Missing {}", generation)))?;
        let name = format!("Obj {}", members.len());
        members.push(entity);

        let record = self.record_mut(entity)?;
        record.generation = Some(generation);
        record.name = name;
        Ok(())
    }

    fn reposition(&mut self, entity: EntityId, location: [f64; 3]) -> Result<()> {
        self.record_mut(entity)?.location = location;
        Ok(())
    }

    fn annotate(&mut self, entity: EntityId, metrics: EntityMetrics) -> Result<()> {
        self.record_mut(entity)?.metrics = Some(metrics);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(seed: f64) -> FeatureVector {
        FeatureVector::new([seed, 0.5, 0.25, 0.125, 1.0, 2.0, 3.0])
    }

    #[test]
    fn test_feature_vector_round_trip() {
        let mut store = InMemoryStore::new();
        let id = store.insert(GenerationId::Initial, vector(0.1));

        let updated = FeatureVector::new([0.3, 0.6, 0.9, 0.12, 4.0, 0.0, 10.0]);
        store.set_feature_vector(id, updated).unwrap();

        let read = store.feature_vector(id).unwrap();
        for (a, b) in read.iter().zip(updated.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_duplicate_is_detached() {
        let mut store = InMemoryStore::new();
        let parent = store.insert(GenerationId::Initial, vector(0.1));
        store.reposition(parent, [1.0, 2.0, 3.0]).unwrap();

        let child = store.duplicate(parent).unwrap();

        assert_ne!(parent, child);
        assert_eq!(store.generation_of(child).unwrap(), None);
        assert_eq!(store.location(child).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(store.enumerate(GenerationId::Initial).unwrap(), vec![parent]);
    }

    #[test]
    fn test_link_rejects_entity_already_in_a_generation() {
        let mut store = InMemoryStore::new();
        let id = store.insert(GenerationId::Initial, vector(0.1));
        store.create(GenerationId::Index(0)).unwrap();

        assert!(store.link(id, GenerationId::Index(0)).is_err());
    }

    #[test]
    fn test_discard_only_removes_detached_entities() {
        let mut store = InMemoryStore::new();
        let parent = store.insert(GenerationId::Initial, vector(0.1));
        let child = store.duplicate(parent).unwrap();

        assert!(store.discard(parent).is_err());
        store.discard(child).unwrap();

        assert_eq!(store.entity_count(), 1);
        assert!(store.feature_vector(child).is_err());
    }

    #[test]
    fn test_destroy_removes_members() {
        let mut store = InMemoryStore::new();
        store.insert(GenerationId::Index(3), vector(0.1));
        store.insert(GenerationId::Index(3), vector(0.2));
        let survivor = store.insert(GenerationId::Index(4), vector(0.3));

        store.destroy(GenerationId::Index(3)).unwrap();

        assert!(!store.contains(GenerationId::Index(3)));
        assert_eq!(store.entity_count(), 1);
        assert!(store.feature_vector(survivor).is_ok());
        assert!(matches!(
            store.destroy(GenerationId::Index(3)),
            Err(ShapetuneError::HostIntegration(_))
        ));
    }
}
