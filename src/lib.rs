//! Evolutionary and coordinate-descent tuning of scene parameters.
//!
//! Two engines share one crate: a generational genetic algorithm that breeds
//! fixed-length feature vectors toward a target, and a discrete hill-climber
//! that nudges named attributes of a host scene one domain step at a time.
//! Both talk to the host through traits (`EntityStore`, `AttributeAccess`,
//! `SimulationStepper`) so they can run against an in-memory store in tests.

pub mod config;
pub mod engines;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, ShapetuneError};
pub use store::{EntityStore, InMemoryStore};
pub use types::{EntityId, EntityMetrics, FeatureSchema, FeatureVector, GenerationId};
