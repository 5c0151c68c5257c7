use crate::error::Result;
use crate::types::FeatureVector;

/// Default guard added to the distance before inversion
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Scores feature vectors by closeness to a fixed target.
///
/// `fitness = 1 / (distance(target, v) + epsilon)`, so an exact match scores
/// `1 / epsilon` and the score falls as the vector moves away.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator {
    target: FeatureVector,
    epsilon: f64,
}

impl FitnessEvaluator {
    pub fn new(target: FeatureVector, epsilon: f64) -> Self {
        Self { target, epsilon }
    }

    pub fn target(&self) -> &FeatureVector {
        &self.target
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn fitness(&self, vector: &FeatureVector) -> f64 {
        1.0 / (self.target.distance(vector) + self.epsilon)
    }
}

/// Host-dependent fitness measurement.
///
/// Measuring may drive the host (for example stepping a simulation), hence
/// the mutable borrow.
pub trait FitnessMeasure<H: ?Sized> {
    fn measure(&mut self, host: &mut H) -> Result<f64>;
}

impl<H: ?Sized, F> FitnessMeasure<H> for F
where
    F: FnMut(&mut H) -> Result<f64>,
{
    fn measure(&mut self, host: &mut H) -> Result<f64> {
        self(host)
    }
}
