use crate::types::GenerationId;

/// Sliding-window retention with periodic milestones.
///
/// A generation survives while it is at most `lag` generations behind the
/// newest one, and forever when it is a milestone (every `report_every`-th
/// generation). The initial population is never evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub lag: u32,
    pub report_every: u32,
}

impl RetentionPolicy {
    pub fn new(lag: u32, report_every: u32) -> Self {
        Self { lag, report_every }
    }

    pub fn is_milestone(&self, generation: u32) -> bool {
        self.report_every > 0 && generation % self.report_every == 0
    }

    pub fn should_retain(&self, generation: GenerationId, newest: u32) -> bool {
        match generation {
            GenerationId::Initial => true,
            GenerationId::Index(g) => {
                g >= newest || newest - g <= self.lag || self.is_milestone(g)
            }
        }
    }

    /// Generations from `present` that must go once `newest` is complete
    pub fn evictable(&self, present: &[GenerationId], newest: u32) -> Vec<GenerationId> {
        present
            .iter()
            .copied()
            .filter(|g| !self.should_retain(*g, newest))
            .collect()
    }
}
