use super::scheduler::GenerationReport;
use log::info;

/// Hooks invoked by the scheduler while a run progresses
pub trait ProgressCallback {
    fn on_generation_start(&mut self, generation: u32);
    fn on_generation_complete(&mut self, report: &GenerationReport);
    fn on_offspring_created(&mut self, _created: usize, _total: usize) {}
}

/// Reports progress through the `log` facade
pub struct LogProgressCallback;

impl ProgressCallback for LogProgressCallback {
    fn on_generation_start(&mut self, generation: u32) {
        info!("Generation {} starting...", generation);
    }

    fn on_generation_complete(&mut self, report: &GenerationReport) {
        info!(
            "Generation {} complete. Best fitness: {:.4}, mean: {:.4}, mutated: {}, evicted: {}",
            report.generation,
            report.best_fitness,
            report.mean_fitness,
            report.mutated_offspring,
            report.evicted.len()
        );
    }

    fn on_offspring_created(&mut self, created: usize, total: usize) {
        if created % 10 == 0 || created == total {
            log::debug!("  Created {}/{} offspring", created, total);
        }
    }
}

/// Ignores every event
pub struct SilentProgress;

impl ProgressCallback for SilentProgress {
    fn on_generation_start(&mut self, _generation: u32) {}
    fn on_generation_complete(&mut self, _report: &GenerationReport) {}
}
