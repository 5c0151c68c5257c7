use anyhow::{bail, Context};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shapetune::config::{AppConfig, ConfigManager};
use shapetune::engines::generation::{GenerationScheduler, LogProgressCallback};
use shapetune::{GenerationId, InMemoryStore};

const USAGE: &str = "usage: shapetune <evolve [config.toml] | manifest>";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("evolve") => evolve(args.get(2).map(String::as_str)),
        Some("manifest") => {
            let manifest = AppConfig::default().manifest();
            println!("{}", serde_json::to_string_pretty(&manifest)?);
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn evolve(config_path: Option<&str>) -> anyhow::Result<()> {
    let manager = ConfigManager::new();
    if let Some(path) = config_path {
        manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path))?;
    }
    let config = manager.get().evolution;

    // Seed the initial population apart from the scheduler's stream
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None => StdRng::from_entropy(),
    };
    let mut store = InMemoryStore::new();
    store.seed_random(
        GenerationId::Initial,
        &config.schema(),
        config.population_size,
        &mut rng,
    );

    let started = chrono::Utc::now();
    let mut scheduler = GenerationScheduler::new(config)?;
    let summary = scheduler.run(&mut store, &mut LogProgressCallback)?;

    let output = serde_json::json!({
        "started": started.to_rfc3339(),
        "finished": chrono::Utc::now().to_rfc3339(),
        "summary": summary,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
