pub mod traits;
pub mod evolution;
pub mod grid_search;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use evolution::EvolutionConfig;
pub use grid_search::{AttributeSpec, GridSearchConfig, ParameterSpec, RangeSpec};
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
