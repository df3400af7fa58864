// Application state module
// Bundles the loaded configuration with the immutable cafe dataset

use crate::dataset::Dataset;

use super::types::Config;

/// Application state shared across connections.
///
/// The dataset is populated once before the server starts accepting and is
/// never mutated afterwards, so no locking is needed.
pub struct AppState {
    pub config: Config,
    pub dataset: Dataset,
}

impl AppState {
    pub fn new(config: &Config, dataset: Dataset) -> Self {
        Self {
            config: config.clone(),
            dataset,
        }
    }
}
