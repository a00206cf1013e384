use serde::{Deserialize, Serialize};

fn default_min_dim() -> f64 {
    10.0
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SelectionConfig {
    /// Drags with either edge at or below this size (CSS pixels) are discarded
    #[serde(default = "default_min_dim")]
    pub min_dim: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_dim: default_min_dim(),
        }
    }
}
