use serde::{Deserialize, Serialize};

fn default_auto_hide_ms() -> u64 {
    10_000
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct UiConfig {
    /// Result card lifetime before it hides itself
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: default_auto_hide_ms(),
        }
    }
}
