use crate::defaults;
use serde::Deserialize;

/// Live update (push channel) configuration.
#[derive(Clone, Deserialize, Debug)]
#[serde(default)]
pub struct LiveConfig {
    /// Subscribe pagers to live updates.
    pub enabled: bool,

    /// Patches buffered per subscriber before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::LIVE_UPDATES_ENABLED,
            channel_capacity: defaults::LIVE_CHANNEL_CAPACITY,
        }
    }
}
