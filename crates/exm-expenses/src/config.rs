use std::time::Duration;

use crate::Color;

/// Default sync interval, 5 minutes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Toolbar colour when no category colours it.
pub const DEFAULT_ACCENT: Color = Color::rgb(0x3F, 0x51, 0xB5);

pub const DEFAULT_APP_LABEL: &str = "Expense Manager";

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Data older than this is synced on the next recompute.
    pub sync_interval: Duration,
    pub default_accent: Color,
    /// Title shown when no member badge is displayed.
    pub app_label: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sync_interval: DEFAULT_SYNC_INTERVAL,
            default_accent: DEFAULT_ACCENT,
            app_label: DEFAULT_APP_LABEL.to_string(),
        }
    }
}

impl ControllerConfig {
    pub fn with_sync_interval(self, sync_interval: Duration) -> Self {
        Self {
            sync_interval,
            ..self
        }
    }

    pub fn sync_interval_millis(&self) -> u64 {
        u64::try_from(self.sync_interval.as_millis()).unwrap_or(u64::MAX)
    }
}
