//! Process-wide debug settings.

use serde::{Deserialize, Serialize};

/// Default [`DebugSettings::max_length`].
pub const DEFAULT_MAX_LENGTH: usize = 1000;

/// Settings shared by every debug node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugSettings {
    /// Size bound for every truncation decision.
    #[serde(alias = "max_length")]
    pub max_length: usize,
    /// Colour console mirroring output.
    #[serde(alias = "use_colors")]
    pub use_colors: bool,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            use_colors: false,
        }
    }
}

impl DebugSettings {
    /// Settings with a different size bound.
    #[must_use]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Settings with console colours switched on or off.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}
