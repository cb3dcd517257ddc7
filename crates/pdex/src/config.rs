//! Estimator configuration parameters.

/// Amplifier of a pool whose virtual reserves equal its real reserves.
pub const BASE_AMPLIFIER: u32 = 10_000;

/// Default cap on the number of candidate paths a search records.
pub const MAX_PATHS: usize = 5;

/// Default cap on the number of hops in a trading path.
pub const MAX_PATH_LEN: usize = 5;

/// Configuration for path finding and quoting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimatorConfig {
    /// Amplifier that liquidity weights are normalized to.
    pub base_amplifier: u32,

    /// Maximum number of candidate paths recorded by one search.
    /// Once reached, the search stops recording new paths.
    pub max_paths: usize,

    /// Maximum number of hops a caller may ask for.
    pub max_path_len: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            base_amplifier: BASE_AMPLIFIER,
            max_paths: MAX_PATHS,
            max_path_len: MAX_PATH_LEN,
        }
    }
}

impl EstimatorConfig {
    /// Create a new configuration with a custom base amplifier.
    pub fn with_base_amplifier(mut self, base_amplifier: u32) -> Self {
        self.base_amplifier = base_amplifier;
        self
    }

    /// Create a new configuration with a custom total-paths cap.
    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = max_paths;
        self
    }

    /// Create a new configuration with a custom hop cap.
    pub fn with_max_path_len(mut self, max_path_len: usize) -> Self {
        self.max_path_len = max_path_len;
        self
    }
}
