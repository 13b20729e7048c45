pub const DEFAULT_MAX_UPDATE_PASSES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilerOptions {
    /// Treat `UnsupportedProp` as fatal instead of skipping the prop.
    pub strict_props: bool,
    /// Upper bound on drain passes of queued state updates within one call.
    pub max_update_passes: usize,
}

impl ReconcilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_props(mut self, strict: bool) -> Self {
        self.strict_props = strict;
        self
    }

    pub fn max_update_passes(mut self, limit: usize) -> Self {
        self.max_update_passes = limit.max(1);
        self
    }
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            strict_props: false,
            max_update_passes: DEFAULT_MAX_UPDATE_PASSES,
        }
    }
}
