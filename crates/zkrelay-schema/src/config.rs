/// Controls databag validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// When true, keys outside the schema are rejected instead of ignored.
    pub strict_mode: bool,
    /// When true, validation stops at the first violation.
    pub fail_fast: bool,
    /// Maximum number of violations collected for one databag.
    pub max_reported_violations: usize,
    /// Maximum bytes accepted when reading a databag from a file.
    pub max_databag_size: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: false,
            fail_fast: false,
            max_reported_violations: 16,
            max_databag_size: 64 * 1024,
        }
    }
}

impl ValidationConfig {
    /// Number of violations to collect before giving up.
    pub(crate) fn violation_limit(&self) -> usize {
        if self.fail_fast {
            1
        } else {
            self.max_reported_violations.max(1)
        }
    }
}
