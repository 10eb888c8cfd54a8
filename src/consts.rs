//! Project-wide constants.

/// Wire-format marker carried by every analysis response.
pub const FORMAT_VERSION: u32 = 1;

/// Default bound on how many suffixes the naive analyzer may strip.
pub const DEFAULT_MAX_STRIPS: usize = 4;

/// Prefix for diagnostic lines on stderr. The host tags drained stderr
/// output with this name, so keep it stable.
pub const STDERR_TAG: &str = "morphan-bridge";
