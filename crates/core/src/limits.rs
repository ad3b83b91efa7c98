//! Document limits
//!
//! Limits enforced before a document is handed to storage. Violations are
//! reported as `InvalidArgument`.

/// Maximum nesting depth of maps and arrays in one document (20 levels)
///
/// A flat document of scalars has depth 1.
pub const MAX_NESTING_DEPTH: usize = 20;

/// Maximum number of segments in one field path (100 segments)
pub const MAX_FIELD_PATH_SEGMENTS: usize = 100;
