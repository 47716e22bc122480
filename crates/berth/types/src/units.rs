//! Capacity unit conversions.
//!
//! The platform reports capacity at byte granularity; the accounting layer
//! works in whole megabytes. All conversions truncate.

/// Number of bytes in a megabyte.
pub const BYTES_PER_MB: i64 = 1024 * 1024;

/// Convert a byte figure to whole megabytes, truncating.
pub fn bytes_to_mb(bytes: i64) -> i64 {
    bytes / BYTES_PER_MB
}

/// Convert a megabyte figure to whole gigabytes, truncating.
pub fn mb_to_gb(mb: i64) -> i64 {
    mb / 1024
}
