//! Utility functions: tolerant numeric coercion and display formatting.

pub mod format;
pub mod num;

// Re-export commonly used functions at module level
pub use format::format_amount;
pub use num::deserialize_amount;
