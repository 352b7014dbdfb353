//! Process-related modules for reading per-process memory accounting.
//!
//! This module provides:
//! - `page`: host page size detection
//! - `statm`: reading and decoding `/proc/<pid>/statm`

pub mod page;
pub mod statm;

// Re-export commonly used types
pub use page::PAGE_SIZE;
pub use statm::{parse_statm, MalformedStatm, MemoryRecord, SampleError, StatmReader};
