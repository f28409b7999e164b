/*!
 * Core Module
 * Synchronization primitives, bounded queues, errors and limits
 */

pub mod errors;
pub mod limits;
pub mod queue;
pub mod sync;

// Re-export for convenience
pub use errors::*;
