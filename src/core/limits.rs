/*!
 * Limits and Constants
 *
 * Centralized location for the tunables and magic numbers used across the
 * primitives and the pool.
 *
 * - Performance-relevant constants are marked with [PERF]
 * - Constants that are part of an algorithm's correctness are marked with [CORRECTNESS]
 */

use std::time::Duration;

// =============================================================================
// SHARED MUTEX
// =============================================================================

/// Initial value of the shared mutex reader counter
///
/// A writer subtracts this to announce itself. Every concurrent reader takes
/// one unit, so the headroom before the encoding breaks is `i64::MAX`
/// simultaneous readers.
/// [CORRECTNESS] Must match the counter width (i64); a smaller sentinel
/// lets a writer's subtraction leave the counter positive.
pub const READER_SENTINEL: i64 = i64::MAX;

// =============================================================================
// SPIN MUTEX
// =============================================================================

/// Relaxed spins on a held spinlock before yielding the thread
/// [PERF] Keeps short waits off the scheduler without burning a full slice
pub const SPINS_BEFORE_YIELD: u32 = 64;

// =============================================================================
// THREAD POOL
// =============================================================================

/// Default per-worker queue capacity
/// [PERF] Large enough that bursty submitters rarely hit the blocking fallback
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default submission scan factor
///
/// A submitter tries `steal_factor × workers` non-blocking pushes before
/// falling back to a blocking push on its home queue.
pub const DEFAULT_STEAL_FACTOR: usize = 2;

/// Worker count used when available parallelism cannot be queried
pub const FALLBACK_WORKER_COUNT: usize = 4;

/// Default worker thread name prefix
pub const DEFAULT_THREAD_NAME: &str = "fastsync-worker";

/// Longest an idle worker parks on its own queue before rescanning peers
/// [PERF] Bounds how long work landing on a busy peer's queue sits unstolen
pub const DEFAULT_IDLE_PARK: Duration = Duration::from_millis(1);
