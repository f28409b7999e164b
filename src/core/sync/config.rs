/*!
 * Backend Selection
 *
 * Build-time choice of the permit backend used by every primitive in the
 * crate unless a caller names one explicitly.
 */

#[cfg(target_os = "linux")]
use super::futex::FutexPermits;

#[cfg(not(target_os = "linux"))]
use super::condvar::CondvarPermits;

/// Default permit backend: futex-style parking on Linux, condvar elsewhere
#[cfg(target_os = "linux")]
pub type DefaultBackend = FutexPermits;

/// Default permit backend: futex-style parking on Linux, condvar elsewhere
#[cfg(not(target_os = "linux"))]
pub type DefaultBackend = CondvarPermits;
