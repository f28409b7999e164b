/*!
 * Monitoring
 * Structured logging setup for binaries, tests and benches using the crate
 */

mod tracer;

pub use tracer::init_tracing;
