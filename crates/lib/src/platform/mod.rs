//! Host platform detection.

pub mod os;

pub use os::Os;

/// Number of jobs handed to the external build system.
///
/// Falls back to 4 when the processor count cannot be determined.
pub fn job_count() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
