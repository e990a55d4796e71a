//! Non-fatal step failures.
//!
//! Hard failures are `Err` values that abort the run. A [`SoftFailure`] is a
//! step that failed without invalidating the rest of the run; it is logged
//! where it happens and carried in the step's report so callers can show it.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftFailure {
  /// Short name of the step that failed (e.g. "export compile database").
  pub step: String,
  pub message: String,
}

impl SoftFailure {
  /// Record a soft failure and emit it as a warning.
  pub fn record(step: impl Into<String>, error: impl fmt::Display) -> Self {
    let failure = Self {
      step: step.into(),
      message: error.to_string(),
    };
    warn!(step = %failure.step, error = %failure.message, "step failed, continuing");
    failure
  }
}

impl fmt::Display for SoftFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.step, self.message)
  }
}
