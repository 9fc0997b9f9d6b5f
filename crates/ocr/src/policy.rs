//! Retry and failure policy for external engine calls

use drawing_common::{ProcessingError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What to do with a page once its engine retries are exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    /// Record the page as skipped and continue with the next one
    #[default]
    Skip,
    /// Stop the run with the engine error
    Abort,
}

/// Engine-failure handling for OCR and rasterizer calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicy {
    /// Extra attempts after the first failure
    pub retries: u32,
    pub on_failure: FailureAction,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            retries: 1,
            on_failure: FailureAction::Skip,
        }
    }
}

impl EnginePolicy {
    #[must_use]
    pub const fn abort_on_failure() -> Self {
        Self {
            retries: 0,
            on_failure: FailureAction::Abort,
        }
    }

    /// Run `op`, retrying engine failures up to `retries` times
    ///
    /// Errors other than [`ProcessingError::Engine`] are returned at once.
    pub fn run<T, F>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_engine_failure() && attempt < self.retries => {
                    attempt += 1;
                    warn!("{} failed (attempt {}/{}): {}", what, attempt, self.retries + 1, e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Whether `err` should skip the page rather than abort the run
    #[must_use]
    pub fn skips(&self, err: &ProcessingError) -> bool {
        self.on_failure == FailureAction::Skip && err.is_engine_failure()
    }
}
