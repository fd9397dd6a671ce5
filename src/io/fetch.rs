//! Document fetching with bounded retry.
//!
//! The reader resolves documents through a [`Fetcher`], the only operation
//! in the crate expected to block or fail transiently. Transient failures
//! are retried with exponential backoff until the policy's attempt budget
//! or deadline runs out, then surface as a terminal
//! [`CatalogError::UnresolvedLink`]. A missing file is permanent and fails
//! fast.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::CatalogError;

/// Fetches raw document bytes from a locator.
pub trait Fetcher {
    /// Reads the document at `path`.
    fn fetch(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Filesystem-backed fetcher.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

/// Retry behavior for transient fetch failures.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Attempts before giving up, including the first.
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles each retry.
    pub base_delay: Duration,

    /// Ceiling on the per-retry delay.
    pub max_delay: Duration,

    /// Caller-supplied deadline for one fetch, retries included.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Returns true for failures worth retrying. A missing document is
/// permanent; interruptions and timeouts are not.
fn is_transient(err: &io::Error) -> bool {
    !matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
    )
}

/// Fetches `path`, retrying transient failures per `policy`.
///
/// # Errors
/// Returns [`CatalogError::UnresolvedLink`] once attempts or the deadline
/// are exhausted, carrying the attempt count and the final failure.
pub fn fetch_with_retry(
    fetcher: &dyn Fetcher,
    path: &Path,
    policy: &RetryPolicy,
) -> Result<Vec<u8>, CatalogError> {
    let started = Instant::now();
    let mut delay = policy.base_delay;
    let mut attempts = 0;

    loop {
        attempts += 1;
        match fetcher.fetch(path) {
            Ok(bytes) => return Ok(bytes),
            Err(err) => {
                let out_of_budget = attempts >= policy.max_attempts
                    || started.elapsed() + delay > policy.timeout
                    || !is_transient(&err);
                if out_of_budget {
                    return Err(CatalogError::UnresolvedLink {
                        href: path.display().to_string(),
                        attempts,
                        detail: err.to_string(),
                    });
                }
                debug!(
                    path = %path.display(),
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    "transient fetch failure, retrying"
                );
                std::thread::sleep(delay);
                delay = (delay * 2).min(policy.max_delay);
            }
        }
    }
}
