//! Timeout Helpers
//!
//! Deadlines are applied at the generative service boundary only; the
//! classification core itself never times out.
//!
//! ```ignore
//! let response = with_timeout(
//!     Duration::from_secs(60),
//!     provider.generate(prompt),
//!     "LLM request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{BankscopeError, Result};

/// Execute an async operation with a timeout
///
/// Returns [`BankscopeError::Timeout`] if the operation doesn't complete
/// within `timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(BankscopeError::timeout(operation_name, timeout)),
    }
}
