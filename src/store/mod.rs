// src/store/mod.rs

//! Persistence of survey responses.
//!
//! The store is append-only: records are created by [`ResponseStore::append`],
//! read back newest first, and removed only all at once by
//! [`ResponseStore::wipe_all`]. Every operation waits for the backend to
//! acknowledge it before returning, so a `list_all` issued after a returned
//! `append` or `wipe_all` observes its effect.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    response::{ResponseId, ResponseRecord},
    submission::Answers,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryResponseStore;
pub use postgres::PgResponseStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend could not be reached (connect, pool or I/O failure).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but rejected the write.
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// The backend was reached but the read could not be completed or decoded.
    #[error("read failed: {0}")]
    ReadFailed(String),
}

impl StoreError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Short name of the backend, for logs.
    fn backend_tag(&self) -> &'static str;

    /// Persists a validated submission. `submitted_at` is assigned here.
    async fn append(&self, respondent_name: &str, answers: &Answers)
    -> Result<ResponseId, StoreError>;

    /// All records, newest `submitted_at` first (ties: highest id first).
    async fn list_all(&self) -> Result<Vec<ResponseRecord>, StoreError>;

    /// Deletes every record and returns how many were removed.
    async fn wipe_all(&self) -> Result<u64, StoreError>;
}

/// Bounded exponential backoff for idempotent store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            attempts,
            initial_delay: Duration::from_millis(200),
        }
    }

    /// Runs `op`, retrying only while it fails with `StoreError::Unavailable`.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut delay = self.initial_delay;
        let mut retry_count = 0;
        loop {
            match op().await {
                Err(e) if e.is_unavailable() && retry_count < self.attempts => {
                    retry_count += 1;
                    tracing::warn!(
                        "{} failed ({}), retrying in {:?}... (Attempt {})",
                        what,
                        e,
                        delay,
                        retry_count
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_attempts(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_unavailable_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            attempts: 3,
            initial_delay: Duration::from_millis(1),
        };

        let result = policy
            .run("list", || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StoreError::Unavailable("down".into()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_the_attempt_budget() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let policy = RetryPolicy {
            attempts: 2,
            initial_delay: Duration::from_millis(1),
        };

        let result: Result<(), _> = policy
            .run("wipe", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::Unavailable("down".into()))
            })
            .await;

        assert!(result.unwrap_err().is_unavailable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = RetryPolicy::with_attempts(5)
            .run("list", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(StoreError::ReadFailed("bad row".into()))
            })
            .await;

        assert_eq!(result, Err(StoreError::ReadFailed("bad row".into())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
