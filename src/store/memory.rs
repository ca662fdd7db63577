// src/store/memory.rs

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    models::{
        response::{ResponseId, ResponseRecord},
        submission::Answers,
    },
    store::{ResponseStore, StoreError},
};

/// In-process store, used for `DATABASE_URL=memory://` and in tests.
///
/// Records live only as long as the process.
#[derive(Default)]
pub struct MemoryResponseStore {
    inner: RwLock<Inner>,
    offline: AtomicBool,
}

#[derive(Default)]
struct Inner {
    // Insertion order, oldest first.
    records: Vec<ResponseRecord>,
    next_id: ResponseId,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail with `StoreError::Unavailable` until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseStore for MemoryResponseStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn append(
        &self,
        respondent_name: &str,
        answers: &Answers,
    ) -> Result<ResponseId, StoreError> {
        self.check_online()?;
        let mut inner = self.inner.write().await;

        // Never step backwards if the wall clock does.
        let now = Utc::now();
        let submitted_at = match inner.records.last() {
            Some(last) if last.submitted_at > now => last.submitted_at,
            _ => now,
        };

        inner.next_id += 1;
        let id = inner.next_id;
        inner.records.push(ResponseRecord {
            id,
            respondent_name: respondent_name.to_owned(),
            submitted_at,
            answers: answers.clone(),
        });
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<ResponseRecord>, StoreError> {
        self.check_online()?;
        let inner = self.inner.read().await;
        Ok(inner.records.iter().rev().cloned().collect())
    }

    async fn wipe_all(&self) -> Result<u64, StoreError> {
        self.check_online()?;
        let mut inner = self.inner.write().await;
        let removed = inner.records.len() as u64;
        inner.records.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::Answer;

    fn answers(q1: &str) -> Answers {
        let mut answers = Answers::new();
        answers.insert("q1".to_string(), Answer::Single(q1.to_string()));
        answers
    }

    #[tokio::test]
    async fn append_then_list_returns_newest_first() {
        let store = MemoryResponseStore::new();
        let first = store.append("Li", &answers("A. 完全不了解")).await.unwrap();
        let second = store.append("Wang", &answers("E. 非常熟练")).await.unwrap();

        let records = store.list_all().await.unwrap();
        let ids: Vec<ResponseId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, [second, first]);
        assert!(records[0].submitted_at >= records[1].submitted_at);
        assert_eq!(records[1].respondent_name, "Li");
        assert_eq!(records[1].answers, answers("A. 完全不了解"));
    }

    #[tokio::test]
    async fn empty_store_lists_nothing_and_reads_are_stable() {
        let store = MemoryResponseStore::new();
        assert!(store.list_all().await.unwrap().is_empty());

        store.append("Li", &answers("B. 听说过，但未尝试")).await.unwrap();
        assert_eq!(store.list_all().await.unwrap(), store.list_all().await.unwrap());
    }

    #[tokio::test]
    async fn wipe_removes_everything() {
        let store = MemoryResponseStore::new();
        for name in ["a", "b", "c"] {
            store.append(name, &answers("A. 完全不了解")).await.unwrap();
        }

        assert_eq!(store.wipe_all().await.unwrap(), 3);
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.wipe_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ids_keep_increasing_after_a_wipe() {
        let store = MemoryResponseStore::new();
        let before = store.append("a", &answers("A. 完全不了解")).await.unwrap();
        store.wipe_all().await.unwrap();
        let after = store.append("b", &answers("A. 完全不了解")).await.unwrap();
        assert!(after > before);
    }

    #[tokio::test]
    async fn offline_store_reports_unavailable() {
        let store = MemoryResponseStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.append("Li", &answers("A. 完全不了解")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(store.list_all().await.unwrap_err().is_unavailable());
        assert!(store.wipe_all().await.unwrap_err().is_unavailable());

        store.set_offline(false);
        assert!(store.list_all().await.is_ok());
    }
}
