//! Per-chat generation guard.
//!
//! Two generations for the same chat would read the same history snapshot
//! and append independently. `ChatLocks` hands out one guard per chat id;
//! later callers queue behind the holder. Entries are dropped from the map
//! once nobody holds or waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Registry of per-chat generation locks.
#[derive(Debug, Clone, Default)]
pub struct ChatLocks {
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other generation for `chat_id` is in flight.
    pub async fn acquire(&self, chat_id: i64) -> ChatGuard {
        let lock = Arc::clone(
            self.locks
                .entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let guard = lock.lock_owned().await;
        debug!(chat_id, "Acquired chat generation guard");
        ChatGuard {
            chat_id,
            guard: Some(guard),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of chats with a held or awaited guard.
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive right to generate for one chat. Released on drop.
#[derive(Debug)]
pub struct ChatGuard {
    chat_id: i64,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatGuard {
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }
}

impl Drop for ChatGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own handle left: nobody holds or waits.
        self.locks
            .remove_if(&self.chat_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_chat_is_serialized() {
        let locks = ChatLocks::new();
        let first = locks.acquire(7).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let guard = locks.acquire(7).await;
                guard.chat_id()
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        assert_eq!(waiter.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_different_chats_do_not_block() {
        let locks = ChatLocks::new();
        let _a = locks.acquire(1).await;
        let b = tokio::time::timeout(Duration::from_millis(100), locks.acquire(2)).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }

    #[tokio::test]
    async fn test_entries_removed_after_release() {
        let locks = ChatLocks::new();
        {
            let _guard = locks.acquire(3).await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }
}
