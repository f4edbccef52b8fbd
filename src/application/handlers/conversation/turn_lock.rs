//! Per-conversation turn serialization.
//!
//! A turn reads CollectedData, waits on the model, then writes the merge
//! back. Two overlapping turns on the same conversation would each merge
//! into a stale snapshot, so turns for one conversation id run one at a time.
//! Different conversations never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::foundation::ConversationId;

/// Registry of per-conversation async locks.
///
/// Entries nobody holds or waits on are dropped on the next acquisition.
#[derive(Debug, Clone, Default)]
pub struct TurnLocks {
    locks: Arc<Mutex<HashMap<ConversationId, Arc<AsyncMutex<()>>>>>,
}

impl TurnLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn holds `id`, then holds it until the guard drops.
    pub async fn acquire(&self, id: ConversationId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }

    /// Number of conversations with a turn in flight or queued.
    pub fn active(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|lock| Arc::strong_count(lock) > 1)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_conversation_is_serialized() {
        let locks = TurnLocks::new();
        let id = ConversationId::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let (locks, order) = (locks.clone(), order.clone());
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                order.lock().unwrap().push("first-start");
                tokio::time::sleep(Duration::from_millis(50)).await;
                order.lock().unwrap().push("first-end");
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = {
            let (locks, order) = (locks.clone(), order.clone());
            tokio::spawn(async move {
                let _guard = locks.acquire(id).await;
                order.lock().unwrap().push("second");
            })
        };

        first.await.unwrap();
        second.await.unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["first-start", "first-end", "second"]);
    }

    #[tokio::test]
    async fn different_conversations_do_not_block() {
        let locks = TurnLocks::new();
        let _held = locks.acquire(ConversationId::new()).await;

        let other = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(ConversationId::new()),
        )
        .await;

        assert!(other.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = TurnLocks::new();
        {
            let _guard = locks.acquire(ConversationId::new()).await;
            assert_eq!(locks.active(), 1);
        }
        let _guard = locks.acquire(ConversationId::new()).await;

        assert_eq!(locks.active(), 1);
        assert_eq!(locks.locks.lock().unwrap().len(), 1);
    }
}
