use tokio::sync::broadcast::{self, error::TryRecvError};

/// The kind of record a store mutation touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Groups,
    Users,
    Members,
    Categories,
    Expenses,
    SyncState,
}

/// A mutation reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub table: Table,
    pub group_id: Option<u32>,
}

/// A live change-notification subscription.
/// Dropping it (or passing it to `Observe::unsubscribe`) ends it.
#[derive(Debug)]
pub struct Subscription {
    pub id: u64,
    receiver: broadcast::Receiver<StoreChange>,
}

impl Subscription {
    pub fn new(id: u64, receiver: broadcast::Receiver<StoreChange>) -> Self {
        Self { id, receiver }
    }

    /// Wait for the next change. Returns `None` once the
    /// store has gone away. A lagged receiver still reports
    /// a change since invalidation is coarse.
    pub async fn changed(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if let Ok(change) = self.receiver.try_recv() {
                        return Some(change);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The next queued change, without waiting.
    pub fn try_changed(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.try_recv() {
                Ok(change) => return Some(change),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Discard all changes that are already queued.
    /// Returns how many were dropped.
    pub fn drain(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(_) => drained += 1,
                Err(TryRecvError::Lagged(n)) => drained += n as usize,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return drained,
            }
        }
    }
}

/// Stores that report their mutations.
pub trait Observe {
    fn subscribe(&self) -> Subscription;
    fn unsubscribe(&self, subscription: Subscription);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> StoreChange {
        StoreChange {
            table: Table::Expenses,
            group_id: Some(1),
        }
    }

    #[tokio::test]
    async fn test_subscription_receives_and_drains() {
        let (tx, rx) = broadcast::channel(16);
        let mut sub = Subscription::new(1, rx);

        tx.send(change()).unwrap();
        assert_eq!(sub.changed().await, Some(change()));

        assert_eq!(sub.try_changed(), None);
        tx.send(change()).unwrap();
        assert_eq!(sub.try_changed(), Some(change()));

        tx.send(change()).unwrap();
        tx.send(change()).unwrap();
        assert_eq!(sub.drain(), 2);
        assert_eq!(sub.drain(), 0);
    }

    #[tokio::test]
    async fn test_subscription_ends_with_store() {
        let (tx, rx) = broadcast::channel(4);
        let mut sub = Subscription::new(1, rx);
        drop(tx);
        assert_eq!(sub.changed().await, None);
    }
}
