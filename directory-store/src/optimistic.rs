//! Local list with optimistic mutations.
//!
//! A mutation is applied to the local copy first, then the remote call runs.
//! If the remote call fails the caller-supplied resync replaces local state
//! with an authoritative read. There is no conflict detection: whichever
//! confirmation lands last wins, matching the backend's last-write-wins.

use std::future::Future;
use std::sync::{PoisonError, RwLock};

use shared_types::Company;

/// Entities addressable by a stable string key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Company {
    fn key(&self) -> &str {
        &self.id
    }
}

pub type Patch<T> = Box<dyn FnOnce(&mut T) + Send>;

pub enum LocalMutation<T> {
    Insert(T),
    Patch { key: String, apply: Patch<T> },
    Remove(String),
}

impl<T> std::fmt::Debug for LocalMutation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalMutation::Insert(_) => write!(f, "Insert"),
            LocalMutation::Patch { key, .. } => write!(f, "Patch({})", key),
            LocalMutation::Remove(key) => write!(f, "Remove({})", key),
        }
    }
}

/// Ordered list shared between readers and optimistic writers. The lock is
/// only ever held for a synchronous step, never across an await.
pub struct OptimisticList<T> {
    items: RwLock<Vec<T>>,
}

impl<T: Keyed + Clone> OptimisticList<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|item| item.key() == key)
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|item| item.key() == key)
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn replace_all(&self, items: Vec<T>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }

    /// Replace the entry with the same key in place, or append it.
    pub fn upsert(&self, item: T) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match items.iter_mut().find(|existing| existing.key() == item.key()) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
    }

    /// Apply a mutation to the local copy only. Returns whether anything changed.
    pub fn apply_local(&self, mutation: LocalMutation<T>) -> bool {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        match mutation {
            LocalMutation::Insert(item) => {
                items.push(item);
                true
            }
            LocalMutation::Patch { key, apply } => {
                match items.iter_mut().find(|item| item.key() == key) {
                    Some(item) => {
                        apply(item);
                        true
                    }
                    None => false,
                }
            }
            LocalMutation::Remove(key) => {
                let before = items.len();
                items.retain(|item| item.key() != key);
                items.len() != before
            }
        }
    }

    /// Apply `mutation` locally, then await `remote`. On failure `resync`
    /// runs to completion before the error is returned.
    pub async fn apply<R, E, Fut, Resync, ResyncFut>(
        &self,
        mutation: LocalMutation<T>,
        remote: Fut,
        resync: Resync,
    ) -> Result<R, E>
    where
        Fut: Future<Output = Result<R, E>>,
        Resync: FnOnce() -> ResyncFut,
        ResyncFut: Future<Output = ()>,
    {
        tracing::debug!("Applying optimistic {:?}", mutation);
        self.apply_local(mutation);

        match remote.await {
            Ok(confirmed) => Ok(confirmed),
            Err(e) => {
                resync().await;
                Err(e)
            }
        }
    }
}

impl<T: Keyed + Clone> Default for OptimisticList<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Keyed for Item {
        fn key(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    #[test]
    fn test_local_mutations() {
        let list = OptimisticList::new();
        list.replace_all(vec![item("a", 1), item("b", 2)]);

        assert!(list.apply_local(LocalMutation::Insert(item("c", 3))));
        assert!(list.apply_local(LocalMutation::Patch {
            key: "a".to_string(),
            apply: Box::new(|i: &mut Item| i.value = 10),
        }));
        assert!(!list.apply_local(LocalMutation::Patch {
            key: "zzz".to_string(),
            apply: Box::new(|i: &mut Item| i.value = 0),
        }));
        assert!(list.apply_local(LocalMutation::Remove("b".to_string())));
        assert!(!list.apply_local(LocalMutation::Remove("b".to_string())));

        assert_eq!(list.snapshot(), vec![item("a", 10), item("c", 3)]);
    }

    #[test]
    fn test_upsert_keeps_position() {
        let list = OptimisticList::new();
        list.replace_all(vec![item("a", 1), item("b", 2)]);

        list.upsert(item("a", 5));
        list.upsert(item("d", 4));

        assert_eq!(list.snapshot(), vec![item("a", 5), item("b", 2), item("d", 4)]);
    }

    #[tokio::test]
    async fn test_success_skips_resync() {
        let list = OptimisticList::new();
        let resynced = AtomicBool::new(false);

        let result: Result<u32, String> = list
            .apply(LocalMutation::Insert(item("a", 1)), async { Ok(7) }, || async {
                resynced.store(true, Ordering::SeqCst);
            })
            .await;

        assert_eq!(result, Ok(7));
        assert!(!resynced.load(Ordering::SeqCst));
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_resyncs_before_returning() {
        let list = OptimisticList::new();
        list.replace_all(vec![item("a", 1)]);

        let result: Result<(), String> = list
            .apply(
                LocalMutation::Remove("a".to_string()),
                async { Err("backend down".to_string()) },
                || async {
                    list.replace_all(vec![item("a", 1)]);
                },
            )
            .await;

        assert_eq!(result, Err("backend down".to_string()));
        assert_eq!(list.snapshot(), vec![item("a", 1)]);
    }
}
