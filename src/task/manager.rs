//! In-memory registry mapping a task id to the means of cancelling it.
//!
//! Modeled on the teacher's sub-agent manager: a single mutex-guarded map,
//! no background sweeping, last write wins on duplicate registration.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

#[derive(Default)]
pub struct TaskManager {
    cancels: Mutex<HashMap<String, CancellationToken>>,
}

impl TaskManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// No-op on an empty id. On a duplicate id, the last registration wins
    /// (the previous token is simply dropped, not cancelled).
    pub fn register(&self, id: &str, cancel: CancellationToken) {
        if id.is_empty() {
            return;
        }
        self.cancels.lock().unwrap().insert(id.to_string(), cancel);
    }

    /// Idempotent: removing an absent id is not an error.
    pub fn unregister(&self, id: &str) {
        self.cancels.lock().unwrap().remove(id);
    }

    /// Atomically remove and cancel the entry for `id`. Returns whether an
    /// entry existed. Calling this twice for the same id returns `true`
    /// then `false`.
    pub fn cancel(&self, id: &str) -> bool {
        let entry = self.cancels.lock().unwrap().remove(id);
        match entry {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_cancel_round_trip() {
        let manager = TaskManager::new();
        let token = CancellationToken::new();
        manager.register("t1", token.clone());
        assert!(manager.cancel("t1"));
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_is_not_idempotent_but_safe() {
        let manager = TaskManager::new();
        manager.register("t1", CancellationToken::new());
        assert!(manager.cancel("t1"));
        assert!(!manager.cancel("t1"));
    }

    #[test]
    fn register_ignores_empty_id() {
        let manager = TaskManager::new();
        manager.register("", CancellationToken::new());
        assert!(!manager.cancel(""));
    }

    #[test]
    fn duplicate_registration_last_wins() {
        let manager = TaskManager::new();
        let first = CancellationToken::new();
        let second = CancellationToken::new();
        manager.register("t1", first.clone());
        manager.register("t1", second.clone());
        assert!(manager.cancel("t1"));
        assert!(!first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn unregister_is_idempotent() {
        let manager = TaskManager::new();
        manager.register("t1", CancellationToken::new());
        manager.unregister("t1");
        manager.unregister("t1");
        assert!(!manager.cancel("t1"));
    }
}
