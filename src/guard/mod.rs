//! Per-conversation mutual exclusion for in-flight turns.

use std::collections::HashSet;
use std::sync::Mutex;

/// Tracks which conversations currently have a turn in flight.
///
/// Membership check-and-set is atomic under the inner mutex; different
/// conversations run fully in parallel, and a second turn for the same
/// conversation is rejected rather than queued.
#[derive(Debug, Default)]
pub struct TurnGuard {
    active: Mutex<HashSet<String>>,
}

impl TurnGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the conversation busy. Returns `false` if it already was.
    pub fn try_acquire(&self, conversation_id: &str) -> bool {
        let mut active = self.active.lock().expect("guard lock poisoned");
        active.insert(conversation_id.to_string())
    }

    /// Mark the conversation idle. Idempotent no-op if it was not busy.
    pub fn release(&self, conversation_id: &str) {
        let mut active = self.active.lock().expect("guard lock poisoned");
        active.remove(conversation_id);
    }

    /// Whether the conversation currently has a turn in flight.
    pub fn is_busy(&self, conversation_id: &str) -> bool {
        let active = self.active.lock().expect("guard lock poisoned");
        active.contains(conversation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn second_acquire_for_same_conversation_fails() {
        let guard = TurnGuard::new();
        assert!(guard.try_acquire("c-1"));
        assert!(!guard.try_acquire("c-1"));
        assert!(guard.try_acquire("c-2"));
    }

    #[test]
    fn release_makes_conversation_available_again() {
        let guard = TurnGuard::new();
        assert!(guard.try_acquire("c-1"));
        assert!(guard.is_busy("c-1"));
        guard.release("c-1");
        assert!(!guard.is_busy("c-1"));
        assert!(guard.try_acquire("c-1"));
    }

    #[test]
    fn release_of_idle_conversation_is_a_no_op() {
        let guard = TurnGuard::new();
        guard.release("never-acquired");
        assert!(guard.try_acquire("never-acquired"));
    }

    #[test]
    fn concurrent_acquires_grant_exactly_one_winner() {
        let guard = Arc::new(TurnGuard::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let guard = guard.clone();
            handles.push(std::thread::spawn(move || guard.try_acquire("c-1")));
        }
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1);
    }
}
