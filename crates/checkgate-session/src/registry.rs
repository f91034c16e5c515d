//! The session registry: which sessions this process is running.
//!
//! # Concurrency note
//!
//! Unlike a single-owner map, the registry is shared between request
//! handlers and rotation timers, so every operation takes one map-wide
//! `std::sync::Mutex`. Critical sections never await, which keeps each
//! operation atomic to other callers. The expected number of sessions is
//! small, so one lock is plenty.
//!
//! Each entry also carries a *rotation gate*: an async mutex that
//! serializes rotations and the final delete for that one session while
//! store I/O is in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use checkgate_protocol::{EventId, SessionId};
use checkgate_tick::RotationTimer;

use crate::{Session, SessionError};

/// Per-session lock held across a delete/write pair.
pub(crate) type RotationGate = Arc<tokio::sync::Mutex<()>>;

/// One registered session plus the machinery attached to it.
#[derive(Debug)]
pub(crate) struct SessionEntry {
    pub(crate) session: Session,
    pub(crate) gate: RotationGate,
    timer: Option<RotationTimer>,
}

impl SessionEntry {
    pub(crate) fn new(session: Session, timer: Option<RotationTimer>) -> Self {
        Self {
            session,
            gate: Arc::new(tokio::sync::Mutex::new(())),
            timer,
        }
    }

    /// Cancels the rotation timer, if any. Synchronous.
    pub(crate) fn cancel_timer(&self) {
        if let Some(timer) = &self.timer {
            timer.cancel();
        }
    }
}

/// Process-local map from session id to session.
///
/// Inserts happen only when a session starts; removals only when it stops
/// or the process shuts down.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    entries: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the id is taken. The rejected
    /// entry is dropped, which also stops its timer.
    pub(crate) fn insert(&self, entry: SessionEntry) -> Result<(), SessionError> {
        let mut entries = self.lock();
        let session_id = entry.session.session_id.clone();
        if entries.contains_key(&session_id) {
            return Err(SessionError::AlreadyRegistered(session_id));
        }
        entries.insert(session_id, entry);
        Ok(())
    }

    /// Returns the gate and store key of an active session in the given
    /// scope, or `None` if it isn't active there.
    pub(crate) fn rotation_target(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Option<(RotationGate, String)> {
        self.lock()
            .get(session_id)
            .filter(|entry| entry.session.in_scope(event_id))
            .map(|entry| (Arc::clone(&entry.gate), entry.session.code_key.clone()))
    }

    /// Same as [`rotation_target`](Self::rotation_target) without the scope
    /// check. Used by the session's own timer.
    pub(crate) fn timer_target(&self, session_id: &SessionId) -> Option<(RotationGate, String)> {
        self.lock()
            .get(session_id)
            .map(|entry| (Arc::clone(&entry.gate), entry.session.code_key.clone()))
    }

    /// Removes an active session in the given scope and cancels its timer
    /// before the registry lock is released.
    pub(crate) fn remove(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Option<SessionEntry> {
        let mut entries = self.lock();
        if !entries.get(session_id)?.session.in_scope(event_id) {
            return None;
        }
        let entry = entries.remove(session_id)?;
        entry.cancel_timer();
        Some(entry)
    }

    /// Removes every session, cancelling all timers. Used at shutdown.
    pub(crate) fn drain(&self) -> Vec<SessionEntry> {
        let drained: Vec<SessionEntry> = self.lock().drain().map(|(_, e)| e).collect();
        for entry in &drained {
            entry.cancel_timer();
        }
        drained
    }

    /// `true` if the session is registered (in any scope).
    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.lock().contains_key(session_id)
    }

    /// A snapshot of a registered session.
    pub fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.lock().get(session_id).map(|e| e.session.clone())
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a single map operation, so a poisoned lock
    // still guards a consistent map.
    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn session(id: &str, event: Option<&str>) -> Session {
        let session_id = SessionId::parse(id).unwrap();
        let event_id = event.map(|e| EventId::parse(e).unwrap());
        Session {
            code_key: format!("key:{id}"),
            session_id,
            event_id,
            started_at: SystemTime::now(),
            rotation_period: None,
        }
    }

    fn sid(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    fn eid(id: &str) -> EventId {
        EventId::parse(id).unwrap()
    }

    #[test]
    fn test_insert_then_contains() {
        let registry = SessionRegistry::new();
        registry.insert(SessionEntry::new(session("S1", None), None)).unwrap();

        assert!(registry.contains(&sid("S1")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&sid("S1")).unwrap().code_key, "key:S1");
    }

    #[test]
    fn test_insert_duplicate_returns_already_registered() {
        let registry = SessionRegistry::new();
        registry.insert(SessionEntry::new(session("S1", None), None)).unwrap();

        let result = registry.insert(SessionEntry::new(session("S1", None), None));

        assert!(matches!(result, Err(SessionError::AlreadyRegistered(id)) if id == sid("S1")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rotation_target_checks_scope() {
        let registry = SessionRegistry::new();
        registry
            .insert(SessionEntry::new(session("S1", Some("E1")), None))
            .unwrap();

        assert!(registry.rotation_target(&sid("S1"), Some(&eid("E1"))).is_some());
        assert!(registry.rotation_target(&sid("S1"), Some(&eid("E2"))).is_none());
        assert!(registry.rotation_target(&sid("S1"), None).is_none());
        assert!(registry.timer_target(&sid("S1")).is_some());
    }

    #[test]
    fn test_remove_wrong_scope_keeps_entry() {
        let registry = SessionRegistry::new();
        registry
            .insert(SessionEntry::new(session("S1", Some("E1")), None))
            .unwrap();

        assert!(registry.remove(&sid("S1"), Some(&eid("E2"))).is_none());
        assert!(registry.contains(&sid("S1")));
    }

    #[test]
    fn test_remove_twice_second_returns_none() {
        let registry = SessionRegistry::new();
        registry.insert(SessionEntry::new(session("S1", None), None)).unwrap();

        assert!(registry.remove(&sid("S1"), None).is_some());
        assert!(registry.remove(&sid("S1"), None).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_drain_empties_registry() {
        let registry = SessionRegistry::new();
        registry.insert(SessionEntry::new(session("S1", None), None)).unwrap();
        registry.insert(SessionEntry::new(session("S2", None), None)).unwrap();

        let drained = registry.drain();

        assert_eq!(drained.len(), 2);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_insert_remove_keeps_map_consistent() {
        let registry = Arc::new(SessionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let id = format!("S{t}-{i}");
                        registry.insert(SessionEntry::new(session(&id, None), None)).unwrap();
                        if i % 2 == 0 {
                            assert!(registry.remove(&sid(&id), None).is_some());
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.len(), 8 * 50);
    }
}
