//! The lifecycle manager: start, rotate, read and stop sessions.
//!
//! This is the central piece of the session layer. Every operation touches
//! two places, the in-memory [`SessionRegistry`] and the external store,
//! and the ordering between them is what keeps them consistent:
//!
//! - **start** writes the code first and registers last, so a failed write
//!   leaves nothing behind.
//! - **rotate** deletes the old code before writing the new one, under the
//!   session's rotation gate, so two rotations never interleave.
//! - **stop** unregisters and cancels the timer first, then deletes the
//!   code under the gate, so no rotation can land after stop returns.
//! - **read** goes straight to the store; a replica that never saw the
//!   session start can still serve its code.
//!
//! Start, rotate and stop run on their own task. A caller that gives up
//! (a dropped HTTP connection, a timeout) stops waiting for the result but
//! never leaves an operation half applied.
//!
//! ## Lifecycle
//!
//! ```text
//! start_session() ──→ [Active] ──→ stop_session() ──→ [Stopped]
//!                       │   ↑
//!        rotate_code()  │   │  (timer, if a period is set)
//!                       └───┘
//! ```

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use checkgate_protocol::{EventId, SessionId};
use checkgate_store::{KeyValueStore, StoreError};
use checkgate_tick::{CancelSignal, RotationConfig, RotationSchedule, RotationTimer};

use crate::registry::SessionEntry;
use crate::{CodeGenerator, Session, SessionConfig, SessionError, SessionRegistry};

/// Per-request options for [`SessionLifecycleManager::start_session`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StartOptions {
    /// Overrides the configured rotation period for this session.
    /// `Some(Duration::ZERO)` turns timer rotation off for it.
    pub rotation_period: Option<Duration>,
}

/// What a successful start hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedSession {
    pub session_id: SessionId,
    pub code: String,
    /// The effective rotation period, if the server rotates this session.
    pub rotation_period: Option<Duration>,
}

/// Orchestrates session lifecycles against a [`KeyValueStore`].
///
/// Cheap to clone: clones share the same registry and store. Rotation
/// timers hold only a weak reference, so dropping the last clone tears
/// the timers down with the registry.
pub struct SessionLifecycleManager<S> {
    shared: Arc<Shared<S>>,
}

struct Shared<S> {
    store: S,
    registry: SessionRegistry,
    generator: CodeGenerator,
    config: SessionConfig,
}

impl<S> Clone for SessionLifecycleManager<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: KeyValueStore> SessionLifecycleManager<S> {
    /// Creates a manager with an empty registry.
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                registry: SessionRegistry::new(),
                generator: CodeGenerator::new(config.code_format),
                config,
            }),
        }
    }

    /// The registry of sessions started by this process.
    pub fn registry(&self) -> &SessionRegistry {
        &self.shared.registry
    }

    /// The store codes are written to.
    pub fn store(&self) -> &S {
        &self.shared.store
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Number of sessions currently active in this process.
    pub fn active_sessions(&self) -> usize {
        self.shared.registry.len()
    }

    /// Starts a session and writes its first code.
    ///
    /// # Errors
    /// - [`SessionError::InvalidRequest`]: the key strategy needs an event
    ///   id and none was given
    /// - [`SessionError::Internal`]: the store write failed; nothing was
    ///   registered
    pub async fn start_session(
        &self,
        event_id: Option<EventId>,
        options: StartOptions,
    ) -> Result<StartedSession, SessionError> {
        let manager = self.clone();
        run_to_completion(async move { manager.start_inner(event_id, options).await }).await
    }

    /// Replaces the session's code with a new, different one.
    ///
    /// The new code is written without a TTL.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: the session isn't active in this
    ///   process under `event_id`
    /// - [`SessionError::Internal`]: a store operation failed
    pub async fn rotate_code(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<String, SessionError> {
        let manager = self.clone();
        let session_id = session_id.clone();
        let event_id = event_id.cloned();
        run_to_completion(async move { manager.rotate_inner(&session_id, event_id.as_ref()).await })
            .await
    }

    /// Stops a session: cancels its timer, unregisters it and deletes its
    /// code.
    ///
    /// The session is unregistered even if the final delete fails; the
    /// error is still reported so the caller knows a code may linger.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: the session isn't active in this
    ///   process under `event_id`
    /// - [`SessionError::Internal`]: the store delete failed
    pub async fn stop_session(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<(), SessionError> {
        let manager = self.clone();
        let session_id = session_id.clone();
        let event_id = event_id.cloned();
        run_to_completion(async move { manager.stop_inner(&session_id, event_id.as_ref()).await })
            .await
    }

    async fn start_inner(
        &self,
        event_id: Option<EventId>,
        options: StartOptions,
    ) -> Result<StartedSession, SessionError> {
        let shared = &self.shared;
        let session_id = SessionId::generate();
        let code_key = shared
            .config
            .key_strategy
            .derive_key(&session_id, event_id.as_ref())?;
        let code = shared.generator.generate();

        tracing::info!(
            %session_id,
            event_id = event_id.as_ref().map(EventId::as_str),
            "creating session"
        );

        shared
            .store
            .set(&code_key, &code, shared.config.key_strategy.ttl())
            .await
            .inspect_err(|e| {
                tracing::error!(%session_id, error = %e, "failed to store initial code");
            })?;

        let rotation_period = options
            .rotation_period
            .or(shared.config.rotation_period)
            .filter(|p| !p.is_zero())
            .map(|p| p.clamp(RotationConfig::MIN_PERIOD, RotationConfig::MAX_PERIOD));

        let timer = rotation_period.map(|period| self.spawn_rotation_timer(&session_id, period));
        let session = Session {
            session_id: session_id.clone(),
            event_id,
            started_at: SystemTime::now(),
            rotation_period,
            code_key: code_key.clone(),
        };

        if let Err(e) = shared.registry.insert(SessionEntry::new(session, timer)) {
            // Don't leave a code behind for a session nobody owns.
            if let Err(del) = shared.store.delete(&code_key).await {
                tracing::error!(%session_id, error = %del, "failed to remove orphaned code");
            }
            return Err(e);
        }

        tracing::info!(
            %session_id,
            rotation_ms = rotation_period.map(|p| p.as_millis() as u64),
            "session started"
        );
        tracing::debug!(%session_id, %code, "initial code issued");

        Ok(StartedSession {
            session_id,
            code,
            rotation_period,
        })
    }

    async fn rotate_inner(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<String, SessionError> {
        let shared = &self.shared;
        let Some((gate, code_key)) = shared.registry.rotation_target(session_id, event_id) else {
            tracing::warn!(%session_id, "attempt to rotate code for unknown session");
            return Err(SessionError::NotFound(session_id.clone()));
        };

        let _gate = gate.lock().await;
        // A stop may have won the race for the gate.
        if !shared.registry.contains(session_id) {
            tracing::warn!(%session_id, "session stopped before rotation");
            return Err(SessionError::NotFound(session_id.clone()));
        }

        let code = shared
            .replace_code(&code_key, None)
            .await
            .inspect_err(|e| {
                tracing::error!(%session_id, error = %e, "failed to rotate code");
            })?;

        tracing::info!(%session_id, "code rotated");
        tracing::debug!(%session_id, %code, "new code issued");
        Ok(code)
    }

    /// Reads the session's current code from the store.
    ///
    /// Doesn't consult the registry, so any replica sharing the store can
    /// answer.
    ///
    /// # Errors
    /// - [`SessionError::CodeNotFound`]: no code stored (never created,
    ///   stopped, or expired)
    /// - [`SessionError::InvalidRequest`]: the key strategy needs an event
    ///   id and none was given
    /// - [`SessionError::Internal`]: the store read failed
    pub async fn get_code(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<String, SessionError> {
        let shared = &self.shared;
        let code_key = shared.config.key_strategy.derive_key(session_id, event_id)?;

        let code = shared.store.get(&code_key).await.inspect_err(|e| {
            tracing::error!(%session_id, error = %e, "failed to read code");
        })?;

        match code {
            Some(code) => {
                tracing::debug!(%session_id, "code retrieved");
                Ok(code)
            }
            None => {
                tracing::warn!(%session_id, "code not found");
                Err(SessionError::CodeNotFound(session_id.clone()))
            }
        }
    }

    async fn stop_inner(
        &self,
        session_id: &SessionId,
        event_id: Option<&EventId>,
    ) -> Result<(), SessionError> {
        let Some(entry) = self.shared.registry.remove(session_id, event_id) else {
            tracing::warn!(%session_id, "attempt to stop unknown session");
            return Err(SessionError::NotFound(session_id.clone()));
        };

        self.shared.delete_code(&entry).await.inspect_err(|e| {
            tracing::error!(%session_id, error = %e, "failed to delete code on stop");
        })?;

        tracing::info!(%session_id, "session stopped");
        Ok(())
    }

    /// Removes every session and its code. Returns `(cleaned, failed)`.
    ///
    /// Store failures are logged and skipped, never retried.
    pub(crate) async fn drain(&self) -> (usize, usize) {
        let entries = self.shared.registry.drain();
        let mut cleaned = 0;
        let mut failed = 0;

        for entry in &entries {
            let session_id = &entry.session.session_id;
            match self.shared.delete_code(entry).await {
                Ok(()) => {
                    tracing::debug!(%session_id, "code removed during shutdown");
                    cleaned += 1;
                }
                Err(e) => {
                    tracing::error!(%session_id, error = %e, "failed to remove code during shutdown");
                    failed += 1;
                }
            }
        }

        (cleaned, failed)
    }

    fn spawn_rotation_timer(&self, session_id: &SessionId, period: Duration) -> RotationTimer {
        let schedule = RotationSchedule::new(RotationConfig {
            initial_jitter: self.shared.config.rotation_jitter,
            ..RotationConfig::every(period)
        });
        let weak: Weak<Shared<S>> = Arc::downgrade(&self.shared);
        let session_id = session_id.clone();

        RotationTimer::spawn(schedule, move |tick, signal| {
            let weak = weak.clone();
            let session_id = session_id.clone();
            async move {
                // The manager is gone; nothing left to rotate for.
                let Some(shared) = weak.upgrade() else {
                    return ControlFlow::Break(());
                };
                if tick.overrun {
                    tracing::warn!(
                        %session_id,
                        tick = tick.tick,
                        skipped = tick.ticks_skipped,
                        "timer rotation running late"
                    );
                }
                shared.rotate_on_timer(&session_id, &signal).await
            }
        })
    }
}

/// Runs a lifecycle operation on its own task and waits for it.
///
/// Dropping the returned future detaches the task instead of cancelling
/// it, so the store and the registry always see the whole operation.
async fn run_to_completion<T, F>(operation: F) -> Result<T, SessionError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, SessionError>> + Send + 'static,
{
    match tokio::spawn(operation).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => {
            tracing::error!(error = %e, "session operation interrupted");
            Err(SessionError::Interrupted)
        }
    }
}

impl<S: KeyValueStore> Shared<S> {
    /// Delete-then-write under an already held gate.
    async fn replace_code(&self, code_key: &str, ttl: Option<Duration>) -> Result<String, StoreError> {
        let previous = self.store.get(code_key).await?;
        self.store.delete(code_key).await?;
        let code = self.generator.generate_distinct(previous.as_deref());
        self.store.set(code_key, &code, ttl).await?;
        Ok(code)
    }

    /// One timer-driven rotation. Keeps the strategy's TTL so self-expiring
    /// codes keep expiring.
    async fn rotate_on_timer(&self, session_id: &SessionId, signal: &CancelSignal) -> ControlFlow<()> {
        let Some((gate, code_key)) = self.registry.timer_target(session_id) else {
            return ControlFlow::Break(());
        };

        let _gate = gate.lock().await;
        if signal.is_cancelled() {
            return ControlFlow::Break(());
        }

        match self.replace_code(&code_key, self.config.key_strategy.ttl()).await {
            Ok(code) => {
                tracing::info!(%session_id, "code rotated by timer");
                tracing::debug!(%session_id, %code, "new code issued");
            }
            // Try again next period.
            Err(e) => tracing::error!(%session_id, error = %e, "timer rotation failed"),
        }
        ControlFlow::Continue(())
    }

    /// Waits out any in-flight rotation, then deletes the session's code.
    async fn delete_code(&self, entry: &SessionEntry) -> Result<(), StoreError> {
        let _gate = entry.gate.lock().await;
        self.store.delete(&entry.session.code_key).await
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionLifecycleManager`, run against `MemoryStore`.
    //!
    //! Naming: `test_{operation}_{scenario}_{expected}`.

    use checkgate_store::MemoryStore;

    use super::*;
    use crate::KeyStrategy;

    // -- Helpers ----------------------------------------------------------

    fn event_manager() -> (SessionLifecycleManager<MemoryStore>, MemoryStore) {
        let store = MemoryStore::new();
        let manager = SessionLifecycleManager::new(store.clone(), SessionConfig::default());
        (manager, store)
    }

    fn eid(id: &str) -> EventId {
        EventId::parse(id).unwrap()
    }

    fn sid(id: &str) -> SessionId {
        SessionId::parse(id).unwrap()
    }

    // =====================================================================
    // start_session()
    // =====================================================================

    #[tokio::test]
    async fn test_start_session_stores_code_and_registers() {
        let (mgr, store) = event_manager();

        let started = mgr
            .start_session(Some(eid("E1")), StartOptions::default())
            .await
            .expect("should start");

        assert_eq!(started.code.len(), 6);
        assert_eq!(started.rotation_period, None);
        assert!(mgr.registry().contains(&started.session_id));
        let key = format!("event:E1:session:{}", started.session_id);
        assert!(store.contains_key(&key));
    }

    #[tokio::test]
    async fn test_start_session_event_scoped_without_event_returns_invalid_request() {
        let (mgr, store) = event_manager();

        let result = mgr.start_session(None, StartOptions::default()).await;

        assert!(matches!(result, Err(SessionError::InvalidRequest(_))));
        assert!(mgr.registry().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_start_session_zero_period_disables_timer() {
        let store = MemoryStore::new();
        let mgr = SessionLifecycleManager::new(
            store,
            SessionConfig {
                rotation_period: Some(Duration::from_secs(30)),
                ..SessionConfig::default()
            },
        );

        let started = mgr
            .start_session(
                Some(eid("E1")),
                StartOptions {
                    rotation_period: Some(Duration::ZERO),
                },
            )
            .await
            .unwrap();

        assert_eq!(started.rotation_period, None);
    }

    #[tokio::test]
    async fn test_start_session_uses_configured_default_period() {
        let mgr = SessionLifecycleManager::new(
            MemoryStore::new(),
            SessionConfig {
                rotation_period: Some(Duration::from_secs(30)),
                ..SessionConfig::default()
            },
        );

        let started = mgr
            .start_session(Some(eid("E1")), StartOptions::default())
            .await
            .unwrap();

        assert_eq!(started.rotation_period, Some(Duration::from_secs(30)));
        let session = mgr.registry().get(&started.session_id).unwrap();
        assert_eq!(session.rotation_period, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_start_session_clamps_sub_second_period() {
        let (mgr, _store) = event_manager();

        let started = mgr
            .start_session(
                Some(eid("E1")),
                StartOptions {
                    rotation_period: Some(Duration::from_millis(10)),
                },
            )
            .await
            .unwrap();

        assert_eq!(started.rotation_period, Some(RotationConfig::MIN_PERIOD));
    }

    #[tokio::test]
    async fn test_start_session_self_expiring_uses_single_session_key() {
        let store = MemoryStore::new();
        let mgr = SessionLifecycleManager::new(
            store.clone(),
            SessionConfig {
                key_strategy: KeyStrategy::SelfExpiring {
                    ttl: Duration::from_secs(60),
                },
                ..SessionConfig::default()
            },
        );

        let started = mgr.start_session(None, StartOptions::default()).await.unwrap();

        assert!(store.contains_key(&format!("session:{}", started.session_id)));
    }

    // =====================================================================
    // rotate_code()
    // =====================================================================

    #[tokio::test]
    async fn test_rotate_code_unknown_session_returns_not_found() {
        let (mgr, _store) = event_manager();

        let result = mgr.rotate_code(&sid("nope"), Some(&eid("E1"))).await;

        assert!(matches!(result, Err(SessionError::NotFound(id)) if id == sid("nope")));
    }

    #[tokio::test]
    async fn test_rotate_code_wrong_event_returns_not_found() {
        let (mgr, _store) = event_manager();
        let started = mgr
            .start_session(Some(eid("E1")), StartOptions::default())
            .await
            .unwrap();

        let result = mgr.rotate_code(&started.session_id, Some(&eid("E2"))).await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rotate_code_returns_new_stored_code() {
        let (mgr, _store) = event_manager();
        let e1 = eid("E1");
        let started = mgr
            .start_session(Some(e1.clone()), StartOptions::default())
            .await
            .unwrap();

        let rotated = mgr.rotate_code(&started.session_id, Some(&e1)).await.unwrap();

        assert_ne!(rotated, started.code);
        let current = mgr.get_code(&started.session_id, Some(&e1)).await.unwrap();
        assert_eq!(current, rotated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rotate_code_drops_ttl() {
        let mgr = SessionLifecycleManager::new(
            MemoryStore::new(),
            SessionConfig {
                key_strategy: KeyStrategy::SelfExpiring {
                    ttl: Duration::from_secs(5),
                },
                ..SessionConfig::default()
            },
        );
        let started = mgr.start_session(None, StartOptions::default()).await.unwrap();

        let rotated = mgr.rotate_code(&started.session_id, None).await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(mgr.get_code(&started.session_id, None).await.unwrap(), rotated);
    }

    // =====================================================================
    // get_code()
    // =====================================================================

    #[tokio::test]
    async fn test_get_code_never_created_returns_code_not_found() {
        let (mgr, _store) = event_manager();

        let result = mgr.get_code(&sid("ghost"), Some(&eid("E1"))).await;

        assert!(matches!(result, Err(SessionError::CodeNotFound(_))));
    }

    #[tokio::test]
    async fn test_get_code_reads_store_without_registry() {
        // Simulates a replica: the store has the code, this registry doesn't.
        let (mgr, store) = event_manager();
        store
            .set("event:E1:session:remote", "123456", None)
            .await
            .unwrap();

        let code = mgr.get_code(&sid("remote"), Some(&eid("E1"))).await.unwrap();

        assert_eq!(code, "123456");
        assert!(mgr.registry().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_code_after_ttl_returns_code_not_found() {
        let mgr = SessionLifecycleManager::new(
            MemoryStore::new(),
            SessionConfig {
                key_strategy: KeyStrategy::SelfExpiring {
                    ttl: Duration::from_secs(60),
                },
                ..SessionConfig::default()
            },
        );
        let started = mgr.start_session(None, StartOptions::default()).await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;

        let result = mgr.get_code(&started.session_id, None).await;
        assert!(matches!(result, Err(SessionError::CodeNotFound(_))));
        // Expiry doesn't stop the session; it can still be rotated.
        assert!(mgr.registry().contains(&started.session_id));
    }

    // =====================================================================
    // stop_session()
    // =====================================================================

    #[tokio::test]
    async fn test_stop_session_removes_registry_entry_and_code() {
        let (mgr, store) = event_manager();
        let e1 = eid("E1");
        let started = mgr
            .start_session(Some(e1.clone()), StartOptions::default())
            .await
            .unwrap();

        mgr.stop_session(&started.session_id, Some(&e1)).await.unwrap();

        assert!(mgr.registry().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_stop_session_twice_returns_not_found() {
        let (mgr, _store) = event_manager();
        let e1 = eid("E1");
        let started = mgr
            .start_session(Some(e1.clone()), StartOptions::default())
            .await
            .unwrap();
        mgr.stop_session(&started.session_id, Some(&e1)).await.unwrap();

        let result = mgr.stop_session(&started.session_id, Some(&e1)).await;

        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_stop_session_with_absent_code_succeeds() {
        // The code already expired (or was removed by another replica);
        // deleting an absent key is not an error.
        let (mgr, store) = event_manager();
        let e1 = eid("E1");
        let started = mgr
            .start_session(Some(e1.clone()), StartOptions::default())
            .await
            .unwrap();
        store
            .delete(&format!("event:E1:session:{}", started.session_id))
            .await
            .unwrap();

        mgr.stop_session(&started.session_id, Some(&e1)).await.unwrap();
    }

    // =====================================================================
    // Timer rotation
    // =====================================================================

    #[tokio::test(start_paused = true)]
    async fn test_timer_rotates_code_every_period() {
        let mgr = SessionLifecycleManager::new(
            MemoryStore::new(),
            SessionConfig {
                rotation_jitter: Duration::ZERO,
                ..SessionConfig::default()
            },
        );
        let e1 = eid("E1");
        let started = mgr
            .start_session(
                Some(e1.clone()),
                StartOptions {
                    rotation_period: Some(Duration::from_secs(10)),
                },
            )
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(11)).await;
        let after_one = mgr.get_code(&started.session_id, Some(&e1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        let after_two = mgr.get_code(&started.session_id, Some(&e1)).await.unwrap();

        assert_ne!(after_one, started.code);
        assert_ne!(after_two, after_one);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_stops_after_stop_session() {
        let store = MemoryStore::new();
        let mgr = SessionLifecycleManager::new(
            store.clone(),
            SessionConfig {
                rotation_jitter: Duration::ZERO,
                ..SessionConfig::default()
            },
        );
        let e1 = eid("E1");
        let started = mgr
            .start_session(
                Some(e1.clone()),
                StartOptions {
                    rotation_period: Some(Duration::from_secs(1)),
                },
            )
            .await
            .unwrap();

        mgr.stop_session(&started.session_id, Some(&e1)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(store.is_empty(), "no rotation may recreate the code");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_manager_ends_timers() {
        let store = MemoryStore::new();
        let mgr = SessionLifecycleManager::new(
            store.clone(),
            SessionConfig {
                rotation_jitter: Duration::ZERO,
                ..SessionConfig::default()
            },
        );
        let started = mgr
            .start_session(
                Some(eid("E1")),
                StartOptions {
                    rotation_period: Some(Duration::from_secs(1)),
                },
            )
            .await
            .unwrap();
        let key = format!("event:E1:session:{}", started.session_id);

        drop(mgr);
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Still the original code: no timer rotated it after the drop.
        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some(started.code.as_str()));
    }
}
