//! Shared session registry
//!
//! The one piece of process-wide mutable state: the table of registered
//! sessions and the set of names in use. Every worker goes through this
//! contract; nothing else may touch the underlying containers.
//!
//! All operations serialize on a single mutex. Name checks and inserts
//! happen under the same guard, so two sessions racing for one name can
//! never both win. Iteration snapshots the entries under the guard and
//! invokes the callback after releasing it; callbacks may therefore write
//! to outbound handles (or drop sessions) without any deadlock risk.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::RegisterError;
use crate::session::{Outbound, Session};
use crate::types::SessionId;

/// One registered entry: the name, its registration order, and the handle
/// used to deliver lines to the session.
struct Registered {
    name: String,
    seq: u64,
    outbound: Outbound,
}

#[derive(Default)]
struct RegistryInner {
    /// Names currently in use, for uniqueness checks
    names: HashSet<String>,
    /// Session identity -> registered entry
    sessions: HashMap<SessionId, Registered>,
    /// Monotonic registration counter; fixes snapshot ordering
    next_seq: u64,
}

/// Process-wide registry of named sessions
///
/// Created once at startup and shared (via `Arc`) by every connection
/// worker for the lifetime of the server.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<RegistryInner>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // A panicking holder leaves the tables consistent (mutations are
        // straight inserts/removes), so recover the guard instead of
        // poisoning every other worker.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically claim `name` for `session`.
    ///
    /// Checks the name set and inserts under one guard: of any number of
    /// concurrent calls with the same candidate, exactly one succeeds and
    /// the rest observe `NameTaken` with no mutation.
    pub fn try_register(&self, name: &str, session: &Session) -> Result<(), RegisterError> {
        let mut inner = self.lock();

        if inner.names.contains(name) {
            return Err(RegisterError::NameTaken(name.to_string()));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.names.insert(name.to_string());
        inner.sessions.insert(
            session.id,
            Registered {
                name: name.to_string(),
                seq,
                outbound: session.outbound().clone(),
            },
        );

        debug!("Registered '{}', total sessions: {}", name, inner.sessions.len());
        Ok(())
    }

    /// Remove a session and release its name.
    ///
    /// Idempotent: unknown or never-registered sessions are a no-op.
    pub fn unregister(&self, id: SessionId) {
        let mut inner = self.lock();

        if let Some(entry) = inner.sessions.remove(&id) {
            inner.names.remove(&entry.name);
            debug!(
                "Unregistered '{}', total sessions: {}",
                entry.name,
                inner.sessions.len()
            );
        }
    }

    /// Current registered names, in registration order.
    ///
    /// The result is a consistent point-in-time snapshot: no duplicates,
    /// and every name corresponds to a session that was live at the
    /// snapshot instant.
    pub fn snapshot_names(&self) -> Vec<String> {
        let inner = self.lock();
        let mut entries: Vec<(u64, &str)> = inner
            .sessions
            .values()
            .map(|entry| (entry.seq, entry.name.as_str()))
            .collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, name)| name.to_string()).collect()
    }

    /// Invoke `f(name, outbound)` for every registered session.
    ///
    /// The entries are snapshotted under the guard and `f` runs after it is
    /// released, so `f` may send through the handles freely. Order follows
    /// registration order.
    pub fn for_each_session<F>(&self, mut f: F)
    where
        F: FnMut(&str, &Outbound),
    {
        let mut snapshot: Vec<(u64, String, Outbound)> = {
            let inner = self.lock();
            inner
                .sessions
                .values()
                .map(|entry| (entry.seq, entry.name.clone(), entry.outbound.clone()))
                .collect()
        };
        snapshot.sort_unstable_by_key(|(seq, _, _)| *seq);

        for (_, name, outbound) in &snapshot {
            f(name, outbound);
        }
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// True when no session is registered
    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }
}
