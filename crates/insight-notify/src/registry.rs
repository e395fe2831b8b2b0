//! The live session registry.
//!
//! One map, keyed by identity, holding the session's role, label, and
//! transport handle together — a role entry can never outlive its
//! connection. Entries lock independently, so delivery to one identity
//! never contends with connects or disconnects of another.

use std::sync::Arc;

use dashmap::DashMap;
use insight_core::{ConnectionId, Role, UserId};

use crate::session::Session;

/// Mapping from identity to live [`Session`], at most one per identity.
///
/// All mutation goes through the connection lifecycle handler; readers
/// take snapshots ([`all`](Self::all), [`with_role_in`](Self::with_role_in))
/// so no lock is held across delivery attempts.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<UserId, Arc<Session>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Register a session, atomically replacing any prior session under
    /// the same identity. Returns the replaced session, whose transport
    /// handle is abandoned rather than closed here.
    pub fn upsert(&self, session: Arc<Session>) -> Option<Arc<Session>> {
        self.sessions.insert(session.identity().clone(), session)
    }

    /// Remove the session for `identity`. Absent identities are a no-op.
    pub fn remove(&self, identity: &UserId) -> Option<Arc<Session>> {
        self.sessions.remove(identity).map(|(_, session)| session)
    }

    /// Remove the session for `identity` only if it is still the given
    /// connection generation.
    ///
    /// Teardown and reap paths use this so a connection that was already
    /// superseded cannot evict its replacement. Returns whether a session
    /// was removed.
    pub fn remove_if(&self, identity: &UserId, connection: ConnectionId) -> bool {
        self.sessions
            .remove_if(identity, |_, session| session.connection_id() == connection)
            .is_some()
    }

    /// The session for `identity`, if connected.
    #[must_use]
    pub fn lookup(&self, identity: &UserId) -> Option<Arc<Session>> {
        self.sessions.get(identity).map(|entry| entry.value().clone())
    }

    /// Snapshot of every live session at this instant.
    ///
    /// Sessions connecting after the snapshot are not retroactively
    /// included in an in-flight fan-out.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Snapshot of sessions whose role is in `roles`.
    ///
    /// Sessions that registered without a role never match.
    #[must_use]
    pub fn with_role_in(&self, roles: &[Role]) -> Vec<Arc<Session>> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().role().is_some_and(|r| roles.contains(&r)))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::roles::STAFF_ROLES;
    use tokio::sync::mpsc;

    fn session(identity: &str, role: Option<Role>) -> Arc<Session> {
        let (tx, rx) = mpsc::channel(8);
        // Receivers are dropped; registry tests never push.
        drop(rx);
        Arc::new(Session::new(UserId::from(identity), role, None, tx))
    }

    #[test]
    fn upsert_and_lookup() {
        let registry = SessionRegistry::new();
        assert!(registry.upsert(session("u1", Some(Role::Admin))).is_none());
        let found = registry.lookup(&UserId::from("u1")).unwrap();
        assert_eq!(found.role(), Some(Role::Admin));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn upsert_replaces_same_identity() {
        let registry = SessionRegistry::new();
        let first = session("u1", Some(Role::Reporter));
        let first_conn = first.connection_id();
        assert!(registry.upsert(first).is_none());

        let second = session("u1", Some(Role::Maintainer));
        let replaced = registry.upsert(second).unwrap();
        assert_eq!(replaced.connection_id(), first_conn);

        // Exactly one session per identity; the newer one wins.
        assert_eq!(registry.len(), 1);
        let current = registry.lookup(&UserId::from("u1")).unwrap();
        assert_eq!(current.role(), Some(Role::Maintainer));
        assert_ne!(current.connection_id(), first_conn);
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = SessionRegistry::new();
        let _ = registry.upsert(session("u1", None));
        assert!(registry.remove(&UserId::from("u1")).is_some());
        assert!(registry.remove(&UserId::from("u1")).is_none());
        assert!(registry.remove(&UserId::from("never")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_if_guards_generation() {
        let registry = SessionRegistry::new();
        let old = session("u1", None);
        let old_conn = old.connection_id();
        let _ = registry.upsert(old);

        // Superseding reconnect
        let _ = registry.upsert(session("u1", None));

        // The superseded connection's teardown must not evict the new one.
        assert!(!registry.remove_if(&UserId::from("u1"), old_conn));
        assert_eq!(registry.len(), 1);

        let current = registry.lookup(&UserId::from("u1")).unwrap();
        assert!(registry.remove_if(&UserId::from("u1"), current.connection_id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn all_is_a_snapshot() {
        let registry = SessionRegistry::new();
        let _ = registry.upsert(session("a", None));
        let _ = registry.upsert(session("b", None));
        let snapshot = registry.all();
        assert_eq!(snapshot.len(), 2);

        // Mutating after the snapshot does not change it.
        let _ = registry.remove(&UserId::from("a"));
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn with_role_in_filters_roles() {
        let registry = SessionRegistry::new();
        let _ = registry.upsert(session("r1", Some(Role::Reporter)));
        let _ = registry.upsert(session("m1", Some(Role::Maintainer)));
        let _ = registry.upsert(session("a1", Some(Role::Admin)));
        let _ = registry.upsert(session("anon", None));

        let staff = registry.with_role_in(&STAFF_ROLES);
        let mut identities: Vec<_> = staff.iter().map(|s| s.identity().to_string()).collect();
        identities.sort();
        assert_eq!(identities, ["a1", "m1"]);
    }

    #[test]
    fn roleless_sessions_never_match_role_queries() {
        let registry = SessionRegistry::new();
        let _ = registry.upsert(session("anon", None));
        assert!(registry.with_role_in(&STAFF_ROLES).is_empty());
        assert!(registry.with_role_in(&[Role::Reporter]).is_empty());
        // But they are visible to broadcasts.
        assert_eq!(registry.all().len(), 1);
    }
}
