//! Provider registry
//!
//! Process-wide, lazily populated cache of one client per provider kind.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::HttpError;

/// The transports a client can be built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Minimal fetch-style client on `hyper`.
    Hyper,
    /// Hook-based client on `reqwest`.
    Reqwest,
    /// Builder-object client on `ureq`.
    Ureq,
    /// Client whose interceptors live in a `tower` service stack.
    Tower,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [Self::Hyper, Self::Reqwest, Self::Ureq, Self::Tower];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hyper => "hyper",
            Self::Reqwest => "reqwest",
            Self::Ureq => "ureq",
            Self::Tower => "tower",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(token))
            .ok_or_else(|| HttpError::UnsupportedProvider(s.to_string()))
    }
}

type Entry = Arc<dyn Any + Send + Sync>;

/// One client instance per [`ProviderKind`].
///
/// Entries are created on first use and shared afterwards, so interceptors
/// registered through one accessor are visible through every other.
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ProviderKind, Entry>>,
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        let mut kinds: Vec<_> = clients.keys().map(ProviderKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("ClientRegistry").field("clients", &kinds).finish()
    }
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the client stored for `kind`, creating it with `init` on first use.
    ///
    /// Concurrent first calls still yield a single shared instance; an `init`
    /// result that loses the race is dropped. Each kind holds one client type:
    /// asking for another type trips a debug assertion, and release builds
    /// leave the stored entry alone and hand back an unshared instance.
    pub fn get_or_init<T, F>(&self, kind: ProviderKind, init: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.lookup::<T>(kind) {
            return existing;
        }

        let created = Arc::new(init());
        {
            let mut clients = self.clients.write().unwrap_or_else(PoisonError::into_inner);
            match clients.get(&kind).map(|entry| entry.clone().downcast::<T>()) {
                Some(Ok(existing)) => return existing,
                Some(Err(_)) => {}
                None => {
                    clients.insert(kind, created.clone() as Entry);
                    tracing::debug!(target: "switchyard::registry", provider = %kind, "created client instance");
                    return created;
                }
            }
        }

        tracing::warn!(target: "switchyard::registry", provider = %kind, "registry entry holds a different client type, returning an unshared instance");
        debug_assert!(false, "registry entry for {kind} holds a different client type");
        created
    }

    fn lookup<T: Any + Send + Sync>(&self, kind: ProviderKind) -> Option<Arc<T>> {
        let clients = self.clients.read().unwrap_or_else(PoisonError::into_inner);
        clients
            .get(&kind)
            .and_then(|entry| entry.clone().downcast::<T>().ok())
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.clients
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&kind)
    }

    /// Forget the instance for `kind`; the next access creates a fresh one.
    pub fn remove(&self, kind: ProviderKind) -> bool {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind)
            .is_some()
    }

    pub fn clear(&self) {
        self.clients
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        tracing::debug!(target: "switchyard::registry", "cleared client instances");
    }

    pub fn len(&self) -> usize {
        self.clients.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static GLOBAL_REGISTRY: OnceLock<ClientRegistry> = OnceLock::new();

/// The process-wide registry behind every `instance()` accessor.
pub fn global() -> &'static ClientRegistry {
    GLOBAL_REGISTRY.get_or_init(ClientRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Dummy(u32);

    #[test]
    fn parses_tokens_case_insensitively() {
        assert_eq!("hyper".parse::<ProviderKind>().unwrap(), ProviderKind::Hyper);
        assert_eq!(" Reqwest ".parse::<ProviderKind>().unwrap(), ProviderKind::Reqwest);
        assert_eq!("UREQ".parse::<ProviderKind>().unwrap(), ProviderKind::Ureq);
        assert_eq!("tower".parse::<ProviderKind>().unwrap(), ProviderKind::Tower);
    }

    #[test]
    fn unknown_token_is_unsupported_provider() {
        let err = "gopher".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err, HttpError::UnsupportedProvider("gopher".into()));
        assert_eq!(err.to_string(), "This provider is not supported: gopher");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn get_or_init_creates_once() {
        let registry = ClientRegistry::new();
        let inits = AtomicUsize::new(0);

        let first = registry.get_or_init(ProviderKind::Hyper, || {
            inits.fetch_add(1, Ordering::SeqCst);
            Dummy(1)
        });
        let second = registry.get_or_init(ProviderKind::Hyper, || {
            inits.fetch_add(1, Ordering::SeqCst);
            Dummy(2)
        });

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.0, 1);
        assert_eq!(inits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn kinds_hold_separate_instances() {
        let registry = ClientRegistry::new();
        let hyper = registry.get_or_init(ProviderKind::Hyper, || Dummy(1));
        let ureq = registry.get_or_init(ProviderKind::Ureq, || Dummy(2));
        assert!(!Arc::ptr_eq(&hyper, &ureq));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_forces_a_fresh_instance() {
        let registry = ClientRegistry::new();
        let first = registry.get_or_init(ProviderKind::Tower, || Dummy(1));
        assert!(registry.remove(ProviderKind::Tower));
        assert!(!registry.contains(ProviderKind::Tower));

        let second = registry.get_or_init(ProviderKind::Tower, || Dummy(2));
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "holds a different client type")]
    fn mismatched_type_trips_debug_assertion() {
        let registry = ClientRegistry::new();
        registry.get_or_init(ProviderKind::Reqwest, || Dummy(1));
        registry.get_or_init(ProviderKind::Reqwest, || String::from("other"));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn mismatched_type_leaves_stored_entry() {
        let registry = ClientRegistry::new();
        let stored = registry.get_or_init(ProviderKind::Reqwest, || Dummy(1));
        let other = registry.get_or_init(ProviderKind::Reqwest, || String::from("other"));
        assert_eq!(other.as_str(), "other");

        let again = registry.get_or_init(ProviderKind::Reqwest, || Dummy(2));
        assert!(Arc::ptr_eq(&stored, &again));
    }

    #[test]
    fn concurrent_first_access_yields_one_instance() {
        let registry = Arc::new(ClientRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get_or_init(ProviderKind::Hyper, || Dummy(n)))
            })
            .collect();
        let instances: Vec<Arc<Dummy>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }
}
