// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Narrow repository abstractions.
//!
//! Rather than one monolithic persistence trait, each concern gets its own
//! interface: [`AgentRepo`], [`IntentRepo`], [`DecisionRepo`],
//! [`TrustProfileRepo`], [`PolicyBundleRepo`], and [`EventStore`]. A
//! production deployment is free to back some of these with a relational
//! table and others with an append-only log — the orchestrator only
//! depends on the trait boundary, never on a shared storage struct.
//!
//! Every mutating method takes `&mut self`, the same convention the engine
//! uses for its managers: callers needing shared access wrap the whole
//! repository (or the whole orchestrator) in `Arc<Mutex<_>>` —
//! `async_engine` wraps at the manager level with `tokio::sync::RwLock` —
//! rather than threading interior mutability through every trait impl.
//!
//! This module ships `InMemory*` implementations of every trait, suitable
//! for tests and single-process deployments. Durable implementations (file-
//! based JSON, etc.) live in downstream crates such as
//! `warden-governance-std` so this crate remains `no_std`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::error::StoreError;
use crate::types::{Agent, Decision, Intent, PolicyBundle, TrustProfile};

/// Append-only proof event stream, keyed by correlation id.
///
/// `EventStore` is the one repository where ordering and chain integrity
/// matter more than simple CRUD — appends must detect a concurrent append
/// to the same correlation id's tip and surface
/// [`StoreError::ChainConflict`] rather than silently overwriting.
pub trait EventStore: Send + Sync {
    /// Append a pre-serialized proof event record to the chain for
    /// `correlation_id`. `record` is the canonical JSON encoding produced
    /// by [`crate::audit::ProofChain`]; this trait stores bytes, not
    /// [`crate::audit::ProofEvent`] structs, so the hashing logic stays in
    /// one place (the chain layer) regardless of backend.
    fn append(&mut self, correlation_id: &str, event_id: &str, record: Vec<u8>) -> Result<(), StoreError>;

    /// All events recorded for `correlation_id`, oldest first.
    fn stream(&self, correlation_id: &str) -> Result<Vec<Vec<u8>>, StoreError>;

    /// The most recently appended record for `correlation_id`, if any.
    fn tail(&self, correlation_id: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Repository for registered agents.
pub trait AgentRepo: Send + Sync {
    fn get(&self, agent_id: &str) -> Result<Agent, StoreError>;
    fn put(&mut self, agent: Agent) -> Result<(), StoreError>;
}

/// Repository for declared intents.
pub trait IntentRepo: Send + Sync {
    fn get(&self, intent_id: &str) -> Result<Intent, StoreError>;
    /// Insert or fully replace an intent. The orchestrator is responsible
    /// for enforcing the terminal-state invariant before calling this.
    fn put(&mut self, intent: Intent) -> Result<(), StoreError>;
    /// `true` if an intent with this id has already been recorded — used
    /// for idempotency checks keyed on `intentId`.
    fn exists(&self, intent_id: &str) -> Result<bool, StoreError>;
}

/// Repository for authorizer decisions.
pub trait DecisionRepo: Send + Sync {
    fn get(&self, decision_id: &str) -> Result<Decision, StoreError>;
    fn get_by_intent(&self, intent_id: &str) -> Result<Option<Decision>, StoreError>;
    fn put(&mut self, decision: Decision) -> Result<(), StoreError>;
}

/// Repository for per-agent trust profiles, with optimistic concurrency.
pub trait TrustProfileRepo: Send + Sync {
    fn get(&self, agent_id: &str) -> Result<TrustProfile, StoreError>;

    /// Compare-and-swap: succeeds only if the stored profile's `version`
    /// equals `expected_version`; otherwise returns
    /// [`StoreError::VersionConflict`] and the caller must re-read and
    /// retry (invariant I8).
    fn compare_and_swap(
        &mut self,
        agent_id: &str,
        expected_version: u64,
        new_profile: TrustProfile,
    ) -> Result<(), StoreError>;

    /// Unconditional insert, used only when first registering an agent.
    fn put(&mut self, profile: TrustProfile) -> Result<(), StoreError>;
}

/// Repository for policy bundles.
pub trait PolicyBundleRepo: Send + Sync {
    fn get(&self, bundle_id: &str) -> Result<PolicyBundle, StoreError>;
    fn put(&mut self, bundle: PolicyBundle) -> Result<(), StoreError>;
    /// All enabled bundles, for resolution by domain/environment/
    /// jurisdiction in [`crate::policy::PolicyEngine::resolve`].
    fn list_enabled(&self) -> Result<Vec<PolicyBundle>, StoreError>;
}

// ---------------------------------------------------------------------------
// Shared-ownership blanket impls
// ---------------------------------------------------------------------------

// A single durable backend (e.g. `warden-governance-std`'s `FileStore`)
// commonly implements all six traits on one struct backed by one file.
// `GovernanceEngine::new` takes six independently-typed repositories, so
// sharing that one backend across every slot means wrapping it once in
// `Arc<std::sync::Mutex<_>>` and handing out clones of the handle — these
// blanket impls let the wrapper satisfy every trait directly rather than
// requiring a newtype per slot. `std`-only: `std::sync::Mutex` has no
// `no_std` equivalent in this crate's dependency set.
#[cfg(feature = "std")]
mod shared {
    use super::*;
    use std::sync::{Arc, Mutex};

    impl<R: AgentRepo> AgentRepo for Arc<Mutex<R>> {
        fn get(&self, agent_id: &str) -> Result<Agent, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get(agent_id)
        }
        fn put(&mut self, agent: Agent) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").put(agent)
        }
    }

    impl<R: IntentRepo> IntentRepo for Arc<Mutex<R>> {
        fn get(&self, intent_id: &str) -> Result<Intent, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get(intent_id)
        }
        fn put(&mut self, intent: Intent) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").put(intent)
        }
        fn exists(&self, intent_id: &str) -> Result<bool, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").exists(intent_id)
        }
    }

    impl<R: DecisionRepo> DecisionRepo for Arc<Mutex<R>> {
        fn get(&self, decision_id: &str) -> Result<Decision, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get(decision_id)
        }
        fn get_by_intent(&self, intent_id: &str) -> Result<Option<Decision>, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get_by_intent(intent_id)
        }
        fn put(&mut self, decision: Decision) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").put(decision)
        }
    }

    impl<R: TrustProfileRepo> TrustProfileRepo for Arc<Mutex<R>> {
        fn get(&self, agent_id: &str) -> Result<TrustProfile, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get(agent_id)
        }
        fn compare_and_swap(&mut self, agent_id: &str, expected_version: u64, new_profile: TrustProfile) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").compare_and_swap(agent_id, expected_version, new_profile)
        }
        fn put(&mut self, profile: TrustProfile) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").put(profile)
        }
    }

    impl<R: PolicyBundleRepo> PolicyBundleRepo for Arc<Mutex<R>> {
        fn get(&self, bundle_id: &str) -> Result<PolicyBundle, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").get(bundle_id)
        }
        fn put(&mut self, bundle: PolicyBundle) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").put(bundle)
        }
        fn list_enabled(&self) -> Result<Vec<PolicyBundle>, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").list_enabled()
        }
    }

    impl<R: EventStore> EventStore for Arc<Mutex<R>> {
        fn append(&mut self, correlation_id: &str, event_id: &str, record: Vec<u8>) -> Result<(), StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").append(correlation_id, event_id, record)
        }
        fn stream(&self, correlation_id: &str) -> Result<Vec<Vec<u8>>, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").stream(correlation_id)
        }
        fn tail(&self, correlation_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.lock().expect("warden-governance-core: poisoned repository lock").tail(correlation_id)
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory implementations
// ---------------------------------------------------------------------------

/// A volatile, heap-allocated [`AgentRepo`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryAgentRepo {
    data: HashMap<String, Agent>,
}

impl InMemoryAgentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AgentRepo for InMemoryAgentRepo {
    fn get(&self, agent_id: &str) -> Result<Agent, StoreError> {
        self.data.get(agent_id).cloned().ok_or_else(|| StoreError::NotFound(agent_id.to_string()))
    }

    fn put(&mut self, agent: Agent) -> Result<(), StoreError> {
        self.data.insert(agent.id.clone(), agent);
        Ok(())
    }
}

/// A volatile, heap-allocated [`IntentRepo`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryIntentRepo {
    data: HashMap<String, Intent>,
}

impl InMemoryIntentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IntentRepo for InMemoryIntentRepo {
    fn get(&self, intent_id: &str) -> Result<Intent, StoreError> {
        self.data.get(intent_id).cloned().ok_or_else(|| StoreError::NotFound(intent_id.to_string()))
    }

    fn put(&mut self, intent: Intent) -> Result<(), StoreError> {
        self.data.insert(intent.intent_id.clone(), intent);
        Ok(())
    }

    fn exists(&self, intent_id: &str) -> Result<bool, StoreError> {
        Ok(self.data.contains_key(intent_id))
    }
}

/// A volatile, heap-allocated [`DecisionRepo`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryDecisionRepo {
    by_id: HashMap<String, Decision>,
    by_intent: HashMap<String, String>,
}

impl InMemoryDecisionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecisionRepo for InMemoryDecisionRepo {
    fn get(&self, decision_id: &str) -> Result<Decision, StoreError> {
        self.by_id.get(decision_id).cloned().ok_or_else(|| StoreError::NotFound(decision_id.to_string()))
    }

    fn get_by_intent(&self, intent_id: &str) -> Result<Option<Decision>, StoreError> {
        let Some(decision_id) = self.by_intent.get(intent_id) else {
            return Ok(None);
        };
        self.by_id.get(decision_id).cloned().map(Some).ok_or_else(|| StoreError::NotFound(decision_id.clone()))
    }

    fn put(&mut self, decision: Decision) -> Result<(), StoreError> {
        self.by_intent.insert(decision.intent_id.clone(), decision.decision_id.clone());
        self.by_id.insert(decision.decision_id.clone(), decision);
        Ok(())
    }
}

/// A volatile, heap-allocated [`TrustProfileRepo`] enforcing optimistic
/// concurrency via each profile's `version` field.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTrustProfileRepo {
    data: HashMap<String, TrustProfile>,
}

impl InMemoryTrustProfileRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustProfileRepo for InMemoryTrustProfileRepo {
    fn get(&self, agent_id: &str) -> Result<TrustProfile, StoreError> {
        self.data.get(agent_id).cloned().ok_or_else(|| StoreError::NotFound(agent_id.to_string()))
    }

    fn compare_and_swap(
        &mut self,
        agent_id: &str,
        expected_version: u64,
        new_profile: TrustProfile,
    ) -> Result<(), StoreError> {
        let current = self.data.get(agent_id).ok_or_else(|| StoreError::NotFound(agent_id.to_string()))?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: agent_id.to_string(),
                expected: expected_version,
                actual: current.version,
            });
        }
        self.data.insert(agent_id.to_string(), new_profile);
        Ok(())
    }

    fn put(&mut self, profile: TrustProfile) -> Result<(), StoreError> {
        self.data.insert(profile.agent_id.clone(), profile);
        Ok(())
    }
}

/// A volatile, heap-allocated [`PolicyBundleRepo`].
#[derive(Debug, Default, Clone)]
pub struct InMemoryPolicyBundleRepo {
    data: HashMap<String, PolicyBundle>,
}

impl InMemoryPolicyBundleRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyBundleRepo for InMemoryPolicyBundleRepo {
    fn get(&self, bundle_id: &str) -> Result<PolicyBundle, StoreError> {
        self.data.get(bundle_id).cloned().ok_or_else(|| StoreError::NotFound(bundle_id.to_string()))
    }

    fn put(&mut self, bundle: PolicyBundle) -> Result<(), StoreError> {
        self.data.insert(bundle.bundle_id.clone(), bundle);
        Ok(())
    }

    fn list_enabled(&self) -> Result<Vec<PolicyBundle>, StoreError> {
        Ok(self.data.values().filter(|b| b.enabled).cloned().collect())
    }
}

/// A volatile, heap-allocated [`EventStore`] keyed by correlation id, with
/// conflict detection on the in-memory tip pointer.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    chains: HashMap<String, Vec<(String, Vec<u8>)>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for InMemoryEventStore {
    fn append(&mut self, correlation_id: &str, event_id: &str, record: Vec<u8>) -> Result<(), StoreError> {
        let chain = self.chains.entry(correlation_id.to_string()).or_default();
        if chain.iter().any(|(id, _)| id == event_id) {
            return Err(StoreError::ChainConflict { correlation_id: correlation_id.to_string() });
        }
        chain.push((event_id.to_string(), record));
        Ok(())
    }

    fn stream(&self, correlation_id: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.chains.get(correlation_id).map(|chain| chain.iter().map(|(_, r)| r.clone()).collect()).unwrap_or_default())
    }

    fn tail(&self, correlation_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.chains.get(correlation_id).and_then(|chain| chain.last()).map(|(_, r)| r.clone()))
    }
}
