// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Proof-chain event log.
//!
//! [`ProofChain`] appends tamper-evident [`ProofEvent`] records to an
//! [`EventStore`], one hash chain per correlation id. Every event's hash
//! covers its own payload and the previous event's hash, so altering any
//! field anywhere in a correlation's history is detectable by
//! [`ProofChain::verify`].
//!
//! Unlike the single global chain the storage layer used to model, each
//! `correlation_id` gets its own independent chain — concurrent intents on
//! unrelated agents never contend for the same tip, and
//! [`StoreError::ChainConflict`] only fires when two writers race to extend
//! the *same* correlation's history. This module does not retry on
//! conflict; the caller (the decision orchestrator) owns the retry loop and
//! the backoff delay, since only it knows whether the retry can actually
//! sleep (native) or must yield control (async).

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{EngineError, StoreError};
use crate::storage::EventStore;
use crate::types::{Hash32, Id, ProofEventType, Timestamp};

/// Genesis hash for the first event in any correlation's chain.
pub const GENESIS_HASH: Hash32 = [0u8; 32];

/// A single tamper-evident proof event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofEvent {
    pub event_id: Id,
    pub correlation_id: Id,
    /// The agent the event is attributed to, when one applies. `None` for
    /// events the orchestrator itself emits without a specific agent in
    /// scope (e.g. a tenant-level policy change).
    pub agent_id: Option<Id>,
    pub event_type: ProofEventType,
    /// Structured payload specific to `event_type` — a serialized
    /// [`crate::types::Decision`], [`crate::types::TrustDelta`], etc.
    pub payload: serde_json::Value,
    pub prev_hash: Hash32,
    pub hash: Hash32,
    /// When the underlying thing (the decision, the outcome report) actually
    /// happened. Distinct from `recorded_at`: a synchronous caller sets them
    /// equal, but a replayed or imported event can set `occurred_at` in the
    /// past relative to when it finally lands in the chain.
    pub occurred_at: Timestamp,
    pub recorded_at: Timestamp,
    /// Identity that signed this event, when [`crate::config::AuditConfig::require_signing`]
    /// is enabled. Signing itself is the embedding application's
    /// responsibility — this crate only carries and enforces presence of
    /// the two fields.
    pub signed_by: Option<String>,
    /// Signature over `hash`, not over the fields that produced it — so a
    /// signer can verify first and sign a fixed-size digest rather than the
    /// whole payload.
    pub signature: Option<String>,
}

#[allow(clippy::too_many_arguments)]
fn compute_hash(
    prev_hash: &Hash32,
    correlation_id: &str,
    event_id: &str,
    agent_id: Option<&str>,
    event_type: ProofEventType,
    payload: &serde_json::Value,
    occurred_at: Timestamp,
    recorded_at: Timestamp,
    signed_by: Option<&str>,
) -> Hash32 {
    let mut hasher = Sha256::new();
    hasher.update(prev_hash);
    hasher.update(correlation_id.as_bytes());
    hasher.update(event_id.as_bytes());
    hasher.update(agent_id.unwrap_or("").as_bytes());
    hasher.update(alloc::format!("{event_type:?}").as_bytes());
    hasher.update(payload.to_string().as_bytes());
    hasher.update(occurred_at.as_millis().to_be_bytes());
    hasher.update(recorded_at.as_millis().to_be_bytes());
    hasher.update(signed_by.unwrap_or("").as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Hex-encode a digest for display and for use in reasoning strings and ids.
pub fn hash_to_hex(hash: &Hash32) -> String {
    hex::encode(hash)
}

/// Appends proof events to an [`EventStore`] and verifies existing chains.
pub struct ProofChain<S: EventStore> {
    store: S,
    require_signing: bool,
}

impl<S: EventStore> ProofChain<S> {
    pub fn new(store: S) -> Self {
        Self { store, require_signing: false }
    }

    /// Build a chain that enforces [`crate::config::AuditConfig::require_signing`]:
    /// every `append` must carry both `signed_by` and `signature`, and
    /// `verify` rejects any existing event missing either.
    pub fn with_signing_required(store: S, require_signing: bool) -> Self {
        Self { store, require_signing }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Append one event to `correlation_id`'s chain. A single attempt — on
    /// [`StoreError::ChainConflict`] the caller re-reads the fresh tip
    /// (picked up automatically on the next call) and retries with a
    /// jittered backoff of its own choosing.
    #[allow(clippy::too_many_arguments)]
    pub fn append(
        &mut self,
        correlation_id: &str,
        event_id: Id,
        event_type: ProofEventType,
        payload: serde_json::Value,
        agent_id: Option<Id>,
        occurred_at: Timestamp,
        now: Timestamp,
        signed_by: Option<String>,
        signature: Option<String>,
    ) -> Result<ProofEvent, EngineError> {
        if self.require_signing && (signed_by.is_none() || signature.is_none()) {
            return Err(EngineError::Unsigned(event_id));
        }

        let prev_hash = match self.store.tail(correlation_id).map_err(EngineError::from)? {
            Some(bytes) => {
                let prev: ProofEvent = serde_json::from_slice(&bytes)
                    .map_err(|_| EngineError::Internal("corrupt proof event in chain tail".into()))?;
                prev.hash
            }
            None => GENESIS_HASH,
        };

        let hash = compute_hash(
            &prev_hash,
            correlation_id,
            &event_id,
            agent_id.as_deref(),
            event_type,
            &payload,
            occurred_at,
            now,
            signed_by.as_deref(),
        );
        let event = ProofEvent {
            event_id: event_id.clone(),
            correlation_id: correlation_id.into(),
            agent_id,
            event_type,
            payload,
            prev_hash,
            hash,
            occurred_at,
            recorded_at: now,
            signed_by,
            signature,
        };

        let bytes = serde_json::to_vec(&event).map_err(|_| EngineError::Internal("failed to serialize proof event".into()))?;
        self.store.append(correlation_id, &event_id, bytes).map_err(EngineError::from)?;
        Ok(event)
    }

    /// All events for `correlation_id`, oldest first.
    pub fn stream(&self, correlation_id: &str) -> Result<Vec<ProofEvent>, EngineError> {
        let raw = self.store.stream(correlation_id).map_err(EngineError::from)?;
        raw.iter()
            .map(|bytes| serde_json::from_slice(bytes).map_err(|_| EngineError::Internal("corrupt proof event".into())))
            .collect()
    }

    /// Re-derive every hash in `correlation_id`'s chain and confirm it
    /// matches the stored value and links correctly to its predecessor.
    pub fn verify(&self, correlation_id: &str) -> Result<crate::types::ChainVerificationResult, EngineError> {
        let events = self.stream(correlation_id)?;
        let mut expected_prev = GENESIS_HASH;
        for event in &events {
            if event.prev_hash != expected_prev {
                return Ok(crate::types::ChainVerificationResult {
                    valid: false,
                    verified_events: 0,
                    broken_at: Some(event.event_id.clone()),
                });
            }
            if self.require_signing && (event.signed_by.is_none() || event.signature.is_none()) {
                return Ok(crate::types::ChainVerificationResult {
                    valid: false,
                    verified_events: 0,
                    broken_at: Some(event.event_id.clone()),
                });
            }
            let recomputed = compute_hash(
                &event.prev_hash,
                &event.correlation_id,
                &event.event_id,
                event.agent_id.as_deref(),
                event.event_type,
                &event.payload,
                event.occurred_at,
                event.recorded_at,
                event.signed_by.as_deref(),
            );
            if recomputed != event.hash {
                return Ok(crate::types::ChainVerificationResult {
                    valid: false,
                    verified_events: 0,
                    broken_at: Some(event.event_id.clone()),
                });
            }
            expected_prev = event.hash;
        }
        Ok(crate::types::ChainVerificationResult { valid: true, verified_events: events.len() as u64, broken_at: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryEventStore;
    use alloc::string::ToString;
    use serde_json::json;

    /// Appends an unsigned, unattributed event with `occurred_at == now`,
    /// the common case for this engine's own synchronous bookkeeping.
    fn append<S: EventStore>(chain: &mut ProofChain<S>, correlation_id: &str, event_id: &str, event_type: ProofEventType, payload: serde_json::Value, at: Timestamp) -> Result<ProofEvent, EngineError> {
        chain.append(correlation_id, event_id.to_string(), event_type, payload, None, at, at, None, None)
    }

    #[test]
    fn genesis_event_chains_to_zero_hash() {
        let mut chain = ProofChain::new(InMemoryEventStore::new());
        let event = append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({"x": 1}), Timestamp::from_millis(0)).unwrap();
        assert_eq!(event.prev_hash, GENESIS_HASH);
    }

    #[test]
    fn second_event_chains_to_first_hash() {
        let mut chain = ProofChain::new(InMemoryEventStore::new());
        let first = append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({"x": 1}), Timestamp::from_millis(0)).unwrap();
        let second = append(&mut chain, "corr-1", "evt-2", ProofEventType::DecisionMade, json!({"x": 2}), Timestamp::from_millis(10)).unwrap();
        assert_eq!(second.prev_hash, first.hash);
    }

    #[test]
    fn verify_confirms_an_untampered_chain() {
        let mut chain = ProofChain::new(InMemoryEventStore::new());
        append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({"x": 1}), Timestamp::from_millis(0)).unwrap();
        append(&mut chain, "corr-1", "evt-2", ProofEventType::DecisionMade, json!({"x": 2}), Timestamp::from_millis(10)).unwrap();
        let result = chain.verify("corr-1").unwrap();
        assert!(result.valid);
        assert_eq!(result.verified_events, 2);
        assert!(result.broken_at.is_none());
    }

    #[test]
    fn verify_detects_a_tampered_payload() {
        let mut chain = ProofChain::new(InMemoryEventStore::new());
        append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({"x": 1}), Timestamp::from_millis(0)).unwrap();

        // Tamper directly with the underlying store, bypassing the chain API.
        let tampered = ProofEvent {
            event_id: "evt-1".to_string(),
            correlation_id: "corr-1".to_string(),
            agent_id: None,
            event_type: ProofEventType::IntentReceived,
            payload: json!({"x": 999}),
            prev_hash: GENESIS_HASH,
            hash: chain.stream("corr-1").unwrap()[0].hash,
            occurred_at: Timestamp::from_millis(0),
            recorded_at: Timestamp::from_millis(0),
            signed_by: None,
            signature: None,
        };
        let mut store = InMemoryEventStore::new();
        store.append("corr-1", "evt-1", serde_json::to_vec(&tampered).unwrap()).unwrap();
        let retampered_chain = ProofChain::new(store);

        let result = retampered_chain.verify("corr-1").unwrap();
        assert!(!result.valid);
        assert_eq!(result.broken_at, Some("evt-1".to_string()));
    }

    #[test]
    fn duplicate_event_id_surfaces_chain_conflict() {
        let mut chain = ProofChain::new(InMemoryEventStore::new());
        append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({}), Timestamp::from_millis(0)).unwrap();
        let err = append(&mut chain, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({}), Timestamp::from_millis(1));
        assert!(matches!(err, Err(EngineError::Store(StoreError::ChainConflict { .. }))));
    }

    #[test]
    fn require_signing_rejects_an_unsigned_append() {
        let mut chain = ProofChain::with_signing_required(InMemoryEventStore::new(), true);
        let err = chain.append("corr-1", "evt-1".to_string(), ProofEventType::IntentReceived, json!({}), None, Timestamp::from_millis(0), Timestamp::from_millis(0), None, None);
        assert!(matches!(err, Err(EngineError::Unsigned(id)) if id == "evt-1"));
    }

    #[test]
    fn require_signing_accepts_a_signed_append_and_verifies_it() {
        let mut chain = ProofChain::with_signing_required(InMemoryEventStore::new(), true);
        chain
            .append(
                "corr-1",
                "evt-1".to_string(),
                ProofEventType::IntentReceived,
                json!({}),
                Some("agent-1".to_string()),
                Timestamp::from_millis(0),
                Timestamp::from_millis(0),
                Some("approver-1".to_string()),
                Some("deadbeef".to_string()),
            )
            .unwrap();
        let result = chain.verify("corr-1").unwrap();
        assert!(result.valid);
    }

    #[test]
    fn require_signing_flags_a_chain_with_an_unsigned_event_on_verify() {
        // Written while unsigned was still allowed, verified after the tenant
        // turned signing enforcement on.
        let mut lenient = ProofChain::new(InMemoryEventStore::new());
        append(&mut lenient, "corr-1", "evt-1", ProofEventType::IntentReceived, json!({}), Timestamp::from_millis(0)).unwrap();
        let store = core::mem::replace(lenient.store_mut(), InMemoryEventStore::new());
        let strict = ProofChain::with_signing_required(store, true);

        let result = strict.verify("corr-1").unwrap();
        assert!(!result.valid);
        assert_eq!(result.broken_at, Some("evt-1".to_string()));
    }
}
