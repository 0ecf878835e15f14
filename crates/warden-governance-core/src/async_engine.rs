// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Async decision orchestrator backed by Tokio.
//!
//! This module is only compiled when the `async` feature flag is enabled:
//!
//! ```toml
//! [dependencies]
//! warden-governance-core = { version = "0.1", features = ["async"] }
//! ```
//!
//! # Design
//!
//! [`AsyncGovernanceEngine`] wraps the whole sync [`GovernanceEngine`] in a
//! single [`tokio::sync::RwLock`] rather than locking each sub-component
//! individually — every `authorize()` call already has to touch the trust
//! profile, the policy bundles, and the proof chain together, so splitting
//! the lock would only add contention without adding concurrency. Read-only
//! queries (`verify_chain`) take a shared read lock; every mutating call
//! takes the exclusive write lock.
//!
//! [`GovernanceEngine`] borrows `Config` for its lifetime, and a value
//! guarded by `tokio::sync::RwLock` inside an `Arc` must be usable from
//! spawned tasks, which requires `'static`. Construct this type with a
//! `&'static Config` — obtained once at startup, e.g. by leaking a `Box` or
//! storing the config in a `std::sync::OnceLock` — rather than a
//! stack-local one.
//!
//! Because the whole engine sits behind one exclusive lock, only one
//! in-process caller can ever be appending to a correlation's proof chain
//! at a time, so `StoreError::ChainConflict` cannot arise from in-process
//! contention here — the sync engine's retry loop is exercised only by an
//! [`crate::storage::EventStore`] shared across *multiple* engine
//! instances or processes, where the backing store itself is the point of
//! serialization.

#![cfg(feature = "async")]

use alloc::vec::Vec;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::{Clock, Random};
use crate::config::Config;
use crate::engine::GovernanceEngine;
use crate::error::EngineError;
use crate::storage::{AgentRepo, DecisionRepo, EventStore, IntentRepo, PolicyBundleRepo, TrustProfileRepo};
use crate::types::{
    ChainVerificationResult, Decision, DimensionKey, ExecutionOutcome, Intent, RiskProfile,
    Timestamp, TrustDelta, TrustReinstatement,
};

/// Tokio-friendly wrapper around [`GovernanceEngine`].
pub struct AsyncGovernanceEngine<A, I, D, T, P, E>
where
    A: AgentRepo + 'static,
    I: IntentRepo + 'static,
    D: DecisionRepo + 'static,
    T: TrustProfileRepo + 'static,
    P: PolicyBundleRepo + 'static,
    E: EventStore + 'static,
{
    inner: Arc<RwLock<GovernanceEngine<'static, A, I, D, T, P, E>>>,
}

impl<A, I, D, T, P, E> Clone for AsyncGovernanceEngine<A, I, D, T, P, E>
where
    A: AgentRepo + 'static,
    I: IntentRepo + 'static,
    D: DecisionRepo + 'static,
    T: TrustProfileRepo + 'static,
    P: PolicyBundleRepo + 'static,
    E: EventStore + 'static,
{
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<A, I, D, T, P, E> AsyncGovernanceEngine<A, I, D, T, P, E>
where
    A: AgentRepo + 'static,
    I: IntentRepo + 'static,
    D: DecisionRepo + 'static,
    T: TrustProfileRepo + 'static,
    P: PolicyBundleRepo + 'static,
    E: EventStore + 'static,
{
    pub fn new(config: &'static Config, agents: A, intents: I, decisions: D, trust_repo: T, policies: P, events: E) -> Self {
        Self { inner: Arc::new(RwLock::new(GovernanceEngine::new(config, agents, intents, decisions, trust_repo, policies, events))) }
    }

    /// Evaluate an intent. Acquires the exclusive lock for the duration of
    /// the evaluation — see [`GovernanceEngine::authorize`].
    pub async fn authorize(
        &self,
        intent: Intent,
        deadline: Option<Timestamp>,
        clock: &dyn Clock,
        random: &dyn Random,
    ) -> Result<Decision, EngineError> {
        let mut engine = self.inner.write().await;
        engine.authorize(intent, deadline, clock, random)
    }

    pub async fn report_outcome(
        &self,
        intent_id: &str,
        dimension: DimensionKey,
        base_impact: f64,
        risk_profile: RiskProfile,
        outcome: ExecutionOutcome,
        clock: &dyn Clock,
        random: &dyn Random,
    ) -> Result<TrustDelta, EngineError> {
        let mut engine = self.inner.write().await;
        engine.report_outcome(intent_id, dimension, base_impact, risk_profile, outcome, clock, random)
    }

    pub async fn reinstate(&self, reinstatement: TrustReinstatement, clock: &dyn Clock) -> Result<TrustDelta, EngineError> {
        let mut engine = self.inner.write().await;
        engine.reinstate(reinstatement, clock)
    }

    /// Verify a correlation's proof chain. Takes only a shared read lock —
    /// verification never mutates engine state.
    pub async fn verify_chain(&self, correlation_id: &str) -> Result<ChainVerificationResult, EngineError> {
        let engine = self.inner.read().await;
        engine.verify_chain(correlation_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{DeterministicRandom, FixedClock};
    use crate::storage::{InMemoryAgentRepo, InMemoryDecisionRepo, InMemoryEventStore, InMemoryIntentRepo, InMemoryPolicyBundleRepo, InMemoryTrustProfileRepo};
    use crate::types::{
        ActionType, DataSensitivity, Dimensions, IntentStatus, ObservationTier, OscillationWindow,
        Reversibility, Timestamp, TrustBand, TrustProfile, Weights,
    };
    use alloc::string::{String, ToString};
    use std::sync::OnceLock;

    static TEST_CONFIG: OnceLock<Config> = OnceLock::new();

    fn test_config() -> &'static Config {
        TEST_CONFIG.get_or_init(Config::default)
    }

    fn build_engine() -> AsyncGovernanceEngine<InMemoryAgentRepo, InMemoryIntentRepo, InMemoryDecisionRepo, InMemoryTrustProfileRepo, InMemoryPolicyBundleRepo, InMemoryEventStore> {
        AsyncGovernanceEngine::new(
            test_config(),
            InMemoryAgentRepo::new(),
            InMemoryIntentRepo::new(),
            InMemoryDecisionRepo::new(),
            InMemoryTrustProfileRepo::new(),
            InMemoryPolicyBundleRepo::new(),
            InMemoryEventStore::new(),
        )
    }

    fn fresh_profile(agent_id: &str) -> TrustProfile {
        TrustProfile {
            profile_id: alloc::format!("profile-{agent_id}"),
            agent_id: agent_id.to_string(),
            version: 1,
            dimensions: Dimensions::uniform(80.0),
            weights: Weights::EQUAL,
            composite_score: 800.0,
            observation_tier: ObservationTier::WhiteBox,
            adjusted_score: 800.0,
            band: TrustBand::T4,
            calculated_at: Timestamp::from_millis(0),
            valid_until: None,
            cooldown_until: None,
            last_drop_at: None,
            last_demotion_at: None,
            oscillation_window: OscillationWindow::default(),
            pending_gains: Vec::new(),
            evidence: Vec::new(),
            circuit_broken: false,
        }
    }

    fn sample_intent() -> Intent {
        Intent {
            intent_id: "intent-async-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            agent_id: "ghost".to_string(),
            correlation_id: "corr-async-1".to_string(),
            action: "read_report".to_string(),
            action_type: ActionType::Read,
            resource_scope: Vec::new(),
            data_sensitivity: DataSensitivity::Internal,
            reversibility: Reversibility::Reversible,
            domain: "finance".to_string(),
            environment: "production".to_string(),
            jurisdictions: Vec::new(),
            magnitude: Some(5.0),
            context: String::new(),
            trust_snapshot: fresh_profile("ghost"),
            status: IntentStatus::Pending,
            created_at: Timestamp::from_millis(0),
            updated_at: Timestamp::from_millis(0),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn authorize_converts_unknown_agent_into_a_terminal_system_error_decision() {
        let engine = build_engine();
        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let decision = engine.authorize(sample_intent(), None, &clock, &rng).await.unwrap();
        assert!(!decision.permitted);
        assert_eq!(decision.denial_reason, Some(crate::types::DenialReason::SystemError));
    }

    #[tokio::test]
    async fn verify_chain_on_an_untouched_correlation_is_trivially_valid() {
        let engine = build_engine();
        let result = engine.verify_chain("corr-never-used").await.unwrap();
        assert!(result.valid);
        assert_eq!(result.verified_events, 0);
    }

    #[tokio::test]
    async fn concurrent_authorize_calls_serialize_through_the_write_lock() {
        let engine = build_engine();
        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);

        let first = engine.clone();
        let second = engine.clone();
        let (r1, r2) = tokio::join!(
            first.authorize(sample_intent(), None, &clock, &rng),
            second.authorize(sample_intent(), None, &clock, &rng),
        );
        let d1 = r1.unwrap();
        let d2 = r2.unwrap();
        assert!(!d1.permitted);
        assert!(!d2.permitted);
    }
}
