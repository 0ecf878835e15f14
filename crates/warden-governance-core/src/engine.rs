// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Decision orchestrator — the top-level composition of every governance
//! sub-system.
//!
//! [`GovernanceEngine`] owns the six repositories plus the trust manager,
//! policy engine, pre-action gate, and proof chain, and exposes a single
//! [`authorize`](GovernanceEngine::authorize) entry point that walks an
//! intent through all of them in a fixed, non-configurable order:
//!
//! 1. **Idempotency** — an intent id already recorded returns its existing
//!    decision rather than re-evaluating.
//! 2. **Agent & expiry** — the agent must exist and the intent must not
//!    have passed `expires_at`.
//! 3. **Trust snapshot** — read the agent's current trust profile (lazy
//!    decay and pending-gain resolution happen here). A circuit-broken
//!    profile short-circuits straight to denial.
//! 4. **Pre-action gate** — weighted risk scoring against the trust score.
//!    A trust deficit or an escalation to verification/human approval is
//!    decided here, before any policy bundle is even resolved, so a bundle
//!    that would otherwise permit can never paper over a gate rejection.
//! 5. **Policy resolution** — narrow the enabled bundles to those
//!    applicable to the intent's domain/environment/jurisdiction, then
//!    evaluate them; any bundle voting deny denies the intent. Only reached
//!    when the gate itself did not already reject or escalate.
//! 6. **Persistence** — the intent and decision are always written,
//!    regardless of outcome.
//! 7. **Proof events** — `IntentReceived` and `DecisionMade` are always
//!    appended to the intent's correlation chain.
//!
//! `authorize` takes an optional deadline alongside the clock. Every repo
//! call checks it before making progress; once it has passed, the call
//! stops issuing further repo work and returns a terminal `Decision` with
//! `denialReason = SystemError` rather than continuing the pipeline.
//! Likewise, a structural [`EngineError`] surfacing from a repo (missing
//! agent, store unavailable, chain corruption) is caught and converted into
//! that same terminal `SystemError` decision rather than propagated as
//! `Err` — no intent is ever left without a recorded decision because the
//! store hiccuped. An `Err` only ever escapes `authorize` when persisting
//! *that* terminal decision itself fails, since at that point there is
//! nothing left to convert the error into.

use alloc::format;
use alloc::string::ToString;
use alloc::vec::Vec;
use serde_json::json;

use crate::audit::ProofChain;
use crate::clock::{Clock, Random};
use crate::config::Config;
use crate::error::EngineError;
use crate::gate::PreActionGate;
use crate::policy::{PolicyEngine, ResolutionKey};
use crate::storage::{AgentRepo, DecisionRepo, EventStore, IntentRepo, PolicyBundleRepo, TrustProfileRepo};
use crate::trust::TrustManager;
use crate::types::{
    Decision, DenialReason, DimensionKey, Effect, ExecutionOutcome, ExecutionStatus, GateStatus,
    Id, Intent, IntentStatus, ProofEventType, RiskProfile, Timestamp, TrustDelta, TrustReinstatement,
};

/// Default validity window for a decision when no constraint overrides it:
/// 10 minutes. Distinct from [`crate::config::GateConfig::verification_validity_ms`]
/// (5 minutes), which only bounds a pending gate verification result, not
/// the decision itself.
const DEFAULT_MAX_EXECUTION_TIME_MS: u64 = 600_000;

fn default_max_execution_time_ms(override_ms: Option<u64>) -> u64 {
    override_ms.unwrap_or(DEFAULT_MAX_EXECUTION_TIME_MS)
}

/// Composes every governance sub-system behind one [`authorize`](Self::authorize)
/// call. Generic over all six repository traits so a deployment can mix
/// in-memory and durable backends per concern.
pub struct GovernanceEngine<'a, A, I, D, T, P, E>
where
    A: AgentRepo,
    I: IntentRepo,
    D: DecisionRepo,
    T: TrustProfileRepo,
    P: PolicyBundleRepo,
    E: EventStore,
{
    config: &'a Config,
    agents: A,
    intents: I,
    decisions: D,
    trust: TrustManager<'a, T>,
    policies: P,
    policy_engine: PolicyEngine,
    gate: PreActionGate<'a>,
    proof_chain: ProofChain<E>,
}

impl<'a, A, I, D, T, P, E> GovernanceEngine<'a, A, I, D, T, P, E>
where
    A: AgentRepo,
    I: IntentRepo,
    D: DecisionRepo,
    T: TrustProfileRepo,
    P: PolicyBundleRepo,
    E: EventStore,
{
    pub fn new(config: &'a Config, agents: A, intents: I, decisions: D, trust_repo: T, policies: P, events: E) -> Self {
        Self {
            config,
            agents,
            intents,
            decisions,
            trust: TrustManager::new(config, trust_repo),
            policies,
            policy_engine: PolicyEngine::new(config.policy.default_effect),
            gate: PreActionGate::new(&config.gate),
            proof_chain: ProofChain::with_signing_required(events, config.audit.require_signing),
        }
    }

    pub fn trust(&mut self) -> &mut TrustManager<'a, T> {
        &mut self.trust
    }

    pub fn proof_chain(&self) -> &ProofChain<E> {
        &self.proof_chain
    }

    /// Direct access to the agent repository, e.g. for registering a new
    /// agent at onboarding time. `authorize` only ever reads from it.
    pub fn agents_mut(&mut self) -> &mut A {
        &mut self.agents
    }

    /// Direct access to the policy bundle repository, e.g. for publishing
    /// a new bundle version.
    pub fn policies_mut(&mut self) -> &mut P {
        &mut self.policies
    }

    /// Evaluate `intent` and persist the resulting decision. `clock` supplies
    /// the single `now` used for every business timestamp in the call;
    /// `random` seeds jittered backoff on a proof-chain append conflict.
    /// `deadline`, when set, bounds how long the call may keep issuing repo
    /// work — once `clock.now()` passes it, the pipeline stops and a
    /// terminal `SystemError` decision is returned instead of continuing.
    pub fn authorize(
        &mut self,
        mut intent: Intent,
        deadline: Option<Timestamp>,
        clock: &dyn Clock,
        random: &dyn Random,
    ) -> Result<Decision, EngineError> {
        let call_started = clock.now();

        macro_rules! checkpoint {
            () => {
                if Self::past_deadline(deadline, clock.now()) {
                    return self.finalize_denial(
                        intent,
                        DenialReason::SystemError,
                        "deadline exceeded before evaluation completed".to_string(),
                        Vec::new(),
                        call_started,
                        clock,
                        random,
                    );
                }
            };
        }

        macro_rules! store_op {
            ($result:expr, $context:expr) => {
                match $result {
                    Ok(v) => v,
                    Err(e) => {
                        return self.finalize_denial(
                            intent,
                            DenialReason::SystemError,
                            format!("{}: {e}", $context),
                            Vec::new(),
                            call_started,
                            clock,
                            random,
                        );
                    }
                }
            };
        }

        checkpoint!();
        let already_exists = store_op!(self.intents.exists(&intent.intent_id), "checking intent idempotency");
        if already_exists {
            let existing = store_op!(self.decisions.get_by_intent(&intent.intent_id), "loading cached decision");
            if let Some(existing) = existing {
                return Ok(existing);
            }
        }

        checkpoint!();
        store_op!(self.agents.get(&intent.agent_id), "loading agent");

        checkpoint!();
        store_op!(
            self.append_with_retry(
                &intent.correlation_id,
                format!("{}-received", intent.intent_id),
                ProofEventType::IntentReceived,
                json!({ "intent_id": intent.intent_id, "action": intent.action }),
                Some(intent.agent_id.clone()),
                call_started,
                random,
            ),
            "appending intent-received proof event"
        );

        if let Some(expires_at) = intent.expires_at {
            if call_started.as_millis() > expires_at.as_millis() {
                return self.finalize_denial(intent, DenialReason::ExpiredIntent, "intent expired before evaluation".to_string(), Vec::new(), call_started, clock, random);
            }
        }

        checkpoint!();
        let profile = store_op!(self.trust.snapshot(&intent.agent_id, call_started), "reading trust snapshot");
        if profile.circuit_broken {
            return self.finalize_denial(
                intent,
                DenialReason::InsufficientTrust,
                "agent trust profile is circuit broken pending reinstatement".to_string(),
                alloc::vec!["obtain a signed TrustReinstatement from an authorized approver".to_string()],
                call_started,
                clock,
                random,
            );
        }
        intent.trust_snapshot = profile.clone();

        checkpoint!();
        let verification_id = format!("verif-{}-{}", intent.intent_id, call_started.as_millis());
        let gate_result = self.gate.evaluate(&intent, profile.adjusted_score, verification_id, clock);

        let (gate_permitted, status, denial_reason, remediations) = match gate_result.status {
            GateStatus::Approved => (true, IntentStatus::Approved, None, Vec::new()),
            GateStatus::Rejected => (
                false,
                IntentStatus::Denied,
                Some(DenialReason::InsufficientTrust),
                alloc::vec![format!("raise trust by {:.2} points before retrying", gate_result.trust_deficit)],
            ),
            GateStatus::PendingVerification => (
                false,
                IntentStatus::Escalated,
                None,
                gate_result.requirements.clone().unwrap_or_default(),
            ),
            GateStatus::PendingHumanApproval => (
                false,
                IntentStatus::Escalated,
                None,
                gate_result.requirements.clone().unwrap_or_default(),
            ),
        };

        // A gate rejection or escalation is finalized here, before any
        // policy bundle is even resolved: the gate's trust-threshold check
        // is the defense against a "treacherous turn" and must never be
        // bypassed by a policy bundle that would otherwise permit.
        if !gate_permitted {
            let decided_at = call_started;
            let decision = Decision {
                decision_id: format!("decision-{}", intent.intent_id),
                intent_id: intent.intent_id.clone(),
                agent_id: intent.agent_id.clone(),
                correlation_id: intent.correlation_id.clone(),
                permitted: false,
                constraints: None,
                trust_band: profile.band,
                trust_score: profile.adjusted_score,
                policy_set_id: None,
                denial_reason,
                reasoning: gate_result.reasoning.clone(),
                remediations,
                decided_at,
                expires_at: decided_at.plus_millis(default_max_execution_time_ms(None)),
                latency_ms: clock.now().as_millis().saturating_sub(call_started.as_millis()),
                version: 1,
            };

            intent.status = status;
            intent.updated_at = call_started;
            checkpoint!();
            store_op!(self.intents.put(intent.clone()), "persisting intent");
            store_op!(self.decisions.put(decision.clone()), "persisting decision");
            store_op!(
                self.append_with_retry(
                    &intent.correlation_id,
                    format!("{}-decided", intent.intent_id),
                    ProofEventType::DecisionMade,
                    serde_json::to_value(&decision).unwrap_or(serde_json::Value::Null),
                    Some(intent.agent_id.clone()),
                    call_started,
                    random,
                ),
                "appending decision-made proof event"
            );
            if matches!(gate_result.status, GateStatus::PendingVerification | GateStatus::PendingHumanApproval) {
                store_op!(
                    self.append_with_retry(
                        &intent.correlation_id,
                        format!("{}-escalated", intent.intent_id),
                        ProofEventType::EscalationRequest,
                        json!({ "status": format!("{:?}", gate_result.status), "requirements": gate_result.requirements }),
                        Some(intent.agent_id.clone()),
                        call_started,
                        random,
                    ),
                    "appending escalation proof event"
                );
            }
            return Ok(decision);
        }

        checkpoint!();
        let bundles = store_op!(self.policies.list_enabled(), "listing policy bundles");
        let key = ResolutionKey {
            domain: &intent.domain,
            environment: &intent.environment,
            jurisdictions: &intent.jurisdictions,
            data_sensitivity: intent.data_sensitivity,
        };
        let resolved = self.policy_engine.resolve(&bundles, key);
        let verdict = self.policy_engine.evaluate(&intent, &resolved, profile.band);

        if verdict.effect == Effect::Deny {
            return self.finalize_denial(
                intent,
                verdict.denial_reason.unwrap_or(DenialReason::PolicyViolation),
                verdict.reasoning.join("; "),
                Vec::new(),
                call_started,
                clock,
                random,
            );
        }

        let permitted = true;
        let constraints = verdict.constraints.clone();
        let max_execution_time_ms = constraints.as_ref().and_then(|c| c.max_execution_time_ms);
        let decided_at = call_started;
        let decision = Decision {
            decision_id: format!("decision-{}", intent.intent_id),
            intent_id: intent.intent_id.clone(),
            agent_id: intent.agent_id.clone(),
            correlation_id: intent.correlation_id.clone(),
            permitted,
            constraints,
            trust_band: profile.band,
            trust_score: profile.adjusted_score,
            policy_set_id: verdict.matched_bundle_ids.first().cloned(),
            denial_reason: None,
            reasoning: {
                let mut r = gate_result.reasoning.clone();
                r.extend(verdict.reasoning.clone());
                r
            },
            remediations,
            decided_at,
            expires_at: decided_at.plus_millis(default_max_execution_time_ms(max_execution_time_ms)),
            latency_ms: clock.now().as_millis().saturating_sub(call_started.as_millis()),
            version: 1,
        };

        intent.status = status;
        intent.updated_at = call_started;
        checkpoint!();
        store_op!(self.intents.put(intent.clone()), "persisting intent");
        store_op!(self.decisions.put(decision.clone()), "persisting decision");

        store_op!(
            self.append_with_retry(
                &intent.correlation_id,
                format!("{}-decided", intent.intent_id),
                ProofEventType::DecisionMade,
                serde_json::to_value(&decision).unwrap_or(serde_json::Value::Null),
                Some(intent.agent_id.clone()),
                call_started,
                random,
            ),
            "appending decision-made proof event"
        );

        Ok(decision)
    }

    /// `true` once `clock`'s current time has passed `deadline`. A `None`
    /// deadline never expires.
    fn past_deadline(deadline: Option<Timestamp>, now: Timestamp) -> bool {
        deadline.is_some_and(|d| now.as_millis() > d.as_millis())
    }

    /// Translate a reported execution outcome into a trust delta, update the
    /// intent's terminal status, and append the corresponding proof event.
    pub fn report_outcome(
        &mut self,
        intent_id: &str,
        dimension: DimensionKey,
        base_impact: f64,
        risk_profile: RiskProfile,
        outcome: ExecutionOutcome,
        clock: &dyn Clock,
        random: &dyn Random,
    ) -> Result<TrustDelta, EngineError> {
        let now = clock.now();
        let mut intent = self.intents.get(intent_id)?;

        let delta = self.trust.commit_outcome(
            &intent.agent_id,
            dimension,
            outcome.status,
            base_impact,
            risk_profile,
            Some(intent.correlation_id.clone()),
            now,
        )?;

        intent.status = match outcome.status {
            ExecutionStatus::Success => IntentStatus::Completed,
            ExecutionStatus::Cancelled => IntentStatus::Cancelled,
            _ => IntentStatus::Failed,
        };
        intent.updated_at = now;
        self.intents.put(intent.clone())?;

        let event_type = match outcome.status {
            ExecutionStatus::Success => ProofEventType::ExecutionCompleted,
            _ => ProofEventType::ExecutionFailed,
        };
        self.append_with_retry(
            &intent.correlation_id,
            format!("{intent_id}-outcome"),
            event_type,
            json!({ "status": format!("{:?}", outcome.status), "duration_ms": outcome.duration_ms, "error": outcome.error }),
            Some(intent.agent_id.clone()),
            now,
            random,
        )?;

        Ok(delta)
    }

    pub fn reinstate(&mut self, reinstatement: TrustReinstatement, clock: &dyn Clock) -> Result<TrustDelta, EngineError> {
        self.trust.reinstate(reinstatement, clock.now())
    }

    pub fn verify_chain(&self, correlation_id: &str) -> Result<crate::types::ChainVerificationResult, EngineError> {
        self.proof_chain.verify(correlation_id)
    }

    fn finalize_denial(
        &mut self,
        mut intent: Intent,
        reason: DenialReason,
        explanation: alloc::string::String,
        remediations: Vec<alloc::string::String>,
        now: Timestamp,
        clock: &dyn Clock,
        random: &dyn Random,
    ) -> Result<Decision, EngineError> {
        let decision = Decision {
            decision_id: format!("decision-{}", intent.intent_id),
            intent_id: intent.intent_id.clone(),
            agent_id: intent.agent_id.clone(),
            correlation_id: intent.correlation_id.clone(),
            permitted: false,
            constraints: None,
            trust_band: intent.trust_snapshot.band,
            trust_score: intent.trust_snapshot.adjusted_score,
            policy_set_id: None,
            denial_reason: Some(reason),
            reasoning: alloc::vec![explanation],
            remediations,
            decided_at: now,
            expires_at: now.plus_millis(default_max_execution_time_ms(None)),
            latency_ms: clock.now().as_millis().saturating_sub(now.as_millis()),
            version: 1,
        };

        intent.status = IntentStatus::Denied;
        intent.updated_at = now;
        self.intents.put(intent.clone())?;
        self.decisions.put(decision.clone())?;

        self.append_with_retry(
            &intent.correlation_id,
            format!("{}-decided", intent.intent_id),
            ProofEventType::DecisionMade,
            serde_json::to_value(&decision).unwrap_or(serde_json::Value::Null),
            Some(intent.agent_id.clone()),
            now,
            random,
        )?;

        Ok(decision)
    }

    /// Append a proof event, retrying with full-jitter backoff when a
    /// concurrent writer raced for the same correlation id's chain tip.
    /// This engine never signs its own bookkeeping events — `signed_by`/
    /// `signature` are always `None` here — so a deployment that turns on
    /// [`crate::config::AuditConfig::require_signing`] must not route
    /// internally-generated events through this path without a signer of
    /// its own.
    #[allow(clippy::too_many_arguments)]
    fn append_with_retry(
        &mut self,
        correlation_id: &str,
        event_id: Id,
        event_type: ProofEventType,
        payload: serde_json::Value,
        agent_id: Option<Id>,
        occurred_at: Timestamp,
        random: &dyn Random,
    ) -> Result<(), EngineError> {
        const MAX_ATTEMPTS: u32 = 5;
        let mut attempt = 0;
        loop {
            match self.proof_chain.append(correlation_id, event_id.clone(), event_type, payload.clone(), agent_id.clone(), occurred_at, occurred_at, None, None) {
                Ok(_) => return Ok(()),
                Err(EngineError::Store(crate::error::StoreError::ChainConflict { .. })) if attempt < MAX_ATTEMPTS => {
                    // A synchronous engine has nowhere to actually sleep; the
                    // jittered delay is computed so a caller threading this
                    // through an async runtime can await it, and so the
                    // retry count itself still bounds worst-case work here.
                    let _backoff_ms = random.jittered_backoff_ms(attempt, 20, 2_000);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{DeterministicRandom, FixedClock};
    use crate::storage::{InMemoryAgentRepo, InMemoryDecisionRepo, InMemoryEventStore, InMemoryIntentRepo, InMemoryPolicyBundleRepo, InMemoryTrustProfileRepo};
    use crate::types::{
        Agent, ActionType, DataSensitivity, Dimensions, ObservationTier, OscillationWindow, Reversibility,
        TrustBand, TrustProfile, Weights,
    };
    use alloc::string::String;

    fn build_engine<'a>(
        config: &'a Config,
    ) -> GovernanceEngine<'a, InMemoryAgentRepo, InMemoryIntentRepo, InMemoryDecisionRepo, InMemoryTrustProfileRepo, InMemoryPolicyBundleRepo, InMemoryEventStore> {
        let mut engine = GovernanceEngine::new(
            config,
            InMemoryAgentRepo::new(),
            InMemoryIntentRepo::new(),
            InMemoryDecisionRepo::new(),
            InMemoryTrustProfileRepo::new(),
            InMemoryPolicyBundleRepo::new(),
            InMemoryEventStore::new(),
        );
        engine.policies_mut().put(permit_all_bundle()).unwrap();
        engine
    }

    /// A wildcard bundle with no rules, used so tests that only exercise
    /// trust/gate behavior aren't also tripped by the tenant's fail-closed
    /// policy default.
    fn permit_all_bundle() -> crate::types::PolicyBundle {
        crate::types::PolicyBundle {
            bundle_id: "permit-all".to_string(),
            name: "permit-all".to_string(),
            version: "1.0.0".to_string(),
            enabled: true,
            applicable_domains: Vec::new(),
            applicable_environments: Vec::new(),
            jurisdictions: Vec::new(),
            data_classification: Vec::new(),
            action_restrictions: crate::types::ActionRestrictions::default(),
            rules: Vec::new(),
            default_effect: Effect::Permit,
            created_at: Timestamp::from_millis(0),
            updated_at: Timestamp::from_millis(0),
        }
    }

    fn sample_intent(agent_id: &str, action_type: ActionType, magnitude: f64) -> Intent {
        Intent {
            intent_id: "intent-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            agent_id: agent_id.to_string(),
            correlation_id: "corr-1".to_string(),
            action: "do_thing".to_string(),
            action_type,
            resource_scope: Vec::new(),
            data_sensitivity: DataSensitivity::Internal,
            reversibility: Reversibility::Reversible,
            domain: "finance".to_string(),
            environment: "production".to_string(),
            jurisdictions: Vec::new(),
            magnitude: Some(magnitude),
            context: String::new(),
            trust_snapshot: fresh_profile(agent_id),
            status: IntentStatus::Pending,
            created_at: Timestamp::from_millis(0),
            updated_at: Timestamp::from_millis(0),
            expires_at: None,
        }
    }

    fn fresh_profile(agent_id: &str) -> TrustProfile {
        TrustProfile {
            profile_id: format!("profile-{agent_id}"),
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

    #[test]
    fn unknown_agent_becomes_a_terminal_system_error_decision() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let intent = sample_intent("ghost", ActionType::Read, 5.0);
        let decision = engine.authorize(intent, None, &clock, &rng).unwrap();
        assert!(!decision.permitted);
        assert_eq!(decision.denial_reason, Some(DenialReason::SystemError));
    }

    #[test]
    fn low_risk_intent_with_sufficient_trust_is_approved() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        engine.trust.repo_mut().put(fresh_profile("agent-1")).unwrap();

        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let intent = sample_intent("agent-1", ActionType::Read, 5.0);
        let decision = engine.authorize(intent, None, &clock, &rng).unwrap();
        assert!(decision.permitted);
        assert_eq!(decision.expires_at.as_millis(), DEFAULT_MAX_EXECUTION_TIME_MS);
    }

    #[test]
    fn circuit_broken_profile_denies_immediately() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        let mut profile = fresh_profile("agent-1");
        profile.circuit_broken = true;
        engine.trust.repo_mut().put(profile).unwrap();

        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let intent = sample_intent("agent-1", ActionType::Read, 5.0);
        let decision = engine.authorize(intent, None, &clock, &rng).unwrap();
        assert!(!decision.permitted);
        assert_eq!(decision.denial_reason, Some(DenialReason::InsufficientTrust));
    }

    #[test]
    fn repeated_intent_id_returns_cached_decision() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        engine.trust.repo_mut().put(fresh_profile("agent-1")).unwrap();

        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let first = engine.authorize(sample_intent("agent-1", ActionType::Read, 5.0), None, &clock, &rng).unwrap();
        let second = engine.authorize(sample_intent("agent-1", ActionType::Read, 5.0), None, &clock, &rng).unwrap();
        assert_eq!(first.decision_id, second.decision_id);
    }

    #[test]
    fn high_risk_transfer_escalates_rather_than_outright_permits() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        let mut profile = fresh_profile("agent-1");
        profile.dimensions = Dimensions::uniform(100.0);
        profile.composite_score = 1000.0;
        profile.adjusted_score = 1000.0;
        engine.trust.repo_mut().put(profile).unwrap();

        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let mut intent = sample_intent("agent-1", ActionType::Transfer, 100.0);
        intent.data_sensitivity = DataSensitivity::Restricted;
        intent.reversibility = Reversibility::Irreversible;
        let decision = engine.authorize(intent, None, &clock, &rng).unwrap();
        assert!(!decision.permitted);
        assert!(decision.denial_reason.is_none(), "escalation is not a denial");
    }

    /// Mirrors the worked scenario where all five trust dimensions sit at 40
    /// (adjusted score 400) and the intent is a CONFIDENTIAL, IRREVERSIBLE
    /// transfer of magnitude 80 — risk score 80.25, classified CRITICAL.
    /// Trust sufficiency must be checked before risk escalates to human
    /// approval, so this must come back as an outright rejection for
    /// insufficient trust, never an escalation.
    #[test]
    fn critical_risk_with_deep_trust_deficit_rejects_rather_than_escalates() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        let mut profile = fresh_profile("agent-1");
        profile.dimensions = Dimensions::uniform(40.0);
        profile.composite_score = 400.0;
        profile.adjusted_score = 400.0;
        engine.trust.repo_mut().put(profile).unwrap();

        let clock = FixedClock(Timestamp::from_millis(0));
        let rng = DeterministicRandom::constant(0.1);
        let mut intent = sample_intent("agent-1", ActionType::Transfer, 80.0);
        intent.data_sensitivity = DataSensitivity::Confidential;
        intent.reversibility = Reversibility::Irreversible;
        let decision = engine.authorize(intent, None, &clock, &rng).unwrap();
        assert!(!decision.permitted);
        assert_eq!(decision.denial_reason, Some(DenialReason::InsufficientTrust));
    }

    #[test]
    fn expired_deadline_becomes_a_terminal_system_error_decision() {
        let config = Config::default();
        let mut engine = build_engine(&config);
        engine.agents.put(Agent { id: "agent-1".to_string(), tenant_id: "tenant-1".to_string(), profile_id: "profile-agent-1".to_string() }).unwrap();
        engine.trust.repo_mut().put(fresh_profile("agent-1")).unwrap();

        let clock = FixedClock(Timestamp::from_millis(1_000));
        let rng = DeterministicRandom::constant(0.1);
        let intent = sample_intent("agent-1", ActionType::Read, 5.0);
        let deadline = Some(Timestamp::from_millis(500));
        let decision = engine.authorize(intent, deadline, &clock, &rng).unwrap();
        assert!(!decision.permitted);
        assert_eq!(decision.denial_reason, Some(DenialReason::SystemError));
    }
}
