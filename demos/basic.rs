// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # Basic Governance Engine Walk-Through
//!
//! Builds an engine around the in-memory repositories, registers two agents
//! with different trust profiles, and runs four intents through
//! [`GovernanceEngine::authorize`]: a clean permit, a denial on insufficient
//! trust, an escalation to human approval on a critical-risk action, and a
//! reported execution outcome that feeds back into trust dynamics. Finishes
//! by verifying the proof chain for one of the correlations.
//!
//! ```bash
//! cargo run --example basic
//! ```

use warden_governance_core::clock::{DeterministicRandom, FixedClock};
use warden_governance_core::config::Config;
use warden_governance_core::engine::GovernanceEngine;
use warden_governance_core::storage::{
    InMemoryAgentRepo, InMemoryDecisionRepo, InMemoryEventStore, InMemoryIntentRepo,
    InMemoryPolicyBundleRepo, InMemoryTrustProfileRepo,
};
use warden_governance_core::types::{
    ActionRestrictions, Agent, ActionType, DataSensitivity, Decision, Dimensions, DimensionKey,
    Effect, ExecutionOutcome, ExecutionStatus, Intent, IntentStatus, ObservationTier,
    OscillationWindow, PolicyBundle, Reversibility, RiskProfile, Timestamp, TrustBand,
    TrustProfile, Weights,
};

fn seeded_profile(agent_id: &str, profile_id: &str, dims: f64, tier: ObservationTier, band: TrustBand, score: f64) -> TrustProfile {
    TrustProfile {
        profile_id: profile_id.into(),
        agent_id: agent_id.into(),
        version: 1,
        dimensions: Dimensions::uniform(dims),
        weights: Weights::EQUAL,
        composite_score: score,
        observation_tier: tier,
        adjusted_score: score,
        band,
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

fn base_intent(intent_id: &str, agent_id: &str, correlation_id: &str, action: &str, trust_snapshot: TrustProfile) -> Intent {
    Intent {
        intent_id: intent_id.into(),
        tenant_id: "tenant-acme".into(),
        agent_id: agent_id.into(),
        correlation_id: correlation_id.into(),
        action: action.into(),
        action_type: ActionType::Write,
        resource_scope: Vec::new(),
        data_sensitivity: DataSensitivity::Internal,
        reversibility: Reversibility::Reversible,
        domain: "finance".into(),
        environment: "production".into(),
        jurisdictions: Vec::new(),
        magnitude: Some(100.0),
        context: String::new(),
        trust_snapshot,
        status: IntentStatus::Pending,
        created_at: Timestamp::from_millis(0),
        updated_at: Timestamp::from_millis(0),
        expires_at: None,
    }
}

fn print_decision(label: &str, decision: &Decision) {
    println!("[{label}] permitted={} band={:?} score={:.1}", decision.permitted, decision.trust_band, decision.trust_score);
    if let Some(reason) = &decision.denial_reason {
        println!("  denial_reason: {reason:?}");
    }
    if !decision.reasoning.is_empty() {
        println!("  reasoning: {}", decision.reasoning.join("; "));
    }
    if !decision.remediations.is_empty() {
        println!("  remediations: {}", decision.remediations.join("; "));
    }
    println!();
}

fn main() {
    println!("warden-governance — Basic Walk-Through\n");

    let config = Config::default();
    let mut engine = GovernanceEngine::new(
        &config,
        InMemoryAgentRepo::new(),
        InMemoryIntentRepo::new(),
        InMemoryDecisionRepo::new(),
        InMemoryTrustProfileRepo::new(),
        InMemoryPolicyBundleRepo::new(),
        InMemoryEventStore::new(),
    );

    // A well-attested, high-trust agent and a newly onboarded, barely-observed one.
    engine.agents_mut().put(Agent { id: "agent-finance-001".into(), tenant_id: "tenant-acme".into(), profile_id: "profile-finance-001".into() }).unwrap();
    engine.agents_mut().put(Agent { id: "agent-new-002".into(), tenant_id: "tenant-acme".into(), profile_id: "profile-new-002".into() }).unwrap();

    engine.trust().repo_mut().put(seeded_profile("agent-finance-001", "profile-finance-001", 85.0, ObservationTier::WhiteBox, TrustBand::T4, 850.0)).unwrap();
    engine.trust().repo_mut().put(seeded_profile("agent-new-002", "profile-new-002", 20.0, ObservationTier::BlackBox, TrustBand::T1, 200.0)).unwrap();

    // A tenant-wide default bundle that permits everything not otherwise
    // restricted, so the pre-action gate is the only thing standing between
    // a low-trust agent and a sensitive action in this walk-through.
    engine.policies_mut().put(PolicyBundle {
        bundle_id: "bundle-default".into(),
        name: "tenant default".into(),
        version: "1.0.0".into(),
        enabled: true,
        applicable_domains: Vec::new(),
        applicable_environments: Vec::new(),
        jurisdictions: Vec::new(),
        data_classification: Vec::new(),
        action_restrictions: ActionRestrictions::default(),
        rules: Vec::new(),
        default_effect: Effect::Permit,
        created_at: Timestamp::from_millis(0),
        updated_at: Timestamp::from_millis(0),
    }).unwrap();

    let clock = FixedClock(Timestamp::from_millis(0));
    let random = DeterministicRandom::constant(0.1);

    // Intent A: trusted agent, modest write — expect a clean permit.
    let trust_a = engine.trust().snapshot("agent-finance-001", clock.0).unwrap();
    let intent_a = base_intent("intent-a", "agent-finance-001", "corr-a", "approve_invoice", trust_a);
    let decision_a = engine.authorize(intent_a, None, &clock, &random).unwrap();
    print_decision("approve_invoice (trusted agent)", &decision_a);

    // Intent B: barely-observed agent attempting the same action — expect a
    // gate rejection or escalation driven by the trust deficit.
    let trust_b = engine.trust().snapshot("agent-new-002", clock.0).unwrap();
    let intent_b = base_intent("intent-b", "agent-new-002", "corr-b", "approve_invoice", trust_b);
    let decision_b = engine.authorize(intent_b, None, &clock, &random).unwrap();
    print_decision("approve_invoice (newly onboarded agent)", &decision_b);

    // Intent C: trusted agent, but a critical, irreversible action — expect
    // escalation to human approval regardless of trust.
    let trust_c = engine.trust().snapshot("agent-finance-001", clock.0).unwrap();
    let mut intent_c = base_intent("intent-c", "agent-finance-001", "corr-c", "wire_large_transfer", trust_c);
    intent_c.action_type = ActionType::Transfer;
    intent_c.data_sensitivity = DataSensitivity::Restricted;
    intent_c.reversibility = Reversibility::Irreversible;
    intent_c.magnitude = Some(95.0);
    let decision_c = engine.authorize(intent_c, None, &clock, &random).unwrap();
    print_decision("wire_large_transfer (critical risk)", &decision_c);

    // Report a successful outcome for intent A and watch the trust score move.
    let outcome = ExecutionOutcome { status: ExecutionStatus::Success, duration_ms: 420, output_hash: None, error: None };
    let delta = engine
        .report_outcome("intent-a", DimensionKey::Ct, 5.0, RiskProfile::Immediate, outcome, &clock, &random)
        .unwrap();
    println!(
        "Outcome reported for intent-a: {:.2} -> {:.2} (band {:?} -> {:?})\n",
        delta.previous_adjusted, delta.new_adjusted, delta.previous_band, delta.new_band
    );

    // Verify the proof chain recorded for corr-a is intact.
    let verification = engine.verify_chain("corr-a").unwrap();
    println!(
        "Proof chain corr-a: valid={} verified_events={} broken_at={:?}",
        verification.valid, verification.verified_events, verification.broken_at
    );

    println!("\nDone.");
}
