// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Pre-action gate: the last check an intent passes through after policy
//! resolution, before execution is allowed to start.
//!
//! The gate computes a weighted risk score from four intent factors,
//! derives a [`RiskLevel`], and compares the caller's `adjusted_score`
//! against the configured required-trust threshold for that level.
//! Trust sufficiency is checked first: a deficit always rejects with
//! [`GateStatus::Rejected`], regardless of risk level. Only once trust
//! clears the bar does risk level decide the rest — at or above
//! `human_approval_threshold` the gate escalates to
//! [`GateStatus::PendingHumanApproval`]; at or above
//! `verification_threshold` (but below human-approval) it escalates to
//! [`GateStatus::PendingVerification`]; otherwise it approves.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::clock::Clock;
use crate::config::GateConfig;
use crate::types::{GateStatus, GateVerificationResult, Id, Intent, RiskLevel, Timestamp};

/// Stateless risk scorer and threshold gate. Holds no mutable state of its
/// own — verification identifiers are produced via the injected
/// [`Clock`]/caller-supplied id rather than an internal counter, keeping the
/// type `Copy`-friendly and trivial to test.
#[derive(Debug, Clone, Copy)]
pub struct PreActionGate<'a> {
    config: &'a GateConfig,
}

impl<'a> PreActionGate<'a> {
    pub fn new(config: &'a GateConfig) -> Self {
        Self { config }
    }

    /// Weighted composite of the four risk factors, on `[0,100]`.
    pub fn risk_score(&self, intent: &Intent) -> f64 {
        let w = &self.config.risk_weights;
        let magnitude = intent.magnitude.unwrap_or(25.0).clamp(0.0, 100.0);
        w.action_type * intent.action_type.default_risk()
            + w.sensitivity * intent.data_sensitivity.default_risk()
            + w.reversibility * intent.reversibility.default_risk()
            + w.magnitude * magnitude
    }

    /// Evaluate `intent` at `current_trust` (the agent's adjusted score on
    /// `[0,1000]`). `verification_id` should be a freshly minted identifier
    /// from the caller — this type does not generate ids itself.
    pub fn evaluate(
        &self,
        intent: &Intent,
        current_trust: f64,
        verification_id: Id,
        clock: &dyn Clock,
    ) -> GateVerificationResult {
        let risk = self.risk_score(intent);
        let risk_level = RiskLevel::from_score(risk);
        let required_trust = self.config.required_trust(risk_level);
        let trust_deficit = (required_trust - current_trust).max(0.0);
        let now = clock.now();
        let expires_at = now.plus_millis(self.config.verification_validity_ms);

        let mut reasoning = Vec::new();
        reasoning.push(format!(
            "risk score {risk:.2} classified as {risk_level:?}, requiring trust >= {required_trust:.2}"
        ));

        if current_trust < required_trust {
            reasoning.push(format!(
                "current trust {current_trust:.2} is below required trust {required_trust:.2}"
            ));
            return GateVerificationResult {
                status: GateStatus::Rejected,
                risk_level,
                required_trust,
                current_trust,
                trust_deficit,
                passed: false,
                reasoning,
                requirements: None,
                verified_at: now,
                expires_at,
                verification_id,
            };
        }

        if risk_level >= self.config.human_approval_threshold {
            reasoning.push(format!(
                "risk level {risk_level:?} meets or exceeds humanApprovalThreshold {:?}; escalating to human approval",
                self.config.human_approval_threshold
            ));
            return GateVerificationResult {
                status: GateStatus::PendingHumanApproval,
                risk_level,
                required_trust,
                current_trust,
                trust_deficit,
                passed: false,
                reasoning,
                requirements: Some(human_approval_requirements(&self.config.approver_role)),
                verified_at: now,
                expires_at,
                verification_id,
            };
        }

        if risk_level >= self.config.verification_threshold {
            reasoning.push(format!(
                "risk level {risk_level:?} meets or exceeds verificationThreshold {:?}; requiring multi-prover verification",
                self.config.verification_threshold
            ));
            return GateVerificationResult {
                status: GateStatus::PendingVerification,
                risk_level,
                required_trust,
                current_trust,
                trust_deficit: 0.0,
                passed: false,
                reasoning,
                requirements: Some(verification_requirements(risk_level)),
                verified_at: now,
                expires_at,
                verification_id,
            };
        }

        reasoning.push("trust sufficient and risk below verification threshold".into());
        GateVerificationResult {
            status: GateStatus::Approved,
            risk_level,
            required_trust,
            current_trust,
            trust_deficit: 0.0,
            passed: true,
            reasoning,
            requirements: None,
            verified_at: now,
            expires_at,
            verification_id,
        }
    }

    /// `true` if a previously issued pending result (verification or human
    /// approval) is still within its validity window at `now`.
    pub fn is_still_valid(&self, result: &GateVerificationResult, now: Timestamp) -> bool {
        now.as_millis() <= result.expires_at.as_millis()
    }
}

fn verification_requirements(level: RiskLevel) -> Vec<String> {
    match level {
        RiskLevel::Critical => {
            alloc::vec!["provers:3".into(), "quorum:2-of-3".into()]
        }
        _ => alloc::vec!["provers:2".into(), "quorum:2-of-2".into()],
    }
}

fn human_approval_requirements(approver_role: &str) -> Vec<String> {
    alloc::vec![alloc::format!("approver_role:{approver_role}")]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::GateConfig;
    use crate::types::{
        ActionType, DataSensitivity, Dimensions, Id, ObservationTier, OscillationWindow,
        Reversibility, TrustBand, TrustProfile, Weights,
    };
    use alloc::string::ToString;

    fn sample_intent(action_type: ActionType, sensitivity: DataSensitivity, reversibility: Reversibility, magnitude: f64) -> Intent {
        Intent {
            intent_id: "intent-1".to_string(),
            tenant_id: "tenant-1".to_string(),
            agent_id: "agent-1".to_string(),
            correlation_id: "corr-1".to_string(),
            action: "do_thing".to_string(),
            action_type,
            resource_scope: Vec::new(),
            data_sensitivity: sensitivity,
            reversibility,
            domain: "finance".to_string(),
            environment: "production".to_string(),
            jurisdictions: Vec::new(),
            magnitude: Some(magnitude),
            context: String::new(),
            trust_snapshot: TrustProfile {
                profile_id: "profile-1".to_string(),
                agent_id: "agent-1".to_string(),
                version: 1,
                dimensions: Dimensions::uniform(50.0),
                weights: Weights::EQUAL,
                composite_score: 500.0,
                observation_tier: ObservationTier::WhiteBox,
                adjusted_score: 500.0,
                band: TrustBand::T2,
                calculated_at: Timestamp::from_millis(0),
                valid_until: None,
                cooldown_until: None,
                last_drop_at: None,
                last_demotion_at: None,
                oscillation_window: OscillationWindow::default(),
                pending_gains: Vec::new(),
                evidence: Vec::new(),
                circuit_broken: false,
            },
            status: crate::types::IntentStatus::Pending,
            created_at: Timestamp::from_millis(0),
            updated_at: Timestamp::from_millis(0),
            expires_at: None,
        }
    }

    #[test]
    fn low_risk_read_approves_with_low_trust() {
        let config = GateConfig::default();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Read, DataSensitivity::Public, Reversibility::Reversible, 5.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 50.0, "verif-1".to_string(), &clock);
        assert_eq!(result.status, GateStatus::Approved);
        assert!(result.passed);
    }

    #[test]
    fn high_risk_with_insufficient_trust_is_rejected() {
        let config = GateConfig::default();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Delete, DataSensitivity::Restricted, Reversibility::Irreversible, 90.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 50.0, "verif-2".to_string(), &clock);
        assert_eq!(result.status, GateStatus::Rejected);
        assert!(result.trust_deficit > 0.0);
    }

    #[test]
    fn high_risk_with_sufficient_trust_requires_verification() {
        let config = GateConfig::default();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Delete, DataSensitivity::Restricted, Reversibility::Irreversible, 90.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 900.0, "verif-3".to_string(), &clock);
        assert_eq!(result.status, GateStatus::PendingVerification);
        assert!(result.requirements.is_some());
    }

    #[test]
    fn transfer_of_restricted_irreversible_funds_escalates_to_human_approval() {
        let config = GateConfig::default();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Transfer, DataSensitivity::Restricted, Reversibility::Irreversible, 100.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 1000.0, "verif-4".to_string(), &clock);
        assert_eq!(result.status, GateStatus::PendingHumanApproval);
        assert!(!result.passed);
        assert_eq!(result.requirements, Some(alloc::vec!["approver_role:security-lead".to_string()]));
    }

    #[test]
    fn human_approval_escalation_uses_the_configured_approver_role() {
        let mut config = GateConfig::default();
        config.approver_role = "compliance-officer".to_string();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Transfer, DataSensitivity::Restricted, Reversibility::Irreversible, 100.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 1000.0, "verif-4b".to_string(), &clock);
        assert_eq!(result.status, GateStatus::PendingHumanApproval);
        assert_eq!(result.requirements, Some(alloc::vec!["approver_role:compliance-officer".to_string()]));
    }

    #[test]
    fn validity_window_expires_after_configured_duration() {
        let config = GateConfig::default();
        let gate = PreActionGate::new(&config);
        let intent = sample_intent(ActionType::Delete, DataSensitivity::Restricted, Reversibility::Irreversible, 90.0);
        let clock = FixedClock(Timestamp::from_millis(0));
        let result = gate.evaluate(&intent, 900.0, "verif-5".to_string(), &clock);
        assert!(gate.is_still_valid(&result, Timestamp::from_millis(100)));
        assert!(!gate.is_still_valid(&result, Timestamp::from_millis(config.verification_validity_ms + 1)));
    }
}
