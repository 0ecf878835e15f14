// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`Config`] is the single entry point for tuning the trust engine, the
//! policy engine, the pre-action gate, and observation-tier ceilings at
//! construction time. Every field has a default matching the values fixed
//! in the protocol design, so `Config::default()` is always a valid
//! starting point; deployments override only the knobs they need.

use alloc::collections::BTreeMap;
use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::types::{Effect, ObservationTier, RiskLevel, TrustBand};

/// Tuning knobs for [`crate::trust::TrustManager`]'s gain/loss/cooldown/
/// oscillation dynamics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustDynamicsConfig {
    /// Multiplier on the logarithmic gain term. Default `0.01`.
    pub gain_rate: f64,
    /// Multiplier on the linear loss term. Default `0.10` — ten times the
    /// default gain rate, the asymmetry the protocol relies on.
    pub loss_rate: f64,
    /// Hours during which gains are deferred after any loss. Default `168`
    /// (7 days).
    pub cooldown_hours: u64,
    /// Number of direction changes within `oscillation_window_hours` that
    /// triggers the reversal penalty. Default `3`.
    pub oscillation_threshold: u32,
    /// Rolling window, in hours, over which direction changes are counted.
    /// Default `24`.
    pub oscillation_window_hours: u64,
    /// Multiplier applied to the next loss once oscillation triggers.
    /// Default `2.0`.
    pub reversal_penalty_multiplier: f64,
    /// Adjusted-score threshold below which the profile becomes
    /// circuit-broken. Default `100.0`.
    pub circuit_breaker_threshold: f64,
}

impl Default for TrustDynamicsConfig {
    fn default() -> Self {
        Self {
            gain_rate: 0.01,
            loss_rate: 0.10,
            cooldown_hours: 168,
            oscillation_threshold: 3,
            oscillation_window_hours: 24,
            reversal_penalty_multiplier: 2.0,
            circuit_breaker_threshold: 100.0,
        }
    }
}

/// Continuous time-decay tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayConfig {
    /// Per-day decay rate applied independently to each dimension on every
    /// lazy read. Default `0.01`.
    pub rate_per_day: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self { rate_per_day: 0.01 }
    }
}

/// Banding stability tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandingConfig {
    /// Points of overshoot (on the 0–1000 adjusted scale) required to cross
    /// a band boundary. Default `30`.
    pub hysteresis: f64,
    /// Days that must elapse since the last demotion before a promotion is
    /// allowed to take effect. Default `7`.
    pub promotion_delay_days: f64,
}

impl Default for BandingConfig {
    fn default() -> Self {
        Self { hysteresis: 30.0, promotion_delay_days: 7.0 }
    }
}

/// Observation-tier ceiling overrides. Defaults come from
/// [`ObservationTier::default_ceiling`]; this map lets a tenant raise or
/// lower individual tiers without touching the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObservationConfig {
    pub ceiling_overrides: BTreeMap<ObservationTier, f64>,
}

impl ObservationConfig {
    pub fn ceiling(&self, tier: ObservationTier) -> f64 {
        self.ceiling_overrides.get(&tier).copied().unwrap_or_else(|| tier.default_ceiling())
    }
}

/// Gate threshold tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    /// Risk level at or above which the gate requires multi-prover
    /// verification rather than an outright permit. Default `HIGH`.
    pub verification_threshold: RiskLevel,
    /// Risk level at or above which the gate escalates to human approval.
    /// Default `CRITICAL`.
    pub human_approval_threshold: RiskLevel,
    /// Milliseconds a `PENDING_VERIFICATION` / `PENDING_HUMAN_APPROVAL`
    /// result stays valid before it must be re-evaluated. Default `300_000`
    /// (5 minutes).
    pub verification_validity_ms: u64,
    /// Per-risk-level required-trust overrides. Defaults come from
    /// [`RiskLevel::default_required_trust`].
    pub required_trust_overrides: BTreeMap<RiskLevel, f64>,
    /// Weights applied to the four risk factors. Must sum to `1.0`.
    pub risk_weights: RiskWeights,
    /// Opaque role name a human-approval escalation is addressed to, e.g.
    /// `"security-lead"`. The gate never resolves or verifies this role
    /// itself — identity and verification of the approver are a site-local
    /// concern outside this crate.
    pub approver_role: String,
}

/// Weights for the four pre-action gate risk factors (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskWeights {
    pub action_type: f64,
    pub sensitivity: f64,
    pub reversibility: f64,
    pub magnitude: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self { action_type: 0.25, sensitivity: 0.30, reversibility: 0.25, magnitude: 0.20 }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            verification_threshold: RiskLevel::High,
            human_approval_threshold: RiskLevel::Critical,
            verification_validity_ms: 300_000,
            required_trust_overrides: BTreeMap::new(),
            risk_weights: RiskWeights::default(),
            approver_role: String::from("security-lead"),
        }
    }
}

impl GateConfig {
    pub fn required_trust(&self, level: RiskLevel) -> f64 {
        self.required_trust_overrides.get(&level).copied().unwrap_or_else(|| level.default_required_trust())
    }
}

/// Policy engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    /// Verdict applied when no rule in any resolved bundle matches.
    /// Default `Deny` (fail closed).
    pub default_effect: Effect,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { default_effect: Effect::Deny }
    }
}

/// Proof-chain signing tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// When `true`, every appended proof event is expected to carry a
    /// `signed_by` / `signature` pair. Verification of the signature
    /// itself is delegated to the embedding application; this crate only
    /// enforces presence when the flag is set.
    pub require_signing: bool,
}

/// Top-level configuration for the decision orchestrator and every
/// sub-component it composes.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub trust_dynamics: TrustDynamicsConfig,
    pub decay: DecayConfig,
    pub banding: BandingConfig,
    pub observation: ObservationConfig,
    pub gate: GateConfig,
    pub policy: PolicyConfig,
    pub audit: AuditConfig,
    /// Default trust band assumed for an agent that has no profile yet and
    /// `default_observation_tier` has no evidence to compose from.
    pub default_band: TrustBand,
}

impl Default for TrustBand {
    fn default() -> Self {
        TrustBand::T0
    }
}
