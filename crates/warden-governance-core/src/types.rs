// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across all protocol sub-systems.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so they can be serialised to JSON, stored, and
//! transmitted across process boundaries without additional conversion
//! steps. Identifiers are opaque strings (UUID recommended); timestamps are
//! Unix epoch milliseconds sourced from an injected [`crate::clock::Clock`]
//! — never read directly from the OS by core logic.

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// Opaque identifier. A UUID string is recommended but not enforced here —
/// validation of identifier shape belongs to the ingress boundary, not the
/// core protocol types.
pub type Id = String;

/// A 32-byte SHA-256 digest.
pub type Hash32 = [u8; 32];

/// Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Construct from raw epoch milliseconds.
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Raw epoch milliseconds.
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Fractional days elapsed between `self` and a later `other`.
    pub fn days_until(self, other: Timestamp) -> f64 {
        let delta_ms = other.0.saturating_sub(self.0);
        delta_ms as f64 / 86_400_000.0
    }

    /// Add a millisecond duration, saturating on overflow.
    pub fn plus_millis(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }
}

// ---------------------------------------------------------------------------
// Trust primitives
// ---------------------------------------------------------------------------

/// The five scored trust dimensions. Every [`TrustProfile`] carries exactly
/// these five keys — no others are permitted (the closed set backs the
/// weight-sum check in [`Weights::is_valid`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionKey {
    /// Competence.
    Ct,
    /// Behavioral.
    Bt,
    /// Governance.
    Gt,
    /// Experience.
    Xt,
    /// Attestation / context.
    Ac,
}

impl DimensionKey {
    /// All five dimension keys, in canonical order.
    pub const ALL: [DimensionKey; 5] =
        [DimensionKey::Ct, DimensionKey::Bt, DimensionKey::Gt, DimensionKey::Xt, DimensionKey::Ac];
}

/// Fixed-shape map of dimension key → score in `[0,100]`.
///
/// A plain struct (rather than a `HashMap`) is used deliberately: it makes
/// "all five keys present, no others" a type-level invariant instead of a
/// runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub ct: f64,
    pub bt: f64,
    pub gt: f64,
    pub xt: f64,
    pub ac: f64,
}

impl Dimensions {
    /// All dimensions set to the same starting value.
    pub const fn uniform(value: f64) -> Self {
        Self { ct: value, bt: value, gt: value, xt: value, ac: value }
    }

    pub fn get(&self, key: DimensionKey) -> f64 {
        match key {
            DimensionKey::Ct => self.ct,
            DimensionKey::Bt => self.bt,
            DimensionKey::Gt => self.gt,
            DimensionKey::Xt => self.xt,
            DimensionKey::Ac => self.ac,
        }
    }

    pub fn set(&mut self, key: DimensionKey, value: f64) {
        match key {
            DimensionKey::Ct => self.ct = value,
            DimensionKey::Bt => self.bt = value,
            DimensionKey::Gt => self.gt = value,
            DimensionKey::Xt => self.xt = value,
            DimensionKey::Ac => self.ac = value,
        }
    }

    /// Iterate `(key, value)` pairs in canonical order.
    pub fn iter(&self) -> [(DimensionKey, f64); 5] {
        [
            (DimensionKey::Ct, self.ct),
            (DimensionKey::Bt, self.bt),
            (DimensionKey::Gt, self.gt),
            (DimensionKey::Xt, self.xt),
            (DimensionKey::Ac, self.ac),
        ]
    }
}

/// Per-dimension weighting used to compose the composite score. Must sum to
/// `1.0 ± 0.001`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub ct: f64,
    pub bt: f64,
    pub gt: f64,
    pub xt: f64,
    pub ac: f64,
}

impl Weights {
    /// Equal weighting across all five dimensions.
    pub const EQUAL: Weights = Weights { ct: 0.2, bt: 0.2, gt: 0.2, xt: 0.2, ac: 0.2 };

    pub fn get(&self, key: DimensionKey) -> f64 {
        match key {
            DimensionKey::Ct => self.ct,
            DimensionKey::Bt => self.bt,
            DimensionKey::Gt => self.gt,
            DimensionKey::Xt => self.xt,
            DimensionKey::Ac => self.ac,
        }
    }

    /// Sum of all five weights.
    pub fn sum(&self) -> f64 {
        self.ct + self.bt + self.gt + self.xt + self.ac
    }

    /// `true` if the weights sum to `1.0` within `1e-3`.
    pub fn is_valid(&self) -> bool {
        (self.sum() - 1.0).abs() <= 1e-3
    }
}

impl Default for Weights {
    fn default() -> Self {
        Weights::EQUAL
    }
}

/// How deeply the system can observe an agent. Caps the trust score
/// regardless of how high the underlying dimensions score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObservationTier {
    BlackBox,
    GrayBox,
    WhiteBox,
    AttestedBox,
    VerifiedBox,
}

impl ObservationTier {
    /// Default ceiling on the adjusted score for this tier, on the
    /// `[0,1000]` scale. Tenant-overridable via `observation.ceilings`.
    pub const fn default_ceiling(self) -> f64 {
        match self {
            ObservationTier::BlackBox => 600.0,
            ObservationTier::GrayBox => 750.0,
            ObservationTier::WhiteBox => 900.0,
            ObservationTier::AttestedBox => 950.0,
            ObservationTier::VerifiedBox => 1000.0,
        }
    }
}

/// Discrete trust tier (T0–T5) derived from the adjusted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TrustBand {
    T0,
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl TrustBand {
    /// Default `[min, max]` bounds (inclusive) on the `[0,1000]` adjusted
    /// score scale. Tenant-overridable via `trust.bandThresholds`.
    pub const fn default_bounds(self) -> (f64, f64) {
        match self {
            TrustBand::T0 => (0.0, 200.0),
            TrustBand::T1 => (201.0, 400.0),
            TrustBand::T2 => (401.0, 550.0),
            TrustBand::T3 => (551.0, 700.0),
            TrustBand::T4 => (701.0, 850.0),
            TrustBand::T5 => (851.0, 1000.0),
        }
    }

    /// The band whose default bounds contain `score`.
    pub fn for_score(score: f64) -> TrustBand {
        const ORDER: [TrustBand; 6] =
            [TrustBand::T0, TrustBand::T1, TrustBand::T2, TrustBand::T3, TrustBand::T4, TrustBand::T5];
        for band in ORDER {
            let (min, max) = band.default_bounds();
            if score >= min && score <= max {
                return band;
            }
        }
        TrustBand::T5
    }

    /// The most sensitive [`DataSensitivity`] an intent may touch while
    /// this band holds. An intent exceeding this ceiling is denied with
    /// `DenialReason::DataSensitivityExceeded` regardless of what any
    /// policy bundle would otherwise permit.
    pub const fn max_data_sensitivity(self) -> DataSensitivity {
        match self {
            TrustBand::T0 | TrustBand::T1 => DataSensitivity::Public,
            TrustBand::T2 => DataSensitivity::Internal,
            TrustBand::T3 => DataSensitivity::Confidential,
            TrustBand::T4 | TrustBand::T5 => DataSensitivity::Restricted,
        }
    }
}

/// Risk classification of an intent, derived from weighted action factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Read,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Default minimum `adjustedScore` (on `[0,1000]`) required to clear the
    /// pre-action gate at this risk level. Tenant-overridable.
    pub const fn default_required_trust(self) -> f64 {
        match self {
            RiskLevel::Read => 0.0,
            RiskLevel::Low => 200.0,
            RiskLevel::Medium => 400.0,
            RiskLevel::High => 600.0,
            RiskLevel::Critical => 800.0,
        }
    }

    /// Map a combined `[0,100]` risk score to its level.
    pub fn from_score(risk: f64) -> RiskLevel {
        if risk < 15.0 {
            RiskLevel::Read
        } else if risk < 30.0 {
            RiskLevel::Low
        } else if risk < 50.0 {
            RiskLevel::Medium
        } else if risk < 75.0 {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// The class of action an intent declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Read,
    Write,
    Delete,
    Execute,
    Communicate,
    Transfer,
}

impl ActionType {
    /// Default `actionTypeRisk` contribution, on `[0,100]`.
    pub const fn default_risk(self) -> f64 {
        match self {
            ActionType::Read => 10.0,
            ActionType::Write => 50.0,
            ActionType::Delete => 80.0,
            ActionType::Execute => 70.0,
            ActionType::Communicate => 40.0,
            ActionType::Transfer => 85.0,
        }
    }
}

/// Sensitivity classification of the data an intent touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSensitivity {
    Public,
    Internal,
    Confidential,
    Restricted,
}

impl DataSensitivity {
    /// Default `sensitivityRisk` contribution, on `[0,100]`.
    pub const fn default_risk(self) -> f64 {
        match self {
            DataSensitivity::Public => 0.0,
            DataSensitivity::Internal => 25.0,
            DataSensitivity::Confidential => 60.0,
            DataSensitivity::Restricted => 95.0,
        }
    }
}

/// How reversible an intent's effect is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reversibility {
    Reversible,
    PartiallyReversible,
    Irreversible,
}

impl Reversibility {
    /// Default `reversibilityRisk` contribution, on `[0,100]`.
    pub const fn default_risk(self) -> f64 {
        match self {
            Reversibility::Reversible => 0.0,
            Reversibility::PartiallyReversible => 50.0,
            Reversibility::Irreversible => 100.0,
        }
    }
}

/// Why a [`Decision`] denied an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    InsufficientTrust,
    PolicyViolation,
    ResourceRestricted,
    DataSensitivityExceeded,
    RateLimitExceeded,
    ContextMismatch,
    ExpiredIntent,
    SystemError,
}

/// The kind of payload a proof event carries. Finite and enumerable by
/// design — modelled as a tagged variant with an exhaustive match rather
/// than an open inheritance hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofEventType {
    IntentReceived,
    DecisionMade,
    TrustDelta,
    ExecutionStarted,
    ExecutionCompleted,
    ExecutionFailed,
    IncidentDetected,
    RollbackInitiated,
    ComponentRegistered,
    ComponentUpdated,
    /// Raised when the gate escalates to `PENDING_VERIFICATION` or
    /// `PENDING_HUMAN_APPROVAL`.
    EscalationRequest,
}

/// Lifecycle status of an [`Intent`]. `Denied`, `Completed`, `Failed`, and
/// `Cancelled` are terminal — no further status transition is permitted
/// once one of them is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    Evaluating,
    Approved,
    Denied,
    Escalated,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

impl IntentStatus {
    /// `true` for the four terminal statuses.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            IntentStatus::Denied | IntentStatus::Completed | IntentStatus::Failed | IntentStatus::Cancelled
        )
    }
}

/// Outcome status reported by the execution adapter after an approved
/// intent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failure,
    Error,
    Timeout,
    Cancelled,
    Blocked,
}

/// Temporal window that withholds a provisional trust gain until it closes,
/// so a later reversal or chargeback can still cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskProfile {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
    Extended,
}

impl RiskProfile {
    /// Window length in milliseconds.
    pub const fn window_ms(self) -> u64 {
        match self {
            RiskProfile::Immediate => 5 * 60_000,
            RiskProfile::ShortTerm => 4 * 3_600_000,
            RiskProfile::MediumTerm => 3 * 86_400_000,
            RiskProfile::LongTerm => 30 * 86_400_000,
            RiskProfile::Extended => 90 * 86_400_000,
        }
    }
}

// ---------------------------------------------------------------------------
// Trust profile & evidence
// ---------------------------------------------------------------------------

/// An AI agent. Created at registration, never destroyed (soft-deleted at
/// tenant scope). Owns exactly one active [`TrustProfile`] at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: Id,
    pub tenant_id: Id,
    pub profile_id: Id,
}

/// Immutable record of a single piece of trust evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustEvidence {
    pub evidence_id: Id,
    pub dimension: DimensionKey,
    /// Impact in `[-100,+100]`. Positive is a gain; negative is a loss.
    pub impact: f64,
    pub source: String,
    pub collected_at: Timestamp,
    pub expires_at: Option<Timestamp>,
    pub metadata: Option<String>,
}

/// A gain withheld either by an active post-loss cooldown or by a
/// [`RiskProfile`] temporal-outcome window, pending resolution at `due_at`
/// unless a same-correlation reversal cancels it first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingGain {
    pub dimension: DimensionKey,
    /// The raw (un-diminished) gain that would have applied outright.
    pub raw_delta: f64,
    pub recorded_at: Timestamp,
    /// When this gain resolves: the cooldown's end, or
    /// `recorded_at + risk_profile.window_ms()` for a temporal-outcome gain.
    pub due_at: Timestamp,
    /// The correlation id of the outcome that produced this gain, if any —
    /// an unfavorable outcome sharing this id cancels the gain outright.
    pub correlation_id: Option<Id>,
    /// `true` only when this gain was deferred because of an active
    /// cooldown, in which case it is halved on resolution. A gain deferred
    /// solely by a temporal-outcome window resolves at full value.
    pub diminished: bool,
}

/// Bounded record of recent per-dimension direction changes, used for
/// oscillation detection within a rolling 24-hour window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OscillationWindow {
    /// `(dimension, was_gain, at)` entries, oldest first, pruned to the
    /// last 24 hours on every evaluation.
    pub entries: Vec<(DimensionKey, bool, Timestamp)>,
}

/// The current multi-dimensional trust state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustProfile {
    pub profile_id: Id,
    pub agent_id: Id,
    /// Monotonically increasing; backs optimistic concurrency control.
    pub version: u64,
    pub dimensions: Dimensions,
    pub weights: Weights,
    /// `round(1000 · Σ dimension_k · weight_k / 100, 2)`, on `[0,1000]`.
    pub composite_score: f64,
    pub observation_tier: ObservationTier,
    /// `min(compositeScore, ceiling(observationTier))`.
    pub adjusted_score: f64,
    pub band: TrustBand,
    pub calculated_at: Timestamp,
    pub valid_until: Option<Timestamp>,
    /// End of the post-loss cooldown window, if one is active.
    pub cooldown_until: Option<Timestamp>,
    pub last_drop_at: Option<Timestamp>,
    /// Timestamp of the last demotion; gates the promotion-delay rule.
    pub last_demotion_at: Option<Timestamp>,
    pub oscillation_window: OscillationWindow,
    pub pending_gains: Vec<PendingGain>,
    /// Bounded sequence of the most recently applied evidence (newest last).
    pub evidence: Vec<TrustEvidence>,
    /// `true` once `adjustedScore < 100`; cleared only by an explicit
    /// reinstatement.
    pub circuit_broken: bool,
}

/// Diff record produced by every trust mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustDelta {
    pub delta_id: Id,
    pub agent_id: Id,
    pub previous_dimensions: Dimensions,
    pub new_dimensions: Dimensions,
    pub previous_composite: f64,
    pub new_composite: f64,
    pub previous_adjusted: f64,
    pub new_adjusted: f64,
    pub previous_band: TrustBand,
    pub new_band: TrustBand,
    pub reason: String,
    pub correlation_id: Option<Id>,
    pub triggering_evidence: Vec<Id>,
    pub explanation: String,
    pub occurred_at: Timestamp,
}

/// A signed attestation authorizing manual reinstatement out of a
/// circuit-broken trust profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustReinstatement {
    pub agent_id: Id,
    pub authorized_by: String,
    pub reason: String,
    pub signed_at: Timestamp,
    pub signature: Option<String>,
}

// ---------------------------------------------------------------------------
// Intents & decisions
// ---------------------------------------------------------------------------

/// A declared, not-yet-executed action request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub intent_id: Id,
    pub tenant_id: Id,
    pub agent_id: Id,
    pub correlation_id: Id,
    pub action: String,
    pub action_type: ActionType,
    pub resource_scope: Vec<String>,
    pub data_sensitivity: DataSensitivity,
    pub reversibility: Reversibility,
    /// Policy-resolution domain, e.g. `"finance"`.
    pub domain: String,
    /// Deployment environment, e.g. `"production"`.
    pub environment: String,
    pub jurisdictions: Vec<String>,
    /// Caller-supplied magnitude in `[0,100]` feeding the gate's
    /// `magnitudeRisk` term. `None` defaults to `25.0`.
    pub magnitude: Option<f64>,
    /// Free-form context merged into the policy evaluation environment.
    pub context: String,
    /// Trust snapshot captured at submission — never mutated afterwards.
    pub trust_snapshot: TrustProfile,
    pub status: IntentStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}

/// A single rate-limit constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimit {
    pub resource: String,
    pub limit: u64,
    pub window_ms: u64,
}

/// The constrained execution envelope attached to a permit decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Constraints {
    pub required_approvals: Vec<String>,
    pub allowed_tools: Vec<String>,
    pub data_scopes: Vec<String>,
    pub rate_limits: Vec<RateLimit>,
    pub reversibility_required: bool,
    pub max_execution_time_ms: Option<u64>,
    pub max_retries: Option<u32>,
    pub resource_quotas: Option<alloc::collections::BTreeMap<String, f64>>,
}

/// The authorizer's verdict with constraints and reasoning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub decision_id: Id,
    pub intent_id: Id,
    pub agent_id: Id,
    pub correlation_id: Id,
    pub permitted: bool,
    pub constraints: Option<Constraints>,
    pub trust_band: TrustBand,
    pub trust_score: f64,
    pub policy_set_id: Option<Id>,
    pub denial_reason: Option<DenialReason>,
    pub reasoning: Vec<String>,
    pub remediations: Vec<String>,
    pub decided_at: Timestamp,
    pub expires_at: Timestamp,
    pub latency_ms: u64,
    pub version: u32,
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// The verdict a [`PolicyRule`] or bundle produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Permit,
    Deny,
}

/// Comparison applied by a [`PolicyCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Gt,
    Lt,
    Ge,
    Le,
    In,
    NotIn,
    Contains,
    Matches,
}

/// A single field/operator/value test evaluated against the intent/agent/
/// profile evaluation namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCondition {
    /// Dot-path into the evaluation context, e.g. `"intent.action_type"`.
    pub field: String,
    pub operator: Operator,
    pub value: serde_json::Value,
}

/// A single priority-ordered rule within a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub rule_id: Id,
    /// Lower value evaluates first.
    pub priority: i32,
    pub conditions: Vec<PolicyCondition>,
    pub effect: Effect,
    pub constraints: Option<Constraints>,
    pub enabled: bool,
}

/// Structural gates applied before rule evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ActionRestrictions {
    pub never_allowed: Vec<ActionType>,
    pub always_require_approval: Vec<ActionType>,
    /// A band absent from this map has no restriction beyond the bundle's
    /// default effect.
    pub allowed_by_band: alloc::collections::BTreeMap<TrustBand, Vec<ActionType>>,
}

/// A named, versioned bundle of policy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyBundle {
    pub bundle_id: Id,
    pub name: String,
    /// Semver string, e.g. `"1.4.0"`.
    pub version: String,
    pub enabled: bool,
    /// Empty means wildcard (matches any domain).
    pub applicable_domains: Vec<String>,
    pub applicable_environments: Vec<String>,
    pub jurisdictions: Vec<String>,
    pub data_classification: Vec<DataSensitivity>,
    pub action_restrictions: ActionRestrictions,
    pub rules: Vec<PolicyRule>,
    pub default_effect: Effect,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Outcome status of a pre-action gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Approved,
    Rejected,
    PendingVerification,
    PendingHumanApproval,
}

/// Result of a pre-action gate evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerificationResult {
    pub status: GateStatus,
    pub risk_level: RiskLevel,
    pub required_trust: f64,
    pub current_trust: f64,
    /// `max(0, required_trust - current_trust)`.
    pub trust_deficit: f64,
    pub passed: bool,
    pub reasoning: Vec<String>,
    /// Extra requirements when `status` is one of the pending variants
    /// (e.g. `"approver_role:security-lead"`).
    pub requirements: Option<Vec<String>>,
    pub verified_at: Timestamp,
    pub expires_at: Timestamp,
    pub verification_id: Id,
}

// ---------------------------------------------------------------------------
// Execution & chain verification
// ---------------------------------------------------------------------------

/// Outcome reported by the execution adapter after a permitted intent runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: ExecutionStatus,
    pub duration_ms: u64,
    pub output_hash: Option<Hash32>,
    pub error: Option<String>,
}

/// Result of walking and re-verifying a correlation's proof chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainVerificationResult {
    pub valid: bool,
    pub verified_events: u64,
    pub broken_at: Option<Id>,
}
