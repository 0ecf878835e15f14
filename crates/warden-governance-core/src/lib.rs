// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # warden-governance-core
//!
//! Trust, policy, gate, and proof-chain engine for autonomous agent
//! authorization.
//!
//! This crate is `no_std`-compatible (requires `alloc`). Enable the `std`
//! feature (on by default) to lift that restriction and gain access to
//! standard-library conveniences — the `OS` clock, thread RNG, and
//! `std::error::Error` impls.
//!
//! ## Architecture
//!
//! ```text
//! GovernanceEngine<A, I, D, T, P, E>
//!   ├── TrustManager<T>       — multi-dimensional trust scoring & dynamics
//!   ├── PolicyEngine          — bundle resolution & rule evaluation
//!   ├── PreActionGate         — risk classification & trust-threshold check
//!   └── ProofChain<E>         — hash-chained, append-only audit log
//! ```
//!
//! `A`, `I`, `D`, `T`, `P`, `E` are the six narrow repository traits in
//! [`storage`] — `AgentRepo`, `IntentRepo`, `DecisionRepo`,
//! `TrustProfileRepo`, `PolicyBundleRepo`, `EventStore` respectively. This
//! crate ships in-memory implementations of all six; durable, file-backed
//! implementations live in the companion `warden-governance-std` crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use warden_governance_core::{
//!     clock::{DeterministicRandom, FixedClock},
//!     config::Config,
//!     engine::GovernanceEngine,
//!     storage::{
//!         InMemoryAgentRepo, InMemoryDecisionRepo, InMemoryEventStore,
//!         InMemoryIntentRepo, InMemoryPolicyBundleRepo, InMemoryTrustProfileRepo,
//!     },
//!     types::{
//!         ActionRestrictions, Agent, ActionType, DataSensitivity, Dimensions, Effect, Intent,
//!         IntentStatus, ObservationTier, OscillationWindow, PolicyBundle, Reversibility,
//!         Timestamp, TrustBand, TrustProfile, Weights,
//!     },
//! };
//!
//! let config = Config::default();
//! let mut engine = GovernanceEngine::new(
//!     &config,
//!     InMemoryAgentRepo::new(),
//!     InMemoryIntentRepo::new(),
//!     InMemoryDecisionRepo::new(),
//!     InMemoryTrustProfileRepo::new(),
//!     InMemoryPolicyBundleRepo::new(),
//!     InMemoryEventStore::new(),
//! );
//!
//! engine.agents_mut().put(Agent {
//!     id: "agent-1".into(),
//!     tenant_id: "tenant-1".into(),
//!     profile_id: "profile-1".into(),
//! }).unwrap();
//!
//! // Registration: an agent's starting trust profile (assigned manually —
//! // trust never moves anywhere on its own initiative).
//! let trust_snapshot = TrustProfile {
//!     profile_id: "profile-1".into(),
//!     agent_id: "agent-1".into(),
//!     version: 1,
//!     dimensions: Dimensions::uniform(80.0),
//!     weights: Weights::EQUAL,
//!     composite_score: 800.0,
//!     observation_tier: ObservationTier::WhiteBox,
//!     adjusted_score: 800.0,
//!     band: TrustBand::T4,
//!     calculated_at: Timestamp::from_millis(0),
//!     valid_until: None,
//!     cooldown_until: None,
//!     last_drop_at: None,
//!     last_demotion_at: None,
//!     oscillation_window: OscillationWindow::default(),
//!     pending_gains: Vec::new(),
//!     evidence: Vec::new(),
//!     circuit_broken: false,
//! };
//! engine.trust().repo_mut().put(trust_snapshot.clone()).unwrap();
//!
//! // A tenant's default policy configuration denies everything it has no
//! // bundle for — register a permissive bundle so this walk-through intent
//! // has something to resolve against.
//! engine.policies_mut().put(PolicyBundle {
//!     bundle_id: "permit-all".into(),
//!     name: "permit-all".into(),
//!     version: "1.0.0".into(),
//!     enabled: true,
//!     applicable_domains: Vec::new(),
//!     applicable_environments: Vec::new(),
//!     jurisdictions: Vec::new(),
//!     data_classification: Vec::new(),
//!     action_restrictions: ActionRestrictions::default(),
//!     rules: Vec::new(),
//!     default_effect: Effect::Permit,
//!     created_at: Timestamp::from_millis(0),
//!     updated_at: Timestamp::from_millis(0),
//! }).unwrap();
//!
//! let intent = Intent {
//!     intent_id: "intent-1".into(),
//!     tenant_id: "tenant-1".into(),
//!     agent_id: "agent-1".into(),
//!     correlation_id: "corr-1".into(),
//!     action: "read_report".into(),
//!     action_type: ActionType::Read,
//!     resource_scope: Vec::new(),
//!     data_sensitivity: DataSensitivity::Internal,
//!     reversibility: Reversibility::Reversible,
//!     domain: "finance".into(),
//!     environment: "production".into(),
//!     jurisdictions: Vec::new(),
//!     magnitude: Some(5.0),
//!     context: String::new(),
//!     trust_snapshot,
//!     status: IntentStatus::Pending,
//!     created_at: Timestamp::from_millis(0),
//!     updated_at: Timestamp::from_millis(0),
//!     expires_at: None,
//! };
//!
//! let clock = FixedClock(Timestamp::from_millis(0));
//! let random = DeterministicRandom::constant(0.1);
//! let decision = engine.authorize(intent, None, &clock, &random).unwrap();
//! assert!(decision.permitted);
//! ```
//!
//! (See `demos/basic.rs` in the workspace root for a complete, runnable
//! walk-through including denial paths and chain verification.)

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod audit;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod policy;
pub mod storage;
pub mod trust;
pub mod types;

// Async engine — only compiled when the "async" feature is enabled.
// Requires the "std" feature (Tokio cannot run in no_std environments).
#[cfg(feature = "async")]
pub mod async_engine;

// Config loader — TOML file and environment variable loading.
// Only compiled when the "config-loader" feature is enabled.
#[cfg(feature = "config-loader")]
pub mod config_loader;

// Re-export the most commonly used items at the crate root so consumers can
// write `use warden_governance_core::GovernanceEngine;` instead of the
// fully qualified path.
pub use config::Config;
pub use engine::GovernanceEngine;
pub use error::{EngineError, StoreError};
pub use types::{Decision, Intent, TrustBand, TrustProfile};

// Re-export the async engine at the crate root for ergonomic imports.
#[cfg(feature = "async")]
pub use async_engine::AsyncGovernanceEngine;

// Re-export config loader types at the crate root.
#[cfg(feature = "config-loader")]
pub use config_loader::{load_config, load_config_from_env, ConfigError};
