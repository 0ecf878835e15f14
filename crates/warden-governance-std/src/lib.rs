// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # warden-governance-std
//!
//! `std`-only storage backends for `warden-governance-core`.
//!
//! This crate provides [`FileStore`](storage::file::FileStore), a JSON
//! file-backed implementation of the six repository traits
//! (`AgentRepo`, `IntentRepo`, `DecisionRepo`, `TrustProfileRepo`,
//! `PolicyBundleRepo`, `EventStore`) suitable for CLI tools, single-node
//! agents, and deployments that do not need a full database.
//!
//! ## Quick Start
//!
//! [`FileStore`](storage::file::FileStore) implements all six repository
//! traits on one struct backed by one file, so it can be wrapped once in
//! `Arc<Mutex<_>>` — `warden-governance-core` provides blanket trait impls
//! for that wrapper under the `std` feature — and handed to
//! [`GovernanceEngine::new`] six times, once per repository slot:
//!
//! ```rust,no_run
//! use std::sync::{Arc, Mutex};
//!
//! use warden_governance_core::{config::Config, engine::GovernanceEngine};
//! use warden_governance_std::storage::file::FileStore;
//!
//! let config = Config::default();
//! let store = Arc::new(Mutex::new(
//!     FileStore::open("/var/lib/warden/governance.json").expect("failed to open storage file"),
//! ));
//!
//! let engine = GovernanceEngine::new(
//!     &config,
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     store.clone(),
//!     store,
//! );
//! # let _ = engine;
//! ```
//!
//! [`GovernanceEngine::new`]: warden_governance_core::engine::GovernanceEngine::new

pub mod id;
pub mod storage;

pub use id::new_id;
pub use storage::file::{FileStore, FileStoreError};
