// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error taxonomy shared by every repository and engine component.
//!
//! This crate stays `no_std`, so the error types here implement
//! [`core::fmt::Display`] by hand and do not derive `std::error::Error`.
//! Downstream `std` crates (e.g. `warden-governance-std`) wrap these in
//! `thiserror`-derived errors that do implement it.

use alloc::string::String;
use core::fmt;

use crate::types::Id;

/// Failures a repository can surface. Kept small and closed — the
/// orchestrator matches on every variant explicitly rather than treating
/// storage as an opaque black box.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No record exists for the given identifier.
    NotFound(Id),
    /// An optimistic-concurrency write lost a race: the caller's expected
    /// `version` no longer matches the stored value.
    VersionConflict { id: Id, expected: u64, actual: u64 },
    /// Two proof-chain appends raced for the same correlation id's tip.
    /// Distinct from `VersionConflict` because the retry strategy differs
    /// (recompute `previous_hash` against the new tip, not just re-read).
    ChainConflict { correlation_id: Id },
    /// The backing store could not be reached (disk, network, etc.).
    /// Always retryable; never implies data loss or corruption.
    Unavailable(String),
    /// The backing store responded but the payload failed to decode.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "no record found for id {id}"),
            StoreError::VersionConflict { id, expected, actual } => {
                write!(f, "version conflict on {id}: expected {expected}, found {actual}")
            }
            StoreError::ChainConflict { correlation_id } => {
                write!(f, "proof chain conflict for correlation {correlation_id}")
            }
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            StoreError::Corrupt(msg) => write!(f, "store returned corrupt data: {msg}"),
        }
    }
}

/// Failures the decision orchestrator can surface to a caller. Distinct
/// from [`StoreError`]: this is the outward-facing taxonomy after the
/// orchestrator has decided how to react to an internal failure.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The intent referenced an agent that does not exist.
    AgentNotFound(Id),
    /// The intent has already passed its `expiresAt` timestamp.
    IntentExpired(Id),
    /// No policy bundle resolved for the intent's domain/environment/
    /// jurisdiction combination, and no tenant-level default exists.
    NoPolicyResolved,
    /// The agent's trust profile is circuit-broken and cannot authorize
    /// any intent until reinstated.
    CircuitBroken(Id),
    /// A dependency (store, clock) failed in a way the orchestrator could
    /// not route around within its latency budget.
    Store(StoreError),
    /// [`crate::config::AuditConfig::require_signing`] is set and the event
    /// was appended (or, on verify, was found in the chain) without both a
    /// `signed_by` and a `signature`.
    Unsigned(Id),
    /// An internal invariant was violated — never expected in practice,
    /// always logged at error level when it surfaces.
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::AgentNotFound(id) => write!(f, "agent not found: {id}"),
            EngineError::IntentExpired(id) => write!(f, "intent expired: {id}"),
            EngineError::NoPolicyResolved => write!(f, "no policy bundle resolved for intent"),
            EngineError::CircuitBroken(id) => write!(f, "agent {id} trust profile is circuit broken"),
            EngineError::Store(e) => write!(f, "store error: {e}"),
            EngineError::Unsigned(id) => write!(f, "proof event {id} requires a signature but has none"),
            EngineError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        EngineError::Store(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StoreError {}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}
