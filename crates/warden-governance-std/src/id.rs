// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Opaque identifier generation.
//!
//! `warden-governance-core` types identifiers as plain, unenforced strings
//! (see [`warden_governance_core::types::Id`]) so the core crate never
//! takes a hard dependency on a UUID library. This `std`-only companion
//! mints the UUIDv4 strings the core types recommend, for callers that
//! don't already have a correlation/intent/event id supplied by the
//! caller's own system of record.

use warden_governance_core::types::Id;

/// Mint a fresh UUIDv4, hyphenated and lowercase, suitable for any
/// [`Id`](warden_governance_core::types::Id) field.
pub fn new_id() -> Id {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_id_produces_distinct_well_formed_uuids() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
        assert_eq!(a.matches('-').count(), 4);
    }
}
