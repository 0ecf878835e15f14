// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-based JSON storage backend.
//!
//! [`FileStore`] persists every repository's state to a single JSON file on
//! disk. Every mutation flushes the file atomically (write-rename) so that a
//! crash mid-write does not corrupt existing data.
//!
//! ## Layout
//!
//! The JSON file has the shape:
//!
//! ```json
//! {
//!   "agents":         { "<agent_id>":       Agent,           ... },
//!   "intents":        { "<intent_id>":      Intent,          ... },
//!   "decisions":      { "<decision_id>":    Decision,        ... },
//!   "decisionsByIntent": { "<intent_id>":   "<decision_id>", ... },
//!   "trustProfiles":  { "<agent_id>":       TrustProfile,    ... },
//!   "policyBundles":  { "<bundle_id>":      PolicyBundle,    ... },
//!   "eventChains":    { "<correlation_id>": [ [event_id, raw bytes], ... ], ... }
//! }
//! ```
//!
//! ## Caveats
//!
//! * [`FileStore`] holds the full snapshot in memory and flushes on every
//!   mutation. It is not intended for high-frequency write workloads — a
//!   durable database-backed implementation of the six repository traits is
//!   the right choice past single-digit writes per second.
//! * Concurrent access from multiple processes is not supported. Each
//!   process should own its `FileStore` exclusively.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use warden_governance_core::error::StoreError;
use warden_governance_core::storage::{
    AgentRepo, DecisionRepo, EventStore, IntentRepo, PolicyBundleRepo, TrustProfileRepo,
};
use warden_governance_core::types::{Agent, Decision, Intent, PolicyBundle, TrustProfile};

/// Errors specific to opening and flushing the backing file. Repository
/// trait methods translate these into [`StoreError`] at the call site —
/// `warden-governance-core` stays `no_std` and cannot name `io::Error`
/// directly, so this richer, `thiserror`-derived type only exists at this
/// std boundary.
#[derive(Debug, thiserror::Error)]
pub enum FileStoreError {
    #[error("failed to read/write governance storage file: {0}")]
    Io(#[from] std::io::Error),
    #[error("governance storage JSON (de)serialisation error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Snapshot of every repository's state, serialised to / deserialised from
/// disk as one document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    agents: HashMap<String, Agent>,
    intents: HashMap<String, Intent>,
    decisions: HashMap<String, Decision>,
    decisions_by_intent: HashMap<String, String>,
    trust_profiles: HashMap<String, TrustProfile>,
    policy_bundles: HashMap<String, PolicyBundle>,
    event_chains: HashMap<String, Vec<(String, Vec<u8>)>>,
}

/// A single-file JSON implementation of all six repository traits.
///
/// # Examples
///
/// ```rust,no_run
/// use warden_governance_std::storage::file::FileStore;
///
/// let mut store = FileStore::open("/tmp/warden-governance.json")
///     .expect("could not open storage");
/// store.flush().expect("could not flush storage");
/// ```
pub struct FileStore {
    path: PathBuf,
    data: Snapshot,
    /// Wall-clock time of the last successful flush, for operator-facing
    /// logging — not persisted, since the file's own mtime already serves
    /// that purpose across restarts.
    last_flushed_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl FileStore {
    /// Open an existing JSON storage file, or create a new empty one if the
    /// path does not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FileStoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Snapshot::default()
        };

        tracing::debug!("opened governance storage file {}", path.display());
        Ok(Self { path, data, last_flushed_at: None })
    }

    /// Wall-clock time of the last successful flush, if any has happened
    /// yet in this process.
    pub fn last_flushed_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.last_flushed_at
    }

    /// Flush the current in-memory state to disk using an atomic
    /// write-rename: the file is written to `<path>.tmp` first, then
    /// renamed over the target, so a crash during the write never leaves a
    /// partial file.
    pub fn flush(&mut self) -> Result<(), FileStoreError> {
        let json = serde_json::to_string_pretty(&self.data)?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        let now = chrono::Utc::now();
        self.last_flushed_at = Some(now);
        tracing::debug!("flushed governance storage to {} at {}", self.path.display(), now.to_rfc3339());
        Ok(())
    }

    fn flush_or_unavailable(&mut self) -> Result<(), StoreError> {
        self.flush().map_err(|e| {
            tracing::warn!("governance storage flush failed: {e}");
            StoreError::Unavailable(e.to_string())
        })
    }
}

impl AgentRepo for FileStore {
    fn get(&self, agent_id: &str) -> Result<Agent, StoreError> {
        self.data.agents.get(agent_id).cloned().ok_or_else(|| StoreError::NotFound(agent_id.into()))
    }

    fn put(&mut self, agent: Agent) -> Result<(), StoreError> {
        self.data.agents.insert(agent.id.clone(), agent);
        self.flush_or_unavailable()
    }
}

impl IntentRepo for FileStore {
    fn get(&self, intent_id: &str) -> Result<Intent, StoreError> {
        self.data.intents.get(intent_id).cloned().ok_or_else(|| StoreError::NotFound(intent_id.into()))
    }

    fn put(&mut self, intent: Intent) -> Result<(), StoreError> {
        self.data.intents.insert(intent.intent_id.clone(), intent);
        self.flush_or_unavailable()
    }

    fn exists(&self, intent_id: &str) -> Result<bool, StoreError> {
        Ok(self.data.intents.contains_key(intent_id))
    }
}

impl DecisionRepo for FileStore {
    fn get(&self, decision_id: &str) -> Result<Decision, StoreError> {
        self.data.decisions.get(decision_id).cloned().ok_or_else(|| StoreError::NotFound(decision_id.into()))
    }

    fn get_by_intent(&self, intent_id: &str) -> Result<Option<Decision>, StoreError> {
        let Some(decision_id) = self.data.decisions_by_intent.get(intent_id) else {
            return Ok(None);
        };
        self.data.decisions.get(decision_id).cloned().map(Some).ok_or_else(|| StoreError::NotFound(decision_id.clone()))
    }

    fn put(&mut self, decision: Decision) -> Result<(), StoreError> {
        self.data.decisions_by_intent.insert(decision.intent_id.clone(), decision.decision_id.clone());
        self.data.decisions.insert(decision.decision_id.clone(), decision);
        self.flush_or_unavailable()
    }
}

impl TrustProfileRepo for FileStore {
    fn get(&self, agent_id: &str) -> Result<TrustProfile, StoreError> {
        self.data.trust_profiles.get(agent_id).cloned().ok_or_else(|| StoreError::NotFound(agent_id.into()))
    }

    fn compare_and_swap(&mut self, agent_id: &str, expected_version: u64, new_profile: TrustProfile) -> Result<(), StoreError> {
        let current = self.data.trust_profiles.get(agent_id).ok_or_else(|| StoreError::NotFound(agent_id.into()))?;
        if current.version != expected_version {
            return Err(StoreError::VersionConflict { id: agent_id.into(), expected: expected_version, actual: current.version });
        }
        self.data.trust_profiles.insert(agent_id.to_string(), new_profile);
        self.flush_or_unavailable()
    }

    fn put(&mut self, profile: TrustProfile) -> Result<(), StoreError> {
        self.data.trust_profiles.insert(profile.agent_id.clone(), profile);
        self.flush_or_unavailable()
    }
}

impl PolicyBundleRepo for FileStore {
    fn get(&self, bundle_id: &str) -> Result<PolicyBundle, StoreError> {
        self.data.policy_bundles.get(bundle_id).cloned().ok_or_else(|| StoreError::NotFound(bundle_id.into()))
    }

    fn put(&mut self, bundle: PolicyBundle) -> Result<(), StoreError> {
        self.data.policy_bundles.insert(bundle.bundle_id.clone(), bundle);
        self.flush_or_unavailable()
    }

    fn list_enabled(&self) -> Result<Vec<PolicyBundle>, StoreError> {
        Ok(self.data.policy_bundles.values().filter(|b| b.enabled).cloned().collect())
    }
}

impl EventStore for FileStore {
    fn append(&mut self, correlation_id: &str, event_id: &str, record: Vec<u8>) -> Result<(), StoreError> {
        let chain = self.data.event_chains.entry(correlation_id.to_string()).or_default();
        if chain.iter().any(|(id, _)| id == event_id) {
            return Err(StoreError::ChainConflict { correlation_id: correlation_id.into() });
        }
        chain.push((event_id.to_string(), record));
        self.flush_or_unavailable()
    }

    fn stream(&self, correlation_id: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        Ok(self.data.event_chains.get(correlation_id).map(|chain| chain.iter().map(|(_, r)| r.clone()).collect()).unwrap_or_default())
    }

    fn tail(&self, correlation_id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.event_chains.get(correlation_id).and_then(|chain| chain.last()).map(|(_, r)| r.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_governance_core::types::{Dimensions, ObservationTier, OscillationWindow, TrustBand, Timestamp, Weights};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("warden-file-store-test-{}-{}.json", name, std::process::id()))
    }

    fn sample_profile(agent_id: &str) -> TrustProfile {
        TrustProfile {
            profile_id: format!("profile-{agent_id}"),
            agent_id: agent_id.to_string(),
            version: 1,
            dimensions: Dimensions::uniform(50.0),
            weights: Weights::EQUAL,
            composite_score: 500.0,
            observation_tier: ObservationTier::GrayBox,
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
        }
    }

    #[test]
    fn put_then_reopen_round_trips_a_trust_profile() {
        let path = temp_path("roundtrip");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.put(sample_profile("agent-1")).unwrap();
        }
        let reopened = FileStore::open(&path).unwrap();
        let loaded = TrustProfileRepo::get(&reopened, "agent-1").unwrap();
        assert_eq!(loaded.agent_id, "agent-1");
        assert_eq!(loaded.version, 1);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn compare_and_swap_detects_version_conflict() {
        let path = temp_path("cas");
        let mut store = FileStore::open(&path).unwrap();
        store.put(sample_profile("agent-1")).unwrap();
        let mut stale = sample_profile("agent-1");
        stale.version = 2;
        let err = store.compare_and_swap("agent-1", 99, stale).unwrap_err();
        assert_eq!(err, StoreError::VersionConflict { id: "agent-1".to_string(), expected: 99, actual: 1 });
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn event_store_rejects_duplicate_event_id_across_reopen() {
        let path = temp_path("events");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.append("corr-1", "evt-1", b"a".to_vec()).unwrap();
        }
        let mut reopened = FileStore::open(&path).unwrap();
        let err = reopened.append("corr-1", "evt-1", b"b".to_vec()).unwrap_err();
        assert_eq!(err, StoreError::ChainConflict { correlation_id: "corr-1".to_string() });
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_opens_as_empty_snapshot() {
        let path = temp_path("missing");
        std::fs::remove_file(&path).ok();
        let store = FileStore::open(&path).unwrap();
        assert!(AgentRepo::get(&store, "nobody").is_err());
    }
}
