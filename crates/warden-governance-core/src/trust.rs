// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Multi-dimensional trust scoring.
//!
//! [`TrustManager`] owns the full lifecycle of a [`TrustProfile`]:
//!
//! * [`snapshot`](TrustManager::snapshot) — read the current profile,
//!   applying lazy time decay first.
//! * [`ingest_evidence`](TrustManager::ingest_evidence) — apply a single
//!   piece of [`TrustEvidence`] to one dimension, producing a
//!   [`TrustDelta`].
//! * [`commit_outcome`](TrustManager::commit_outcome) — translate an
//!   execution outcome into evidence, deferred by its
//!   [`RiskProfile`] window when the outcome is a gain.
//! * [`reinstate`](TrustManager::reinstate) — clear a circuit-broken
//!   profile given a signed [`TrustReinstatement`].
//!
//! Trust never moves on its own initiative — every mutation is triggered by
//! evidence the caller supplies. There is no background job, timer, or
//! global mutable state; decay and cooldown resolution happen inline the
//! next time the profile is read or mutated.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use libm::{exp, log};

use crate::config::{BandingConfig, Config, DecayConfig, TrustDynamicsConfig};
use crate::error::EngineError;
use crate::storage::TrustProfileRepo;
use crate::types::{
    DimensionKey, Dimensions, ExecutionStatus, Id, PendingGain, RiskProfile, Timestamp, TrustBand,
    TrustDelta, TrustEvidence, TrustProfile, TrustReinstatement,
};

/// Computes and mutates [`TrustProfile`]s against a [`TrustProfileRepo`].
pub struct TrustManager<'a, R: TrustProfileRepo> {
    config: &'a Config,
    repo: R,
}

impl<'a, R: TrustProfileRepo> TrustManager<'a, R> {
    pub fn new(config: &'a Config, repo: R) -> Self {
        Self { config, repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// Read the current trust profile, applying lazy time decay and
    /// resolving any pending gains that have come due. Persists the result
    /// only if something actually changed.
    pub fn snapshot(&mut self, agent_id: &str, now: Timestamp) -> Result<TrustProfile, EngineError> {
        let profile = self.repo.get(agent_id)?;
        let expected_version = profile.version;
        let (mut recomputed, changed) = self.apply_decay_and_pending(profile, now);
        if changed {
            recomputed.version = expected_version + 1;
            self.repo.compare_and_swap(agent_id, expected_version, recomputed.clone())?;
        }
        Ok(recomputed)
    }

    /// Apply a single piece of evidence to one dimension, recompute the
    /// composite/adjusted score and band, and persist the result.
    pub fn ingest_evidence(
        &mut self,
        agent_id: &str,
        evidence: TrustEvidence,
        correlation_id: Option<Id>,
        now: Timestamp,
    ) -> Result<TrustDelta, EngineError> {
        let profile = self.repo.get(agent_id)?;
        let (mut profile, _) = self.apply_decay_and_pending(profile, now);

        let previous_dimensions = profile.dimensions;
        let previous_composite = profile.composite_score;
        let previous_adjusted = profile.adjusted_score;
        let previous_band = profile.band;

        let dyn_cfg = &self.config.trust_dynamics;
        let dimension = evidence.dimension;
        let current = profile.dimensions.get(dimension);

        if evidence.impact >= 0.0 {
            if let Some(cooldown_until) = profile.cooldown_until {
                if now < cooldown_until {
                    profile.pending_gains.push(PendingGain {
                        dimension,
                        raw_delta: evidence.impact,
                        recorded_at: now,
                        due_at: cooldown_until,
                        correlation_id: correlation_id.clone(),
                        diminished: true,
                    });
                } else {
                    let new_value = apply_gain(current, evidence.impact, dyn_cfg.gain_rate);
                    profile.dimensions.set(dimension, new_value);
                    profile.cooldown_until = None;
                }
            } else {
                let new_value = apply_gain(current, evidence.impact, dyn_cfg.gain_rate);
                profile.dimensions.set(dimension, new_value);
            }
            record_direction(&mut profile, dimension, true, now, dyn_cfg);
        } else {
            let penalty = consume_reversal_penalty(&mut profile, dimension, now, dyn_cfg);
            let effective_impact = evidence.impact * penalty;
            let new_value = apply_loss(current, effective_impact, dyn_cfg.loss_rate);
            profile.dimensions.set(dimension, new_value);
            profile.cooldown_until = Some(now.plus_millis(dyn_cfg.cooldown_hours * 3_600_000));
            profile.last_drop_at = Some(now);
            record_direction(&mut profile, dimension, false, now, dyn_cfg);
        }

        profile.evidence.push(evidence.clone());
        if profile.evidence.len() > 50 {
            let overflow = profile.evidence.len() - 50;
            profile.evidence.drain(0..overflow);
        }

        self.recompute_and_band(&mut profile, now);

        if profile.adjusted_score < dyn_cfg.circuit_breaker_threshold {
            profile.circuit_broken = true;
        }

        let explanation = format!(
            "evidence {:?} on {:?}: impact {:.2} -> dimension {:.2}",
            evidence.evidence_id,
            dimension,
            evidence.impact,
            profile.dimensions.get(dimension)
        );

        let delta = TrustDelta {
            delta_id: format!("delta-{}-{}", agent_id, now.as_millis()),
            agent_id: agent_id.to_string(),
            previous_dimensions,
            new_dimensions: profile.dimensions,
            previous_composite,
            new_composite: profile.composite_score,
            previous_adjusted,
            new_adjusted: profile.adjusted_score,
            previous_band,
            new_band: profile.band,
            reason: "evidence_ingested".to_string(),
            correlation_id,
            triggering_evidence: alloc::vec![evidence.evidence_id],
            explanation,
            occurred_at: now,
        };

        let version = profile.version;
        profile.version = version + 1;
        self.repo.compare_and_swap(agent_id, version, profile)?;

        Ok(delta)
    }

    /// Translate an execution outcome into [`TrustEvidence`] on `dimension`
    /// and apply it. Favorable outcomes in a non-immediate [`RiskProfile`]
    /// window are recorded as pending gains due at the window's close
    /// rather than being applied immediately, at full value (this deferral
    /// is not the cooldown penalty), so a later unfavorable outcome sharing
    /// `correlation_id` can still cancel them before they resolve. An
    /// unfavorable outcome always first cancels any pending gain still on
    /// file for the same `correlation_id`.
    pub fn commit_outcome(
        &mut self,
        agent_id: &str,
        dimension: DimensionKey,
        status: ExecutionStatus,
        base_impact: f64,
        risk_profile: RiskProfile,
        correlation_id: Option<Id>,
        now: Timestamp,
    ) -> Result<TrustDelta, EngineError> {
        let is_favorable = matches!(status, ExecutionStatus::Success);
        let impact = if is_favorable { base_impact.abs() } else { -base_impact.abs() };

        if is_favorable && !matches!(risk_profile, RiskProfile::Immediate) {
            let profile = self.repo.get(agent_id)?;
            let (mut profile, _) = self.apply_decay_and_pending(profile, now);
            let previous = profile.clone();
            profile.pending_gains.push(PendingGain {
                dimension,
                raw_delta: impact,
                recorded_at: now,
                due_at: now.plus_millis(risk_profile.window_ms()),
                correlation_id: correlation_id.clone(),
                diminished: false,
            });
            let version = profile.version;
            profile.version = version + 1;
            self.repo.compare_and_swap(agent_id, version, profile.clone())?;
            return Ok(TrustDelta {
                delta_id: format!("delta-{}-{}-deferred", agent_id, now.as_millis()),
                agent_id: agent_id.to_string(),
                previous_dimensions: previous.dimensions,
                new_dimensions: profile.dimensions,
                previous_composite: previous.composite_score,
                new_composite: profile.composite_score,
                previous_adjusted: previous.adjusted_score,
                new_adjusted: profile.adjusted_score,
                previous_band: previous.band,
                new_band: profile.band,
                reason: "outcome_deferred".to_string(),
                correlation_id,
                triggering_evidence: Vec::new(),
                explanation: format!(
                    "favorable outcome deferred until {} ({:?} window)",
                    now.plus_millis(risk_profile.window_ms()).as_millis(),
                    risk_profile
                ),
                occurred_at: now,
            });
        }

        if !is_favorable {
            if let Some(corr) = correlation_id.as_ref() {
                self.cancel_pending_gain(agent_id, corr)?;
            }
        }

        let evidence = TrustEvidence {
            evidence_id: format!("evidence-outcome-{}-{}", agent_id, now.as_millis()),
            dimension,
            impact,
            source: "execution_outcome".to_string(),
            collected_at: now,
            expires_at: None,
            metadata: Some(format!("{status:?}")),
        };
        self.ingest_evidence(agent_id, evidence, correlation_id, now)
    }

    /// Remove any pending gain on `agent_id`'s profile whose `correlation_id`
    /// matches `correlation_id`, superseding it with the unfavorable outcome
    /// that arrived for the same correlation before the gain's window closed.
    /// A no-op if no such pending gain exists.
    fn cancel_pending_gain(&mut self, agent_id: &str, correlation_id: &str) -> Result<(), EngineError> {
        let mut profile = self.repo.get(agent_id)?;
        let before = profile.pending_gains.len();
        profile.pending_gains.retain(|g| g.correlation_id.as_deref() != Some(correlation_id));
        if profile.pending_gains.len() == before {
            return Ok(());
        }
        let version = profile.version;
        profile.version = version + 1;
        self.repo.compare_and_swap(agent_id, version, profile)?;
        Ok(())
    }

    /// Clear a circuit-broken profile given a signed reinstatement. Does
    /// not otherwise alter the profile's dimensions — trust is restored to
    /// the score it would already have, not reset to a default.
    pub fn reinstate(
        &mut self,
        reinstatement: TrustReinstatement,
        now: Timestamp,
    ) -> Result<TrustDelta, EngineError> {
        let agent_id = reinstatement.agent_id.clone();
        let profile = self.repo.get(&agent_id)?;
        let (mut profile, _) = self.apply_decay_and_pending(profile, now);
        let previous_band = profile.band;
        let previous_adjusted = profile.adjusted_score;
        let previous_dimensions = profile.dimensions;
        let previous_composite = profile.composite_score;

        profile.circuit_broken = false;

        let delta = TrustDelta {
            delta_id: format!("delta-{}-{}-reinstate", agent_id, now.as_millis()),
            agent_id: agent_id.clone(),
            previous_dimensions,
            new_dimensions: profile.dimensions,
            previous_composite,
            new_composite: profile.composite_score,
            previous_adjusted,
            new_adjusted: profile.adjusted_score,
            previous_band,
            new_band: profile.band,
            reason: format!("reinstated_by:{}", reinstatement.authorized_by),
            correlation_id: None,
            triggering_evidence: Vec::new(),
            explanation: reinstatement.reason,
            occurred_at: now,
        };

        let version = profile.version;
        profile.version = version + 1;
        self.repo.compare_and_swap(&agent_id, version, profile)?;
        Ok(delta)
    }

    /// Apply continuous per-dimension decay and resolve any pending gains
    /// whose due time has passed. Returns the possibly-updated profile and
    /// whether anything actually changed (so callers can skip a write).
    fn apply_decay_and_pending(&self, mut profile: TrustProfile, now: Timestamp) -> (TrustProfile, bool) {
        let mut changed = false;
        let decay_cfg = &self.config.decay;
        let elapsed_days = profile.calculated_at.days_until(now);
        if elapsed_days > 0.0 {
            let factor = exp(-decay_cfg.rate_per_day * elapsed_days);
            if (factor - 1.0).abs() > f64::EPSILON {
                let mut dims = profile.dimensions;
                for (key, value) in dims.iter() {
                    dims.set(key, (value * factor).clamp(0.0, 100.0));
                }
                profile.dimensions = dims;
                changed = true;
            }
        }

        if let Some(cooldown_until) = profile.cooldown_until {
            if now >= cooldown_until {
                profile.cooldown_until = None;
                changed = true;
            }
        }

        let (due, still_pending): (Vec<PendingGain>, Vec<PendingGain>) =
            core::mem::take(&mut profile.pending_gains).into_iter().partition(|g| now.as_millis() >= g.due_at.as_millis());
        profile.pending_gains = still_pending;
        if !due.is_empty() {
            changed = true;
            let gain_rate = self.config.trust_dynamics.gain_rate;
            for pending in due {
                let applied = if pending.diminished { pending.raw_delta * 0.5 } else { pending.raw_delta };
                let current = profile.dimensions.get(pending.dimension);
                let new_value = apply_gain(current, applied, gain_rate);
                profile.dimensions.set(pending.dimension, new_value);
            }
        }

        if changed {
            profile.calculated_at = now;
            self.recompute_and_band(&mut profile, now);
        }
        (profile, changed)
    }

    /// Recompute `composite_score`/`adjusted_score` from `dimensions` and
    /// resolve the banding transition with hysteresis and promotion delay.
    fn recompute_and_band(&self, profile: &mut TrustProfile, now: Timestamp) {
        let composite = compute_composite(&profile.dimensions, &profile.weights);
        let ceiling = self.config.observation.ceiling(profile.observation_tier);
        let adjusted = composite.min(ceiling);

        profile.composite_score = composite;
        profile.adjusted_score = adjusted;
        profile.calculated_at = now;

        let new_band = resolve_band(profile.band, adjusted, &self.config.banding, profile.last_demotion_at, now);
        if new_band < profile.band {
            profile.last_demotion_at = Some(now);
        }
        profile.band = new_band;
    }
}

/// `composite = round(10 · Σ_k dim_k · w_k, 2)`, using round-half-to-even.
pub fn compute_composite(dimensions: &Dimensions, weights: &crate::types::Weights) -> f64 {
    let raw = 10.0
        * (dimensions.ct * weights.ct
            + dimensions.bt * weights.bt
            + dimensions.gt * weights.gt
            + dimensions.xt * weights.xt
            + dimensions.ac * weights.ac);
    round_half_even_2(raw)
}

fn round_half_even_2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let floor = scaled.floor();
    let diff = scaled - floor;
    let rounded = if (diff - 0.5).abs() < 1e-9 {
        if (floor as i64) % 2 == 0 { floor } else { floor + 1.0 }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// `x ← clamp(x + gainRate · δ · ln(1 + (100 − x)), 0, 100)`.
fn apply_gain(x: f64, delta: f64, gain_rate: f64) -> f64 {
    let headroom = (100.0 - x).max(0.0);
    (x + gain_rate * delta * log(1.0 + headroom)).clamp(0.0, 100.0)
}

/// `x ← clamp(x + lossRate · δ, 0, 100)`, `δ` already negative.
fn apply_loss(x: f64, delta: f64, loss_rate: f64) -> f64 {
    (x + loss_rate * delta).clamp(0.0, 100.0)
}

/// Record a gain/loss direction for `dimension` and prune the window to
/// `oscillation_window_hours`.
fn record_direction(
    profile: &mut TrustProfile,
    dimension: DimensionKey,
    was_gain: bool,
    now: Timestamp,
    cfg: &TrustDynamicsConfig,
) {
    let window_ms = cfg.oscillation_window_hours * 3_600_000;
    profile.oscillation_window.entries.push((dimension, was_gain, now));
    profile.oscillation_window.entries.retain(|(_, _, at)| now.as_millis().saturating_sub(at.as_millis()) <= window_ms);
}

/// Count direction changes for `dimension` within the current window and,
/// if the oscillation threshold has just been reached by this evaluation,
/// return the reversal penalty multiplier to apply to the *next* loss;
/// otherwise return `1.0`.
///
/// Consuming the penalty resets the tracked changes for `dimension` so the
/// same oscillation cannot trigger the penalty twice.
fn consume_reversal_penalty(
    profile: &mut TrustProfile,
    dimension: DimensionKey,
    now: Timestamp,
    cfg: &TrustDynamicsConfig,
) -> f64 {
    let window_ms = cfg.oscillation_window_hours * 3_600_000;
    let relevant: Vec<bool> = profile
        .oscillation_window
        .entries
        .iter()
        .filter(|(d, _, at)| *d == dimension && now.as_millis().saturating_sub(at.as_millis()) <= window_ms)
        .map(|(_, gain, _)| *gain)
        .collect();

    let mut changes = 0u32;
    for window in relevant.windows(2) {
        if window[0] != window[1] {
            changes += 1;
        }
    }

    if changes + 1 >= cfg.oscillation_threshold {
        profile.oscillation_window.entries.retain(|(d, _, _)| *d != dimension);
        cfg.reversal_penalty_multiplier
    } else {
        1.0
    }
}

/// Resolve the new band given hysteresis and the promotion-delay rule.
/// Demotions apply immediately once the score overshoots the lower
/// boundary by `hysteresis` points; promotions additionally require
/// `promotion_delay_days` to have elapsed since the last demotion.
fn resolve_band(
    current: TrustBand,
    adjusted: f64,
    cfg: &BandingConfig,
    last_demotion_at: Option<Timestamp>,
    now: Timestamp,
) -> TrustBand {
    let target = TrustBand::for_score(adjusted);
    if target == current {
        return current;
    }

    let (current_min, current_max) = current.default_bounds();
    let overshoot = if target > current { adjusted - current_max } else { current_min - adjusted };
    if overshoot < cfg.hysteresis {
        return current;
    }

    if target > current {
        if let Some(demoted_at) = last_demotion_at {
            let elapsed_days = demoted_at.days_until(now);
            if elapsed_days < cfg.promotion_delay_days {
                return current;
            }
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryTrustProfileRepo;
    use crate::types::{ObservationTier, OscillationWindow, Weights};

    fn fresh_profile(agent_id: &str) -> TrustProfile {
        TrustProfile {
            profile_id: format!("profile-{agent_id}"),
            agent_id: agent_id.to_string(),
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
        }
    }

    #[test]
    fn composite_is_ten_times_weighted_dimension_average() {
        let dims = Dimensions { ct: 80.0, bt: 80.0, gt: 75.0, xt: 60.0, ac: 70.0 };
        let composite = compute_composite(&dims, &Weights::EQUAL);
        // Equal weighting: composite = 10 * mean(dims) = 10 * 73 = 730.
        assert!((composite - 730.0).abs() < 0.01, "got {composite}");
    }

    #[test]
    fn observation_ceiling_caps_perfect_dimensions() {
        let dims = Dimensions::uniform(100.0);
        let composite = compute_composite(&dims, &Weights::EQUAL);
        assert!((composite - 1000.0).abs() < 0.01);
        let adjusted = composite.min(ObservationTier::BlackBox.default_ceiling());
        assert_eq!(adjusted, 600.0);
        assert_eq!(TrustBand::for_score(adjusted), TrustBand::T3);
    }

    #[test]
    fn asymmetric_dynamics_loss_outweighs_gain() {
        let gained = apply_gain(50.0, 20.0, 0.01);
        assert!((gained - 50.786).abs() < 0.01, "got {gained}");
        let lost = apply_loss(gained, -20.0, 0.10);
        assert!((lost - 48.786).abs() < 0.01, "got {lost}");
        assert!((50.0 - lost).abs() > (gained - 50.0).abs());
    }

    #[test]
    fn gain_is_deferred_during_cooldown_then_diminished() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        let mut profile = fresh_profile("agent-1");
        profile.dimensions.ct = 50.0;
        repo.put(profile).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        let loss = TrustEvidence {
            evidence_id: "ev-loss".to_string(),
            dimension: DimensionKey::Ct,
            impact: -20.0,
            source: "test".to_string(),
            collected_at: Timestamp::from_millis(0),
            expires_at: None,
            metadata: None,
        };
        manager.ingest_evidence("agent-1", loss, None, Timestamp::from_millis(0)).unwrap();
        assert!(manager.repo().get("agent-1").unwrap().cooldown_until.is_some());

        let gain = TrustEvidence {
            evidence_id: "ev-gain".to_string(),
            dimension: DimensionKey::Ct,
            impact: 10.0,
            source: "test".to_string(),
            collected_at: Timestamp::from_millis(1_000),
            expires_at: None,
            metadata: None,
        };
        let before = manager.repo().get("agent-1").unwrap().dimensions.ct;
        manager.ingest_evidence("agent-1", gain, None, Timestamp::from_millis(1_000)).unwrap();
        let after = manager.repo().get("agent-1").unwrap().dimensions.ct;
        assert_eq!(before, after, "gain during cooldown must not apply immediately");
        assert_eq!(manager.repo().get("agent-1").unwrap().pending_gains.len(), 1);

        let far_future = Timestamp::from_millis(200 * 3_600_000);
        let profile = manager.snapshot("agent-1", far_future).unwrap();
        assert!(profile.dimensions.ct > after, "pending gain should apply once cooldown elapses");
        assert!(profile.pending_gains.is_empty());
    }

    #[test]
    fn favorable_outcome_is_deferred_until_its_risk_profile_window_closes() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        repo.put(fresh_profile("agent-5")).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        let before = manager.repo().get("agent-5").unwrap().dimensions.ct;
        manager
            .commit_outcome(
                "agent-5",
                DimensionKey::Ct,
                ExecutionStatus::Success,
                10.0,
                RiskProfile::ShortTerm,
                Some("corr-1".to_string()),
                Timestamp::from_millis(0),
            )
            .unwrap();
        let after = manager.repo().get("agent-5").unwrap().dimensions.ct;
        assert_eq!(before, after, "favorable non-immediate outcome must not apply immediately");
        assert_eq!(manager.repo().get("agent-5").unwrap().pending_gains.len(), 1);

        // A snapshot taken before the ShortTerm window (4h) closes must not resolve it.
        let still_open = Timestamp::from_millis(3 * 3_600_000);
        let profile = manager.snapshot("agent-5", still_open).unwrap();
        assert_eq!(profile.dimensions.ct, after, "gain must not resolve before its window closes");
        assert_eq!(profile.pending_gains.len(), 1);

        // Once the window has closed, the gain resolves at full value (not halved —
        // the agent was never in cooldown).
        let window_closed = Timestamp::from_millis(RiskProfile::ShortTerm.window_ms() + 1);
        let profile = manager.snapshot("agent-5", window_closed).unwrap();
        assert!(profile.pending_gains.is_empty());
        let full_gain = apply_gain(after, 10.0, config.trust_dynamics.gain_rate);
        assert!((profile.dimensions.ct - full_gain).abs() < 0.01, "got {}", profile.dimensions.ct);
    }

    #[test]
    fn unfavorable_outcome_cancels_a_pending_gain_for_the_same_correlation() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        repo.put(fresh_profile("agent-6")).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        manager
            .commit_outcome(
                "agent-6",
                DimensionKey::Ct,
                ExecutionStatus::Success,
                10.0,
                RiskProfile::ShortTerm,
                Some("corr-shared".to_string()),
                Timestamp::from_millis(0),
            )
            .unwrap();
        assert_eq!(manager.repo().get("agent-6").unwrap().pending_gains.len(), 1);
        let before_reversal = manager.repo().get("agent-6").unwrap().dimensions.ct;

        // A failure on the same correlation, reported before the window closes,
        // cancels the provisional gain instead of letting it resolve later.
        manager
            .commit_outcome(
                "agent-6",
                DimensionKey::Ct,
                ExecutionStatus::Failure,
                15.0,
                RiskProfile::ShortTerm,
                Some("corr-shared".to_string()),
                Timestamp::from_millis(1_000),
            )
            .unwrap();
        assert!(manager.repo().get("agent-6").unwrap().pending_gains.is_empty());

        let window_closed = Timestamp::from_millis(RiskProfile::ShortTerm.window_ms() + 1);
        let profile = manager.snapshot("agent-6", window_closed).unwrap();
        assert!(profile.dimensions.ct < before_reversal, "only the loss should have applied");
    }

    #[test]
    fn oscillation_triggers_reversal_penalty_on_third_change() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        repo.put(fresh_profile("agent-2")).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        let mut t = 0u64;
        let mut push = |impact: f64, manager: &mut TrustManager<InMemoryTrustProfileRepo>, t: &mut u64| {
            let ev = TrustEvidence {
                evidence_id: format!("ev-{t}"),
                dimension: DimensionKey::Bt,
                impact,
                source: "test".to_string(),
                collected_at: Timestamp::from_millis(*t),
                expires_at: None,
                metadata: None,
            };
            manager.ingest_evidence("agent-2", ev, None, Timestamp::from_millis(*t)).unwrap();
            *t += 1_000;
        };

        // loss, gain, loss, gain, loss — the final loss is the one that
        // should receive the 2.0x reversal penalty (three direction changes
        // precede it: loss->gain, gain->loss, loss->gain).
        push(-10.0, &mut manager, &mut t);
        push(10.0, &mut manager, &mut t);
        push(-10.0, &mut manager, &mut t);
        push(10.0, &mut manager, &mut t);
        let before = manager.repo().get("agent-2").unwrap().dimensions.bt;
        push(-10.0, &mut manager, &mut t);
        let after = manager.repo().get("agent-2").unwrap().dimensions.bt;
        let penalized_drop = before - after;
        assert!((penalized_drop - 2.0).abs() < 0.01, "expected 2x loss of 1.0, got {penalized_drop}");
    }

    #[test]
    fn circuit_breaker_engages_below_threshold() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        let mut profile = fresh_profile("agent-3");
        profile.dimensions = Dimensions::uniform(5.0);
        profile.composite_score = 50.0;
        profile.adjusted_score = 50.0;
        repo.put(profile).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        let ev = TrustEvidence {
            evidence_id: "ev-tiny".to_string(),
            dimension: DimensionKey::Ct,
            impact: 0.01,
            source: "test".to_string(),
            collected_at: Timestamp::from_millis(0),
            expires_at: None,
            metadata: None,
        };
        manager.ingest_evidence("agent-3", ev, None, Timestamp::from_millis(0)).unwrap();
        assert!(manager.repo().get("agent-3").unwrap().circuit_broken);
    }

    #[test]
    fn reinstate_clears_circuit_broken_flag() {
        let config = Config::default();
        let mut repo = InMemoryTrustProfileRepo::new();
        let mut profile = fresh_profile("agent-4");
        profile.circuit_broken = true;
        repo.put(profile).unwrap();
        let mut manager = TrustManager::new(&config, repo);

        let reinstatement = TrustReinstatement {
            agent_id: "agent-4".to_string(),
            authorized_by: "security-lead".to_string(),
            reason: "manual review passed".to_string(),
            signed_at: Timestamp::from_millis(0),
            signature: None,
        };
        manager.reinstate(reinstatement, Timestamp::from_millis(0)).unwrap();
        assert!(!manager.repo().get("agent-4").unwrap().circuit_broken);
    }

    #[test]
    fn hysteresis_suppresses_small_boundary_crossings() {
        let cfg = BandingConfig::default();
        // T2 upper bound is 550; overshoot of 10 < hysteresis(30) should not move the band.
        let band = resolve_band(TrustBand::T2, 560.0, &cfg, None, Timestamp::from_millis(0));
        assert_eq!(band, TrustBand::T2);
        // Overshoot of 40 > hysteresis(30) should move the band.
        let band = resolve_band(TrustBand::T2, 590.0, &cfg, None, Timestamp::from_millis(0));
        assert_eq!(band, TrustBand::T3);
    }

    #[test]
    fn promotion_delay_blocks_promotion_shortly_after_demotion() {
        let cfg = BandingConfig::default();
        let demoted_at = Timestamp::from_millis(0);
        let one_day_later = Timestamp::from_millis(86_400_000);
        let band = resolve_band(TrustBand::T1, 460.0, &cfg, Some(demoted_at), one_day_later);
        assert_eq!(band, TrustBand::T1, "promotion should be blocked before promotion_delay_days elapses");

        let eight_days_later = Timestamp::from_millis(8 * 86_400_000);
        let band = resolve_band(TrustBand::T1, 460.0, &cfg, Some(demoted_at), eight_days_later);
        assert_eq!(band, TrustBand::T2, "promotion should succeed once promotion_delay_days has elapsed");
    }
}
