// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Policy bundle resolution and rule evaluation.
//!
//! A deployment may hold many [`PolicyBundle`]s simultaneously — one per
//! domain, environment, or jurisdiction combination. [`PolicyEngine::resolve`]
//! narrows the full set down to the bundles applicable to a given intent;
//! [`PolicyEngine::evaluate`] then walks each bundle's priority-ordered
//! rules, first-match-wins, and composes the results of multiple matching
//! bundles via [`merge_constraints`].
//!
//! Condition matching uses a small dot-path field lookup against a flat
//! JSON evaluation namespace built from the intent, its trust snapshot,
//! and caller-supplied context — deliberately data-driven rather than a
//! compiled expression language, so bundles can be authored and hot-loaded
//! without a Rust release.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde_json::Value;

use crate::types::{
    ActionRestrictions, ActionType, Constraints, DataSensitivity, DenialReason, Effect, Intent,
    Operator, PolicyBundle, PolicyCondition, PolicyRule, TrustBand,
};

/// The input fields a bundle may resolve against.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionKey<'a> {
    pub domain: &'a str,
    pub environment: &'a str,
    pub jurisdictions: &'a [String],
    pub data_sensitivity: DataSensitivity,
}

/// Outcome of evaluating an intent against the resolved bundle set.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyVerdict {
    pub effect: Effect,
    pub constraints: Option<Constraints>,
    pub matched_bundle_ids: Vec<String>,
    pub matched_rule_ids: Vec<String>,
    pub reasoning: Vec<String>,
    /// The specific taxonomy entry behind a `Deny` verdict. `None` when
    /// `effect` is `Permit`.
    pub denial_reason: Option<DenialReason>,
}

/// Stateless evaluator over a caller-supplied set of bundles. The engine
/// itself holds no bundle data — bundles are fetched from a
/// [`crate::storage::PolicyBundleRepo`] by the orchestrator and passed in,
/// keeping this type trivially testable without a storage backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyEngine {
    pub default_effect: Effect,
}

impl PolicyEngine {
    pub fn new(default_effect: Effect) -> Self {
        Self { default_effect }
    }

    /// Narrow `bundles` to those applicable to `key`. A bundle matches when
    /// every non-empty applicability list it declares contains the
    /// corresponding field of `key` — empty lists are wildcards. The
    /// matches are returned in bundle-version descending order, per the
    /// resolution rule: when several bundles apply, the newest-versioned
    /// bundle is evaluated first.
    pub fn resolve<'a>(&self, bundles: &'a [PolicyBundle], key: ResolutionKey<'_>) -> Vec<&'a PolicyBundle> {
        let mut matched: Vec<&'a PolicyBundle> = bundles
            .iter()
            .filter(|b| b.enabled)
            .filter(|b| matches_wildcard_list(&b.applicable_domains, key.domain))
            .filter(|b| matches_wildcard_list(&b.applicable_environments, key.environment))
            .filter(|b| {
                b.jurisdictions.is_empty()
                    || key.jurisdictions.iter().any(|j| b.jurisdictions.iter().any(|bj| bj == j))
            })
            .filter(|b| b.data_classification.is_empty() || b.data_classification.contains(&key.data_sensitivity))
            .collect();
        matched.sort_by(|a, b| parse_semver(&b.version).cmp(&parse_semver(&a.version)));
        matched
    }

    /// Evaluate `intent` against the resolved `bundles`, applying
    /// structural action restrictions first and then priority-ordered
    /// rules within each bundle. Multiple matching bundles compose via
    /// [`merge_constraints`]: any bundle voting `Deny` makes the overall
    /// verdict `Deny` (first-match-wins is scoped per-bundle; across
    /// bundles the stricter verdict always wins).
    pub fn evaluate(&self, intent: &Intent, bundles: &[&PolicyBundle], band: TrustBand) -> PolicyVerdict {
        let mut reasoning = Vec::new();
        let mut matched_bundle_ids = Vec::new();
        let mut matched_rule_ids = Vec::new();
        let mut constraints: Option<Constraints> = None;
        let mut overall_effect = self.default_effect;
        let mut any_bundle_matched = false;
        let mut denial_reason: Option<DenialReason> = None;

        let sensitivity_ceiling = band.max_data_sensitivity();
        if intent.data_sensitivity > sensitivity_ceiling {
            reasoning.push(format!(
                "data sensitivity {:?} exceeds the {:?} ceiling permitted for trust band {:?}",
                intent.data_sensitivity, sensitivity_ceiling, band
            ));
            return PolicyVerdict {
                effect: Effect::Deny,
                constraints: None,
                matched_bundle_ids,
                matched_rule_ids,
                reasoning,
                denial_reason: Some(DenialReason::DataSensitivityExceeded),
            };
        }

        for bundle in bundles {
            if let Some(restriction_denial) = check_action_restrictions(&bundle.action_restrictions, intent, band) {
                reasoning.push(restriction_denial);
                matched_bundle_ids.push(bundle.bundle_id.clone());
                return PolicyVerdict {
                    effect: Effect::Deny,
                    constraints: None,
                    matched_bundle_ids,
                    matched_rule_ids,
                    reasoning,
                    denial_reason: Some(DenialReason::PolicyViolation),
                };
            }

            let mut ordered: Vec<&PolicyRule> = bundle.rules.iter().filter(|r| r.enabled).collect();
            ordered.sort_by_key(|r| r.priority);

            let mut bundle_effect = bundle.default_effect;
            let mut bundle_matched = false;
            let mut bundle_constraints: Option<Constraints> = None;
            for rule in ordered {
                if rule_matches(rule, intent, band) {
                    bundle_effect = rule.effect;
                    bundle_matched = true;
                    matched_rule_ids.push(rule.rule_id.clone());
                    reasoning.push(format!(
                        "bundle '{}' rule '{}' matched with effect {:?}",
                        bundle.name, rule.rule_id, rule.effect
                    ));
                    bundle_constraints = rule.constraints.clone();
                    break;
                }
            }
            if !bundle_matched {
                reasoning.push(format!(
                    "bundle '{}' had no matching rule; applying bundle default {:?}",
                    bundle.name, bundle.default_effect
                ));
            }

            if bundle_effect == Effect::Permit {
                if let Some(reason) = check_resource_and_quota(&bundle_constraints, intent) {
                    reasoning.push(reason.1);
                    return PolicyVerdict {
                        effect: Effect::Deny,
                        constraints: None,
                        matched_bundle_ids,
                        matched_rule_ids,
                        reasoning,
                        denial_reason: Some(reason.0),
                    };
                }
            }

            constraints = merge_constraints(constraints, bundle_constraints);

            any_bundle_matched = true;
            matched_bundle_ids.push(bundle.bundle_id.clone());
            if bundle_effect == Effect::Deny {
                overall_effect = Effect::Deny;
            } else if overall_effect != Effect::Deny {
                overall_effect = Effect::Permit;
            }
        }

        if !any_bundle_matched {
            reasoning.push(format!("no policy bundle resolved; applying tenant default {:?}", self.default_effect));
            if overall_effect == Effect::Deny {
                denial_reason = Some(DenialReason::ContextMismatch);
            }
        } else if overall_effect == Effect::Deny {
            denial_reason = Some(DenialReason::PolicyViolation);
        }

        PolicyVerdict {
            effect: overall_effect,
            constraints: if overall_effect == Effect::Permit { constraints } else { None },
            matched_bundle_ids,
            matched_rule_ids,
            reasoning,
            denial_reason,
        }
    }
}

fn matches_wildcard_list(list: &[String], value: &str) -> bool {
    list.is_empty() || list.iter().any(|v| v == value)
}

/// Parse a `major.minor.patch` semver string into a comparable tuple.
/// Malformed or missing components default to `0` rather than rejecting
/// the bundle — resolution order degrades gracefully instead of erroring
/// out on a bundle with a non-numeric pre-release suffix.
fn parse_semver(version: &str) -> (u64, u64, u64) {
    let core = version.split(['-', '+']).next().unwrap_or(version);
    let mut parts = core.split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let patch = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor, patch)
}

/// Structural checks applied before rule evaluation. Returns `Some(reason)`
/// if the action is denied outright.
fn check_action_restrictions(restrictions: &ActionRestrictions, intent: &Intent, band: TrustBand) -> Option<String> {
    if restrictions.never_allowed.contains(&intent.action_type) {
        return Some(format!("action type {:?} is in neverAllowed", intent.action_type));
    }
    if restrictions.always_require_approval.contains(&intent.action_type) {
        return Some(format!("action type {:?} always requires human approval", intent.action_type));
    }
    if let Some(allowed) = restrictions.allowed_by_band.get(&band) {
        if !allowed.contains(&intent.action_type) {
            return Some(format!("action type {:?} is not allowed for band {:?}", intent.action_type, band));
        }
    }
    None
}

/// Checks applied once a bundle's rule evaluation lands on `Permit`:
/// the intent's resource scope against the bundle's `data_scopes`
/// allowlist, and the intent's magnitude against any per-action resource
/// quota. Returns `Some((reason, explanation))` when either check fails.
fn check_resource_and_quota(constraints: &Option<Constraints>, intent: &Intent) -> Option<(DenialReason, String)> {
    let constraints = constraints.as_ref()?;

    if !constraints.data_scopes.is_empty()
        && !intent.resource_scope.is_empty()
        && !intent.resource_scope.iter().any(|scope| constraints.data_scopes.contains(scope))
    {
        return Some((
            DenialReason::ResourceRestricted,
            format!(
                "requested resource scope {:?} is outside the permitted data scopes {:?}",
                intent.resource_scope, constraints.data_scopes
            ),
        ));
    }

    if let Some(quotas) = &constraints.resource_quotas {
        if let Some(limit) = quotas.get(&intent.action) {
            let magnitude = intent.magnitude.unwrap_or(0.0);
            if magnitude > *limit {
                return Some((
                    DenialReason::RateLimitExceeded,
                    format!(
                        "intent magnitude {magnitude:.2} for action '{}' exceeds its quota of {limit:.2}",
                        intent.action
                    ),
                ));
            }
        }
    }

    None
}

fn rule_matches(rule: &PolicyRule, intent: &Intent, band: TrustBand) -> bool {
    rule.conditions.iter().all(|c| condition_matches(c, intent, band))
}

fn condition_matches(condition: &PolicyCondition, intent: &Intent, band: TrustBand) -> bool {
    let Some(actual) = resolve_field(&condition.field, intent, band) else {
        return false;
    };
    apply_operator(condition.operator, &actual, &condition.value)
}

/// Resolve a dot-path field against the flattened evaluation namespace.
/// Supported roots: `intent.*`, `trust.*`.
fn resolve_field(field: &str, intent: &Intent, band: TrustBand) -> Option<Value> {
    let mut parts = field.splitn(2, '.');
    let root = parts.next()?;
    let rest = parts.next().unwrap_or("");
    match root {
        "intent" => match rest {
            "action" => Some(Value::String(intent.action.clone())),
            "action_type" => Some(Value::String(format!("{:?}", intent.action_type))),
            "data_sensitivity" => Some(Value::String(format!("{:?}", intent.data_sensitivity))),
            "reversibility" => Some(Value::String(format!("{:?}", intent.reversibility))),
            "domain" => Some(Value::String(intent.domain.clone())),
            "environment" => Some(Value::String(intent.environment.clone())),
            "magnitude" => Some(Value::from(intent.magnitude.unwrap_or(25.0))),
            "resource_scope" => Some(Value::Array(intent.resource_scope.iter().map(|s| Value::String(s.clone())).collect())),
            "jurisdictions" => Some(Value::Array(intent.jurisdictions.iter().map(|s| Value::String(s.clone())).collect())),
            _ => None,
        },
        "trust" => match rest {
            "band" => Some(Value::String(format!("{:?}", band))),
            "adjusted_score" => Some(Value::from(intent.trust_snapshot.adjusted_score)),
            "observation_tier" => Some(Value::String(format!("{:?}", intent.trust_snapshot.observation_tier))),
            _ => None,
        },
        _ => None,
    }
}

fn apply_operator(op: Operator, actual: &Value, expected: &Value) -> bool {
    match op {
        Operator::Equals => actual == expected,
        Operator::NotEquals => actual != expected,
        Operator::Gt => compare_numeric(actual, expected, |a, b| a > b),
        Operator::Lt => compare_numeric(actual, expected, |a, b| a < b),
        Operator::Ge => compare_numeric(actual, expected, |a, b| a >= b),
        Operator::Le => compare_numeric(actual, expected, |a, b| a <= b),
        Operator::In => expected.as_array().map(|arr| arr.contains(actual)).unwrap_or(false),
        Operator::NotIn => expected.as_array().map(|arr| !arr.contains(actual)).unwrap_or(true),
        Operator::Contains => match (actual.as_array(), expected) {
            (Some(arr), v) => arr.contains(v),
            _ => actual.as_str().zip(expected.as_str()).map(|(a, e)| a.contains(e)).unwrap_or(false),
        },
        Operator::Matches => {
            // No regex engine is linked into this crate; "matches" degrades
            // to an exact string comparison on the two operands. Deployments
            // needing real pattern matching should pre-filter the condition
            // field at policy-authoring time.
            actual.as_str() == expected.as_str()
        }
    }
}

fn compare_numeric(actual: &Value, expected: &Value, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Compose two constraint sets conservatively: numeric limits take the
/// minimum, lists are intersected (empty intersections collapse to "no
/// access" rather than erroring), and boolean requirements OR together.
pub fn merge_constraints(a: Option<Constraints>, b: Option<Constraints>) -> Option<Constraints> {
    match (a, b) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only),
        (Some(a), Some(b)) => Some(Constraints {
            required_approvals: union_unique(a.required_approvals, b.required_approvals),
            allowed_tools: intersect(a.allowed_tools, b.allowed_tools),
            data_scopes: intersect(a.data_scopes, b.data_scopes),
            rate_limits: {
                let mut combined = a.rate_limits;
                combined.extend(b.rate_limits);
                combined
            },
            reversibility_required: a.reversibility_required || b.reversibility_required,
            max_execution_time_ms: min_option(a.max_execution_time_ms, b.max_execution_time_ms),
            max_retries: min_option(a.max_retries, b.max_retries),
            resource_quotas: match (a.resource_quotas, b.resource_quotas) {
                (None, None) => None,
                (Some(q), None) | (None, Some(q)) => Some(q),
                (Some(mut qa), Some(qb)) => {
                    for (k, v) in qb {
                        qa.entry(k).and_modify(|existing| *existing = existing.min(v)).or_insert(v);
                    }
                    Some(qa)
                }
            },
        }),
    }
}

fn union_unique(mut a: Vec<String>, b: Vec<String>) -> Vec<String> {
    for item in b {
        if !a.contains(&item) {
            a.push(item);
        }
    }
    a
}

fn intersect(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }
    a.into_iter().filter(|item| b.contains(item)).collect()
}

fn min_option<T: Ord>(a: Option<T>, b: Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
