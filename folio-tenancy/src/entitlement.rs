//! Plan entitlement evaluation.
//!
//! Answers "is feature X enabled" and "is usage Y within limit Z" without
//! the caller knowing plan internals. Everything unrecorded resolves
//! conservatively: a missing feature flag is disabled, and a missing
//! limit key falls back to the configured baseline cap rather than to
//! unlimited. These checks never error.

use std::collections::HashMap;

use folio_core::config::FolioConfigSnapshot;
use folio_core::plan::Plan;

use crate::catalog::free_plan_baseline;

/// Config key prefix for per-limit fallback overrides.
const FALLBACK_LIMIT_PREFIX: &str = "entitlement.fallback_limit.";

/// Stateless-per-plan evaluator, constructed once and shared.
///
/// The fallback table covers limit keys a plan does not record. It is
/// seeded from the free-plan baseline so that a plan missing, say,
/// `max_portfolios` behaves like the free tier for that limit instead of
/// granting unlimited use. An unknown key resolves to a cap of zero.
#[derive(Debug, Clone)]
pub struct EntitlementEvaluator {
    fallback_limits: HashMap<String, i64>,
}

impl EntitlementEvaluator {
    /// Evaluator with the baseline fallback table.
    pub fn new() -> Self {
        let fallback_limits = free_plan_baseline()
            .limits
            .into_iter()
            .filter_map(|(key, cap)| cap.map(|c| (key, c)))
            .collect();
        Self { fallback_limits }
    }

    /// Evaluator with `entitlement.fallback_limit.<key>` config overrides
    /// applied on top of the baseline.
    pub fn with_config(config: &FolioConfigSnapshot) -> Self {
        let mut evaluator = Self::new();
        let keys: Vec<String> = evaluator.fallback_limits.keys().cloned().collect();
        for key in keys {
            if let Some(cap) = config.get_i64(&format!("{}{}", FALLBACK_LIMIT_PREFIX, key)) {
                evaluator.fallback_limits.insert(key, cap);
            }
        }
        evaluator
    }

    /// Whether the plan enables a feature flag. Missing keys are `false`:
    /// absence of a flag must never be read as "enabled".
    pub fn has_feature(&self, plan: &Plan, feature_key: &str) -> bool {
        plan.features.get(feature_key).copied().unwrap_or(false)
    }

    /// The plan's cap for a limit key. `None` means unlimited.
    ///
    /// A key the plan does not record resolves through the fallback
    /// table, and to zero when unknown there too.
    pub fn get_limit(&self, plan: &Plan, limit_key: &str) -> Option<i64> {
        match plan.limits.get(limit_key) {
            Some(cap) => *cap,
            None => Some(self.fallback_limits.get(limit_key).copied().unwrap_or(0)),
        }
    }

    /// Whether one more unit of usage is allowed.
    ///
    /// Strict less-than: a limit of N admits at most N items, so usage N
    /// forbids creating the (N+1)th.
    pub fn within_limit(&self, plan: &Plan, limit_key: &str, current_usage: i64) -> bool {
        match self.get_limit(plan, limit_key) {
            None => true,
            Some(cap) => current_usage < cap,
        }
    }

    /// True iff the plan's recurring price is exactly zero.
    pub fn is_free_plan(&self, plan: &Plan) -> bool {
        plan.price_cents == 0
    }
}

impl Default for EntitlementEvaluator {
    fn default() -> Self {
        Self::new()
    }
}
