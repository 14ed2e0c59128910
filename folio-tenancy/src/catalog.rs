//! Read-only plan catalog.
//!
//! Plans are seeded administratively; at runtime this core only ever
//! looks them up by slug. The one exception is the free-plan baseline,
//! which provisioning seeds itself when a deployment has never been
//! configured.

use std::collections::HashMap;
use std::sync::Arc;

use folio_core::plan::{features, limits, Plan};

use crate::error::{TenancyError, TenancyResult};

/// Slug of the plan assigned to newly provisioned tenants unless
/// configured otherwise.
pub const DEFAULT_PLAN_SLUG: &str = "free";

/// The hard-coded default plan: zero price, no paid features, and the
/// baseline limits every unconfigured deployment starts with.
pub fn free_plan_baseline() -> Plan {
    Plan::new(DEFAULT_PLAN_SLUG, "Free", 0)
        .with_feature(features::CUSTOM_DOMAIN, false)
        .with_feature(features::ANALYTICS, false)
        .with_feature(features::REMOVE_BRANDING, false)
        .with_limit(limits::MAX_PORTFOLIOS, Some(3))
        .with_limit(limits::MAX_STORAGE_MB, Some(100))
}

/// An immutable slug -> plan map, built once and shared.
#[derive(Debug, Clone, Default)]
pub struct PlanCatalog {
    plans: Arc<HashMap<String, Plan>>,
}

impl PlanCatalog {
    pub fn new(plans: impl IntoIterator<Item = Plan>) -> Self {
        let map = plans
            .into_iter()
            .map(|p| (p.slug.clone(), p))
            .collect::<HashMap<_, _>>();
        Self { plans: Arc::new(map) }
    }

    pub fn get(&self, slug: &str) -> Option<&Plan> {
        self.plans.get(slug)
    }

    /// Lookup that treats a missing plan as an error.
    pub fn require(&self, slug: &str) -> TenancyResult<&Plan> {
        self.get(slug)
            .ok_or_else(|| TenancyError::PlanNotFound(slug.to_string()))
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(|s| s.as_str())
    }

    /// All catalog plans, e.g. for seeding a store administratively.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.plans.values()
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
