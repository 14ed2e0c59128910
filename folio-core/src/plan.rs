//! Subscription plan catalog entries.
//!
//! Plans are read-only at runtime from this core's perspective: they are
//! seeded administratively (or by the provisioning baseline) and looked
//! up by slug. A plan carries a boolean feature map and an integer limit
//! map; `None` in the limit map means unlimited.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(pub String);

impl PlanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlanId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlanId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Well-known feature flag keys.
pub mod features {
    pub const CUSTOM_DOMAIN: &str = "custom_domain";
    pub const ANALYTICS: &str = "analytics";
    pub const REMOVE_BRANDING: &str = "remove_branding";
}

/// Well-known limit keys.
pub mod limits {
    pub const MAX_PORTFOLIOS: &str = "max_portfolios";
    pub const MAX_STORAGE_MB: &str = "max_storage_mb";
}

/// A subscription tier: feature flags, usage limits, display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    /// Unique, e.g. `free`, `pro`.
    pub slug: String,
    pub name: String,
    /// Recurring price; zero marks the free tier.
    pub price_cents: i64,
    /// Flag key -> enabled. A key absent here is treated as disabled.
    pub features: HashMap<String, bool>,
    /// Limit key -> cap. `None` means unlimited; an absent key means no
    /// limit was recorded, which is NOT the same as unlimited.
    pub limits: HashMap<String, Option<i64>>,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    pub fn new(slug: impl Into<String>, name: impl Into<String>, price_cents: i64) -> Self {
        Self {
            id: PlanId::new(),
            slug: slug.into(),
            name: name.into(),
            price_cents,
            features: HashMap::new(),
            limits: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_feature(mut self, key: impl Into<String>, enabled: bool) -> Self {
        self.features.insert(key.into(), enabled);
        self
    }

    pub fn with_limit(mut self, key: impl Into<String>, cap: Option<i64>) -> Self {
        self.limits.insert(key.into(), cap);
        self
    }
}
