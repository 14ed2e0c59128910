//! Core multi-tenant types for Folio.
//!
//! A tenant is the unit of isolation: every portfolio, experience entry,
//! and page view belongs to exactly one tenant, and every registered user
//! owns exactly one tenant.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl TenantId {
    /// Generate a new unique tenant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Unique identifier for a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Account-level tenant status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Suspended,
    Cancelled,
}

/// Billing-level subscription status, updated by webhook handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
}

/// Public-page branding, editable from the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Branding {
    pub accent_color: Option<String>,
    pub logo_url: Option<String>,
}

/// The isolation unit: one per registered user.
///
/// The slug is globally unique and serves as the public URL segment;
/// changing it after publication breaks external links, so settings flows
/// should treat it as immutable (a product rule, not enforced here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub custom_domain: Option<String>,
    pub owner_user_id: UserId,
    pub plan_id: crate::plan::PlanId,
    pub status: TenantStatus,
    pub subscription_status: SubscriptionStatus,
    pub subscription_ends_at: Option<DateTime<Utc>>,
    pub branding: Branding,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The slice of a user record this core needs: identity, a display name
/// to derive the tenant slug from, and the persisted tenant link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub tenant_id: Option<TenantId>,
}

impl UserRecord {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::new(),
            name: name.into(),
            email: email.into(),
            tenant_id: None,
        }
    }
}

/// Slug derivation helpers.
///
/// Slugs are lowercase, URL-safe, and dash-separated. Provisioning
/// disambiguates collisions by appending a counter suffix.
pub mod slug {
    /// Fallback stem for names that normalize to nothing usable.
    pub const FALLBACK_STEM: &str = "portfolio";

    /// Normalize a display name into a slug candidate.
    pub fn normalize(name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut last_dash = true; // suppress leading dashes
        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                out.push(ch.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                out.push('-');
                last_dash = true;
            }
        }
        while out.ends_with('-') {
            out.pop();
        }
        if out.is_empty() {
            FALLBACK_STEM.to_string()
        } else {
            out
        }
    }

    /// Disambiguating candidate for retry attempt `n` (n >= 2).
    pub fn with_suffix(base: &str, n: u32) -> String {
        format!("{}-{}", base, n)
    }
}
