//! Tenant-owned records of the portfolio domain.
//!
//! Everything a tenant manages from the dashboard carries a `tenant_id`
//! and implements [`TenantOwned`], which is the seam the scope enforcer
//! works through: reads are filtered by it, creates are stamped with it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tenant::TenantId;

/// Unique identifier shared by all tenant-owned records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A record that belongs to exactly one tenant.
///
/// `tenant_id` is optional only between construction and persistence:
/// the scope enforcer stamps it from the active scope before a record is
/// handed to storage. Implementations must not clear an assigned id.
pub trait TenantOwned {
    fn tenant_id(&self) -> Option<&TenantId>;
    fn set_tenant_id(&mut self, tenant: TenantId);
}

/// A portfolio project shown on the tenant's public page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: RecordId,
    pub tenant_id: Option<TenantId>,
    pub title: String,
    pub summary: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new(title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            tenant_id: None,
            title: title.into(),
            summary: summary.into(),
            published: false,
            created_at: Utc::now(),
        }
    }
}

impl TenantOwned for Portfolio {
    fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    fn set_tenant_id(&mut self, tenant: TenantId) {
        self.tenant_id = Some(tenant);
    }
}

/// A work-history entry on the tenant's public page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: RecordId,
    pub tenant_id: Option<TenantId>,
    pub role: String,
    pub company: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ExperienceEntry {
    pub fn new(role: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            tenant_id: None,
            role: role.into(),
            company: company.into(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

impl TenantOwned for ExperienceEntry {
    fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    fn set_tenant_id(&mut self, tenant: TenantId) {
        self.tenant_id = Some(tenant);
    }
}

/// A recorded visit to a public portfolio page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub id: RecordId,
    pub tenant_id: Option<TenantId>,
    pub path: String,
    pub viewed_at: DateTime<Utc>,
}

impl PageView {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(),
            tenant_id: None,
            path: path.into(),
            viewed_at: Utc::now(),
        }
    }
}

impl TenantOwned for PageView {
    fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }

    fn set_tenant_id(&mut self, tenant: TenantId) {
        self.tenant_id = Some(tenant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_records_start_unowned() {
        assert!(Portfolio::new("Site", "A site").tenant_id().is_none());
        assert!(ExperienceEntry::new("Engineer", "Acme").tenant_id().is_none());
        assert!(PageView::new("/p/site").tenant_id().is_none());
    }

    #[test]
    fn set_tenant_id_assigns_owner() {
        let mut p = Portfolio::new("Site", "A site");
        let tenant = TenantId::from("t-1");
        p.set_tenant_id(tenant.clone());
        assert_eq!(p.tenant_id(), Some(&tenant));
    }
}
