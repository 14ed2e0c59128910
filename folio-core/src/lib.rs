//! folio-core: framework-agnostic core for Folio.
//!
//! Holds the types every other Folio crate builds on: tenant and plan
//! models, the request-scoped tenant slot, the error envelope, and the
//! key/value configuration store. No storage, no HTTP, no policy.

pub mod config;
pub mod errors;
pub mod plan;
pub mod records;
pub mod scope;
pub mod tenant;

pub use config::{FolioConfig, FolioConfigSnapshot};
pub use errors::{ErrorKind, FolioError};
pub use plan::{Plan, PlanId};
pub use records::{ExperienceEntry, PageView, Portfolio, RecordId, TenantOwned};
pub use scope::{ScopeGuard, TenantScope};
pub use tenant::{
    Branding, SubscriptionStatus, Tenant, TenantId, TenantStatus, UserId, UserRecord,
};
