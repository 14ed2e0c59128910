//! Storage ports.
//!
//! The tenancy core is backend-agnostic: provisioning and scoping talk
//! to these traits, and a backend crate (the in-memory one ships with
//! the workspace) supplies the implementation. Both ports keep their
//! multi-tenant semantics in the contract itself rather than trusting
//! callers to prefix keys or remember filters.

use async_trait::async_trait;
use folio_core::plan::{Plan, PlanId};
use folio_core::records::TenantOwned;
use folio_core::tenant::{Tenant, TenantId, UserId};

use crate::error::TenancyResult;
use crate::scope::Query;

/// Persistence for tenants, plans, and the owner link.
///
/// Tenants and plans are NOT tenant-owned records; lookups here run
/// unscoped by nature (provisioning happens before any scope exists, and
/// webhook handlers address tenants by an id from an external payload).
#[async_trait]
pub trait TenancyStore: Send + Sync {
    async fn tenant_by_id(&self, id: &TenantId) -> TenancyResult<Option<Tenant>>;

    async fn tenant_by_slug(&self, slug: &str) -> TenancyResult<Option<Tenant>>;

    async fn plan_by_id(&self, id: &PlanId) -> TenancyResult<Option<Plan>>;

    async fn plan_by_slug(&self, slug: &str) -> TenancyResult<Option<Plan>>;

    /// Idempotent upsert keyed by slug: returns the stored plan if one
    /// with this slug already exists, otherwise persists `plan`.
    async fn ensure_plan(&self, plan: Plan) -> TenancyResult<Plan>;

    /// Atomically persist a tenant and link it to its owning user.
    ///
    /// Two unique constraints hold inside the same atomic step:
    /// - slug uniqueness, violated -> [`TenancyError::SlugTaken`];
    /// - owner uniqueness: if the user is already linked to a tenant
    ///   (a concurrent first request won the race), the existing tenant
    ///   is returned and nothing is written.
    ///
    /// [`TenancyError::SlugTaken`]: crate::error::TenancyError::SlugTaken
    async fn create_tenant_for_user(
        &self,
        tenant: Tenant,
        owner: &UserId,
    ) -> TenancyResult<Tenant>;

    /// Replace a stored tenant (billing/settings flows).
    async fn update_tenant(&self, tenant: Tenant) -> TenancyResult<Tenant>;

    /// The persisted owner link, the durable form of `user.tenant_id`.
    async fn user_tenant_id(&self, user: &UserId) -> TenancyResult<Option<TenantId>>;
}

/// Raw persistence for one kind of tenant-owned record.
///
/// This is deliberately filter-dumb: it applies whatever equality
/// filters the query carries and nothing more. Tenant filtering is the
/// job of [`ScopedRepository`], which is the only thing ordinary code
/// should hold; raw `EntityStore` access outside the bypass path is a
/// review flag.
///
/// [`ScopedRepository`]: crate::scope::ScopedRepository
#[async_trait]
pub trait EntityStore<R>: Send + Sync
where
    R: TenantOwned + Send,
{
    /// All records matching every filter in the query.
    async fn find(&self, query: &Query) -> TenancyResult<Vec<R>>;

    /// Persist a record as-is, returning the stored copy.
    async fn insert(&self, record: R) -> TenancyResult<R>;
}
