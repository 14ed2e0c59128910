//! Tenant auto-provisioning.
//!
//! Every authenticated user owns exactly one tenant. The provisioner
//! guarantees that before any scoped logic runs: an unprovisioned user's
//! first request creates the default plan (if the deployment never
//! seeded one), the tenant, and the owner link in one atomic store
//! operation. A partially provisioned user is a corrupt state, so any
//! storage failure aborts the whole request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use folio_core::config::FolioConfigSnapshot;
use folio_core::plan::Plan;
use folio_core::tenant::{
    slug, Branding, SubscriptionStatus, Tenant, TenantId, TenantStatus, UserRecord,
};
use tracing::{error, info, warn};

use crate::catalog::{free_plan_baseline, DEFAULT_PLAN_SLUG};
use crate::error::{TenancyError, TenancyResult};
use crate::store::TenancyStore;

/// Upper bound on slug disambiguation attempts unless configured.
pub const DEFAULT_SLUG_RETRY_LIMIT: u32 = 8;

/// A plan/subscription change arriving from the billing webhook.
///
/// The tenant id comes from the gateway payload, not from a session, so
/// this path runs entirely outside any tenant scope.
#[derive(Debug, Clone)]
pub struct SubscriptionUpdate {
    pub tenant_id: TenantId,
    /// New plan to assign, by catalog slug.
    pub plan_slug: Option<String>,
    pub subscription_status: Option<SubscriptionStatus>,
    /// Authoritative period-end from the gateway; replaces the stored
    /// value whenever present.
    pub subscription_ends_at: Option<DateTime<Utc>>,
}

/// Ensures users have tenants, and applies billing-driven tenant updates.
pub struct TenantProvisioner<S> {
    store: Arc<S>,
    default_plan_slug: String,
    slug_retry_limit: u32,
}

impl<S> TenantProvisioner<S>
where
    S: TenancyStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_plan_slug: DEFAULT_PLAN_SLUG.to_string(),
            slug_retry_limit: DEFAULT_SLUG_RETRY_LIMIT,
        }
    }

    /// Provisioner with `provision.*` config applied.
    pub fn with_config(store: Arc<S>, config: &FolioConfigSnapshot) -> Self {
        let mut provisioner = Self::new(store);
        if let Some(slug) = config.get_string("provision.default_plan") {
            provisioner.default_plan_slug = slug;
        }
        if let Some(limit) = config.get_usize("provision.slug_retry_limit") {
            provisioner.slug_retry_limit = limit as u32;
        }
        provisioner
    }

    /// Resolve the user's tenant, creating one if the user has none.
    ///
    /// Idempotent: an already-provisioned user resolves to the same
    /// tenant with no writes. The store's owner link is checked even
    /// when the in-memory user record carries no `tenant_id`, so a stale
    /// session cannot trigger a second tenant; a concurrent first
    /// request racing past both checks is converged by the store's
    /// owner-uniqueness constraint inside `create_tenant_for_user`.
    pub async fn ensure_tenant(&self, user: &UserRecord) -> TenancyResult<Tenant> {
        if let Some(tenant_id) = &user.tenant_id {
            return self.require_tenant(user, tenant_id).await;
        }
        if let Some(tenant_id) = self.store.user_tenant_id(&user.id).await? {
            return self.require_tenant(user, &tenant_id).await;
        }

        let plan = self.ensure_default_plan().await?;
        let base = slug::normalize(&user.name);
        let now = Utc::now();

        for attempt in 1..=self.slug_retry_limit {
            let candidate = if attempt == 1 {
                base.clone()
            } else {
                slug::with_suffix(&base, attempt)
            };

            let tenant = Tenant {
                id: TenantId::new(),
                name: user.name.clone(),
                slug: candidate.clone(),
                custom_domain: None,
                owner_user_id: user.id.clone(),
                plan_id: plan.id.clone(),
                status: TenantStatus::Active,
                subscription_status: SubscriptionStatus::Active,
                subscription_ends_at: None,
                branding: Branding::default(),
                created_at: now,
                updated_at: now,
            };

            match self.store.create_tenant_for_user(tenant, &user.id).await {
                Ok(tenant) => {
                    info!(
                        user_id = %user.id,
                        tenant_id = %tenant.id,
                        slug = %tenant.slug,
                        "tenant provisioned"
                    );
                    return Ok(tenant);
                }
                Err(TenancyError::SlugTaken(taken)) => {
                    warn!(user_id = %user.id, slug = %taken, attempt, "tenant slug collision");
                }
                Err(TenancyError::Storage(msg)) => {
                    error!(user_id = %user.id, error = %msg, "tenant provisioning failed");
                    return Err(TenancyError::ProvisioningFailed(msg));
                }
                Err(other) => return Err(other),
            }
        }

        error!(user_id = %user.id, base = %base, "slug disambiguation exhausted");
        Err(TenancyError::SlugCollisionExhausted {
            base,
            attempts: self.slug_retry_limit,
        })
    }

    /// The plan currently assigned to a tenant, for entitlement checks.
    pub async fn plan_for(&self, tenant: &Tenant) -> TenancyResult<Plan> {
        self.store
            .plan_by_id(&tenant.plan_id)
            .await?
            .ok_or_else(|| TenancyError::PlanNotFound(tenant.plan_id.to_string()))
    }

    /// Apply a billing webhook update to the addressed tenant.
    pub async fn apply_subscription(&self, update: SubscriptionUpdate) -> TenancyResult<Tenant> {
        let mut tenant = self
            .store
            .tenant_by_id(&update.tenant_id)
            .await?
            .ok_or_else(|| TenancyError::TenantNotFound(update.tenant_id.clone()))?;

        if let Some(plan_slug) = &update.plan_slug {
            let plan = self
                .store
                .plan_by_slug(plan_slug)
                .await?
                .ok_or_else(|| TenancyError::PlanNotFound(plan_slug.clone()))?;
            tenant.plan_id = plan.id;
        }
        if let Some(status) = update.subscription_status {
            tenant.subscription_status = status;
        }
        if update.subscription_ends_at.is_some() {
            tenant.subscription_ends_at = update.subscription_ends_at;
        }
        tenant.updated_at = Utc::now();

        info!(tenant_id = %tenant.id, "subscription updated from webhook");
        self.store.update_tenant(tenant).await
    }

    /// A linked tenant that cannot be loaded is corrupt provisioning
    /// state, not a soft miss.
    async fn require_tenant(&self, user: &UserRecord, tenant_id: &TenantId) -> TenancyResult<Tenant> {
        self.store.tenant_by_id(tenant_id).await?.ok_or_else(|| {
            TenancyError::ProvisioningFailed(format!(
                "user {} is linked to missing tenant {}",
                user.id, tenant_id
            ))
        })
    }

    async fn ensure_default_plan(&self) -> TenancyResult<Plan> {
        if let Some(plan) = self.store.plan_by_slug(&self.default_plan_slug).await? {
            return Ok(plan);
        }
        // Only the stock free plan has a hard-coded baseline to seed; a
        // custom default plan must be seeded administratively.
        if self.default_plan_slug == DEFAULT_PLAN_SLUG {
            self.store.ensure_plan(free_plan_baseline()).await
        } else {
            Err(TenancyError::PlanNotFound(self.default_plan_slug.clone()))
        }
    }
}
