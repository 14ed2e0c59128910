//! In-memory tenancy tables.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use folio_core::plan::{Plan, PlanId};
use folio_core::tenant::{Tenant, TenantId, UserId};
use folio_tenancy::error::{TenancyError, TenancyResult};
use folio_tenancy::store::TenancyStore;

#[derive(Debug, Default)]
struct Tables {
    tenants: HashMap<TenantId, Tenant>,
    /// Unique constraint: slug -> tenant.
    slug_index: HashMap<String, TenantId>,
    /// Unique constraint: one tenant per owning user. This is the
    /// durable form of `user.tenant_id` and the safeguard that makes a
    /// racing double-provision converge on one tenant.
    owners: HashMap<UserId, TenantId>,
    plans: HashMap<PlanId, Plan>,
    plan_slug_index: HashMap<String, PlanId>,
}

/// In-memory [`TenancyStore`].
///
/// All tables live behind one `RwLock`; holding the write lock across a
/// whole mutation is what stands in for a database transaction here, so
/// `create_tenant_for_user` observes and updates both unique constraints
/// atomically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tenants, for test assertions.
    pub fn tenant_count(&self) -> usize {
        self.tables.read().tenants.len()
    }

    /// Number of stored plans, for test assertions.
    pub fn plan_count(&self) -> usize {
        self.tables.read().plans.len()
    }
}

#[async_trait]
impl TenancyStore for MemoryStore {
    async fn tenant_by_id(&self, id: &TenantId) -> TenancyResult<Option<Tenant>> {
        Ok(self.tables.read().tenants.get(id).cloned())
    }

    async fn tenant_by_slug(&self, slug: &str) -> TenancyResult<Option<Tenant>> {
        let tables = self.tables.read();
        Ok(tables
            .slug_index
            .get(slug)
            .and_then(|id| tables.tenants.get(id))
            .cloned())
    }

    async fn plan_by_id(&self, id: &PlanId) -> TenancyResult<Option<Plan>> {
        Ok(self.tables.read().plans.get(id).cloned())
    }

    async fn plan_by_slug(&self, slug: &str) -> TenancyResult<Option<Plan>> {
        let tables = self.tables.read();
        Ok(tables
            .plan_slug_index
            .get(slug)
            .and_then(|id| tables.plans.get(id))
            .cloned())
    }

    async fn ensure_plan(&self, plan: Plan) -> TenancyResult<Plan> {
        let mut tables = self.tables.write();
        if let Some(existing) = tables
            .plan_slug_index
            .get(&plan.slug)
            .and_then(|id| tables.plans.get(id))
        {
            return Ok(existing.clone());
        }
        tables
            .plan_slug_index
            .insert(plan.slug.clone(), plan.id.clone());
        tables.plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn create_tenant_for_user(
        &self,
        tenant: Tenant,
        owner: &UserId,
    ) -> TenancyResult<Tenant> {
        let mut tables = self.tables.write();

        // Owner uniqueness: the loser of a provisioning race gets the
        // winner's tenant back instead of a duplicate.
        if let Some(existing_id) = tables.owners.get(owner) {
            let existing = tables.tenants.get(existing_id).cloned().ok_or_else(|| {
                TenancyError::Storage(format!(
                    "owner link for {} points at missing tenant {}",
                    owner, existing_id
                ))
            })?;
            return Ok(existing);
        }

        if tables.slug_index.contains_key(&tenant.slug) {
            return Err(TenancyError::SlugTaken(tenant.slug));
        }

        tables.slug_index.insert(tenant.slug.clone(), tenant.id.clone());
        tables.owners.insert(owner.clone(), tenant.id.clone());
        tables.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    async fn update_tenant(&self, tenant: Tenant) -> TenancyResult<Tenant> {
        let mut tables = self.tables.write();
        let stored = tables
            .tenants
            .get(&tenant.id)
            .cloned()
            .ok_or_else(|| TenancyError::TenantNotFound(tenant.id.clone()))?;

        if stored.slug != tenant.slug {
            match tables.slug_index.get(&tenant.slug) {
                Some(other) if *other != tenant.id => {
                    return Err(TenancyError::SlugTaken(tenant.slug));
                }
                _ => {}
            }
            tables.slug_index.remove(&stored.slug);
            tables.slug_index.insert(tenant.slug.clone(), tenant.id.clone());
        }

        tables.tenants.insert(tenant.id.clone(), tenant.clone());
        Ok(tenant)
    }

    async fn user_tenant_id(&self, user: &UserId) -> TenancyResult<Option<TenantId>> {
        Ok(self.tables.read().owners.get(user).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use folio_core::tenant::{Branding, SubscriptionStatus, TenantStatus};

    fn tenant(slug: &str, owner: &UserId, plan: &PlanId) -> Tenant {
        let now = Utc::now();
        Tenant {
            id: TenantId::new(),
            name: slug.to_string(),
            slug: slug.to_string(),
            custom_domain: None,
            owner_user_id: owner.clone(),
            plan_id: plan.clone(),
            status: TenantStatus::Active,
            subscription_status: SubscriptionStatus::Active,
            subscription_ends_at: None,
            branding: Branding::default(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn slug_uniqueness_is_enforced() {
        let store = MemoryStore::new();
        let plan = PlanId::new();
        let a = UserId::new();
        let b = UserId::new();

        store
            .create_tenant_for_user(tenant("ada", &a, &plan), &a)
            .await
            .unwrap();
        let err = store
            .create_tenant_for_user(tenant("ada", &b, &plan), &b)
            .await
            .unwrap_err();
        assert!(matches!(err, TenancyError::SlugTaken(s) if s == "ada"));
    }

    #[tokio::test]
    async fn owner_uniqueness_returns_existing_tenant() {
        let store = MemoryStore::new();
        let plan = PlanId::new();
        let owner = UserId::new();

        let first = store
            .create_tenant_for_user(tenant("ada", &owner, &plan), &owner)
            .await
            .unwrap();
        let second = store
            .create_tenant_for_user(tenant("ada-2", &owner, &plan), &owner)
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.tenant_count(), 1);
        assert_eq!(
            store.user_tenant_id(&owner).await.unwrap(),
            Some(first.id.clone())
        );
    }

    #[tokio::test]
    async fn ensure_plan_is_idempotent_by_slug() {
        let store = MemoryStore::new();

        let first = store.ensure_plan(Plan::new("free", "Free", 0)).await.unwrap();
        let second = store
            .ensure_plan(Plan::new("free", "Free v2", 0))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Free");
        assert_eq!(store.plan_count(), 1);
    }

    #[tokio::test]
    async fn update_tenant_requires_existing_row() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let plan = PlanId::new();

        let err = store
            .update_tenant(tenant("ghost", &owner, &plan))
            .await
            .unwrap_err();
        assert!(matches!(err, TenancyError::TenantNotFound(_)));
    }

    #[tokio::test]
    async fn update_tenant_keeps_slug_index_consistent() {
        let store = MemoryStore::new();
        let owner = UserId::new();
        let plan = PlanId::new();

        let mut stored = store
            .create_tenant_for_user(tenant("ada", &owner, &plan), &owner)
            .await
            .unwrap();
        stored.slug = "ada-lovelace".to_string();
        store.update_tenant(stored.clone()).await.unwrap();

        assert!(store.tenant_by_slug("ada").await.unwrap().is_none());
        assert_eq!(
            store
                .tenant_by_slug("ada-lovelace")
                .await
                .unwrap()
                .map(|t| t.id),
            Some(stored.id)
        );
    }
}
