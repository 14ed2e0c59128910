//! Automatic tenant scoping.
//!
//! The enforcer makes tenant filtering the default and cross-tenant
//! access the explicit exception. All ordinary code holds a
//! [`ScopedRepository`] and never a raw [`EntityStore`]: reads are
//! filtered to the active tenant, creates are stamped with it, and a
//! request with no active tenant fails closed instead of seeing every
//! tenant's rows. Admin tooling, migrations, and webhook handlers go
//! through [`ScopedRepository::bypass`], which confines unscoped access
//! to one closure over one entity type.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use folio_core::records::TenantOwned;
use folio_core::scope::TenantScope;
use folio_core::tenant::TenantId;

use crate::error::{TenancyError, TenancyResult};
use crate::store::EntityStore;

/// Field name every tenant-owned record exposes for filtering.
pub const TENANT_ID_FIELD: &str = "tenant_id";

/// A single equality condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

/// A conjunction of equality filters over one record type.
///
/// Deliberately small: equality is all the scoping contract needs, and
/// backends are free to translate richer queries at their own layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    filters: Vec<Filter>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn has_filter_on(&self, field: &str) -> bool {
        self.filters.iter().any(|f| f.field == field)
    }
}

/// The scoping rules themselves, as pure functions over the request
/// scope. [`ScopedRepository`] is the enforcement point that applies
/// them; these stay separate so system code running legitimately outside
/// a tenant session (an inactive scope passes queries through
/// unfiltered) shares one implementation with the scoped path.
pub struct ScopeEnforcer;

impl ScopeEnforcer {
    /// Inject `tenant_id = active` when a tenant is active; pass the
    /// query through untouched when not.
    ///
    /// The filter is appended even if the caller supplied their own
    /// `tenant_id` condition: filters are a conjunction, so a spoofed
    /// foreign tenant id yields an empty result rather than a leak.
    pub fn apply_scope(scope: &TenantScope, query: Query) -> Query {
        match scope.active() {
            Some(tenant) => query.with_eq(TENANT_ID_FIELD, tenant.as_str()),
            None => query,
        }
    }

    /// Stamp an unowned record with the active tenant. A record that
    /// already carries a tenant id keeps it.
    pub fn stamp_on_create(scope: &TenantScope, record: &mut impl TenantOwned) {
        if record.tenant_id().is_none() {
            if let Some(tenant) = scope.active() {
                record.set_tenant_id(tenant.clone());
            }
        }
    }
}

/// The data-access wrapper all tenant-owned reads and writes go through.
///
/// `find` and `create` require an active scope and fail closed without
/// one; unscoped access exists only inside [`bypass`](Self::bypass).
pub struct ScopedRepository<R, S> {
    entity: &'static str,
    store: Arc<S>,
    _record: PhantomData<fn() -> R>,
}

impl<R, S> ScopedRepository<R, S>
where
    R: TenantOwned + Send,
    S: EntityStore<R>,
{
    /// `entity` names the record collection in errors and logs, e.g.
    /// `"portfolios"`.
    pub fn new(entity: &'static str, store: Arc<S>) -> Self {
        Self {
            entity,
            store,
            _record: PhantomData,
        }
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    /// Find records for the active tenant, with the caller's filters
    /// applied on top of the injected tenant filter.
    pub async fn find(&self, scope: &TenantScope, query: Query) -> TenancyResult<Vec<R>> {
        if !scope.is_active() {
            return Err(TenancyError::ScopeRequired { entity: self.entity });
        }
        let scoped = ScopeEnforcer::apply_scope(scope, query);
        self.store.find(&scoped).await
    }

    /// Persist a record for the active tenant, stamping its tenant id
    /// from the scope when unset.
    pub async fn create(&self, scope: &TenantScope, mut record: R) -> TenancyResult<R> {
        ScopeEnforcer::stamp_on_create(scope, &mut record);
        if record.tenant_id().is_none() {
            return Err(TenancyError::ScopeRequired { entity: self.entity });
        }
        self.store.insert(record).await
    }

    /// Run `f` with scoping suspended for this entity type only.
    ///
    /// The escape hatch for cross-tenant admin reads, migrations, and
    /// webhook handlers that resolve a tenant from an external payload.
    /// Nothing global changes: the suspension is the closure argument
    /// itself and cannot outlive or leak past the call.
    pub async fn bypass<'s, F, Fut, T>(&'s self, f: F) -> TenancyResult<T>
    where
        F: FnOnce(UnscopedAccess<'s, R, S>) -> Fut,
        Fut: Future<Output = TenancyResult<T>>,
    {
        tracing::debug!(entity = self.entity, "tenant scope bypassed");
        f(UnscopedAccess { repo: self }).await
    }
}

/// Unscoped handle handed to [`ScopedRepository::bypass`] closures.
pub struct UnscopedAccess<'a, R, S> {
    repo: &'a ScopedRepository<R, S>,
}

impl<R, S> UnscopedAccess<'_, R, S>
where
    R: TenantOwned + Send,
    S: EntityStore<R>,
{
    /// Find across all tenants. Admin reporting and migrations only.
    pub async fn find_unscoped(&self, query: Query) -> TenancyResult<Vec<R>> {
        self.repo.store.find(&query).await
    }

    /// Find for an explicitly named tenant, e.g. one taken from a
    /// webhook payload rather than a session.
    pub async fn find_for_tenant(
        &self,
        tenant: &TenantId,
        query: Query,
    ) -> TenancyResult<Vec<R>> {
        let query = query.with_eq(TENANT_ID_FIELD, tenant.as_str());
        self.repo.store.find(&query).await
    }

    /// Insert a record exactly as given. The record must already carry
    /// its tenant id; there is no scope to stamp from here.
    pub async fn insert_raw(&self, record: R) -> TenancyResult<R> {
        if record.tenant_id().is_none() {
            return Err(TenancyError::ScopeRequired {
                entity: self.repo.entity,
            });
        }
        self.repo.store.insert(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use folio_core::records::Portfolio;
    use std::sync::Mutex;

    #[test]
    fn apply_scope_injects_active_tenant() {
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));

        let query = ScopeEnforcer::apply_scope(&scope, Query::new().with_eq("published", true));
        assert_eq!(query.filters().len(), 2);
        assert!(query.has_filter_on(TENANT_ID_FIELD));
        assert_eq!(query.filters()[1].value, Value::from("t-1"));
    }

    #[test]
    fn apply_scope_passes_through_when_inactive() {
        let scope = TenantScope::new();
        let query = ScopeEnforcer::apply_scope(&scope, Query::new().with_eq("published", true));
        assert_eq!(query.filters().len(), 1);
        assert!(!query.has_filter_on(TENANT_ID_FIELD));
    }

    #[test]
    fn apply_scope_keeps_caller_tenant_filter_as_conjunction() {
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));

        let spoofed = Query::new().with_eq(TENANT_ID_FIELD, "t-other");
        let query = ScopeEnforcer::apply_scope(&scope, spoofed);
        // Both conditions present: the spoofed filter cannot widen access.
        assert_eq!(
            query
                .filters()
                .iter()
                .filter(|f| f.field == TENANT_ID_FIELD)
                .count(),
            2
        );
    }

    #[test]
    fn stamp_sets_unowned_records_only() {
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));

        let mut fresh = Portfolio::new("Site", "A site");
        ScopeEnforcer::stamp_on_create(&scope, &mut fresh);
        assert_eq!(fresh.tenant_id(), Some(&TenantId::from("t-1")));

        let mut owned = Portfolio::new("Other", "Owned elsewhere");
        owned.set_tenant_id(TenantId::from("t-9"));
        ScopeEnforcer::stamp_on_create(&scope, &mut owned);
        assert_eq!(owned.tenant_id(), Some(&TenantId::from("t-9")));
    }

    #[test]
    fn stamp_is_noop_without_active_scope() {
        let scope = TenantScope::new();
        let mut record = Portfolio::new("Site", "A site");
        ScopeEnforcer::stamp_on_create(&scope, &mut record);
        assert!(record.tenant_id().is_none());
    }

    /// Minimal store stub: returns everything, records inserts.
    struct StubStore {
        inserted: Mutex<Vec<Portfolio>>,
    }

    #[async_trait]
    impl EntityStore<Portfolio> for StubStore {
        async fn find(&self, _query: &Query) -> TenancyResult<Vec<Portfolio>> {
            Ok(self.inserted.lock().unwrap().clone())
        }

        async fn insert(&self, record: Portfolio) -> TenancyResult<Portfolio> {
            self.inserted.lock().unwrap().push(record.clone());
            Ok(record)
        }
    }

    fn stub_repo() -> ScopedRepository<Portfolio, StubStore> {
        ScopedRepository::new(
            "portfolios",
            Arc::new(StubStore {
                inserted: Mutex::new(Vec::new()),
            }),
        )
    }

    #[tokio::test]
    async fn find_fails_closed_without_scope() {
        let repo = stub_repo();
        let scope = TenantScope::new();

        let result = repo.find(&scope, Query::new()).await;
        assert!(matches!(
            result,
            Err(TenancyError::ScopeRequired { entity: "portfolios" })
        ));
    }

    #[tokio::test]
    async fn create_fails_closed_without_scope() {
        let repo = stub_repo();
        let scope = TenantScope::new();

        let result = repo.create(&scope, Portfolio::new("Site", "A site")).await;
        assert!(matches!(result, Err(TenancyError::ScopeRequired { .. })));
    }

    #[tokio::test]
    async fn create_stamps_active_tenant() {
        let repo = stub_repo();
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));

        let stored = repo
            .create(&scope, Portfolio::new("Site", "A site"))
            .await
            .unwrap();
        assert_eq!(stored.tenant_id(), Some(&TenantId::from("t-1")));
    }

    #[tokio::test]
    async fn bypass_reads_without_scope() {
        let repo = stub_repo();
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));
        repo.create(&scope, Portfolio::new("Site", "A site"))
            .await
            .unwrap();

        let all = repo
            .bypass(|access| async move { access.find_unscoped(Query::new()).await })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn insert_raw_rejects_unowned_records() {
        let repo = stub_repo();
        let result = repo
            .bypass(|access| async move { access.insert_raw(Portfolio::new("Site", "x")).await })
            .await;
        assert!(matches!(result, Err(TenancyError::ScopeRequired { .. })));
    }
}
