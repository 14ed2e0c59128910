//! Request lifecycle boundary.
//!
//! The seam between request-handling middleware and the tenancy core.
//! `on_request_start` runs before any handler: anonymous requests leave
//! the scope inactive, authenticated requests are provisioned and the
//! scope activated. `on_request_end` clears the scope and must run
//! unconditionally, error responses included; middleware that cannot
//! guarantee that wraps the handler body in [`RequestGate::guard`]
//! instead, which clears on drop.

use std::future::Future;
use std::sync::Arc;

use folio_core::records::TenantOwned;
use folio_core::scope::{ScopeGuard, TenantScope};
use folio_core::tenant::UserRecord;
use tracing::debug;

use crate::error::TenancyResult;
use crate::provision::TenantProvisioner;
use crate::scope::{ScopedRepository, UnscopedAccess};
use crate::store::{EntityStore, TenancyStore};

/// Per-request entry point owned by the middleware layer.
pub struct RequestGate<S> {
    provisioner: TenantProvisioner<S>,
}

impl<S> RequestGate<S>
where
    S: TenancyStore,
{
    pub fn new(provisioner: TenantProvisioner<S>) -> Self {
        Self { provisioner }
    }

    pub fn from_store(store: Arc<S>) -> Self {
        Self::new(TenantProvisioner::new(store))
    }

    pub fn provisioner(&self) -> &TenantProvisioner<S> {
        &self.provisioner
    }

    /// Run before the handler. Ensures the authenticated user has a
    /// tenant and activates the scope for it; anonymous requests pass
    /// through with the scope inactive.
    pub async fn on_request_start(
        &self,
        user: Option<&UserRecord>,
        scope: &mut TenantScope,
    ) -> TenancyResult<()> {
        match user {
            Some(user) => {
                let tenant = self.provisioner.ensure_tenant(user).await?;
                debug!(tenant_id = %tenant.id, "tenant scope activated");
                scope.set_active(tenant.id);
            }
            None => {
                debug!("anonymous request, tenant scope inactive");
                scope.clear();
            }
        }
        Ok(())
    }

    /// Run after the handler, success or failure. Leaves the scope
    /// inactive so a reused worker cannot inherit it.
    pub fn on_request_end(&self, scope: &mut TenantScope) {
        scope.clear();
    }

    /// Drop-based alternative to `on_request_end` for middleware that
    /// cannot place a cleanup call on every exit path.
    pub fn guard<'a>(&self, scope: &'a mut TenantScope) -> ScopeGuard<'a> {
        ScopeGuard::new(scope)
    }
}

/// Run `f` against one repository with tenant scoping suspended.
///
/// The single named bypass entry for admin reporting, one-time
/// migrations, and webhook handlers. Equivalent to
/// [`ScopedRepository::bypass`]; kept as a free function so call sites
/// read as what they are doing rather than as a method easily mistaken
/// for ordinary access.
pub async fn run_without_tenant_scope<'s, R, S, F, Fut, T>(
    repo: &'s ScopedRepository<R, S>,
    f: F,
) -> TenancyResult<T>
where
    R: TenantOwned + Send,
    S: EntityStore<R>,
    F: FnOnce(UnscopedAccess<'s, R, S>) -> Fut,
    Fut: Future<Output = TenancyResult<T>>,
{
    repo.bypass(f).await
}
