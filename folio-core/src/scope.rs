//! Request-scoped tenant slot.
//!
//! One [`TenantScope`] is created per inbound request and explicitly
//! threaded to everything that touches tenant-owned data. It is a single
//! slot, not a stack, and it is never a process-wide global: under any
//! worker-reuse model a leftover active tenant would leak one customer's
//! scope into the next request, so the slot must be cleared
//! unconditionally at end of request, error paths included.
//! [`ScopeGuard`] exists so that clearing survives early returns and
//! panics.

use crate::tenant::TenantId;

/// The per-request "which tenant is active" slot.
#[derive(Debug, Default)]
pub struct TenantScope {
    active: Option<TenantId>,
}

impl TenantScope {
    /// A fresh, inactive scope. System and admin code paths run with one
    /// of these and never activate it.
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Activate the scope for a tenant, replacing any previous value.
    pub fn set_active(&mut self, tenant: TenantId) {
        self.active = Some(tenant);
    }

    /// The currently active tenant, if any.
    pub fn active(&self) -> Option<&TenantId> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Deactivate. Must run at end of every request.
    pub fn clear(&mut self) {
        self.active = None;
    }
}

/// Clears the borrowed scope when dropped.
///
/// Middleware wraps the handler body in one of these so the scope comes
/// back inactive whether the handler returned, errored, or panicked.
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    scope: &'a mut TenantScope,
}

impl<'a> ScopeGuard<'a> {
    pub fn new(scope: &'a mut TenantScope) -> Self {
        Self { scope }
    }

    /// Access the guarded scope.
    pub fn scope(&self) -> &TenantScope {
        self.scope
    }

    /// Mutable access, e.g. to activate after provisioning.
    pub fn scope_mut(&mut self) -> &mut TenantScope {
        self.scope
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.scope.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_inactive() {
        let scope = TenantScope::new();
        assert!(!scope.is_active());
        assert_eq!(scope.active(), None);
    }

    #[test]
    fn set_and_clear() {
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));
        assert_eq!(scope.active(), Some(&TenantId::from("t-1")));

        scope.clear();
        assert!(!scope.is_active());
    }

    #[test]
    fn set_replaces_previous_tenant() {
        let mut scope = TenantScope::new();
        scope.set_active(TenantId::from("t-1"));
        scope.set_active(TenantId::from("t-2"));
        assert_eq!(scope.active(), Some(&TenantId::from("t-2")));
    }

    #[test]
    fn guard_clears_on_drop() {
        let mut scope = TenantScope::new();
        {
            let mut guard = ScopeGuard::new(&mut scope);
            guard.scope_mut().set_active(TenantId::from("t-1"));
            assert!(guard.scope().is_active());
        }
        assert!(!scope.is_active());
    }

    #[test]
    fn guard_clears_on_panic() {
        let mut scope = TenantScope::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let mut guard = ScopeGuard::new(&mut scope);
            guard.scope_mut().set_active(TenantId::from("t-1"));
            panic!("handler blew up");
        }));
        assert!(result.is_err());
        assert!(!scope.is_active());
    }
}
