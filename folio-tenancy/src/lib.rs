//! # folio-tenancy: tenant isolation and plan entitlements
//!
//! The cross-cutting core of the Folio portfolio builder. Everything else
//! in the application is ordinary CRUD; this crate owns the parts with
//! real invariants:
//!
//! - **Scoping**: all access to tenant-owned records goes through
//!   [`ScopedRepository`], which filters reads to the active tenant and
//!   stamps creates with it. Cross-tenant access exists only behind the
//!   explicit [`lifecycle::run_without_tenant_scope`] bypass.
//! - **Provisioning**: [`TenantProvisioner`] guarantees every
//!   authenticated user has exactly one tenant (creating it, with the
//!   default plan, atomically) before any scoped logic runs.
//! - **Entitlements**: [`EntitlementEvaluator`] answers "is feature X
//!   enabled" and "is usage Y within limit Z" from the tenant's plan,
//!   failing closed on anything unrecorded.
//!
//! Request pipelines drive it through [`lifecycle::RequestGate`]:
//! `on_request_start` provisions and activates the scope,
//! `on_request_end` clears it unconditionally.

pub mod catalog;
pub mod entitlement;
pub mod error;
pub mod lifecycle;
pub mod provision;
pub mod scope;
pub mod store;

pub use catalog::{free_plan_baseline, PlanCatalog};
pub use entitlement::EntitlementEvaluator;
pub use error::{TenancyError, TenancyResult};
pub use lifecycle::{run_without_tenant_scope, RequestGate};
pub use provision::{SubscriptionUpdate, TenantProvisioner};
pub use scope::{Filter, Query, ScopeEnforcer, ScopedRepository, UnscopedAccess};
pub use store::{EntityStore, TenancyStore};
