use folio_core::errors::FolioError;
use folio_core::tenant::TenantId;
use thiserror::Error;

/// Result type for tenancy operations.
pub type TenancyResult<T> = Result<T, TenancyError>;

/// Failures of the tenancy core.
///
/// Entitlement evaluation never produces one of these: feature and limit
/// checks always resolve to a value. Errors here come from provisioning,
/// storage, and the fail-closed scoped read path.
#[derive(Error, Debug, Clone)]
pub enum TenancyError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(TenantId),

    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    /// Store-level uniqueness violation on the tenant slug. Consumed by
    /// the provisioning retry loop; callers normally never see it.
    #[error("Tenant slug already taken: {0}")]
    SlugTaken(String),

    #[error("Slug disambiguation exhausted for \"{base}\" after {attempts} attempts")]
    SlugCollisionExhausted { base: String, attempts: u32 },

    #[error("Provisioning failed: {0}")]
    ProvisioningFailed(String),

    /// A scoped read or write ran without an active tenant. User-facing
    /// request paths fail closed instead of silently reading every
    /// tenant's data; system code must use the explicit bypass.
    #[error("No active tenant scope for {entity} access")]
    ScopeRequired { entity: &'static str },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<TenancyError> for FolioError {
    fn from(err: TenancyError) -> Self {
        let message = err.to_string();
        match err {
            TenancyError::TenantNotFound(_) | TenancyError::PlanNotFound(_) => {
                FolioError::not_found(message)
            }
            TenancyError::SlugTaken(_) => FolioError::conflict(message),
            TenancyError::ScopeRequired { .. } => FolioError::forbidden(message),
            TenancyError::SlugCollisionExhausted { .. }
            | TenancyError::ProvisioningFailed(_)
            | TenancyError::Storage(_) => FolioError::general_error(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::errors::ErrorKind;

    #[test]
    fn maps_to_status_coded_envelope() {
        let err: FolioError = TenancyError::TenantNotFound(TenantId::from("t-1")).into();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err: FolioError = TenancyError::ScopeRequired { entity: "portfolios" }.into();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err: FolioError = TenancyError::SlugCollisionExhausted {
            base: "ada".into(),
            attempts: 8,
        }
        .into();
        assert_eq!(err.kind, ErrorKind::GeneralError);
    }
}
