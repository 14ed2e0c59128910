//! In-memory tenant-owned record collections.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;

use folio_core::records::TenantOwned;
use folio_tenancy::error::{TenancyError, TenancyResult};
use folio_tenancy::scope::Query;
use folio_tenancy::store::EntityStore;

/// In-memory [`EntityStore`] for one record type.
///
/// Filter matching runs against the record's JSON projection, so any
/// serializable field can be filtered on without the collection knowing
/// the record's shape. That mirrors how a database backend would
/// translate the same filters into WHERE clauses.
#[derive(Debug, Default)]
pub struct MemoryCollection<R> {
    records: RwLock<Vec<R>>,
}

impl<R> MemoryCollection<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored records across all tenants, for test assertions.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

fn matches<R: Serialize>(record: &R, query: &Query) -> TenancyResult<bool> {
    let projected =
        serde_json::to_value(record).map_err(|e| TenancyError::Storage(e.to_string()))?;
    Ok(query
        .filters()
        .iter()
        .all(|f| projected.get(&f.field) == Some(&f.value)))
}

#[async_trait]
impl<R> EntityStore<R> for MemoryCollection<R>
where
    R: TenantOwned + Serialize + Clone + Send + Sync,
{
    async fn find(&self, query: &Query) -> TenancyResult<Vec<R>> {
        let records = self.records.read();
        let mut out = Vec::new();
        for record in records.iter() {
            if matches(record, query)? {
                out.push(record.clone());
            }
        }
        Ok(out)
    }

    async fn insert(&self, record: R) -> TenancyResult<R> {
        self.records.write().push(record.clone());
        Ok(record)
    }
}
