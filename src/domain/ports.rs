use crate::domain::model::{AllocationRecord, Consultant, OwnerId};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Read side of the record store. Every query is scoped to one owner.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Consultants of `owner`, ordered by name ascending.
    async fn list_consultants(&self, owner: &OwnerId) -> Result<Vec<Consultant>>;

    /// Allocations of `owner` overlapping `[range_start, range_end]`, joined with
    /// consultant rates and project billing.
    async fn list_allocations_overlapping(
        &self,
        owner: &OwnerId,
        range_start: NaiveDate,
        range_end: NaiveDate,
    ) -> Result<Vec<AllocationRecord>>;
}
