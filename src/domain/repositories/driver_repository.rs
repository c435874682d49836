use async_trait::async_trait;

use crate::domain::{error::StoreError, models::driver::DriverProfile};

/// Collection holding driver profiles
pub const DRIVERS_COLLECTION: &str = "drivers";

/// Record store access for driver profiles
#[async_trait]
pub trait DriverRepository {
    /// Read at most `limit` rows. Only used to confirm the store is reachable
    /// and the collection exists; returns the number of rows read.
    async fn probe(&self, limit: u64) -> Result<usize, StoreError>;

    async fn insert(&self, profile: &DriverProfile) -> Result<(), StoreError>;
}
