//! Collaborator contracts the propagation core is written against.
//!
//! Each trait has a MongoDB implementation in [`crate::db`] and an in-memory
//! one in [`crate::memory`].

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::error::StoreError;
use crate::models::{ActivityEvent, ActivityKind, Plant, PlantStatus};

#[async_trait]
pub trait PlantRepository: Send + Sync {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Plant>, StoreError>;
    async fn find_by_parent_id(&self, parent_id: ObjectId) -> Result<Vec<Plant>, StoreError>;
    async fn find_by_status_in(&self, statuses: &[PlantStatus]) -> Result<Vec<Plant>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Plant>, StoreError>;
    async fn insert(&self, plant: &Plant) -> Result<(), StoreError>;
    async fn update(&self, plant: &Plant) -> Result<bool, StoreError>;
    /// Returns whether a plant was actually removed.
    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError>;
    /// Points every child of `from` at `to`. Returns the number of plants moved.
    async fn reparent_children(
        &self,
        from: ObjectId,
        to: Option<ObjectId>,
    ) -> Result<u64, StoreError>;
}

/// Append-only activity history. Recording is fire-and-forget for callers;
/// listing feeds the propagation statistics.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn record(&self, event: ActivityEvent) -> Result<(), StoreError>;
    async fn list(&self, kinds: &[ActivityKind]) -> Result<Vec<ActivityEvent>, StoreError>;
}

#[async_trait]
pub trait ZoneDirectory: Send + Sync {
    async fn zone_exists(&self, id: ObjectId) -> Result<bool, StoreError>;
}
