use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::{ActivityEvent, ActivityKind, Plant, PlantStatus};
use crate::repository::{ActivityLog, PlantRepository, ZoneDirectory};

#[derive(Default)]
pub struct InMemoryPlantRepository {
    plants: RwLock<Vec<Plant>>,
}

impl InMemoryPlantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.plants.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.plants.read().await.is_empty()
    }
}

#[async_trait]
impl PlantRepository for InMemoryPlantRepository {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Plant>, StoreError> {
        let plants = self.plants.read().await;
        Ok(plants.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_parent_id(&self, parent_id: ObjectId) -> Result<Vec<Plant>, StoreError> {
        let plants = self.plants.read().await;
        Ok(plants
            .iter()
            .filter(|p| p.parent_id() == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn find_by_status_in(&self, statuses: &[PlantStatus]) -> Result<Vec<Plant>, StoreError> {
        let plants = self.plants.read().await;
        Ok(plants
            .iter()
            .filter(|p| statuses.contains(&p.status))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Plant>, StoreError> {
        Ok(self.plants.read().await.clone())
    }

    async fn insert(&self, plant: &Plant) -> Result<(), StoreError> {
        let mut plants = self.plants.write().await;
        if plants.iter().any(|p| p.id == plant.id) {
            return Err(StoreError::Unavailable(format!(
                "id duplicado {}",
                plant.id
            )));
        }
        plants.push(plant.clone());
        Ok(())
    }

    async fn update(&self, plant: &Plant) -> Result<bool, StoreError> {
        let mut plants = self.plants.write().await;
        match plants.iter_mut().find(|p| p.id == plant.id) {
            Some(existing) => {
                *existing = plant.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let mut plants = self.plants.write().await;
        let before = plants.len();
        plants.retain(|p| p.id != id);
        Ok(plants.len() < before)
    }

    async fn reparent_children(
        &self,
        from: ObjectId,
        to: Option<ObjectId>,
    ) -> Result<u64, StoreError> {
        let mut plants = self.plants.write().await;
        let mut moved = 0;
        for plant in plants.iter_mut().filter(|p| p.parent_id() == Some(from)) {
            plant.reparent(to);
            moved += 1;
        }
        Ok(moved)
    }
}

#[derive(Default)]
pub struct InMemoryActivityLog {
    events: RwLock<Vec<ActivityEvent>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<ActivityEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn record(&self, event: ActivityEvent) -> Result<(), StoreError> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn list(&self, kinds: &[ActivityKind]) -> Result<Vec<ActivityEvent>, StoreError> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| kinds.contains(&e.kind))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryZoneDirectory {
    zones: RwLock<Vec<ObjectId>>,
}

impl InMemoryZoneDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, id: ObjectId) {
        self.zones.write().await.push(id);
    }
}

#[async_trait]
impl ZoneDirectory for InMemoryZoneDirectory {
    async fn zone_exists(&self, id: ObjectId) -> Result<bool, StoreError> {
        Ok(self.zones.read().await.contains(&id))
    }
}
