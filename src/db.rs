use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::TryStreamExt;
use mongodb::{bson::doc, bson::oid::ObjectId, options::ClientOptions, Client, Collection, Database};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{ActivityEvent, ActivityKind, Plant, PlantStatus, Zone};
use crate::repository::{ActivityLog, PlantRepository, ZoneDirectory};

pub const PLANTS: &str = "plants";
pub const ACTIVITY: &str = "activity";
pub const ZONES: &str = "zones";

/// Opens the database and pings it so a bad URI fails before any command runs.
pub async fn connect(uri: &str, db_name: &str) -> Result<Database, StoreError> {
    let mut client_options = ClientOptions::parse(uri).await?;
    client_options.server_selection_timeout = Some(Duration::from_secs(10));

    let client = Client::with_options(client_options)?;
    let db = client.database(db_name);
    db.run_command(doc! { "ping": 1 }).await?;
    info!(db = db_name, "connected to MongoDB");
    Ok(db)
}

pub struct MongoPlantRepository {
    collection: Collection<Plant>,
}

impl MongoPlantRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Plant>(PLANTS),
        }
    }
}

#[async_trait]
impl PlantRepository for MongoPlantRepository {
    async fn find_by_id(&self, id: ObjectId) -> Result<Option<Plant>, StoreError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_parent_id(&self, parent_id: ObjectId) -> Result<Vec<Plant>, StoreError> {
        let cursor = self.collection.find(doc! { "parent_id": parent_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_status_in(&self, statuses: &[PlantStatus]) -> Result<Vec<Plant>, StoreError> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let cursor = self
            .collection
            .find(doc! { "status": { "$in": statuses } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn list_all(&self) -> Result<Vec<Plant>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert(&self, plant: &Plant) -> Result<(), StoreError> {
        self.collection.insert_one(plant).await?;
        debug!(plant = %plant.id, "plant inserted");
        Ok(())
    }

    async fn update(&self, plant: &Plant) -> Result<bool, StoreError> {
        let result = self
            .collection
            .replace_one(doc! { "_id": plant.id }, plant)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: ObjectId) -> Result<bool, StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn reparent_children(
        &self,
        from: ObjectId,
        to: Option<ObjectId>,
    ) -> Result<u64, StoreError> {
        let result = self
            .collection
            .update_many(
                doc! { "parent_id": from },
                doc! { "$set": { "parent_id": to } },
            )
            .await?;
        Ok(result.modified_count)
    }
}

pub struct MongoActivityLog {
    collection: Collection<ActivityEvent>,
}

impl MongoActivityLog {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<ActivityEvent>(ACTIVITY),
        }
    }
}

#[async_trait]
impl ActivityLog for MongoActivityLog {
    async fn record(&self, event: ActivityEvent) -> Result<(), StoreError> {
        self.collection.insert_one(event).await?;
        Ok(())
    }

    async fn list(&self, kinds: &[ActivityKind]) -> Result<Vec<ActivityEvent>, StoreError> {
        let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
        let cursor = self.collection.find(doc! { "kind": { "$in": kinds } }).await?;
        Ok(cursor.try_collect().await?)
    }
}

pub struct MongoZoneDirectory {
    collection: Collection<Zone>,
}

impl MongoZoneDirectory {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Zone>(ZONES),
        }
    }
}

#[async_trait]
impl ZoneDirectory for MongoZoneDirectory {
    async fn zone_exists(&self, id: ObjectId) -> Result<bool, StoreError> {
        let count = self.collection.count_documents(doc! { "_id": id }).await?;
        Ok(count > 0)
    }
}
