//! Ordinary plant management around the propagation core: adding root plants,
//! editing them and deleting them.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tracing::info;

use crate::error::{PropagationError, Result};
use crate::models::{Plant, PlantStatus, Update};
use crate::repository::PlantRepository;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub description: String,
    pub status: Option<PlantStatus>,
    pub strain_id: Option<ObjectId>,
    pub zone_id: Option<ObjectId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantChanges {
    pub name: Option<String>,
    pub status: Option<PlantStatus>,
    pub height_cm: Option<f32>,
    pub image_url: Option<String>,
    pub comment: Option<String>,
}

impl PlantChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && !self.has_measurement()
    }

    fn has_measurement(&self) -> bool {
        self.height_cm.is_some() || self.image_url.is_some() || self.comment.is_some()
    }
}

/// Adds a plant that is not a clone of anything.
pub async fn add_plant(repo: &dyn PlantRepository, new: NewPlant) -> Result<ObjectId> {
    let plant = Plant::root(
        new.name.trim(),
        new.description,
        new.status.unwrap_or(PlantStatus::Seedling),
        new.strain_id,
        new.zone_id,
    );
    repo.insert(&plant).await?;
    info!(plant = %plant.id, "plant added");
    Ok(plant.id)
}

/// Applies `changes` and returns the stored plant. The parent link is never touched.
pub async fn update_plant(
    repo: &dyn PlantRepository,
    id: ObjectId,
    changes: PlantChanges,
) -> Result<Plant> {
    let mut plant = repo
        .find_by_id(id)
        .await?
        .ok_or(PropagationError::PlantNotFound(id))?;

    if changes.has_measurement() {
        plant.updates.push(Update {
            date: Utc::now(),
            height_cm: changes.height_cm.unwrap_or(0.0),
            image_url: changes.image_url.unwrap_or_default(),
            comment: changes.comment.unwrap_or_default(),
        });
    }
    if let Some(name) = changes.name {
        plant.name = name;
    }
    if let Some(status) = changes.status {
        plant.status = status;
    }

    if !repo.update(&plant).await? {
        return Err(PropagationError::PlantNotFound(id));
    }
    Ok(plant)
}

pub async fn remove_plant(repo: &dyn PlantRepository, id: ObjectId) -> Result<()> {
    if !repo.delete(id).await? {
        return Err(PropagationError::PlantNotFound(id));
    }
    info!(plant = %id, "plant removed");
    Ok(())
}
