use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Update {
    pub date: DateTime<Utc>,
    pub height_cm: f32,
    pub image_url: String,
    pub comment: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    Seedling,
    Vegetative,
    Flowering,
    Harvested,
    Dead,
}

impl PlantStatus {
    /// Statuses a plant may have while it can still be used as a clone source.
    pub const LIVING: [PlantStatus; 3] = [
        PlantStatus::Seedling,
        PlantStatus::Vegetative,
        PlantStatus::Flowering,
    ];

    pub fn is_living(self) -> bool {
        Self::LIVING.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlantStatus::Seedling => "seedling",
            PlantStatus::Vegetative => "vegetative",
            PlantStatus::Flowering => "flowering",
            PlantStatus::Harvested => "harvested",
            PlantStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlantStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "seedling" => Ok(PlantStatus::Seedling),
            "vegetative" => Ok(PlantStatus::Vegetative),
            "flowering" => Ok(PlantStatus::Flowering),
            "harvested" => Ok(PlantStatus::Harvested),
            "dead" => Ok(PlantStatus::Dead),
            other => Err(format!("estado desconocido '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Plant {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: PlantStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ObjectId>,
    // Written once when the plant is created. Never exposed for mutation.
    #[serde(default)]
    parent_id: Option<ObjectId>,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub updates: Vec<Update>,
}

impl Plant {
    /// A plant with no parent, e.g. grown from seed.
    pub fn root(
        name: impl Into<String>,
        description: impl Into<String>,
        status: PlantStatus,
        strain_id: Option<ObjectId>,
        zone_id: Option<ObjectId>,
    ) -> Self {
        Plant {
            id: ObjectId::new(),
            name: name.into(),
            description: description.into(),
            status,
            strain_id,
            zone_id,
            parent_id: None,
            start_date: Utc::now(),
            updates: vec![],
        }
    }

    /// A seedling clone of `parent`. Strain and zone are inherited unless overridden.
    pub fn clone_of(
        parent: &Plant,
        name: impl Into<String>,
        description: impl Into<String>,
        zone_id: Option<ObjectId>,
        start_date: DateTime<Utc>,
    ) -> Self {
        Plant {
            id: ObjectId::new(),
            name: name.into(),
            description: description.into(),
            status: PlantStatus::Seedling,
            strain_id: parent.strain_id,
            zone_id: zone_id.or(parent.zone_id),
            parent_id: Some(parent.id),
            start_date,
            updates: vec![],
        }
    }

    pub fn parent_id(&self) -> Option<ObjectId> {
        self.parent_id
    }

    pub fn is_clone(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Moves the plant under a new parent. Only the clone remover's re-parent
    /// policy uses this, always pointing at an older plant.
    pub(crate) fn reparent(&mut self, parent_id: Option<ObjectId>) {
        self.parent_id = parent_id;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlantSummary {
    pub id: ObjectId,
    pub name: String,
    pub strain_id: Option<ObjectId>,
    pub status: PlantStatus,
}

impl From<&Plant> for PlantSummary {
    fn from(plant: &Plant) -> Self {
        PlantSummary {
            id: plant.id,
            name: plant.name.clone(),
            strain_id: plant.strain_id,
            status: plant.status,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Zone {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CloneCreated,
    CloneFailed,
    CloneDeleted,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::CloneCreated => "clone_created",
            ActivityKind::CloneFailed => "clone_failed",
            ActivityKind::CloneDeleted => "clone_deleted",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ActivityPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plant_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Status of the source plant when the clone was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_status: Option<PlantStatus>,
    #[serde(default)]
    pub reparented: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActivityEvent {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub kind: ActivityKind,
    pub user_id: String,
    pub payload: ActivityPayload,
    pub recorded_at: DateTime<Utc>,
}

impl ActivityEvent {
    pub fn new(kind: ActivityKind, payload: ActivityPayload, user_id: &str) -> Self {
        ActivityEvent {
            id: ObjectId::new(),
            kind,
            user_id: user_id.to_string(),
            payload,
            recorded_at: Utc::now(),
        }
    }
}
