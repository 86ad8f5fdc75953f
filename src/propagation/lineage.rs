use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use super::Propagator;
use crate::error::{PropagationError, Result};
use crate::models::{Plant, PlantSummary};

/// Genealogy window around one plant: two generations up, one down, plus siblings.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Lineage {
    pub plant: PlantSummary,
    pub parent: Option<PlantSummary>,
    pub grandparent: Option<PlantSummary>,
    pub siblings: Vec<PlantSummary>,
    pub children: Vec<PlantSummary>,
}

impl Lineage {
    pub fn is_empty(&self) -> bool {
        self.parent.is_none()
            && self.grandparent.is_none()
            && self.siblings.is_empty()
            && self.children.is_empty()
    }
}

impl Propagator {
    pub async fn get_lineage(&self, plant_id: ObjectId) -> Result<Lineage> {
        let plant = self
            .plants
            .find_by_id(plant_id)
            .await?
            .ok_or(PropagationError::PlantNotFound(plant_id))?;

        // A parent id can dangle once the parent row is deleted; that reads as no parent.
        let parent = match plant.parent_id() {
            Some(parent_id) => self.plants.find_by_id(parent_id).await?,
            None => None,
        };
        let grandparent = match parent.as_ref().and_then(Plant::parent_id) {
            Some(grandparent_id) => self.plants.find_by_id(grandparent_id).await?,
            None => None,
        };

        let siblings = match plant.parent_id() {
            Some(parent_id) => {
                let mut siblings = self.plants.find_by_parent_id(parent_id).await?;
                siblings.retain(|p| p.id != plant.id);
                siblings
            }
            None => Vec::new(),
        };
        let children = self.plants.find_by_parent_id(plant.id).await?;

        Ok(Lineage {
            plant: PlantSummary::from(&plant),
            parent: parent.as_ref().map(PlantSummary::from),
            grandparent: grandparent.as_ref().map(PlantSummary::from),
            siblings: summarize(siblings),
            children: summarize(children),
        })
    }
}

fn summarize(mut plants: Vec<Plant>) -> Vec<PlantSummary> {
    plants.sort_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)));
    plants.iter().map(PlantSummary::from).collect()
}
