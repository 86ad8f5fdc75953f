use super::Propagator;
use crate::error::Result;
use crate::models::{PlantStatus, PlantSummary};

impl Propagator {
    /// Plants that can currently act as clone sources: anything still living.
    pub async fn list_eligible_parents(&self) -> Result<Vec<PlantSummary>> {
        let plants = self.plants.find_by_status_in(&PlantStatus::LIVING).await?;
        Ok(plants.iter().map(PlantSummary::from).collect())
    }
}
