use std::collections::HashSet;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::Propagator;
use crate::error::{CloneSpecError, PropagationError, Result, StoreError};
use crate::models::{ActivityKind, ActivityPayload, Plant};

/// One clone requested in a batch.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CloneSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
}

impl CloneSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn in_zone(mut self, zone_id: ObjectId) -> Self {
        self.zone_id = Some(zone_id);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CloneOutcome {
    Created(ObjectId),
    Failed(CloneSpecError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedClone {
    pub spec: CloneSpec,
    pub plant_id: ObjectId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedClone {
    pub spec: CloneSpec,
    pub error: CloneSpecError,
}

/// Per-item report of a batch, in the order the specs were supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub created: Vec<CreatedClone>,
    pub failed: Vec<FailedClone>,
}

impl BatchResult {
    pub fn push(&mut self, spec: CloneSpec, outcome: CloneOutcome) {
        match outcome {
            CloneOutcome::Created(plant_id) => self.created.push(CreatedClone { spec, plant_id }),
            CloneOutcome::Failed(error) => self.failed.push(FailedClone { spec, error }),
        }
    }

    pub fn created_ids(&self) -> Vec<ObjectId> {
        self.created.iter().map(|c| c.plant_id).collect()
    }
}

impl Propagator {
    /// Creates one clone of `parent_id` per spec.
    ///
    /// Specs are handled one after another and independently: an invalid spec is
    /// reported in [`BatchResult::failed`] and the rest still go through. The
    /// call as a whole fails only when the parent is missing or not living, or
    /// when storage breaks mid-batch ([`PropagationError::BatchInterrupted`]
    /// then carries what already committed).
    ///
    /// Once the parent checks pass, the batch finishes even if the returned
    /// future is dropped: every committed clone gets its activity event.
    pub async fn create_clones(
        &self,
        parent_id: ObjectId,
        specs: Vec<CloneSpec>,
        acting_user_id: &str,
    ) -> Result<BatchResult> {
        let parent = self
            .plants
            .find_by_id(parent_id)
            .await?
            .ok_or(PropagationError::ParentNotFound(parent_id))?;
        if !parent.status.is_living() {
            return Err(PropagationError::ParentNotEligible {
                id: parent_id,
                status: parent.status,
            });
        }

        // The batch runs as its own task so a caller that stops waiting cannot
        // leave an inserted clone without its `clone_created` event.
        let batch = self.clone();
        let acting_user_id = acting_user_id.to_string();
        let handle =
            tokio::spawn(async move { batch.run_batch(parent, specs, &acting_user_id).await });
        match handle.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(PropagationError::Repository(StoreError::Unavailable(format!(
                "lote cancelado: {}",
                e
            )))),
        }
    }

    async fn run_batch(
        &self,
        parent: Plant,
        specs: Vec<CloneSpec>,
        acting_user_id: &str,
    ) -> Result<BatchResult> {
        let parent_id = parent.id;
        let mut result = BatchResult::default();
        let mut taken_names = HashSet::new();
        let mut specs = specs.into_iter();
        while let Some(spec) = specs.next() {
            match self
                .create_one(&parent, &spec, &mut taken_names, acting_user_id)
                .await
            {
                Ok(outcome) => result.push(spec, outcome),
                Err(source) => {
                    let pending = specs.len() + 1;
                    tracing::error!(
                        parent = %parent_id,
                        created = result.created.len(),
                        pending,
                        error = %source,
                        "clone batch interrupted"
                    );
                    return Err(PropagationError::BatchInterrupted { result, source });
                }
            }
        }

        info!(
            parent = %parent_id,
            created = result.created.len(),
            failed = result.failed.len(),
            "clone batch finished"
        );
        Ok(result)
    }

    async fn create_one(
        &self,
        parent: &Plant,
        spec: &CloneSpec,
        taken_names: &mut HashSet<String>,
        acting_user_id: &str,
    ) -> std::result::Result<CloneOutcome, StoreError> {
        let name = spec.name.trim();
        if let Err(error) = self.validate(name, spec, taken_names).await? {
            debug!(parent = %parent.id, name, %error, "clone spec rejected");
            let payload = ActivityPayload {
                source_id: Some(parent.id),
                name: Some(spec.name.clone()),
                error: Some(error.to_string()),
                ..ActivityPayload::default()
            };
            self.record_activity(ActivityKind::CloneFailed, payload, acting_user_id)
                .await;
            return Ok(CloneOutcome::Failed(error));
        }

        let clone = Plant::clone_of(
            parent,
            name,
            spec.description.clone().unwrap_or_default(),
            spec.zone_id,
            spec.start_date.unwrap_or_else(Utc::now),
        );
        self.plants.insert(&clone).await?;
        taken_names.insert(name.to_lowercase());
        info!(parent = %parent.id, plant = %clone.id, name, "clone created");

        let payload = ActivityPayload {
            source_id: Some(parent.id),
            plant_id: Some(clone.id),
            name: Some(clone.name.clone()),
            parent_status: Some(parent.status),
            ..ActivityPayload::default()
        };
        self.record_activity(ActivityKind::CloneCreated, payload, acting_user_id)
            .await;
        Ok(CloneOutcome::Created(clone.id))
    }

    async fn validate(
        &self,
        name: &str,
        spec: &CloneSpec,
        taken_names: &HashSet<String>,
    ) -> std::result::Result<std::result::Result<(), CloneSpecError>, StoreError> {
        if name.is_empty() {
            return Ok(Err(CloneSpecError::BlankName));
        }
        let max = self.config.max_name_len;
        if name.chars().count() > max {
            return Ok(Err(CloneSpecError::NameTooLong { max }));
        }
        if taken_names.contains(&name.to_lowercase()) {
            return Ok(Err(CloneSpecError::DuplicateName(name.to_string())));
        }
        if let Some(zone_id) = spec.zone_id {
            if !self.zones.zone_exists(zone_id).await? {
                return Ok(Err(CloneSpecError::UnknownZone(zone_id)));
            }
        }
        Ok(Ok(()))
    }
}
