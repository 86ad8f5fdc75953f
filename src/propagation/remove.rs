use mongodb::bson::oid::ObjectId;
use tracing::{info, warn};

use super::Propagator;
use crate::config::ChildPolicy;
use crate::error::{PropagationError, Result};
use crate::models::{ActivityKind, ActivityPayload};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub clone_id: ObjectId,
    pub parent_id: ObjectId,
    /// Children moved up to `parent_id` under [`ChildPolicy::Reparent`].
    pub reparented: u64,
}

impl Propagator {
    /// Deletes a clone, applying the configured [`ChildPolicy`] to its own clones.
    ///
    /// Under [`ChildPolicy::Reparent`] the children move before the clone row is
    /// deleted. If that delete then fails, the children stay under the clone's
    /// parent, the clone is left childless and no `clone_deleted` event is
    /// written; calling again finishes the removal.
    pub async fn delete_clone(&self, clone_id: ObjectId, acting_user_id: &str) -> Result<Removal> {
        let clone = self
            .plants
            .find_by_id(clone_id)
            .await?
            .ok_or(PropagationError::PlantNotFound(clone_id))?;
        let parent_id = clone
            .parent_id()
            .ok_or(PropagationError::NotAClone(clone_id))?;

        let children = self.plants.find_by_parent_id(clone_id).await?;
        let reparented = match (children.is_empty(), self.config.child_policy) {
            (true, _) => 0,
            (false, ChildPolicy::Reject) => {
                return Err(PropagationError::HasChildren {
                    id: clone_id,
                    count: children.len(),
                });
            }
            // The clone's parent predates all of its children, so the forest stays acyclic.
            (false, ChildPolicy::Reparent) => {
                self.plants
                    .reparent_children(clone_id, Some(parent_id))
                    .await?
            }
        };

        let deleted = match self.plants.delete(clone_id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                if reparented > 0 {
                    warn!(
                        plant = %clone_id,
                        reparented,
                        error = %e,
                        "children moved but clone not deleted"
                    );
                }
                return Err(e.into());
            }
        };
        if !deleted {
            return Err(PropagationError::PlantNotFound(clone_id));
        }
        info!(plant = %clone_id, parent = %parent_id, reparented, "clone removed");

        let payload = ActivityPayload {
            source_id: Some(parent_id),
            plant_id: Some(clone_id),
            name: Some(clone.name),
            reparented,
            ..ActivityPayload::default()
        };
        self.record_activity(ActivityKind::CloneDeleted, payload, acting_user_id)
            .await;

        Ok(Removal {
            clone_id,
            parent_id,
            reparented,
        })
    }
}
