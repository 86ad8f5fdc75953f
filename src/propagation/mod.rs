//! Clone propagation and lineage tracking.
//!
//! [`Propagator`] ties the operations together over the collaborator traits in
//! [`crate::repository`]. Every operation runs to completion inside the call;
//! nothing is spawned.

mod batch;
mod eligibility;
mod lineage;
mod remove;
mod stats;

use std::sync::Arc;

use tracing::warn;

pub use batch::{BatchResult, CloneOutcome, CloneSpec, CreatedClone, FailedClone};
pub use lineage::Lineage;
pub use remove::Removal;
pub use stats::{CloneStatistics, TopParent};

use crate::config::PropagationConfig;
use crate::models::{ActivityEvent, ActivityKind, ActivityPayload};
use crate::repository::{ActivityLog, PlantRepository, ZoneDirectory};

#[derive(Clone)]
pub struct Propagator {
    plants: Arc<dyn PlantRepository>,
    activity: Arc<dyn ActivityLog>,
    zones: Arc<dyn ZoneDirectory>,
    config: PropagationConfig,
}

impl Propagator {
    pub fn new(
        plants: Arc<dyn PlantRepository>,
        activity: Arc<dyn ActivityLog>,
        zones: Arc<dyn ZoneDirectory>,
        config: PropagationConfig,
    ) -> Self {
        Self {
            plants,
            activity,
            zones,
            config,
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Activity is a side channel: a failed write is logged and otherwise ignored.
    async fn record_activity(&self, kind: ActivityKind, payload: ActivityPayload, user_id: &str) {
        let event = ActivityEvent::new(kind, payload, user_id);
        if let Err(e) = self.activity.record(event).await {
            warn!(kind = kind.as_str(), error = %e, "failed to record activity");
        }
    }
}
