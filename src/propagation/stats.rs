use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use super::Propagator;
use crate::error::Result;
use crate::models::ActivityKind;

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TopParent {
    pub plant_id: ObjectId,
    pub count: u64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CloneStatistics {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    pub success_rate: f64,
    pub top_parents: Vec<TopParent>,
}

impl Propagator {
    /// Aggregates every clone attempt in the activity history. Deleted clones
    /// still count, since the history is never rewritten.
    pub async fn get_clone_statistics(&self) -> Result<CloneStatistics> {
        let events = self
            .activity
            .list(&[ActivityKind::CloneCreated, ActivityKind::CloneFailed])
            .await?;

        let mut successful = 0;
        let mut failed = 0;
        let mut per_source: HashMap<ObjectId, u64> = HashMap::new();
        for event in &events {
            match event.kind {
                ActivityKind::CloneCreated => {
                    successful += 1;
                    if let Some(source_id) = event.payload.source_id {
                        *per_source.entry(source_id).or_default() += 1;
                    }
                }
                ActivityKind::CloneFailed => failed += 1,
                ActivityKind::CloneDeleted => {}
            }
        }

        let total = successful + failed;
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64
        };

        Ok(CloneStatistics {
            total,
            successful,
            failed,
            success_rate,
            top_parents: rank(per_source, self.config.top_parents),
        })
    }
}

/// Highest count first; ties go to the smaller plant id.
fn rank(per_source: HashMap<ObjectId, u64>, limit: usize) -> Vec<TopParent> {
    let mut ranked: Vec<TopParent> = per_source
        .into_iter()
        .map(|(plant_id, count)| TopParent { plant_id, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.plant_id.cmp(&b.plant_id)));
    ranked.truncate(limit);
    ranked
}
