//! Clone propagation and lineage tracking for the my-arbolitos plant records.

pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod models;
pub mod plants;
pub mod propagation;
pub mod repository;

pub use config::{ChildPolicy, Config, PropagationConfig};
pub use error::{CloneSpecError, PropagationError, StoreError};
pub use models::{Plant, PlantStatus, PlantSummary};
pub use propagation::{BatchResult, CloneSpec, CloneStatistics, Lineage, Propagator, Removal};
