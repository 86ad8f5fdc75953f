use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::PlantStatus;
use crate::propagation::BatchResult;

/// Failures raised by a storage backend. Never swallowed by the propagation core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error de MongoDB: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("almacenamiento no disponible: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("no se encontró la planta madre {0}")]
    ParentNotFound(ObjectId),

    #[error("la planta madre {id} no está viva (estado: {status})")]
    ParentNotEligible { id: ObjectId, status: PlantStatus },

    #[error("no se encontró la planta {0}")]
    PlantNotFound(ObjectId),

    #[error("la planta {0} no es un esqueje")]
    NotAClone(ObjectId),

    #[error("el esqueje {id} tiene {count} esquejes propios")]
    HasChildren { id: ObjectId, count: usize },

    /// Storage failed partway through a batch; `result` holds what already committed.
    #[error("lote interrumpido tras crear {} esquejes: {source}", .result.created.len())]
    BatchInterrupted {
        result: BatchResult,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Repository(#[from] StoreError),
}

/// Why a single clone spec in a batch was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CloneSpecError {
    #[error("el nombre es obligatorio")]
    BlankName,

    #[error("el nombre supera {max} caracteres")]
    NameTooLong { max: usize },

    #[error("nombre '{0}' repetido en el lote")]
    DuplicateName(String),

    #[error("zona desconocida {0}")]
    UnknownZone(ObjectId),
}

pub type Result<T, E = PropagationError> = std::result::Result<T, E>;
