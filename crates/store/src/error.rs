use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No calculation stored for project {project_id} (scenario: {scenario_id:?})")]
    NotFound {
        project_id: Uuid,
        scenario_id: Option<Uuid>,
    },

    #[error("Storage backend failure: {0}")]
    Backend(String),
}
