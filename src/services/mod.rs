pub mod projects;
pub mod tasks;

use uuid::Uuid;

use crate::error::AppError;

// Ids that are not UUIDs cannot name a stored entity
pub(crate) fn parse_id(raw: &str, entity: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::not_found(format!("{} not found", entity)))
}
