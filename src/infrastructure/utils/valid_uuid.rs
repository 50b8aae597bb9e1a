use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path identifier. A malformed id can never match a row, so it is
/// reported as not found.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(format!("No record with id '{}'", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(valid_uuid("42"), Err(AppError::NotFound(_))));

        let id = Uuid::new_v4();
        assert_eq!(valid_uuid(&id.to_string()).unwrap(), id);
    }
}
