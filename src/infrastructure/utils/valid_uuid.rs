use uuid::Uuid;

use crate::errors::AppError;

/// Parses a path identifier, rejecting anything that is not a UUID with 400.
pub fn valid_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::BadRequest("Invalid ID format".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_ids() {
        assert!(matches!(valid_uuid("42"), Err(AppError::BadRequest(_))));
        assert_eq!(valid_uuid(&Uuid::nil().to_string()).unwrap(), Uuid::nil());
    }
}
