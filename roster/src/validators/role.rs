use core::result::Result;
use validator::ValidationError;

use crate::role::Role;

pub fn role(value: &str) -> Result<(), ValidationError> {
    match Role::try_from(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("role")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_valid() {
        assert!(role("Admin").is_ok());
        assert!(role("Editor").is_ok());
        assert!(role("Viewer").is_ok());
    }

    #[test]
    fn test_role_invalid() {
        assert!(role("CEO").is_err());
        assert!(role("").is_err());
        assert!(role("admin").is_err());
    }
}
