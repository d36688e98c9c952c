use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Roles known to the user directory. Stored lowercase in `users.role`.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, AsRefStr, Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin,
    Chef,
    Employee,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_roles_only() {
        assert_eq!("chef".parse::<Role>().ok(), Some(Role::Chef));
        assert_eq!("admin".parse::<Role>().ok(), Some(Role::Admin));
        assert!("Chef ".parse::<Role>().is_err());
        assert!("hr".parse::<Role>().is_err());
        assert_eq!(Role::Employee.as_ref(), "employee");
    }
}
