use std::env;
use std::fmt;

use crate::error::ConfigError;

/// Environment variable holding the administrator's ID.
pub const ADMIN_ID_VAR : &str = "EVM_ADMIN_ID";
/// Environment variable holding the administrator's password.
pub const ADMIN_PASSWORD_VAR : &str = "EVM_ADMIN_PASSWORD";

/// The one administrator account, configured outside the program.
#[derive(Clone, PartialEq)]
pub struct AdminCredentials {
    id : String,
    password : String,
}

impl AdminCredentials {
    pub fn new(id : impl Into<String>, password : impl Into<String>) -> Self {
        AdminCredentials {
            id : id.into(),
            password : password.into(),
        }
    }

    /// Reads the credentials from `EVM_ADMIN_ID` and `EVM_ADMIN_PASSWORD`.
    pub fn from_env() -> Result<Self, ConfigError> {
        AdminCredentials::from_lookup(|var| env::var(var).ok())
    }

    /// Reads the credentials using `lookup` to resolve each variable name. Both must be present
    /// and non-empty.
    pub fn from_lookup<F>(lookup : F) -> Result<Self, ConfigError>
    where
        F : Fn(&'static str) -> Option<String>,
    {
        let require = |var| match lookup(var) {
            None => Err(ConfigError::Missing(var)),
            Some(value) if value.is_empty() => Err(ConfigError::Empty(var)),
            Some(value) => Ok(value),
        };

        Ok(AdminCredentials::new(require(ADMIN_ID_VAR)?, require(ADMIN_PASSWORD_VAR)?))
    }

    /// Checks a login attempt against the configured account.
    pub fn verify(&self, id : &str, password : &str) -> bool {
        self.id == id && self.password == password
    }
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
        .field("id", &self.id)
        .field("password", &"<redacted>")
        .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{AdminCredentials, ADMIN_ID_VAR, ADMIN_PASSWORD_VAR};
    use crate::error::ConfigError;

    fn lookup(vars : &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let vars : HashMap<_, _> = vars.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn verifies_only_the_configured_pair() {
        let admin = AdminCredentials::from_lookup(lookup(&[
            (ADMIN_ID_VAR, "returning-officer"),
            (ADMIN_PASSWORD_VAR, "correct horse"),
        ])).unwrap();

        assert!(admin.verify("returning-officer", "correct horse"));
        assert!(!admin.verify("returning-officer", "correct"));
        assert!(!admin.verify("admin", "correct horse"));
        assert!(!admin.verify("", ""));
    }

    #[test]
    fn missing_or_empty_values_are_rejected() {
        assert_eq!(
            AdminCredentials::from_lookup(lookup(&[(ADMIN_PASSWORD_VAR, "pw")])),
            Err(ConfigError::Missing(ADMIN_ID_VAR)),
        );
        assert_eq!(
            AdminCredentials::from_lookup(lookup(&[(ADMIN_ID_VAR, "admin"), (ADMIN_PASSWORD_VAR, "")])),
            Err(ConfigError::Empty(ADMIN_PASSWORD_VAR)),
        );
    }

    #[test]
    fn debug_output_hides_password() {
        let admin = AdminCredentials::new("admin", "hunter2");
        assert!(!format!("{:?}", admin).contains("hunter2"));
    }
}
