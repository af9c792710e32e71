//! Account roles and acting identities

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role carried by a session token and by channel registrations
///
/// `User` is the customer side of the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Company,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Company => "company",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "company" => Ok(Role::Company),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated caller of an operation (account id + role)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub account_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(account_id: impl Into<String>, role: Role) -> Self {
        Self {
            account_id: account_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.role, self.account_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Company).unwrap(), "\"company\"");
        let role: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, Role::User);
        assert!("driver".parse::<Role>().is_err());
    }

    #[test]
    fn identity_uses_camel_case() {
        let json = serde_json::to_value(Identity::new("acc-1", Role::Admin)).unwrap();
        assert_eq!(json["accountId"], "acc-1");
        assert_eq!(json["role"], "admin");
    }
}
