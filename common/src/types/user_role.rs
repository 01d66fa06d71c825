use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of the logged-in viewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UserRole {
    /// Placed the order, only watches it.
    Client,
    /// Runs the restaurant that cooks the order.
    Owner,
    /// Driver that picks the order up and delivers it.
    Delivery,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Client, UserRole::Owner, UserRole::Delivery];
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Client => write!(f, "Client"),
            UserRole::Owner => write!(f, "Owner"),
            UserRole::Delivery => write!(f, "Delivery"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role '{}', expected Client, Owner or Delivery", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_roles_from_cli_arguments() {
        assert_eq!("owner".parse::<UserRole>(), Ok(UserRole::Owner));
        assert_eq!("DELIVERY".parse::<UserRole>(), Ok(UserRole::Delivery));
        assert!("admin".parse::<UserRole>().is_err());
    }
}
