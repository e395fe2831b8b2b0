//! The closed role set and role-targeting helpers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user's role in the tracker.
///
/// Serializes to the uppercase literals the rest of the product uses
/// (`"ADMIN"`, `"MAINTAINER"`, `"REPORTER"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access, including issue deletion.
    Admin,
    /// Triages and updates any issue.
    Maintainer,
    /// Creates issues and edits their own.
    Reporter,
}

/// The staff roles targeted by "notify maintainers and admins" rules.
pub const STAFF_ROLES: [Role; 2] = [Role::Maintainer, Role::Admin];

impl Role {
    /// The uppercase wire spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Maintainer => "MAINTAINER",
            Self::Reporter => "REPORTER",
        }
    }

    /// Whether this role is in the maintainer/admin staff set.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Maintainer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string outside the closed set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive parse of the wire spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "MAINTAINER" => Ok(Self::Maintainer),
            "REPORTER" => Ok(Self::Reporter),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}
