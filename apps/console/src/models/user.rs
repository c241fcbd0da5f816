use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three fixed roles. Matching on this enum is always exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Hr,
    Manager,
    Candidate,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Hr => "HR",
            Role::Manager => "Manager",
            Role::Candidate => "Candidate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HR" => Ok(Role::Hr),
            "MANAGER" => Ok(Role::Manager),
            "CANDIDATE" => Ok(Role::Candidate),
            other => Err(format!("unknown role '{other}' (expected hr, manager or candidate)")),
        }
    }
}

/// Authenticated user as returned by the `auth/*` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    /// Candidate record linked to a CANDIDATE account, if any.
    #[serde(default)]
    pub candidate: Option<i64>,
}

impl User {
    pub fn display_name(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<i64>,
}

/// Envelope used by login, register and current_user responses.
#[derive(Debug, Deserialize)]
pub struct UserEnvelope {
    pub user: User,
}
