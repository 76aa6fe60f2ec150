//! Authenticated users

use serde::{Deserialize, Serialize};

/// Which side of the application a user logged into
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

/// The user behind a session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Patient username or doctor id; appointments are keyed by this value
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    pub fn patient(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            display_name: username.clone(),
            user_id: username,
            role: Role::Patient,
        }
    }

    pub fn doctor(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: id.into(),
            display_name: name.into(),
            role: Role::Doctor,
        }
    }
}
