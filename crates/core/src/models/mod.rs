//! Shared domain models.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorization level attached to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account, may only request delivery quotes.
    #[default]
    User,
    /// Administrator, may manage customers and other users.
    Admin,
}

impl Role {
    /// Lowercase label used in listings and persisted records.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered account able to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique login name.
    pub username: String,
    /// bcrypt hash of the account password.
    pub password_hash: String,
    /// Authorization level.
    pub role: Role,
}

impl User {
    /// Whether the account may enter the administrative menus.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Delivery destination positioned on the company grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique customer name.
    pub name: String,
    /// Horizontal grid coordinate.
    pub grid_x: i64,
    /// Vertical grid coordinate.
    pub grid_y: i64,
}

impl Customer {
    /// Position of the customer as a grid point.
    pub fn location(&self) -> GridPoint {
        GridPoint {
            x: self.grid_x,
            y: self.grid_y,
        }
    }
}

/// Integer position on the delivery map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GridPoint {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}
